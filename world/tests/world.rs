use std::time::Duration;

use horde_core::{
    ActorId, ActorState, CharacterMotor, CharacterSnapshot, Command, DamageSource, Event, LockKind,
    PlayerHealthModel, PlayerId, RescueOutcome, SpawnError, Species, Vec3,
};
use horde_world::{apply, query, Party, World, WorldConfig, MAX_CONSECUTIVE_FAULTS, MAX_HEALTH};

const FRAME: Duration = Duration::from_micros(16_667);

struct Rig<C> {
    world: World,
    characters: C,
    events: Vec<Event>,
}

impl<C: PlayerHealthModel + CharacterMotor> Rig<C> {
    fn new(characters: C) -> Self {
        Self {
            world: World::new(WorldConfig::default()),
            characters,
            events: Vec::new(),
        }
    }

    fn apply(&mut self, command: Command) {
        apply(&mut self.world, command, &mut self.characters, &mut self.events);
    }

    fn spawn(&mut self, species: Species, position: Vec3) -> ActorId {
        self.apply(Command::SpawnActor { species, position });
        match self.events.last() {
            Some(Event::ActorSpawned { actor, .. }) => *actor,
            other => panic!("expected spawn confirmation, got {other:?}"),
        }
    }

    fn state(&self, actor: ActorId) -> Option<ActorState> {
        query::actor(&self.world, actor).map(|snapshot| snapshot.state)
    }

    fn run(&mut self, duration: Duration) {
        let end = query::now(&self.world) + duration;
        while query::now(&self.world) < end {
            self.apply(Command::Tick { dt: FRAME });
        }
    }

    fn run_until(&mut self, limit: Duration, mut done: impl FnMut(&Self) -> bool) -> bool {
        let end = query::now(&self.world) + limit;
        while query::now(&self.world) < end {
            self.apply(Command::Tick { dt: FRAME });
            if done(self) {
                return true;
            }
        }
        false
    }
}

fn party_with(players: &[(u32, Vec3)]) -> Party {
    let mut party = Party::new();
    for (id, position) in players {
        party.join(PlayerId::new(*id), *position, Vec3::NEG_X);
    }
    party
}

fn pinned_rig() -> (Rig<Party>, ActorId) {
    let mut rig = Rig::new(party_with(&[(1, Vec3::new(12.0, 0.0, 0.0))]));
    let hunter = rig.spawn(Species::Hunter, Vec3::ZERO);
    assert!(rig.run_until(Duration::from_secs(4), |rig| {
        rig.state(hunter) == Some(ActorState::Pin)
    }));
    (rig, hunter)
}

#[test]
fn boss_cap_rejects_second_spawn_and_keeps_count() {
    let mut rig = Rig::new(Party::new());
    let _ = rig.spawn(Species::Tank, Vec3::ZERO);
    rig.apply(Command::SpawnActor {
        species: Species::Tank,
        position: Vec3::X,
    });

    assert_eq!(
        rig.events.last(),
        Some(&Event::SpawnRejected {
            species: Species::Tank,
            reason: SpawnError::CapReached {
                species: Species::Tank,
                cap: 1,
            },
        })
    );
    assert_eq!(query::active_counts(&rig.world).get(Species::Tank), 1);
}

#[test]
fn active_count_never_exceeds_cap() {
    let mut rig = Rig::new(Party::new());
    for index in 0..50 {
        rig.apply(Command::SpawnActor {
            species: Species::Common,
            position: Vec3::new(index as f32, 0.0, 0.0),
        });
        let counts = query::active_counts(&rig.world);
        assert!(counts.get(Species::Common) <= 30);
    }
    let rejected = rig
        .events
        .iter()
        .filter(|event| matches!(event, Event::SpawnRejected { .. }))
        .count();
    assert_eq!(rejected, 20);
}

#[test]
fn lethal_damage_while_pinning_releases_victim_and_kills() {
    let (mut rig, hunter) = pinned_rig();
    assert_eq!(
        query::victim_lock(&rig.world, PlayerId::new(1)),
        Some((hunter, LockKind::Pin))
    );
    rig.events.clear();

    rig.apply(Command::DamageActor {
        actor: hunter,
        amount: 10_000.0,
        source: DamageSource::player(PlayerId::new(2), Vec3::ZERO),
    });

    assert_eq!(rig.state(hunter), Some(ActorState::Dead));
    assert!(query::victim_lock(&rig.world, PlayerId::new(1)).is_none());
    assert!(!rig.characters.is_movement_locked(PlayerId::new(1)));
    assert!(rig.events.contains(&Event::VictimReleased {
        actor: hunter,
        player: PlayerId::new(1),
        kind: LockKind::Pin,
    }));
}

#[test]
fn dead_actors_ignore_damage_and_transitions_then_get_destroyed() {
    let mut rig = Rig::new(Party::new());
    let common = rig.spawn(Species::Common, Vec3::ZERO);
    rig.apply(Command::DamageActor {
        actor: common,
        amount: 100.0,
        source: DamageSource::environment(Vec3::ZERO),
    });
    let corpse = query::actor(&rig.world, common).expect("corpse");
    rig.events.clear();

    rig.apply(Command::DamageActor {
        actor: common,
        amount: 5.0,
        source: DamageSource::environment(Vec3::ZERO),
    });
    rig.apply(Command::TransitionActor {
        actor: common,
        state: ActorState::Chase,
    });
    assert!(rig.events.is_empty());
    assert_eq!(query::actor(&rig.world, common), Some(corpse));

    rig.run(Duration::from_millis(3_100));
    assert!(query::actor(&rig.world, common).is_none());
    assert!(rig.events.contains(&Event::ActorRemoved {
        actor: common,
        species: Species::Common,
    }));
    assert_eq!(query::active_counts(&rig.world).total(), 0);
}

#[test]
fn externally_staggered_hunter_ignores_stale_pounce_resolution() {
    let mut rig = Rig::new(party_with(&[(1, Vec3::new(12.0, 0.0, 0.0))]));
    let hunter = rig.spawn(Species::Hunter, Vec3::ZERO);
    assert!(rig.run_until(Duration::from_secs(3), |rig| {
        rig.state(hunter) == Some(ActorState::Leap)
    }));

    rig.apply(Command::TransitionActor {
        actor: hunter,
        state: ActorState::Stagger,
    });
    rig.events.clear();
    rig.run(Duration::from_millis(1_600));

    assert_eq!(query::stale_callbacks(&rig.world), 1);
    let staggers = rig
        .events
        .iter()
        .filter(|event| {
            matches!(event, Event::ActorStateChanged { to: ActorState::Stagger, .. })
        })
        .count();
    assert_eq!(staggers, 0);
}

#[test]
fn successful_rescue_frees_victim_and_staggers_holder() {
    let (mut rig, hunter) = pinned_rig();
    let victim = rig
        .characters
        .character(PlayerId::new(1))
        .expect("victim")
        .position;
    rig.characters
        .join(PlayerId::new(2), victim + Vec3::new(1.0, 0.0, 1.0), Vec3::X);
    rig.events.clear();

    rig.apply(Command::RescueVictim {
        rescuer: PlayerId::new(2),
        victim: PlayerId::new(1),
    });

    assert_eq!(rig.state(hunter), Some(ActorState::Stagger));
    assert!(query::victim_lock(&rig.world, PlayerId::new(1)).is_none());
    assert!(rig.events.contains(&Event::RescueAttempted {
        rescuer: PlayerId::new(2),
        victim: PlayerId::new(1),
        success: true,
        reason: "freed from hold".to_owned(),
    }));
}

#[test]
fn failed_rescue_keeps_the_lock() {
    let (mut rig, hunter) = pinned_rig();
    rig.characters
        .join(PlayerId::new(2), Vec3::new(-50.0, 0.0, 0.0), Vec3::X);

    rig.apply(Command::RescueVictim {
        rescuer: PlayerId::new(2),
        victim: PlayerId::new(1),
    });

    assert_eq!(rig.state(hunter), Some(ActorState::Pin));
    assert_eq!(query::held_victim(&rig.world, hunter), Some(PlayerId::new(1)));
    assert!(matches!(
        rig.events.last(),
        Some(Event::RescueAttempted { success: false, .. })
    ));
}

#[test]
fn reported_contacts_only_count_during_a_charge() {
    let mut rig = Rig::new(party_with(&[
        (1, Vec3::new(10.0, 0.0, 0.0)),
        (2, Vec3::new(0.0, 0.0, 30.0)),
    ]));
    let charger = rig.spawn(Species::Charger, Vec3::ZERO);

    rig.apply(Command::ReportContact {
        actor: charger,
        player: PlayerId::new(2),
    });
    assert_eq!(rig.characters.health(PlayerId::new(2)), Some(MAX_HEALTH));

    assert!(rig.run_until(Duration::from_secs(3), |rig| {
        rig.state(charger) == Some(ActorState::Charge)
    }));
    rig.apply(Command::ReportContact {
        actor: charger,
        player: PlayerId::new(2),
    });
    assert_eq!(
        query::victim_lock(&rig.world, PlayerId::new(2)),
        Some((charger, LockKind::Carry))
    );
    assert_eq!(rig.characters.health(PlayerId::new(2)), Some(MAX_HEALTH - 10.0));

    rig.apply(Command::ReportContact {
        actor: charger,
        player: PlayerId::new(1),
    });
    assert_eq!(rig.characters.health(PlayerId::new(1)), Some(MAX_HEALTH));
}

#[test]
fn removing_a_holder_restores_victim_movement() {
    let (mut rig, hunter) = pinned_rig();
    rig.apply(Command::RemoveActor { actor: hunter });
    rig.apply(Command::RemoveActor { actor: hunter });

    assert!(query::actor(&rig.world, hunter).is_none());
    assert!(!rig.characters.is_movement_locked(PlayerId::new(1)));
    let removals = rig
        .events
        .iter()
        .filter(|event| matches!(event, Event::ActorRemoved { .. }))
        .count();
    assert_eq!(removals, 1);
}

#[test]
fn non_finite_updates_are_contained_then_evicted() {
    let mut rig = Rig::new(party_with(&[(1, Vec3::new(10.0, 0.0, 0.0))]));
    let common = rig.spawn(Species::Common, Vec3::ZERO);
    assert!(rig.run_until(Duration::from_secs(2), |rig| {
        rig.state(common) == Some(ActorState::Chase)
    }));
    let last_good = query::actor(&rig.world, common).expect("common").position;

    rig.characters
        .set_position(PlayerId::new(1), Vec3::splat(f32::NAN));
    rig.apply(Command::Tick {
        dt: Duration::from_millis(100),
    });
    let rolled_back = query::actor(&rig.world, common).expect("still registered");
    assert_eq!(rolled_back.position, last_good);

    rig.run(Duration::from_secs(1));
    assert!(query::actor(&rig.world, common).is_none());
    assert!(rig.events.iter().any(|event| matches!(
        event,
        Event::ActorEvicted { actor, faults, .. }
            if *actor == common && *faults == MAX_CONSECUTIVE_FAULTS
    )));
}

struct Sabotaged {
    party: Party,
    broken: bool,
}

impl PlayerHealthModel for Sabotaged {
    fn characters(&self) -> Vec<CharacterSnapshot> {
        if self.broken {
            panic!("character roster unavailable");
        }
        self.party.characters()
    }

    fn damage_player(&mut self, target: PlayerId, amount: f32, source_position: Vec3) {
        self.party.damage_player(target, amount, source_position);
    }

    fn attempt_rescue(&mut self, rescuer: PlayerId, target: PlayerId) -> RescueOutcome {
        self.party.attempt_rescue(rescuer, target)
    }

    fn heal_player(&mut self, target: PlayerId) {
        self.party.heal_player(target);
    }
}

impl CharacterMotor for Sabotaged {
    fn set_movement_locked(&mut self, player: PlayerId, locked: bool) {
        self.party.set_movement_locked(player, locked);
    }

    fn apply_impulse(&mut self, player: PlayerId, impulse: Vec3) {
        self.party.apply_impulse(player, impulse);
    }

    fn pull_toward(&mut self, player: PlayerId, position: Vec3, max_step: f32) {
        self.party.pull_toward(player, position, max_step);
    }
}

#[test]
fn panicking_update_is_contained_then_evicted() {
    let mut rig = Rig::new(Sabotaged {
        party: party_with(&[(1, Vec3::new(500.0, 0.0, 0.0))]),
        broken: false,
    });
    let common = rig.spawn(Species::Common, Vec3::ZERO);
    rig.characters.broken = true;

    rig.run(Duration::from_secs(1));

    assert!(query::actor(&rig.world, common).is_none());
    assert!(rig
        .events
        .iter()
        .any(|event| matches!(event, Event::ActorEvicted { actor, .. } if *actor == common)));
    assert!(query::now(&rig.world) >= Duration::from_secs(1));
}
