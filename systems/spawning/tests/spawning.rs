use std::time::Duration;

use horde_core::{
    CharacterSnapshot, PlayerId, SpawnPoint, SpawnPointKind, SpawnPointProvider, Vec3,
};
use horde_system_spawning::{SelectorTuning, SpawnPointTable};
use horde_world::{Occluder, Terrain};

fn survivor(id: u32, position: Vec3, facing: Vec3) -> CharacterSnapshot {
    CharacterSnapshot {
        id: PlayerId::new(id),
        position,
        facing,
        alive: true,
        incapacitated: false,
    }
}

fn special(x: f32, z: f32) -> SpawnPoint {
    SpawnPoint::new(Vec3::new(x, 0.0, z), SpawnPointKind::Special)
}

#[test]
fn visible_points_are_excluded_on_request() {
    let terrain = Terrain::new(vec![Occluder::new(Vec3::new(0.0, 0.0, 15.0), 3.0)]);
    let mut table = SpawnPointTable::new(
        vec![special(20.0, 0.0), special(0.0, 30.0)],
        SelectorTuning::default(),
        9,
    );
    let characters = [survivor(1, Vec3::ZERO, Vec3::X)];

    for second in 0..10 {
        let mut selection = table.select(Duration::from_secs(second), &characters, &terrain);
        let point = selection.get_spawn_point(SpawnPointKind::Special, true, 0.0);
        assert_eq!(point, Some(Vec3::new(0.0, 0.0, 30.0)));
    }

    let mut selection = table.select(Duration::from_secs(20), &characters, &terrain);
    let point = selection.get_spawn_point(SpawnPointKind::Special, false, 0.0);
    assert_eq!(point, Some(Vec3::new(20.0, 0.0, 0.0)));
}

#[test]
fn points_beyond_view_distance_count_as_hidden() {
    let terrain = Terrain::default();
    let mut table = SpawnPointTable::new(
        vec![special(30.0, 0.0), special(80.0, 0.0)],
        SelectorTuning::default(),
        2,
    );
    let characters = [survivor(1, Vec3::ZERO, Vec3::X)];

    let mut selection = table.select(Duration::ZERO, &characters, &terrain);
    assert_eq!(
        selection.get_spawn_point(SpawnPointKind::Special, true, 0.75),
        Some(Vec3::new(80.0, 0.0, 0.0))
    );
}

#[test]
fn points_near_characters_and_other_kinds_are_never_used() {
    let terrain = Terrain::default();
    let mut table = SpawnPointTable::new(
        vec![
            special(3.0, 0.0),
            SpawnPoint::new(Vec3::new(60.0, 0.0, 0.0), SpawnPointKind::Common),
        ],
        SelectorTuning::default(),
        4,
    );
    let characters = [survivor(1, Vec3::ZERO, Vec3::X)];

    let mut selection = table.select(Duration::ZERO, &characters, &terrain);
    assert_eq!(
        selection.get_spawn_point(SpawnPointKind::Special, false, 0.5),
        None
    );
    assert_eq!(
        selection.get_spawn_point(SpawnPointKind::Common, false, 0.5),
        Some(Vec3::new(60.0, 0.0, 0.0))
    );
}

#[test]
fn behind_preference_follows_the_ratio() {
    let terrain = Terrain::default();
    let mut table = SpawnPointTable::new(
        vec![special(-30.0, 0.0), special(30.0, 0.0)],
        SelectorTuning::default(),
        17,
    );
    let characters = [survivor(1, Vec3::ZERO, Vec3::X)];

    let mut behind = 0;
    let draws = 2_000;
    for second in 0..draws {
        let mut selection = table.select(Duration::from_secs(second), &characters, &terrain);
        if selection.get_spawn_point(SpawnPointKind::Special, false, 0.75)
            == Some(Vec3::new(-30.0, 0.0, 0.0))
        {
            behind += 1;
        }
    }

    let share = f64::from(behind) / draws as f64;
    assert!((0.70..=0.80).contains(&share), "behind share {share}");
}

#[test]
fn incapacitated_characters_still_watch_but_dead_ones_do_not() {
    let terrain = Terrain::default();
    let mut table = SpawnPointTable::new(vec![special(20.0, 0.0)], SelectorTuning::default(), 1);
    let mut watcher = survivor(1, Vec3::ZERO, Vec3::X);
    watcher.incapacitated = true;

    let mut selection = table.select(Duration::ZERO, std::slice::from_ref(&watcher), &terrain);
    assert_eq!(
        selection.get_spawn_point(SpawnPointKind::Special, true, 0.0),
        None
    );

    watcher.alive = false;
    let mut selection = table.select(Duration::ZERO, std::slice::from_ref(&watcher), &terrain);
    assert_eq!(
        selection.get_spawn_point(SpawnPointKind::Special, true, 0.0),
        Some(Vec3::new(20.0, 0.0, 0.0))
    );
}

#[test]
fn handing_out_a_point_records_its_use() {
    let terrain = Terrain::default();
    let mut table = SpawnPointTable::new(vec![special(40.0, 0.0)], SelectorTuning::default(), 3);
    let characters = [survivor(1, Vec3::ZERO, Vec3::X)];

    let mut selection = table.select(Duration::from_secs(12), &characters, &terrain);
    let _ = selection.get_spawn_point(SpawnPointKind::Special, false, 0.0);

    assert_eq!(table.points()[0].last_used, Some(Duration::from_secs(12)));
}
