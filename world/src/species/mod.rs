//! Per-species state machines dispatched from the shared actor framework.

use glam::Vec3;
use horde_core::{DamageSource, PlayerId, Species};

use crate::{actor::ActorBody, context::Ctx};

mod boomer;
mod charger;
mod common;
mod hunter;
mod smoker;
mod spitter;
mod tank;
mod witch;

/// Mutable fields that only one species needs.
#[derive(Clone, Debug)]
pub(crate) enum SpeciesData {
    Common,
    Hunter(hunter::HunterData),
    Smoker(smoker::SmokerData),
    Boomer,
    Tank(tank::TankData),
    Witch(witch::WitchData),
    Charger(charger::ChargerData),
    Spitter,
}

impl SpeciesData {
    pub(crate) fn for_species(species: Species, position: Vec3) -> Self {
        match species {
            Species::Common => Self::Common,
            Species::Hunter => Self::Hunter(hunter::HunterData::new(position)),
            Species::Smoker => Self::Smoker(smoker::SmokerData::new(position)),
            Species::Boomer => Self::Boomer,
            Species::Tank => Self::Tank(tank::TankData::default()),
            Species::Witch => Self::Witch(witch::WitchData::default()),
            Species::Charger => Self::Charger(charger::ChargerData::default()),
            Species::Spitter => Self::Spitter,
        }
    }

    /// Current frustration, for species that accumulate it.
    pub(crate) fn frustration(&self) -> Option<f32> {
        match self {
            Self::Tank(data) => Some(data.frustration),
            _ => None,
        }
    }
}

pub(crate) fn update(body: &mut ActorBody, data: &mut SpeciesData, dt: f32, ctx: &mut Ctx<'_>) {
    match data {
        SpeciesData::Common => common::update(body, dt, ctx),
        SpeciesData::Hunter(data) => hunter::update(body, data, dt, ctx),
        SpeciesData::Smoker(data) => smoker::update(body, data, dt, ctx),
        SpeciesData::Boomer => boomer::update(body, dt, ctx),
        SpeciesData::Tank(data) => tank::update(body, data, dt, ctx),
        SpeciesData::Witch(data) => witch::update(body, data, dt, ctx),
        SpeciesData::Charger(data) => charger::update(body, data, dt, ctx),
        SpeciesData::Spitter => spitter::update(body, dt, ctx),
    }
}

/// Species reaction to non-lethal damage. Returns `true` when it replaces
/// the default stagger handling.
pub(crate) fn on_damaged(
    body: &mut ActorBody,
    data: &mut SpeciesData,
    source: DamageSource,
    ctx: &mut Ctx<'_>,
) -> bool {
    match data {
        SpeciesData::Witch(_) => witch::on_damaged(body, source, ctx),
        _ => false,
    }
}

pub(crate) fn on_contact(
    body: &mut ActorBody,
    data: &mut SpeciesData,
    player: PlayerId,
    ctx: &mut Ctx<'_>,
) {
    match data {
        SpeciesData::Hunter(_) => hunter::on_contact(body, player, ctx),
        SpeciesData::Charger(_) => charger::on_contact(body, player, ctx),
        _ => {}
    }
}

pub(crate) fn on_death(body: &ActorBody, ctx: &mut Ctx<'_>) {
    if body.species == Species::Boomer {
        boomer::on_death(body, ctx);
    }
}
