#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn point table and the selection policy handed to the director.
//!
//! The table owns every candidate point and its last-used time. Each tick the
//! session borrows a [`Selection`] from it, binding the current time, the
//! character roster and the line-of-sight query, and passes that to the
//! director as its [`SpawnPointProvider`].

use std::time::Duration;

use horde_core::{
    CharacterSnapshot, LineOfSight, SpawnPoint, SpawnPointKind, SpawnPointProvider, Vec3,
};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Distances that constrain where actors may appear.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorTuning {
    /// Distance up to which a character can see a point.
    pub view_distance: f32,
    /// Points closer than this to any character are never used.
    pub min_player_distance: f32,
}

impl SelectorTuning {
    /// Reports whether both distances are finite and non-negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.view_distance, self.min_player_distance]
            .iter()
            .all(|value| value.is_finite() && *value >= 0.0)
    }
}

impl Default for SelectorTuning {
    fn default() -> Self {
        Self {
            view_distance: 50.0,
            min_player_distance: 8.0,
        }
    }
}

/// Candidate spawn locations with their usage history.
#[derive(Debug)]
pub struct SpawnPointTable {
    points: Vec<SpawnPoint>,
    tuning: SelectorTuning,
    rng: ChaCha8Rng,
}

impl SpawnPointTable {
    /// Creates a table from the provided points. Non-finite points are dropped.
    #[must_use]
    pub fn new(points: Vec<SpawnPoint>, tuning: SelectorTuning, seed: u64) -> Self {
        let mut table = Self {
            points: Vec::with_capacity(points.len()),
            tuning,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        for point in points {
            let _ = table.insert(point);
        }
        table
    }

    /// Adds a point, returning `false` when its position is not finite.
    pub fn insert(&mut self, point: SpawnPoint) -> bool {
        if !point.position.is_finite() {
            return false;
        }
        self.points.push(point);
        true
    }

    /// Every registered point.
    #[must_use]
    pub fn points(&self) -> &[SpawnPoint] {
        &self.points
    }

    /// Distances used to filter candidates.
    #[must_use]
    pub const fn tuning(&self) -> &SelectorTuning {
        &self.tuning
    }

    /// Binds the current tick's views, producing a [`SpawnPointProvider`].
    pub fn select<'a>(
        &'a mut self,
        now: Duration,
        characters: &'a [CharacterSnapshot],
        sight: &'a dyn LineOfSight,
    ) -> Selection<'a> {
        Selection {
            table: self,
            now,
            characters,
            sight,
        }
    }
}

/// Spawn point selection bound to a single tick.
pub struct Selection<'a> {
    table: &'a mut SpawnPointTable,
    now: Duration,
    characters: &'a [CharacterSnapshot],
    sight: &'a dyn LineOfSight,
}

impl Selection<'_> {
    fn watchers(&self) -> impl Iterator<Item = &CharacterSnapshot> {
        self.characters
            .iter()
            .filter(|character| character.is_targetable())
    }

    fn too_close(&self, position: Vec3) -> bool {
        let min = self.table.tuning.min_player_distance;
        self.watchers()
            .any(|character| character.position.distance(position) < min)
    }

    fn visible(&self, position: Vec3) -> bool {
        let range = self.table.tuning.view_distance;
        self.watchers().any(|character| {
            character.position.distance(position) <= range
                && self.sight.has_line_of_sight(character.position, position)
        })
    }

    fn behind_nearest(&self, position: Vec3) -> bool {
        let nearest = self.watchers().min_by(|a, b| {
            a.position
                .distance_squared(position)
                .total_cmp(&b.position.distance_squared(position))
        });
        nearest.is_some_and(|character| {
            character.facing.dot(position - character.position) < 0.0
        })
    }

    fn least_recently_used(&mut self, pool: &[usize]) -> Option<usize> {
        let oldest = pool
            .iter()
            .map(|&index| self.table.points[index].last_used)
            .min()?;
        let ties: Vec<usize> = pool
            .iter()
            .copied()
            .filter(|&index| self.table.points[index].last_used == oldest)
            .collect();
        ties.choose(&mut self.table.rng).copied()
    }
}

impl SpawnPointProvider for Selection<'_> {
    fn get_spawn_point(
        &mut self,
        kind: SpawnPointKind,
        exclude_visible_to_any_player: bool,
        prefer_behind_player_ratio: f32,
    ) -> Option<Vec3> {
        let candidates: Vec<usize> = self
            .table
            .points
            .iter()
            .enumerate()
            .filter(|(_, point)| point.kind == kind)
            .filter(|(_, point)| !self.too_close(point.position))
            .filter(|(_, point)| !(exclude_visible_to_any_player && self.visible(point.position)))
            .map(|(index, _)| index)
            .collect();
        if candidates.is_empty() {
            trace!(?kind, "no eligible spawn point");
            return None;
        }

        let (behind, ahead): (Vec<usize>, Vec<usize>) = candidates
            .iter()
            .partition(|&&index| self.behind_nearest(self.table.points[index].position));
        let ratio = if prefer_behind_player_ratio.is_finite() {
            f64::from(prefer_behind_player_ratio.clamp(0.0, 1.0))
        } else {
            0.0
        };
        let want_behind = self.table.rng.gen_bool(ratio);
        let pool = match (want_behind, behind.is_empty(), ahead.is_empty()) {
            (true, false, _) | (false, false, true) => behind,
            _ => ahead,
        };

        let index = self.least_recently_used(&pool)?;
        let point = &mut self.table.points[index];
        point.last_used = Some(self.now);
        Some(point.position)
    }
}

#[cfg(test)]
mod tests {
    use horde_core::PlayerId;

    use super::*;

    struct ClearSight;

    impl LineOfSight for ClearSight {
        fn has_line_of_sight(&self, _: Vec3, _: Vec3) -> bool {
            true
        }
    }

    #[test]
    fn least_recently_used_point_wins() {
        let mut table = SpawnPointTable::new(
            vec![
                SpawnPoint::new(Vec3::new(-100.0, 0.0, 10.0), SpawnPointKind::Common),
                SpawnPoint::new(Vec3::new(-100.0, 0.0, -10.0), SpawnPointKind::Common),
            ],
            SelectorTuning::default(),
            5,
        );
        let characters = [CharacterSnapshot {
            id: PlayerId::new(1),
            position: Vec3::ZERO,
            facing: Vec3::X,
            alive: true,
            incapacitated: false,
        }];

        let mut picked = Vec::new();
        for second in 0..4 {
            let mut selection =
                table.select(Duration::from_secs(second), &characters, &ClearSight);
            picked.push(selection.get_spawn_point(SpawnPointKind::Common, false, 1.0));
        }

        assert_ne!(picked[0], picked[1]);
        assert_eq!(picked[0], picked[2]);
        assert_eq!(picked[1], picked[3]);
    }

    #[test]
    fn non_finite_points_are_not_registered() {
        let mut table = SpawnPointTable::new(Vec::new(), SelectorTuning::default(), 1);
        assert!(!table.insert(SpawnPoint::new(
            Vec3::splat(f32::NAN),
            SpawnPointKind::Special
        )));
        assert!(table.points().is_empty());
    }
}
