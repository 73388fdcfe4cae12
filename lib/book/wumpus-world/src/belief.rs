/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

//! The agent's belief about every cell, derived by deterministic constraint propagation over
//! everything it has sensed so far.
//!
//! Each cell carries one hypothesis per hazard kind. Evidence only ever adds exclusions, so a
//! full re-derivation after each observation refines labels and never returns a cell to unknown.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry::Position;
use crate::percept::Percept;

/// Inferred label for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeliefLabel {
    /// Nothing is known.
    Unknown,

    /// Neither a pit nor a live wumpus.
    Safe,

    /// A neighbouring breeze allows a pit here.
    PossiblyPit,

    /// A neighbouring stench allows the wumpus here.
    PossiblyWumpus,

    /// Known to hold a pit or the live wumpus.
    ConfirmedHazard,
}

impl BeliefLabel {
    /// How certain the label is: unknown < possibly-* < safe or confirmed.
    pub fn certainty(&self) -> u8 {
        match self {
            BeliefLabel::Unknown => 0,
            BeliefLabel::PossiblyPit | BeliefLabel::PossiblyWumpus => 1,
            BeliefLabel::Safe | BeliefLabel::ConfirmedHazard => 2,
        }
    }

    /// Whether the label is one of the possibly-* hazards.
    pub fn is_possible_hazard(&self) -> bool {
        matches!(self, BeliefLabel::PossiblyPit | BeliefLabel::PossiblyWumpus)
    }
}

/// State of one hazard hypothesis for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Hypothesis {
    Open,
    Excluded,
    Suspected,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BeliefCell {
    pit: Hypothesis,
    wumpus: Hypothesis,
    risk: u32,
}

impl BeliefCell {
    const UNKNOWN: BeliefCell = BeliefCell {
        pit: Hypothesis::Open,
        wumpus: Hypothesis::Open,
        risk: 0,
    };

    fn label(&self) -> BeliefLabel {
        use Hypothesis::*;
        match (self.pit, self.wumpus) {
            (Confirmed, _) | (_, Confirmed) => BeliefLabel::ConfirmedHazard,
            (Excluded, Excluded) => BeliefLabel::Safe,
            (_, Suspected) => BeliefLabel::PossiblyWumpus,
            (Suspected, _) => BeliefLabel::PossiblyPit,
            _ => BeliefLabel::Unknown,
        }
    }
}

/// Breeze and stench sensed at a visited cell. Repeated observations of a cell are merged so
/// that a calm reading wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Observation {
    breeze: bool,
    stench: bool,
}

/// Dense belief map over a `board_size` x `board_size` board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeliefMap {
    board_size: usize,
    cells: Vec<BeliefCell>,

    // Evidence the cells are re-derived from.
    visited: FxHashSet<Position>,
    observations: FxHashMap<Position, Observation>,
    wumpus_free_lanes: FxHashSet<Position>,
    wumpus_dead: bool,
    wumpus_location: Option<Position>,
}

impl BeliefMap {
    /// A fresh map where only the start cell is known to be safe.
    pub fn new(board_size: usize) -> Self {
        let mut visited = FxHashSet::default();
        visited.insert(Position::START);
        let mut map = Self {
            board_size,
            cells: vec![BeliefCell::UNKNOWN; board_size * board_size],
            visited,
            observations: FxHashMap::default(),
            wumpus_free_lanes: FxHashSet::default(),
            wumpus_dead: false,
            wumpus_location: None,
        };
        map.rederive();
        map
    }

    /// Board is `board_size` x `board_size`.
    pub fn board_size(&self) -> usize {
        self.board_size
    }

    /// Label of a cell.
    pub fn label(&self, position: Position) -> BeliefLabel {
        self.cell(position).label()
    }

    /// Whether the cell is known to be safe.
    pub fn is_safe(&self, position: Position) -> bool {
        self.label(position) == BeliefLabel::Safe
    }

    /// Whether the live wumpus might be in the cell, suspected or confirmed.
    pub fn may_hold_wumpus(&self, position: Position) -> bool {
        matches!(
            self.cell(position).wumpus,
            Hypothesis::Suspected | Hypothesis::Confirmed
        )
    }

    /// Number of breeze and stench readings that still implicate the cell. Zero for safe cells.
    pub fn risk(&self, position: Position) -> u32 {
        self.cell(position).risk
    }

    /// Whether the cell has been entered.
    pub fn is_visited(&self, position: Position) -> bool {
        self.visited.contains(&position)
    }

    /// Whether a scream was heard.
    pub fn wumpus_dead(&self) -> bool {
        self.wumpus_dead
    }

    /// Fold a percept sensed at `position` into the map and re-derive every cell.
    pub fn observe(&mut self, position: Position, percept: &Percept) {
        self.visited.insert(position);
        let observation = Observation {
            breeze: percept.breeze,
            stench: percept.stench,
        };
        self.observations
            .entry(position)
            .and_modify(|o| {
                o.breeze &= observation.breeze;
                o.stench &= observation.stench;
            })
            .or_insert(observation);
        if percept.scream {
            self.wumpus_dead = true;
        }
        self.rederive();
    }

    /// An arrow flew through these cells without a scream, so none of them holds the wumpus.
    pub fn clear_wumpus_lane(&mut self, lane: impl IntoIterator<Item = Position>) {
        self.wumpus_free_lanes.extend(lane);
        self.rederive();
    }

    /// All positions, row by row from the south.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let size = self.board_size;
        (0..size).flat_map(move |y| (0..size).map(move |x| Position::new(x, y)))
    }

    fn index(&self, position: Position) -> usize {
        debug_assert!(position.in_bounds(self.board_size));
        position.y * self.board_size + position.x
    }

    fn cell(&self, position: Position) -> &BeliefCell {
        &self.cells[self.index(position)]
    }

    fn cell_mut(&mut self, position: Position) -> &mut BeliefCell {
        let index = self.index(position);
        &mut self.cells[index]
    }

    fn rederive(&mut self) {
        let size = self.board_size;
        self.cells = vec![BeliefCell::UNKNOWN; size * size];

        let mut observations: Vec<(Position, Observation)> =
            self.observations.iter().map(|(p, o)| (*p, *o)).collect();
        observations.sort_unstable_by_key(|(p, _)| *p);
        let stenches: Vec<Position> = observations
            .iter()
            .filter(|(_, o)| o.stench)
            .map(|(p, _)| *p)
            .collect();

        // Facts that hold regardless of neighbours.
        let visited: Vec<Position> = self.visited.iter().copied().collect();
        for position in visited {
            let cell = self.cell_mut(position);
            cell.pit = Hypothesis::Excluded;
            cell.wumpus = Hypothesis::Excluded;
        }
        let lanes: Vec<Position> = self.wumpus_free_lanes.iter().copied().collect();
        for position in lanes {
            self.cell_mut(position).wumpus = Hypothesis::Excluded;
        }
        if let Some(position) = self.wumpus_location {
            // A cell never holds both a pit and the wumpus.
            self.cell_mut(position).pit = Hypothesis::Excluded;
        }
        let positions: Vec<Position> = self.positions().collect();
        for &position in &positions {
            let excluded = self.wumpus_dead
                // There is exactly one wumpus, so it neighbours every stench.
                || stenches.iter().any(|s| s.manhattan(&position) != 1);
            if excluded {
                self.cell_mut(position).wumpus = Hypothesis::Excluded;
            }
        }

        // Calm readings clear the neighbours.
        for (position, observation) in &observations {
            for neighbour in position.neighbours(size) {
                let cell = self.cell_mut(neighbour);
                if !observation.breeze {
                    cell.pit = Hypothesis::Excluded;
                }
                if !observation.stench {
                    cell.wumpus = Hypothesis::Excluded;
                }
            }
        }

        // A reading with exactly one remaining candidate confirms it.
        loop {
            let mut changed = false;
            for (position, observation) in &observations {
                if observation.breeze {
                    changed |= self.confirm_single_candidate(*position, HazardKind::Pit);
                }
                if observation.stench && !self.wumpus_dead {
                    changed |= self.confirm_single_candidate(*position, HazardKind::Wumpus);
                }
            }
            if !changed {
                break;
            }
        }
        if let Some(location) = self.wumpus_location {
            let dead = self.wumpus_dead;
            for &position in &positions {
                let cell = self.cell_mut(position);
                if position != location || dead {
                    cell.wumpus = Hypothesis::Excluded;
                } else {
                    cell.wumpus = Hypothesis::Confirmed;
                }
            }
        }

        // Whatever is still open next to a breeze or stench is suspected.
        for (position, observation) in &observations {
            for neighbour in position.neighbours(size) {
                let cell = self.cell_mut(neighbour);
                if observation.breeze && cell.pit != Hypothesis::Excluded {
                    if cell.pit == Hypothesis::Open {
                        cell.pit = Hypothesis::Suspected;
                    }
                    cell.risk += 1;
                }
                if observation.stench && cell.wumpus != Hypothesis::Excluded {
                    if cell.wumpus == Hypothesis::Open {
                        cell.wumpus = Hypothesis::Suspected;
                    }
                    cell.risk += 1;
                }
            }
        }

        debug!(
            safe = self.cells.iter().filter(|c| c.label() == BeliefLabel::Safe).count(),
            wumpus_dead = self.wumpus_dead,
            "re-derived belief map"
        );
    }

    fn confirm_single_candidate(&mut self, observed: Position, kind: HazardKind) -> bool {
        let candidates: Vec<Position> = observed
            .neighbours(self.board_size)
            .filter(|n| kind.hypothesis(self.cell(*n)) != Hypothesis::Excluded)
            .collect();
        match candidates.as_slice() {
            [only] => {
                let only = *only;
                let cell = self.cell_mut(only);
                if kind.hypothesis(cell) == Hypothesis::Confirmed {
                    return false;
                }
                match kind {
                    HazardKind::Pit => {
                        cell.pit = Hypothesis::Confirmed;
                        cell.wumpus = Hypothesis::Excluded;
                    }
                    HazardKind::Wumpus => {
                        cell.wumpus = Hypothesis::Confirmed;
                        cell.pit = Hypothesis::Excluded;
                        self.wumpus_location = Some(only);
                        for position in self.positions().collect::<Vec<_>>() {
                            if position != only {
                                self.cell_mut(position).wumpus = Hypothesis::Excluded;
                            }
                        }
                    }
                }
                debug!(?kind, position = %only, "confirmed hazard");
                true
            }
            [] => {
                warn!(?kind, position = %observed, "reading has no possible source");
                false
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HazardKind {
    Pit,
    Wumpus,
}

impl HazardKind {
    fn hypothesis(&self, cell: &BeliefCell) -> Hypothesis {
        match self {
            HazardKind::Pit => cell.pit,
            HazardKind::Wumpus => cell.wumpus,
        }
    }
}

// Same orientation as the board: north on top, start cell bottom left.
impl std::fmt::Display for BeliefMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for y in (0..self.board_size).rev() {
            for x in 0..self.board_size {
                let c = match self.label(Position::new(x, y)) {
                    BeliefLabel::Unknown => '?',
                    BeliefLabel::Safe => '.',
                    BeliefLabel::PossiblyPit => 'p',
                    BeliefLabel::PossiblyWumpus => 'w',
                    BeliefLabel::ConfirmedHazard => 'X',
                };
                write!(f, "{}", c)?;
            }
            if y > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::action::Action;
    use crate::environment::WumpusWorld;
    use crate::Environment;

    fn breeze() -> Percept {
        Percept {
            breeze: true,
            ..Percept::default()
        }
    }

    fn stench() -> Percept {
        Percept {
            stench: true,
            ..Percept::default()
        }
    }

    #[test]
    fn test_start_cell_is_safe_and_rest_unknown() {
        let map = BeliefMap::new(4);
        assert_eq!(map.label(Position::START), BeliefLabel::Safe);
        assert_eq!(map.label(Position::new(1, 0)), BeliefLabel::Unknown);
        assert_eq!(map.label(Position::new(3, 3)), BeliefLabel::Unknown);
    }

    #[test]
    fn test_calm_percept_marks_neighbours_safe() {
        let mut map = BeliefMap::new(4);
        map.observe(Position::START, &Percept::default());
        assert!(map.is_safe(Position::new(1, 0)));
        assert!(map.is_safe(Position::new(0, 1)));
        assert_eq!(map.label(Position::new(1, 1)), BeliefLabel::Unknown);
    }

    #[test]
    fn test_breeze_marks_unknown_neighbours_possibly_pit() {
        let mut map = BeliefMap::new(4);
        map.observe(Position::START, &breeze());
        assert_eq!(map.label(Position::new(1, 0)), BeliefLabel::PossiblyPit);
        assert_eq!(map.label(Position::new(0, 1)), BeliefLabel::PossiblyPit);
        assert_eq!(map.risk(Position::new(1, 0)), 1);
        assert_eq!(map.label(Position::START), BeliefLabel::Safe);
    }

    #[test]
    fn test_safe_overrides_possible_hazard() {
        let mut map = BeliefMap::new(4);
        // breeze at the start, calm at (1, 0): (1, 1) and (2, 0) are pit free, (0, 1) is the pit.
        map.observe(Position::START, &breeze());
        map.observe(Position::new(1, 0), &Percept::default());
        assert!(map.is_safe(Position::new(1, 1)));
        assert!(map.is_safe(Position::new(2, 0)));
        assert_eq!(
            map.label(Position::new(0, 1)),
            BeliefLabel::ConfirmedHazard
        );
    }

    #[test]
    fn test_stench_from_two_cells_confirms_wumpus() {
        let mut map = BeliefMap::new(4);
        map.observe(Position::START, &Percept::default());
        map.observe(Position::new(1, 0), &stench());
        assert_eq!(
            map.label(Position::new(2, 0)),
            BeliefLabel::PossiblyWumpus
        );
        assert_eq!(
            map.label(Position::new(1, 1)),
            BeliefLabel::PossiblyWumpus
        );
        map.observe(Position::new(0, 1), &stench());
        // only (1, 1) neighbours both stenches
        assert_eq!(
            map.label(Position::new(1, 1)),
            BeliefLabel::ConfirmedHazard
        );
        assert!(map.is_safe(Position::new(2, 0)));
        assert!(map.may_hold_wumpus(Position::new(1, 1)));
    }

    #[test]
    fn test_scream_clears_the_wumpus() {
        let mut map = BeliefMap::new(4);
        map.observe(Position::START, &Percept::default());
        map.observe(Position::new(1, 0), &stench());
        map.observe(Position::new(0, 1), &stench());
        assert_eq!(
            map.label(Position::new(1, 1)),
            BeliefLabel::ConfirmedHazard
        );

        let scream = Percept {
            scream: true,
            ..Percept::default()
        };
        map.observe(Position::new(0, 1), &scream);
        assert!(map.wumpus_dead());
        assert!(map.is_safe(Position::new(1, 1)));
        assert!(!map.may_hold_wumpus(Position::new(1, 1)));
    }

    #[test]
    fn test_located_wumpus_stays_confirmed_until_killed() {
        let mut map = BeliefMap::new(4);
        map.observe(Position::START, &Percept::default());
        map.observe(Position::new(1, 0), &stench());
        map.observe(Position::new(0, 1), &stench());
        map.observe(Position::new(0, 2), &Percept::default());
        assert_eq!(
            map.label(Position::new(1, 1)),
            BeliefLabel::ConfirmedHazard
        );
        assert!(map.may_hold_wumpus(Position::new(1, 1)));
        assert!(!map.may_hold_wumpus(Position::new(3, 3)));

        let scream = Percept {
            scream: true,
            ..Percept::default()
        };
        map.observe(Position::new(0, 2), &scream);
        assert!(map.positions().all(|p| !map.may_hold_wumpus(p)));
        assert_eq!(map.label(Position::new(1, 1)), BeliefLabel::Safe);
    }

    #[test]
    fn test_missed_lane_clears_wumpus_suspicion() {
        let mut map = BeliefMap::new(4);
        map.observe(Position::START, &stench());
        map.clear_wumpus_lane([Position::new(1, 0), Position::new(2, 0), Position::new(3, 0)]);
        assert!(map.is_safe(Position::new(1, 0)));
        assert_eq!(
            map.label(Position::new(0, 1)),
            BeliefLabel::ConfirmedHazard
        );
    }

    #[test]
    fn test_observe_is_idempotent() {
        let mut map = BeliefMap::new(4);
        map.observe(Position::START, &Percept::default());
        map.observe(Position::new(1, 0), &breeze());
        let once = map.clone();
        map.observe(Position::new(1, 0), &breeze());
        assert_eq!(map, once);
    }

    #[test]
    fn test_display() {
        let mut map = BeliefMap::new(3);
        map.observe(Position::START, &breeze());
        assert_eq!(map.to_string(), "???\np??\n.p?");
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            3 => Just(Action::Forward),
            1 => Just(Action::TurnLeft),
            1 => Just(Action::TurnRight),
            1 => Just(Action::Shoot),
        ]
    }

    proptest! {
        // Walk a random board with random actions, feeding every percept in, and check that no
        // label ever loses certainty.
        #[test]
        fn test_labels_only_strengthen(
            seed in any::<u64>(),
            pit_probability in 0.0..0.4f64,
            actions in prop::collection::vec(action(), 0..80),
        ) {
            let mut world = WumpusWorld::initialize(Some(seed), 5, pit_probability)
                .expect("valid config");
            let mut map = BeliefMap::new(5);
            map.observe(world.agent().position, &world.percept());

            for action in actions {
                if !world.agent().alive {
                    break;
                }
                let before = map.clone();
                world.apply(action);
                if !world.agent().alive {
                    break;
                }
                map.observe(world.agent().position, &world.percept());

                prop_assert_eq!(map.label(Position::START), BeliefLabel::Safe);
                for position in map.positions() {
                    let old = before.label(position);
                    let new = map.label(position);
                    prop_assert!(new.certainty() >= old.certainty(), "{} went from {:?} to {:?}", position, old, new);
                    if old != BeliefLabel::Unknown {
                        prop_assert_ne!(new, BeliefLabel::Unknown);
                    }
                }
                // a safe label is never wrong
                for position in map.positions() {
                    if map.is_safe(position) {
                        prop_assert!(!world.get(position).is_deadly(), "{} labelled safe", position);
                    }
                }
            }
        }
    }
}
