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

//! The agent's model of its own body.

use serde::{Deserialize, Serialize};

use crate::action::{ActionResult, StateChange};
use crate::geometry::{Direction, Position};

/// Arrows the agent enters the cave with.
pub const STARTING_ARROWS: u32 = 1;

/// Physical state of the agent. The Environment keeps the authoritative copy; the agent keeps its
/// own copy and folds every ActionResult into it, so both stay in step without the agent ever
/// touching the Environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    /// Current cell.
    pub position: Position,

    /// Facing direction.
    pub facing: Direction,

    /// Arrows left.
    pub arrows: u32,

    /// False once the agent walked into a pit or a live wumpus.
    pub alive: bool,

    /// True once gold was picked up.
    pub has_gold: bool,

    /// True once the agent climbed out of the cave.
    pub climbed_out: bool,

    /// Every cell entered, in order, starting with the start cell. Append only.
    pub visited: Vec<Position>,
}

impl Default for AgentState {
    fn default() -> Self {
        Self {
            position: Position::START,
            facing: Direction::East,
            arrows: STARTING_ARROWS,
            alive: true,
            has_gold: false,
            climbed_out: false,
            visited: vec![Position::START],
        }
    }
}

impl AgentState {
    /// Whether the agent can still act.
    pub fn is_active(&self) -> bool {
        self.alive && !self.climbed_out
    }

    /// Apply the state changes reported by an ActionResult.
    pub fn record(&mut self, result: &ActionResult) {
        for change in &result.changes {
            match *change {
                StateChange::Moved { to, .. } => {
                    self.position = to;
                    self.visited.push(to);
                }
                StateChange::Turned { facing } => self.facing = facing,
                StateChange::ArrowFired => self.arrows = self.arrows.saturating_sub(1),
                StateChange::WumpusKilled { .. } => {}
                StateChange::GoldGrabbed { .. } => self.has_gold = true,
                StateChange::ClimbedOut => self.climbed_out = true,
            }
        }
        if result.died {
            self.alive = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;

    #[test]
    fn test_default_state_is_at_start_facing_east_with_one_arrow() {
        let state = AgentState::default();
        assert_eq!(state.position, Position::START);
        assert_eq!(state.facing, Direction::East);
        assert_eq!(state.arrows, 1);
        assert_eq!(state.visited, vec![Position::START]);
        assert!(state.is_active());
    }

    #[test]
    fn test_record_move_appends_visited() {
        let mut state = AgentState::default();
        let result = ActionResult::success(
            Action::Forward,
            vec![StateChange::Moved {
                from: Position::START,
                to: Position::new(1, 0),
            }],
        );
        state.record(&result);
        assert_eq!(state.position, Position::new(1, 0));
        assert_eq!(state.visited, vec![Position::START, Position::new(1, 0)]);
    }

    #[test]
    fn test_record_no_op_changes_nothing() {
        let mut state = AgentState::default();
        let before = state.clone();
        state.record(&ActionResult::no_op(Action::Shoot));
        assert_eq!(state, before);
    }

    #[test]
    fn test_record_death_deactivates() {
        let mut state = AgentState::default();
        let mut result = ActionResult::success(
            Action::Forward,
            vec![StateChange::Moved {
                from: Position::START,
                to: Position::new(0, 1),
            }],
        );
        result.died = true;
        state.record(&result);
        assert!(!state.alive);
        assert!(!state.is_active());
    }
}
