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

//! Actions the agent can take and what executing them did.

use serde::{Deserialize, Serialize};

use crate::geometry::{Direction, Position};

/// Everything the agent can do in a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Move one cell in the facing direction.
    Forward,

    /// Quarter turn counter-clockwise.
    TurnLeft,

    /// Quarter turn clockwise.
    TurnRight,

    /// Fire the arrow in the facing direction.
    Shoot,

    /// Pick up gold in the current cell.
    Grab,

    /// Leave the cave. Only works on the start cell.
    Climb,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Forward => write!(f, "Forward"),
            Action::TurnLeft => write!(f, "TurnLeft"),
            Action::TurnRight => write!(f, "TurnRight"),
            Action::Shoot => write!(f, "Shoot"),
            Action::Grab => write!(f, "Grab"),
            Action::Climb => write!(f, "Climb"),
        }
    }
}

/// A single change to world or agent state caused by an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateChange {
    /// The agent moved between cells.
    Moved {
        /// Cell the agent left.
        from: Position,
        /// Cell the agent entered.
        to: Position,
    },

    /// The agent now faces a new direction.
    Turned {
        /// New facing.
        facing: Direction,
    },

    /// The agent used up an arrow.
    ArrowFired,

    /// The arrow killed the wumpus.
    WumpusKilled {
        /// Where the wumpus was.
        at: Position,
    },

    /// Gold was picked up.
    GoldGrabbed {
        /// Where the gold was.
        at: Position,
    },

    /// The agent left the cave.
    ClimbedOut,
}

/// The Environment's answer to an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionResult {
    /// The action that was attempted.
    pub action: Action,

    /// False for no-ops: walking into a wall, shooting without arrows, grabbing nothing, climbing
    /// away from the start cell, or acting after the run ended.
    pub succeeded: bool,

    /// State changes in the order they happened. Empty for no-ops.
    pub changes: Vec<StateChange>,

    /// The forward move hit a wall.
    pub bump: bool,

    /// The agent walked into a pit or a live wumpus.
    pub died: bool,
}

impl ActionResult {
    pub(crate) fn no_op(action: Action) -> Self {
        Self {
            action,
            succeeded: false,
            changes: Vec::new(),
            bump: false,
            died: false,
        }
    }

    pub(crate) fn success(action: Action, changes: Vec<StateChange>) -> Self {
        Self {
            action,
            succeeded: true,
            changes,
            bump: false,
            died: false,
        }
    }

    /// Whether the wumpus was killed by this action.
    pub fn killed_wumpus(&self) -> bool {
        self.changes
            .iter()
            .any(|c| matches!(c, StateChange::WumpusKilled { .. }))
    }

    /// Whether gold was picked up by this action.
    pub fn grabbed_gold(&self) -> bool {
        self.changes
            .iter()
            .any(|c| matches!(c, StateChange::GoldGrabbed { .. }))
    }

    /// Whether an arrow was used by this action.
    pub fn fired_arrow(&self) -> bool {
        self.changes.contains(&StateChange::ArrowFired)
    }

    /// Whether the agent left the cave with this action.
    pub fn climbed_out(&self) -> bool {
        self.changes.contains(&StateChange::ClimbedOut)
    }
}
