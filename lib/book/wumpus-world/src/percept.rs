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

//! What the agent senses each turn.

use serde::{Deserialize, Serialize};

/// Percept is what the Agent senses from the Environment at the start of a turn. It is computed
/// fresh every turn from the agent's cell, its four cardinal neighbours, and the flags raised by
/// the previous action.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Percept {
    /// A pit is in a neighbouring cell.
    pub breeze: bool,

    /// A live wumpus is in a neighbouring cell.
    pub stench: bool,

    /// Gold is in the agent's cell.
    pub glitter: bool,

    /// The previous forward move hit a wall.
    pub bump: bool,

    /// The previous shot killed the wumpus.
    pub scream: bool,
}

impl Percept {
    /// Whether neither a breeze nor a stench is present, i.e. every neighbour is safe.
    pub fn is_calm(&self) -> bool {
        !self.breeze && !self.stench
    }
}

impl std::fmt::Display for Percept {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flags = [
            (self.breeze, "breeze"),
            (self.stench, "stench"),
            (self.glitter, "glitter"),
            (self.bump, "bump"),
            (self.scream, "scream"),
        ];
        let present: Vec<&str> = flags
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| *name)
            .collect();
        if present.is_empty() {
            write!(f, "[none]")
        } else {
            write!(f, "[{}]", present.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_present_signals() {
        let percept = Percept {
            breeze: true,
            glitter: true,
            ..Percept::default()
        };
        assert_eq!(percept.to_string(), "[breeze, glitter]");
        assert_eq!(Percept::default().to_string(), "[none]");
    }

    #[test]
    fn test_calm_ignores_glitter_bump_and_scream() {
        let percept = Percept {
            glitter: true,
            bump: true,
            scream: true,
            ..Percept::default()
        };
        assert!(percept.is_calm());
        assert!(!Percept {
            stench: true,
            ..Percept::default()
        }
        .is_calm());
    }
}
