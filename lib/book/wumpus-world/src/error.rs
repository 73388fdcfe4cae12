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

//! Errors.

use crate::geometry::Position;

/// Invalid world or run configuration. Always surfaced before a simulation starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The board must be at least 2x2.
    #[error("board size must be at least 2, got {0}")]
    BoardTooSmall(usize),

    /// The board is larger than the simulation supports.
    #[error("board size must be at most {max}, got {0}", max = crate::config::MAX_BOARD_SIZE)]
    BoardTooLarge(usize),

    /// Pit probability is NaN or outside [0, 1].
    #[error("pit probability must be within [0, 1], got {0}")]
    PitProbabilityOutOfRange(f64),

    /// A run needs at least one step.
    #[error("step limit must be at least 1, got {0}")]
    StepLimitTooSmall(usize),

    /// A layout position does not fit on the board.
    #[error("position {position} is outside a {board_size}x{board_size} board")]
    OutOfBounds {
        /// Offending position.
        position: Position,
        /// Board size.
        board_size: usize,
    },

    /// Hazards and gold may not be placed on the start cell.
    #[error("position {0} is the start cell and must stay empty")]
    OnStartCell(Position),

    /// Two contents were placed on the same cell.
    #[error("position {0} already holds something else")]
    Overlap(Position),
}

/// Top level error for running a Wumpus World episode.
#[derive(Debug, thiserror::Error)]
pub enum WumpusError {
    /// Configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The agent's belief or decision step reached a state that should be unreachable. This is a
    /// logic defect and is never recovered from.
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),

    /// An interactive agent ran out of input before the run finished.
    #[error("input closed before the run finished")]
    InputClosed,

    /// The player asked to stop. Not a failure, the run just has no outcome.
    #[error("player quit")]
    Quit,

    /// Reading interactive input failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
