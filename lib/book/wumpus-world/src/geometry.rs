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

//! Cells and compass directions on the square board.

use serde::{Deserialize, Serialize};

/// A cell on the board. (0, 0) is the start cell in the south west corner, x grows towards the
/// east and y grows towards the north.
///
/// The derived ordering is lexicographic on (x, y), which is the final tie-break the agent uses
/// when choosing between equally good cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column, from west to east.
    pub x: usize,

    /// Row, from south to north.
    pub y: usize,
}

impl Position {
    /// The start cell. The agent enters and leaves the cave here.
    pub const START: Position = Position { x: 0, y: 0 };

    /// Create a new position.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Whether the position lies on a `board_size` x `board_size` board.
    pub fn in_bounds(&self, board_size: usize) -> bool {
        self.x < board_size && self.y < board_size
    }

    /// Manhattan distance between two positions.
    pub fn manhattan(&self, other: &Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The neighbouring cell in `direction`, or None if that would leave the board.
    pub fn step(&self, direction: Direction, board_size: usize) -> Option<Position> {
        let (dx, dy) = direction.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        let next = Position { x, y };
        next.in_bounds(board_size).then_some(next)
    }

    /// The cardinal neighbours that are on the board, in `Direction::ALL` order.
    pub fn neighbours(&self, board_size: usize) -> impl Iterator<Item = Position> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |d| self.step(d, board_size))
    }

    /// The direction that leads from `self` to an adjacent `other`, if they are adjacent.
    pub fn direction_to(&self, other: &Position) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| {
            let (dx, dy) = d.delta();
            self.x.checked_add_signed(dx) == Some(other.x)
                && self.y.checked_add_signed(dy) == Some(other.y)
        })
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Compass direction the agent faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards larger y.
    North,

    /// Towards larger x.
    East,

    /// Towards smaller y.
    South,

    /// Towards smaller x.
    West,
}

impl Direction {
    /// All directions, clockwise from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit step (dx, dy) for this direction.
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    /// Direction after a quarter turn counter-clockwise.
    pub fn left(&self) -> Direction {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
        }
    }

    /// Direction after a quarter turn clockwise.
    pub fn right(&self) -> Direction {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::North => write!(f, "north"),
            Direction::East => write!(f, "east"),
            Direction::South => write!(f, "south"),
            Direction::West => write!(f, "west"),
        }
    }
}
