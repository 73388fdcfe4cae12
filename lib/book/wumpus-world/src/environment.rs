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

//! The cave. Owns the board and resolves every action.

use rand::Rng as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::action::{Action, ActionResult, StateChange};
use crate::config::{validate_board_size, validate_pit_probability, Rng, WorldConfig};
use crate::error::ConfigError;
use crate::geometry::Position;
use crate::percept::Percept;
use crate::state::AgentState;
use crate::Environment;

/// Performance measure: every action costs this much.
pub const ACTION_COST: i32 = -1;

/// Performance measure: extra cost of firing the arrow.
pub const ARROW_COST: i32 = -10;

/// Performance measure: reward for picking up gold.
pub const GOLD_REWARD: i32 = 1000;

/// Performance measure: penalty for dying.
pub const DEATH_PENALTY: i32 = -1000;

/// What a single cell holds. At most one thing per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellContent {
    /// Nothing.
    Empty,

    /// The live wumpus. A killed wumpus leaves the cell empty.
    Wumpus,

    /// A bottomless pit.
    Pit,

    /// The gold.
    Gold,
}

impl CellContent {
    /// Entering this cell kills the agent.
    pub fn is_deadly(&self) -> bool {
        matches!(self, CellContent::Wumpus | CellContent::Pit)
    }
}

/// The cave. Owns the board and the authoritative agent state, and is the only thing that
/// computes percepts and resolves actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WumpusWorld {
    board_size: usize,
    cells: Vec<CellContent>,
    agent: AgentState,
    initial_gold: usize,

    // Raised by the most recent action, reported by the next percept.
    bump: bool,
    scream: bool,
}

impl WumpusWorld {
    fn empty(board_size: usize) -> Self {
        Self {
            board_size,
            cells: vec![CellContent::Empty; board_size * board_size],
            agent: AgentState::default(),
            initial_gold: 0,
            bump: false,
            scream: false,
        }
    }

    /// Generate a random board. A fixed `seed` reproduces the same board; None draws from OS
    /// entropy.
    pub fn initialize(
        seed: Option<u64>,
        board_size: usize,
        pit_probability: f64,
    ) -> Result<Self, ConfigError> {
        let config = WorldConfig {
            board_size,
            pit_probability,
            seed,
            ..WorldConfig::default()
        };
        Self::generate(board_size, pit_probability, &mut config.rng())
    }

    /// Generate a board from a whole configuration.
    pub fn from_config(config: &WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::generate(config.board_size, config.pit_probability, &mut config.rng())
    }

    /// Generate a random board from an existing generator.
    ///
    /// One wumpus goes on a uniformly chosen cell other than the start cell, then one gold on a
    /// different such cell, then every remaining cell other than the start cell holds a pit with
    /// probability `pit_probability`.
    pub fn generate(
        board_size: usize,
        pit_probability: f64,
        rng: &mut Rng,
    ) -> Result<Self, ConfigError> {
        validate_board_size(board_size)?;
        validate_pit_probability(pit_probability)?;

        let mut world = Self::empty(board_size);
        let mut candidates: Vec<Position> = world
            .positions()
            .filter(|p| *p != Position::START)
            .collect();

        let wumpus = candidates.swap_remove(rng.gen_range(0..candidates.len()));
        world.set(wumpus, CellContent::Wumpus);

        let gold = candidates.swap_remove(rng.gen_range(0..candidates.len()));
        world.set(gold, CellContent::Gold);
        world.initial_gold = 1;

        // swap_remove scrambles the order, sort so pits depend only on the rng stream.
        candidates.sort_unstable();
        for position in candidates {
            if rng.gen_bool(pit_probability) {
                world.set(position, CellContent::Pit);
            }
        }

        debug!(board_size, %wumpus, %gold, "generated board");
        Ok(world)
    }

    /// Build a fixed board.
    pub fn from_layout(
        board_size: usize,
        wumpus: Position,
        pits: &[Position],
        gold: Position,
    ) -> Result<Self, ConfigError> {
        validate_board_size(board_size)?;
        let mut world = Self::empty(board_size);

        let placements = std::iter::once((wumpus, CellContent::Wumpus))
            .chain(pits.iter().map(|p| (*p, CellContent::Pit)))
            .chain(std::iter::once((gold, CellContent::Gold)));
        for (position, content) in placements {
            if !position.in_bounds(board_size) {
                return Err(ConfigError::OutOfBounds {
                    position,
                    board_size,
                });
            }
            if position == Position::START {
                return Err(ConfigError::OnStartCell(position));
            }
            if world.get(position) != CellContent::Empty {
                return Err(ConfigError::Overlap(position));
            }
            world.set(position, content);
        }
        world.initial_gold = 1;
        Ok(world)
    }

    /// Board is `board_size` x `board_size`.
    pub fn board_size(&self) -> usize {
        self.board_size
    }

    /// Content of a cell on the board.
    pub fn get(&self, position: Position) -> CellContent {
        self.cells[self.index(position)]
    }

    fn set(&mut self, position: Position, content: CellContent) {
        let index = self.index(position);
        self.cells[index] = content;
    }

    fn index(&self, position: Position) -> usize {
        debug_assert!(position.in_bounds(self.board_size));
        position.y * self.board_size + position.x
    }

    /// All positions, row by row from the south.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let size = self.board_size;
        (0..size).flat_map(move |y| (0..size).map(move |x| Position::new(x, y)))
    }

    /// Authoritative agent state.
    pub fn agent(&self) -> &AgentState {
        &self.agent
    }

    /// Gold the board started with.
    pub fn initial_gold(&self) -> usize {
        self.initial_gold
    }

    /// Gold still lying in the cave.
    pub fn gold_remaining(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| **c == CellContent::Gold)
            .count()
    }

    /// Whether the wumpus is still alive.
    pub fn wumpus_alive(&self) -> bool {
        self.cells.contains(&CellContent::Wumpus)
    }

    /// Signals sensed at `position`: breeze and stench from the four cardinal neighbours, glitter
    /// from the cell itself, bump and scream from the most recent action.
    pub fn perceive(&self, position: Position) -> Percept {
        let mut percept = Percept {
            glitter: self.get(position) == CellContent::Gold,
            bump: self.bump,
            scream: self.scream,
            ..Percept::default()
        };
        for neighbour in position.neighbours(self.board_size) {
            match self.get(neighbour) {
                CellContent::Pit => percept.breeze = true,
                CellContent::Wumpus => percept.stench = true,
                CellContent::Empty | CellContent::Gold => {}
            }
        }
        percept
    }

    /// Resolve an action against the world.
    pub fn apply(&mut self, action: Action) -> ActionResult {
        self.bump = false;
        self.scream = false;

        if !self.agent.is_active() {
            warn!(%action, "agent is no longer in the cave, ignoring action");
            return ActionResult::no_op(action);
        }

        let position = self.agent.position;
        let facing = self.agent.facing;
        let result = match action {
            Action::Forward => match position.step(facing, self.board_size) {
                Some(to) => {
                    let mut result = ActionResult::success(
                        action,
                        vec![StateChange::Moved { from: position, to }],
                    );
                    result.died = self.get(to).is_deadly();
                    result
                }
                None => {
                    self.bump = true;
                    let mut result = ActionResult::no_op(action);
                    result.bump = true;
                    result
                }
            },
            Action::TurnLeft => ActionResult::success(
                action,
                vec![StateChange::Turned {
                    facing: facing.left(),
                }],
            ),
            Action::TurnRight => ActionResult::success(
                action,
                vec![StateChange::Turned {
                    facing: facing.right(),
                }],
            ),
            Action::Shoot => {
                if self.agent.arrows == 0 {
                    ActionResult::no_op(action)
                } else {
                    let mut changes = vec![StateChange::ArrowFired];
                    let mut lane = position;
                    while let Some(next) = lane.step(facing, self.board_size) {
                        if self.get(next) == CellContent::Wumpus {
                            self.set(next, CellContent::Empty);
                            self.scream = true;
                            changes.push(StateChange::WumpusKilled { at: next });
                            break;
                        }
                        lane = next;
                    }
                    ActionResult::success(action, changes)
                }
            }
            Action::Grab => {
                if self.get(position) == CellContent::Gold {
                    self.set(position, CellContent::Empty);
                    ActionResult::success(action, vec![StateChange::GoldGrabbed { at: position }])
                } else {
                    ActionResult::no_op(action)
                }
            }
            Action::Climb => {
                if position == Position::START {
                    ActionResult::success(action, vec![StateChange::ClimbedOut])
                } else {
                    ActionResult::no_op(action)
                }
            }
        };

        self.agent.record(&result);
        if result.succeeded {
            debug!(%action, position = %self.agent.position, facing = %self.agent.facing, died = result.died, "applied action");
        } else {
            debug!(%action, %position, bump = result.bump, "action had no effect");
        }
        result
    }
}

impl Environment for WumpusWorld {
    type Action = Action;
    type Percept = Percept;
    type ActionResult = ActionResult;
    type Score = i32;

    fn percept(&self) -> Self::Percept {
        self.perceive(self.agent.position)
    }

    fn execute_action(&mut self, action: &Self::Action) -> Self::ActionResult {
        self.apply(*action)
    }

    fn score(&self, result: &Self::ActionResult) -> Self::Score {
        let mut score = ACTION_COST;
        if result.fired_arrow() {
            score += ARROW_COST;
        }
        if result.grabbed_gold() {
            score += GOLD_REWARD;
        }
        if result.died {
            score += DEATH_PENALTY;
        }
        score
    }

    fn is_terminal(&self) -> bool {
        !self.agent.is_active()
    }
}

// Rows are printed from the north so the start cell ends up in the bottom left corner.
impl std::fmt::Display for WumpusWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self.board_size.to_string().len();
        for y in (0..self.board_size).rev() {
            write!(f, "{:>width$} ", y)?;
            for x in 0..self.board_size {
                let position = Position::new(x, y);
                let c = if self.agent.is_active() && self.agent.position == position {
                    'A'
                } else {
                    match self.get(position) {
                        CellContent::Empty => '.',
                        CellContent::Wumpus => 'W',
                        CellContent::Pit => 'P',
                        CellContent::Gold => 'G',
                    }
                };
                write!(f, "{}", c)?;
                if x < self.board_size - 1 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "{:>width$} ", "")?;
        for x in 0..self.board_size {
            write!(f, "{}", x % 10)?;
            if x < self.board_size - 1 {
                write!(f, " ")?;
            }
        }
        Ok(())
    }
}
