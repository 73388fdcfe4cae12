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

#![warn(missing_docs)]

//! The wumpus world.
//!
//! A knowledge-based agent explores an N x N cave, sensing breezes next to pits, a stench next to
//! the wumpus and glitter on the gold. It has to grab the gold and climb back out of the start
//! cell without falling into a pit or walking into the wumpus.
//!
//! See:
//! -  Chapter 7: Logical Agents, section 7.2 The Wumpus World

// PEAS - Performance, Environment, Actuators, Sensors
//
// Performance: +1000 for the gold, -1000 for dying, -1 per action, -10 for the arrow.
// Environment: N x N grid of cells, one wumpus, one gold, pits.
// Actuators:   forward, turn left, turn right, shoot, grab, climb.
// Sensors:     breeze, stench, glitter, bump, scream.

pub mod action;
pub mod agent;
pub mod belief;
pub mod config;
pub mod controller;
pub mod environment;
pub mod error;
pub mod geometry;
pub mod percept;
pub mod state;

pub use action::{Action, ActionResult, StateChange};
pub use agent::{AgentPhase, KnowledgeBasedAgent};
pub use belief::{BeliefLabel, BeliefMap};
pub use config::WorldConfig;
pub use controller::{Controller, Outcome, RunReport, StepRecord};
pub use environment::{CellContent, WumpusWorld};
pub use error::{ConfigError, WumpusError};
pub use geometry::{Direction, Position};
pub use percept::Percept;
pub use state::AgentState;

/// An Agent acts in a Performance, Environment, Actuators, Sensors (PEAS) cycle. It is told what
/// it senses, picks an Action, and is then told what its Action did.
///
/// Notice that the Agent is not aware of an Environment, its only interface is the Percept coming
/// in, the Action going out, and the ActionResult coming back.
pub trait Agent {
    /// What the agent can do.
    type Action;
    /// What the agent senses.
    type Percept;
    /// What the agent learns about its own action.
    type ActionResult;

    /// Fold a new percept into whatever state the agent keeps.
    fn observe(&mut self, percept: &Self::Percept);

    /// Pick the next action.
    fn decide(&mut self) -> Result<Self::Action, WumpusError>;

    /// Learn the result of the action picked by the last `decide`.
    fn update(&mut self, result: &Self::ActionResult);
}

/// An Environment runs a single Agent in a Performance, Environment, Actuators, Sensors (PEAS)
/// cycle.
///
/// Notice that the Environment is not aware of an Agent.
pub trait Environment {
    /// What the agent can do.
    type Action;
    /// What the agent senses.
    type Percept;
    /// Outcome of executing an action.
    type ActionResult;
    /// Performance measure.
    type Score: num_traits::NumAssign + Copy;

    /// What the agent senses right now.
    fn percept(&self) -> Self::Percept;

    /// Execute an action and report what it did.
    fn execute_action(&mut self, action: &Self::Action) -> Self::ActionResult;

    /// Performance earned by a single executed action. This is not cumulative, the Controller
    /// keeps the running total.
    fn score(&self, result: &Self::ActionResult) -> Self::Score;

    /// Whether the agent can no longer act.
    fn is_terminal(&self) -> bool;
}
