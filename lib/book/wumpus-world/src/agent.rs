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

//! The knowledge-based agent and its decision policy.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::{Action, ActionResult};
use crate::belief::BeliefMap;
use crate::error::WumpusError;
use crate::geometry::Position;
use crate::percept::Percept;
use crate::state::AgentState;
use crate::Agent;

/// Lifecycle of the knowledge-based agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentPhase {
    /// Looking for gold.
    Exploring,

    /// Heading back to the start cell to climb out, either with the gold or because nothing is
    /// left to explore.
    Retreating,

    /// Climbed out or dead. `decide` fails from here on.
    Terminal,
}

/// An agent that keeps a belief map built from every percept and picks actions by a fixed
/// priority list: grab, climb, shoot, safe exploration, least risky exploration, retreat.
///
/// Like the reflex vacuum agent it only sees percepts and results of its own actions, never the
/// Environment itself.
#[derive(Debug, Clone)]
pub struct KnowledgeBasedAgent {
    state: AgentState,
    belief: BeliefMap,
    phase: AgentPhase,
    last_percept: Option<Percept>,

    // Cells ahead of a shot whose outcome the next percept will tell.
    pending_shot: Option<Vec<Position>>,
}

impl KnowledgeBasedAgent {
    /// A new agent at the start cell of a `board_size` x `board_size` cave.
    pub fn new(board_size: usize) -> Self {
        Self {
            state: AgentState::default(),
            belief: BeliefMap::new(board_size),
            phase: AgentPhase::Exploring,
            last_percept: None,
            pending_shot: None,
        }
    }

    /// The agent's model of its own body.
    pub fn state(&self) -> &AgentState {
        &self.state
    }

    /// The agent's belief about the cave.
    pub fn belief(&self) -> &BeliefMap {
        &self.belief
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> AgentPhase {
        self.phase
    }

    fn board_size(&self) -> usize {
        self.belief.board_size()
    }

    // Closest to the start, then lowest coordinate.
    fn tie_break(position: &Position) -> (usize, Position) {
        (position.manhattan(&Position::START), *position)
    }

    /// Breadth first distances from the agent's cell through known safe cells.
    fn safe_distances(&self) -> Vec<Option<usize>> {
        let size = self.board_size();
        let index = |p: Position| p.y * size + p.x;
        let mut distances = vec![None; size * size];
        let start = self.state.position;
        distances[index(start)] = Some(0);
        let mut queue = VecDeque::from([(start, 0)]);
        while let Some((position, distance)) = queue.pop_front() {
            for neighbour in position.neighbours(size) {
                if distances[index(neighbour)].is_none() && self.belief.is_safe(neighbour) {
                    distances[index(neighbour)] = Some(distance + 1);
                    queue.push_back((neighbour, distance + 1));
                }
            }
        }
        distances
    }

    /// Shortest path to `target` whose every cell except possibly `target` is known safe. The
    /// agent's own cell is not part of the path.
    fn path_to(&self, target: Position) -> Option<Vec<Position>> {
        let size = self.board_size();
        let index = |p: Position| p.y * size + p.x;
        let start = self.state.position;
        if start == target {
            return Some(Vec::new());
        }

        let mut parents: Vec<Option<Position>> = vec![None; size * size];
        let mut seen = vec![false; size * size];
        seen[index(start)] = true;
        let mut queue = VecDeque::from([start]);
        while let Some(position) = queue.pop_front() {
            for neighbour in position.neighbours(size) {
                if seen[index(neighbour)] {
                    continue;
                }
                if neighbour != target && !self.belief.is_safe(neighbour) {
                    continue;
                }
                seen[index(neighbour)] = true;
                parents[index(neighbour)] = Some(position);
                if neighbour == target {
                    let mut path = vec![target];
                    let mut current = position;
                    while current != start {
                        path.push(current);
                        current = parents[index(current)]?;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(neighbour);
            }
        }
        None
    }

    /// Turn towards the next cell on the way to `target`, or step into it if already facing it.
    fn travel_to(&self, target: Position) -> Result<Action, WumpusError> {
        let here = self.state.position;
        let path = self.path_to(target).ok_or_else(|| {
            WumpusError::InternalInconsistency(format!("no safe path from {} to {}", here, target))
        })?;
        let next = path.first().ok_or_else(|| {
            WumpusError::InternalInconsistency(format!("already standing on target {}", target))
        })?;
        let needed = here.direction_to(next).ok_or_else(|| {
            WumpusError::InternalInconsistency(format!("{} is not adjacent to {}", next, here))
        })?;

        let facing = self.state.facing;
        Ok(if facing == needed {
            Action::Forward
        } else if facing.left() == needed {
            Action::TurnLeft
        } else {
            Action::TurnRight
        })
    }

    fn retreat(&mut self) -> Result<Action, WumpusError> {
        self.phase = AgentPhase::Retreating;
        if self.state.position == Position::START {
            self.phase = AgentPhase::Terminal;
            return Ok(Action::Climb);
        }
        self.travel_to(Position::START)
    }

    fn choose_exploration_target(&self) -> Option<Position> {
        let here = self.state.position;
        let size = self.board_size();

        let adjacent_safe = here
            .neighbours(size)
            .filter(|n| self.belief.is_safe(*n) && !self.belief.is_visited(*n))
            .min_by_key(Self::tie_break);
        if adjacent_safe.is_some() {
            debug!(cell = ?adjacent_safe, "adjacent safe cell");
            return adjacent_safe;
        }

        let distances = self.safe_distances();
        let distance = |p: Position| distances[p.y * size + p.x];

        let reachable_safe = self
            .belief
            .positions()
            .filter(|p| !self.belief.is_visited(*p))
            .filter_map(|p| distance(p).map(|d| (d, Self::tie_break(&p), p)))
            .min()
            .map(|(_, _, p)| p);
        if reachable_safe.is_some() {
            debug!(cell = ?reachable_safe, "nearest reachable safe cell");
            return reachable_safe;
        }

        let least_risky = self
            .belief
            .positions()
            .filter(|p| self.belief.label(*p).is_possible_hazard() && !self.belief.is_visited(*p))
            .filter(|p| p.neighbours(size).any(|n| distance(n).is_some()))
            .min_by_key(|p| (self.belief.risk(*p), Self::tie_break(p)));
        if least_risky.is_some() {
            debug!(cell = ?least_risky, "no safe cell left, taking a risk");
        }
        least_risky
    }
}

impl Agent for KnowledgeBasedAgent {
    type Action = Action;
    type Percept = Percept;
    type ActionResult = ActionResult;

    fn observe(&mut self, percept: &Self::Percept) {
        if let Some(lane) = self.pending_shot.take() {
            if !percept.scream {
                self.belief.clear_wumpus_lane(lane);
            }
        }
        self.belief.observe(self.state.position, percept);
        self.last_percept = Some(*percept);
    }

    fn decide(&mut self) -> Result<Self::Action, WumpusError> {
        if self.phase == AgentPhase::Terminal {
            return Err(WumpusError::InternalInconsistency(
                "decide called after the agent finished".to_string(),
            ));
        }
        let percept = self.last_percept.ok_or_else(|| {
            WumpusError::InternalInconsistency("decide called before any percept".to_string())
        })?;
        let here = self.state.position;

        if percept.glitter && !self.state.has_gold {
            debug!(%here, "glitter, grabbing gold");
            self.phase = AgentPhase::Retreating;
            return Ok(Action::Grab);
        }

        if self.state.has_gold && here == Position::START {
            debug!("back at the start with the gold, climbing out");
            self.phase = AgentPhase::Terminal;
            return Ok(Action::Climb);
        }

        if self.phase == AgentPhase::Retreating {
            return self.retreat();
        }

        if self.state.arrows > 0 {
            if let Some(ahead) = here.step(self.state.facing, self.board_size()) {
                if self.belief.may_hold_wumpus(ahead) {
                    debug!(%ahead, "wumpus may be ahead, shooting");
                    return Ok(Action::Shoot);
                }
            }
        }

        match self.choose_exploration_target() {
            Some(target) => self.travel_to(target),
            None => {
                debug!(%here, "nothing left to explore, retreating");
                self.retreat()
            }
        }
    }

    fn update(&mut self, result: &Self::ActionResult) {
        if result.fired_arrow() {
            let size = self.board_size();
            let facing = self.state.facing;
            let mut lane = Vec::new();
            let mut cell = self.state.position;
            while let Some(next) = cell.step(facing, size) {
                lane.push(next);
                cell = next;
            }
            self.pending_shot = Some(lane);
        }
        self.state.record(result);
        if !self.state.is_active() {
            self.phase = AgentPhase::Terminal;
        }
    }
}
