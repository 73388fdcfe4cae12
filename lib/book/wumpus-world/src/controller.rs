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

//! Runs one agent in one environment until the episode ends.

use num_traits::Zero;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::action::{Action, ActionResult};
use crate::agent::KnowledgeBasedAgent;
use crate::config::WorldConfig;
use crate::environment::WumpusWorld;
use crate::error::{ConfigError, WumpusError};
use crate::percept::Percept;
use crate::{Agent, Environment};

/// How an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Walked into a pit or the live wumpus.
    Died,

    /// Climbed out of the start cell carrying the gold.
    ClimbedOutWithGold,

    /// Climbed out of the start cell without the gold.
    ClimbedOutEmpty,

    /// Ran out of steps while still in the cave.
    ExceededStepLimit,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Died => write!(f, "died"),
            Outcome::ClimbedOutWithGold => write!(f, "climbed out with gold"),
            Outcome::ClimbedOutEmpty => write!(f, "climbed out empty"),
            Outcome::ExceededStepLimit => write!(f, "exceeded step limit"),
        }
    }
}

/// One turn of an episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord<S> {
    /// 1-based turn number.
    pub step: usize,

    /// What the agent sensed at the start of the turn.
    pub percept: Percept,

    /// What the agent decided to do.
    pub action: Action,

    /// What the action did.
    pub result: ActionResult,

    /// Running performance score after the turn.
    pub score: S,
}

/// Everything an episode produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport<S> {
    /// How the episode ended.
    pub outcome: Outcome,

    /// Number of actions taken.
    pub steps: usize,

    /// Final performance score.
    pub score: S,

    /// Every turn, in order.
    pub transcript: Vec<StepRecord<S>>,
}

/// Runs a single Agent in an Environment, one perceive, decide, act, update turn at a time, until
/// the agent dies, climbs out, or the step limit is reached.
///
/// The Controller owns both sides and is the only thing passing data between them. The running
/// score (Performance) is kept here.
pub struct Controller<_Environment, _Agent>
where
    _Environment: Environment<Action = Action, Percept = Percept, ActionResult = ActionResult>,
    _Agent: Agent<Action = Action, Percept = Percept, ActionResult = ActionResult>,
{
    environment: _Environment,
    agent: _Agent,
    step_limit: usize,
    score: _Environment::Score,
}

impl Controller<WumpusWorld, KnowledgeBasedAgent> {
    /// Generate a board from `config` and put a fresh knowledge-based agent in it.
    pub fn from_config(config: &WorldConfig) -> Result<Self, ConfigError> {
        let environment = WumpusWorld::from_config(config)?;
        let agent = KnowledgeBasedAgent::new(config.board_size);
        Self::new(environment, agent, config.step_limit)
    }
}

impl<_Environment, _Agent> Controller<_Environment, _Agent>
where
    _Environment: Environment<Action = Action, Percept = Percept, ActionResult = ActionResult>,
    _Agent: Agent<Action = Action, Percept = Percept, ActionResult = ActionResult>,
{
    /// Pair an environment with an agent. `step_limit` must be at least 1.
    pub fn new(
        environment: _Environment,
        agent: _Agent,
        step_limit: usize,
    ) -> Result<Self, ConfigError> {
        if step_limit < 1 {
            return Err(ConfigError::StepLimitTooSmall(step_limit));
        }
        Ok(Self {
            environment,
            agent,
            step_limit,
            score: _Environment::Score::zero(),
        })
    }

    /// Run the episode to the end. A second call on a finished episode fails because the agent
    /// refuses to decide again.
    pub fn run(&mut self) -> Result<RunReport<_Environment::Score>, WumpusError> {
        let mut transcript = Vec::new();
        let mut carrying_gold = false;

        for step in 1..=self.step_limit {
            let percept = self.environment.percept();
            self.agent.observe(&percept);
            let action = self.agent.decide()?;
            let result = self.environment.execute_action(&action);
            self.agent.update(&result);

            self.score += self.environment.score(&result);
            carrying_gold |= result.grabbed_gold();
            if !result.succeeded {
                warn!(step, %action, bump = result.bump, "action had no effect");
            }
            debug!(step, %percept, %action, succeeded = result.succeeded, "turn");

            let outcome = if result.died {
                Some(Outcome::Died)
            } else if result.climbed_out() {
                Some(if carrying_gold {
                    Outcome::ClimbedOutWithGold
                } else {
                    Outcome::ClimbedOutEmpty
                })
            } else {
                None
            };

            transcript.push(StepRecord {
                step,
                percept,
                action,
                result,
                score: self.score,
            });

            match (outcome, self.environment.is_terminal()) {
                (Some(outcome), true) => return Ok(self.finish(outcome, transcript)),
                (None, false) => {}
                (outcome, terminal) => {
                    return Err(WumpusError::InternalInconsistency(format!(
                        "step {} ended with outcome {:?} but terminal is {}",
                        step, outcome, terminal
                    )))
                }
            }
        }

        Ok(self.finish(Outcome::ExceededStepLimit, transcript))
    }

    fn finish(
        &self,
        outcome: Outcome,
        transcript: Vec<StepRecord<_Environment::Score>>,
    ) -> RunReport<_Environment::Score> {
        info!(%outcome, steps = transcript.len(), "episode finished");
        RunReport {
            outcome,
            steps: transcript.len(),
            score: self.score,
            transcript,
        }
    }

    /// The environment, e.g. to render the final board.
    pub fn environment(&self) -> &_Environment {
        &self.environment
    }

    /// The agent, e.g. to inspect its belief state.
    pub fn agent(&self) -> &_Agent {
        &self.agent
    }

    /// Running performance score.
    pub fn score(&self) -> _Environment::Score {
        self.score
    }
}
