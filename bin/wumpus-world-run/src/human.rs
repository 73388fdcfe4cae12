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

//! A human playing through a terminal.

use std::io::{BufRead, Write};

use tracing::debug;

use wumpus_world::{Action, ActionResult, Agent, AgentState, Percept, WumpusError};

const HELP: &str = "w: forward, a: turn left, d: turn right, s: shoot, g: grab, c: climb, \
                    q: quit, h: help";

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Act(Action),
    Help,
    Quit,
}

/// Map a line of input to a command. Only the first non-blank character counts.
pub fn parse_command(line: &str) -> Option<Command> {
    let key = line.trim().chars().next()?.to_ascii_lowercase();
    Some(match key {
        'w' => Command::Act(Action::Forward),
        'a' => Command::Act(Action::TurnLeft),
        'd' => Command::Act(Action::TurnRight),
        's' => Command::Act(Action::Shoot),
        'g' => Command::Act(Action::Grab),
        'c' => Command::Act(Action::Climb),
        'h' | '?' => Command::Help,
        'q' => Command::Quit,
        _ => return None,
    })
}

/// An agent whose decisions are typed in. It sees only what a real agent would: its own body
/// and the current percept.
pub struct HumanAgent<R: BufRead, W: Write> {
    input: R,
    output: W,
    state: AgentState,
    percept: Option<Percept>,
}

impl<R: BufRead, W: Write> HumanAgent<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            state: AgentState::default(),
            percept: None,
        }
    }

    fn read_command(&mut self) -> Result<Command, WumpusError> {
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(WumpusError::InputClosed);
            }
            match parse_command(&line) {
                Some(Command::Help) => writeln!(self.output, "{}", HELP)?,
                Some(command) => return Ok(command),
                None => writeln!(self.output, "unknown command {:?}, {}", line.trim(), HELP)?,
            }
        }
    }
}

impl<R: BufRead, W: Write> Agent for HumanAgent<R, W> {
    type Action = Action;
    type Percept = Percept;
    type ActionResult = ActionResult;

    fn observe(&mut self, percept: &Percept) {
        self.percept = Some(*percept);
    }

    fn decide(&mut self) -> Result<Action, WumpusError> {
        let percept = self.percept.unwrap_or_default();
        writeln!(
            self.output,
            "at {} facing {}, arrows {}, gold {}, sensing {}",
            self.state.position,
            self.state.facing,
            self.state.arrows,
            if self.state.has_gold { "yes" } else { "no" },
            percept
        )?;
        match self.read_command()? {
            Command::Act(action) => Ok(action),
            Command::Quit | Command::Help => Err(WumpusError::Quit),
        }
    }

    fn update(&mut self, result: &ActionResult) {
        self.state.record(result);
        let mut notes = Vec::new();
        if result.bump {
            notes.push("bump!");
        }
        if result.died {
            notes.push("you died");
        }
        for note in notes {
            if let Err(e) = writeln!(self.output, "{}", note) {
                debug!(error = %e, "could not write to the player");
            }
        }
    }
}
