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

//! Episode configuration and the seeded random number generator.

use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Random number generator used for all board generation.
pub type Rng = rand_pcg::Pcg64;

/// Smallest playable board.
pub const MIN_BOARD_SIZE: usize = 2;

/// Largest supported board. Keeps `board_size * board_size` cell indexing far from overflow.
pub const MAX_BOARD_SIZE: usize = 256;

/// Configuration for one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Board is `board_size` x `board_size`.
    pub board_size: usize,

    /// Chance of each eligible cell holding a pit.
    pub pit_probability: f64,

    /// Seed for board generation. None draws from OS entropy, so runs are not reproducible.
    pub seed: Option<u64>,

    /// Maximum number of actions before the run ends with `ExceededStepLimit`.
    pub step_limit: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            board_size: 4,
            pit_probability: 0.2,
            seed: None,
            step_limit: 200,
        }
    }
}

impl WorldConfig {
    /// Reject configurations the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_board_size(self.board_size)?;
        validate_pit_probability(self.pit_probability)?;
        if self.step_limit < 1 {
            return Err(ConfigError::StepLimitTooSmall(self.step_limit));
        }
        Ok(())
    }

    /// Build the generator for this configuration.
    pub fn rng(&self) -> Rng {
        match self.seed {
            Some(seed) => Rng::seed_from_u64(seed),
            None => Rng::from_entropy(),
        }
    }
}

pub(crate) fn validate_board_size(board_size: usize) -> Result<(), ConfigError> {
    if board_size < MIN_BOARD_SIZE {
        return Err(ConfigError::BoardTooSmall(board_size));
    }
    if board_size > MAX_BOARD_SIZE {
        return Err(ConfigError::BoardTooLarge(board_size));
    }
    Ok(())
}

pub(crate) fn validate_pit_probability(pit_probability: f64) -> Result<(), ConfigError> {
    // NaN fails the range check too.
    if !(0.0..=1.0).contains(&pit_probability) {
        return Err(ConfigError::PitProbabilityOutOfRange(pit_probability));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(WorldConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_small_board() {
        let config = WorldConfig {
            board_size: 1,
            ..WorldConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::BoardTooSmall(1)));
    }

    #[test]
    fn test_rejects_huge_board() {
        let config = WorldConfig {
            board_size: 1 << 33,
            ..WorldConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::BoardTooLarge(1 << 33)));

        let largest = WorldConfig {
            board_size: MAX_BOARD_SIZE,
            ..WorldConfig::default()
        };
        assert_eq!(largest.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_probability_out_of_range() {
        for p in [-0.1, 1.5] {
            let config = WorldConfig {
                pit_probability: p,
                ..WorldConfig::default()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigError::PitProbabilityOutOfRange(p))
            );
        }
        let config = WorldConfig {
            pit_probability: f64::NAN,
            ..WorldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PitProbabilityOutOfRange(_))
        ));
    }

    #[test]
    fn test_accepts_probability_bounds() {
        for p in [0.0, 1.0] {
            let config = WorldConfig {
                pit_probability: p,
                ..WorldConfig::default()
            };
            assert_eq!(config.validate(), Ok(()));
        }
    }

    #[test]
    fn test_rejects_zero_step_limit() {
        let config = WorldConfig {
            step_limit: 0,
            ..WorldConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::StepLimitTooSmall(0)));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let config = WorldConfig {
            seed: Some(7),
            ..WorldConfig::default()
        };
        assert_eq!(config.rng().next_u64(), config.rng().next_u64());
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: WorldConfig =
            serde_json::from_str(r#"{"board_size": 6, "seed": 3}"#).expect("valid json");
        assert_eq!(config.board_size, 6);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.step_limit, 200);
    }
}
