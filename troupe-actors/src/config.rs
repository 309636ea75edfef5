// Copyright (C) 2024 Troupe, Inc.
//
// Troupe is offered under the AGPL v3.0 and as commercial software.
// For commercial licensing, contact us at hello@troupe.dev.
//
// AGPL:
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

use serde::{Deserialize, Serialize};
use troupe_common::get_from_env;

use crate::{ACTOR_QUEUE_LIMIT, POOL_SIZE};

/// Sizing and signal knobs of one actor system.
///
/// The defaults come from [`POOL_SIZE`] and [`ACTOR_QUEUE_LIMIT`]; tests
/// routinely shrink both to hit boundaries quickly.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct RuntimeConfig {
    /// Number of worker threads draining the ready queue.
    pub pool_size: usize,
    /// Capacity of every actor mailbox.
    pub mailbox_capacity: usize,
    /// When true, the system installs a SIGINT listener that triggers
    /// orderly shutdown.
    pub catch_interrupt: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            pool_size: POOL_SIZE,
            mailbox_capacity: ACTOR_QUEUE_LIMIT,
            catch_interrupt: true,
        }
    }
}

impl RuntimeConfig {
    /// Default configuration with `TROUPE_POOL_SIZE` and
    /// `TROUPE_MAILBOX_CAPACITY` environment overrides applied.
    pub fn from_env() -> Self {
        RuntimeConfig {
            pool_size: get_from_env("TROUPE_POOL_SIZE", POOL_SIZE),
            mailbox_capacity: get_from_env("TROUPE_MAILBOX_CAPACITY", ACTOR_QUEUE_LIMIT),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RuntimeConfig;
    use crate::{ACTOR_QUEUE_LIMIT, POOL_SIZE};

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();
        assert_eq!(config.pool_size, POOL_SIZE);
        assert_eq!(config.mailbox_capacity, ACTOR_QUEUE_LIMIT);
        assert!(config.catch_interrupt);
    }

    #[test]
    fn test_config_serde_roundtrip() -> anyhow::Result<()> {
        let config = RuntimeConfig {
            pool_size: 2,
            mailbox_capacity: 16,
            catch_interrupt: false,
        };
        let json = serde_json::to_string(&config)?;
        let parsed: RuntimeConfig = serde_json::from_str(&json)?;
        assert_eq!(parsed, config);
        Ok(())
    }

    #[test]
    fn test_config_missing_fields_take_defaults() -> anyhow::Result<()> {
        let parsed: RuntimeConfig = serde_json::from_str(r#"{"pool_size": 2}"#)?;
        assert_eq!(parsed.pool_size, 2);
        assert_eq!(parsed.mailbox_capacity, ACTOR_QUEUE_LIMIT);
        Ok(())
    }

    #[test]
    fn test_config_from_env_override() {
        std::env::set_var("TROUPE_MAILBOX_CAPACITY", "32");
        let config = RuntimeConfig::from_env();
        assert_eq!(config.mailbox_capacity, 32);
        assert_eq!(config.pool_size, POOL_SIZE);
        std::env::remove_var("TROUPE_MAILBOX_CAPACITY");
    }
}
