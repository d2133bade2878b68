//! Turns chat messages into garden [`Command`]s.
//!
//! | Chat            | Command                 | Who         | Cooldown key  |
//! |-----------------|-------------------------|-------------|---------------|
//! | `!plant [type]` | `plantFlower`           | everyone    | `plant`       |
//! | `!water`        | `waterGarden`           | everyone    | `water`       |
//! | `!pick`         | `pickFlowers`           | everyone    | `pick`        |
//! | `!leaderboard`  | `requestLeaderboard`    | everyone    | `leaderboard` |
//! | `!pickold`      | `pickOldFlowers`        | mods        |               |
//! | `!startgarden`  | `startGarden`           | mods        |               |
//! | `!resetgarden`  | `resetGarden`           | mods        |               |
//! | `!hidegarden`   | `hideGarden`            | mods        |               |
//! | `!testspawn`    | `spawnTestFlowers`      | mods        |               |
//! | `!bunny`        | `testBunnyVisit`        | mods        |               |
//!
//! Cooldowns are per user and per command, with lengths taken from the
//! `chat.cooldown_secs` configuration map. A refused command does not
//! start a cooldown.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use streamgarden_core::config::ChatConfig;
use streamgarden_types::{Command, FlowerType};
use tracing::debug;

use crate::error::ChatError;

/// The sender's standing in the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Any viewer.
    #[default]
    Viewer,
    /// A channel moderator.
    #[serde(alias = "mod")]
    Moderator,
    /// The channel owner.
    Broadcaster,
}

/// Who may use a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Any viewer.
    Everyone,
    /// Moderators and the broadcaster.
    Mods,
    /// The broadcaster only.
    Broadcaster,
}

impl Permission {
    /// Whether `role` satisfies this permission.
    pub const fn allows(self, role: ChatRole) -> bool {
        match self {
            Self::Everyone => true,
            Self::Mods => matches!(role, ChatRole::Moderator | ChatRole::Broadcaster),
            Self::Broadcaster => matches!(role, ChatRole::Broadcaster),
        }
    }
}

/// A chat trigger and its gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// The word after `!`.
    pub trigger: &'static str,
    /// Who may use it.
    pub permission: Permission,
}

/// Every chat command the garden understands.
pub const COMMANDS: [CommandSpec; 10] = [
    CommandSpec { trigger: "plant", permission: Permission::Everyone },
    CommandSpec { trigger: "water", permission: Permission::Everyone },
    CommandSpec { trigger: "pick", permission: Permission::Everyone },
    CommandSpec { trigger: "leaderboard", permission: Permission::Everyone },
    CommandSpec { trigger: "pickold", permission: Permission::Mods },
    CommandSpec { trigger: "startgarden", permission: Permission::Mods },
    CommandSpec { trigger: "resetgarden", permission: Permission::Mods },
    CommandSpec { trigger: "hidegarden", permission: Permission::Mods },
    CommandSpec { trigger: "testspawn", permission: Permission::Mods },
    CommandSpec { trigger: "bunny", permission: Permission::Mods },
];

/// Look up a trigger word.
pub fn find_spec(trigger: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.trigger == trigger)
}

/// Split a chat message into a lowercased trigger and its first argument.
///
/// # Errors
///
/// Returns [`ChatError::NotACommand`] if the message does not start with
/// `!` followed by a word.
pub fn split_message(message: &str) -> Result<(String, Option<&str>), ChatError> {
    let body = message.trim().strip_prefix('!').ok_or(ChatError::NotACommand)?;
    let mut words = body.split_whitespace();
    let trigger = words.next().ok_or(ChatError::NotACommand)?.to_lowercase();
    Ok((trigger, words.next()))
}

/// Build the garden command for a trigger.
///
/// An unrecognised species after `!plant` is ignored and a random one is
/// drawn instead.
///
/// # Errors
///
/// Returns [`ChatError::UnknownCommand`] if the trigger is not a garden
/// command.
pub fn to_command(trigger: &str, argument: Option<&str>, username: &str) -> Result<Command, ChatError> {
    let username = username.to_owned();
    let command = match trigger {
        "plant" => Command::Plant {
            username,
            flower_type: argument.and_then(FlowerType::from_name),
        },
        "water" => Command::Water { username },
        "pick" => Command::Pick { username },
        "leaderboard" => Command::RequestLeaderboard { username },
        "pickold" => Command::PickOld { username },
        "startgarden" => Command::Start { username },
        "resetgarden" => Command::Reset { username },
        "hidegarden" => Command::Hide { username },
        "testspawn" => Command::SpawnTestFlowers { username },
        "bunny" => Command::TestBunnyVisit { username },
        other => {
            return Err(ChatError::UnknownCommand {
                name: other.to_owned(),
            });
        }
    };
    Ok(command)
}

/// Parses, gates, and rate-limits chat commands.
#[derive(Debug, Clone, Default)]
pub struct ChatCommandSource {
    cooldown_secs: BTreeMap<String, u64>,
    last_used: HashMap<(String, &'static str), DateTime<Utc>>,
}

impl ChatCommandSource {
    /// A source using the configured cooldowns.
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            cooldown_secs: config.cooldown_secs.clone(),
            last_used: HashMap::new(),
        }
    }

    /// Turn one chat message into a command, or say why not.
    ///
    /// # Errors
    ///
    /// Returns a [`ChatError`] if the message is not a command, names an
    /// unknown command, comes from a role that may not use it, or arrives
    /// while the sender's cooldown for it is still running.
    pub fn process(
        &mut self,
        username: &str,
        role: ChatRole,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<Command, ChatError> {
        let (trigger, argument) = split_message(message)?;
        let spec = find_spec(&trigger).ok_or_else(|| ChatError::UnknownCommand {
            name: trigger.clone(),
        })?;

        if !spec.permission.allows(role) {
            debug!(username, trigger = spec.trigger, ?role, "chat command not permitted");
            return Err(ChatError::PermissionDenied {
                command: spec.trigger.to_owned(),
                required: spec.permission,
                role,
            });
        }

        let key = (username.to_lowercase(), spec.trigger);
        if let Some(remaining_secs) = self.remaining_cooldown(&key, now) {
            return Err(ChatError::OnCooldown {
                command: spec.trigger.to_owned(),
                remaining_secs,
            });
        }

        let command = to_command(spec.trigger, argument, username)?;
        if self.cooldown_secs.contains_key(spec.trigger) {
            self.last_used.insert(key, now);
        }
        Ok(command)
    }

    fn remaining_cooldown(&self, key: &(String, &'static str), now: DateTime<Utc>) -> Option<i64> {
        let secs = i64::try_from(*self.cooldown_secs.get(key.1)?).unwrap_or(i64::MAX);
        let last = self.last_used.get(key)?;
        let elapsed = now.signed_duration_since(*last).num_seconds();
        let remaining = secs.saturating_sub(elapsed);
        (remaining > 0).then_some(remaining)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn source() -> ChatCommandSource {
        ChatCommandSource::new(&ChatConfig::default())
    }

    #[test]
    fn plant_with_and_without_species() {
        let mut chat = source();
        assert_eq!(
            chat.process("Fern", ChatRole::Viewer, "!plant Roses", at(0)),
            Ok(Command::Plant {
                username: "Fern".to_owned(),
                flower_type: Some(FlowerType::Rose),
            })
        );
        assert_eq!(
            chat.process("Moss", ChatRole::Viewer, "!PLANT cactus", at(0)),
            Ok(Command::Plant {
                username: "Moss".to_owned(),
                flower_type: None,
            })
        );
    }

    #[test]
    fn non_commands_and_unknown_commands() {
        let mut chat = source();
        assert_eq!(
            chat.process("fern", ChatRole::Viewer, "hello garden", at(0)),
            Err(ChatError::NotACommand)
        );
        assert_eq!(
            chat.process("fern", ChatRole::Viewer, "!", at(0)),
            Err(ChatError::NotACommand)
        );
        assert_eq!(
            chat.process("fern", ChatRole::Viewer, "!dance", at(0)),
            Err(ChatError::UnknownCommand {
                name: "dance".to_owned()
            })
        );
    }

    #[test]
    fn moderator_commands_are_gated() {
        let mut chat = source();
        assert!(matches!(
            chat.process("fern", ChatRole::Viewer, "!resetgarden", at(0)),
            Err(ChatError::PermissionDenied { .. })
        ));
        assert_eq!(
            chat.process("mod", ChatRole::Moderator, "!resetgarden", at(0)),
            Ok(Command::Reset {
                username: "mod".to_owned()
            })
        );
        assert_eq!(
            chat.process("owner", ChatRole::Broadcaster, "!bunny", at(0)),
            Ok(Command::TestBunnyVisit {
                username: "owner".to_owned()
            })
        );
    }

    #[test]
    fn every_trigger_maps_to_a_command() {
        for spec in COMMANDS {
            assert!(to_command(spec.trigger, None, "fern").is_ok(), "{}", spec.trigger);
        }
    }

    #[test]
    fn cooldowns_are_per_user_and_per_command() {
        let mut chat = source();
        assert!(chat.process("fern", ChatRole::Viewer, "!water", at(0)).is_ok());
        assert_eq!(
            chat.process("FERN", ChatRole::Viewer, "!water", at(10)),
            Err(ChatError::OnCooldown {
                command: "water".to_owned(),
                remaining_secs: 20
            })
        );
        assert!(chat.process("moss", ChatRole::Viewer, "!water", at(10)).is_ok());
        assert!(chat.process("fern", ChatRole::Viewer, "!pick", at(10)).is_ok());
        assert!(chat.process("fern", ChatRole::Viewer, "!water", at(30)).is_ok());
    }

    #[test]
    fn refused_attempts_do_not_extend_cooldown() {
        let mut chat = source();
        assert!(chat.process("fern", ChatRole::Viewer, "!plant", at(0)).is_ok());
        assert!(chat.process("fern", ChatRole::Viewer, "!plant", at(2)).is_err());
        assert_eq!(
            chat.process("fern", ChatRole::Viewer, "!plant", at(3)),
            Err(ChatError::OnCooldown {
                command: "plant".to_owned(),
                remaining_secs: 2
            })
        );
        assert!(chat.process("fern", ChatRole::Viewer, "!plant", at(5)).is_ok());
    }

    #[test]
    fn roles_deserialize_from_lowercase() {
        let role: ChatRole = serde_json::from_str("\"mod\"").unwrap();
        assert_eq!(role, ChatRole::Moderator);
        let role: ChatRole = serde_json::from_str("\"broadcaster\"").unwrap();
        assert_eq!(role, ChatRole::Broadcaster);
    }
}
