//! Error types for the chat command source and the bot client.

use crate::parser::{ChatRole, Permission};

/// Why a chat message did not become a garden command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// The message does not start with `!`.
    #[error("not a command")]
    NotACommand,

    /// The `!word` is not a garden command.
    #[error("unknown command: !{name}")]
    UnknownCommand {
        /// The word after `!`, lowercased.
        name: String,
    },

    /// The sender's role is not allowed to use the command.
    #[error("!{command} requires {required:?}, sender is {role:?}")]
    PermissionDenied {
        /// The command trigger.
        command: String,
        /// Who may use it.
        required: Permission,
        /// The sender's role.
        role: ChatRole,
    },

    /// The sender used the command too recently.
    #[error("!{command} is on cooldown for {remaining_secs}s")]
    OnCooldown {
        /// The command trigger.
        command: String,
        /// Seconds until the sender may use it again.
        remaining_secs: i64,
    },
}

/// Errors from the chat bot API.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// The JWT or channel id is not configured.
    #[error("bot credentials not configured: missing {missing}")]
    MissingCredentials {
        /// Which setting is absent.
        missing: &'static str,
    },

    /// The request could not be sent or the response could not be read.
    #[error("bot request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("bot API returned {status}: {body}")]
    Upstream {
        /// HTTP status code from the API.
        status: u16,
        /// Response body, for the logs.
        body: String,
    },
}
