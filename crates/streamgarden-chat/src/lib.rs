//! Chat command source for the Streamgarden overlay.
//!
//! Chat messages are parsed into garden [`Command`]s here, and gated by the
//! sender's role and per-user cooldowns. The garden engine never sees a
//! message that failed these checks. The crate also holds the chat bot
//! client the DJ wheel uses to announce tricks.
//!
//! # Modules
//!
//! - [`parser`] -- `!command` parsing, role gating, and cooldowns
//! - [`bot`] -- StreamElements bot `say` client
//! - [`error`] -- Chat and bot errors
//!
//! [`Command`]: streamgarden_types::Command

pub mod bot;
pub mod error;
pub mod parser;

pub use bot::{BotClient, Trick, format_trick_message};
pub use error::{BotError, ChatError};
pub use parser::{ChatCommandSource, ChatRole, Permission};
