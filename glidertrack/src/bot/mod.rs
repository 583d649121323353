//! Chat command handling.
//!
//! - [`Command`] parses `/command args` texts
//! - [`CommandDispatcher`] applies commands to the tracker and replies
//! - [`run_intake`] feeds inbound messages to the dispatcher until shutdown

mod command;
mod dispatcher;
mod intake;

pub use command::{help_text, menu, Command, CommandInfo, UsageError, COMMANDS};
pub use dispatcher::{
    enable_ack, CommandDispatcher, TrustPredicate, LANDING_SAVED_TEXT, SESSION_STARTED_TEXT,
    WELCOME_TEXT,
};
pub use intake::{run_intake, INTAKE_RETRY_DELAY};
