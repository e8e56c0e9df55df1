//! Chat command surface.
//!
//! `paragon color [get|on|off]` lets a character inspect or change its
//! tier-color preference. Any authenticated character may use it; the
//! server console may not, since the preference belongs to a character.

use crate::engine::ParagonEngine;
use crate::host::Player;
use thiserror::Error;

/// Root command name.
pub const COMMAND_NAME: &str = "paragon";

/// Who issued a command.
pub enum Invoker<'a> {
    Console,
    Character(&'a mut dyn Player),
}

/// Problems with a command line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("This command cannot be run from the console")]
    ConsoleNotAllowed,

    #[error("Usage: .paragon color [get|on|off]")]
    Usage,
}

/// A parsed paragon command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagonCommand {
    GetColor,
    SetColor(bool),
}

impl ParagonCommand {
    /// Parse the arguments after the root command name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use paragon::command::{CommandError, ParagonCommand};
    ///
    /// assert_eq!(ParagonCommand::parse("color"), Ok(ParagonCommand::GetColor));
    /// assert_eq!(ParagonCommand::parse("color OFF"), Ok(ParagonCommand::SetColor(false)));
    /// assert_eq!(ParagonCommand::parse("colour on"), Err(CommandError::Usage));
    /// ```
    pub fn parse(args: &str) -> Result<Self, CommandError> {
        let mut words = args.split_whitespace();
        if !words
            .next()
            .is_some_and(|word| word.eq_ignore_ascii_case("color"))
        {
            return Err(CommandError::Usage);
        }

        let command = match words.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("get") => ParagonCommand::GetColor,
            Some("on") => ParagonCommand::SetColor(true),
            Some("off") => ParagonCommand::SetColor(false),
            Some(_) => return Err(CommandError::Usage),
        };

        if words.next().is_some() {
            return Err(CommandError::Usage);
        }
        Ok(command)
    }

    /// Run the command for `player` and reply with the resulting state.
    ///
    /// Returns whether tier colors are on afterwards.
    pub fn run(self, engine: &ParagonEngine, player: &mut dyn Player) -> bool {
        let character = player.id();
        let enabled = match self {
            ParagonCommand::GetColor => engine.is_tier_color_enabled(character),
            ParagonCommand::SetColor(enabled) => {
                engine.set_tier_color_enabled(character, enabled);
                enabled
            }
        };

        let state = if enabled { "on" } else { "off" };
        player.send_system_message(&format!("Paragon tier colors are {state}."));
        enabled
    }
}

/// Parse and run a command line.
///
/// Console invocations are refused. A character that sends a bad command
/// line gets the usage text back.
pub fn dispatch(engine: &ParagonEngine, invoker: Invoker<'_>, args: &str) -> Result<bool, CommandError> {
    let Invoker::Character(player) = invoker else {
        return Err(CommandError::ConsoleNotAllowed);
    };

    match ParagonCommand::parse(args) {
        Ok(command) => Ok(command.run(engine, player)),
        Err(err) => {
            player.send_system_message(&err.to_string());
            Err(err)
        }
    }
}
