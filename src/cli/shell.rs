use std::{
    env,
    io::{self, BufRead},
};

use chrono::NaiveDate;
use rustyline::{error::ReadlineError, DefaultEditor};
use shell_words::split;
use thiserror::Error;
use uuid::Uuid;

use super::{commands, output, registry::CommandRegistry};
use crate::{
    clock::{Clock, FixedClock, SystemClock},
    config::{Config, ConfigManager},
    errors::BillingError,
    services::MemoryStore,
};

const SCRIPT_ENV: &str = "BILLING_CORE_CLI_SCRIPT";
const TODAY_ENV: &str = "BILLING_CORE_TODAY";
const PROMPT: &str = "billing> ";

/// Fatal errors that stop the shell.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BillingError),
    #[error("Input error: {0}")]
    Input(String),
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Input(err.to_string())
    }
}

impl From<ReadlineError> for CliError {
    fn from(err: ReadlineError) -> Self {
        CliError::Input(err.to_string())
    }
}

/// Errors of a single command; reported and the loop continues.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Billing(#[from] BillingError),
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Unknown command `{0}`")]
    UnknownCommand(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<LoopControl, CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// Session state shared by command handlers.
pub struct ShellContext {
    pub mode: CliMode,
    pub config: Config,
    pub store: MemoryStore,
    pub cards: Vec<Uuid>,
    pub clock: Box<dyn Clock>,
    pub running: bool,
    registry: CommandRegistry,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config = ConfigManager::new()?.load()?;
        Ok(Self::with_config(mode, config, clock_from_env()?))
    }

    pub fn with_config(mode: CliMode, config: Config, clock: Box<dyn Clock>) -> Self {
        Self {
            mode,
            config,
            store: MemoryStore::new(),
            cards: Vec::new(),
            clock,
            running: true,
            registry: commands::registry(),
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn process_line(&mut self, line: &str) -> Result<LoopControl, CliError> {
        match handle_line(self, line) {
            Ok(control) => Ok(control),
            Err(err) => {
                self.report_error(err);
                Ok(LoopControl::Continue)
            }
        }
    }

    fn dispatch(&mut self, command: &str, args: &[&str]) -> CommandResult {
        let handler = self
            .registry
            .handler(command)
            .ok_or_else(|| CommandError::UnknownCommand(command.to_string()))?;
        handler(self, args)
    }

    /// Usage hints are for people at the prompt; scripts only get the error line.
    pub fn shows_hints(&self) -> bool {
        self.mode == CliMode::Interactive
    }

    pub fn report_error(&self, err: CommandError) {
        let hint = match err {
            CommandError::InvalidArguments(message) => {
                output::error(&message);
                "Use `help` for usage details."
            }
            CommandError::UnknownCommand(name) => {
                output::error(format!("Unknown command `{name}`."));
                "Use `help` to list the available commands."
            }
            other => {
                output::error(other);
                return;
            }
        };
        if self.shows_hints() {
            output::info(hint);
        }
    }
}

fn clock_from_env() -> Result<Box<dyn Clock>, CliError> {
    match env::var(TODAY_ENV) {
        Ok(raw) => {
            let today = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|err| {
                CliError::Input(format!("{TODAY_ENV} must be YYYY-MM-DD: {err}"))
            })?;
            Ok(Box::new(FixedClock::new(today)))
        }
        Err(_) => Ok(Box::new(SystemClock)),
    }
}

pub fn run_cli() -> Result<(), CliError> {
    let mode = if env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = DefaultEditor::new()?;
    output::info("Billing Core shell. Type `help` for commands, `exit` to leave.");

    while context.running {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                if context.process_line(trimmed)? == LoopControl::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        let line = line?;
        if context.process_line(&line)? == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

fn handle_line(context: &mut ShellContext, line: &str) -> CommandResult {
    let tokens = parse_command_line(line)?;
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    if raw.starts_with('#') {
        return Ok(LoopControl::Continue);
    }

    let command = raw.to_lowercase();
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    match context.dispatch(&command, &args)? {
        LoopControl::Exit => {
            context.running = false;
            Ok(LoopControl::Exit)
        }
        LoopControl::Continue => Ok(LoopControl::Continue),
    }
}

/// Splits a command line honouring shell-style quoting.
pub fn parse_command_line(line: &str) -> Result<Vec<String>, CommandError> {
    split(line).map_err(|err| CommandError::InvalidArguments(format!("could not parse line: {err}")))
}
