use std::collections::HashMap;

use super::shell::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// A shell command and the extra names it answers to.
pub struct CommandEntry {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            aliases: &[],
            description,
            usage,
            handler,
        }
    }

    pub fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }
}

/// Commands in registration order, looked up by name or alias.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
    lookup: HashMap<&'static str, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entry`; a later entry with the same name replaces the earlier one.
    pub fn register(&mut self, entry: CommandEntry) {
        let index = match self.lookup.get(entry.name) {
            Some(&existing) if self.entries[existing].name == entry.name => {
                self.entries[existing] = entry;
                existing
            }
            _ => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
        };
        let entry = &self.entries[index];
        for name in std::iter::once(entry.name).chain(entry.aliases.iter().copied()) {
            self.lookup.insert(name, index);
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.lookup.get(name).map(|&index| &self.entries[index])
    }

    pub fn list(&self) -> impl Iterator<Item = &CommandEntry> {
        self.entries.iter()
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.get(name).map(|entry| entry.handler)
    }
}
