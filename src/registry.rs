//! Command registry.
//!
//! A static table of every command with its aliases, help text and bound
//! generator. The same table drives exact dispatch, the help listing and
//! suggestion ranking.

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::generators::Generator;

/// Definition of a single command.
#[derive(Debug)]
pub struct CommandSpec {
    /// Canonical name
    pub name: &'static str,
    /// Alternative names resolving to the same generator
    pub aliases: &'static [&'static str],
    /// Name with parameter hint, shown in help
    pub usage: &'static str,
    pub description: &'static str,
    /// Example query, starting with the canonical name
    pub example: &'static str,
    pub generator: Generator,
}

/// Every command, in help-listing order.
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "password",
        aliases: &["pwd"],
        usage: "password [length]",
        description: "Generate secure password (default: 12 chars)",
        example: "password 16",
        generator: Generator::Password,
    },
    CommandSpec {
        name: "pin",
        aliases: &[],
        usage: "pin [4|6]",
        description: "Generate secure PIN code (default: 4 digits)",
        example: "pin 6",
        generator: Generator::Pin,
    },
    CommandSpec {
        name: "email",
        aliases: &[],
        usage: "email",
        description: "Generate random email address",
        example: "email",
        generator: Generator::Email,
    },
    CommandSpec {
        name: "name",
        aliases: &[],
        usage: "name",
        description: "Generate random full name",
        example: "name",
        generator: Generator::Name,
    },
    CommandSpec {
        name: "address",
        aliases: &[],
        usage: "address",
        description: "Generate random address",
        example: "address",
        generator: Generator::Address,
    },
    CommandSpec {
        name: "phone",
        aliases: &[],
        usage: "phone",
        description: "Generate random phone number",
        example: "phone",
        generator: Generator::Phone,
    },
    CommandSpec {
        name: "company",
        aliases: &[],
        usage: "company",
        description: "Generate random company name",
        example: "company",
        generator: Generator::Company,
    },
    CommandSpec {
        name: "lorem",
        aliases: &[],
        usage: "lorem [words]",
        description: "Generate lorem ipsum text",
        example: "lorem 20",
        generator: Generator::Lorem,
    },
    CommandSpec {
        name: "number",
        aliases: &["num"],
        usage: "number [min-max]",
        description: "Generate random number",
        example: "number 1-1000",
        generator: Generator::Number,
    },
    CommandSpec {
        name: "date",
        aliases: &[],
        usage: "date",
        description: "Generate random date",
        example: "date",
        generator: Generator::Date,
    },
    CommandSpec {
        name: "guid",
        aliases: &["uuid"],
        usage: "guid",
        description: "Generate random GUID/UUID",
        example: "guid",
        generator: Generator::Guid,
    },
    CommandSpec {
        name: "color",
        aliases: &[],
        usage: "color",
        description: "Generate random hex color",
        example: "color",
        generator: Generator::Color,
    },
    CommandSpec {
        name: "url",
        aliases: &[],
        usage: "url",
        description: "Generate random URL",
        example: "url",
        generator: Generator::Url,
    },
    CommandSpec {
        name: "creditcard",
        aliases: &["credit"],
        usage: "creditcard",
        description: "Generate random credit card number",
        example: "creditcard",
        generator: Generator::CreditCard,
    },
];

/// One suggestible name: a canonical command or one of its aliases.
#[derive(Debug, Clone, Copy)]
pub struct CommandEntry {
    pub name: &'static str,
    pub spec: &'static CommandSpec,
}

impl CommandEntry {
    pub fn is_alias(&self) -> bool {
        self.name != self.spec.name
    }

    pub fn description(&self) -> String {
        if self.is_alias() {
            format!("{} (alias)", self.spec.description)
        } else {
            self.spec.description.to_string()
        }
    }

    /// The command's example, spelled with this entry's name
    pub fn example(&self) -> String {
        match self.spec.example.strip_prefix(self.spec.name) {
            Some(rest) => format!("{}{}", self.name, rest),
            None => self.spec.example.to_string(),
        }
    }
}

lazy_static! {
    /// Canonical names and aliases, each as its own entry, in registry order
    static ref ENTRIES: Vec<CommandEntry> = COMMANDS
        .iter()
        .flat_map(|spec| {
            std::iter::once(spec.name)
                .chain(spec.aliases.iter().copied())
                .map(move |name| CommandEntry { name, spec })
        })
        .collect();

    static ref INDEX: HashMap<&'static str, &'static CommandSpec> = ENTRIES
        .iter()
        .map(|entry| (entry.name, entry.spec))
        .collect();
}

/// Exact lookup by canonical name or alias. `name` must already be lower-cased.
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    INDEX.get(name).copied()
}

/// All suggestible names
pub fn entries() -> &'static [CommandEntry] {
    &ENTRIES
}

pub fn commands() -> &'static [CommandSpec] {
    COMMANDS
}
