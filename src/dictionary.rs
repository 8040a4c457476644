use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

mod table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandCategory {
    Compute,
    Storage,
    Network,
    Appliance,
    Security,
    Global,
    Billing,
    Misc,
}

impl CommandCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compute => "compute",
            Self::Storage => "storage",
            Self::Network => "network",
            Self::Appliance => "appliance",
            Self::Security => "security",
            Self::Global => "global",
            Self::Billing => "billing",
            Self::Misc => "misc",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::Compute,
            Self::Storage,
            Self::Network,
            Self::Appliance,
            Self::Security,
            Self::Global,
            Self::Billing,
            Self::Misc,
        ]
        .into_iter()
        .find(|category| category.as_str().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDictionaryEntry {
    pub command: String,
    pub subcommands: Vec<String>,
    pub description: String,
    pub category: CommandCategory,
}

/// Read-only command taxonomy of the current CLI release.
///
/// Every lookup lower-cases its input before comparing. The dictionary is built once and
/// then shared by reference; nothing mutates it after construction.
#[derive(Debug, Clone)]
pub struct CommandDictionary {
    entries: BTreeMap<String, CommandDictionaryEntry>,
    standalone: BTreeSet<String>,
}

impl CommandDictionary {
    pub fn builtin() -> Self {
        let entries = table::COMMANDS
            .iter()
            .map(|row| {
                let entry = CommandDictionaryEntry {
                    command: row.command.to_string(),
                    subcommands: row.subcommands.iter().map(ToString::to_string).collect(),
                    description: row.description.to_string(),
                    category: row.category,
                };
                (entry.command.clone(), entry)
            })
            .collect();
        let standalone = table::STANDALONE_COMMANDS
            .iter()
            .map(ToString::to_string)
            .collect();

        Self::from_entries(entries, standalone)
    }

    pub fn from_entries(
        entries: BTreeMap<String, CommandDictionaryEntry>,
        standalone: BTreeSet<String>,
    ) -> Self {
        let entries = entries
            .into_iter()
            .map(|(command, mut entry)| {
                entry.command = entry.command.to_lowercase();
                for subcommand in &mut entry.subcommands {
                    *subcommand = subcommand.to_lowercase();
                }
                (command.to_lowercase(), entry)
            })
            .collect();
        let standalone = standalone
            .into_iter()
            .map(|command| command.to_lowercase())
            .collect();
        Self {
            entries,
            standalone,
        }
    }

    pub fn exists(&self, command: &str) -> bool {
        self.entries.contains_key(&command.to_lowercase())
    }

    pub fn entry(&self, command: &str) -> Option<&CommandDictionaryEntry> {
        self.entries.get(&command.to_lowercase())
    }

    pub fn subcommands_of(&self, command: &str) -> Option<&[String]> {
        self.entry(command).map(|entry| entry.subcommands.as_slice())
    }

    pub fn is_valid_subcommand(&self, command: &str, sub: &str) -> bool {
        let sub = sub.to_lowercase();
        self.subcommands_of(command)
            .is_some_and(|subcommands| subcommands.iter().any(|candidate| *candidate == sub))
    }

    pub fn all_commands(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CommandDictionaryEntry> {
        self.entries.values()
    }

    pub fn is_standalone(&self, command: &str) -> bool {
        self.standalone.contains(&command.to_lowercase())
    }

    pub fn standalone_commands(&self) -> Vec<String> {
        self.standalone.iter().cloned().collect()
    }

    pub fn requires_subcommand(&self, command: &str) -> bool {
        !self.is_standalone(command)
            && self
                .subcommands_of(command)
                .is_some_and(|subcommands| !subcommands.is_empty())
    }
}

impl Default for CommandDictionary {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::{CommandCategory, CommandDictionary, CommandDictionaryEntry};

    #[test]
    fn lookups_are_case_insensitive() {
        let dictionary = CommandDictionary::builtin();
        assert!(dictionary.exists("server"));
        assert!(dictionary.exists("SERVER"));
        assert!(dictionary.is_valid_subcommand("Disk", "READ"));
        assert!(!dictionary.exists("serv"));
    }

    #[test]
    fn custom_entries_are_stored_lower_case() {
        let entry = CommandDictionaryEntry {
            command: "Widget".to_string(),
            subcommands: vec!["List".to_string(), "READ".to_string()],
            description: "Widgets".to_string(),
            category: CommandCategory::Misc,
        };
        let dictionary = CommandDictionary::from_entries(
            BTreeMap::from([("Widget".to_string(), entry)]),
            BTreeSet::from(["Ping".to_string()]),
        );

        assert!(dictionary.is_valid_subcommand("widget", "list"));
        assert!(dictionary.is_valid_subcommand("WIDGET", "Read"));
        assert_eq!(
            dictionary.entry("widget").map(|entry| entry.command.as_str()),
            Some("widget")
        );
        assert!(dictionary.is_standalone("ping"));
    }

    #[test]
    fn all_commands_is_sorted_and_unique() {
        let dictionary = CommandDictionary::builtin();
        let commands = dictionary.all_commands();
        let mut sorted = commands.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(commands, sorted);
        assert!(commands.iter().any(|command| command == "server-plan"));
    }

    #[test]
    fn subcommand_lists_keep_table_order() {
        let dictionary = CommandDictionary::builtin();
        let subcommands = dictionary
            .subcommands_of("server")
            .expect("server should exist");
        assert_eq!(&subcommands[..3], &["list", "create", "read"]);
        assert!(dictionary.subcommands_of("summary").is_none());
    }

    #[test]
    fn standalone_commands_exist_and_take_no_subcommands() {
        let dictionary = CommandDictionary::builtin();
        for command in dictionary.standalone_commands() {
            assert!(dictionary.exists(&command), "{command} should be in the table");
            assert_eq!(
                dictionary.subcommands_of(&command).map(<[String]>::len),
                Some(0),
                "{command} should not list subcommands"
            );
            assert!(!dictionary.requires_subcommand(&command));
        }
    }

    #[test]
    fn every_non_standalone_command_requires_a_subcommand() {
        let dictionary = CommandDictionary::builtin();
        for entry in dictionary.entries() {
            if !dictionary.is_standalone(&entry.command) {
                assert!(
                    dictionary.requires_subcommand(&entry.command),
                    "{} should require a subcommand",
                    entry.command
                );
            }
        }
    }

    #[test]
    fn subcommand_lists_have_no_duplicates() {
        let dictionary = CommandDictionary::builtin();
        for entry in dictionary.entries() {
            let unique = entry.subcommands.iter().collect::<BTreeSet<_>>();
            assert_eq!(
                unique.len(),
                entry.subcommands.len(),
                "{} lists a subcommand twice",
                entry.command
            );
        }
    }

    #[test]
    fn category_names_round_trip_through_lookup() {
        assert_eq!(
            CommandCategory::from_name("Storage"),
            Some(CommandCategory::Storage)
        );
        assert_eq!(CommandCategory::from_name("nope"), None);
    }
}
