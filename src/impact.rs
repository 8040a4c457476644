use serde::Serialize;

use crate::parser::{DEFAULT_INVOCATION, invocation_segments, tokenize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

const RISK_TIERS: &[(RiskLevel, &[&str])] = &[
    (RiskLevel::Critical, &["delete", "reset", "delete-all-cache"]),
    (
        RiskLevel::High,
        &[
            "shutdown",
            "update",
            "edit",
            "resize-partition",
            "disconnect-from-server",
            "disconnect-from-bridge",
            "update-bandwidth",
            "deactivate",
            "--force",
        ],
    ),
    (
        RiskLevel::Medium,
        &[
            "create",
            "boot",
            "upload",
            "connect-to-server",
            "connect-to-bridge",
            "send-nmi",
            "activate",
            "use",
        ],
    ),
    (
        RiskLevel::Low,
        &["list", "read", "monitor-cpu", "monitor-disk", "version", "ssh", "vnc"],
    ),
];

const CREATE_BONUS: u32 = 2;
const DELETE_BONUS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactAnalysis {
    pub risk: RiskLevel,
    pub complexity: u32,
    pub resources: Vec<String>,
    pub dependencies: Vec<String>,
}

/// Scores a (transformed) line for reporting and for deciding whether to confirm before running
/// it. Works on text only.
#[derive(Debug, Clone)]
pub struct ImpactAnalyzer {
    invocation: String,
}

impl ImpactAnalyzer {
    pub fn new(invocation: impl Into<String>) -> Self {
        Self {
            invocation: invocation.into(),
        }
    }

    pub fn analyze(&self, command: &str) -> ImpactAnalysis {
        let tokens = tokenize(command)
            .into_iter()
            .map(|token| token.to_lowercase())
            .collect::<Vec<_>>();

        let risk = RISK_TIERS
            .iter()
            .find(|(_, keywords)| {
                keywords
                    .iter()
                    .any(|keyword| tokens.iter().any(|token| token == keyword))
            })
            .map_or(RiskLevel::Low, |(level, _)| *level);

        let operators = shell_operators(command);
        let option_count = tokens.iter().filter(|token| token.starts_with('-')).count();
        let mut complexity = 1 + option_count as u32 + operators.pipes + operators.chains;
        if tokens.iter().any(|token| token == "create") {
            complexity += CREATE_BONUS;
        }
        if tokens.iter().any(|token| token == "delete") {
            complexity += DELETE_BONUS;
        }

        ImpactAnalysis {
            risk,
            complexity,
            resources: self.resources(command),
            dependencies: self.dependencies(command),
        }
    }

    fn resources(&self, command: &str) -> Vec<String> {
        let mut resources = Vec::new();
        for range in invocation_segments(command, &self.invocation) {
            let resource = tokenize(&command[range])
                .into_iter()
                .skip(1)
                .find(|token| !token.starts_with('-'));
            if let Some(resource) = resource
                && !resources.contains(&resource)
            {
                resources.push(resource);
            }
        }
        resources
    }

    fn dependencies(&self, command: &str) -> Vec<String> {
        let mut dependencies = Vec::new();
        for part in split_commands(command) {
            let Some(program) = program_name(part) else {
                continue;
            };
            if program == self.invocation || program.starts_with('#') {
                continue;
            }
            if !dependencies.contains(&program) {
                dependencies.push(program);
            }
        }
        dependencies
    }
}

impl Default for ImpactAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_INVOCATION)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct OperatorCounts {
    pipes: u32,
    chains: u32,
}

fn shell_operators(command: &str) -> OperatorCounts {
    let mut counts = OperatorCounts::default();
    let mut quote: Option<char> = None;
    let mut previous: Option<char> = None;
    let mut characters = command.chars().peekable();
    while let Some(character) = characters.next() {
        let before = previous.replace(character);
        if let Some(open) = quote {
            if character == open {
                quote = None;
            }
            continue;
        }
        match character {
            '"' | '\'' => quote = Some(character),
            '#' if before.is_none_or(char::is_whitespace) => break,
            '|' if characters.next_if_eq(&'|').is_some() => counts.chains += 1,
            '|' => counts.pipes += 1,
            '&' if characters.next_if_eq(&'&').is_some() => counts.chains += 1,
            ';' => counts.chains += 1,
            _ => {}
        }
    }
    counts
}

/// First word of a pipeline stage, looking through `NAME=value` prefixes and into `$(...)`.
fn program_name(part: &str) -> Option<String> {
    for token in tokenize(part) {
        let word = match token.split_once('=') {
            Some((name, value)) if is_variable_name(name) => match value.strip_prefix("$(") {
                Some(inner) => inner.to_string(),
                None => continue,
            },
            _ => token.trim_start_matches("$(").trim_start_matches(['(', '{']).to_string(),
        };
        if !word.is_empty() {
            return Some(word);
        }
    }
    None
}

fn is_variable_name(name: &str) -> bool {
    let mut characters = name.chars();
    characters
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && characters.all(|character| character.is_ascii_alphanumeric() || character == '_')
}

/// Splits a line on unquoted `|`, `&&`, `||` and `;`.
fn split_commands(command: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<u8> = None;
    let mut start = 0;
    let bytes = command.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        let byte = bytes[index];
        if let Some(open) = quote {
            if byte == open {
                quote = None;
            }
            index += 1;
            continue;
        }
        match byte {
            b'"' | b'\'' => quote = Some(byte),
            b'|' | b'&' | b';' => {
                parts.push(&command[start..index]);
                while index + 1 < bytes.len() && bytes[index + 1] == byte {
                    index += 1;
                }
                start = index + 1;
            }
            _ => {}
        }
        index += 1;
    }
    parts.push(&command[start..]);
    parts
}
