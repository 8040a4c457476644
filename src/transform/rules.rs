use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::ChangeCategory;
use super::span_map::Span;
use crate::parser::quoted_spans;

/// Command position inside an invocation body: optional `--key=value` / `--flag` globals,
/// then the main command token.
fn main_command_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^(?:[ \t]+--?[A-Za-z0-9][\w-]*(?:=[^ \t]*)?)*[ \t]+(?P<command>[^ \t-][^ \t]*)")
            .expect("main command regex should compile")
    })
}

fn output_type_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?P<flag>--output-type|-o)(?P<separator>=|[ \t]+)(?P<value>(?i:csv|tsv))")
            .expect("output type regex should compile")
    })
}

/// A `--selector` directly followed by another `--selector` has no value of its own and is
/// consumed together with it.
fn selector_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r#"--selector(?:(?:=|[ \t]+)--selector)*(?:=|[ \t]+)(?:"(?:(?:name|id|tag)=)?(?P<double>[^"]*)"|'(?:(?:name|id|tag)=)?(?P<single>[^']*)'|(?:(?:name|id|tag)=)?(?P<bare>[^ \t"'-][^ \t"']*))"#,
        )
        .expect("selector regex should compile")
    })
}

fn zone_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"--zone(?:[ \t]*=[ \t]*|[ \t]+)(?P<value>[A-Za-z0-9][A-Za-z0-9-]*)")
            .expect("zone regex should compile")
    })
}

pub(super) const RESOURCE_RENAMES: &[(&str, &str)] = &[
    ("iso-image", "cdrom"),
    ("startup-script", "note"),
    ("ipv4", "ipaddress"),
    ("price", "service-class"),
];

pub(super) const PRODUCT_ALIASES: &[(&str, &str)] = &[
    ("product-disk", "disk-plan"),
    ("product-internet", "internet-plan"),
    ("product-server", "server-plan"),
    ("product-license", "license-info"),
    ("product-private-host", "private-host-plan"),
];

pub(super) const UNSUPPORTED_COMMANDS: &[(&str, &str)] = &[
    ("summary", "'summary' was removed in v1; list each resource with its own 'list' command"),
    (
        "object-storage",
        "'object-storage' was removed in v1; use an S3-compatible client instead",
    ),
    (
        "ojs",
        "'ojs' (object-storage) was removed in v1; use an S3-compatible client instead",
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    OutputFormat,
    SelectorArgument,
    ZoneCanonical,
    CommandRename(&'static [(&'static str, &'static str)]),
    Unsupported(&'static [(&'static str, &'static str)]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum RuleAction {
    Replace { span: Span, replacement: String },
    Retire { guidance: &'static str },
}

/// Part of a line that belongs to one CLI invocation. `body` starts right after the
/// invocation keyword.
#[derive(Debug, Clone, Copy)]
pub(super) struct Segment {
    pub(super) body_start: usize,
    pub(super) end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: &'static str,
    pub category: ChangeCategory,
    pub kind: RuleKind,
}

impl Rule {
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, RuleKind::Unsupported(_))
    }

    pub(super) fn find(&self, line: &str, segment: Segment) -> Vec<RuleAction> {
        let body = &line[segment.body_start..segment.end];
        let offset = segment.body_start;

        match self.kind {
            RuleKind::OutputFormat => option_rewrites(body, offset, output_type_regex(), |captures| {
                let flag = &captures["flag"];
                let separator = &captures["separator"];
                Some(format!("{flag}{separator}json"))
            }),
            RuleKind::SelectorArgument => option_rewrites(body, offset, selector_regex(), |captures| {
                if let Some(value) = captures.name("double") {
                    Some(format!("\"{}\"", value.as_str()))
                } else if let Some(value) = captures.name("single") {
                    Some(format!("'{}'", value.as_str()))
                } else {
                    captures.name("bare").map(|value| value.as_str().to_string())
                }
            }),
            RuleKind::ZoneCanonical => option_rewrites(body, offset, zone_regex(), |captures| {
                let canonical = format!("--zone={}", captures["value"].to_lowercase());
                (canonical != captures[0]).then_some(canonical)
            }),
            RuleKind::CommandRename(table) => main_command(body, offset)
                .and_then(|(span, command)| {
                    lookup(table, command).map(|replacement| RuleAction::Replace {
                        span,
                        replacement: replacement.to_string(),
                    })
                })
                .into_iter()
                .collect(),
            RuleKind::Unsupported(table) => main_command(body, offset)
                .and_then(|(_, command)| lookup(table, command))
                .map(|guidance| RuleAction::Retire { guidance })
                .into_iter()
                .collect(),
        }
    }
}

pub(super) fn builtin_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "selector-to-argument",
            category: ChangeCategory::SelectorMigration,
            kind: RuleKind::SelectorArgument,
        },
        Rule {
            name: "output-type-json",
            category: ChangeCategory::OutputFormat,
            kind: RuleKind::OutputFormat,
        },
        Rule {
            name: "zone-canonical",
            category: ChangeCategory::ZoneNormalize,
            kind: RuleKind::ZoneCanonical,
        },
        Rule {
            name: "resource-rename",
            category: ChangeCategory::ResourceRename,
            kind: RuleKind::CommandRename(RESOURCE_RENAMES),
        },
        Rule {
            name: "product-alias",
            category: ChangeCategory::ProductAlias,
            kind: RuleKind::CommandRename(PRODUCT_ALIASES),
        },
        Rule {
            name: "unsupported-command",
            category: ChangeCategory::DeprecatedCommand,
            kind: RuleKind::Unsupported(UNSUPPORTED_COMMANDS),
        },
    ]
}

fn lookup(table: &'static [(&'static str, &'static str)], command: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, value)| *value)
}

fn main_command(body: &str, offset: usize) -> Option<(Span, &str)> {
    let command = main_command_regex().captures(body)?.name("command")?;
    let end = command.end();
    if end < body.len() && !body.as_bytes()[end].is_ascii_whitespace() {
        return None;
    }
    Some((
        Span {
            start: offset + command.start(),
            end: offset + end,
        },
        command.as_str(),
    ))
}

/// Rewrites every whole-token match of `regex` in `body`. A match must be preceded and
/// followed by whitespace or the body edge, so `--auto-o csv` or `--zone=is1a,x` never match.
/// Matches that start inside a quoted argument are left alone.
fn option_rewrites<F>(body: &str, offset: usize, regex: &Regex, mut rewrite: F) -> Vec<RuleAction>
where
    F: FnMut(&Captures<'_>) -> Option<String>,
{
    let bytes = body.as_bytes();
    let quoted = quoted_spans(body);
    regex
        .captures_iter(body)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            if quoted.iter().any(|span| span.contains(&whole.start())) {
                return None;
            }
            let before_ok = whole.start() == 0 || bytes[whole.start() - 1].is_ascii_whitespace();
            let after_ok = whole.end() == bytes.len() || bytes[whole.end()].is_ascii_whitespace();
            if !before_ok || !after_ok {
                return None;
            }
            let replacement = rewrite(&captures)?;
            Some(RuleAction::Replace {
                span: Span {
                    start: offset + whole.start(),
                    end: offset + whole.end(),
                },
                replacement,
            })
        })
        .collect()
}
