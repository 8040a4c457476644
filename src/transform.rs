use serde::Serialize;
use tracing::trace;

use crate::parser::{DEFAULT_INVOCATION, invocation_segments};

mod rules;
mod span_map;

pub use rules::{Rule, RuleKind};
pub use span_map::Span;

use rules::{RuleAction, Segment};
use span_map::SpanMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeCategory {
    OutputFormat,
    SelectorMigration,
    ResourceRename,
    ProductAlias,
    ZoneNormalize,
    DeprecatedCommand,
}

impl ChangeCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OutputFormat => "output-format",
            Self::SelectorMigration => "selector-migration",
            Self::ResourceRename => "resource-rename",
            Self::ProductAlias => "product-alias",
            Self::ZoneNormalize => "zone-normalize",
            Self::DeprecatedCommand => "deprecated-command",
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Self::OutputFormat => "csv/tsv output was removed in v1; json output is used instead",
            Self::SelectorMigration => {
                "--selector was removed in v1; pass the name, id or tag as an argument"
            }
            Self::ResourceRename => "resource command was renamed in v1",
            Self::ProductAlias => "product-* commands were renamed to *-plan in v1",
            Self::ZoneNormalize => "zone is written as a single lower-case --zone=<zone> option",
            Self::DeprecatedCommand => "command is not available in v1",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub rule_name: &'static str,
    pub category: ChangeCategory,
    /// Text the rule replaced, as it read when the rule ran.
    pub before: String,
    pub after: String,
    /// Byte offsets into the original line.
    pub span_start: usize,
    pub span_end: usize,
    pub reason: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformResult {
    pub original_line: String,
    pub transformed_line: String,
    pub changed: bool,
    pub changes: Vec<Change>,
}

impl TransformResult {
    fn unchanged(line: &str) -> Self {
        Self {
            original_line: line.to_string(),
            transformed_line: line.to_string(),
            changed: false,
            changes: Vec::new(),
        }
    }
}

/// Rewrites legacy invocations with a fixed, ordered rule list.
///
/// In-place rules run first and may all apply to the same line. The terminal rule comments the
/// whole line out and stops evaluation. No rule matches its own output, so applying the engine
/// to a line it already produced changes nothing.
#[derive(Debug, Clone)]
pub struct TransformEngine {
    invocation: String,
    rules: Vec<Rule>,
}

impl TransformEngine {
    pub fn new() -> Self {
        Self::with_invocation(DEFAULT_INVOCATION)
    }

    pub fn with_invocation(invocation: impl Into<String>) -> Self {
        Self {
            invocation: invocation.into(),
            rules: rules::builtin_rules(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn apply(&self, line: &str) -> TransformResult {
        if invocation_segments(line, &self.invocation).is_empty() {
            return TransformResult::unchanged(line);
        }

        let mut current = line.to_string();
        let mut changes = Vec::new();
        let mut span_map = SpanMap::new(line.len());

        for rule in &self.rules {
            let actions = self.find_actions(rule, &current);
            if actions.is_empty() {
                continue;
            }
            trace!(rule = rule.name, matches = actions.len(), "rewrite rule matched");

            let mut replacements = Vec::with_capacity(actions.len());
            let mut retired = None;
            for action in actions {
                match action {
                    RuleAction::Replace { span, replacement } => {
                        replacements.push((span, replacement));
                    }
                    RuleAction::Retire { guidance } => {
                        retired.get_or_insert(guidance);
                    }
                }
            }

            if let Some(guidance) = retired {
                let comment = comment_out(line, guidance);
                changes.push(Change {
                    rule_name: rule.name,
                    category: rule.category,
                    before: line.to_string(),
                    after: comment.clone(),
                    span_start: 0,
                    span_end: line.len(),
                    reason: rule.category.reason(),
                });
                current = comment;
                break;
            }

            replacements.sort_by_key(|(span, _)| span.start);
            for (span, replacement) in &replacements {
                let original = span_map.to_original(*span);
                changes.push(Change {
                    rule_name: rule.name,
                    category: rule.category,
                    before: current[span.start..span.end].to_string(),
                    after: replacement.clone(),
                    span_start: original.start,
                    span_end: original.end,
                    reason: rule.category.reason(),
                });
            }
            for (span, replacement) in replacements.iter().rev() {
                current.replace_range(span.start..span.end, replacement);
            }
            span_map.record(
                &replacements
                    .iter()
                    .map(|(span, replacement)| (*span, replacement.len()))
                    .collect::<Vec<_>>(),
            );
        }

        TransformResult {
            original_line: line.to_string(),
            changed: !changes.is_empty(),
            transformed_line: current,
            changes,
        }
    }

    fn find_actions(&self, rule: &Rule, line: &str) -> Vec<RuleAction> {
        invocation_segments(line, &self.invocation)
            .into_iter()
            .flat_map(|range| {
                rule.find(
                    line,
                    Segment {
                        body_start: range.start + self.invocation.len(),
                        end: range.end,
                    },
                )
            })
            .collect()
    }
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn comment_out(line: &str, guidance: &str) -> String {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];
    format!("{indent}# usacloud-update: {guidance}: {}", trimmed.trim_end())
}

#[cfg(test)]
mod tests;
