use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::dictionary::CommandDictionary;
use crate::impact::{ImpactAnalysis, ImpactAnalyzer, RiskLevel};
use crate::parser::{CommandLineParser, DEFAULT_INVOCATION, ParsedCommand, invocation_segments};
use crate::similarity::DEFAULT_MAX_SUGGESTIONS;
use crate::transform::{ChangeCategory, TransformEngine, TransformResult};
use crate::validate::{CommandValidator, ValidationResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub invocation: String,
    pub max_suggestions: usize,
    /// Validate the rewritten line rather than the input line.
    pub validate_transformed: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            invocation: DEFAULT_INVOCATION.to_string(),
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            validate_transformed: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandCheck {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<ParsedCommand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
}

impl CommandCheck {
    pub fn is_valid(&self) -> bool {
        self.parse_error.is_none()
            && self
                .validation
                .as_ref()
                .is_none_or(|validation| validation.is_valid)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum LineEnding {
    #[default]
    None,
    Lf,
    CrLf,
}

impl LineEnding {
    fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineReport {
    pub line_number: usize,
    pub transform: TransformResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<CommandCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<ImpactAnalysis>,
    #[serde(skip)]
    ending: LineEnding,
}

impl LineReport {
    pub fn invalid_checks(&self) -> impl Iterator<Item = &CommandCheck> {
        self.checks.iter().filter(|check| !check.is_valid())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptSummary {
    pub total_lines: usize,
    pub changed_lines: usize,
    pub total_changes: usize,
    pub changes_by_category: BTreeMap<ChangeCategory, usize>,
    pub invalid_commands: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_risk: Option<RiskLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptReport {
    pub lines: Vec<LineReport>,
    pub summary: ScriptSummary,
}

impl ScriptReport {
    /// The rewritten script, with every line keeping its original line ending.
    pub fn transformed_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(&line.transform.transformed_line);
            text.push_str(line.ending.as_str());
        }
        text
    }

    pub fn changed(&self) -> bool {
        self.summary.changed_lines > 0
    }
}

/// Owns the migration components for one run. Everything else borrows from it.
pub struct MigrationContext {
    settings: Settings,
    dictionary: CommandDictionary,
    parser: CommandLineParser,
    engine: TransformEngine,
    analyzer: ImpactAnalyzer,
}

impl MigrationContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            dictionary: CommandDictionary::builtin(),
            parser: CommandLineParser::new(settings.invocation.clone()),
            engine: TransformEngine::with_invocation(settings.invocation.clone()),
            analyzer: ImpactAnalyzer::new(settings.invocation.clone()),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn dictionary(&self) -> &CommandDictionary {
        &self.dictionary
    }

    pub fn parser(&self) -> &CommandLineParser {
        &self.parser
    }

    pub fn engine(&self) -> &TransformEngine {
        &self.engine
    }

    pub fn analyzer(&self) -> &ImpactAnalyzer {
        &self.analyzer
    }

    pub fn validator(&self) -> CommandValidator<'_> {
        CommandValidator::with_max_suggestions(&self.dictionary, self.settings.max_suggestions)
    }

    pub fn process_line(&self, line_number: usize, line: &str) -> LineReport {
        let transform = self.engine.apply(line);
        if transform.changed {
            debug!(
                line_number,
                changes = transform.changes.len(),
                "line rewritten"
            );
        }

        let checked = if self.settings.validate_transformed {
            transform.transformed_line.as_str()
        } else {
            line
        };
        let checks = self.check_commands(checked);

        let impact = (!invocation_segments(&transform.transformed_line, &self.settings.invocation)
            .is_empty())
        .then(|| self.analyzer.analyze(&transform.transformed_line));

        LineReport {
            line_number,
            transform,
            checks,
            impact,
            ending: LineEnding::None,
        }
    }

    pub fn process_script(&self, text: &str) -> ScriptReport {
        let lines = split_lines(text)
            .enumerate()
            .map(|(index, (line, ending))| {
                let mut report = self.process_line(index + 1, line);
                report.ending = ending;
                report
            })
            .collect::<Vec<_>>();
        let summary = summarize(&lines);
        ScriptReport { lines, summary }
    }

    fn check_commands(&self, line: &str) -> Vec<CommandCheck> {
        let validator = self.validator();
        invocation_segments(line, &self.settings.invocation)
            .into_iter()
            .map(|range| {
                let command = line[range].to_string();
                match self.parser.parse_invocation(&command) {
                    Ok(parsed) => CommandCheck {
                        validation: Some(validator.validate(&parsed)),
                        parsed: Some(parsed),
                        parse_error: None,
                        command,
                    },
                    Err(error) => CommandCheck {
                        command,
                        parsed: None,
                        parse_error: Some(error.to_string()),
                        validation: None,
                    },
                }
            })
            .collect()
    }
}

impl Default for MigrationContext {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

fn split_lines(text: &str) -> impl Iterator<Item = (&str, LineEnding)> {
    text.split_inclusive('\n').map(|line| {
        if let Some(content) = line.strip_suffix("\r\n") {
            (content, LineEnding::CrLf)
        } else if let Some(content) = line.strip_suffix('\n') {
            (content, LineEnding::Lf)
        } else {
            (line, LineEnding::None)
        }
    })
}

fn summarize(lines: &[LineReport]) -> ScriptSummary {
    let mut summary = ScriptSummary {
        total_lines: lines.len(),
        ..ScriptSummary::default()
    };
    for line in lines {
        if line.transform.changed {
            summary.changed_lines += 1;
        }
        summary.total_changes += line.transform.changes.len();
        for change in &line.transform.changes {
            *summary.changes_by_category.entry(change.category).or_default() += 1;
        }
        summary.invalid_commands += line.invalid_checks().count();
        if let Some(impact) = &line.impact {
            summary.highest_risk = summary.highest_risk.max(Some(impact.risk));
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::{MigrationContext, Settings};
    use crate::impact::RiskLevel;
    use crate::transform::ChangeCategory;
    use crate::validate::ValidationErrorType;

    const SCRIPT: &str = "#!/bin/bash\n\
        usacloud server list --output-type=csv\n\
        usacloud iso-image read --selector name=ubuntu\n\
        usacloud summary\n\
        usacloud serber list\n\
        echo done\n";

    #[test]
    fn script_summary_counts_changes_and_invalid_commands() {
        let report = MigrationContext::default().process_script(SCRIPT);

        assert_eq!(report.summary.total_lines, 6);
        assert_eq!(report.summary.changed_lines, 3);
        assert_eq!(report.summary.total_changes, 4);
        assert_eq!(
            report
                .summary
                .changes_by_category
                .get(&ChangeCategory::SelectorMigration),
            Some(&1)
        );
        assert_eq!(report.summary.invalid_commands, 1);
        assert_eq!(report.summary.highest_risk, Some(RiskLevel::Low));
        assert!(report.changed());
    }

    #[test]
    fn invalid_main_command_carries_suggestions() {
        let report = MigrationContext::default().process_script(SCRIPT);
        let line = &report.lines[4];
        assert_eq!(line.line_number, 5);

        let invalid = line.invalid_checks().collect::<Vec<_>>();
        assert_eq!(invalid.len(), 1);
        let validation = invalid[0]
            .validation
            .as_ref()
            .expect("parsed command should be validated");
        assert_eq!(
            validation.error_type,
            Some(ValidationErrorType::UnknownCommand)
        );
        assert_eq!(validation.suggestions.first().map(String::as_str), Some("server"));
    }

    #[test]
    fn commented_out_lines_are_not_validated() {
        let report = MigrationContext::default().process_line(1, "usacloud summary");
        assert!(report.transform.changed);
        assert!(report.checks.is_empty());
        assert!(report.impact.is_none());
    }

    #[test]
    fn raw_validation_sees_the_legacy_command() {
        let context = MigrationContext::new(Settings {
            validate_transformed: false,
            ..Settings::default()
        });
        let report = context.process_line(1, "usacloud iso-image list");
        assert_eq!(report.transform.transformed_line, "usacloud cdrom list");
        assert_eq!(report.invalid_checks().count(), 1);

        let transformed = MigrationContext::default().process_line(1, "usacloud iso-image list");
        assert_eq!(transformed.invalid_checks().count(), 0);
    }

    #[test]
    fn global_options_before_the_main_command_validate_cleanly() {
        let report = MigrationContext::default().process_script("usacloud --zone is1a server list
");
        let line = &report.lines[0];
        assert_eq!(line.transform.transformed_line, "usacloud --zone=is1a server list");
        assert_eq!(line.checks.len(), 1);
        assert!(line.checks[0].is_valid());
        let parsed = line.checks[0]
            .parsed
            .as_ref()
            .expect("command should parse");
        assert_eq!(parsed.main_command, "server");
        assert_eq!(parsed.options.get("zone").map(String::as_str), Some("is1a"));
        assert_eq!(report.summary.invalid_commands, 0);
    }

    #[test]
    fn bare_invocation_is_a_parse_failure_not_a_crash() {
        let report = MigrationContext::default().process_line(3, "usacloud");
        assert_eq!(report.checks.len(), 1);
        assert!(
            report.checks[0]
                .parse_error
                .as_deref()
                .is_some_and(|message| message.contains("no command"))
        );
        assert!(!report.checks[0].is_valid());
    }

    #[test]
    fn line_endings_and_missing_final_newline_are_preserved() {
        let context = MigrationContext::default();

        let crlf = "usacloud server list -o csv\r\necho ok\r\n";
        assert_eq!(
            context.process_script(crlf).transformed_text(),
            "usacloud server list -o json\r\necho ok\r\n"
        );

        let no_final_newline = "echo a\nusacloud ipv4 list";
        assert_eq!(
            context.process_script(no_final_newline).transformed_text(),
            "echo a\nusacloud ipaddress list"
        );

        let blank_lines = "\n\nusacloud zone list\n";
        let report = context.process_script(blank_lines);
        assert_eq!(report.summary.total_lines, 3);
        assert_eq!(report.transformed_text(), blank_lines);
        assert!(!report.changed());
    }

    #[test]
    fn empty_script_has_no_lines() {
        let report = MigrationContext::default().process_script("");
        assert!(report.lines.is_empty());
        assert_eq!(report.transformed_text(), "");
        assert_eq!(report.summary.highest_risk, None);
    }

    #[test]
    fn highest_risk_is_the_maximum_over_lines() {
        let report = MigrationContext::default()
            .process_script("usacloud server list\nusacloud server delete web -y\n");
        assert_eq!(report.summary.highest_risk, Some(RiskLevel::Critical));
    }

    #[test]
    fn summary_serializes_categories_as_keys() {
        let report = MigrationContext::default().process_script("usacloud ipv4 list -o csv\n");
        let value = serde_json::to_value(&report.summary).expect("summary should serialize");
        assert_eq!(value["changes_by_category"]["resource-rename"], 1);
        assert_eq!(value["changes_by_category"]["output-format"], 1);
    }
}
