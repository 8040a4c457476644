use serde::Serialize;

use crate::dictionary::CommandDictionary;
use crate::parser::ParsedCommand;
use crate::similarity::{DEFAULT_MAX_SUGGESTIONS, SimilarityMatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorType {
    UnknownCommand,
    InvalidSubcommand,
    UnexpectedSubcommand,
    MissingSubcommand,
}

impl ValidationErrorType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown_command",
            Self::InvalidSubcommand => "invalid_subcommand",
            Self::UnexpectedSubcommand => "unexpected_subcommand",
            Self::MissingSubcommand => "missing_subcommand",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ValidationErrorType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available: Vec<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error_type: None,
            suggestions: Vec::new(),
            available: Vec::new(),
        }
    }

    fn invalid(error_type: ValidationErrorType) -> Self {
        Self {
            is_valid: false,
            error_type: Some(error_type),
            suggestions: Vec::new(),
            available: Vec::new(),
        }
    }
}

/// Checks commands against a borrowed dictionary. Holds no mutable state.
#[derive(Debug, Clone, Copy)]
pub struct CommandValidator<'d> {
    dictionary: &'d CommandDictionary,
    matcher: SimilarityMatcher,
    max_suggestions: usize,
}

impl<'d> CommandValidator<'d> {
    pub fn new(dictionary: &'d CommandDictionary) -> Self {
        Self::with_max_suggestions(dictionary, DEFAULT_MAX_SUGGESTIONS)
    }

    pub fn with_max_suggestions(dictionary: &'d CommandDictionary, max_suggestions: usize) -> Self {
        Self {
            dictionary,
            matcher: SimilarityMatcher::new(),
            max_suggestions,
        }
    }

    pub fn dictionary(&self) -> &'d CommandDictionary {
        self.dictionary
    }

    pub fn validate_main(&self, command: &str) -> ValidationResult {
        if self.dictionary.exists(command) {
            return ValidationResult::valid();
        }

        let mut result = ValidationResult::invalid(ValidationErrorType::UnknownCommand);
        result.suggestions = self.matcher.suggest(
            command,
            &self.dictionary.all_commands(),
            self.max_suggestions,
        );
        result
    }

    /// `sub` is empty when the command line carried no subcommand.
    pub fn validate_sub(&self, command: &str, sub: &str) -> ValidationResult {
        if self.dictionary.is_standalone(command) {
            if sub.is_empty() {
                return ValidationResult::valid();
            }
            return ValidationResult::invalid(ValidationErrorType::UnexpectedSubcommand);
        }

        let Some(subcommands) = self.dictionary.subcommands_of(command) else {
            return self.validate_main(command);
        };

        if sub.is_empty() {
            if self.dictionary.requires_subcommand(command) {
                let mut result = ValidationResult::invalid(ValidationErrorType::MissingSubcommand);
                result.available = subcommands.to_vec();
                return result;
            }
            return ValidationResult::valid();
        }

        if !self.dictionary.is_valid_subcommand(command, sub) {
            let mut result = ValidationResult::invalid(ValidationErrorType::InvalidSubcommand);
            result.suggestions = self.matcher.suggest(sub, subcommands, self.max_suggestions);
            result.available = subcommands.to_vec();
            return result;
        }

        ValidationResult::valid()
    }

    pub fn validate(&self, parsed: &ParsedCommand) -> ValidationResult {
        let main = self.validate_main(&parsed.main_command);
        if !main.is_valid {
            return main;
        }
        self.validate_sub(&parsed.main_command, parsed.sub_command_or_empty())
    }
}
