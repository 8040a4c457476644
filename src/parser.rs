use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_INVOCATION: &str = "usacloud";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("command line is empty")]
    EmptyCommand,
    #[error("'{token}' is not a {invocation} invocation")]
    NotTargetCommand { token: String, invocation: String },
    #[error("{invocation} invocation has no command")]
    MissingMainCommand { invocation: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedCommand {
    pub raw: String,
    pub main_command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_command: Option<String>,
    pub positional_args: Vec<String>,
    pub options: BTreeMap<String, String>,
    pub flags: BTreeSet<String>,
}

impl ParsedCommand {
    pub fn sub_command_or_empty(&self) -> &str {
        self.sub_command.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct CommandLineParser {
    invocation: String,
}

impl CommandLineParser {
    pub fn new(invocation: impl Into<String>) -> Self {
        Self {
            invocation: invocation.into(),
        }
    }

    pub fn invocation(&self) -> &str {
        &self.invocation
    }

    pub fn parse(&self, line: &str) -> Result<ParsedCommand, ParseError> {
        self.parse_tokens(line, false)
    }

    /// Like [`parse`](Self::parse), but leading `--key=value` and `--flag` tokens before the
    /// main command are read as global options instead of taking the main command position.
    pub fn parse_invocation(&self, line: &str) -> Result<ParsedCommand, ParseError> {
        self.parse_tokens(line, true)
    }

    fn parse_tokens(&self, line: &str, global_options: bool) -> Result<ParsedCommand, ParseError> {
        let tokens = tokenize(line);
        let mut tokens = tokens.into_iter().peekable();

        let Some(first) = tokens.next() else {
            return Err(ParseError::EmptyCommand);
        };
        if first != self.invocation {
            return Err(ParseError::NotTargetCommand {
                token: first,
                invocation: self.invocation.clone(),
            });
        }

        let mut options = BTreeMap::new();
        let mut flags = BTreeSet::new();
        if global_options {
            while let Some(token) = tokens.next_if(|token| token.starts_with('-')) {
                let name = token.trim_start_matches('-');
                match name.split_once('=') {
                    Some((key, value)) => {
                        options.insert(key.to_string(), value.to_string());
                    }
                    None => {
                        flags.insert(name.to_string());
                    }
                }
            }
        }

        let Some(main_command) = tokens.next() else {
            return Err(ParseError::MissingMainCommand {
                invocation: self.invocation.clone(),
            });
        };

        let sub_command = tokens.next_if(|token| !token.starts_with('-'));

        let mut positional_args = Vec::new();
        while let Some(token) = tokens.next() {
            let Some(name) = token.strip_prefix("--") else {
                positional_args.push(token);
                continue;
            };

            if let Some((key, value)) = name.split_once('=') {
                options.insert(key.to_string(), value.to_string());
            } else if let Some(value) = tokens.next_if(|next| !next.starts_with('-')) {
                options.insert(name.to_string(), value);
            } else {
                flags.insert(name.to_string());
            }
        }

        Ok(ParsedCommand {
            raw: line.to_string(),
            main_command,
            sub_command,
            positional_args,
            options,
            flags,
        })
    }
}

impl Default for CommandLineParser {
    fn default() -> Self {
        Self::new(DEFAULT_INVOCATION)
    }
}

/// Splits on whitespace; a double-quoted span is kept in one token with the quotes removed.
/// There is no escape handling, and an unterminated quote runs to the end of the line.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;

    for character in line.chars() {
        match character {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            character if character.is_whitespace() && !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            character => {
                current.push(character);
                in_token = true;
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Byte ranges of every `invocation` command inside a shell line. A segment starts at a
/// word-boundary occurrence of the keyword outside quotes and runs up to the next unquoted
/// shell operator or comment. Comment lines have no segments.
pub fn invocation_segments(line: &str, invocation: &str) -> Vec<Range<usize>> {
    let mut segments = Vec::new();
    if invocation.is_empty() || line.trim_start().starts_with('#') {
        return segments;
    }

    let bytes = line.as_bytes();
    let mut quote: Option<u8> = None;
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
            b'"' | b'\'' => {
                quote = Some(byte);
                index += 1;
            }
            b'#' if index == 0 || bytes[index - 1].is_ascii_whitespace() => break,
            _ if starts_invocation(line, index, invocation) => {
                let end = segment_end(bytes, index + invocation.len());
                segments.push(index..end);
                index = end;
            }
            _ => index += 1,
        }
    }

    segments
}

fn starts_invocation(line: &str, index: usize, invocation: &str) -> bool {
    let bytes = line.as_bytes();
    if !bytes[index..].starts_with(invocation.as_bytes()) {
        return false;
    }
    let boundary_before = index == 0
        || matches!(
            bytes[index - 1],
            b' ' | b'\t' | b';' | b'|' | b'&' | b'(' | b'`' | b'{'
        );
    let after = index + invocation.len();
    let boundary_after = after == bytes.len() || bytes[after].is_ascii_whitespace();
    boundary_before && boundary_after
}

fn segment_end(bytes: &[u8], start: usize) -> usize {
    let mut quote: Option<u8> = None;
    for (offset, &byte) in bytes[start..].iter().enumerate() {
        let index = start + offset;
        if let Some(open) = quote {
            if byte == open {
                quote = None;
            }
            continue;
        }
        match byte {
            b'"' | b'\'' => quote = Some(byte),
            b'|' | b';' | b'&' | b')' | b'`' => return trim_end(bytes, start, index),
            b'#' if bytes[index - 1].is_ascii_whitespace() => {
                return trim_end(bytes, start, index);
            }
            _ => {}
        }
    }
    trim_end(bytes, start, bytes.len())
}

/// Byte ranges of quoted spans in `text`, quote characters included. An unterminated quote
/// runs to the end.
pub fn quoted_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut open: Option<(u8, usize)> = None;
    for (index, &byte) in text.as_bytes().iter().enumerate() {
        match open {
            Some((quote, start)) if byte == quote => {
                spans.push(start..index + 1);
                open = None;
            }
            Some(_) => {}
            None if matches!(byte, b'"' | b'\'') => open = Some((byte, index)),
            None => {}
        }
    }
    if let Some((_, start)) = open {
        spans.push(start..text.len());
    }
    spans
}

fn trim_end(bytes: &[u8], floor: usize, mut end: usize) -> usize {
    while end > floor && bytes[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    end
}
