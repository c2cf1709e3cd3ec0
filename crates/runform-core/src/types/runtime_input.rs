//! Runtime-input markers
//!
//! A field whose value is only known at execution time is written as
//! `<+input>` in pipeline YAML, optionally decorated with suffixes:
//!
//! ```text
//! <+input>
//! <+input>.default(main)
//! <+input>.allowedValues(dev,qa,prod)
//! <+input>.regex(^release-.*$)
//! <+input>.executionInput()
//! ```
//!
//! The marker is parsed once, at the YAML boundary, into [`RuntimeInput`] and
//! only turned back into text when a tree is serialized.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// The bare runtime-input marker
pub const RUNTIME_INPUT_VALUE: &str = "<+input>";

/// A field deliberately left unresolved until execution time
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuntimeInput {
    /// Value used when nothing is supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Closed set of accepted values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,

    /// Pattern the supplied value must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,

    /// Value is requested while the execution is already running
    #[serde(default)]
    pub execution_input: bool,
}

impl RuntimeInput {
    /// A marker with no decoration
    pub fn bare() -> Self {
        Self::default()
    }

    /// Set the default value
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set the allowed values
    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Set the validation pattern
    pub fn with_regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    /// Mark as an execution-time input
    pub fn as_execution_input(mut self) -> Self {
        self.execution_input = true;
        self
    }

    /// True when the marker carries no default, validation or execution flag
    pub fn is_bare(&self) -> bool {
        self.default.is_none()
            && self.allowed_values.is_none()
            && self.regex.is_none()
            && !self.execution_input
    }

    /// Check whether `text` looks like a marker at all (cheap prefix test)
    pub fn is_marker_text(text: &str) -> bool {
        text.starts_with(RUNTIME_INPUT_VALUE)
    }

    /// Parse marker text, returning `None` for anything that is not a
    /// well-formed marker (such strings stay plain strings)
    pub fn parse(text: &str) -> Option<Self> {
        let mut rest = text.strip_prefix(RUNTIME_INPUT_VALUE)?;
        let mut marker = RuntimeInput::default();

        while !rest.is_empty() {
            rest = rest.strip_prefix('.')?;
            let open = rest.find('(')?;
            let name = &rest[..open];
            let (argument, remainder) = split_argument(&rest[open + 1..])?;
            rest = remainder;

            match name {
                "default" if marker.default.is_none() => {
                    marker.default = Some(argument.to_string());
                }
                "allowedValues" if marker.allowed_values.is_none() => {
                    marker.allowed_values = Some(split_values(argument));
                }
                "regex" if marker.regex.is_none() => {
                    marker.regex = Some(argument.to_string());
                }
                "executionInput" if !marker.execution_input && argument.is_empty() => {
                    marker.execution_input = true;
                }
                _ => return None,
            }
        }

        Some(marker)
    }
}

/// Split `arg) rest` at the parenthesis closing the suffix argument.
/// Escaped parentheses and balanced inner groups belong to the argument.
fn split_argument(input: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut escaped = false;

    for (idx, ch) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '(' => depth += 1,
            ')' if depth == 0 => return Some((&input[..idx], &input[idx + 1..])),
            ')' => depth -= 1,
            _ => {}
        }
    }

    None
}

fn split_values(argument: &str) -> Vec<String> {
    if argument.trim().is_empty() {
        return Vec::new();
    }
    argument.split(',').map(|v| v.trim().to_string()).collect()
}

impl fmt::Display for RuntimeInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(RUNTIME_INPUT_VALUE)?;
        if self.execution_input {
            f.write_str(".executionInput()")?;
        }
        if let Some(values) = &self.allowed_values {
            write!(f, ".allowedValues({})", values.join(","))?;
        }
        if let Some(pattern) = &self.regex {
            write!(f, ".regex({})", pattern)?;
        }
        if let Some(default) = &self.default {
            write!(f, ".default({})", default)?;
        }
        Ok(())
    }
}

impl FromStr for RuntimeInput {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuntimeInput::parse(s).ok_or_else(|| CoreError::InvalidRuntimeInput(s.to_string()))
    }
}
