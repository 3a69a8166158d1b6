use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bridge::error::{BridgeError, BridgeResult};
use crate::bridge::platform::HostPlatform;
use crate::bridge::tokenize::split_words;

/// Prefix that forwards the rest of a command line to the remote shell unsplit
pub const SHELL_PREFIX: &str = "shell ";

/// A command to run against the bridge executable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeCommand {
    /// Explicit tokens, passed through verbatim
    Args(Vec<String>),
    /// `shell <remainder>`, with the remainder interpreted by the device shell
    ShellPassthrough(String),
    /// Free-form line, split with the host platform's quoting rules
    Line(String),
}

impl BridgeCommand {
    pub fn args<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Args(tokens.into_iter().map(Into::into).collect())
    }

    pub fn shell(remainder: impl Into<String>) -> Self {
        Self::ShellPassthrough(remainder.into())
    }

    /// Free-form line, never treated as shell passthrough
    pub fn line(line: impl Into<String>) -> Self {
        Self::Line(line.into())
    }

    /// Classify a command line, recognising the `"shell "` prefix
    pub fn parse(line: &str) -> Self {
        match line.strip_prefix(SHELL_PREFIX) {
            Some(remainder) => Self::ShellPassthrough(remainder.to_string()),
            None => Self::Line(line.to_string()),
        }
    }

    /// Tokens to append after the executable and device flag
    pub fn to_tokens(&self, platform: HostPlatform) -> BridgeResult<Vec<String>> {
        match self {
            Self::Args(tokens) => Ok(tokens.clone()),
            Self::ShellPassthrough(remainder) => Ok(vec!["shell".to_string(), remainder.clone()]),
            Self::Line(line) => split_words(line, platform),
        }
    }
}

impl From<&str> for BridgeCommand {
    fn from(line: &str) -> Self {
        Self::parse(line)
    }
}

impl From<String> for BridgeCommand {
    fn from(line: String) -> Self {
        Self::parse(&line)
    }
}

impl From<Vec<String>> for BridgeCommand {
    fn from(tokens: Vec<String>) -> Self {
        Self::Args(tokens)
    }
}

impl From<Vec<&str>> for BridgeCommand {
    fn from(tokens: Vec<&str>) -> Self {
        Self::args(tokens)
    }
}

impl From<&[&str]> for BridgeCommand {
    fn from(tokens: &[&str]) -> Self {
        Self::args(tokens.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for BridgeCommand {
    fn from(tokens: [&str; N]) -> Self {
        Self::args(tokens)
    }
}

/// Commands arriving as untyped data: a string or an array of strings
impl TryFrom<Value> for BridgeCommand {
    type Error = BridgeError;

    fn try_from(value: Value) -> BridgeResult<Self> {
        match value {
            Value::String(line) => Ok(Self::parse(&line)),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::String(token) => Ok(token),
                    other => Err(BridgeError::invalid_argument(format!(
                        "argument {} must be a string, got {}",
                        i,
                        json_kind(&other)
                    ))),
                })
                .collect::<BridgeResult<Vec<_>>>()
                .map(Self::Args),
            other => Err(BridgeError::invalid_argument(format!(
                "command must be a string or a sequence of strings, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
