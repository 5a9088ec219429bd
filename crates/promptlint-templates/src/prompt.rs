//! Prompt-level helpers: messages, and the variables a set of messages
//! implies.

use rustc_hash::FxHashSet;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::multimodal::join;
use crate::multimodal::split;
use crate::multimodal::ContentPart;
use crate::multimodal::ContentType;
use crate::variables::is_identifier;
use crate::variables::VariableDef;

pub const STRING_VARIABLE: &str = "string";
pub const PLACEHOLDER_VARIABLE: &str = "placeholder";
pub const MULTI_PART_VARIABLE: &str = "multi_part";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
    /// Stands in for a list of messages supplied at run time. `content`
    /// holds the name of the variable carrying them.
    Placeholder,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<ContentPart>,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            parts: Vec::new(),
        }
    }

    /// Store editor text as parts when it holds multimodal markers, or as
    /// plain content otherwise.
    #[must_use]
    pub fn from_editor_text(role: Role, text: &str) -> Self {
        let parts = split(text);
        if parts.is_empty() {
            Self::new(role, text)
        } else {
            Self {
                role,
                content: None,
                parts,
            }
        }
    }

    /// The text an editor shows for this message. Content left next to
    /// parts is appended after them.
    #[must_use]
    pub fn editor_text(&self) -> String {
        let mut text = join(&self.parts);
        if let Some(content) = &self.content {
            text.push_str(content);
        }
        text
    }

    /// Fold plain content into a trailing text part when the message
    /// already has parts.
    #[must_use]
    pub fn into_parts(mut self) -> Self {
        if !self.parts.is_empty() {
            if let Some(content) = self.content.take().filter(|c| !c.is_empty()) {
                self.parts.push(ContentPart::text(content));
            }
        }
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum VariableNameError {
    #[error("Variable name must not be empty")]
    Empty,
    #[error("Variable name must not contain line breaks")]
    LineBreak,
    #[error("Variable name '{0}' must start with a letter and contain only letters, digits and underscores")]
    InvalidFormat(String),
    #[error("Variable name '{0}' is already used by another variable")]
    Duplicate(String),
}

pub fn validate_variable_name(name: &str, max_len: usize) -> Result<(), VariableNameError> {
    if name.is_empty() {
        return Err(VariableNameError::Empty);
    }
    if name.contains(['\n', '\r']) {
        return Err(VariableNameError::LineBreak);
    }
    if !is_identifier(name, max_len) {
        return Err(VariableNameError::InvalidFormat(name.to_string()));
    }
    Ok(())
}

/// What is wrong with a placeholder message, if anything. Other roles are
/// always fine.
#[must_use]
pub fn placeholder_error(message: &Message, variables: &[VariableDef]) -> Option<VariableNameError> {
    if message.role != Role::Placeholder {
        return None;
    }

    let name = message.content.as_deref().unwrap_or_default();
    if name.is_empty() {
        return Some(VariableNameError::Empty);
    }
    if !is_identifier(name, usize::MAX) {
        return Some(VariableNameError::InvalidFormat(name.to_string()));
    }

    variables
        .iter()
        .filter(|var| var.kind.as_deref() != Some(PLACEHOLDER_VARIABLE))
        .any(|var| var.key == name)
        .then(|| VariableNameError::Duplicate(name.to_string()))
}

/// Names used as `{{name}}` in `text`, tightly braced, first-seen order.
///
/// A candidate that does not close right after a valid name is skipped
/// one byte at a time, so `{{{a}}}` still yields `a`.
#[must_use]
pub fn input_variable_keys(text: &str, max_len: usize) -> Vec<&str> {
    let mut keys: Vec<&str> = Vec::new();
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find("{{") {
        let name_start = cursor + found + 2;
        let rest = &text[name_start..];
        let name_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        let name = &rest[..name_len];

        if is_identifier(name, max_len) && rest[name_len..].starts_with("}}") {
            if !keys.contains(&name) {
                keys.push(name);
            }
            cursor = name_start + name_len + 2;
        } else {
            cursor += found + 1;
        }
    }

    keys
}

/// Multimodal variables referenced by message parts that are not already
/// among `existing`.
#[must_use]
pub fn multimodal_variable_keys(messages: &[Message], existing: &[&str]) -> Vec<VariableDef> {
    let names = messages
        .iter()
        .flat_map(|message| &message.parts)
        .filter(|part| part.kind == ContentType::MultimodalVariable)
        .map(|part| part.text.as_str());
    new_variables(names, existing, MULTI_PART_VARIABLE)
}

/// Placeholder variables named by placeholder messages that are not
/// already among `existing`.
#[must_use]
pub fn placeholder_variable_keys(messages: &[Message], existing: &[&str]) -> Vec<VariableDef> {
    let names = messages
        .iter()
        .filter(|message| message.role == Role::Placeholder)
        .filter_map(|message| message.content.as_deref());
    new_variables(names, existing, PLACEHOLDER_VARIABLE)
}

fn new_variables<'a>(
    names: impl Iterator<Item = &'a str>,
    existing: &[&str],
    kind: &str,
) -> Vec<VariableDef> {
    let mut seen = FxHashSet::default();
    names
        .filter(|name| !name.is_empty() && !existing.contains(name))
        .filter(|name| seen.insert(*name))
        .map(|name| VariableDef::new(name).with_kind(kind))
        .collect()
}

/// Every variable a prompt's messages use: `{{name}}` placeholders in
/// message text, then multimodal variables, then placeholder messages.
#[must_use]
pub fn extract_input_variables(messages: &[Message], max_len: usize) -> Vec<VariableDef> {
    let texts: Vec<String> = messages
        .iter()
        .filter(|message| message.role != Role::Placeholder)
        .map(|message| {
            if message.parts.is_empty() {
                message.content.clone().unwrap_or_default()
            } else {
                join(&message.parts)
            }
        })
        .collect();

    let mut keys: Vec<&str> = Vec::new();
    for key in texts.iter().flat_map(|text| input_variable_keys(text, max_len)) {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    let mut variables: Vec<VariableDef> = keys
        .iter()
        .map(|key| VariableDef::new(*key).with_kind(STRING_VARIABLE))
        .collect();

    let multimodal = multimodal_variable_keys(messages, &keys);
    keys.extend(multimodal.iter().map(|var| var.key.as_str()));
    let placeholders = placeholder_variable_keys(messages, &keys);

    variables.extend(multimodal);
    variables.extend(placeholders);
    variables
}
