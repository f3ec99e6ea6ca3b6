//! Command form state and validation
//!
//! The form is a controlled value: the console owns it and mutates it
//! through `set_message` / `set_language`, nothing reaches into it.

use crate::model::LanguagePreference;
use thiserror::Error;

/// Reasons a command is refused before dispatch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Command cannot be empty")]
    Empty,

    #[error("Command must be between 1 and {max} characters")]
    TooLong { max: usize },

    #[error("Please select a valid language")]
    InvalidLanguage(String),
}

/// A submission captured from the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormData {
    /// Sent verbatim; only the length check uses the trimmed text
    pub message: String,
    pub language: LanguagePreference,
}

/// Current contents of the command form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandForm {
    message: String,
    language: LanguagePreference,
}

impl CommandForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn language(&self) -> LanguagePreference {
        self.language
    }

    /// Overwrite the message text; the language selection is kept
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn set_language(&mut self, language: LanguagePreference) {
        self.language = language;
    }

    /// Data to dispatch, or `None` when the message is blank
    pub fn submission(&self) -> Option<FormData> {
        if self.message.trim().is_empty() {
            return None;
        }
        Some(FormData {
            message: self.message.clone(),
            language: self.language,
        })
    }
}

/// Check a command's trimmed length against `1..=max_chars`
pub fn validate_command(command: &str, max_chars: usize) -> Result<(), ValidationError> {
    let length = command.trim().chars().count();
    if length == 0 {
        return Err(ValidationError::Empty);
    }
    if length > max_chars {
        return Err(ValidationError::TooLong { max: max_chars });
    }
    Ok(())
}

/// Check a language code against the supported preferences
pub fn validate_language(code: &str) -> Result<LanguagePreference, ValidationError> {
    code.parse()
}

/// Result of validating the whole form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValidation {
    pub command: Option<ValidationError>,
    pub language: Option<ValidationError>,
}

impl FormValidation {
    pub fn is_valid(&self) -> bool {
        self.command.is_none() && self.language.is_none()
    }

    /// Messages of every failed check joined with ". "
    pub fn summary(&self) -> String {
        [&self.command, &self.language]
            .into_iter()
            .flatten()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(". ")
    }
}

pub fn validate_form(command: &str, language_code: &str, max_chars: usize) -> FormValidation {
    FormValidation {
        command: validate_command(command, max_chars).err(),
        language: validate_language(language_code).err(),
    }
}
