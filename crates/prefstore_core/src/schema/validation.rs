//! Save-time validation error collection.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MESSAGE_NOT_INCLUDED: &str = "is not included in the list";
pub const MESSAGE_BLANK: &str = "can't be blank";
pub const MESSAGE_INVALID: &str = "is invalid";

/// One failed rule on one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub attribute: String,
    pub message: String,
}

/// Errors collected for one owner before a save is attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            attribute: attribute.into(),
            message: message.into(),
        });
    }

    /// Returns the first message recorded for `attribute`.
    pub fn on(&self, attribute: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.attribute == attribute)
            .map(|error| error.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Converts the collection into a result, failing when non-empty.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let messages = self
            .errors
            .iter()
            .map(|error| format!("{} {}", error.attribute, error.message))
            .collect::<Vec<_>>();
        write!(f, "validation failed: {}", messages.join(", "))
    }
}

impl Error for ValidationErrors {}
