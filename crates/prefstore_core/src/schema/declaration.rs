//! Declared preference options and per-name rules.

use crate::model::preference::normalize_value;
use crate::schema::validation::{ValidationErrors, MESSAGE_BLANK, MESSAGE_NOT_INCLUDED};
use serde_json::Value;

/// Closed set of values a declared preference may take.
#[derive(Debug, Clone, PartialEq)]
pub enum AllowedValues {
    /// Plain list of permitted values.
    List(Vec<Value>),
    /// Permitted values paired with display labels; membership checks keys.
    Labeled(Vec<(Value, String)>),
}

impl AllowedValues {
    /// Builds a labelled set from `(value, label)` pairs.
    pub fn labeled<I, K, L>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, L)>,
        K: Into<Value>,
        L: Into<String>,
    {
        Self::Labeled(
            entries
                .into_iter()
                .map(|(value, label)| (value.into(), label.into()))
                .collect(),
        )
    }

    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Self::List(values) => values.contains(value),
            Self::Labeled(entries) => entries.iter().any(|(key, _)| key == value),
        }
    }

    /// Permitted values in declaration order.
    pub fn values(&self) -> Vec<&Value> {
        match self {
            Self::List(values) => values.iter().collect(),
            Self::Labeled(entries) => entries.iter().map(|(key, _)| key).collect(),
        }
    }

    pub fn label(&self, value: &Value) -> Option<&str> {
        match self {
            Self::List(_) => None,
            Self::Labeled(entries) => entries
                .iter()
                .find(|(key, _)| key == value)
                .map(|(_, label)| label.as_str()),
        }
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for AllowedValues {
    fn from(values: [T; N]) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<Value>> for AllowedValues {
    fn from(values: Vec<Value>) -> Self {
        Self::List(values)
    }
}

/// Options accepted when declaring a preference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceOptions {
    default: Option<Value>,
    allowed_values: Option<AllowedValues>,
    allow_null: Option<bool>,
}

impl PreferenceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fallback returned by the concrete getter while the value is unset.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = normalize_value(value.into());
        self
    }

    /// Restricts the value to a closed set, checked at save time.
    pub fn options(mut self, allowed: impl Into<AllowedValues>) -> Self {
        self.allowed_values = Some(allowed.into());
        self
    }

    /// Explicit nullability override.
    pub fn allow_null(mut self, allow: bool) -> Self {
        self.allow_null = Some(allow);
        self
    }
}

/// Frozen rules for one declared preference name.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceDeclaration {
    name: String,
    default: Option<Value>,
    allowed_values: Option<AllowedValues>,
    allow_null: Option<bool>,
}

impl PreferenceDeclaration {
    pub fn new(name: impl Into<String>, options: PreferenceOptions) -> Self {
        Self {
            name: name.into(),
            default: options.default,
            allowed_values: options.allowed_values,
            allow_null: options.allow_null,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn allowed_values(&self) -> Option<&AllowedValues> {
        self.allowed_values.as_ref()
    }

    /// Attribute key used in validation errors.
    pub fn attribute(&self) -> String {
        format!("{}_preference", self.name)
    }

    /// Null is accepted when explicitly allowed or when a default exists.
    pub fn is_nullable(&self) -> bool {
        self.allow_null == Some(true) || self.default.is_some()
    }

    /// Applies default fallback to a stored value.
    pub fn resolve(&self, stored: Option<&Value>) -> Option<Value> {
        stored.cloned().or_else(|| self.default.clone())
    }

    /// Checks the current (default-resolved) value against declared rules.
    pub fn validate(&self, stored: Option<&Value>, errors: &mut ValidationErrors) {
        let current = self.resolve(stored);

        if let Some(allowed) = &self.allowed_values {
            let accepted = match &current {
                Some(value) => allowed.contains(value),
                None => self.is_nullable(),
            };
            if !accepted {
                errors.add(self.attribute(), MESSAGE_NOT_INCLUDED);
            }
            return;
        }

        if self.allow_null == Some(false) && current.is_none() {
            errors.add(self.attribute(), MESSAGE_BLANK);
        }
    }
}
