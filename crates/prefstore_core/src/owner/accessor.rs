//! Name-keyed accessor resolution.
//!
//! Accessor names follow one convention: `<identifier>_preference` reads and
//! `<identifier>_preference=` writes.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static PREFERENCE_ACCESSOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)_preference(=?)$").expect("valid preference accessor regex"));

/// Direction of a resolved accessor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Getter,
    Setter,
}

impl AccessorKind {
    /// Number of arguments the accessor takes.
    pub fn arity(self) -> usize {
        match self {
            Self::Getter => 0,
            Self::Setter => 1,
        }
    }
}

/// Accessor name split into preference name and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorCall {
    pub accessor: String,
    pub name: String,
    pub kind: AccessorKind,
}

impl AccessorCall {
    pub fn check_arity(&self, given: usize) -> Result<(), AccessorError> {
        let expected = self.kind.arity();
        if given != expected {
            return Err(AccessorError::ArgumentCount {
                accessor: self.accessor.clone(),
                expected,
                given,
            });
        }
        Ok(())
    }
}

/// Generic accessor dispatch failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessorError {
    ArgumentCount {
        accessor: String,
        expected: usize,
        given: usize,
    },
    NoSuchAccessor(String),
}

impl Display for AccessorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ArgumentCount {
                accessor,
                expected,
                given,
            } => write!(
                f,
                "wrong number of arguments for `{accessor}` ({given} for {expected})"
            ),
            Self::NoSuchAccessor(accessor) => write!(f, "no such preference accessor: `{accessor}`"),
        }
    }
}

impl Error for AccessorError {}

/// Parses an accessor name, returning `None` when it does not follow the
/// preference convention.
pub fn parse_accessor(accessor: &str) -> Option<AccessorCall> {
    let caps = PREFERENCE_ACCESSOR_RE.captures(accessor)?;
    let name = caps.get(1)?.as_str().to_string();
    let kind = match caps.get(2).map(|m| m.as_str()) {
        Some("=") => AccessorKind::Setter,
        _ => AccessorKind::Getter,
    };

    Some(AccessorCall {
        accessor: accessor.to_string(),
        name,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_accessor, AccessorError, AccessorKind};

    #[test]
    fn parses_getter_and_setter_forms() {
        let getter = parse_accessor("language_preference").expect("getter parses");
        assert_eq!(getter.name, "language");
        assert_eq!(getter.kind, AccessorKind::Getter);

        let setter = parse_accessor("email_notification_preference=").expect("setter parses");
        assert_eq!(setter.name, "email_notification");
        assert_eq!(setter.kind, AccessorKind::Setter);
    }

    #[test]
    fn rejects_names_outside_convention() {
        assert!(parse_accessor("language").is_none());
        assert!(parse_accessor("_preference").is_none());
        assert!(parse_accessor("language_preferences").is_none());
        assert!(parse_accessor("language preference").is_none());
    }

    #[test]
    fn arity_errors_name_expected_count() {
        let getter = parse_accessor("watch_preference").expect("getter parses");
        let err = getter.check_arity(1).expect_err("getter takes no arguments");
        assert_eq!(
            err,
            AccessorError::ArgumentCount {
                accessor: "watch_preference".to_string(),
                expected: 0,
                given: 1,
            }
        );
        assert!(err.to_string().contains("1 for 0"));

        let setter = parse_accessor("watch_preference=").expect("setter parses");
        assert!(setter.check_arity(0).is_err());
        assert!(setter.check_arity(2).is_err());
        assert!(setter.check_arity(1).is_ok());
    }
}
