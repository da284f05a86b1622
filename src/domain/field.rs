use thiserror::Error;

/// A value that cannot be placed in a space-delimited command message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("{kind} contains whitespace: {value:?}")]
    Whitespace { kind: &'static str, value: String },

    #[error("{kind} contains control characters: {value:?}")]
    Control { kind: &'static str, value: String },
}

/// Check a single message field: no whitespace, no control characters.
pub fn check_token(kind: &'static str, value: &str, allow_empty: bool) -> Result<(), FieldError> {
    if value.is_empty() && !allow_empty {
        return Err(FieldError::Empty(kind));
    }
    if value.contains(char::is_whitespace) {
        return Err(FieldError::Whitespace {
            kind,
            value: value.to_string(),
        });
    }
    check_text(kind, value)
}

/// Check free text that may contain spaces but no control characters.
pub fn check_text(kind: &'static str, value: &str) -> Result<(), FieldError> {
    if value.contains(char::is_control) {
        return Err(FieldError::Control {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_rules() {
        assert!(check_token("User", "root", false).is_ok());
        assert!(check_token("User", "", true).is_ok());
        assert_eq!(check_token("User", "", false), Err(FieldError::Empty("User")));
        assert!(matches!(
            check_token("User", "root 8.8.8.8", true),
            Err(FieldError::Whitespace { .. })
        ));
        assert!(matches!(
            check_token("User", "root\t8.8.8.8", true),
            Err(FieldError::Whitespace { .. })
        ));
    }

    #[test]
    fn test_text_allows_spaces_not_controls() {
        assert!(check_text("Location", "(web01) 10.1.1.1->/var/log/secure").is_ok());
        assert!(matches!(
            check_text("Location", "agent01\u{0}"),
            Err(FieldError::Control { .. })
        ));
    }
}
