//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Every variant is a generation-time failure: the run stops on the first one.
//! Faults of the *generated* code are modelled separately by
//! [`crate::runtime::RuntimeError`].

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The schema document is not valid YAML or does not match the document shape.
    #[display("Schema Document Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// The schema parsed but violates a structural rule (collisions, cycles, unknown levels).
    #[from(ignore)]
    #[display("Schema Error: {_0}")]
    Schema(String),

    /// A type expression could not be parsed or resolved.
    #[from(ignore)]
    #[display("Type Error: {_0}")]
    Type(String),

    /// A conversion could not be synthesized for a resolved type.
    #[from(ignore)]
    #[display("Synthesis Error: {_0}")]
    Synthesis(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::Other, "test");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        // Test that String defaults to General, not Schema
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_yaml_conversion() {
        let yaml_err = serde_yaml::from_str::<u32>("[1, 2").unwrap_err();
        let app_err: AppError = yaml_err.into();
        assert!(matches!(app_err, AppError::Yaml(_)));
        assert!(app_err.to_string().starts_with("Schema Document Error:"));
    }

    #[test]
    fn test_synthesis_manual_creation() {
        let app_err = AppError::Synthesis("cannot use type `Point` as map key".into());
        assert_eq!(
            format!("{}", app_err),
            "Synthesis Error: cannot use type `Point` as map key"
        );
    }
}
