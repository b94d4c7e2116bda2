use thiserror::Error;

/// Core error type for action execution.
///
/// None of these ever reach the orchestrator from an execution path: the
/// executor, job runner and rule adapter fold them into a `Transition`,
/// `JobStatus` or `RuleActionResult`. Only host-side configuration calls
/// (registry lookup, config loading) return them directly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The entity an action operates on could not be resolved
    #[error("Missing entity: {0}")]
    MissingEntity(String),

    /// A required parameter was not supplied
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// A parameter had the wrong type or failed its constraint
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// Decision or rule logic reported a failure
    #[error("Action failed: {0}")]
    ActionFailed(String),

    /// Action code panicked
    #[error("Action panicked: {0}")]
    Panicked(String),

    /// An action returned a transition it did not declare
    #[error("Undeclared transition '{transition}' returned by {action}")]
    UndeclaredTransition {
        /// Action name
        action: String,
        /// The offending transition label
        transition: String,
    },

    /// Processing a single work item failed
    #[error("Item failed: {0}")]
    ItemFailed(String),

    /// The work-item source itself failed
    #[error("Item source failed: {0}")]
    SourceFailed(String),

    /// No action registered under the requested name
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification used to pick log targets and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Missing or invalid input data
    Input,
    /// Failure inside decision or rule logic
    Logic,
    /// Recoverable failure of one work item
    Item,
    /// Fatal failure of the work-item source
    Driver,
    /// Host configuration problem
    Configuration,
}

impl ErrorCategory {
    /// Stable label for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Input => "input",
            ErrorCategory::Logic => "logic",
            ErrorCategory::Item => "item",
            ErrorCategory::Driver => "driver",
            ErrorCategory::Configuration => "configuration",
        }
    }
}

impl CoreError {
    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::MissingEntity(_)
            | CoreError::MissingParameter(_)
            | CoreError::InvalidParameter { .. } => ErrorCategory::Input,
            CoreError::ActionFailed(_)
            | CoreError::Panicked(_)
            | CoreError::UndeclaredTransition { .. } => ErrorCategory::Logic,
            CoreError::ItemFailed(_) => ErrorCategory::Item,
            CoreError::SourceFailed(_) => ErrorCategory::Driver,
            CoreError::UnknownAction(_)
            | CoreError::Configuration(_)
            | CoreError::Serialization(_) => ErrorCategory::Configuration,
        }
    }

    /// Build an `InvalidParameter` error
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Build a `Panicked` error from a caught panic payload
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        CoreError::Panicked(message)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::Configuration(err.to_string())
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = vec![
            (CoreError::MissingEntity("order".to_string()), "Missing entity: order"),
            (CoreError::MissingParameter("points".to_string()), "Missing parameter: points"),
            (
                CoreError::invalid_parameter("amount", "must be positive"),
                "Invalid parameter 'amount': must be positive",
            ),
            (CoreError::ActionFailed("boom".to_string()), "Action failed: boom"),
            (CoreError::Panicked("oops".to_string()), "Action panicked: oops"),
            (
                CoreError::UndeclaredTransition {
                    action: "fraud-check".to_string(),
                    transition: "MAYBE".to_string(),
                },
                "Undeclared transition 'MAYBE' returned by fraud-check",
            ),
            (CoreError::ItemFailed("sku-1".to_string()), "Item failed: sku-1"),
            (CoreError::SourceFailed("db down".to_string()), "Item source failed: db down"),
            (CoreError::UnknownAction("nope".to_string()), "Unknown action: nope"),
            (CoreError::Configuration("bad".to_string()), "Configuration error: bad"),
            (CoreError::Serialization("eof".to_string()), "Serialization error: eof"),
        ];

        for (error, expected_msg) in errors {
            assert_eq!(error.to_string(), expected_msg);
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(CoreError::MissingEntity("x".into()).category(), ErrorCategory::Input);
        assert_eq!(
            CoreError::invalid_parameter("x", "y").category(),
            ErrorCategory::Input
        );
        assert_eq!(CoreError::Panicked("x".into()).category(), ErrorCategory::Logic);
        assert_eq!(CoreError::ItemFailed("x".into()).category(), ErrorCategory::Item);
        assert_eq!(CoreError::SourceFailed("x".into()).category(), ErrorCategory::Driver);
        assert_eq!(
            CoreError::UnknownAction("x".into()).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(ErrorCategory::Driver.as_str(), "driver");
    }

    #[test]
    fn test_from_panic_payloads() {
        let err = CoreError::from_panic(Box::new("static message"));
        assert_eq!(err, CoreError::Panicked("static message".to_string()));

        let err = CoreError::from_panic(Box::new(String::from("owned message")));
        assert_eq!(err, CoreError::Panicked("owned message".to_string()));

        let err = CoreError::from_panic(Box::new(42_u8));
        assert_eq!(err, CoreError::Panicked("unknown panic".to_string()));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error: CoreError = json_error.into();

        match error {
            CoreError::Serialization(msg) => assert!(msg.contains("expected value")),
            _ => panic!("Expected Serialization variant"),
        }
    }
}
