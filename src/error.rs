/// Error type for the fitting engine
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    /// Error when compiling or evaluating a formula
    ExpressionError { expression: String, details: String },

    /// Modifier id is not present in the registry
    UnknownModifier { id: String },

    /// Modifier exists but may not be applied to this component type
    ModifierNotAllowed { id: String, component_type: String },

    /// Declared ability name has no alias entry
    UnknownAbility { name: String },

    /// Internal error
    Internal { details: String },
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::ExpressionError { expression, details } => {
                write!(f, "Failed to evaluate expression '{}': {}", expression, details)
            }
            FitError::UnknownModifier { id } => {
                write!(f, "Modifier '{}' not found", id)
            }
            FitError::ModifierNotAllowed { id, component_type } => {
                write!(f, "Modifier '{}' is not allowed on '{}' components", id, component_type)
            }
            FitError::UnknownAbility { name } => {
                write!(f, "Ability '{}' not found", name)
            }
            FitError::Internal { details } => {
                write!(f, "Internal error: {}", details)
            }
        }
    }
}

impl std::error::Error for FitError {}

// Type alias for Result with FitError
pub type FitResult<T> = Result<T, FitError>;
