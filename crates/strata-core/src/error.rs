use thiserror::Error;

/// Build-level failures. Ambiguous property types are not errors; they are
/// reported through [`crate::ComponentWarnings`].
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Declaration provider failed for component '{component}': {message}")]
    Provider { component: String, message: String },

    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("No entry components were given")]
    EmptyEntrySet,
}

/// Errors a [`crate::DeclarationProvider`] reports for a single lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Component not declared: {0}")]
    NotFound(String),

    #[error("Malformed declaration of '{component}': {message}")]
    Malformed { component: String, message: String },
}

impl From<ProviderError> for CoreError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(name) => CoreError::ComponentNotFound(name),
            ProviderError::Malformed { component, message } => {
                CoreError::Provider { component, message }
            }
        }
    }
}
