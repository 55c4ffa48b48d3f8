// src/error.rs
//! Error handling for the entire crate.
//!
//! Only structural failures surface as `Err`: a scene change the graph cannot perform,
//! a lifecycle call issued before initialisation, a duplicate component kind, broken
//! configuration. Degraded-but-recoverable conditions (missing sibling components,
//! stretched circle hitboxes) never get here; they are absorbed where they happen and
//! reported through [`crate::diagnostics::Diagnostics`].

use thiserror::Error;

use crate::components::ComponentKind;

/// Main error type.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O errors (config files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config (de)serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Something was driven before its `init` ran. Always a construction-order bug
    /// in the caller.
    #[error("'{0}' used before it was initialised")]
    NotInitialized(String),

    /// The caller asked for a transition the scene graph refuses.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// An item already holds a component of this kind.
    #[error("item '{item}' already has a {kind} component")]
    DuplicateComponent { item: String, kind: ComponentKind },

    /// A backend could not provide a resource.
    #[error("resource '{path}' unavailable: {reason}")]
    Resource { path: String, reason: String },

    /// Simple custom message.
    #[error("{0}")]
    Custom(String),

    /// Context chaining.
    #[error("{message}: {source}")]
    WithContext {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a custom error message.
    #[inline]
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Self::Custom(msg.into())
    }

    /// Create a formatted custom error (like `format!` but returns `Error`).
    #[inline]
    pub fn format(args: std::fmt::Arguments) -> Self {
        Self::Custom(std::fmt::format(args))
    }

    /// Quick static message.
    #[inline]
    pub fn msg(msg: &'static str) -> Self {
        Self::Custom(msg.into())
    }

    /// Add context to any error.
    #[inline]
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        Self::WithContext {
            message: context.into(),
            source: Box::new(self),
        }
    }

    #[inline]
    pub fn not_initialized<S: Into<String>>(what: S) -> Self {
        Self::NotInitialized(what.into())
    }

    #[inline]
    pub fn invalid_operation<S: Into<String>>(what: S) -> Self {
        Self::InvalidOperation(what.into())
    }

    /// Peels `WithContext` layers off and returns the innermost error.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::WithContext { source, .. } => source.root_cause(),
            other => other,
        }
    }

    #[inline]
    pub fn is_not_initialized(&self) -> bool {
        matches!(self.root_cause(), Error::NotInitialized(_))
    }

    #[inline]
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self.root_cause(), Error::InvalidOperation(_))
    }
}

/// Convenient `Result` alias; use `crate::Result<T>` everywhere.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_root_cause() {
        let err = Error::not_initialized("Root").context("running frame");
        assert!(err.is_not_initialized());
        assert!(!err.is_invalid_operation());
        assert_eq!(err.to_string(), "running frame: 'Root' used before it was initialised");
    }

    #[test]
    fn test_duplicate_component_message() {
        let err = Error::DuplicateComponent {
            item: "Button".into(),
            kind: ComponentKind::Fill,
        };
        assert_eq!(err.to_string(), "item 'Button' already has a Fill component");
    }
}
