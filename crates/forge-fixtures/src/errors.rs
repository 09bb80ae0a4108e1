use crate::Diagnostic;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FactoryError {
    #[error("no factory method '{name}' is defined")]
    UnknownRecipe { name: String },
    #[error("Invalid trait '{trait_name}'! No method '{handler}' is defined.")]
    InvalidTrait { trait_name: String, handler: String },
    #[error("uninitialized fixture type {name}")]
    UnknownClass { name: String },
    #[error("invalid class value for '{key}': {found}")]
    InvalidClass { key: String, found: String },
    #[error("Validation failed: {errors}")]
    Validation { type_name: String, errors: String },
    #[error("Oops, the {type_name} created by the Factory has the following errors: {errors}")]
    Invalid { type_name: String, errors: String },
    #[error("cannot {operation} {shape}")]
    Unsupported {
        operation: &'static str,
        shape: &'static str,
    },
    #[error("cannot assign attribute '{name}': {message}")]
    Attribute { name: String, message: String },
    #[error("no factory job is active")]
    NoActiveJob,
    #[error("cannot reset factory while {depth} job(s) are active")]
    Busy { depth: usize },
    #[error("{0}")]
    Recipe(String),
}

impl FactoryError {
    pub fn recipe(message: impl Into<String>) -> Self {
        Self::Recipe(message.into())
    }

    pub fn attribute(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Attribute {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownRecipe { .. } => "UnknownRecipe",
            Self::InvalidTrait { .. } => "InvalidTrait",
            Self::UnknownClass { .. } => "UnknownClass",
            Self::InvalidClass { .. } => "InvalidClass",
            Self::Validation { .. } => "ValidationError",
            Self::Invalid { .. } => "InvalidFixture",
            Self::Unsupported { .. } => "Unsupported",
            Self::Attribute { .. } => "AttributeError",
            Self::NoActiveJob => "NoActiveJob",
            Self::Busy { .. } => "Busy",
            Self::Recipe(_) => "RecipeError",
        }
    }
}

pub fn render_errors(errors: &Value) -> String {
    match errors {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Error, Clone)]
#[error("{}", crate::lint::render_report(.diagnostics))]
pub struct InvalidFactoryError {
    pub diagnostics: Vec<Diagnostic>,
    pub errors_count: usize,
}

impl InvalidFactoryError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        let errors_count = diagnostics.iter().filter(|d| d.is_error()).count();
        Self {
            diagnostics,
            errors_count,
        }
    }
}
