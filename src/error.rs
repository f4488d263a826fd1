use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tagtree
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed tag, bad index, non-map intermediate, alias collision or
    /// a path that resolves to the wrong kind of entity
    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    /// A referenced name is absent from the scope or map being searched
    #[error("Missing tag: {0}")]
    MissingTag(String),

    /// Malformed for-loop token structure
    #[error("Expression syntax error: {0}")]
    ExpressionSyntax(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output error: {0}")]
    Fmt(#[from] std::fmt::Error),

    // Error with context chain
    #[error("{message}")]
    WithContext {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn invalid_tag(msg: impl Into<String>) -> Self {
        Self::InvalidTag(msg.into())
    }

    pub fn missing_tag(msg: impl Into<String>) -> Self {
        Self::MissingTag(msg.into())
    }

    pub fn expression_syntax(msg: impl Into<String>) -> Self {
        Self::ExpressionSyntax(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    // Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            message: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through any context wrappers
    pub fn root(&self) -> &Error {
        match self {
            Error::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_invalid_tag(&self) -> bool {
        matches!(self.root(), Error::InvalidTag(_))
    }

    pub fn is_missing_tag(&self) -> bool {
        matches!(self.root(), Error::MissingTag(_))
    }

    pub fn is_expression_syntax(&self) -> bool {
        matches!(self.root(), Error::ExpressionSyntax(_))
    }

    /// Stable error code for callers that report errors outside Rust
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidTag(_) => "E_INVALID_TAG",
            Error::MissingTag(_) => "E_MISSING_TAG",
            Error::ExpressionSyntax(_) => "E_EXPRESSION_SYNTAX",
            Error::Config(_) => "E_CONFIG",
            Error::Io(_) => "E_IO",
            Error::Fmt(_) => "E_OUTPUT",
            Error::WithContext { source, .. } => source.error_code(),
        }
    }
}
