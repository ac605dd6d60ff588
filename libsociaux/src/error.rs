//! Error types for Sociaux

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SociauxError>;

#[derive(Error, Debug)]
pub enum SociauxError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    MicroBlog(#[from] MicroBlogError),

    /// The provider does not implement the requested capability group
    #[error("Not supported: {0}")]
    Unsupported(String),

    /// A record outlived the provider instance that produced it
    #[error("The {0} service this record belongs to is no longer available")]
    Detached(&'static str),
}

impl SociauxError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SociauxError::MicroBlog(MicroBlogError::InvalidCredentials(_)) => 2,
            SociauxError::MicroBlog(MicroBlogError::InvalidRequest(_)) => 3,
            SociauxError::MicroBlog(MicroBlogError::NotFound(_)) => 4,
            SociauxError::MicroBlog(MicroBlogError::QuotaExceeded(_)) => 5,
            SociauxError::MicroBlog(_) => 1,
            SociauxError::Config(_) => 1,
            SociauxError::Unsupported(_) => 1,
            SociauxError::Detached(_) => 1,
        }
    }

    /// The unified error kind, if this error came from a provider
    pub fn kind(&self) -> Option<&MicroBlogError> {
        match self {
            SociauxError::MicroBlog(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Semantic error kinds shared by every provider
///
/// Provider adapters translate their client's failures into exactly one of
/// these variants. Each carries the provider's message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MicroBlogError {
    /// The user tried an action they are not allowed to perform
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The service returned an error that fits no other kind
    #[error("Service error: {0}")]
    ServiceError(String),
}
