//! Unified error types for the resume generation service
//!
//! This module provides standardized error types across all modules,
//! ensuring consistent error handling and better error messages.

use std::fmt;

/// Main error type for the application
///
/// This enum represents all possible errors that can occur in the pipeline.
/// It implements `std::error::Error` for proper error handling and can be
/// converted to user-friendly messages.
#[derive(Debug, Clone)]
pub enum PipelineError {
    /// Database-related errors
    Database(DatabaseError),
    /// AI provider errors
    AiProvider(AiProviderError),
    /// Validation errors
    Validation(ValidationError),
    /// Configuration errors
    Configuration(ConfigurationError),
    /// File system errors
    FileSystem(FileSystemError),
    /// A data-model invariant (I1-I7) or a hard precondition such as an
    /// embedding-dimension mismatch was violated. Always fatal.
    Invariant(String),
    /// General application errors
    Application(String),
}

/// Database-specific errors
#[derive(Debug, Clone)]
pub enum DatabaseError {
    /// Connection failed
    ConnectionFailed(String),
    /// Query execution failed
    QueryFailed(String),
    /// Migration failed
    MigrationFailed(String),
    /// Constraint violation (e.g., unique constraint)
    ConstraintViolation(String),
    /// Record not found
    NotFound(String),
    /// Invalid data format
    InvalidData(String),
}

/// AI provider errors (re-exported from ai::errors)
pub use crate::ai::errors::AiProviderError;

/// Validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Required field is missing
    MissingField(String),
    /// Field has invalid format
    InvalidFormat(String),
    /// Field value is out of range
    OutOfRange(String),
    /// Field value violates business rule
    BusinessRule(String),
    /// General validation error
    General(String),
}

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigurationError {
    /// Setting not found
    SettingNotFound(String),
    /// Invalid setting value
    InvalidValue(String),
    /// Configuration file not found
    FileNotFound(String),
    /// Failed to parse configuration
    ParseError(String),
    /// Other configuration error
    Other(String),
}

/// File system errors
#[derive(Debug, Clone)]
pub enum FileSystemError {
    /// File not found
    NotFound(String),
    /// Permission denied
    PermissionDenied(String),
    /// Disk full
    DiskFull(String),
    /// General I/O error
    IoError(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Database(e) => write!(f, "Database error: {}", e),
            PipelineError::AiProvider(e) => write!(f, "AI error: {}", e),
            PipelineError::Validation(e) => write!(f, "Validation error: {}", e),
            PipelineError::Configuration(e) => write!(f, "Configuration error: {}", e),
            PipelineError::FileSystem(e) => write!(f, "File system error: {}", e),
            PipelineError::Invariant(msg) => write!(f, "Invariant violation: {}", msg),
            PipelineError::Application(msg) => write!(f, "Application error: {}", msg),
        }
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::ConnectionFailed(msg) => write!(f, "Database connection failed: {}", msg),
            DatabaseError::QueryFailed(msg) => write!(f, "Query failed: {}", msg),
            DatabaseError::MigrationFailed(msg) => write!(f, "Migration failed: {}", msg),
            DatabaseError::ConstraintViolation(msg) => write!(f, "Constraint violation: {}", msg),
            DatabaseError::NotFound(msg) => write!(f, "Record not found: {}", msg),
            DatabaseError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField(field) => write!(f, "Missing required field: {}", field),
            ValidationError::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            ValidationError::OutOfRange(msg) => write!(f, "Value out of range: {}", msg),
            ValidationError::BusinessRule(msg) => write!(f, "Business rule violation: {}", msg),
            ValidationError::General(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::SettingNotFound(setting) => write!(f, "Setting not found: {}", setting),
            ConfigurationError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
            ConfigurationError::FileNotFound(path) => write!(f, "Configuration file not found: {}", path),
            ConfigurationError::ParseError(msg) => write!(f, "Failed to parse configuration: {}", msg),
            ConfigurationError::Other(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSystemError::NotFound(path) => write!(f, "File not found: {}", path),
            FileSystemError::PermissionDenied(path) => write!(f, "Permission denied: {}", path),
            FileSystemError::DiskFull(msg) => write!(f, "Disk full: {}", msg),
            FileSystemError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::AiProvider(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for DatabaseError {}
impl std::error::Error for ValidationError {}
impl std::error::Error for ConfigurationError {}
impl std::error::Error for FileSystemError {}

// Convenience conversions

impl From<DatabaseError> for PipelineError {
    fn from(err: DatabaseError) -> Self {
        PipelineError::Database(err)
    }
}

impl From<AiProviderError> for PipelineError {
    fn from(err: AiProviderError) -> Self {
        PipelineError::AiProvider(err)
    }
}

impl From<ValidationError> for PipelineError {
    fn from(err: ValidationError) -> Self {
        PipelineError::Validation(err)
    }
}

impl From<ConfigurationError> for PipelineError {
    fn from(err: ConfigurationError) -> Self {
        PipelineError::Configuration(err)
    }
}

impl From<FileSystemError> for PipelineError {
    fn from(err: FileSystemError) -> Self {
        PipelineError::FileSystem(err)
    }
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, msg) => {
                let error_msg = msg.unwrap_or_else(|| format!("SQLite error code: {:?}", e.code));
                match e.code {
                    rusqlite::ErrorCode::ConstraintViolation => {
                        DatabaseError::ConstraintViolation(error_msg)
                    }
                    _ => DatabaseError::QueryFailed(error_msg),
                }
            }
            rusqlite::Error::QueryReturnedNoRows => {
                DatabaseError::NotFound("Query returned no rows".to_string())
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for PipelineError {
    fn from(err: rusqlite::Error) -> Self {
        PipelineError::Database(err.into())
    }
}

impl From<std::io::Error> for FileSystemError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => {
                FileSystemError::NotFound(err.to_string())
            }
            std::io::ErrorKind::PermissionDenied => {
                FileSystemError::PermissionDenied(err.to_string())
            }
            _ => FileSystemError::IoError(err.to_string()),
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::FileSystem(err.into())
    }
}

/// Convert a `PipelineError` to a user-friendly string
///
/// This function provides a simplified error message suitable for display
/// to users, hiding technical details while providing actionable information.
pub fn to_user_message(error: &PipelineError) -> String {
    match error {
        PipelineError::Database(e) => match e {
            DatabaseError::ConnectionFailed(_) => {
                "Failed to connect to database. Please try again.".to_string()
            }
            DatabaseError::QueryFailed(msg) => {
                format!("Database operation failed: {}", msg)
            }
            DatabaseError::MigrationFailed(_) => {
                "Database migration failed. Please check logs.".to_string()
            }
            DatabaseError::ConstraintViolation(msg) => {
                format!("Data conflict: {}", msg)
            }
            DatabaseError::NotFound(msg) => {
                format!("Record not found: {}", msg)
            }
            DatabaseError::InvalidData(msg) => {
                format!("Invalid data: {}", msg)
            }
        },
        PipelineError::AiProvider(e) => {
            crate::ai::error_messages::get_short_error_message(e)
        }
        PipelineError::Validation(e) => match e {
            ValidationError::MissingField(field) => {
                format!("Please provide the required field: {}", field)
            }
            ValidationError::InvalidFormat(msg) => {
                format!("Invalid format: {}", msg)
            }
            ValidationError::OutOfRange(msg) => {
                format!("Value out of range: {}", msg)
            }
            ValidationError::BusinessRule(msg) => {
                format!("Validation failed: {}", msg)
            }
            ValidationError::General(msg) => {
                format!("Validation error: {}", msg)
            }
        },
        PipelineError::Configuration(e) => match e {
            ConfigurationError::SettingNotFound(setting) => {
                format!("'{}' is not configured.", setting)
            }
            ConfigurationError::InvalidValue(msg) => {
                format!("Invalid configuration: {}", msg)
            }
            ConfigurationError::FileNotFound(_) => {
                "Configuration file not found. Using defaults.".to_string()
            }
            ConfigurationError::ParseError(msg) => {
                format!("Failed to parse configuration: {}", msg)
            }
            ConfigurationError::Other(msg) => {
                format!("Configuration error: {}", msg)
            }
        },
        PipelineError::FileSystem(e) => match e {
            FileSystemError::NotFound(path) => {
                format!("File not found: {}", path)
            }
            FileSystemError::PermissionDenied(path) => {
                format!("Permission denied: {}", path)
            }
            FileSystemError::DiskFull(_) => {
                "Disk is full. Please free up space.".to_string()
            }
            FileSystemError::IoError(msg) => {
                format!("File system error: {}", msg)
            }
        },
        PipelineError::Invariant(msg) => format!("Internal consistency error: {}", msg),
        PipelineError::Application(msg) => msg.clone(),
    }
}

impl PipelineError {
    /// Status code an HTTP handler should answer with for this error.
    /// Invariant violations are always a 500: they indicate the pipeline
    /// produced inconsistent internal state, never bad caller input.
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PipelineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::Database(DatabaseError::NotFound(_)) => StatusCode::NOT_FOUND,
            PipelineError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PipelineError::Invariant(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PipelineError::AiProvider(_) | PipelineError::Database(_) | PipelineError::FileSystem(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            PipelineError::Application(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log the error and return it (for use in error chains)
    pub fn log_and_return(self, context: &str) -> Self {
        crate::logging::log_pipeline_error(context, &self);
        crate::error_logging::record_error_metric(&self, context);
        self
    }
}

impl From<PipelineError> for String {
    fn from(err: PipelineError) -> String {
        crate::logging::log_pipeline_error("conversion", &err);
        crate::error_logging::record_error_metric(&err, "conversion");
        to_user_message(&err)
    }
}

/// Get a short error message for display in UI or API responses
///
/// Returns a concise error message suitable for toast notifications
/// or inline error displays.
pub fn get_short_error_message(error: &PipelineError) -> String {
    match error {
        PipelineError::Database(e) => match e {
            DatabaseError::ConnectionFailed(_) => "Database connection failed".to_string(),
            DatabaseError::QueryFailed(msg) => format!("Query failed: {}", msg),
            DatabaseError::MigrationFailed(_) => "Database migration failed".to_string(),
            DatabaseError::ConstraintViolation(msg) => msg.clone(),
            DatabaseError::NotFound(msg) => msg.clone(),
            DatabaseError::InvalidData(msg) => format!("Invalid data: {}", msg),
        },
        PipelineError::AiProvider(e) => {
            crate::ai::error_messages::get_short_error_message(e)
        }
        PipelineError::Validation(e) => match e {
            ValidationError::MissingField(field) => format!("{} is required", field),
            ValidationError::InvalidFormat(msg) => msg.clone(),
            ValidationError::OutOfRange(msg) => msg.clone(),
            ValidationError::BusinessRule(msg) => msg.clone(),
            ValidationError::General(msg) => msg.clone(),
        },
        PipelineError::Configuration(e) => match e {
            ConfigurationError::SettingNotFound(setting) => format!("{} not configured", setting),
            ConfigurationError::InvalidValue(msg) => msg.clone(),
            ConfigurationError::FileNotFound(_) => "Configuration file not found".to_string(),
            ConfigurationError::ParseError(msg) => msg.clone(),
            ConfigurationError::Other(msg) => msg.clone(),
        },
        PipelineError::FileSystem(e) => match e {
            FileSystemError::NotFound(path) => format!("File not found: {}", path),
            FileSystemError::PermissionDenied(path) => format!("Permission denied: {}", path),
            FileSystemError::DiskFull(_) => "Disk full".to_string(),
            FileSystemError::IoError(msg) => msg.clone(),
        },
        PipelineError::Invariant(msg) => msg.clone(),
        PipelineError::Application(msg) => msg.clone(),
    }
}

impl axum::response::IntoResponse for PipelineError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        crate::logging::log_pipeline_error("http", &self);
        crate::error_logging::record_error_metric(&self, "http");
        let body = serde_json::json!({ "error": to_user_message(&self) });
        (status, axum::Json(body)).into_response()
    }
}
