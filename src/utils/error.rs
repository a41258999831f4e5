use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Service responded with HTTP {status}: {message}")]
    ServiceStatusError {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Unexpected service response: {message}")]
    ResponseFormatError { message: String },

    #[error("A ring size must be selected before ordering")]
    SizeNotSelected,

    #[error("Order was rejected: {message}")]
    OrderRejected { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    UserInput,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SiteError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SiteError::ApiError(_) | SiteError::ServiceStatusError { .. } => ErrorCategory::Network,
            SiteError::ConfigError { .. }
            | SiteError::MissingConfigError { .. }
            | SiteError::InvalidConfigValueError { .. }
            | SiteError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            SiteError::SerializationError(_)
            | SiteError::ResponseFormatError { .. }
            | SiteError::OrderRejected { .. } => ErrorCategory::Data,
            SiteError::SizeNotSelected => ErrorCategory::UserInput,
            SiteError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::UserInput | ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SiteError::ApiError(_) => "Could not reach the remote service".to_string(),
            SiteError::ServiceStatusError { status, .. } => {
                format!("The remote service answered with HTTP {}", status)
            }
            SiteError::SizeNotSelected => "Please select a ring size".to_string(),
            SiteError::OrderRejected { message } => format!("Your order could not be created: {}", message),
            SiteError::MissingConfigError { field } => format!("Setting '{}' is required", field),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your connection and try again later",
            ErrorCategory::Configuration => "Review halo.toml and the HALO_* environment variables",
            ErrorCategory::Data => "The service returned data in an unexpected shape; check the service version",
            ErrorCategory::UserInput => "Pick one of the available ring sizes (US 6 to US 13)",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    /// HTTP 狀態碼（僅限服務端回應錯誤）
    pub fn http_status(&self) -> Option<u16> {
        match self {
            SiteError::ServiceStatusError { status, .. } => Some(*status),
            SiteError::ApiError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl ErrorSeverity {
    /// CLI 結束碼，只有 Low 視為成功
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        assert_eq!(SiteError::SizeNotSelected.category(), ErrorCategory::UserInput);
        assert_eq!(SiteError::SizeNotSelected.severity(), ErrorSeverity::Medium);
        let status = SiteError::ServiceStatusError {
            status: 503,
            code: None,
            message: "unavailable".to_string(),
        };
        assert_eq!(status.category(), ErrorCategory::Network);
        assert_eq!(status.severity(), ErrorSeverity::Medium);
        assert_eq!(status.http_status(), Some(503));

        let missing = SiteError::MissingConfigError {
            field: "checkout.endpoint".to_string(),
        };
        assert_eq!(missing.severity(), ErrorSeverity::High);
        assert!(missing.user_friendly_message().contains("checkout.endpoint"));
    }

    #[test]
    fn test_failed_commands_exit_nonzero() {
        assert_eq!(SiteError::SizeNotSelected.severity().exit_code(), 2);
        let io = SiteError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "halo.toml"));
        assert_eq!(io.severity().exit_code(), 3);
        assert_eq!(ErrorSeverity::Low.exit_code(), 0);
    }
}
