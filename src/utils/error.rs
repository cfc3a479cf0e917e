use thiserror::Error;

/// 映射註冊表的操作失敗，作為結果回傳而不是 panic
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("SKU already exists")]
    DuplicateKey { sku: String },

    #[error("SKU not found")]
    NotFound { sku: String },

    #[error("Invalid SKU format for {marketplace}")]
    InvalidFormat { sku: String, marketplace: String },
}

impl RegistryError {
    pub fn sku(&self) -> &str {
        match self {
            RegistryError::DuplicateKey { sku }
            | RegistryError::NotFound { sku }
            | RegistryError::InvalidFormat { sku, .. } => sku,
        }
    }
}

#[derive(Error, Debug)]
pub enum SkuError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Malformed input: {message}")]
    StructuralError { message: String },

    #[error("Cannot decode input as {encoding}: {message}")]
    DecodeError { encoding: String, message: String },

    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    System,
    Registry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SkuError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SkuError::IoError(_) => ErrorCategory::System,
            SkuError::CsvError(_)
            | SkuError::SerializationError(_)
            | SkuError::StructuralError { .. }
            | SkuError::DecodeError { .. }
            | SkuError::UnsupportedFormat { .. } => ErrorCategory::Input,
            SkuError::TomlError(_)
            | SkuError::ConfigError { .. }
            | SkuError::InvalidConfigValueError { .. }
            | SkuError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SkuError::Registry(_) => ErrorCategory::Registry,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Registry => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SkuError::IoError(e) => format!("Could not read or write a file: {}", e),
            SkuError::StructuralError { message } => {
                format!("The uploaded file could not be imported: {}", message)
            }
            SkuError::DecodeError { encoding, .. } => {
                format!("The uploaded file is not valid {} text", encoding)
            }
            SkuError::UnsupportedFormat { extension } => {
                format!("Files of type '.{}' cannot be imported", extension)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SkuError::IoError(_) => "Check that the file exists and that you have permission to access it",
            SkuError::CsvError(_) => "Check the export destination and try again",
            SkuError::SerializationError(_) | SkuError::StructuralError { .. } => {
                "JSON imports must contain a single array of objects"
            }
            SkuError::DecodeError { .. } => "Select the encoding the file was saved with (utf-8, latin1, ascii)",
            SkuError::UnsupportedFormat { .. } => "Save the spreadsheet as CSV or JSON and upload it again",
            SkuError::TomlError(_)
            | SkuError::ConfigError { .. }
            | SkuError::InvalidConfigValueError { .. }
            | SkuError::MissingConfigError { .. } => "Review the configuration file and command line flags",
            SkuError::Registry(_) => "Review the listed SKUs and correct them before importing again",
        }
    }
}

pub type Result<T> = std::result::Result<T, SkuError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_messages() {
        let dup = RegistryError::DuplicateKey { sku: "A-1".into() };
        assert_eq!(dup.to_string(), "SKU already exists");
        assert_eq!(dup.sku(), "A-1");

        let invalid = RegistryError::InvalidFormat {
            sku: "abc".into(),
            marketplace: "Amazon".into(),
        };
        assert_eq!(invalid.to_string(), "Invalid SKU format for Amazon");
    }

    #[test]
    fn test_severity_follows_category() {
        let structural = SkuError::StructuralError {
            message: "root is not an array".into(),
        };
        assert_eq!(structural.category(), ErrorCategory::Input);
        assert_eq!(structural.severity(), ErrorSeverity::High);

        let io = SkuError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.severity(), ErrorSeverity::Critical);

        let registry: SkuError = RegistryError::NotFound { sku: "X".into() }.into();
        assert_eq!(registry.severity(), ErrorSeverity::Medium);
    }
}
