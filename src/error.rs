use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    MissingField(String),
    InvalidField { field: String, reason: String },
    InvalidSide(String),
    InvalidCriteria(String),
    ChainMismatch(String),
    Parse(String),
    Io(String),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

impl AnalyzerError {
    pub fn missing(field: impl Into<String>) -> Self {
        AnalyzerError::MissingField(field.into())
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalyzerError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnalyzerError::MissingField(field) => write!(f, "Missing required field: {}", field),
            AnalyzerError::InvalidField { field, reason } => {
                write!(f, "Invalid value for {}: {}", field, reason)
            }
            AnalyzerError::InvalidSide(side) => {
                write!(f, "Invalid option side '{}': expected 'call' or 'put'", side)
            }
            AnalyzerError::InvalidCriteria(msg) => write!(f, "Invalid criteria: {}", msg),
            AnalyzerError::ChainMismatch(msg) => write!(f, "Inconsistent option chain: {}", msg),
            AnalyzerError::Parse(msg) => write!(f, "Parse error: {}", msg),
            AnalyzerError::Io(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AnalyzerError {}

impl From<serde_json::Error> for AnalyzerError {
    fn from(err: serde_json::Error) -> Self {
        AnalyzerError::Parse(err.to_string())
    }
}

impl From<chrono::ParseError> for AnalyzerError {
    fn from(err: chrono::ParseError) -> Self {
        AnalyzerError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for AnalyzerError {
    fn from(err: std::io::Error) -> Self {
        AnalyzerError::Io(err.to_string())
    }
}
