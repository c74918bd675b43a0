use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommissionsError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Internal calculation failure: {0}")]
    Internal(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CommissionsError {
    /// True for failures a transport should surface as a client error (400).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CommissionsError::InvalidInput { .. } | CommissionsError::Serialization(_)
        )
    }
}

impl From<serde_json::Error> for CommissionsError {
    fn from(e: serde_json::Error) -> Self {
        CommissionsError::Serialization(e.to_string())
    }
}
