use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Serialize for ReportError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_display() {
        let err = ReportError::InvalidInput("unknown error status: Warning".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid input: unknown error status: Warning"
        );
    }

    #[test]
    fn serde_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("not valid json").unwrap_err();
        let err: ReportError = json_err.into();
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    fn serialize_produces_string() {
        let err = ReportError::InvalidInput("test error".to_string());
        let json = serde_json::to_string(&err).expect("serialize should succeed");
        assert_eq!(json, "\"Invalid input: test error\"");
    }

    #[test]
    fn error_is_debug() {
        let err = ReportError::InvalidInput("test".to_string());
        let debug = format!("{:?}", err);
        assert!(debug.contains("InvalidInput"));
    }
}
