use thiserror::Error;

use crate::NodeId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Missing coordinates for node {0}")]
    MissingCoordinates(NodeId),
    #[error("Malformed topology: {0}")]
    MalformedTopology(String),
    #[error("Area not found in snapshot: {0}")]
    AreaNotFound(String),
    #[error("Query error: {0}")]
    QueryError(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_culprit() {
        assert_eq!(
            Error::MissingCoordinates(42).to_string(),
            "Missing coordinates for node 42"
        );
        assert_eq!(
            Error::AreaNotFound("europe".to_string()).to_string(),
            "Area not found in snapshot: europe"
        );
    }

    #[test]
    fn test_json_errors_convert() {
        let err: Error = serde_json::from_str::<i64>("nope").unwrap_err().into();
        assert!(matches!(err, Error::JsonError(_)));
    }
}
