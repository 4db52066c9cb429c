//! Unit tests for error handling
//!
//! Tests error types, conversions, and error message formatting.

#[cfg(test)]
mod tests {
    use std::io;

    use crate::errors::ChanRankError;

    // ====== Error Type Tests ======

    #[test]
    fn test_custom_error() {
        let error = ChanRankError::Custom("Test error message".to_string());
        assert_eq!(format!("{error}"), "Test error message");
    }

    #[test]
    fn test_unauthorized_is_auth() {
        let error = ChanRankError::Unauthorized("session expired".to_string());
        assert!(error.is_auth());
        assert!(!error.is_remote());
        assert!(format!("{error}").contains("session expired"));
    }

    #[test]
    fn test_remote_errors_are_remote() {
        assert!(ChanRankError::RemoteAccess("flood wait".to_string()).is_remote());
        assert!(ChanRankError::ChannelNotFound("@nope".to_string()).is_remote());
        assert!(!ChanRankError::Config("bad".to_string()).is_remote());
    }

    // ====== Error Conversion Tests ======

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let err: ChanRankError = io_err.into();
        assert!(matches!(err, ChanRankError::Io(_)));
        assert!(!err.is_auth());
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ChanRankError = json_err.into();
        assert!(matches!(err, ChanRankError::Serialization(_)));
    }

    #[test]
    fn test_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: ChanRankError = toml_err.into();
        assert!(matches!(err, ChanRankError::TomlParsing(_)));
    }
}
