//! Error types for tunedeck operations

use std::fmt;

/// Errors raised by deck operations.
///
/// Text transforms never fail: malformed tags and odd log lines are passed
/// through or normalized. Only configuration, user-supplied numbers and the
/// outer I/O and playback layers produce errors.
#[derive(Debug)]
pub enum DeckError {
    /// Lexical rules or config file contents are unusable
    Config(String),
    /// Tempo (cycles per minute) was not a positive finite number
    InvalidTempo(f64),
    /// Volume was negative or not finite
    InvalidVolume(f64),
    /// The playback driver rejected a request
    Playback(String),
    /// IO error
    Io(std::io::Error),
    /// Malformed command-line or file input
    Parse(String),
}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DeckError::InvalidTempo(v) => {
                write!(f, "Invalid tempo: {} (expected a positive number of cycles per minute)", v)
            }
            DeckError::InvalidVolume(v) => {
                write!(f, "Invalid volume: {} (expected a finite value >= 0)", v)
            }
            DeckError::Playback(msg) => write!(f, "Playback error: {}", msg),
            DeckError::Io(e) => write!(f, "IO error: {}", e),
            DeckError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for DeckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeckError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DeckError {
    fn from(e: std::io::Error) -> Self {
        DeckError::Io(e)
    }
}

/// Result type for deck operations
pub type DeckResult<T> = Result<T, DeckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!("{}", DeckError::Config("empty mute marker".to_string())),
            "Configuration error: empty mute marker"
        );
        assert!(format!("{}", DeckError::InvalidTempo(-3.0)).contains("-3"));
        assert!(format!("{}", DeckError::InvalidVolume(f64::NAN)).contains("NaN"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.tune");
        let err: DeckError = io.into();
        assert!(matches!(err, DeckError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
