//! Tempo control through the tune's `setcps(...)` call
//!
//! The deck expresses tempo in cycles per minute; the pattern language wants
//! cycles per second, so the call is written as `setcps(<cpm>/60/4)`.

use crate::error::{DeckError, DeckResult};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

lazy_static! {
    static ref SETCPS_RE: Regex = Regex::new(r"setcps\([^)]+\)").unwrap();
    static ref CPM_RE: Regex =
        Regex::new(r"setcps\(\s*([0-9]*\.?[0-9]+)\s*/\s*60\s*/\s*4\s*\)").unwrap();
}

/// Accept only positive finite cycles-per-minute values
pub fn validate_cpm(cpm: f64) -> DeckResult<f64> {
    if cpm.is_finite() && cpm > 0.0 {
        Ok(cpm)
    } else {
        warn!(cpm, "rejected tempo");
        Err(DeckError::InvalidTempo(cpm))
    }
}

/// Rewrite the first `setcps(...)` call to the given tempo.
///
/// Text without a `setcps` call comes back unchanged.
pub fn set_cpm(text: &str, cpm: f64) -> DeckResult<String> {
    let cpm = validate_cpm(cpm)?;
    let replacement = format!("setcps({}/60/4)", cpm);
    if !SETCPS_RE.is_match(text) {
        debug!("no setcps call to rewrite");
    }
    Ok(SETCPS_RE.replace(text, replacement.as_str()).into_owned())
}

/// Read back the tempo of a `setcps(<cpm>/60/4)` call
pub fn current_cpm(text: &str) -> Option<f64> {
    CPM_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_cpm_rewrites_first_call() {
        let text = "setcps(0.5)\nbass: x\n// setcps(1)";
        assert_eq!(
            set_cpm(text, 140.0).unwrap(),
            "setcps(140/60/4)\nbass: x\n// setcps(1)"
        );
        assert_eq!(
            set_cpm("setcps(120/60/4)", 92.5).unwrap(),
            "setcps(92.5/60/4)"
        );
    }

    #[test]
    fn test_set_cpm_without_call() {
        assert_eq!(set_cpm("bass: x", 120.0).unwrap(), "bass: x");
        assert_eq!(set_cpm("setcps()", 120.0).unwrap(), "setcps()");
    }

    #[test]
    fn test_invalid_cpm_rejected() {
        for bad in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(set_cpm("setcps(1)", bad), Err(DeckError::InvalidTempo(_))));
        }
    }

    #[test]
    fn test_current_cpm() {
        assert_eq!(current_cpm("setcps(140/60/4)"), Some(140.0));
        assert_eq!(current_cpm("setcps( 92.5 / 60 / 4 )"), Some(92.5));
        assert_eq!(current_cpm("setcps(0.5)"), None);
    }
}
