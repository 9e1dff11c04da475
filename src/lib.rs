//! # Tunedeck - Section control for live-coded tunes
//!
//! Tunedeck is the text core of a live-coding "DJ deck". A tune is held as
//! annotated pattern-language source; the deck mutes and unmutes labelled
//! sections by rewriting that text, resolves placeholder tags before handing
//! the script to an evaluator, and turns the evaluator's log output into a
//! gain series for charting.
//!
//! ## Core Features
//!
//! - **Section Toggling**: `bass:` <-> `_bass:` on every label line, idempotent
//! - **Tag Preprocessing**: `<name>` placeholders resolved from bindings and
//!   section states, string- and comment-aware
//! - **Tempo Control**: validated rewriting of the tune's `setcps(...)` call
//! - **Gain Extraction**: `gain:<number>` pulled out of log lines, 0 otherwise
//! - **Configurable Syntax**: label, mute marker and tag tokens from TOML
//!
//! ## Quick Start
//!
//! ```rust
//! use tunedeck::mute::toggle_section_prefix;
//! use tunedeck::preprocess::{preprocess, PreprocessContext, Preprocessor};
//! use tunedeck::gain::parse_gain;
//!
//! let tune = "bass: note(\"c2 g1\")\ndrums: s(\"bd sd\")\n";
//!
//! // Mute the bass, leave the drums alone
//! let muted = toggle_section_prefix(tune, "bass", false);
//! assert_eq!(muted, "_bass: note(\"c2 g1\")\ndrums: s(\"bd sd\")\n");
//!
//! // Resolve tags before evaluation
//! let ctx = PreprocessContext::new().bind("volume", "0.8");
//! let script = Preprocessor::default().process("all(x => x.gain(<volume>))", &ctx);
//! assert_eq!(script, "all(x => x.gain(0.8))");
//! assert_eq!(preprocess(""), "");
//!
//! // Chart the evaluator's gain output
//! assert_eq!(parse_gain(Some("[hap] s:bd gain:0.42")), 0.42);
//! assert_eq!(parse_gain(None), 0.0);
//! ```

pub mod config;
pub mod error;
pub mod gain;
pub mod log_bus;
pub mod mute;
pub mod preprocess;
pub mod session;
pub mod syntax;
pub mod tempo;
pub mod tunes;

pub use config::DeckConfig;
pub use error::{DeckError, DeckResult};
pub use gain::{parse_gain, parse_gains, GainExtractor, GainSeries};
pub use log_bus::{GainMonitor, LogBus, LogEvent};
pub use mute::{toggle_section_prefix, SectionInfo, SectionToggler};
pub use preprocess::{preprocess, PreprocessContext, Preprocessor};
pub use session::{DeckSession, PlayState, PlaybackDriver, PlaybackRequest};
pub use syntax::{LexicalRules, SectionSyntax};
