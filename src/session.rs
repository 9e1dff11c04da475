//! Deck session: the state behind the playback and DJ controls
//!
//! A session owns the current tune text and replaces it wholesale on every
//! edit, toggle or tempo change. Playback is delegated to a `PlaybackDriver`
//! handed in by the caller, so the session never reaches for a global editor.

use crate::config::DeckConfig;
use crate::error::{DeckError, DeckResult};
use crate::mute::{SectionInfo, SectionToggler};
use crate::preprocess::{PreprocessContext, Preprocessor};
use crate::tempo;
use crate::tunes::DEFAULT_TUNE;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Tag id the session binds to the current volume
pub const VOLUME_TAG: &str = "volume";

/// What the session hands to the evaluator
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackRequest {
    pub script: String,
    pub volume: f64,
}

/// Evaluates scripts and drives audio output
pub trait PlaybackDriver {
    fn play(&mut self, request: &PlaybackRequest) -> DeckResult<()>;
    fn stop(&mut self) -> DeckResult<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    Stopped,
    Playing,
}

/// Serializable view of a session for UIs
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    pub text: String,
    pub sections: Vec<SectionInfo>,
    pub volume: f64,
    pub cpm: Option<f64>,
    pub cpm_error: bool,
    pub state: PlayState,
}

pub struct DeckSession<D: PlaybackDriver> {
    text: String,
    sections: BTreeMap<String, bool>,
    volume: f64,
    cpm_error: bool,
    state: PlayState,
    strip_muted: bool,
    preprocessor: Preprocessor,
    toggler: SectionToggler,
    driver: D,
}

impl<D: PlaybackDriver> DeckSession<D> {
    /// Session over the bundled tune with default rules
    pub fn new(driver: D) -> Self {
        Self {
            text: DEFAULT_TUNE.to_string(),
            sections: BTreeMap::new(),
            volume: 1.0,
            cpm_error: false,
            state: PlayState::Stopped,
            strip_muted: false,
            preprocessor: Preprocessor::default(),
            toggler: SectionToggler::default(),
            driver,
        }
    }

    pub fn with_config(driver: D, config: &DeckConfig) -> DeckResult<Self> {
        let syntax = config.section_syntax()?;
        let mut session = Self::new(driver);
        session.preprocessor = Preprocessor::new(syntax.clone());
        session.toggler = SectionToggler::new(syntax);
        session.volume = config.default_volume;
        Ok(session)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Drop muted blocks from the script instead of passing them on
    pub fn set_strip_muted(&mut self, strip: bool) {
        self.strip_muted = strip;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn cpm_error(&self) -> bool {
        self.cpm_error
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Replace the tune text. Playback picks it up on the next play.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.text = text.into();
        debug!(len = self.text.len(), "tune edited");
    }

    /// Enable or disable a section, re-dispatching if playing
    pub fn toggle(&mut self, section_id: &str, enabled: bool) -> DeckResult<()> {
        self.text = self.toggler.toggle(&self.text, section_id, enabled);
        self.sections.insert(section_id.to_string(), enabled);
        info!(section = section_id, enabled, "section toggled");

        if self.state == PlayState::Playing {
            self.play()?;
        }
        Ok(())
    }

    /// Set the tempo in cycles per minute.
    ///
    /// An invalid value raises the error flag and leaves the text alone.
    /// A valid one clears the flag; playback picks it up on the next play.
    pub fn set_cpm(&mut self, cpm: f64) -> DeckResult<()> {
        match tempo::set_cpm(&self.text, cpm) {
            Ok(text) => {
                self.cpm_error = false;
                self.text = text;
                Ok(())
            }
            Err(e) => {
                self.cpm_error = true;
                Err(e)
            }
        }
    }

    /// Set the volume, re-dispatching if playing
    pub fn set_volume(&mut self, volume: f64) -> DeckResult<()> {
        if !(volume.is_finite() && volume >= 0.0) {
            return Err(DeckError::InvalidVolume(volume));
        }
        self.volume = volume;
        if self.state == PlayState::Playing {
            self.play()?;
        }
        Ok(())
    }

    /// The script the evaluator would receive right now
    pub fn script(&self) -> String {
        self.preprocessor.process(&self.text, &self.context())
    }

    pub fn play(&mut self) -> DeckResult<()> {
        let request = PlaybackRequest {
            script: self.script(),
            volume: self.volume,
        };
        self.driver.play(&request)?;
        if self.state != PlayState::Playing {
            info!("playback started");
        }
        self.state = PlayState::Playing;
        Ok(())
    }

    pub fn stop(&mut self) -> DeckResult<()> {
        self.driver.stop()?;
        self.state = PlayState::Stopped;
        info!("playback stopped");
        Ok(())
    }

    pub fn sections(&self) -> Vec<SectionInfo> {
        self.toggler.sections(&self.text)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            text: self.text.clone(),
            sections: self.sections(),
            volume: self.volume,
            cpm: tempo::current_cpm(&self.text),
            cpm_error: self.cpm_error,
            state: self.state,
        }
    }

    fn context(&self) -> PreprocessContext {
        let mut ctx = PreprocessContext::new()
            .bind(VOLUME_TAG, self.volume.to_string())
            .strip_muted(self.strip_muted);
        for (id, enabled) in &self.sections {
            ctx = ctx.with_section(id, *enabled);
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        plays: Vec<PlaybackRequest>,
        stops: usize,
    }

    impl PlaybackDriver for Recorder {
        fn play(&mut self, request: &PlaybackRequest) -> DeckResult<()> {
            self.plays.push(request.clone());
            Ok(())
        }

        fn stop(&mut self) -> DeckResult<()> {
            self.stops += 1;
            Ok(())
        }
    }

    #[test]
    fn test_play_binds_volume() {
        let mut session = DeckSession::new(Recorder::default()).with_text("x.gain(<volume>)");
        session.set_volume(0.5).unwrap();
        session.play().unwrap();
        assert_eq!(session.driver().plays[0].script, "x.gain(0.5)");
        assert_eq!(session.state(), PlayState::Playing);
    }

    #[test]
    fn test_toggle_redispatches_only_when_playing() {
        let mut session = DeckSession::new(Recorder::default());
        session.toggle("bass", false).unwrap();
        assert!(session.driver().plays.is_empty());

        session.play().unwrap();
        session.toggle("drums", false).unwrap();
        assert_eq!(session.driver().plays.len(), 2);
        assert!(session.driver().plays[1].script.contains("_drums:"));

        session.stop().unwrap();
        assert_eq!(session.driver().stops, 1);
        assert_eq!(session.state(), PlayState::Stopped);
    }

    #[test]
    fn test_invalid_cpm_sets_flag() {
        let mut session = DeckSession::new(Recorder::default());
        let before = session.text().to_string();
        assert!(session.set_cpm(-1.0).is_err());
        assert!(session.cpm_error());
        assert_eq!(session.text(), before);

        session.set_cpm(90.0).unwrap();
        assert!(!session.cpm_error());
        assert_eq!(session.snapshot().cpm, Some(90.0));
    }

    #[test]
    fn test_invalid_volume_keeps_state() {
        let mut session = DeckSession::new(Recorder::default());
        assert!(matches!(
            session.set_volume(f64::NAN),
            Err(DeckError::InvalidVolume(_))
        ));
        assert_eq!(session.volume(), 1.0);
    }
}
