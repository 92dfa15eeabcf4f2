// GestLock — Enrollment / Authentication Engine
//
// Owns the single enrolled template and its persistent copy. Template
// lifecycle: absent → enrolled → replaced by a later enrollment → erased.
// It is only ever swapped wholesale.

use thiserror::Error;

use super::similarity::{self, Decision, MatchPolicy, SimilarityError};
use super::template::TemplateStore;
use super::GestureSequence;
use crate::config::*;

/// Why an engine command produced no decision.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no gesture template enrolled")]
    NoTemplate,
    #[error("gesture contains no motion")]
    EmptyGesture,
    #[error(transparent)]
    Similarity(#[from] SimilarityError),
    #[error("sensor failure: {0:#}")]
    Sensor(anyhow::Error),
    #[error("storage failure: {0:#}")]
    Storage(anyhow::Error),
}

/// Matching knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Per-axis magnitude under which edge samples are trimmed.
    pub trim_threshold: f32,
    pub policy: MatchPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trim_threshold: TRIM_THRESHOLD,
            policy: MatchPolicy::default(),
        }
    }
}

pub struct GestureEngine<S> {
    store: S,
    config: EngineConfig,
    template: Option<GestureSequence>,
}

impl<S: TemplateStore> GestureEngine<S> {
    /// Create the engine and restore any persisted template.
    ///
    /// An unreadable blob is logged and treated as "nothing enrolled" so a
    /// corrupt flash page cannot keep the device from booting.
    pub fn new(mut store: S, config: EngineConfig) -> Self {
        let template = match store.load() {
            Ok(Some(t)) if !t.is_empty() => {
                log::info!("Restored gesture template ({} samples)", t.len());
                Some(t)
            }
            Ok(_) => None,
            Err(e) => {
                log::warn!("Stored template unreadable, ignoring: {:#}", e);
                None
            }
        };
        Self { store, config, template }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }

    pub fn template(&self) -> Option<&GestureSequence> {
        self.template.as_ref()
    }

    /// Trim `capture` and make it the template. Returns the kept length.
    ///
    /// The new template is persisted before it replaces the old one in RAM, so
    /// a storage failure leaves the previous enrollment in force.
    pub fn enroll(&mut self, mut capture: GestureSequence) -> Result<usize, EngineError> {
        capture.trim(self.config.trim_threshold);
        if capture.is_empty() {
            return Err(EngineError::EmptyGesture);
        }

        self.store.save(&capture).map_err(EngineError::Storage)?;
        let len = capture.len();
        self.template = Some(capture);
        log::info!("Gesture enrolled ({} samples)", len);
        Ok(len)
    }

    /// Trim `capture` and compare it with the template.
    pub fn authenticate(&self, mut capture: GestureSequence) -> Result<Decision, EngineError> {
        let template = self.template.as_ref().ok_or(EngineError::NoTemplate)?;

        capture.trim(self.config.trim_threshold);
        let decision = similarity::compare(template, &capture, &self.config.policy)?;
        log::info!(
            "Authentication {} ({:?}, {} vs {} samples)",
            if decision.accepted { "accepted" } else { "rejected" },
            decision.score,
            template.len(),
            capture.len()
        );
        Ok(decision)
    }

    /// Forget the template, in storage and then in RAM.
    ///
    /// A storage failure keeps the template, so RAM never disagrees with what
    /// the next boot restores.
    pub fn erase(&mut self) -> Result<(), EngineError> {
        self.store.erase().map_err(EngineError::Storage)?;
        self.template = None;
        log::info!("Gesture template erased");
        Ok(())
    }
}
