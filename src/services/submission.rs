use crate::core::form::VoiceForm;
use crate::core::state::SubmissionState;
use crate::services::client::AudioGenerator;
use crate::services::playback::{PlaybackBackend, PlaybackSlot};
use crate::services::request::{GenerationRequest, UploadFile};
use crate::utils::audio::AudioInfo;
use log::{error, info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub const MSG_MISSING_FILE: &str = "Please select a file first!";
pub const MSG_BUSY: &str = "Audio is still being generated. Please wait for it to finish.";
pub const MSG_GENERATION_FAILED: &str =
    "There was an error generating the audio. See console for details.";

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("no file selected")]
    MissingFile,
    #[error("a generation request is already in flight")]
    Busy,
    #[error("audio generation failed")]
    Generation(#[source] anyhow::Error),
    #[error("generated audio could not be prepared for playback")]
    Playback(#[source] anyhow::Error),
    #[error("the selected file could not be read")]
    FileRead(#[source] anyhow::Error),
}

impl SubmitError {
    /// Text for the alert shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            SubmitError::MissingFile => MSG_MISSING_FILE,
            SubmitError::Busy => MSG_BUSY,
            SubmitError::Generation(_) | SubmitError::Playback(_) | SubmitError::FileRead(_) => {
                MSG_GENERATION_FAILED
            }
        }
    }

    fn cause(&self) -> Option<&anyhow::Error> {
        match self {
            SubmitError::Generation(cause)
            | SubmitError::Playback(cause)
            | SubmitError::FileRead(cause) => Some(cause),
            SubmitError::MissingFile | SubmitError::Busy => None,
        }
    }

    /// Console diagnostics for a failed submission, cause chain included.
    pub fn report(&self) {
        match self.cause() {
            Some(cause) => error!("{}: {:?}", self, cause),
            None => error!("{}", self),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome<H> {
    pub handle: H,
    pub info: AudioInfo,
}

struct Inner<B: PlaybackBackend> {
    state: SubmissionState,
    playback: PlaybackSlot<B>,
}

impl<B: PlaybackBackend> Inner<B> {
    fn failed(&self) -> SubmissionState {
        SubmissionState::Failed {
            has_output: self.playback.current().is_some(),
        }
    }
}

/// The one path from "generate" click to playable audio.
///
/// At most one request is in flight; every started submission ends in
/// `Succeeded` or `Failed`, including when its future is dropped.
pub struct SubmissionController<G: AudioGenerator, B: PlaybackBackend> {
    generator: G,
    inner: Mutex<Inner<B>>,
}

impl<G: AudioGenerator, B: PlaybackBackend> SubmissionController<G, B> {
    pub fn new(generator: G, backend: B) -> Self {
        Self {
            generator,
            inner: Mutex::new(Inner {
                state: SubmissionState::Idle,
                playback: PlaybackSlot::new(backend),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<B>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().state
    }

    pub fn output_visible(&self) -> bool {
        self.lock().playback.current().is_some()
    }

    pub fn current_playback(&self) -> Option<B::Handle> {
        self.lock().playback.current().cloned()
    }

    /// Takes the current playback handle out of the controller so it
    /// outlives it (e.g. the last generated file on exit).
    pub fn detach_playback(&self) -> Option<B::Handle> {
        self.lock().playback.detach()
    }

    /// Validates the input and claims the in-flight slot. No request is
    /// sent until [`Submission::run`] is awaited.
    pub fn begin(
        &self,
        form: &VoiceForm,
        file: Option<UploadFile>,
    ) -> Result<Submission<'_, G, B>, SubmitError> {
        let file = file.ok_or(SubmitError::MissingFile)?;

        let mut inner = self.lock();
        if inner.state.is_busy() {
            return Err(SubmitError::Busy);
        }
        inner.state = SubmissionState::Submitting;
        drop(inner);

        Ok(Submission {
            controller: self,
            request: GenerationRequest::new(form, file),
            settled: false,
        })
    }

    pub async fn submit(
        &self,
        form: &VoiceForm,
        file: Option<UploadFile>,
    ) -> Result<SubmitOutcome<B::Handle>, SubmitError> {
        self.begin(form, file)?.run().await
    }

    fn settle(
        &self,
        result: anyhow::Result<Vec<u8>>,
    ) -> Result<SubmitOutcome<B::Handle>, SubmitError> {
        let mut inner = self.lock();

        let outcome = match result {
            Ok(audio) => {
                let info = AudioInfo::detect(&audio);
                inner
                    .playback
                    .replace(&audio, &info)
                    .map(|handle| SubmitOutcome { handle, info })
                    .map_err(SubmitError::Playback)
            }
            Err(e) => Err(SubmitError::Generation(e)),
        };

        inner.state = match &outcome {
            Ok(outcome) => {
                info!(
                    "Audio ready ({:?}, {} bytes)",
                    outcome.info.format, outcome.info.size
                );
                SubmissionState::Succeeded
            }
            Err(e) => {
                e.report();
                inner.failed()
            }
        };
        outcome
    }
}

/// A claimed submission; dropping it without running releases the slot.
pub struct Submission<'a, G: AudioGenerator, B: PlaybackBackend> {
    controller: &'a SubmissionController<G, B>,
    request: GenerationRequest,
    settled: bool,
}

impl<'a, G: AudioGenerator, B: PlaybackBackend> Submission<'a, G, B> {
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    pub async fn run(mut self) -> Result<SubmitOutcome<B::Handle>, SubmitError> {
        let result = self.controller.generator.generate(&self.request).await;
        self.settled = true;
        self.controller.settle(result)
    }
}

impl<'a, G: AudioGenerator, B: PlaybackBackend> Drop for Submission<'a, G, B> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!("Submission of {} abandoned before completion", self.request.file.name);
        let mut inner = self.controller.lock();
        inner.state = inner.failed();
    }
}
