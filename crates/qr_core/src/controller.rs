//! Form controller: validation, generation bookkeeping, preview and download.
//!
//! Generation is split in two halves so a UI loop can run the encoder off its
//! own thread: [`FormController::begin_generate`] validates and hands out a
//! ticket, [`FormController::complete_generate`] applies the encoder's answer.
//! Every attempt and every clear issues a new [`GenerationId`]; completions
//! carrying anything but the latest id are dropped, so a slow early request
//! can never overwrite a newer result.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use shared::{
    domain::{
        clamp_size_input, ColorPalette, DOWNLOAD_FILE_NAME, MAX_TEXT_CHARS, QR_MARGIN_MODULES,
    },
    FormError, FormState, GenerationId, RenderOptions, StatusMessage,
};
use tracing::{debug, error, info};

use crate::{
    png_data_url, shared_bytes, Debouncer, DownloadSink, EncodeError, EncodedImage, QrEncoder,
    SaveOutcome,
};

pub const PREVIEW_CORNER_RADIUS: f32 = 12.0;

const STATUS_GENERATING: &str = "Generating...";
const STATUS_DONE: &str = "Ready";
const STATUS_CLEARED: &str = "Ready.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Idle,
    Pending,
    Ready,
    Failed,
}

/// The last successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    pub generation: GenerationId,
    pub png: Arc<[u8]>,
    pub width: u32,
}

impl RenderResult {
    pub fn data_url(&self) -> String {
        png_data_url(&self.png)
    }
}

/// What the preview surface should show.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewImage {
    pub generation: GenerationId,
    pub png: Arc<[u8]>,
    /// Displayed edge length; the preview is always square.
    pub edge: u32,
    pub background: String,
    pub corner_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateTicket {
    pub id: GenerationId,
    pub text: String,
    pub options: RenderOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Failed(String),
    /// A newer attempt or a clear superseded this one.
    Stale,
}

#[derive(Debug)]
pub struct FormController {
    form: FormState,
    current: Option<RenderResult>,
    preview: Option<PreviewImage>,
    status: StatusMessage,
    phase: ControllerPhase,
    latest: GenerationId,
    in_flight: Option<(GenerationId, RenderOptions)>,
    debouncer: Debouncer,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new(FormState::default())
    }
}

impl FormController {
    pub fn new(form: FormState) -> Self {
        Self::with_debouncer(form, Debouncer::default())
    }

    pub fn with_debouncer(form: FormState, debouncer: Debouncer) -> Self {
        Self {
            form,
            current: None,
            preview: None,
            status: StatusMessage::info(STATUS_CLEARED),
            phase: ControllerPhase::Idle,
            latest: GenerationId(0),
            in_flight: None,
            debouncer,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Direct access for input widgets. Callers follow edits with
    /// [`Self::schedule_auto_generate`].
    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub fn status(&self) -> &StatusMessage {
        &self.status
    }

    pub fn result(&self) -> Option<&RenderResult> {
        self.current.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewImage> {
        self.preview.as_ref()
    }

    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    pub fn latest_generation(&self) -> GenerationId {
        self.latest
    }

    /// Reads the render options and writes the clamped size back to the field.
    pub fn read_options(&mut self) -> RenderOptions {
        let width = clamp_size_input(&self.form.size_input);
        self.form.size_input = width.to_string();

        RenderOptions {
            width,
            margin: QR_MARGIN_MODULES,
            error_correction_level: self.form.error_correction,
            color: ColorPalette {
                dark: self.form.foreground.clone(),
                light: self.form.background.clone(),
            },
        }
    }

    pub fn begin_generate(&mut self) -> Result<GenerateTicket, FormError> {
        let id = self.issue_generation();
        let text = self.form.text.trim().to_string();

        if text.is_empty() {
            self.discard_render();
            self.phase = ControllerPhase::Failed;
            return Err(self.refuse(FormError::EmptyInput));
        }

        let length = text.chars().count();
        if length > MAX_TEXT_CHARS {
            // The previous render stays visible; only an in-flight one is dropped.
            if self.phase == ControllerPhase::Pending {
                self.phase = ControllerPhase::Failed;
            }
            return Err(self.refuse(FormError::InputTooLong {
                length,
                max: MAX_TEXT_CHARS,
            }));
        }

        let options = self.read_options();
        self.discard_render();
        self.status = StatusMessage::info(STATUS_GENERATING);
        self.phase = ControllerPhase::Pending;
        self.in_flight = Some((id, options.clone()));
        debug!(
            generation = id.0,
            width = options.width,
            level = %options.error_correction_level,
            "generation started"
        );

        Ok(GenerateTicket { id, text, options })
    }

    pub fn complete_generate(
        &mut self,
        id: GenerationId,
        outcome: Result<EncodedImage, EncodeError>,
    ) -> Completion {
        let options = match self.in_flight.take() {
            Some((pending, options)) if pending == id => options,
            other => {
                self.in_flight = other;
                debug!(
                    generation = id.0,
                    latest = self.latest.0,
                    "dropping stale generation result"
                );
                return Completion::Stale;
            }
        };

        match outcome {
            Ok(encoded) => {
                let png = shared_bytes(encoded.png);
                self.preview = Some(PreviewImage {
                    generation: id,
                    png: Arc::clone(&png),
                    edge: options.width,
                    background: options.color.light.clone(),
                    corner_radius: PREVIEW_CORNER_RADIUS,
                });
                self.current = Some(RenderResult {
                    generation: id,
                    png,
                    width: encoded.width,
                });
                self.status = StatusMessage::ok(STATUS_DONE);
                self.phase = ControllerPhase::Ready;
                info!(generation = id.0, modules = encoded.modules, "QR generated");
                Completion::Applied
            }
            Err(err) => {
                error!(generation = id.0, error = %err, options = ?options, "QR generation failed");
                let reason = err.to_string();
                self.status = FormError::EncodingFailure(reason.clone()).status_message();
                self.phase = ControllerPhase::Failed;
                Completion::Failed(reason)
            }
        }
    }

    /// Runs both halves against `encoder` on the caller's task.
    pub async fn generate<E>(&mut self, encoder: &E) -> Result<(), FormError>
    where
        E: QrEncoder + ?Sized,
    {
        let ticket = self.begin_generate()?;
        let outcome = encoder.encode(&ticket.text, &ticket.options).await;
        match self.complete_generate(ticket.id, outcome) {
            Completion::Applied | Completion::Stale => Ok(()),
            Completion::Failed(reason) => Err(FormError::EncodingFailure(reason)),
        }
    }

    pub fn download_current(&mut self, sink: &mut dyn DownloadSink) -> Result<(), FormError> {
        let Some(result) = self.current.as_ref() else {
            return Err(self.refuse(FormError::NoResultToDownload));
        };

        match sink.save(DOWNLOAD_FILE_NAME, &result.png) {
            Ok(SaveOutcome::Saved { location: None }) => {
                self.status = StatusMessage::ok("Downloading PNG...");
                Ok(())
            }
            Ok(SaveOutcome::Saved {
                location: Some(path),
            }) => {
                info!(path = %path.display(), "saved QR image");
                self.status = StatusMessage::ok(format!("Saved PNG to {}", path.display()));
                Ok(())
            }
            Ok(SaveOutcome::Cancelled) => {
                self.status = StatusMessage::info("Download cancelled.");
                Ok(())
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "saving QR image failed");
                Err(self.refuse(FormError::SaveFailed(format!("{err:#}"))))
            }
        }
    }

    pub fn clear(&mut self) {
        self.issue_generation();
        self.debouncer.cancel();
        self.form.text.clear();
        self.discard_render();
        self.status = StatusMessage::info(STATUS_CLEARED);
        self.phase = ControllerPhase::Idle;
    }

    /// Restarts the auto-generate countdown after an edit.
    pub fn schedule_auto_generate(&mut self, now: Instant) {
        self.debouncer.schedule(now);
    }

    /// `true` once the countdown has elapsed without further edits; the
    /// caller should then start a generation.
    pub fn take_due_auto_generate(&mut self, now: Instant) -> bool {
        self.debouncer.fire_if_due(now)
    }

    pub fn auto_generate_remaining(&self, now: Instant) -> Option<Duration> {
        self.debouncer.remaining(now)
    }

    fn issue_generation(&mut self) -> GenerationId {
        self.latest = self.latest.next();
        self.in_flight = None;
        self.latest
    }

    fn discard_render(&mut self) {
        self.current = None;
        self.preview = None;
    }

    fn refuse(&mut self, err: FormError) -> FormError {
        self.status = err.status_message();
        err
    }
}
