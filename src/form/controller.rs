use std::collections::BTreeMap;
use std::sync::Arc;

use super::image::{ImageFile, PreviewStore};
use super::payload::SubmissionPayload;
use super::state::{FormState, SelectedImage};
use crate::boundary::{CreateHotel, MutationError, Notifier};
use crate::errors::FormError;
use crate::schema::{self, ValidationResult, find_amenity, find_field};

/// A raw edit coming from one control.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    Text(String),
    Flag(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
}

/// How a submission attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created,
    Failed,
    /// Blocked by validation; nothing was sent.
    Invalid,
    /// Another submission is still outstanding; nothing was sent.
    Busy,
}

/// A submission that passed validation and is waiting on the backend.
#[derive(Debug)]
pub struct SubmitTicket {
    pub generation: u64,
    pub payload: SubmissionPayload,
}

/// Owns one form instance: its state, inline errors, preview and submission lifecycle.
pub struct SubmissionController {
    state: FormState,
    field_errors: BTreeMap<&'static str, String>,
    phase: Phase,
    generation: u64,
    previews: PreviewStore,
    mutation: Arc<dyn CreateHotel>,
    notifier: Arc<dyn Notifier>,
}

impl SubmissionController {
    pub fn new(
        mutation: Arc<dyn CreateHotel>,
        notifier: Arc<dyn Notifier>,
        previews: PreviewStore,
    ) -> Self {
        Self {
            state: FormState::default(),
            field_errors: BTreeMap::new(),
            phase: Phase::Idle,
            generation: 0,
            previews,
            mutation,
            notifier,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    /// Bumped every time the form resets to defaults.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn field_error(&self, key: &str) -> Option<&str> {
        self.field_errors.get(key).map(String::as_str)
    }

    pub fn field_errors(&self) -> &BTreeMap<&'static str, String> {
        &self.field_errors
    }

    /// Apply one edit and re-validate that field only.
    pub fn on_field_change(
        &mut self,
        key: &str,
        input: FieldInput,
    ) -> Result<ValidationResult, FormError> {
        if let Some(spec) = find_field(key) {
            if !spec.is_scalar() {
                return Err(FormError::KindMismatch {
                    key: key.to_string(),
                    expected: "file",
                });
            }
            let FieldInput::Text(raw) = input else {
                return Err(FormError::KindMismatch {
                    key: key.to_string(),
                    expected: "text",
                });
            };
            let result = spec.validate(&raw);
            self.state.set_scalar(spec.key, raw)?;
            match result.reason() {
                Some(reason) => {
                    self.field_errors.insert(spec.key, reason.to_string());
                }
                None => {
                    self.field_errors.remove(spec.key);
                }
            }
            log::debug!("Field '{}' changed (valid: {})", spec.key, result.is_valid());
            return Ok(result);
        }

        if let Some(amenity) = find_amenity(key) {
            let FieldInput::Flag(checked) = input else {
                return Err(FormError::KindMismatch {
                    key: key.to_string(),
                    expected: "boolean",
                });
            };
            self.state.set_amenity(amenity.key, checked)?;
            return Ok(ValidationResult::Valid);
        }

        Err(FormError::UnknownField(key.to_string()))
    }

    /// Take a newly picked file. `None` (the picker was dismissed) leaves everything as is.
    pub fn on_image_selected(&mut self, file: Option<ImageFile>) {
        let Some(file) = file else {
            return;
        };
        let preview = self.previews.create(&file);
        log::debug!(
            "Image '{}' selected ({} bytes), preview {}",
            file.name,
            file.bytes.len(),
            preview.url()
        );
        if let Some(previous) = self.state.replace_image(SelectedImage { file, preview }) {
            self.previews.release(&previous.preview);
        }
    }

    /// Validate, build the payload and announce the submission. Returns the ticket to hand
    /// to the backend, or why nothing will be sent.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, SubmitOutcome> {
        if self.is_submitting() {
            log::warn!("Submission ignored: another one is still outstanding");
            return Err(SubmitOutcome::Busy);
        }

        let validation = schema::validate_all(&self.state);
        self.field_errors = validation
            .errors()
            .map(|(key, reason)| (key, reason.to_string()))
            .collect();
        if !validation.is_valid() {
            log::debug!("Submission blocked by {} invalid field(s)", self.field_errors.len());
            return Err(SubmitOutcome::Invalid);
        }

        let payload = match SubmissionPayload::build(&self.state) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Could not assemble payload: {e}");
                return Err(SubmitOutcome::Invalid);
            }
        };

        self.notifier.notify_pending();
        self.phase = Phase::Submitting;
        log::info!("Submitting hotel: {}", payload.summary());
        Ok(SubmitTicket {
            generation: self.generation,
            payload,
        })
    }

    /// Apply the backend's answer to the ticket issued for `generation`.
    pub fn finish_submit(
        &mut self,
        generation: u64,
        result: Result<(), MutationError>,
    ) -> SubmitOutcome {
        self.phase = Phase::Idle;
        match result {
            Ok(()) => {
                self.notifier.notify_success();
                if generation == self.generation {
                    self.reset();
                } else {
                    log::warn!(
                        "Hotel created from generation {generation}, form is at {}; not resetting",
                        self.generation
                    );
                }
                log::info!("Hotel created");
                SubmitOutcome::Created
            }
            Err(e) => {
                self.notifier.notify_failure();
                if e.is_recoverable() {
                    log::warn!("Hotel creation failed: {e}");
                } else {
                    log::error!("Hotel creation rejected: {e}");
                }
                SubmitOutcome::Failed
            }
        }
    }

    /// Run a whole submission attempt against the configured backend.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let ticket = match self.begin_submit() {
            Ok(t) => t,
            Err(outcome) => return outcome,
        };
        let mutation = Arc::clone(&self.mutation);
        let result = mutation.create_hotel(ticket.payload).await;
        self.finish_submit(ticket.generation, result)
    }

    /// The backend this form submits to.
    pub fn mutation(&self) -> Arc<dyn CreateHotel> {
        Arc::clone(&self.mutation)
    }

    fn release_preview(&mut self) {
        if let Some(selected) = self.state.take_image() {
            self.previews.release(&selected.preview);
        }
    }

    fn reset(&mut self) {
        self.release_preview();
        self.state = FormState::default();
        self.field_errors.clear();
        self.generation += 1;
    }
}

impl Drop for SubmissionController {
    fn drop(&mut self) {
        self.release_preview();
    }
}
