//! Shared test infrastructure for the form tests.
//!
//! - `RecordingNotifier` keeps every notification in order
//! - `ScriptedBackend` records payloads and answers from a queue, optionally waiting on a
//!   gate so a submission can be held open
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use amali::boundary::{CreateHotel, MutationError, Notifier};
use amali::form::{FieldInput, ImageFile, PreviewStore, SubmissionController, SubmissionPayload};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const HOTEL_NAME: &str = "Lakeview Inn";
pub const HOTEL_LOCATION: &str = "Kandy";
pub const HOTEL_PRICE: &str = "120";
pub const HOTEL_DESCRIPTION: &str = "Quiet retreat";

// ============================================================================
// NOTIFIER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Note {
    Pending,
    Success,
    Failure,
}

#[derive(Default)]
pub struct RecordingNotifier {
    notes: Mutex<Vec<Note>>,
}

impl RecordingNotifier {
    pub fn notes(&self) -> Vec<Note> {
        self.notes.lock().expect("notifier lock").clone()
    }

    fn record(&self, note: Note) {
        self.notes.lock().expect("notifier lock").push(note);
    }
}

impl Notifier for RecordingNotifier {
    fn notify_pending(&self) {
        self.record(Note::Pending);
    }

    fn notify_success(&self) {
        self.record(Note::Success);
    }

    fn notify_failure(&self) {
        self.record(Note::Failure);
    }
}

// ============================================================================
// BACKEND
// ============================================================================

/// Answers `Ok(())` once its queue of scripted results runs out.
#[derive(Default)]
pub struct ScriptedBackend {
    payloads: Mutex<Vec<SubmissionPayload>>,
    results: Mutex<VecDeque<Result<(), MutationError>>>,
    answered: Mutex<usize>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedBackend {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing(error: MutationError) -> Self {
        let backend = Self::default();
        backend.push_result(Err(error));
        backend
    }

    /// Every call waits for a `notify_one` on the returned gate before answering.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let backend = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (backend, gate)
    }

    pub fn push_result(&self, result: Result<(), MutationError>) {
        self.results.lock().expect("results lock").push_back(result);
    }

    pub fn payloads(&self) -> Vec<SubmissionPayload> {
        self.payloads.lock().expect("payloads lock").clone()
    }

    pub fn calls(&self) -> usize {
        self.payloads.lock().expect("payloads lock").len()
    }

    /// Calls that have returned their result, as opposed to ones still held at the gate.
    pub fn answered(&self) -> usize {
        *self.answered.lock().expect("answered lock")
    }
}

#[async_trait]
impl CreateHotel for ScriptedBackend {
    async fn create_hotel(&self, payload: SubmissionPayload) -> Result<(), MutationError> {
        self.payloads.lock().expect("payloads lock").push(payload);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        *self.answered.lock().expect("answered lock") += 1;
        self.results
            .lock()
            .expect("results lock")
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

// ============================================================================
// CONTROLLER SETUP
// ============================================================================

pub struct Harness {
    pub controller: SubmissionController,
    pub backend: Arc<ScriptedBackend>,
    pub notifier: Arc<RecordingNotifier>,
    pub previews: PreviewStore,
}

pub fn harness(backend: ScriptedBackend) -> Harness {
    let backend = Arc::new(backend);
    let notifier = Arc::new(RecordingNotifier::default());
    let previews = PreviewStore::new();
    let controller = SubmissionController::new(
        Arc::clone(&backend) as Arc<dyn CreateHotel>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        previews.clone(),
    );
    Harness { controller, backend, notifier, previews }
}

pub fn text(value: &str) -> FieldInput {
    FieldInput::Text(value.to_string())
}

/// Fill every required field with the Lakeview Inn listing.
pub fn fill_valid(controller: &mut SubmissionController) {
    for (key, value) in [
        ("name", HOTEL_NAME),
        ("location", HOTEL_LOCATION),
        ("price", HOTEL_PRICE),
        ("description", HOTEL_DESCRIPTION),
    ] {
        controller
            .on_field_change(key, text(value))
            .expect("known field");
    }
}

pub fn png(name: &str) -> ImageFile {
    ImageFile::new(name, "image/png", vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a])
}
