//! Form state and the submission lifecycle around it.

pub mod controller;
pub mod image;
pub mod payload;
pub mod state;

pub use controller::{FieldInput, Phase, SubmissionController, SubmitOutcome, SubmitTicket};
pub use image::{ImageFile, PREVIEW_PATH, PreviewHandle, PreviewImage, PreviewStore};
pub use payload::{PayloadValue, SubmissionPayload};
pub use state::{FormState, SelectedImage};
