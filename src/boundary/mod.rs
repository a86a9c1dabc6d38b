//! Collaborators the form talks to but doesn't own: the backend mutation and the
//! notification surface.

pub mod mutation;
pub mod notify;

pub use mutation::{CreateHotel, HttpCreateHotel, MutationError};
pub use notify::{Notifier, Toast, ToastKind, ToastQueue};
