use std::sync::{Arc, RwLock};

pub const PENDING_MESSAGE: &str = "Creating hotel...";
pub const SUCCESS_MESSAGE: &str = "Hotel created successfully";
pub const FAILURE_MESSAGE: &str = "Hotel creation failed";

/// Fire-and-forget progress reporting for a submission.
pub trait Notifier: Send + Sync {
    fn notify_pending(&self);
    fn notify_success(&self);
    fn notify_failure(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Loading,
    Success,
    Error,
}

impl ToastKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            ToastKind::Loading => "toast-loading",
            ToastKind::Success => "toast-success",
            ToastKind::Error => "toast-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

/// Toasts waiting to be shown on the next page render, oldest first. The loading toast
/// stays queued after its outcome arrives, so a page rendered after the fact still shows
/// that the submission was in progress before it ended.
#[derive(Debug, Clone, Default)]
pub struct ToastQueue {
    inner: Arc<RwLock<Vec<Toast>>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, kind: ToastKind, message: &str) {
        let Ok(mut toasts) = self.inner.write() else {
            return;
        };
        toasts.push(Toast {
            kind,
            message: message.to_string(),
        });
    }

    /// Remove and return everything queued so far.
    pub fn drain(&self) -> Vec<Toast> {
        match self.inner.write() {
            Ok(mut toasts) => std::mem::take(&mut *toasts),
            Err(_) => Vec::new(),
        }
    }

    pub fn peek(&self) -> Vec<Toast> {
        self.inner.read().map(|t| t.clone()).unwrap_or_default()
    }
}

impl Notifier for ToastQueue {
    fn notify_pending(&self) {
        self.push(ToastKind::Loading, PENDING_MESSAGE);
    }

    fn notify_success(&self) {
        self.push(ToastKind::Success, SUCCESS_MESSAGE);
    }

    fn notify_failure(&self) {
        self.push(ToastKind::Error, FAILURE_MESSAGE);
    }
}
