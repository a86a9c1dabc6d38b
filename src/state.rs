use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::boundary::{CreateHotel, ToastQueue};
use crate::config::{DEFAULT_FORM_IDLE_SECS, DEFAULT_MAX_OPEN_FORMS};
use crate::errors::AppError;
use crate::form::{PreviewStore, SubmissionController};

/// One open form: its controller and the toasts it has raised.
pub struct FormInstance {
    pub controller: SubmissionController,
    pub toasts: ToastQueue,
    last_touched: Instant,
}

impl FormInstance {
    pub fn new(mutation: Arc<dyn CreateHotel>, previews: PreviewStore) -> Self {
        let toasts = ToastQueue::new();
        let controller = SubmissionController::new(mutation, Arc::new(toasts.clone()), previews);
        Self {
            controller,
            toasts,
            last_touched: Instant::now(),
        }
    }

    pub fn idle_for(&self) -> Duration {
        self.last_touched.elapsed()
    }

    fn touch(&mut self) {
        self.last_touched = Instant::now();
    }
}

/// Shared application state: the open forms keyed by session form id.
///
/// Forms idle for longer than `idle_ttl` are closed the next time a form is opened, and
/// once `max_forms` are open the least recently used one makes room. A form with a
/// submission in flight is never evicted.
pub struct AppState {
    forms: RwLock<HashMap<String, FormInstance>>,
    pub previews: PreviewStore,
    pub mutation: Arc<dyn CreateHotel>,
    idle_ttl: Duration,
    max_forms: usize,
}

impl AppState {
    pub fn new(mutation: Arc<dyn CreateHotel>) -> Self {
        Self {
            forms: RwLock::new(HashMap::new()),
            previews: PreviewStore::new(),
            mutation,
            idle_ttl: Duration::from_secs(DEFAULT_FORM_IDLE_SECS),
            max_forms: DEFAULT_MAX_OPEN_FORMS,
        }
    }

    pub fn with_limits(mut self, idle_ttl: Duration, max_forms: usize) -> Self {
        self.idle_ttl = idle_ttl;
        self.max_forms = max_forms.max(1);
        self
    }

    /// Run `f` against the form `id`, opening a fresh one if it doesn't exist yet.
    pub fn with_form<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut FormInstance) -> R,
    ) -> Result<R, AppError> {
        let mut forms = self
            .forms
            .write()
            .map_err(|_| AppError::State("form registry lock poisoned".to_string()))?;
        if !forms.contains_key(id) {
            self.evict(&mut forms);
        }
        let instance = forms.entry(id.to_string()).or_insert_with(|| {
            log::debug!("Opening form {id}");
            FormInstance::new(Arc::clone(&self.mutation), self.previews.clone())
        });
        instance.touch();
        Ok(f(instance))
    }

    /// Like `with_form`, but `None` if the form was discarded in the meantime.
    pub fn with_existing_form<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut FormInstance) -> R,
    ) -> Result<Option<R>, AppError> {
        let mut forms = self
            .forms
            .write()
            .map_err(|_| AppError::State("form registry lock poisoned".to_string()))?;
        Ok(forms.get_mut(id).map(|instance| {
            instance.touch();
            f(instance)
        }))
    }

    /// Close a form. Dropping the controller releases its preview.
    pub fn discard(&self, id: &str) -> Result<bool, AppError> {
        let mut forms = self
            .forms
            .write()
            .map_err(|_| AppError::State("form registry lock poisoned".to_string()))?;
        Ok(forms.remove(id).is_some())
    }

    pub fn open_forms(&self) -> usize {
        self.forms.read().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.forms.read().map(|f| f.contains_key(id)).unwrap_or(false)
    }

    /// Make room for one more form.
    fn evict(&self, forms: &mut HashMap<String, FormInstance>) {
        let before = forms.len();
        forms.retain(|_, f| f.controller.is_submitting() || f.idle_for() < self.idle_ttl);

        while forms.len() >= self.max_forms {
            let oldest = forms
                .iter()
                .filter(|(_, f)| !f.controller.is_submitting())
                .min_by_key(|(_, f)| f.last_touched)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    forms.remove(&id);
                }
                None => break,
            }
        }

        let evicted = before - forms.len();
        if evicted > 0 {
            log::debug!("Closed {evicted} idle form(s), {} still open", forms.len());
        }
    }
}
