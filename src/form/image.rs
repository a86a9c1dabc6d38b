use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A file picked by the user. Stays local until the form is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Displayable reference to a registered preview. Holding one does not keep the preview
/// alive; it lives until `PreviewStore::release` is called with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    token: String,
}

impl PreviewHandle {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn url(&self) -> String {
        format!("{PREVIEW_PATH}/{}", self.token)
    }
}

/// Route prefix the host serves previews under.
pub const PREVIEW_PATH: &str = "/previews";

#[derive(Debug, Clone)]
pub struct PreviewImage {
    pub content_type: String,
    pub bytes: Arc<[u8]>,
}

/// Registry of live preview images, shared between form instances and the route that
/// serves them.
#[derive(Debug, Clone, Default)]
pub struct PreviewStore {
    inner: Arc<RwLock<HashMap<String, PreviewImage>>>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a preview for `file` and return its handle.
    pub fn create(&self, file: &ImageFile) -> PreviewHandle {
        let token = generate_token();
        let image = PreviewImage {
            content_type: file.content_type.clone(),
            bytes: Arc::from(file.bytes.as_slice()),
        };
        if let Ok(mut map) = self.inner.write() {
            map.insert(token.clone(), image);
        }
        PreviewHandle { token }
    }

    /// Release a preview. Returns false if it was already gone.
    pub fn release(&self, handle: &PreviewHandle) -> bool {
        match self.inner.write() {
            Ok(mut map) => map.remove(&handle.token).is_some(),
            Err(_) => false,
        }
    }

    pub fn get(&self, token: &str) -> Option<PreviewImage> {
        self.inner.read().ok()?.get(token).cloned()
    }

    pub fn is_live(&self, handle: &PreviewHandle) -> bool {
        self.get(&handle.token).is_some()
    }

    pub fn live_count(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }
}

/// Random 16-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    hex::encode(bytes)
}
