use std::collections::BTreeMap;

use super::image::{ImageFile, PreviewHandle};
use crate::errors::FormError;
use crate::schema::{self, AMENITIES};

/// The file currently chosen for upload, with the preview derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedImage {
    pub file: ImageFile,
    pub preview: PreviewHandle,
}

/// Everything the user has entered so far. Keys come from the schema; values outside the
/// schema can't be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    scalars: BTreeMap<&'static str, String>,
    amenities: BTreeMap<&'static str, bool>,
    image: Option<SelectedImage>,
}

impl Default for FormState {
    fn default() -> Self {
        let scalars = schema::scalar_fields()
            .map(|f| (f.key, f.default.to_string()))
            .collect();
        let amenities = AMENITIES.iter().map(|a| (a.key, false)).collect();
        Self {
            scalars,
            amenities,
            image: None,
        }
    }
}

impl FormState {
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.scalars.get(key).map(String::as_str)
    }

    pub fn set_scalar(&mut self, key: &str, value: impl Into<String>) -> Result<(), FormError> {
        match self.scalars.get_mut(key) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(FormError::UnknownField(key.to_string())),
        }
    }

    pub fn amenity(&self, key: &str) -> Option<bool> {
        self.amenities.get(key).copied()
    }

    pub fn set_amenity(&mut self, key: &str, checked: bool) -> Result<(), FormError> {
        match self.amenities.get_mut(key) {
            Some(slot) => {
                *slot = checked;
                Ok(())
            }
            None => Err(FormError::UnknownField(key.to_string())),
        }
    }

    pub fn image(&self) -> Option<&SelectedImage> {
        self.image.as_ref()
    }

    /// Store a new selection, handing back the one it replaces.
    pub(crate) fn replace_image(&mut self, image: SelectedImage) -> Option<SelectedImage> {
        self.image.replace(image)
    }

    pub(crate) fn take_image(&mut self) -> Option<SelectedImage> {
        self.image.take()
    }

    pub fn is_default(&self) -> bool {
        *self == FormState::default()
    }
}
