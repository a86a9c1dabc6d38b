use reqwest::multipart::{Form, Part};
use serde::Serialize;

use super::image::ImageFile;
use super::state::FormState;
use crate::errors::FormError;
use crate::schema::{self, AMENITIES, FieldKind, IMAGE_KEY};

/// A serialized field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl PayloadValue {
    /// Text form used on the wire. Whole numbers carry no fractional part (`120`, not `120.0`).
    pub fn to_wire(&self) -> String {
        match self {
            PayloadValue::Text(s) => s.clone(),
            PayloadValue::Number(n) => n.to_string(),
            PayloadValue::Flag(b) => b.to_string(),
        }
    }
}

/// Submission-ready snapshot of a form. Built once, never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPayload {
    fields: Vec<(&'static str, PayloadValue)>,
    image: Option<ImageFile>,
}

impl SubmissionPayload {
    /// Serialize every scalar and amenity in schema order. The image is attached only when
    /// one was selected.
    pub fn build(state: &FormState) -> Result<Self, FormError> {
        let mut fields = Vec::new();

        for spec in schema::scalar_fields() {
            let raw = state.scalar(spec.key).unwrap_or(spec.default);
            let value = match spec.kind {
                FieldKind::Number => schema::parse_number(raw)
                    .map(PayloadValue::Number)
                    .ok_or_else(|| FormError::InvalidNumber {
                        key: spec.key.to_string(),
                        raw: raw.to_string(),
                    })?,
                _ => PayloadValue::Text(raw.to_string()),
            };
            fields.push((spec.key, value));
        }

        for amenity in AMENITIES.iter() {
            let checked = state.amenity(amenity.key).unwrap_or(false);
            fields.push((amenity.key, PayloadValue::Flag(checked)));
        }

        let image = state.image().map(|selected| selected.file.clone());
        Ok(Self { fields, image })
    }

    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn fields(&self) -> &[(&'static str, PayloadValue)] {
        &self.fields
    }

    pub fn image(&self) -> Option<&ImageFile> {
        self.image.as_ref()
    }

    /// Whether `key` is present at all, the image included.
    pub fn contains(&self, key: &str) -> bool {
        if key == IMAGE_KEY {
            return self.image.is_some();
        }
        self.get(key).is_some()
    }

    /// Scalar and flag fields as JSON, for logging. The image is summarized, not embedded.
    pub fn summary(&self) -> serde_json::Value {
        let mut map: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::json!(v)))
            .collect();
        if let Some(image) = &self.image {
            map.insert(
                IMAGE_KEY.to_string(),
                serde_json::json!({
                    "name": image.name,
                    "content_type": image.content_type,
                    "size": image.bytes.len(),
                }),
            );
        }
        serde_json::Value::Object(map)
    }

    /// Encode as `multipart/form-data`: one text part per field, plus the file part.
    pub fn into_multipart(self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for (key, value) in &self.fields {
            form = form.text(*key, value.to_wire());
        }
        if let Some(image) = self.image {
            let part = Part::bytes(image.bytes)
                .file_name(image.name)
                .mime_str(&image.content_type)?;
            form = form.part(IMAGE_KEY, part);
        }
        Ok(form)
    }
}
