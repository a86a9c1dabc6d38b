//! Declarative description of the create-hotel form.
//!
//! The same tables drive validation, rendering and payload assembly, so the rendered
//! inputs and the rules applied on submit can't drift apart.

pub mod amenity;
pub mod field;
pub mod rules;

pub use amenity::{Amenity, AMENITIES, amenity_rows, find_amenity, list_amenities, list_amenity_keys};
pub use field::{FieldKind, FieldSpec};
pub use rules::{Rule, ValidationResult, parse_number};

use crate::errors::FormError;
use crate::form::FormState;

/// Key under which the selected file travels in the payload.
pub const IMAGE_KEY: &str = "image";

pub static FIELDS: [FieldSpec; 6] = [
    FieldSpec {
        key: "name",
        label: "Hotel Name",
        placeholder: "Hotel Name",
        kind: FieldKind::Text,
        required: true,
        rules: &[Rule::MinLength(1)],
        default: "",
    },
    FieldSpec {
        key: "location",
        label: "Location",
        placeholder: "Location",
        kind: FieldKind::Text,
        required: true,
        rules: &[Rule::MinLength(1)],
        default: "",
    },
    FieldSpec {
        key: IMAGE_KEY,
        label: "Image",
        placeholder: "Image",
        kind: FieldKind::BinaryFile,
        required: false,
        rules: &[],
        default: "",
    },
    FieldSpec {
        key: "price",
        label: "Price",
        placeholder: "Price",
        kind: FieldKind::Number,
        required: true,
        rules: &[Rule::NumberAbove(0.0)],
        default: "0",
    },
    FieldSpec {
        key: "description",
        label: "Description",
        placeholder: "Description",
        kind: FieldKind::LongText,
        required: true,
        rules: &[Rule::MinLength(1)],
        default: "",
    },
    FieldSpec {
        key: "province",
        label: "Province",
        placeholder: "Province",
        kind: FieldKind::Text,
        required: false,
        rules: &[],
        default: "",
    },
];

pub fn fields() -> &'static [FieldSpec] {
    &FIELDS
}

/// Fields with a textual value (everything except the file field).
pub fn scalar_fields() -> impl Iterator<Item = &'static FieldSpec> {
    FIELDS.iter().filter(|f| f.is_scalar())
}

pub fn find_field(key: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.key == key)
}

/// Validate one scalar value against the rules declared for `key`.
pub fn validate(key: &str, raw: &str) -> Result<ValidationResult, FormError> {
    let spec = find_field(key).ok_or_else(|| FormError::UnknownField(key.to_string()))?;
    if !spec.is_scalar() {
        return Err(FormError::KindMismatch {
            key: key.to_string(),
            expected: "file",
        });
    }
    Ok(spec.validate(raw))
}

/// Per-field results of the aggregate pass, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FormValidation {
    pub results: Vec<(&'static str, ValidationResult)>,
}

impl FormValidation {
    pub fn is_valid(&self) -> bool {
        self.results.iter().all(|(_, r)| r.is_valid())
    }

    pub fn errors(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.results
            .iter()
            .filter_map(|(key, r)| r.reason().map(|reason| (*key, reason)))
    }
}

/// Validate the whole form. Amenity flags carry no constraints and are not listed.
pub fn validate_all(state: &FormState) -> FormValidation {
    let results = FIELDS
        .iter()
        .map(|spec| {
            let result = if spec.is_scalar() {
                spec.validate(state.scalar(spec.key).unwrap_or(spec.default))
            } else if spec.required && state.image().is_none() {
                ValidationResult::Invalid(format!("{} is required", spec.label))
            } else {
                ValidationResult::Valid
            };
            (spec.key, result)
        })
        .collect();
    FormValidation { results }
}
