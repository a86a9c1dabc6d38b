use super::rules::{Rule, ValidationResult};

/// How a field is entered and serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    LongText,
    BinaryFile,
}

impl FieldKind {
    /// The `type` attribute of the rendered `<input>`; long text renders a textarea instead.
    pub fn input_type(&self) -> &'static str {
        match self {
            FieldKind::Text | FieldKind::LongText => "text",
            FieldKind::Number => "number",
            FieldKind::BinaryFile => "file",
        }
    }
}

/// Declarative description of one scalar field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub rules: &'static [Rule],
    /// Value a fresh form starts with.
    pub default: &'static str,
}

impl FieldSpec {
    /// Apply the required check, then every rule in order. Optional fields that are left
    /// empty skip their rules.
    pub fn validate(&self, raw: &str) -> ValidationResult {
        if raw.trim().is_empty() {
            return if self.required {
                ValidationResult::Invalid(format!("{} is required", self.label))
            } else {
                ValidationResult::Valid
            };
        }
        for rule in self.rules {
            let result = rule.check(self.label, raw);
            if !result.is_valid() {
                return result;
            }
        }
        ValidationResult::Valid
    }

    pub fn is_scalar(&self) -> bool {
        self.kind != FieldKind::BinaryFile
    }
}
