/// Outcome of checking one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// The reason, if the field failed.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(reason) => Some(reason),
        }
    }
}

/// A constraint attached to a field, checked after the required check passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// Trimmed value must be at least this many characters.
    MinLength(usize),
    /// Value must parse to a finite number strictly greater than the bound.
    NumberAbove(f64),
}

impl Rule {
    /// Check a raw value. `label` is used to phrase the failure message.
    pub fn check(&self, label: &str, raw: &str) -> ValidationResult {
        match *self {
            Rule::MinLength(min) => {
                if raw.trim().chars().count() < min {
                    ValidationResult::Invalid(format!(
                        "{label} must be at least {min} characters"
                    ))
                } else {
                    ValidationResult::Valid
                }
            }
            Rule::NumberAbove(bound) => match parse_number(raw) {
                None => ValidationResult::Invalid(format!("{label} must be a number")),
                Some(n) if n <= bound => {
                    if bound == 0.0 {
                        ValidationResult::Invalid(format!("{label} must be greater than zero"))
                    } else {
                        ValidationResult::Invalid(format!("{label} must be greater than {bound}"))
                    }
                }
                Some(_) => ValidationResult::Valid,
            },
        }
    }
}

/// Parse a numeric input. Empty, non-numeric, NaN and infinite inputs yield `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}
