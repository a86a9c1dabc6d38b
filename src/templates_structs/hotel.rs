use askama::Template;

use crate::boundary::Toast;
use crate::boundary::notify::PENDING_MESSAGE;
use crate::form::SubmissionController;
use crate::schema::{self, FieldKind, amenity_rows};

/// One schema field as the template draws it.
pub struct FieldView {
    pub key: String,
    pub label: String,
    pub placeholder: String,
    /// "text", "number", "textarea" or "file".
    pub control: String,
    pub value: String,
    pub required: bool,
    pub error: Option<String>,
    pub preview_url: Option<String>,
    pub file_name: Option<String>,
}

pub struct AmenityView {
    pub key: String,
    pub label: String,
    pub checked: bool,
}

pub struct ToastView {
    pub class: String,
    pub message: String,
}

impl From<Toast> for ToastView {
    fn from(toast: Toast) -> Self {
        Self {
            class: toast.kind.css_class().to_string(),
            message: toast.message,
        }
    }
}

#[derive(Template)]
#[template(path = "hotels/new.html")]
pub struct HotelFormTemplate {
    pub app_name: String,
    pub csrf_token: String,
    pub form_action: String,
    pub fields: Vec<FieldView>,
    pub amenity_rows: Vec<Vec<AmenityView>>,
    pub toasts: Vec<ToastView>,
    /// Shown by the page script as soon as the browser posts the form.
    pub pending_message: String,
    pub submitting: bool,
}

impl HotelFormTemplate {
    /// Project a form instance onto the page, walking the schema so every declared field
    /// and amenity gets a control.
    pub fn from_form(
        controller: &SubmissionController,
        toasts: Vec<Toast>,
        csrf_token: String,
    ) -> Self {
        let state = controller.state();

        let fields = schema::fields()
            .iter()
            .map(|spec| {
                let control = match spec.kind {
                    FieldKind::LongText => "textarea",
                    other => other.input_type(),
                };
                let image = (spec.kind == FieldKind::BinaryFile)
                    .then(|| state.image())
                    .flatten();
                FieldView {
                    key: spec.key.to_string(),
                    label: spec.label.to_string(),
                    placeholder: spec.placeholder.to_string(),
                    control: control.to_string(),
                    value: state.scalar(spec.key).unwrap_or_default().to_string(),
                    required: spec.required,
                    error: controller.field_error(spec.key).map(String::from),
                    preview_url: image.map(|i| i.preview.url()),
                    file_name: image.map(|i| i.file.name.clone()),
                }
            })
            .collect();

        let amenity_rows = amenity_rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|a| AmenityView {
                        key: a.key.to_string(),
                        label: a.label.to_string(),
                        checked: state.amenity(a.key).unwrap_or(false),
                    })
                    .collect()
            })
            .collect();

        Self {
            app_name: "Amali".to_string(),
            csrf_token,
            form_action: "/hotels/new".to_string(),
            fields,
            amenity_rows,
            toasts: toasts.into_iter().map(ToastView::from).collect(),
            pending_message: PENDING_MESSAGE.to_string(),
            submitting: controller.is_submitting(),
        }
    }
}
