//! Create-hotel form pages.
//!
//! The browser edits a server-held form instance: field edits and file picks are applied
//! as they happen, and the final POST submits whatever the instance holds.

use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, http::header, web};
use serde::{Deserialize, Serialize};

use crate::auth::csrf::{self, CSRF_HEADER};
use crate::auth::session::{forget_form_id, get_form_id, get_or_create_form_id};
use crate::errors::{AppError, FormError, render};
use crate::form::{FieldInput, ImageFile, SubmissionController, SubmitOutcome, SubmitTicket};
use crate::schema::{self, AMENITIES, find_amenity};
use crate::state::AppState;
use crate::templates_structs::HotelFormTemplate;

const FORM_PATH: &str = "/hotels/new";

/// Urlencoded body as ordered pairs; repeated keys and unchecked boxes survive as-is.
type Pairs = Vec<(String, String)>;

#[derive(Debug, Serialize)]
pub struct FieldFeedback {
    pub key: String,
    pub valid: bool,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub name: Option<String>,
}

fn redirect_to_form() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", FORM_PATH))
        .finish()
}

fn csrf_value(pairs: &[(String, String)]) -> &str {
    pairs
        .iter()
        .find(|(k, _)| k == "csrf_token")
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
}

fn is_checked(value: &str) -> bool {
    matches!(value.trim(), "true" | "on" | "1")
}

/// Map one submitted pair onto the control it edits.
fn input_for(key: &str, value: &str) -> Result<FieldInput, FormError> {
    if find_amenity(key).is_some() {
        return Ok(FieldInput::Flag(is_checked(value)));
    }
    match schema::find_field(key) {
        Some(spec) if spec.is_scalar() => Ok(FieldInput::Text(value.to_string())),
        Some(_) => Err(FormError::KindMismatch {
            key: key.to_string(),
            expected: "file",
        }),
        None => Err(FormError::UnknownField(key.to_string())),
    }
}

/// Feed submitted pairs through `on_field_change`. With `full_form`, amenities missing from
/// the body count as unchecked, the way browsers omit unticked boxes.
///
/// Every pair is checked before any is applied, so a rejected body leaves the form as it was.
fn apply_edits(
    controller: &mut SubmissionController,
    pairs: &[(String, String)],
    full_form: bool,
) -> Result<Vec<FieldFeedback>, FormError> {
    let edits = pairs
        .iter()
        .filter(|(key, _)| key != "csrf_token")
        .map(|(key, value)| input_for(key, value).map(|input| (key.as_str(), input)))
        .collect::<Result<Vec<_>, FormError>>()?;

    let mut feedback = Vec::with_capacity(edits.len());
    for (key, input) in edits {
        let result = controller.on_field_change(key, input)?;
        feedback.push(FieldFeedback {
            key: key.to_string(),
            valid: result.is_valid(),
            error: result.reason().map(String::from),
        });
    }

    if full_form {
        for amenity in AMENITIES.iter() {
            if !pairs.iter().any(|(k, _)| k == amenity.key) {
                controller.on_field_change(amenity.key, FieldInput::Flag(false))?;
            }
        }
    }

    Ok(feedback)
}

/// GET /hotels/new
pub async fn new_form(
    state: web::Data<AppState>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let form_id = get_or_create_form_id(&session)?;
    let csrf_token = csrf::get_or_create_token(&session)?;

    let tmpl = state.with_form(&form_id, |instance| {
        HotelFormTemplate::from_form(&instance.controller, instance.toasts.drain(), csrf_token)
    })?;
    render(tmpl)
}

/// POST /hotels/new/fields — apply edits without submitting; answers per-field feedback.
pub async fn update_fields(
    state: web::Data<AppState>,
    session: Session,
    form: web::Form<Pairs>,
) -> Result<HttpResponse, AppError> {
    let pairs = form.into_inner();
    csrf::validate_csrf(&session, csrf_value(&pairs))?;
    let form_id = get_or_create_form_id(&session)?;

    let feedback = state.with_form(&form_id, |instance| {
        apply_edits(&mut instance.controller, &pairs, false)
    })??;
    Ok(HttpResponse::Ok().json(feedback))
}

/// POST /hotels/new/image — body is the raw file. An empty body means nothing was picked.
pub async fn select_image(
    state: web::Data<AppState>,
    session: Session,
    req: HttpRequest,
    query: web::Query<ImageQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let token = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    csrf::validate_csrf(&session, token)?;
    let form_id = get_or_create_form_id(&session)?;

    let file = if body.is_empty() {
        None
    } else {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(AppError::BadRequest(format!(
                "Only image files can be selected, got '{content_type}'"
            )));
        }
        let name = query
            .into_inner()
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| schema::IMAGE_KEY.to_string());
        Some(ImageFile::new(name, content_type, body.to_vec()))
    };

    state.with_form(&form_id, |instance| instance.controller.on_image_selected(file))?;
    Ok(redirect_to_form())
}

/// POST /hotels/new — apply the submitted fields and run one submission attempt.
///
/// While a submission is outstanding the POST changes nothing. The registry lock is never
/// held across the backend call, and the call runs on its own task so that a client going
/// away mid-request cannot strand the form in the submitting phase.
pub async fn submit(
    state: web::Data<AppState>,
    session: Session,
    form: web::Form<Pairs>,
) -> Result<HttpResponse, AppError> {
    let pairs = form.into_inner();
    csrf::validate_csrf(&session, csrf_value(&pairs))?;
    let form_id = get_or_create_form_id(&session)?;

    let begun = state.with_form(&form_id, |instance| -> Result<_, FormError> {
        if instance.controller.is_submitting() {
            return Ok(Err(SubmitOutcome::Busy));
        }
        apply_edits(&mut instance.controller, &pairs, true)?;
        let mutation = instance.controller.mutation();
        Ok(instance.controller.begin_submit().map(|ticket| (ticket, mutation)))
    })??;

    let (ticket, mutation) = match begun {
        Ok(started) => started,
        Err(SubmitOutcome::Busy) => {
            log::info!("Form {form_id}: submit ignored while a submission is outstanding");
            return Ok(redirect_to_form());
        }
        Err(_) => return Ok(redirect_to_form()),
    };

    let SubmitTicket { generation, payload } = ticket;
    let task = actix_web::rt::spawn({
        let state = state.clone();
        let form_id = form_id.clone();
        async move {
            let result = mutation.create_hotel(payload).await;
            let outcome = state.with_existing_form(&form_id, |instance| {
                instance.controller.finish_submit(generation, result)
            })?;
            if outcome.is_none() {
                log::warn!("Form {form_id} was discarded before its submission finished");
            }
            Ok::<_, AppError>(())
        }
    });
    task.await
        .map_err(|e| AppError::State(format!("Submission task failed: {e}")))??;

    Ok(redirect_to_form())
}

/// POST /hotels/new/discard — close the session's form.
pub async fn discard(
    state: web::Data<AppState>,
    session: Session,
    form: web::Form<Pairs>,
) -> Result<HttpResponse, AppError> {
    let pairs = form.into_inner();
    csrf::validate_csrf(&session, csrf_value(&pairs))?;

    if let Some(form_id) = get_form_id(&session) {
        if state.discard(&form_id)? {
            log::debug!("Discarded form {form_id}");
        }
        forget_form_id(&session);
    }
    Ok(redirect_to_form())
}
