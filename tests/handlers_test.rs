//! HTTP tests for the hosted form — rendering from the schema, edits, image previews and
//! submission through the routes.

mod common;

use std::sync::Arc;
use std::time::Duration;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use regex::Regex;

use amali::boundary::{CreateHotel, MutationError};
use amali::handlers;
use amali::state::AppState;
use common::*;

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                        .cookie_secure(false)
                        .build(),
                )
                .app_data($state.clone())
                .configure(handlers::configure),
        )
        .await
    };
}

fn app_state(backend: &Arc<ScriptedBackend>) -> web::Data<AppState> {
    web::Data::new(AppState::new(Arc::clone(backend) as Arc<dyn CreateHotel>))
}

fn session_cookie<B>(resp: &actix_web::dev::ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response().cookies().next().map(|c| c.into_owned())
}

fn csrf_from(html: &str) -> String {
    let re = Regex::new(r#"name="csrf_token" value="([0-9a-f]{64})""#).expect("regex");
    re.captures(html).expect("csrf token in page")[1].to_string()
}

fn lakeview_form(csrf: &str) -> Vec<(&str, &str)> {
    vec![
        ("csrf_token", csrf),
        ("name", HOTEL_NAME),
        ("location", HOTEL_LOCATION),
        ("price", HOTEL_PRICE),
        ("description", HOTEL_DESCRIPTION),
        ("province", ""),
    ]
}

/// GET the form, returning the session cookie, CSRF token and page body.
macro_rules! open_form {
    ($app:expr) => {{
        let req = test::TestRequest::get().uri("/hotels/new").to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = session_cookie(&resp).expect("session cookie");
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).expect("utf8");
        let csrf = csrf_from(&body);
        (cookie, csrf, body)
    }};
}

macro_rules! get_page {
    ($app:expr, $cookie:expr) => {{
        let req = test::TestRequest::get()
            .uri("/hotels/new")
            .cookie($cookie.clone())
            .to_request();
        let resp = test::call_service(&$app, req).await;
        String::from_utf8(test::read_body(resp).await.to_vec()).expect("utf8")
    }};
}

#[actix_web::test]
async fn test_root_redirects_to_form() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let state = app_state(&backend);
    let app = test_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("/hotels/new")
    );
}

#[actix_web::test]
async fn test_form_renders_every_schema_control() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let state = app_state(&backend);
    let app = test_app!(state);

    let (_cookie, _csrf, body) = open_form!(app);

    for key in ["name", "location", "price", "province"] {
        assert!(body.contains(&format!(r#"name="{key}""#)), "missing input {key}");
    }
    assert!(body.contains(r#"<textarea id="description" name="description""#));
    assert!(body.contains(r#"type="file" id="image""#));
    assert!(body.contains(r#"type="number" id="price""#));

    let rows = Regex::new(r#"class="amenity-row""#).expect("regex");
    assert_eq!(rows.find_iter(&body).count(), 5);
    let boxes = Regex::new(r#"type="checkbox" name="(\w+)""#).expect("regex");
    let keys: Vec<&str> = boxes
        .captures_iter(&body)
        .map(|c| c.get(1).expect("key").as_str())
        .collect();
    assert_eq!(keys, amali::schema::list_amenity_keys());
    let checked = Regex::new(r#"type="checkbox"[^>]* checked"#).expect("regex");
    assert!(!checked.is_match(&body));
    assert_eq!(state.open_forms(), 1);
}

#[actix_web::test]
async fn test_page_announces_pending_submission_on_post() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let state = app_state(&backend);
    let app = test_app!(state);

    let (_cookie, _csrf, body) = open_form!(app);
    assert!(body.contains(r#"data-pending="Creating hotel...""#));
    assert!(body.contains("form.addEventListener('submit'"));
    assert!(body.contains(r#"<button type="submit" id="submit">"#));
}

#[actix_web::test]
async fn test_cookieless_visits_are_capped() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let state = web::Data::new(
        AppState::new(Arc::clone(&backend) as Arc<dyn CreateHotel>)
            .with_limits(Duration::from_secs(3600), 5),
    );
    let app = test_app!(state);

    for _ in 0..20 {
        let req = test::TestRequest::get().uri("/hotels/new").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
    assert_eq!(state.open_forms(), 5);
}

#[actix_web::test]
async fn test_post_without_csrf_is_forbidden() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let state = app_state(&backend);
    let app = test_app!(state);

    let (cookie, _csrf, _) = open_form!(app);
    let req = test::TestRequest::post()
        .uri("/hotels/new")
        .cookie(cookie)
        .set_form(lakeview_form("bogus"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(backend.calls(), 0);
}

#[actix_web::test]
async fn test_field_edit_returns_inline_feedback() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let state = app_state(&backend);
    let app = test_app!(state);

    let (cookie, csrf, _) = open_form!(app);
    let req = test::TestRequest::post()
        .uri("/hotels/new/fields")
        .cookie(cookie.clone())
        .set_form(vec![("csrf_token", csrf.as_str()), ("price", "-5")])
        .to_request();
    let feedback: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(feedback[0]["key"], "price");
    assert_eq!(feedback[0]["valid"], false);
    assert_eq!(feedback[0]["error"], "Price must be greater than zero");

    let page = get_page!(app, cookie);
    assert!(page.contains("Price must be greater than zero"));
    assert!(page.contains(r#"value="-5""#));
}

#[actix_web::test]
async fn test_field_edit_with_unknown_key_changes_nothing() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let state = app_state(&backend);
    let app = test_app!(state);

    let (cookie, csrf, _) = open_form!(app);
    let req = test::TestRequest::post()
        .uri("/hotels/new/fields")
        .cookie(cookie.clone())
        .set_form(vec![
            ("csrf_token", csrf.as_str()),
            ("name", "Renamed Inn"),
            ("pool", "true"),
            ("location", "Galle"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let page = get_page!(app, cookie);
    assert!(!page.contains("Renamed Inn"));
    assert!(!page.contains("Galle"));
}

#[actix_web::test]
async fn test_submit_creates_hotel_and_resets_form() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let state = app_state(&backend);
    let app = test_app!(state);

    let (cookie, csrf, _) = open_form!(app);
    let mut form = lakeview_form(&csrf);
    form.push(("spa", "true"));
    let req = test::TestRequest::post()
        .uri("/hotels/new")
        .cookie(cookie.clone())
        .set_form(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let payloads = backend.payloads();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].get("price").map(|v| v.to_wire()), Some("120".to_string()));
    assert_eq!(payloads[0].get("spa").map(|v| v.to_wire()), Some("true".to_string()));
    assert_eq!(payloads[0].get("gym").map(|v| v.to_wire()), Some("false".to_string()));
    assert!(payloads[0].image().is_none());

    let page = get_page!(app, cookie);
    let pending = page
        .find(r#"<div class="toast toast-loading">Creating hotel...</div>"#)
        .expect("pending toast rendered");
    let success = page
        .find(r#"<div class="toast toast-success">Hotel created successfully</div>"#)
        .expect("success toast rendered");
    assert!(pending < success);
    assert!(!page.contains(HOTEL_NAME));

    // Toasts are shown once
    let again = get_page!(app, cookie);
    assert!(!again.contains("Hotel created successfully"));
}

#[actix_web::test]
async fn test_invalid_submit_shows_errors_without_calling_backend() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let state = app_state(&backend);
    let app = test_app!(state);

    let (cookie, csrf, _) = open_form!(app);
    let form = vec![
        ("csrf_token", csrf.as_str()),
        ("name", HOTEL_NAME),
        ("location", HOTEL_LOCATION),
        ("price", ""),
        ("description", HOTEL_DESCRIPTION),
    ];
    let req = test::TestRequest::post()
        .uri("/hotels/new")
        .cookie(cookie.clone())
        .set_form(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(backend.calls(), 0);

    let page = get_page!(app, cookie);
    assert!(page.contains("Price is required"));
    assert!(!page.contains(r#"class="toast "#));
    assert!(page.contains(HOTEL_NAME));
}

#[actix_web::test]
async fn test_failed_submit_keeps_entered_values() {
    let backend = Arc::new(ScriptedBackend::failing(
        MutationError::Transport("connection refused".to_string()),
    ));
    let state = app_state(&backend);
    let app = test_app!(state);

    let (cookie, csrf, _) = open_form!(app);
    let req = test::TestRequest::post()
        .uri("/hotels/new")
        .cookie(cookie.clone())
        .set_form(lakeview_form(&csrf))
        .to_request();
    test::call_service(&app, req).await;

    let page = get_page!(app, cookie);
    assert!(page.contains("Hotel creation failed"));
    assert!(page.contains(&format!(r#"value="{HOTEL_NAME}""#)));
    assert!(!page.contains(r#"id="submit" disabled"#));
}

#[actix_web::test]
async fn test_image_preview_lifecycle() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let state = app_state(&backend);
    let app = test_app!(state);

    let (cookie, csrf, _) = open_form!(app);
    let upload = |name: &str, bytes: Vec<u8>| {
        test::TestRequest::post()
            .uri(&format!("/hotels/new/image?name={name}"))
            .cookie(cookie.clone())
            .insert_header((header::CONTENT_TYPE, "image/png"))
            .insert_header(("X-CSRF-Token", csrf.clone()))
            .set_payload(bytes)
            .to_request()
    };
    let preview_re = Regex::new(r#"src="(/previews/[0-9a-f]+)""#).expect("regex");

    let resp = test::call_service(&app, upload("first.png", png("first.png").bytes)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let page = get_page!(app, cookie);
    let first_url = preview_re.captures(&page).expect("preview shown")[1].to_string();
    assert!(page.contains("first.png"));

    let resp = test::call_service(&app, test::TestRequest::get().uri(&first_url).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("image/png")
    );

    test::call_service(&app, upload("second.png", vec![1, 2, 3])).await;
    let resp = test::call_service(&app, test::TestRequest::get().uri(&first_url).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(state.previews.live_count(), 1);

    // An empty pick changes nothing
    test::call_service(&app, upload("ignored.png", Vec::new())).await;
    assert_eq!(state.previews.live_count(), 1);
    let page = get_page!(app, cookie);
    assert!(page.contains("second.png"));
}

#[actix_web::test]
async fn test_non_image_upload_is_rejected() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let state = app_state(&backend);
    let app = test_app!(state);

    let (cookie, csrf, _) = open_form!(app);
    let req = test::TestRequest::post()
        .uri("/hotels/new/image?name=page.html")
        .cookie(cookie)
        .insert_header((header::CONTENT_TYPE, "text/html"))
        .insert_header(("X-CSRF-Token", csrf))
        .set_payload("<script></script>")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.previews.live_count(), 0);
}

#[actix_web::test]
async fn test_second_submit_while_pending_is_ignored() {
    let (backend, gate) = ScriptedBackend::gated();
    let backend = Arc::new(backend);
    let state = app_state(&backend);
    let app = test_app!(state);

    let (cookie, csrf, _) = open_form!(app);
    let post = || {
        test::TestRequest::post()
            .uri("/hotels/new")
            .cookie(cookie.clone())
            .set_form(lakeview_form(&csrf))
            .to_request()
    };

    let first = test::call_service(&app, post());
    let second = async {
        // Wait until the first submission is parked at the backend
        while backend.calls() == 0 {
            tokio::task::yield_now().await;
        }
        let resp = test::call_service(&app, post()).await;
        gate.notify_one();
        resp
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    assert_eq!(second.status(), StatusCode::SEE_OTHER);
    assert_eq!(backend.calls(), 1);

    let page = get_page!(app, cookie);
    assert!(page.contains("Hotel created successfully"));
}

#[actix_web::test]
async fn test_submit_while_pending_leaves_form_untouched() {
    let (backend, gate) = ScriptedBackend::gated();
    backend.push_result(Err(MutationError::Transport("connection reset".to_string())));
    let backend = Arc::new(backend);
    let state = app_state(&backend);
    let app = test_app!(state);

    let (cookie, csrf, _) = open_form!(app);
    let first = test::TestRequest::post()
        .uri("/hotels/new")
        .cookie(cookie.clone())
        .set_form(lakeview_form(&csrf))
        .to_request();
    let mut retry_form = lakeview_form(&csrf);
    retry_form[1] = ("name", "Second Attempt");
    retry_form.push(("spa", "true"));
    let retry = test::TestRequest::post()
        .uri("/hotels/new")
        .cookie(cookie.clone())
        .set_form(retry_form)
        .to_request();

    let first = test::call_service(&app, first);
    let second = async {
        while backend.calls() == 0 {
            tokio::task::yield_now().await;
        }
        let resp = test::call_service(&app, retry).await;
        gate.notify_one();
        resp
    };
    let (first, second) = tokio::join!(first, second);
    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    assert_eq!(second.status(), StatusCode::SEE_OTHER);
    assert_eq!(backend.calls(), 1);

    let page = get_page!(app, cookie);
    assert!(page.contains("Hotel creation failed"));
    assert!(page.contains(&format!(r#"value="{HOTEL_NAME}""#)));
    assert!(!page.contains("Second Attempt"));
    let checked = Regex::new(r#"type="checkbox"[^>]* checked"#).expect("regex");
    assert!(!checked.is_match(&page));
}

#[actix_web::test]
async fn test_abandoned_submit_request_still_settles_the_form() {
    let (backend, gate) = ScriptedBackend::gated();
    let backend = Arc::new(backend);
    let state = app_state(&backend);
    let app = test_app!(state);

    let (cookie, csrf, _) = open_form!(app);
    let post = || {
        test::TestRequest::post()
            .uri("/hotels/new")
            .cookie(cookie.clone())
            .set_form(lakeview_form(&csrf))
            .to_request()
    };

    // The client goes away while the backend is still working
    tokio::select! {
        _ = test::call_service(&app, post()) => panic!("answered before the backend was released"),
        _ = async {
            while backend.calls() == 0 {
                tokio::task::yield_now().await;
            }
        } => {}
    }

    gate.notify_one();
    while backend.answered() == 0 {
        tokio::task::yield_now().await;
    }

    let page = get_page!(app, cookie);
    assert!(page.contains("Hotel created successfully"));
    assert!(!page.contains(r#"id="submit" disabled"#));

    // The form accepts a new submission
    gate.notify_one();
    let resp = test::call_service(&app, post()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(backend.calls(), 2);
}

#[actix_web::test]
async fn test_discard_drops_form_and_preview() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let state = app_state(&backend);
    let app = test_app!(state);

    let (cookie, csrf, _) = open_form!(app);
    let req = test::TestRequest::post()
        .uri("/hotels/new/image?name=lobby.png")
        .cookie(cookie.clone())
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .insert_header(("X-CSRF-Token", csrf.clone()))
        .set_payload(png("lobby.png").bytes)
        .to_request();
    test::call_service(&app, req).await;
    assert_eq!(state.previews.live_count(), 1);

    let req = test::TestRequest::post()
        .uri("/hotels/new/discard")
        .cookie(cookie)
        .set_form(vec![("csrf_token", csrf.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.open_forms(), 0);
    assert_eq!(state.previews.live_count(), 0);
}
