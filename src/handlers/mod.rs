pub mod hotel_handlers;
pub mod preview_handlers;

use actix_web::web;

use crate::form::PREVIEW_PATH;

/// Register the form routes. `/hotels/new/*` before `/hotels/new` keeps the sub-routes
/// reachable.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(|| async {
        actix_web::HttpResponse::SeeOther()
            .insert_header(("Location", "/hotels/new"))
            .finish()
    }))
    .route("/hotels/new/fields", web::post().to(hotel_handlers::update_fields))
    .route("/hotels/new/image", web::post().to(hotel_handlers::select_image))
    .route("/hotels/new/discard", web::post().to(hotel_handlers::discard))
    .route("/hotels/new", web::get().to(hotel_handlers::new_form))
    .route("/hotels/new", web::post().to(hotel_handlers::submit))
    .route(
        &format!("{PREVIEW_PATH}/{{token}}"),
        web::get().to(preview_handlers::show),
    );
}
