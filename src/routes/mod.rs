//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds every HTTP endpoint under one Axum router: JSON API under `/api`,
//! stored uploads served statically at `/uploads`, and a health probe.

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod disputes;
pub mod groups;
pub mod marketing;
pub mod reviews;
pub mod uploads;
pub mod venues;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let uploads_service = ServeDir::new(&state.uploads_dir);

    Router::new()
        // Auth
        .route("/api/auth/email/request-code", post(auth::request_email_code))
        .route("/api/auth/email/verify-code", post(auth::verify_email_code))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        // Vendors + venues
        .route("/api/vendors", post(venues::register_vendor))
        .route("/api/vendors/me/venues", get(venues::list_my_venues))
        .route("/api/venues", get(venues::list_venues).post(venues::create_venue))
        .route(
            "/api/venues/{id}",
            get(venues::get_venue)
                .patch(venues::update_venue)
                .delete(venues::delete_venue),
        )
        .route("/api/venues/{id}/availability", get(venues::availability))
        .route("/api/venues/{id}/photos", post(venues::add_photo))
        .route(
            "/api/venues/{id}/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        // Bookings
        .route("/api/bookings/quote", post(bookings::quote))
        .route("/api/bookings", get(bookings::list_bookings).post(bookings::create_booking))
        .route("/api/bookings/guest", post(bookings::create_guest_booking))
        .route("/api/bookings/{id}", get(bookings::get_booking))
        .route("/api/bookings/{id}/cancel", post(bookings::cancel_booking))
        .route("/api/bookings/{id}/disputes", post(disputes::open_dispute))
        // Group bookings
        .route("/api/groups", post(groups::create_group))
        .route("/api/groups/{id}", get(groups::get_group))
        .route("/api/groups/{id}/cancel", post(groups::cancel_group))
        .route(
            "/api/groups/{id}/contributions/{contribution_id}/pay",
            post(groups::pay_contribution),
        )
        // Disputes
        .route("/api/disputes", get(disputes::list_disputes))
        .route("/api/disputes/{id}/respond", post(disputes::respond))
        .route("/api/disputes/{id}/resolve", post(disputes::resolve))
        // Admin
        .route("/api/admin/reports/revenue", get(admin::revenue_report))
        .route("/api/admin/reports/top-venues", get(admin::top_venues_report))
        .route("/api/admin/payouts/generate", post(admin::generate_payouts))
        .route("/api/admin/payouts", get(admin::list_payouts))
        .route("/api/admin/payouts/{id}/mark-paid", post(admin::mark_payout_paid))
        .route(
            "/api/admin/discount-codes",
            get(admin::list_discount_codes).post(admin::create_discount_code),
        )
        // Marketing
        .route("/api/marketing/venue-description", post(marketing::venue_description))
        .route("/api/marketing/campaign", post(marketing::campaign))
        .route("/api/marketing/venues/{id}/image", post(marketing::venue_image))
        // Uploads
        .route("/api/uploads", post(uploads::upload_file))
        .nest_service("/uploads", uploads_service)
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
