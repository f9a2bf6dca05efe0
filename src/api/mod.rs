//! HTTP surface.
//!
//! # API Endpoints
//!
//! | Method          | Path                                   | Description                       |
//! |-----------------|----------------------------------------|-----------------------------------|
//! | GET             | `/`                                    | Welcome message                   |
//! | GET             | `/locations/`                          | Paginated locations (`type`)      |
//! | GET             | `/locations/:id/children/`             | Direct children of a location     |
//! | GET             | `/accommodations/`                     | Paginated accommodations          |
//! | GET             | `/users/:user_id/accommodations/`      | Accommodations owned by a user    |
//! | POST            | `/signup/`                             | Property owner sign-up            |
//! | GET             | `/admin/locations/`                    | Locations plus pending messages   |
//! | POST            | `/admin/locations/import-csv/`         | CSV upload (`csv_file`)           |
//! | GET, PUT, DELETE| `/admin/locations/:id`                 | Single location and its parent    |
//! | GET             | `/admin/accommodations/`               | Scoped accommodation list         |
//! | GET, PUT, DELETE| `/admin/accommodations/:id`            | Single accommodation              |
//! | GET, POST       | `/admin/localizations/`                | Scoped list, create or replace    |
//! | GET, DELETE     | `/admin/localizations/:id`             | Single localization               |
//!
//! Admin routes take HTTP Basic credentials.

mod admin;
mod auth;
mod extract;
mod public;

pub use auth::AdminPrincipal;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::db::Database;
use crate::i18n::LocalizationValidator;

pub struct AppState {
    pub db: Database,
    pub validator: LocalizationValidator,
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(public::index))
        .route("/locations/", get(public::location_list))
        .route("/locations/:id/children/", get(public::location_children))
        .route("/accommodations/", get(public::accommodation_list))
        .route(
            "/users/:user_id/accommodations/",
            get(public::accommodations_by_user),
        )
        .route("/signup/", post(public::signup))
        .route("/admin/locations/", get(admin::location_overview))
        .route("/admin/locations/import-csv/", post(admin::import_csv))
        .route(
            "/admin/locations/:id",
            get(admin::location_detail)
                .put(admin::location_save)
                .delete(admin::location_delete),
        )
        .route("/admin/accommodations/", get(admin::accommodation_list))
        .route(
            "/admin/accommodations/:id",
            get(admin::accommodation_detail)
                .put(admin::accommodation_save)
                .delete(admin::accommodation_delete),
        )
        .route(
            "/admin/localizations/",
            get(admin::localization_list).post(admin::localization_save),
        )
        .route(
            "/admin/localizations/:id",
            get(admin::localization_detail).delete(admin::localization_delete),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `0.0.0.0:port` and serve until the process is stopped.
pub async fn start_server(state: SharedState, port: u16) -> Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind {}", addr))?;

    info!("Property directory listening on http://{}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
