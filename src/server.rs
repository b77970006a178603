use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, HttpServer, web};
use chrono::Utc;
use log::info;

use crate::backfill::{DEFAULT_DAYS_BACK, backfill};
use crate::config::FeedUrls;
use crate::diff::diff;
use crate::feed::FeedFetcher;
use crate::ingest::ingest;
use crate::response::{InvocationResponse, into_response};
use crate::store::RateStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RateStore>,
    pub fetcher: Arc<dyn FeedFetcher>,
    pub feeds: FeedUrls,
}

fn to_http(response: InvocationResponse) -> HttpResponse {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status)
        .content_type("application/json")
        .body(response.body)
}

async fn ingest_rates(state: web::Data<AppState>) -> HttpResponse {
    let invocation = ingest(state.store.as_ref(), state.fetcher.as_ref(), &state.feeds).await;
    to_http(into_response(invocation))
}

async fn rate_diff(state: web::Data<AppState>) -> HttpResponse {
    let today = Utc::now().date_naive();
    to_http(into_response(diff(state.store.as_ref(), today).await))
}

async fn backfill_today(state: web::Data<AppState>) -> HttpResponse {
    let today = Utc::now().date_naive();
    to_http(into_response(
        backfill(state.store.as_ref(), today, DEFAULT_DAYS_BACK).await,
    ))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ingest", web::post().to(ingest_rates))
        .route("/diff", web::get().to(rate_diff))
        .route("/backfill", web::post().to(backfill_today));
}

pub async fn serve(state: AppState, bind_addr: &str) -> std::io::Result<()> {
    let data = web::Data::new(state);
    info!("Listening on {}", bind_addr);

    HttpServer::new(move || App::new().app_data(data.clone()).configure(routes))
        .bind(bind_addr)?
        .run()
        .await
}
