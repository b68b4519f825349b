// Web layer - HTML pages, JSON summary, and CSV export over axum
//
// Each handler takes one storage session from the shared `LedgerStore`,
// does its synchronous query or mutation, and drops the session before
// the response is sent. Mutations answer with a 303 redirect that carries
// the flash message in `?notice=`.

use crate::db::{self, LedgerStore};
use crate::entities::{CategoryForm, TransactionForm};
use crate::errors::LedgerError;
use crate::export::{self, EXPORT_FILENAME};
use crate::summary::{self, DashboardSummary, MonthlyTrend};
use crate::views;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LedgerStore>,
}

impl AppState {
    pub fn new(store: LedgerStore) -> Self {
        AppState {
            store: Arc::new(store),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn redirect_with_notice(path: &str, notice: &str) -> Redirect {
    Redirect::to(&format!("{}?notice={}", path, urlencoding::encode(notice)))
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
#[error(transparent)]
pub struct WebError(#[from] LedgerError);

impl WebError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
            LedgerError::DuplicateCategory(_) => StatusCode::CONFLICT,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, status = status.as_u16(), "request rejected");
        }

        let title = status.canonical_reason().unwrap_or("Error");
        (status, Html(views::error_page(title, &self.0.to_string()))).into_response()
    }
}

pub type WebResult<T> = Result<T, WebError>;

// ============================================================================
// PAGES
// ============================================================================

/// GET / - totals, last 10 transactions, trend chart
async fn index(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> WebResult<Html<String>> {
    let conn = state.store.session()?;
    let summary = DashboardSummary::load(&conn)?;
    Ok(Html(views::index_page(&summary, query.notice.as_deref())))
}

/// GET /transactions
async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> WebResult<Html<String>> {
    let conn = state.store.session()?;
    let transactions = db::list_transactions(&conn)?;
    let categories = db::list_categories(&conn)?;
    Ok(Html(views::transactions_page(
        &transactions,
        &categories,
        query.notice.as_deref(),
    )))
}

/// GET /transactions/new
async fn new_transaction_form(State(state): State<AppState>) -> WebResult<Html<String>> {
    let conn = state.store.session()?;
    let categories = db::list_categories(&conn)?;
    Ok(Html(views::transaction_form_page(&categories, None)))
}

/// POST /transactions/new
async fn create_transaction(
    State(state): State<AppState>,
    Form(form): Form<TransactionForm>,
) -> WebResult<Redirect> {
    let new_tx = form.validate(today())?;
    let conn = state.store.session()?;
    db::insert_transaction(&conn, &new_tx)?;
    Ok(redirect_with_notice("/transactions", "Transaction added."))
}

/// GET /transactions/:id/edit
async fn edit_transaction_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<Html<String>> {
    let conn = state.store.session()?;
    let tx = db::get_transaction(&conn, id)?;
    let categories = db::list_categories(&conn)?;
    Ok(Html(views::transaction_form_page(&categories, Some(&tx))))
}

/// POST /transactions/:id/edit
async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<TransactionForm>,
) -> WebResult<Redirect> {
    let conn = state.store.session()?;
    // Unknown id is reported before form errors
    db::get_transaction(&conn, id)?;
    let changes = form.validate(today())?;
    db::update_transaction(&conn, id, &changes)?;
    Ok(redirect_with_notice("/transactions", "Transaction updated."))
}

/// POST /transactions/:id/delete
async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<Redirect> {
    let conn = state.store.session()?;
    db::delete_transaction(&conn, id)?;
    Ok(redirect_with_notice("/transactions", "Transaction deleted."))
}

/// GET /categories
async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> WebResult<Html<String>> {
    let conn = state.store.session()?;
    let categories = db::list_categories(&conn)?;
    let index = db::category_index(&conn)?;
    Ok(Html(views::categories_page(
        &categories,
        &index,
        query.notice.as_deref(),
    )))
}

/// POST /categories/add - duplicates are reported, not failed
async fn add_category(
    State(state): State<AppState>,
    Form(form): Form<CategoryForm>,
) -> WebResult<Redirect> {
    let Some(name) = form.name() else {
        return Ok(Redirect::to("/categories"));
    };

    let conn = state.store.session()?;
    match db::insert_category(&conn, name) {
        Ok(_) => Ok(redirect_with_notice("/categories", "Category added.")),
        Err(LedgerError::DuplicateCategory(_)) => {
            Ok(redirect_with_notice("/categories", "Category already exists."))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /categories/:id/delete - detaches transactions, never deletes them
async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<Redirect> {
    let conn = state.store.session()?;
    db::delete_category(&conn, id)?;
    Ok(redirect_with_notice("/categories", "Category deleted."))
}

// ============================================================================
// API & EXPORT
// ============================================================================

/// GET /api/summary - net total per month for the last 6 months
async fn api_summary(State(state): State<AppState>) -> WebResult<Json<MonthlyTrend>> {
    let conn = state.store.session()?;
    let trend = summary::monthly_trend(&conn, today())?;
    Ok(Json(trend))
}

/// GET /api/health
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /export.csv
async fn export_csv(State(state): State<AppState>) -> WebResult<Response> {
    let conn = state.store.session()?;
    let body = export::export_to_string(&conn)?;
    let disposition = format!("attachment; filename={}", EXPORT_FILENAME);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/summary", get(api_summary));

    Router::new()
        .route("/", get(index))
        .route("/transactions", get(list_transactions))
        .route(
            "/transactions/new",
            get(new_transaction_form).post(create_transaction),
        )
        .route(
            "/transactions/:id/edit",
            get(edit_transaction_form).post(update_transaction),
        )
        .route("/transactions/:id/delete", post(delete_transaction))
        .route("/categories", get(list_categories))
        .route("/categories/add", post(add_category))
        .route("/categories/:id/delete", post(delete_category))
        .route("/export.csv", get(export_csv))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
