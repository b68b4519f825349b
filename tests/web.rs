#![cfg(feature = "server")]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Local;
use pocket_ledger::{
    summary::trend_window,
    web::{router, AppState},
    LedgerStore,
};
use std::sync::Arc;
use tower::ServiceExt;

fn build_test_app() -> (Router, Arc<LedgerStore>) {
    let state = AppState::new(LedgerStore::open_in_memory().unwrap());
    let store = state.store.clone();
    (router(state), store)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post_form(app: &Router, uri: &str, body: &str) -> (StatusCode, Option<String>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    (response.status(), location)
}

#[tokio::test]
async fn add_category_and_transaction_flow() {
    let (app, store) = build_test_app();

    let (status, location) = post_form(&app, "/categories/add", "name=TestCat").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/categories?notice=Category%20added."));

    let cat_id = {
        let conn = store.session().unwrap();
        pocket_ledger::db::find_category_by_name(&conn, "TestCat")
            .unwrap()
            .expect("category stored")
            .id
    };

    let body = format!(
        "description=Test+Transaction&amount=100&date=2025-10-01&category={}",
        cat_id
    );
    let (status, location) = post_form(&app, "/transactions/new", &body).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(
        location.as_deref(),
        Some("/transactions?notice=Transaction%20added.")
    );

    let (status, html) = get(&app, "/transactions?notice=Transaction%20added.").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Transaction added."));
    assert!(html.contains("Test Transaction"));
    assert!(html.contains("TestCat"));
    assert!(html.contains("100.00"));

    let conn = store.session().unwrap();
    let all = pocket_ledger::list_transactions(&conn).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].amount, 100.0);
    assert_eq!(all[0].category_id, Some(cat_id));
}

#[tokio::test]
async fn duplicate_category_is_reported_not_failed() {
    let (app, store) = build_test_app();

    post_form(&app, "/categories/add", "name=Food").await;
    let (status, location) = post_form(&app, "/categories/add", "name=Food").await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(
        location.as_deref(),
        Some("/categories?notice=Category%20already%20exists.")
    );

    let conn = store.session().unwrap();
    assert_eq!(pocket_ledger::list_categories(&conn).unwrap().len(), 1);
}

#[tokio::test]
async fn blank_category_name_is_ignored() {
    let (app, store) = build_test_app();

    let (status, location) = post_form(&app, "/categories/add", "name=+++").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/categories"));

    let conn = store.session().unwrap();
    assert!(pocket_ledger::list_categories(&conn).unwrap().is_empty());
}

#[tokio::test]
async fn malformed_input_is_rejected() {
    let (app, store) = build_test_app();

    let (status, _) = post_form(&app, "/transactions/new", "description=x&amount=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        post_form(&app, "/transactions/new", "description=x&amount=5&date=2025-02-30").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        post_form(&app, "/transactions/new", "description=x&amount=5&category=42").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        post_form(&app, "/transactions/new", "description=x&amount=5&date=%2B10000-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_form(&app, "/transactions/new", "description=x&amount=1e308").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let conn = store.session().unwrap();
    assert_eq!(pocket_ledger::count_transactions(&conn).unwrap(), 0);
}

#[tokio::test]
async fn missing_date_defaults_to_today() {
    let (app, store) = build_test_app();

    let (status, _) = post_form(&app, "/transactions/new", "description=Lunch&amount=-12.5&date=").await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let conn = store.session().unwrap();
    let all = pocket_ledger::list_transactions(&conn).unwrap();
    assert_eq!(all.len(), 1);
    // Allow for the test straddling midnight
    let today = Local::now().date_naive();
    assert!((today - all[0].date).num_days().abs() <= 1);
}

#[tokio::test]
async fn edit_and_delete_transaction() {
    let (app, store) = build_test_app();
    post_form(&app, "/transactions/new", "description=Rent&amount=-1100&date=2025-09-01").await;

    let id = {
        let conn = store.session().unwrap();
        pocket_ledger::list_transactions(&conn).unwrap()[0].id
    };

    let (status, html) = get(&app, &format!("/transactions/{}/edit", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("value=\"Rent\""));

    let (status, location) = post_form(
        &app,
        &format!("/transactions/{}/edit", id),
        "description=Monthly+rent&amount=-1200&date=2025-09-01",
    )
    .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(
        location.as_deref(),
        Some("/transactions?notice=Transaction%20updated.")
    );

    {
        let conn = store.session().unwrap();
        let tx = pocket_ledger::get_transaction(&conn, id).unwrap();
        assert_eq!(tx.description, "Monthly rent");
        assert_eq!(tx.amount, -1200.0);
    }

    let (status, location) = post_form(&app, &format!("/transactions/{}/delete", id), "").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(
        location.as_deref(),
        Some("/transactions?notice=Transaction%20deleted.")
    );

    let conn = store.session().unwrap();
    assert_eq!(pocket_ledger::count_transactions(&conn).unwrap(), 0);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (app, _store) = build_test_app();

    let (status, _) = get(&app, "/transactions/999/edit").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post_form(&app, "/transactions/999/edit", "amount=1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post_form(&app, "/transactions/999/delete", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post_form(&app, "/categories/999/delete", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_category_keeps_transactions() {
    let (app, store) = build_test_app();
    post_form(&app, "/categories/add", "name=Food").await;

    let food_id = {
        let conn = store.session().unwrap();
        pocket_ledger::list_categories(&conn).unwrap()[0].id
    };
    post_form(
        &app,
        "/transactions/new",
        &format!("description=Groceries&amount=-50&date=2025-09-25&category={}", food_id),
    )
    .await;

    let (status, location) = post_form(&app, &format!("/categories/{}/delete", food_id), "").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(
        location.as_deref(),
        Some("/categories?notice=Category%20deleted.")
    );

    let conn = store.session().unwrap();
    let all = pocket_ledger::list_transactions(&conn).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].category_id, None);
}

#[tokio::test]
async fn summary_endpoint_has_six_points() {
    let (app, _store) = build_test_app();

    let (status, body) = get(&app, "/api/summary").await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    let labels: Vec<String> = serde_json::from_value(json["labels"].clone()).unwrap();
    let data: Vec<f64> = serde_json::from_value(json["data"].clone()).unwrap();

    assert_eq!(labels, trend_window(Local::now().date_naive()));
    assert_eq!(data, vec![0.0; 6]);
}

#[tokio::test]
async fn summary_endpoint_sums_current_month() {
    let (app, _store) = build_test_app();
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();

    post_form(&app, "/transactions/new", &format!("description=Pay&amount=3000&date={}", today)).await;
    post_form(&app, "/transactions/new", &format!("description=Rent&amount=-1200&date={}", today)).await;
    post_form(&app, "/transactions/new", &format!("description=Food&amount=-50&date={}", today)).await;

    let (_, body) = get(&app, "/api/summary").await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["data"][5].as_f64(), Some(1750.0));
    assert_eq!(json["labels"][5].as_str(), Some(&today[..7]));
}

#[tokio::test]
async fn dashboard_renders_totals() {
    let (app, _store) = build_test_app();
    post_form(&app, "/transactions/new", "description=Pay&amount=3000&date=2025-09-30").await;
    post_form(&app, "/transactions/new", "description=Rent&amount=-1200&date=2025-09-01").await;

    let (status, html) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("3000.00"));
    assert!(html.contains("-1200.00"));
    assert!(html.contains("1800.00"));
}

#[tokio::test]
async fn csv_export_matches_ledger() {
    let (app, _store) = build_test_app();
    post_form(&app, "/categories/add", "name=Salary").await;
    post_form(&app, "/transactions/new", "description=Pay&amount=3000&date=2025-09-30&category=1").await;
    post_form(&app, "/transactions/new", "description=Coffee&amount=-3.5&date=2025-10-02").await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/export.csv").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=transactions.csv"
    );
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "id,description,amount,date,category");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("Coffee") && lines[1].contains("2025-10-02"));
    assert!(lines[2].contains("Pay") && lines[2].ends_with(",2025-09-30,Salary"));
}

#[tokio::test]
async fn health_check() {
    let (app, _store) = build_test_app();
    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"ok"}"#);
}
