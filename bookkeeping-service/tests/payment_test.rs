//! End-to-end payment recording tests, covering the three allocation
//! branches through the API.

mod common;

use common::{assert_close, dec_field, partnership, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn payments_are_rejected_until_a_configuration_is_set() {
    let app = TestApp::spawn().await;

    let response = app
        .record_payment(&json!({ "amount": 1000, "recorded_by": "tester" }))
        .await;
    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let app = TestApp::spawn().await;
    assert!(app.put_config(&partnership()).await.status().is_success());

    for amount in ["-100", "0"] {
        let response = app.record_payment(&json!({ "amount": amount })).await;
        assert_eq!(response.status().as_u16(), 422, "amount {amount}");
    }

    let state = app.state().await;
    assert_eq!(dec_field(&state["totals"]["debt_paid"]), dec!(0));
}

#[tokio::test]
async fn steady_state_payment_splits_fifty_fifty() {
    let app = TestApp::spawn().await;
    app.put_config(&partnership()).await;

    let response = app
        .record_payment(&json!({ "amount": 10000, "recorded_by": "tester" }))
        .await;
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();

    let allocation = &body["payment"]["allocation"];
    assert_close(dec_field(&allocation["to_debt_pool"]), dec!(5000));
    assert_close(dec_field(&allocation["to_salary_pool"]), dec!(5000));
    assert_eq!(allocation["debt_complete"], false);

    let bhargav = &allocation["partners"]["bhargav"];
    assert_close(dec_field(&bhargav["debt_portion"]), dec!(2208.333333));
    assert_close(dec_field(&bhargav["salary_portion"]), dec!(791.666667));
    let bharat = &allocation["partners"]["bharat"];
    assert_close(dec_field(&bharat["debt_portion"]), dec!(583.333333));
    assert_close(dec_field(&bharat["salary_portion"]), dec!(3416.666667));

    let state = &body["state"];
    assert_close(dec_field(&state["remaining_debt"]), dec!(145000));
    assert_close(dec_field(&state["totals"]["salary_paid"]), dec!(5000));
}

#[tokio::test]
async fn final_payment_retires_only_the_remainder() {
    let app = TestApp::spawn().await;
    app.put_config(&partnership()).await;

    // Leaves about 10000 of the 150000 pool.
    app.record_payment(&json!({ "amount": 280000 })).await;

    let response = app.record_payment(&json!({ "amount": 30000 })).await;
    let body: serde_json::Value = response.json().await.unwrap();

    let allocation = &body["payment"]["allocation"];
    assert_close(dec_field(&allocation["to_debt_pool"]), dec!(10000));
    assert_close(dec_field(&allocation["to_salary_pool"]), dec!(20000));
    assert_eq!(allocation["debt_complete"], true);

    let state = &body["state"];
    assert_eq!(state["totals"]["debt_fully_paid"], true);
    assert_close(dec_field(&state["remaining_debt"]), dec!(0));
    assert_close(dec_field(&state["totals"]["debt_paid"]), dec!(150000));
}

#[tokio::test]
async fn cleared_debt_routes_everything_to_salary() {
    let app = TestApp::spawn().await;
    app.put_config(&partnership()).await;
    app.record_payment(&json!({ "amount": 400000 })).await;

    let response = app.record_payment(&json!({ "amount": 10000 })).await;
    let body: serde_json::Value = response.json().await.unwrap();

    let allocation = &body["payment"]["allocation"];
    assert_close(dec_field(&allocation["to_debt_pool"]), dec!(0));
    assert_close(dec_field(&allocation["to_salary_pool"]), dec!(10000));
    assert_close(dec_field(&allocation["debt_clear_rate"]), dec!(0));
    assert_close(
        dec_field(&allocation["partners"]["bharat"]["salary_portion"]),
        dec!(4000),
    );
}

#[tokio::test]
async fn extra_payment_applies_to_one_partner() {
    let app = TestApp::spawn().await;
    app.put_config(&partnership()).await;

    let response = app
        .record_extra(&json!({
            "partner": "bharat",
            "amount": 1000,
            "recorded_by": "tester",
            "comment": "direct repayment"
        }))
        .await;
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(body["payment"]["type"], "extra");
    let state = &body["state"];
    assert_close(dec_field(&state["remaining_debt"]), dec!(149000));
    assert_close(dec_field(&state["totals"]["extra_payments"]), dec!(1000));
    assert_close(
        dec_field(&state["totals"]["per_partner_extra"]["bharat"]),
        dec!(1000),
    );
}

#[tokio::test]
async fn negative_extra_payment_incurs_new_debt() {
    let app = TestApp::spawn().await;
    app.put_config(&partnership()).await;

    let response = app
        .record_extra(&json!({ "partner": "sagar", "amount": -2500 }))
        .await;
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_close(dec_field(&body["state"]["remaining_debt"]), dec!(152500));
}

#[tokio::test]
async fn extra_payment_validation() {
    let app = TestApp::spawn().await;
    app.put_config(&partnership()).await;

    let unknown = app
        .record_extra(&json!({ "partner": "nobody", "amount": 100 }))
        .await;
    assert_eq!(unknown.status().as_u16(), 422);

    let zero = app
        .record_extra(&json!({ "partner": "sagar", "amount": 0 }))
        .await;
    assert_eq!(zero.status().as_u16(), 422);
}

#[tokio::test]
async fn malformed_period_is_rejected() {
    let app = TestApp::spawn().await;
    app.put_config(&partnership()).await;

    let response = app
        .record_payment(&json!({
            "amount": 1000,
            "period": { "start": "2026-03-10", "end": "2026-03-01" }
        }))
        .await;
    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn history_returns_most_recent_first() {
    let app = TestApp::spawn().await;
    app.put_config(&partnership()).await;

    for amount in [100, 200, 300] {
        app.record_payment(&json!({ "amount": amount })).await;
    }

    let history = app.history(Some(2)).await;
    let payments = history["payments"].as_array().unwrap();
    assert_eq!(payments.len(), 2);
    assert_close(dec_field(&payments[0]["amount"]), dec!(300));
    assert_close(dec_field(&payments[1]["amount"]), dec!(200));
}
