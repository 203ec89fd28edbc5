//! Partner configuration validation and reconfiguration semantics.

mod common;

use common::{assert_close, dec_field, partnership, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn shares_must_sum_to_one() {
    let app = TestApp::spawn().await;

    let response = app
        .put_config(&json!({
            "a": { "display_name": "A", "initial_debt": "100", "share": "0.50" },
            "b": { "display_name": "B", "initial_debt": "100", "share": "0.30" },
        }))
        .await;
    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn shares_within_tolerance_are_accepted() {
    let app = TestApp::spawn().await;

    // 0.33 * 3 = 0.99, inside the 0.01 tolerance.
    let response = app
        .put_config(&json!({
            "a": { "display_name": "A", "initial_debt": "100", "share": "0.33" },
            "b": { "display_name": "B", "initial_debt": "100", "share": "0.33" },
            "c": { "display_name": "C", "initial_debt": "100", "share": "0.33" },
        }))
        .await;
    assert!(response.status().is_success());
}

#[tokio::test]
async fn negative_debts_are_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .put_config(&json!({
            "a": { "display_name": "A", "initial_debt": "-100", "share": "0.50" },
            "b": { "display_name": "B", "initial_debt": "100", "share": "0.50" },
        }))
        .await;
    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn empty_configuration_is_rejected() {
    let app = TestApp::spawn().await;
    let response = app.put_config(&json!({})).await;
    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn reconfiguration_replays_the_whole_history() {
    let app = TestApp::spawn().await;
    app.put_config(&partnership()).await;
    app.record_payment(&json!({ "amount": 10000 })).await;

    // Bump bharat's salary share; his slice of the already-recorded payment
    // must change accordingly.
    let response = app
        .put_config(&json!({
            "bhargav": { "display_name": "Bhargav", "initial_debt": "66250", "share": "0.20" },
            "sagar": { "display_name": "Sagar", "initial_debt": "66250", "share": "0.30" },
            "bharat": { "display_name": "Bharat", "initial_debt": "17500", "share": "0.50" },
        }))
        .await;
    assert!(response.status().is_success());

    let history = app.history(None).await;
    let allocation = &history["payments"][0]["allocation"];
    assert_close(dec_field(&allocation["partners"]["bharat"]["share"]), dec!(0.50));
    assert_close(
        dec_field(&allocation["partners"]["bharat"]["salary_portion"]),
        dec!(5000) - dec_field(&allocation["partners"]["bharat"]["debt_portion"]),
    );
    // The pools themselves are share-independent in steady state.
    assert_close(dec_field(&allocation["to_debt_pool"]), dec!(5000));
}

#[tokio::test]
async fn invalid_configuration_leaves_the_previous_one_in_place() {
    let app = TestApp::spawn().await;
    app.put_config(&partnership()).await;
    app.record_payment(&json!({ "amount": 10000 })).await;
    let before = app.state().await;

    let response = app
        .put_config(&json!({
            "x": { "display_name": "X", "initial_debt": "1", "share": "0.10" },
        }))
        .await;
    assert_eq!(response.status().as_u16(), 422);

    let after = app.state().await;
    assert_eq!(after["totals"], before["totals"]);
    assert_eq!(after["partners"], before["partners"]);
}
