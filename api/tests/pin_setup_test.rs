//! Route tests for POST /pin-setup

mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;

use sb_api::app::create_app;
use sb_core::domain::entities::VerificationFlag;

use common::{build_harness, force_fallback, test_settings, MOBILE};

const TOKEN: &str = "A3B7K2M9";

#[actix_rt::test]
async fn test_pin_setup_without_verification_is_rejected() {
    let harness = build_harness(test_settings());
    let app = test::init_service(create_app(harness.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/pin-setup")
        .set_json(json!({
            "mobile_number": MOBILE,
            "pin": "123456",
            "hash": TOKEN,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "NOT_VERIFIED");
}

#[actix_rt::test]
async fn test_pin_setup_with_wrong_hash_is_rejected() {
    let harness = build_harness(test_settings());
    harness
        .store
        .insert_flag(VerificationFlag::new(MOBILE, TOKEN));
    let app = test::init_service(create_app(harness.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/pin-setup")
        .set_json(json!({
            "mobile_number": MOBILE,
            "pin": "123456",
            "hash": "WRONGTKN",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "HASH_MISMATCH");

    // The flag survives a mismatched attempt
    assert!(harness.store.flag_for(MOBILE).is_some());
}

#[actix_rt::test]
async fn test_pin_setup_after_flag_expiry_matches_never_verified() {
    let harness = build_harness(test_settings());
    harness
        .store
        .insert_flag(VerificationFlag::new(MOBILE, TOKEN));
    harness.store.expire_flag(MOBILE);
    let app = test::init_service(create_app(harness.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/pin-setup")
        .set_json(json!({
            "mobile_number": MOBILE,
            "pin": "123456",
            "hash": TOKEN,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Same error class as a number that was never verified
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "NOT_VERIFIED");
}

#[actix_rt::test]
async fn test_pin_setup_enqueues_sync_item() {
    let harness = build_harness(test_settings());
    harness
        .store
        .insert_flag(VerificationFlag::new(MOBILE, TOKEN));
    let app = test::init_service(create_app(harness.state.clone())).await;

    let body: serde_json::Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/pin-setup")
            .set_json(json!({
                "mobile_number": MOBILE,
                "pin": "123456",
                "hash": TOKEN,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(body["status"], "success");
    assert_eq!(harness.store.sync_queue_len(), 1);
    assert!(harness.store.flag_for(MOBILE).is_none());
}

#[actix_rt::test]
async fn test_pin_setup_unavailable_in_fallback_mode() {
    let harness = build_harness(test_settings());
    harness
        .store
        .insert_flag(VerificationFlag::new(MOBILE, TOKEN));
    force_fallback(&harness.monitor);
    let app = test::init_service(create_app(harness.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/pin-setup")
        .set_json(json!({
            "mobile_number": MOBILE,
            "pin": "123456",
            "hash": TOKEN,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
