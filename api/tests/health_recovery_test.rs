//! Route tests for GET /health and POST /admin/trigger-recovery

mod common;

use actix_web::http::StatusCode;
use actix_web::test;

use sb_api::app::create_app;
use sb_core::domain::entities::SyncItem;
use sb_core::stores::SyncQueueStore;

use common::{build_harness, force_fallback, test_settings, MOBILE};

#[actix_rt::test]
async fn test_health_reports_healthy() {
    let harness = build_harness(test_settings());
    let app = test::init_service(create_app(harness.state.clone())).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["mode"], "normal");
    assert_eq!(body["checks"]["fast_store"], "healthy");
    assert_eq!(body["checks"]["durable_store"], "healthy");
    assert_eq!(body["checks"]["workers"], "running");
}

#[actix_rt::test]
async fn test_health_reports_unhealthy_when_fast_store_down() {
    let harness = build_harness(test_settings());
    harness.store.set_unavailable(true);
    let app = test::init_service(create_app(harness.state.clone())).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["checks"]["fast_store"], "unhealthy");
}

#[actix_rt::test]
async fn test_health_reports_fallback_mode() {
    let harness = build_harness(test_settings());
    force_fallback(&harness.monitor);
    let app = test::init_service(create_app(harness.state.clone())).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["mode"], "fallback_active");
}

#[actix_rt::test]
async fn test_trigger_recovery_with_empty_queue() {
    let harness = build_harness(test_settings());
    let app = test::init_service(create_app(harness.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/admin/trigger-recovery")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["users_sent"], 0);
    assert_eq!(harness.backend.batch_count(), 0);
}

#[actix_rt::test]
async fn test_trigger_recovery_drains_retry_queue() {
    let harness = build_harness(test_settings());
    harness
        .store
        .push_retry(&SyncItem::new(MOBILE, "123456", "A3B7K2M9"))
        .await
        .unwrap();
    harness
        .store
        .push_retry(&SyncItem::new("+919876543211", "654321", "B4C8L3N1"))
        .await
        .unwrap();
    let app = test::init_service(create_app(harness.state.clone())).await;

    let body: serde_json::Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/admin/trigger-recovery")
            .to_request(),
    )
    .await;
    assert_eq!(body["users_sent"], 2);
    assert_eq!(harness.backend.batch_count(), 1);
    assert!(harness.store.retry_items().is_empty());
}

#[actix_rt::test]
async fn test_trigger_recovery_requeues_on_backend_failure() {
    let harness = build_harness(test_settings());
    harness
        .store
        .push_retry(&SyncItem::new(MOBILE, "123456", "A3B7K2M9"))
        .await
        .unwrap();
    harness.backend.set_should_fail(true);
    let app = test::init_service(create_app(harness.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/admin/trigger-recovery")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "DELIVERY_FAILED");
    // Nothing is lost: the item is back in the retry queue
    assert_eq!(harness.store.retry_items().len(), 1);
}
