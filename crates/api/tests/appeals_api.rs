//! Integration tests for the appeal endpoints and the moderation queue.

mod common;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{body_json, build_test_app, get, patch_json, post_json, post_multipart, Part};
use seekreap_api::error::AppError;
use seekreap_db::repositories::CreatorRepo;
use serde_json::json;
use sqlx::PgPool;

fn appeal_body(creator: &str, video_id: &str) -> serde_json::Value {
    json!({
        "creator_id": creator,
        "channelName": "Channel One",
        "video_id": video_id,
        "video_title": "Episode 1",
        "action_type": "demonetized",
        "policy_violated": "advertiser_friendly",
        "creator_statement": "The clip is commentary."
    })
}

async fn submit_appeal(app: &common::TestApp, creator: &str, video_id: &str) -> serde_json::Value {
    let response = post_json(app.router(), "/api/v1/appeals", appeal_body(creator, video_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Test: submission spends one credit
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_appeal_spends_one_credit(pool: PgPool) {
    let app = build_test_app(pool);
    let data = submit_appeal(&app, "creator-1", "vid-1").await;

    assert_eq!(data["remaining_credits"], 2);
    assert_eq!(data["appeal"]["status"], "submitted");
    assert_eq!(data["appeal"]["appeal_channel"], "youtube_studio");
    assert_eq!(data["appeal"]["grounds"], "misclassification");
    assert_eq!(data["enforcement_action"]["video_id"], "vid-1");
    assert_eq!(data["enforcement_action"]["action_type"], "demonetized");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_appeal_accepts_legacy_field_names(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app.router(),
        "/api/v1/appeals",
        json!({
            "creatorId": 42,
            "youtube_video_id": "legacy-vid",
            "actionType": "age_restricted",
            "raw_yt_notice": "Your video was restricted"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["enforcement_action"]["video_id"], "legacy-vid");
    assert_eq!(data["enforcement_action"]["raw_notice"], "Your video was restricted");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_appeal_requires_video_id(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app.router(),
        "/api/v1/appeals",
        json!({ "creator_id": "c", "action_type": "demonetized" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Test: quota exhaustion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn exhausted_credits_return_403(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let creator = CreatorRepo::resolve_or_create(&pool, "broke").await.unwrap();
    CreatorRepo::set_appeal_credits(&pool, creator.id, 0)
        .await
        .unwrap();

    let response = post_json(app.router(), "/api/v1/appeals", appeal_body("broke", "vid-9")).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "QUOTA_EXCEEDED");

    let appeals: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM appeals")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(appeals, 0);
}

// ---------------------------------------------------------------------------
// Test: detail, evidence and history
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn appeal_detail_includes_evidence_and_history(pool: PgPool) {
    let app = build_test_app(pool);
    let id = submit_appeal(&app, "creator-1", "vid-1").await["appeal"]["id"]
        .as_i64()
        .unwrap();

    let response = post_multipart(
        app.router(),
        &format!("/api/v1/appeals/{id}/evidence"),
        &[
            Part::Text("evidence_type", "screenshot"),
            Part::Text("description", " Original upload page "),
            Part::File {
                name: "evidence",
                filename: "proof.png",
                content_type: "image/png",
                data: b"\x89PNG fake",
            },
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let evidence = body_json(response).await["data"].clone();
    assert_eq!(evidence["evidence_type"], "screenshot");
    assert_eq!(evidence["description"], "Original upload page");
    assert_eq!(evidence["original_filename"], "proof.png");

    let file_ref = evidence["file_ref"].as_str().unwrap();
    assert!(file_ref.starts_with("evidence/"));
    assert!(app.upload_dir.path().join(file_ref).exists());

    let detail = body_json(get(app.router(), &format!("/api/v1/appeals/{id}")).await).await;
    let data = &detail["data"];
    assert_eq!(data["appeal"]["id"], id);
    assert_eq!(data["creator_legacy_id"], "creator-1");
    assert_eq!(data["creator_display_name"], "Channel One");
    assert_eq!(data["evidence"].as_array().unwrap().len(), 1);
    assert!(data["outcome"].is_null());

    let history = data["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["old_status"], "draft");
    assert_eq!(history[0]["new_status"], "submitted");
    assert_eq!(history[0]["changed_by"], "creator");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn evidence_for_unknown_appeal_returns_404(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_multipart(
        app.router(),
        "/api/v1/appeals/999999/evidence",
        &[Part::File {
            name: "evidence",
            filename: "proof.png",
            content_type: "image/png",
            data: b"data",
        }],
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!app.upload_dir.path().join("evidence").exists());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn evidence_without_file_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let id = submit_appeal(&app, "creator-1", "vid-1").await["appeal"]["id"]
        .as_i64()
        .unwrap();

    let response = post_multipart(
        app.router(),
        &format!("/api/v1/appeals/{id}/evidence"),
        &[Part::Text("description", "nothing attached")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn get_unknown_appeal_returns_404(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app.router(), "/api/v1/appeals/424242").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: moderation queue and transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn pending_queue_lists_open_appeals_oldest_first(pool: PgPool) {
    let app = build_test_app(pool);
    let first = submit_appeal(&app, "creator-1", "vid-1").await["appeal"]["id"]
        .as_i64()
        .unwrap();
    let second = submit_appeal(&app, "creator-2", "vid-2").await["appeal"]["id"]
        .as_i64()
        .unwrap();

    let queue = body_json(get(app.router(), "/api/v1/admin/appeals/pending").await).await;
    let rows = queue["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], first);
    assert_eq!(rows[1]["id"], second);
    assert_eq!(rows[0]["evidence_count"], 0);

    patch_json(
        app.router(),
        &format!("/api/v1/admin/appeals/{first}/status"),
        json!({
            "status": "denied",
            "outcome_data": { "outcome": "denied" }
        }),
    )
    .await;

    let queue = body_json(get(app.router(), "/api/v1/admin/appeals/pending").await).await;
    let rows = queue["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], second);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn closing_an_appeal_requires_outcome(pool: PgPool) {
    let app = build_test_app(pool);
    let id = submit_appeal(&app, "creator-1", "vid-1").await["appeal"]["id"]
        .as_i64()
        .unwrap();
    let uri = format!("/api/v1/admin/appeals/{id}/status");

    let response = patch_json(app.router(), &uri, json!({ "status": "under_review" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "under_review");

    let response = patch_json(app.router(), &uri, json!({ "status": "overturned" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_json(
        app.router(),
        &uri,
        json!({
            "status": "overturned",
            "note": "Context shows commentary",
            "outcome_data": {
                "outcome": "overturned",
                "monetization_restored": true,
                "yt_response_text": "Monetization restored"
            }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "overturned");

    let detail = body_json(get(app.router(), &format!("/api/v1/appeals/{id}")).await).await;
    let data = &detail["data"];
    assert_eq!(data["outcome"]["outcome"], "overturned");
    assert_eq!(data["outcome"]["monetization_restored"], true);
    assert_eq!(data["outcome"]["platform_response"], "Monetization restored");

    let history = data["history"].as_array().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0]["new_status"], "overturned");
    assert_eq!(history[0]["changed_by"], "moderator");
    assert_eq!(history[0]["note"], "Context shows commentary");

    // Closed appeals cannot be reopened.
    let response = patch_json(app.router(), &uri, json!({ "status": "under_review" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "INVALID_TRANSITION");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn transition_of_unknown_appeal_returns_404(pool: PgPool) {
    let app = build_test_app(pool);
    let response = patch_json(
        app.router(),
        "/api/v1/admin/appeals/999999/status",
        json!({ "status": "under_review" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn closing_unknown_appeal_returns_404(pool: PgPool) {
    let app = build_test_app(pool);
    let response = patch_json(
        app.router(),
        "/api/v1/admin/appeals/999999/status",
        json!({ "status": "denied" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_appeal_status_returns_json_400(pool: PgPool) {
    let app = build_test_app(pool);
    let id = submit_appeal(&app, "creator-1", "vid-1").await["appeal"]["id"]
        .as_i64()
        .unwrap();

    let response = patch_json(
        app.router(),
        &format!("/api/v1/admin/appeals/{id}/status"),
        json!({ "status": "bogus" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let content_type = response.headers().get("content-type").unwrap().clone();
    assert!(content_type.to_str().unwrap().starts_with("application/json"));
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_numeric_appeal_id_returns_json_400(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app.router(), "/api/v1/appeals/not-a-number").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Test: a second open appeal on one action maps to 409
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn second_open_appeal_maps_to_conflict(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let data = submit_appeal(&app, "creator-1", "vid-1").await;

    let err = sqlx::query(
        "INSERT INTO appeals (action_id, creator_id, appeal_channel, grounds) \
         VALUES ($1, $2, 'email', 'misclassification')",
    )
    .bind(data["enforcement_action"]["id"].as_i64().unwrap())
    .bind(data["appeal"]["creator_id"].as_i64().unwrap())
    .execute(&pool)
    .await
    .unwrap_err();

    let response = AppError::Database(err).into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "The enforcement action already has an open appeal");
}
