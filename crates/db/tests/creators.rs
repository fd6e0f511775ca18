//! Integration tests for creator resolution and dashboard aggregates.

use serde_json::json;
use sqlx::PgPool;
use seekreap_core::appeal::{AppealStatus, Actor, DEFAULT_APPEAL_CREDITS};
use seekreap_core::job::JobType;
use seekreap_db::models::appeal::{CreateAppeal, CreateEnforcementAction, OutcomeData, StatusChange};
use seekreap_db::models::dashboard::CreatorDashboard;
use seekreap_db::models::job::CreateJob;
use seekreap_db::repositories::{AppealRepo, CreatorRepo, DashboardRepo, JobRepo};

#[sqlx::test(migrations = "./migrations")]
async fn resolve_or_create_is_idempotent(pool: PgPool) {
    let first = CreatorRepo::resolve_or_create(&pool, "legacy-9").await.unwrap();
    let second = CreatorRepo::resolve_or_create(&pool, "legacy-9").await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.appeal_credits, DEFAULT_APPEAL_CREDITS);

    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM creators")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row.0, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn unknown_creator_dashboard_is_empty_and_not_created(pool: PgPool) {
    let dashboard = DashboardRepo::creator_dashboard(&pool, "ghost").await.unwrap();
    assert_eq!(dashboard, CreatorDashboard::empty("ghost"));

    let created = CreatorRepo::find_by_legacy_id(&pool, "ghost").await.unwrap();
    assert!(created.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn dashboard_counts_jobs_and_appeals(pool: PgPool) {
    let creator = CreatorRepo::resolve_or_create(&pool, "c1").await.unwrap();
    for (job_type, content) in [
        (JobType::Video, "a.mp4"),
        (JobType::PreFlag, "pre-1"),
        (JobType::PreFlag, "pre-2"),
    ] {
        JobRepo::create(
            &pool,
            &CreateJob {
                creator_id: creator.id,
                content_id: content.to_string(),
                job_type,
                params: json!({}),
            },
        )
        .await
        .unwrap();
    }

    let appeal = CreateAppeal {
        appeal_channel: "youtube_studio".to_string(),
        grounds: "misclassification".to_string(),
        creator_statement: None,
    };
    let mut submissions = Vec::new();
    for video in ["v1", "v2"] {
        let action = CreateEnforcementAction {
            video_id: video.to_string(),
            video_title: None,
            action_type: "removed".to_string(),
            policy_violated: None,
            notified_at: None,
            decision_url: None,
            raw_notice: None,
        };
        submissions.push(
            AppealRepo::submit(&pool, "c1", None, &action, &appeal)
                .await
                .unwrap(),
        );
    }

    let decision = OutcomeData {
        outcome: "overturned".to_string(),
        monetization_restored: true,
        distribution_restored: true,
        platform_response: None,
    };
    AppealRepo::transition(
        &pool,
        submissions[0].appeal.id,
        &StatusChange {
            to: AppealStatus::Overturned,
            actor: Actor::Moderator,
            note: None,
            outcome: Some(&decision),
        },
    )
    .await
    .unwrap();

    let dashboard = DashboardRepo::creator_dashboard(&pool, "c1").await.unwrap();
    assert_eq!(dashboard.legacy_creator_id, "c1");
    assert_eq!(dashboard.total_submissions, 3);
    assert_eq!(dashboard.total_prechecks, 2);
    assert_eq!(dashboard.total_enforcements, 2);
    assert_eq!(dashboard.total_appeals, 2);
    assert_eq!(dashboard.open_appeals, 1);
    assert_eq!(dashboard.successful_appeals, 1);
    assert_eq!(dashboard.appeal_credits, DEFAULT_APPEAL_CREDITS - 2);
}
