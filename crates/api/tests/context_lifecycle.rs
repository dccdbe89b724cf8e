//! End-to-end lead lifecycle through the application context

mod support;

use leadflow_core::NotificationOutbox;
use leadflow_domain::{
    Channel, LeadCategory, LeadUpdate, LeadflowError, NewLead, NotificationKind, OutboxEntry,
    OutboxStatus,
};
use leadflow_lib::commands::{imports, leads, maintenance};
use serde_json::json;
use support::{TestApp, BOT_TOKEN, NEW_STAGE, USTA_CHAT, USTA_ID, WON_STAGE};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn send_path() -> String {
    format!("/bot{BOT_TOKEN}/sendMessage")
}

async fn telegram_ok() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(send_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
        .mount(&server)
        .await;
    server
}

async fn configure_counter(app: &TestApp) {
    let setup = maintenance::SequenceSetup {
        company_id: None,
        prefix: "SRV".into(),
        padding: 5,
        number_next: None,
    };
    maintenance::configure_sequence(&app.ctx, setup).await.expect("sequence should configure");
}

fn service_lead() -> NewLead {
    NewLead {
        name: "Konditsioner ta'miri".into(),
        category: Some(LeadCategory::Servis),
        stage_id: Some(NEW_STAGE),
        usta_id: Some(USTA_ID),
        phone: Some("+998 90 123 45 67".into()),
        work_amount: 250.0,
        ..NewLead::default()
    }
}

#[tokio::test]
async fn lead_lifecycle_numbers_notifies_and_awards_bonus() {
    let server = telegram_ok().await;
    let uri = server.uri();
    let app = TestApp::new(Some(uri.as_str()));
    app.seed().await;
    configure_counter(&app).await;

    let lead = leads::create_lead(&app.ctx, service_lead(), Some("operator")).await.unwrap();
    assert_eq!(lead.service_number.as_deref(), Some("SRV00001"));
    assert!(lead.notify_new_sent);

    let entries: Vec<OutboxEntry> = app.ctx.outbox.list_for_lead(lead.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, NotificationKind::NewRequest);
    assert_eq!(entries[0].channel, Channel::Telegram);
    assert_eq!(entries[0].recipient, USTA_CHAT);
    assert_eq!(entries[0].status, OutboxStatus::Sent);

    let won =
        leads::update_lead(&app.ctx, lead.id, LeadUpdate::stage(WON_STAGE), None).await.unwrap();
    assert!(won.notify_won_sent);
    assert_eq!(won.service_number.as_deref(), Some("SRV00001"));

    let entries = app.ctx.outbox.list_for_lead(lead.id).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.status == OutboxStatus::Sent));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);

    let card = leads::lead_card(&app.ctx, lead.id).await.unwrap();
    assert_eq!(card.finance.count, 1);
    assert!((card.finance.amount_sum - 25.0).abs() < f64::EPSILON);

    // Leaving and re-entering the won stage neither re-notifies nor pays twice
    leads::update_lead(&app.ctx, lead.id, LeadUpdate::stage(2), None).await.unwrap();
    leads::update_lead(&app.ctx, lead.id, LeadUpdate::stage(WON_STAGE), None).await.unwrap();
    assert_eq!(app.ctx.outbox.list_for_lead(lead.id).await.unwrap().len(), 2);
    assert_eq!(leads::lead_card(&app.ctx, lead.id).await.unwrap().finance.count, 1);

    let counts = leads::stage_counts(&app.ctx).await.unwrap();
    let won_count = counts.iter().find(|c| c.stage_id == WON_STAGE).unwrap();
    assert_eq!(won_count.count, 1);
    assert_eq!(won_count.label, "Bajarildi (1)");

    let stats = leads::technician_stats(&app.ctx, USTA_ID).await.unwrap();
    assert_eq!(stats.done, 1);
    assert_eq!(stats.active, 0);
}

#[tokio::test]
async fn failed_delivery_is_recorded_without_failing_the_write() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(send_path()))
        .respond_with(ResponseTemplate::new(500).set_body_string("bot unavailable"))
        .expect(1)
        .mount(&server)
        .await;
    let uri = server.uri();
    let app = TestApp::new(Some(uri.as_str()));
    app.seed().await;
    configure_counter(&app).await;

    let lead = leads::create_lead(&app.ctx, service_lead(), None).await.unwrap();
    assert!(lead.notify_new_sent);

    let entries = app.ctx.outbox.list_for_lead(lead.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, OutboxStatus::Failed);
    assert_eq!(entries[0].attempts, 1);
    assert!(entries[0].last_error.is_some());

    // Failed entries are not picked up again
    let report = maintenance::redeliver_notifications(&app.ctx, 10).await.unwrap();
    assert_eq!(report.sent + report.failed, 0);
}

#[tokio::test]
async fn pending_entries_are_redelivered() {
    let server = telegram_ok().await;
    let uri = server.uri();
    let app = TestApp::new(Some(uri.as_str()));
    app.seed().await;
    configure_counter(&app).await;

    let lead = leads::create_lead(
        &app.ctx,
        NewLead { stage_id: Some(2), ..service_lead() },
        None,
    )
    .await
    .unwrap();
    assert!(!lead.notify_new_sent);

    let entry = OutboxEntry::pending(
        lead.id,
        NotificationKind::NewRequest,
        Channel::Telegram,
        USTA_CHAT.to_string(),
        "<b>retry</b>".to_string(),
        chrono::Utc::now(),
    );
    app.ctx.outbox.enqueue(&entry).await.unwrap();

    let report = maintenance::redeliver_notifications(&app.ctx, 10).await.unwrap();
    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 0);

    let stored = app.ctx.outbox.list_for_lead(lead.id).await.unwrap();
    assert_eq!(stored[0].status, OutboxStatus::Sent);
}

#[tokio::test]
async fn missing_counter_rejects_create_and_stores_nothing() {
    let app = TestApp::new(None);
    app.seed().await;

    let err = leads::create_lead(&app.ctx, service_lead(), None).await.unwrap_err();
    assert!(matches!(err, LeadflowError::Config(_)));

    let counts = leads::stage_counts(&app.ctx).await.unwrap();
    assert!(counts.iter().all(|c| c.count == 0));
}

#[tokio::test]
async fn backfill_numbers_imported_servis_leads() {
    let app = TestApp::new(None);
    app.seed().await;
    app.ctx
        .db
        .get_connection()
        .unwrap()
        .execute_batch(
            "INSERT INTO leads (name, category, stage_id, active, probability, work_amount,
                                repeat_request, notify_new_sent, notify_won_sent,
                                created_at, updated_at)
             VALUES ('Eski', 'servis', 2, 1, 0, 0, 0, 0, 0, 0, 0)",
        )
        .unwrap();
    configure_counter(&app).await;

    assert_eq!(maintenance::backfill_service_numbers(&app.ctx).await.unwrap(), 1);
    assert_eq!(maintenance::backfill_service_numbers(&app.ctx).await.unwrap(), 0);
}

#[tokio::test]
async fn imports_calls_and_matches_them_to_the_lead() {
    let app = TestApp::new(None);
    app.seed().await;
    configure_counter(&app).await;
    let lead = leads::create_lead(&app.ctx, service_lead(), None).await.unwrap();

    let calls = app.write_json(
        "calls.json",
        json!([
            {"src": "998901234567", "dst": "100", "started_at": "2024-03-01T09:00:00Z",
             "duration_secs": 40, "direction": "inbound"},
            {"src": "100", "dst": "+998 90 123-45-67", "started_at": "2024-03-01T10:00:00Z",
             "duration_secs": 15, "direction": "outbound"},
            {"src": "998911111111", "dst": "100", "started_at": "2024-03-01T11:00:00Z",
             "duration_secs": 5, "direction": "inbound"}
        ]),
    );
    assert_eq!(imports::import_calls(&app.ctx, &calls).await.unwrap(), 3);

    let matched = leads::lead_calls(&app.ctx, lead.id, 10).await.unwrap();
    assert_eq!(matched.len(), 2);
    assert_eq!(matched[0].direction, leadflow_domain::CallDirection::Outbound);
    assert_eq!(leads::lead_card(&app.ctx, lead.id).await.unwrap().call_count, 2);
}

#[tokio::test]
async fn health_reports_disabled_channels_as_healthy() {
    let app = TestApp::new(None);
    let status = maintenance::health(&app.ctx).await.unwrap();
    assert!(status.is_healthy);
    assert_eq!(status.components.len(), 4);
    let telegram = status.components.iter().find(|c| c.name == "telegram").unwrap();
    assert_eq!(telegram.message.as_deref(), Some("disabled"));
}
