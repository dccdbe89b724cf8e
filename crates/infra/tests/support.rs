#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use leadflow_domain::{LeadCategory, NewLead, Stage};
use leadflow_infra::database::{DbManager, SqliteStageRepository};
use tempfile::TempDir;

/// Migrated temporary database that lives as long as the value.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("leadflow-test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub fn execute_batch(&self, sql: &str) {
        let conn = self.manager.get_connection().expect("connection should be available");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
}

pub fn servis_lead(name: &str) -> NewLead {
    NewLead {
        name: name.into(),
        category: Some(LeadCategory::Servis),
        phone: Some("+998 90 123 45 67".into()),
        ..NewLead::default()
    }
}

pub async fn seed_stages(db: &TestDatabase) -> Vec<Stage> {
    let repo = SqliteStageRepository::new(db.manager.clone());
    let mut stages = vec![
        Stage::new(1, "Yangi so'rovlar"),
        Stage::new(2, "Qabul qilindi"),
        Stage::new(3, "Jarayonda"),
        Stage::new(4, "Ish yakunlandi"),
        Stage::new(5, "Tasdiqlandi").won(),
    ];
    for (i, stage) in stages.iter_mut().enumerate() {
        stage.sequence = (i as i32 + 1) * 10;
        repo.save(stage).await.expect("stage should save");
    }
    stages
}
