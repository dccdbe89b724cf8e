#![allow(dead_code)]

use std::path::PathBuf;

use leadflow_domain::Config;
use leadflow_lib::commands::imports;
use leadflow_lib::AppContext;
use serde_json::json;
use tempfile::TempDir;

pub const BOT_TOKEN: &str = "123:abc";
pub const NEW_STAGE: i64 = 1;
pub const WON_STAGE: i64 = 5;
pub const USTA_ID: i64 = 7;
pub const USTA_CHAT: &str = "555";

/// Application context on a temporary database with Telegram pointed at
/// `telegram_base`.
pub struct TestApp {
    pub ctx: AppContext,
    pub dir: TempDir,
}

impl TestApp {
    pub fn new(telegram_base: Option<&str>) -> Self {
        let dir = TempDir::new().expect("temp dir should be created");
        let db_path = dir.path().join("leadflow.db");
        let mut config = Config::for_database(db_path.to_string_lossy().to_string());
        if let Some(base) = telegram_base {
            config.telegram.bot_token = Some(BOT_TOKEN.to_string());
            config.telegram.api_base = base.to_string();
        }
        config.finance.bonus_percent = 10.0;

        let ctx = AppContext::new(config).expect("context should initialize");
        Self { ctx, dir }
    }

    pub fn write_json(&self, name: &str, value: serde_json::Value) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, value.to_string()).expect("fixture should be written");
        path
    }

    /// Import the two-stage pipeline and one technician.
    pub async fn seed(&self) {
        let stages = self.write_json(
            "stages.json",
            json!([
                {"id": NEW_STAGE, "name": "Yangi so'rovlar", "sequence": 10, "is_won": false},
                {"id": 2, "name": "Qabul qilindi", "sequence": 20, "is_won": false},
                {"id": WON_STAGE, "name": "Bajarildi", "sequence": 50, "is_won": true}
            ]),
        );
        let employees = self.write_json(
            "employees.json",
            json!([
                {"id": USTA_ID, "name": "Akmal", "is_usta": true, "active": true, "tg_chat_id": USTA_CHAT}
            ]),
        );
        imports::import_stages(&self.ctx, &stages).await.expect("stages should import");
        imports::import_employees(&self.ctx, &employees).await.expect("employees should import");
    }
}
