//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Service numbering
pub const SERVICE_SEQUENCE_CODE: &str = "crm.lead.service.number";

// Phone correlation
pub const PHONE_TAIL_LEN: usize = 7;

// Stage colours (kanban header / list badge)
pub const DEFAULT_STAGE_COLOR_HEX: &str = "#3498db";
pub const DEFAULT_STAGE_TEXT_COLOR_HEX: &str = "#ffffff";

// Won detection
pub const WON_PROBABILITY_THRESHOLD: f64 = 100.0;

// Outbound HTTP
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 6;
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const ESKIZ_API_BASE: &str = "https://notify.eskiz.uz";
pub const PLAYMOBILE_API_BASE: &str = "https://send.smsxabar.uz";

// Placeholder rendered for missing values in messages and labels
pub const EMPTY_PLACEHOLDER: &str = "-";

/// Stage titles tracked by the per-technician counters, in pipeline order.
pub const TRACKED_STAGE_TITLES: [&str; 7] = [
    "Yangi so'rovlar",
    "Qabul qilindi",
    "Qabul qilinmadi",
    "Jarayonda",
    "Ish yakunlandi",
    "Tasdiqlandi",
    "Bekor qilindi",
];
