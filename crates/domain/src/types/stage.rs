//! Pipeline stages and lifecycle classification
//!
//! Stages are free-text records maintained by operators. Write-time rules
//! (timestamp stamping, "new request" detection) work on the closed
//! [`LifecycleState`] enum instead: an explicit `lifecycle` on the stage wins,
//! otherwise the stage name is classified by keyword. Duration replay keeps
//! its own keyword lists, see [`crate::utils::timeline`].

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_STAGE_COLOR_HEX, DEFAULT_STAGE_TEXT_COLOR_HEX};
use crate::impl_domain_status_conversions;

/// Closed set of lifecycle states a lead moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    New,
    Accepted,
    Rejected,
    InProgress,
    Finished,
    Confirmed,
    Cancelled,
}

impl_domain_status_conversions!(LifecycleState {
    New => "new",
    Accepted => "accepted",
    Rejected => "rejected",
    InProgress => "in_progress",
    Finished => "finished",
    Confirmed => "confirmed",
    Cancelled => "cancelled",
});

/// Keyword table in precedence order. The first state with a matching
/// keyword wins, so "qabul qilinmadi" is Rejected rather than Accepted.
const KEYWORDS: &[(LifecycleState, &[&str])] = &[
    (LifecycleState::Rejected, &["qabul qilinmadi", "rejected", "not accepted"]),
    (LifecycleState::Cancelled, &["bekor", "cancel"]),
    (LifecycleState::Confirmed, &["tasdiq", "confirm", "won"]),
    (LifecycleState::Finished, &["ish yakunlandi", "yakun", "done", "finish"]),
    (LifecycleState::InProgress, &["jarayon", "progress"]),
    (LifecycleState::Accepted, &["qabul", "accept", "waiting", "kutil"]),
    (LifecycleState::New, &["yangi", "new", "so'rov", "so\u{2018}rov"]),
];

impl LifecycleState {
    /// Classify a free-text stage name (case-insensitive substring match).
    pub fn classify(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return None;
        }
        KEYWORDS
            .iter()
            .find(|(_, keys)| keys.iter().any(|k| name.contains(k)))
            .map(|(state, _)| *state)
    }

    /// Work has been accepted by a technician.
    pub fn is_accepted_like(self) -> bool {
        matches!(self, Self::Accepted | Self::InProgress)
    }

    /// Work is complete.
    pub fn is_done_like(self) -> bool {
        matches!(self, Self::Finished | Self::Confirmed)
    }
}

/// CRM pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: i64,
    pub name: String,
    pub sequence: i32,
    pub is_won: bool,
    /// Explicit lifecycle mapping; overrides name classification.
    #[serde(default)]
    pub lifecycle: Option<LifecycleState>,
    #[serde(default = "default_color")]
    pub color_hex: String,
    #[serde(default = "default_text_color")]
    pub text_color_hex: String,
}

impl Stage {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            sequence: 10,
            is_won: false,
            lifecycle: None,
            color_hex: default_color(),
            text_color_hex: default_text_color(),
        }
    }

    pub fn with_lifecycle(mut self, state: LifecycleState) -> Self {
        self.lifecycle = Some(state);
        self
    }

    pub fn won(mut self) -> Self {
        self.is_won = true;
        self
    }

    /// Explicit lifecycle, else name classification, else `Confirmed` for a
    /// won stage with an unrecognised name.
    pub fn state(&self) -> Option<LifecycleState> {
        self.lifecycle
            .or_else(|| LifecycleState::classify(&self.name))
            .or(if self.is_won { Some(LifecycleState::Confirmed) } else { None })
    }

    pub fn is_state(&self, state: LifecycleState) -> bool {
        self.state() == Some(state)
    }

    pub fn is_done_like(&self) -> bool {
        self.is_won || self.state().is_some_and(LifecycleState::is_done_like)
    }

    /// The "won" action is only offered once work is finished.
    pub fn shows_won_button(&self) -> bool {
        self.is_state(LifecycleState::Finished)
    }

    /// Header label with the lead count, e.g. `Jarayonda (4)`.
    pub fn display_with_count(&self, count: u64) -> String {
        format!("{} ({})", self.name, count)
    }
}

fn default_color() -> String {
    DEFAULT_STAGE_COLOR_HEX.to_string()
}

fn default_text_color() -> String {
    DEFAULT_STAGE_TEXT_COLOR_HEX.to_string()
}
