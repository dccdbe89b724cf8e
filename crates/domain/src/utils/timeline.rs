//! Stage timeline replay
//!
//! Work duration is measured from the first accepted stage to the first
//! done stage. Stamped timestamps are used when both exist; otherwise the
//! audit trail of stage changes is replayed.
//!
//! Replay matches stage names against its own keyword lists rather than the
//! lifecycle classifier: any name containing `qabul`/`accept` opens the
//! window, including "Qabul qilinmadi", and in-progress stages do not.
//! Durations computed from old audit trails stay comparable that way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::lead::Lead;
use crate::types::stage::{LifecycleState, Stage};
use crate::utils::duration::{format_badge, round_hours};

const REPLAY_ACCEPT_KEYWORDS: &[&str] = &["qabul", "accept"];
const REPLAY_DONE_KEYWORDS: &[&str] =
    &["ish yakunlandi", "yakun", "tasdiq", "finished", "done", "won"];

fn name_contains_any(name: &str, keywords: &[&str]) -> bool {
    let name = name.to_lowercase();
    keywords.iter().any(|k| name.contains(k))
}

/// One entry of a lead's stage audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageChangeEvent {
    pub lead_id: i64,
    pub occurred_at: DateTime<Utc>,
    pub stage_name: String,
    /// Explicit lifecycle of the stage when the change was recorded.
    #[serde(default)]
    pub state: Option<LifecycleState>,
}

impl StageChangeEvent {
    /// Event for `stage`. Only an explicit lifecycle or the won flag is
    /// recorded; name keywords are matched at replay time.
    pub fn for_stage(lead_id: i64, stage: &Stage, occurred_at: DateTime<Utc>) -> Self {
        let state = stage.lifecycle.or(stage.is_won.then_some(LifecycleState::Confirmed));
        Self { lead_id, occurred_at, stage_name: stage.name.clone(), state }
    }

    /// Whether this change starts the work window.
    pub fn opens_window(&self) -> bool {
        match self.state {
            Some(state) => state.is_accepted_like(),
            None => name_contains_any(&self.stage_name, REPLAY_ACCEPT_KEYWORDS),
        }
    }

    /// Whether this change ends the work window.
    pub fn closes_window(&self) -> bool {
        match self.state {
            Some(state) => state.is_done_like(),
            None => name_contains_any(&self.stage_name, REPLAY_DONE_KEYWORDS),
        }
    }
}

/// Elapsed work time in the three shapes callers display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkDuration {
    pub seconds: i64,
    pub hours: f64,
    pub badge: String,
}

impl WorkDuration {
    pub fn from_seconds(seconds: i64) -> Self {
        let seconds = seconds.max(0);
        Self { seconds, hours: round_hours(seconds), badge: format_badge(seconds) }
    }
}

/// Accepted-to-done duration for `lead`.
///
/// `events` must be ordered oldest first. A closure event for the current
/// stage at `now` is appended during replay, so a lead that is still being
/// worked on reports the time accumulated so far.
pub fn work_duration(
    lead: &Lead,
    current_stage: Option<&Stage>,
    events: &[StageChangeEvent],
    now: DateTime<Utc>,
) -> WorkDuration {
    if let (Some(accepted), Some(finished)) = (lead.accepted_at, lead.finished_at) {
        return WorkDuration::from_seconds((finished - accepted).num_seconds());
    }

    let closure = current_stage.map(|stage| StageChangeEvent::for_stage(lead.id, stage, now));
    let mut last: Option<DateTime<Utc>> = None;
    let mut seconds = 0i64;

    for event in events.iter().chain(closure.as_ref()) {
        let Some(previous) = last else {
            if event.opens_window() {
                last = Some(event.occurred_at);
            }
            continue;
        };
        seconds += (event.occurred_at - previous).num_seconds().max(0);
        last = Some(event.occurred_at);
        if event.closes_window() {
            break;
        }
    }

    WorkDuration::from_seconds(seconds)
}
