//! Lifecycle timestamps written when a lead enters a stage

use chrono::{DateTime, Utc};
use leadflow_domain::{round_hours, Lead, LifecycleState, Stage};

/// Stamp the timestamps implied by entering `stage` at `now`.
///
/// Existing timestamps are never overwritten, and nothing is rolled back when
/// a lead returns to an earlier stage.
pub fn stamp_stage_entry(lead: &mut Lead, stage: &Stage, now: DateTime<Utc>) {
    lead.stage_entered_at = Some(now);
    let state = stage.state();

    match state {
        Some(LifecycleState::Accepted) => {
            lead.accepted_at.get_or_insert(now);
        }
        Some(LifecycleState::InProgress) => {
            lead.accepted_at.get_or_insert(now);
            lead.started_at.get_or_insert(now);
        }
        _ => {}
    }

    if stage.is_done_like() && lead.finished_at.is_none() {
        lead.finished_at = Some(now);
        let seconds = (now - lead.work_start()).num_seconds().max(0);
        lead.work_time_spent_hours = Some(round_hours(seconds));
    }

    if stage.is_won || state == Some(LifecycleState::Confirmed) {
        lead.confirmed_at.get_or_insert(now);
    }
}
