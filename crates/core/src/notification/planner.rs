//! Detects won / new-request transitions that need a notification

use leadflow_domain::{Lead, LifecycleState, NotificationKind, Stage, StageConfig};

/// Notification-relevant state of a lead at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationSnapshot {
    pub is_new: bool,
    pub is_won: bool,
}

impl NotificationSnapshot {
    pub fn capture(lead: &Lead, stage: Option<&Stage>, config: &StageConfig) -> Self {
        Self { is_new: is_new_stage(stage, config), is_won: lead.is_won(stage) }
    }
}

/// Configured new-request stage, else a stage classified as New.
pub fn is_new_stage(stage: Option<&Stage>, config: &StageConfig) -> bool {
    stage.is_some_and(|stage| {
        config.new_stage_id == Some(stage.id) || stage.is_state(LifecycleState::New)
    })
}

/// Kinds that flipped to true between `before` and `after` and were not
/// sent yet. A freshly created lead uses the default (all false) snapshot.
pub fn due_notifications(
    lead: &Lead,
    before: NotificationSnapshot,
    after: NotificationSnapshot,
) -> Vec<NotificationKind> {
    let mut due = Vec::with_capacity(2);
    if after.is_new && !before.is_new && !lead.notify_new_sent {
        due.push(NotificationKind::NewRequest);
    }
    if after.is_won && !before.is_won && !lead.notify_won_sent {
        due.push(NotificationKind::Won);
    }
    due
}
