//! Won / new-request notifications

pub mod planner;
pub mod ports;
pub mod service;
pub mod templates;

pub use planner::{due_notifications, is_new_stage, NotificationSnapshot};
pub use service::{DeliveryReport, NotificationService};
