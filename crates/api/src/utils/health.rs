//! Health report for the application context

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Overall health of the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub is_healthy: bool,

    /// `healthy_components / total_components`, from 0.0 to 1.0.
    pub score: f64,

    pub message: Option<String>,

    pub components: Vec<ComponentHealth>,

    /// Unix seconds when the check ran.
    pub timestamp: i64,
}

impl HealthStatus {
    pub fn new() -> Self {
        Self {
            is_healthy: true,
            score: 1.0,
            message: None,
            components: Vec::new(),
            timestamp: Utc::now().timestamp(),
        }
    }

    pub fn add_component(mut self, component: ComponentHealth) -> Self {
        self.components.push(component);
        self
    }

    /// Recompute the score. Every component must be healthy for the whole
    /// application to count as healthy.
    pub fn calculate_score(&mut self) {
        if self.components.is_empty() {
            return;
        }

        let healthy_count = self.components.iter().filter(|c| c.is_healthy).count();

        self.score = healthy_count as f64 / self.components.len() as f64;
        self.is_healthy = healthy_count == self.components.len();
        self.message = (!self.is_healthy).then(|| {
            let failing: Vec<&str> =
                self.components.iter().filter(|c| !c.is_healthy).map(|c| c.name.as_str()).collect();
            format!("unhealthy: {}", failing.join(", "))
        });
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Health of one component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub is_healthy: bool,
    pub message: Option<String>,
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, message: None }
    }

    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: false, message: Some(message.into()) }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_healthy_scores_one() {
        let mut status = HealthStatus::new()
            .add_component(ComponentHealth::healthy("database"))
            .add_component(ComponentHealth::healthy("telegram").with_message("disabled"));
        status.calculate_score();

        assert_eq!(status.score, 1.0);
        assert!(status.is_healthy);
        assert!(status.message.is_none());
    }

    #[test]
    fn one_failure_marks_status_unhealthy() {
        let mut status = HealthStatus::new()
            .add_component(ComponentHealth::healthy("database"))
            .add_component(ComponentHealth::healthy("schema"))
            .add_component(ComponentHealth::healthy("telegram"))
            .add_component(ComponentHealth::unhealthy("sms", "bad credentials"));
        status.calculate_score();

        assert_eq!(status.score, 0.75);
        assert!(!status.is_healthy);
        assert_eq!(status.message.as_deref(), Some("unhealthy: sms"));
    }

    #[test]
    fn empty_status_stays_healthy() {
        let mut status = HealthStatus::new();
        status.calculate_score();
        assert!(status.is_healthy);
        assert_eq!(status.score, 1.0);
    }
}
