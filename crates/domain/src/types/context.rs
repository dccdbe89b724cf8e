//! Per-operation context

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Who is acting, in which timezone and company, and at what instant.
///
/// Passed explicitly to every write so that message timestamps and stamping
/// do not depend on ambient state.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationContext {
    pub actor_name: Option<String>,
    pub timezone: Tz,
    pub company_id: Option<i64>,
    pub now: DateTime<Utc>,
}

impl OperationContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { actor_name: None, timezone: Tz::UTC, company_id: None, now }
    }

    /// Context stamped with the current time.
    pub fn system() -> Self {
        Self::new(Utc::now())
    }

    pub fn with_actor(mut self, name: impl Into<String>) -> Self {
        self.actor_name = Some(name.into());
        self
    }

    /// Parse an IANA zone name; unknown names fall back to UTC.
    pub fn with_timezone_name(mut self, name: &str) -> Self {
        self.timezone = name.parse().unwrap_or(Tz::UTC);
        self
    }

    pub fn with_company(mut self, company_id: i64) -> Self {
        self.company_id = Some(company_id);
        self
    }

    /// `now` rendered in the actor's timezone.
    pub fn local_now(&self) -> String {
        self.format_local(self.now)
    }

    pub fn format_local(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.timezone).format("%d.%m.%Y %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn formats_in_actor_timezone() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 7, 30, 0).unwrap();
        let ctx = OperationContext::new(now).with_timezone_name("Asia/Tashkent");
        assert_eq!(ctx.local_now(), "01.06.2025 12:30:00");
    }

    #[test]
    fn unknown_timezone_falls_back_to_utc() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 7, 30, 0).unwrap();
        let ctx = OperationContext::new(now).with_timezone_name("Mars/Olympus");
        assert_eq!(ctx.timezone, Tz::UTC);
        assert_eq!(ctx.local_now(), "01.06.2025 07:30:00");
    }
}
