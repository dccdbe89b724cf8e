//! Lead (service request) records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{EMPTY_PLACEHOLDER, WON_PROBABILITY_THRESHOLD};
use crate::impl_domain_status_conversions;
use crate::types::stage::Stage;
use crate::utils::duration::{format_badge, format_long_duration};

/// Request category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadCategory {
    Hamkorli,
    Shikoyat,
    Servis,
}

impl_domain_status_conversions!(LeadCategory {
    Hamkorli => "hamkorli",
    Shikoyat => "shikoyat",
    Servis => "servis",
});

/// A customer service request moving through the stage pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub name: String,
    pub category: Option<LeadCategory>,
    pub stage_id: Option<i64>,
    /// Assigned technician.
    pub usta_id: Option<i64>,
    /// Province.
    pub state_id: Option<i64>,
    /// District within the province.
    pub region_id: Option<i64>,
    pub company_id: Option<i64>,
    /// Responsible salesperson / operator name.
    pub responsible: Option<String>,

    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub partner_name: Option<String>,
    pub partner_phone: Option<String>,
    pub partner_mobile: Option<String>,

    pub street: Option<String>,
    pub city: Option<String>,
    pub state_name: Option<String>,
    pub country_name: Option<String>,

    pub probability: f64,
    pub work_amount: f64,
    pub work_text: Option<String>,
    /// The same technical problem came back after service.
    pub repeat_request: bool,

    pub geo_link: Option<String>,
    pub geo_lat: Option<f64>,
    pub geo_lng: Option<f64>,

    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub stage_entered_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub work_time_spent_hours: Option<f64>,

    pub service_number: Option<String>,
    pub tg_card_chat_id: Option<String>,
    pub notify_new_sent: bool,
    pub notify_won_sent: bool,
    pub active: bool,
}

impl Lead {
    /// Won by stage flag or by probability.
    pub fn is_won(&self, stage: Option<&Stage>) -> bool {
        stage.is_some_and(|s| s.is_won) || self.probability >= WON_PROBABILITY_THRESHOLD
    }

    pub fn has_service_number(&self) -> bool {
        self.service_number.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    /// Every phone number known for the lead and its contact.
    pub fn phone_numbers(&self) -> impl Iterator<Item = &str> {
        [&self.phone, &self.mobile, &self.partner_phone, &self.partner_mobile]
            .into_iter()
            .filter_map(|p| p.as_deref())
    }

    /// Phone shown in messages: lead phone, else contact phone.
    pub fn contact_phone(&self) -> &str {
        [&self.phone, &self.partner_phone, &self.mobile, &self.partner_mobile]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .find(|p| !p.trim().is_empty())
            .unwrap_or(EMPTY_PLACEHOLDER)
    }

    /// `street, city, state, country`, skipping blanks; `-` when empty.
    pub fn address(&self) -> String {
        let parts: Vec<&str> = [&self.street, &self.city, &self.state_name, &self.country_name]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            EMPTY_PLACEHOLDER.to_string()
        } else {
            parts.join(", ")
        }
    }

    /// Start of the work window: accepted, else started, else created.
    pub fn work_start(&self) -> DateTime<Utc> {
        self.accepted_at.or(self.started_at).unwrap_or(self.created_at)
    }

    /// `N kun N soat N min` from work start to finish (or `now`).
    pub fn work_time_label(&self, now: DateTime<Utc>) -> String {
        format_long_duration(Some(self.work_start()), self.finished_at.unwrap_or(now))
    }

    /// Compact badge of the time spent in the current stage.
    pub fn stage_elapsed_badge(&self, now: DateTime<Utc>) -> String {
        let base = self.stage_entered_at.unwrap_or(self.updated_at);
        format_badge((now - base).num_seconds())
    }
}

/// Values accepted when creating a lead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewLead {
    pub name: String,
    pub category: Option<LeadCategory>,
    pub stage_id: Option<i64>,
    pub usta_id: Option<i64>,
    pub state_id: Option<i64>,
    pub region_id: Option<i64>,
    pub responsible: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub partner_name: Option<String>,
    pub partner_phone: Option<String>,
    pub partner_mobile: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state_name: Option<String>,
    pub country_name: Option<String>,
    pub probability: f64,
    pub work_amount: f64,
    pub work_text: Option<String>,
    pub repeat_request: bool,
    pub geo_link: Option<String>,
    pub tg_card_chat_id: Option<String>,
}

impl NewLead {
    /// Unsaved lead (id 0) stamped at `now`.
    pub fn into_lead(self, company_id: Option<i64>, now: DateTime<Utc>) -> Lead {
        Lead {
            id: 0,
            name: self.name,
            category: self.category,
            stage_id: self.stage_id,
            usta_id: self.usta_id,
            state_id: self.state_id,
            region_id: self.region_id,
            company_id,
            responsible: self.responsible,
            phone: self.phone,
            mobile: self.mobile,
            partner_name: self.partner_name,
            partner_phone: self.partner_phone,
            partner_mobile: self.partner_mobile,
            street: self.street,
            city: self.city,
            state_name: self.state_name,
            country_name: self.country_name,
            probability: self.probability,
            work_amount: self.work_amount,
            work_text: self.work_text,
            repeat_request: self.repeat_request,
            geo_link: self.geo_link,
            geo_lat: None,
            geo_lng: None,
            created_at: now,
            accepted_at: None,
            started_at: None,
            finished_at: None,
            confirmed_at: None,
            stage_entered_at: self.stage_id.map(|_| now),
            updated_at: now,
            work_time_spent_hours: None,
            service_number: None,
            tg_card_chat_id: self.tg_card_chat_id,
            notify_new_sent: false,
            notify_won_sent: false,
            active: true,
        }
    }
}

/// Partial update. `None` leaves a field untouched; the nested `Option` on
/// clearable references distinguishes "clear" from "keep".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadUpdate {
    pub name: Option<String>,
    pub category: Option<LeadCategory>,
    pub stage_id: Option<i64>,
    pub usta_id: Option<Option<i64>>,
    pub state_id: Option<Option<i64>>,
    pub region_id: Option<Option<i64>>,
    pub responsible: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub partner_phone: Option<String>,
    pub partner_mobile: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub probability: Option<f64>,
    pub work_amount: Option<f64>,
    pub work_text: Option<String>,
    pub repeat_request: Option<bool>,
    pub geo_link: Option<Option<String>>,
    pub tg_card_chat_id: Option<String>,
    pub active: Option<bool>,
}

impl LeadUpdate {
    pub fn stage(stage_id: i64) -> Self {
        Self { stage_id: Some(stage_id), ..Self::default() }
    }

    /// Whether the update moves the lead to a different stage.
    pub fn changes_stage(&self, lead: &Lead) -> bool {
        self.stage_id.is_some_and(|id| lead.stage_id != Some(id))
    }

    pub fn changes_geo_link(&self, lead: &Lead) -> bool {
        self.geo_link.as_ref().is_some_and(|link| *link != lead.geo_link)
    }

    /// Copy the set fields onto `lead`.
    pub fn apply(&self, lead: &mut Lead) {
        macro_rules! set {
            ($($field:ident),+ $(,)?) => {
                $(if let Some(value) = &self.$field {
                    lead.$field = value.clone().into();
                })+
            };
        }
        set!(
            name,
            usta_id,
            state_id,
            region_id,
            responsible,
            phone,
            mobile,
            partner_phone,
            partner_mobile,
            street,
            city,
            work_text,
            geo_link,
            tg_card_chat_id,
        );
        if let Some(category) = self.category {
            lead.category = Some(category);
        }
        if let Some(stage_id) = self.stage_id {
            lead.stage_id = Some(stage_id);
        }
        if let Some(probability) = self.probability {
            lead.probability = probability;
        }
        if let Some(amount) = self.work_amount {
            lead.work_amount = amount;
        }
        if let Some(repeat) = self.repeat_request {
            lead.repeat_request = repeat;
        }
        if let Some(active) = self.active {
            lead.active = active;
        }
    }
}

/// Internal note attached to a lead (swallowed integration errors etc.).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadNote {
    pub id: i64,
    pub lead_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
