//! Technician assignment rules

use leadflow_domain::{Employee, Lead, LeadflowError, Result};

/// Warning shown when a technician is picked before the region.
pub const REGION_FIRST_WARNING: &str = "Oldin murojaat hududini belgilang! Avval Viloyat va \
     Tumanni tanlang, keyin Ustani tanlashingiz mumkin.";

/// The technician must serve the lead's region when both are set.
pub fn validate_assignment(lead: &Lead, technician: &Employee) -> Result<()> {
    let Some(region_id) = lead.region_id else {
        return Ok(());
    };
    if technician.serves_region(region_id) {
        return Ok(());
    }
    Err(LeadflowError::Validation(format!(
        "Tanlangan usta ({}) bu hudud (#{}) uchun xizmat ko'rsatmaydi. Iltimos, boshqa ustani \
         tanlang yoki ustaning ish hududini yangilang.",
        technician.name, region_id
    )))
}

/// Active technicians serving the region, else the province, else all.
pub fn eligible_technicians<'a>(
    technicians: &'a [Employee],
    state_id: Option<i64>,
    region_id: Option<i64>,
) -> Vec<&'a Employee> {
    technicians
        .iter()
        .filter(|e| e.is_usta && e.active)
        .filter(|e| match (region_id, state_id) {
            (Some(region), _) => e.serves_region(region),
            (None, Some(state)) => e.serves_state(state),
            (None, None) => true,
        })
        .collect()
}

/// Warning for a technician chosen without a region.
pub fn region_first_warning(lead: &Lead) -> Option<&'static str> {
    (lead.usta_id.is_some() && lead.region_id.is_none()).then_some(REGION_FIRST_WARNING)
}
