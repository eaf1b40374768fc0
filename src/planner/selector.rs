use tracing::debug;

use crate::error::PlanError;
use crate::types::{FinancialProfile, Plan, TemplateTable};

pub fn template_key(profile: &FinancialProfile, class: &str) -> String {
    let suffix = if profile.pays_housing() { 'A' } else { 'B' };
    format!("{class}{suffix}")
}

pub fn assign_plan(
    profile: &FinancialProfile,
    class: &str,
    templates: &TemplateTable,
) -> Result<(String, Plan), PlanError> {
    let key = template_key(profile, class);
    let plan = templates
        .get(&key)
        .cloned()
        .ok_or_else(|| PlanError::lookup(format!("no plan template for key '{key}'")))?;
    debug!(%key, "template selected");
    Ok((key, plan))
}
