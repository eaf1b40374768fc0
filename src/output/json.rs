use anyhow::{Context, Result};
use serde::Serialize;

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed serializing output as JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanStatus;
    use crate::planner::PlanResult;

    #[test]
    fn plan_result_uses_status_tags() {
        let result = PlanResult::new(PlanStatus::CalcError, "Redistribution failed");
        let rendered = render_json(&result).expect("json");
        assert!(rendered.contains("\"status\": \"calc_error\""));
        assert!(rendered.contains("\"months_to_goal\": null"));
    }
}
