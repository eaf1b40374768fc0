use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::planner::minimums::MinimumCheck;
use crate::planner::PlanResult;
use crate::projection::Projection;

pub fn render_plan_table(result: &PlanResult, income: f64) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Status: {} - {}\n",
        result.status.as_tag().to_uppercase(),
        result.message
    ));
    if let Some(strategy) = result.strategy {
        out.push_str(&format!("Strategy: {strategy}\n"));
    }
    if let Some(key) = &result.template_key {
        out.push_str(&format!("Template: {key}\n"));
    }
    if let (Some(label), Some(goal)) = (&result.goal_label, result.effective_goal) {
        out.push_str(&format!("Goal: {label} ({goal:.2} still to save)\n"));
    }
    if let Some(months) = result.months_to_goal {
        out.push_str(&format!("Months to goal: {months}\n"));
    }
    if let Some(details) = &result.details {
        out.push_str(&format!("{details}\n"));
    }

    let Some(plan) = &result.plan else {
        return out;
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Category", "Allocation", "Monthly", "Shortfall"]);
    for (category, percent) in plan.iter() {
        let shortfall_cell = match result.shortfall.get(&category) {
            Some(gap) if *gap > 0.0 => Cell::new(format!("{gap:.2}")).fg(Color::Red),
            Some(gap) => Cell::new(format!("{gap:.2}")).fg(Color::Green),
            None => Cell::new("-"),
        };
        table.add_row(Row::from(vec![
            Cell::new(category.to_string()),
            Cell::new(format!("{percent:.2}%")),
            Cell::new(format!("{:.2}", plan.amount(category, income))),
            shortfall_cell,
        ]));
    }
    out.push_str(&table.to_string());

    for step in &result.adjustments {
        out.push_str(&format!(
            "\nMoved {:.2}% from {} into savings (now {:.2}%)",
            step.moved_percent, step.field, step.savings_after
        ));
    }
    for transfer in &result.transfers {
        out.push_str(&format!(
            "\nShifted {:.2} from {} to {}",
            transfer.amount, transfer.from, transfer.to
        ));
    }
    out
}

pub fn render_minimum_check_table(check: &MinimumCheck) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Category", "Minimum - Actual", "Meets Floor"]);
    for (category, gap) in &check.shortfall {
        let meets = if *gap <= 0.0 {
            Cell::new("YES").fg(Color::Green)
        } else {
            Cell::new("NO").fg(Color::Red)
        };
        table.add_row(Row::from(vec![
            Cell::new(category.to_string()),
            Cell::new(format!("{gap:.2}")),
            meets,
        ]));
    }
    let verdict = if check.valid {
        "All minimums met"
    } else {
        "Minimums not met"
    };
    format!("{table}\n{verdict}")
}

pub fn render_projection_table(projection: &Projection) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Month", "Projected Progress"]);
    for (month, value) in projection.all_months.iter().zip(&projection.projection) {
        table.add_row(vec![month.to_string(), format!("{value:.2}")]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::arbiter::create_plan;
    use crate::planner::minimums::check_minimums;
    use crate::testing::{
        sample_bundle, sample_goal, sample_minimums, sample_profile, sample_templates,
    };

    #[test]
    fn plan_table_lists_categories_and_summary() {
        let result = create_plan(
            &sample_profile(),
            &sample_goal(),
            &sample_templates(),
            &sample_minimums(),
            &sample_bundle(),
        );
        let rendered = render_plan_table(&result, 3000.0);
        assert!(rendered.starts_with("Status: SUCCESS"));
        assert!(rendered.contains("Months to goal: 13"));
        assert!(rendered.contains("non-essential"));
        assert!(rendered.contains("150.00"));
    }

    #[test]
    fn check_table_reports_verdict() {
        let plan = sample_templates().get("4B").cloned().expect("4B");
        let check = check_minimums(&plan, 3000.0, &sample_minimums(), false);
        let rendered = render_minimum_check_table(&check);
        assert!(rendered.ends_with("Minimums not met"));
        assert!(rendered.contains("food"));
    }
}
