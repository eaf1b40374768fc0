use anyhow::Result;

use crate::planner::PlanResult;
use crate::projection::Projection;

pub fn plan_to_csv(result: &PlanResult, income: f64) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["category", "percent", "monthly_amount", "shortfall"])?;
    if let Some(plan) = &result.plan {
        for (category, percent) in plan.iter() {
            writer.write_record([
                category.to_string(),
                format!("{percent:.4}"),
                format!("{:.2}", plan.amount(category, income)),
                result
                    .shortfall
                    .get(&category)
                    .map(|gap| format!("{gap:.2}"))
                    .unwrap_or_default(),
            ])?;
        }
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn projection_to_csv(projection: &Projection) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["month", "projection"])?;
    for (month, value) in projection.all_months.iter().zip(&projection.projection) {
        writer.write_record([month.to_string(), format!("{value:.4}")])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanStatus;
    use crate::types::{Category, Plan};

    #[test]
    fn writes_one_row_per_category() {
        let mut result = PlanResult::new(PlanStatus::Success, "ok");
        result.plan = Some(Plan::from_entries([
            (Category::Food, 10.0),
            (Category::Savings, 90.0),
        ]));
        result.shortfall.insert(Category::Food, 0.0);
        let csv = plan_to_csv(&result, 3000.0).expect("csv");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "category,percent,monthly_amount,shortfall");
        assert_eq!(lines[1], "food,10.0000,300.00,0.00");
        assert_eq!(lines[2], "savings,90.0000,2700.00,");
    }

    #[test]
    fn projection_rows_follow_months() {
        let projection = Projection {
            all_months: vec![0, 1],
            projection: vec![0.0, 150.5],
            coefficients: vec![0.0, 150.5],
        };
        let csv = projection_to_csv(&projection).expect("csv");
        assert!(csv.ends_with("1,150.5000\n"));
    }
}
