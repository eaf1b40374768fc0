use serde::{Deserialize, Serialize};

use crate::error::PlanError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Feasibility {
    pub months: u32,
    pub required_months: f64,
    pub monthly_savings: f64,
}

impl Feasibility {
    pub fn message(&self) -> String {
        format!("You can achieve the savings goal in {} months.", self.months)
    }
}

pub fn verify_savings(
    savings_percent: f64,
    income: f64,
    goal_amount: f64,
    max_months: u32,
) -> Result<Feasibility, PlanError> {
    let monthly_savings = savings_percent / 100.0 * income;
    if monthly_savings.is_nan() || monthly_savings <= 0.0 {
        return Err(PlanError::calc(
            "Savings percentage or income is too low to save anything.",
        ));
    }

    let required_months = goal_amount / monthly_savings;
    if required_months > f64::from(max_months) {
        return Err(PlanError::calc(format!(
            "The savings goal cannot be achieved within {max_months} months. Required months: {}.",
            required_months.floor()
        )));
    }

    Ok(Feasibility {
        months: required_months.floor().max(0.0) as u32,
        required_months,
        monthly_savings,
    })
}
