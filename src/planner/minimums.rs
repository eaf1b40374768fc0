use serde::{Deserialize, Serialize};

use crate::planner::{Shortfall, AMOUNT_EPSILON};
use crate::types::{Category, MinimumsTable, Plan};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MinimumCheck {
    pub valid: bool,
    pub shortfall: Shortfall,
}

pub fn is_checked(category: Category, is_foreign: bool) -> bool {
    category != Category::Housing || is_foreign
}

pub fn below_minimum(actual: f64, minimum: f64) -> bool {
    actual + AMOUNT_EPSILON < minimum
}

pub fn check_minimums(
    plan: &Plan,
    income: f64,
    minimums: &MinimumsTable,
    is_foreign: bool,
) -> MinimumCheck {
    let mut shortfall = Shortfall::new();
    let mut valid = true;
    for (category, _) in plan.iter() {
        if !is_checked(category, is_foreign) {
            continue;
        }
        let Some(minimum) = minimums.get(category) else {
            continue;
        };
        let actual = plan.amount(category, income);
        shortfall.insert(category, minimum - actual);
        if below_minimum(actual, minimum) {
            valid = false;
        }
    }
    MinimumCheck { valid, shortfall }
}
