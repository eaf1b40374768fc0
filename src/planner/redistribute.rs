use tracing::{debug, warn};

use crate::error::{PlanError, PlanStatus};
use crate::planner::minimums::{below_minimum, is_checked};
use crate::planner::{Transfer, AMOUNT_EPSILON};
use crate::types::{Category, MinimumsTable, Plan};

// cap on one transfer, as a share of the donor's current amount
pub const MAX_STEP_REDUCTION: f64 = 0.25;

#[derive(Debug, Clone)]
pub struct Redistribution {
    pub plan: Plan,
    pub transfers: Vec<Transfer>,
    pub unmet: Vec<(Category, f64)>,
}

impl Redistribution {
    pub fn status(&self) -> PlanStatus {
        if self.unmet.is_empty() {
            PlanStatus::Success
        } else {
            PlanStatus::CalcError
        }
    }

    pub fn error(&self) -> Option<PlanError> {
        if self.unmet.is_empty() {
            return None;
        }
        let fields = self
            .unmet
            .iter()
            .map(|(c, gap)| format!("{c} ({gap:.2})"))
            .collect::<Vec<_>>()
            .join(", ");
        Some(PlanError::calc(format!(
            "Redistribution failed to meet minimums: {fields}"
        )))
    }
}

pub fn deficit_fields(
    plan: &Plan,
    income: f64,
    minimums: &MinimumsTable,
    is_foreign: bool,
) -> Vec<Category> {
    plan.categories()
        .into_iter()
        .filter(|c| is_checked(*c, is_foreign))
        .filter(|c| {
            minimums
                .get(*c)
                .is_some_and(|min| below_minimum(plan.amount(*c, income), min))
        })
        .collect()
}

pub fn surplus_fields(
    plan: &Plan,
    income: f64,
    minimums: &MinimumsTable,
    adjustable: &[Category],
    is_foreign: bool,
) -> Vec<Category> {
    plan.categories()
        .into_iter()
        .filter(|c| !adjustable.contains(c) && is_checked(*c, is_foreign))
        .filter(|c| {
            minimums
                .get(*c)
                .is_some_and(|min| plan.amount(*c, income) > min)
        })
        .collect()
}

pub fn redistribute(
    plan: &Plan,
    income: f64,
    minimums: &MinimumsTable,
    adjustable: &[Category],
    is_foreign: bool,
) -> Redistribution {
    let mut plan = plan.clone();
    let mut transfers = Vec::new();
    let mut unmet = Vec::new();

    let deficits = deficit_fields(&plan, income, minimums, is_foreign);
    let donors = surplus_fields(&plan, income, minimums, adjustable, is_foreign);

    for field in deficits {
        let Some(minimum) = minimums.get(field) else {
            continue;
        };
        let mut deficit = minimum - plan.amount(field, income);

        for donor in &donors {
            let Some(donor_minimum) = minimums.get(*donor) else {
                continue;
            };
            let donor_before = plan.amount(*donor, income);
            let surplus = donor_before - donor_minimum;
            if surplus > 0.0 {
                let amount = surplus
                    .min(deficit)
                    .min(donor_before * MAX_STEP_REDUCTION)
                    .max(0.0);
                let percent = amount / income * 100.0;
                plan.shift(*donor, field, percent);
                debug!(from = %donor, to = %field, amount, "redistributed");
                transfers.push(Transfer {
                    from: *donor,
                    to: field,
                    amount,
                    percent,
                    donor_before,
                    donor_surplus: surplus,
                    deficit_before: deficit,
                });
                deficit -= amount;
            }
            if deficit <= AMOUNT_EPSILON {
                break;
            }
        }

        if deficit > AMOUNT_EPSILON {
            warn!(field = %field, deficit, "minimum not reachable by redistribution");
            unmet.push((field, deficit));
        }
    }

    Redistribution {
        plan,
        transfers,
        unmet,
    }
}
