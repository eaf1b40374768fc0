use tracing::{debug, info};

use crate::classifier::Classifier;
use crate::error::{PlanError, PlanStatus};
use crate::planner::feasibility::{verify_savings, Feasibility};
use crate::planner::minimums::check_minimums;
use crate::planner::redistribute::redistribute;
use crate::planner::selector::assign_plan;
use crate::planner::{AdjustmentStage, AdjustmentStep, PlanResult, Shortfall, Transfer};
use crate::types::{Category, FinancialProfile, Goal, MinimumsTable, Plan, TemplateTable};

#[derive(Debug, Clone)]
pub struct Adjusted {
    pub plan: Plan,
    pub outcome: Result<Feasibility, PlanError>,
    pub shortfall: Shortfall,
    pub adjustments: Vec<AdjustmentStep>,
    pub transfers: Vec<Transfer>,
    pub stages: Vec<AdjustmentStage>,
}

pub fn reduce_field(
    plan: &mut Plan,
    field: Category,
    income: f64,
    minimums: &MinimumsTable,
) -> Option<AdjustmentStep> {
    let moved_percent = match field {
        // no protected floor: always halved
        Category::NonEssential => plan.get(field) / 2.0,
        _ => {
            let minimum = minimums.get(field)?;
            let current = plan.amount(field, income);
            if current <= minimum {
                return None;
            }
            let reduction = (current / 2.0).min(current - minimum);
            reduction / income * 100.0
        }
    };
    if moved_percent <= 0.0 {
        return None;
    }
    plan.shift(field, Category::Savings, moved_percent);
    debug!(field = %field, moved_percent, savings = plan.savings(), "adjusted");
    Some(AdjustmentStep {
        field,
        moved_percent,
        savings_after: plan.savings(),
    })
}

pub fn adjust_and_verify(
    template: &Plan,
    income: f64,
    goal_amount: f64,
    max_months: u32,
    minimums: &MinimumsTable,
) -> Adjusted {
    let mut plan = template.clone();
    let mut stages = vec![AdjustmentStage::CheckingSavings];
    let mut adjustments = Vec::new();
    let mut transfers = Vec::new();

    let mut savings_check = verify_savings(plan.savings(), income, goal_amount, max_months);
    if savings_check.is_err() {
        stages.push(AdjustmentStage::Adjusting);
        for field in Category::ADJUSTABLE {
            if savings_check.is_ok() {
                break;
            }
            if let Some(step) = reduce_field(&mut plan, field, income, minimums) {
                adjustments.push(step);
            }
            savings_check = verify_savings(plan.savings(), income, goal_amount, max_months);
        }
    }

    // the adjusted plan's housing share stands in for "pays housing abroad"
    let is_foreign = plan.get(Category::Housing) > 0.0;
    stages.push(AdjustmentStage::CheckingMinimums);
    let mut check = check_minimums(&plan, income, minimums, is_foreign);

    if !check.valid {
        stages.push(AdjustmentStage::Redistributing);
        let redistribution =
            redistribute(&plan, income, minimums, &Category::ADJUSTABLE, is_foreign);
        check = check_minimums(&redistribution.plan, income, minimums, is_foreign);
        let failure = redistribution.error();
        transfers = redistribution.transfers;
        plan = redistribution.plan;
        if let Some(error) = failure {
            stages.push(AdjustmentStage::Final);
            return Adjusted {
                plan,
                outcome: Err(error),
                shortfall: check.shortfall,
                adjustments,
                transfers,
                stages,
            };
        }
        savings_check = verify_savings(plan.savings(), income, goal_amount, max_months);
    }

    stages.push(AdjustmentStage::Final);
    let outcome = match savings_check {
        Ok(feasibility) if check.valid => Ok(feasibility),
        Ok(_) => Err(PlanError::calc("Plan does not meet the minimum expenses.")),
        Err(error) => Err(error),
    };

    Adjusted {
        plan,
        outcome,
        shortfall: check.shortfall,
        adjustments,
        transfers,
        stages,
    }
}

pub fn plan_with_strategy(
    profile: &FinancialProfile,
    goal: &Goal,
    templates: &TemplateTable,
    minimums: &MinimumsTable,
    classifier: Classifier<'_>,
) -> PlanResult {
    let strategy = classifier.kind();
    let effective_goal = goal.effective_amount(profile.prior_savings);
    let failure = |error: &PlanError| {
        PlanResult::from_error(error)
            .with_strategy(strategy)
            .with_goal(goal.label.clone(), effective_goal)
    };

    if !profile.income.is_finite() || profile.income <= 0.0 {
        return failure(&PlanError::data("income must be a positive number"));
    }

    let class = match classifier.classify(profile) {
        Ok(class) => class,
        Err(error) => return failure(&error),
    };
    let (key, template) = match assign_plan(profile, &class, templates) {
        Ok(found) => found,
        Err(error) => return failure(&error),
    };

    let adjusted = adjust_and_verify(
        &template,
        profile.income,
        effective_goal,
        goal.duration_months,
        minimums,
    );

    let mut result = match &adjusted.outcome {
        Ok(feasibility) => {
            let mut result = PlanResult::new(PlanStatus::Success, "Plan successfully created")
                .with_details(feasibility.message());
            result.months_to_goal = Some(feasibility.months);
            result
        }
        Err(error) => PlanResult::from_error(error),
    };
    result = result
        .with_strategy(strategy)
        .with_template_key(key)
        .with_goal(goal.label.clone(), effective_goal);
    result.plan = Some(adjusted.plan);
    result.shortfall = adjusted.shortfall;
    result.adjustments = adjusted.adjustments;
    result.transfers = adjusted.transfers;

    info!(
        strategy = strategy.as_slug(),
        status = result.status.as_tag(),
        months = ?result.months_to_goal,
        "plan computed"
    );
    result
}
