use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{info, warn};

use crate::classifier::{ClassifierBundle, ClassifierKind};
use crate::error::PlanStatus;
use crate::planner::orchestrator::plan_with_strategy;
use crate::planner::PlanResult;
use crate::types::{FinancialProfile, Goal, MinimumsTable, TemplateTable};

pub fn create_plan(
    profile: &FinancialProfile,
    goal: &Goal,
    templates: &TemplateTable,
    minimums: &MinimumsTable,
    classifiers: &ClassifierBundle,
) -> PlanResult {
    let run = |kind: ClassifierKind| {
        run_guarded(kind, || {
            plan_with_strategy(
                profile,
                goal,
                templates,
                minimums,
                classifiers.classifier(kind),
            )
        })
    };
    let feature = run(ClassifierKind::Feature);
    let rule = run(ClassifierKind::Rule);
    choose(feature, rule)
}

pub fn choose(feature: PlanResult, rule: PlanResult) -> PlanResult {
    let chosen = match (feature.is_success(), rule.is_success()) {
        (true, true) => {
            let feature_months = feature.months_to_goal.unwrap_or(u32::MAX);
            let rule_months = rule.months_to_goal.unwrap_or(u32::MAX);
            if feature_months <= rule_months {
                feature
            } else {
                rule
            }
        }
        (false, true) => rule,
        _ => feature,
    };
    info!(
        strategy = ?chosen.strategy,
        status = chosen.status.as_tag(),
        "plan selected"
    );
    chosen
}

fn run_guarded(kind: ClassifierKind, run: impl FnOnce() -> PlanResult) -> PlanResult {
    match panic::catch_unwind(AssertUnwindSafe(run)) {
        Ok(result) => result,
        Err(payload) => {
            let details = panic_message(payload.as_ref());
            warn!(strategy = kind.as_slug(), %details, "plan computation panicked");
            PlanResult::new(
                PlanStatus::ServerError,
                "An error occurred while processing the plan.",
            )
            .with_strategy(kind)
            .with_details(details)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
