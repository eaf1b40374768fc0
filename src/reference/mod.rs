pub mod loader;

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::classifier::{ClassifierBundle, ClassifierKind};
use crate::planner::arbiter::create_plan;
use crate::planner::orchestrator::plan_with_strategy;
use crate::planner::PlanResult;
use crate::types::{FinancialProfile, Goal, MinimumsTable, TemplateTable};

const TEMPLATE_TOTAL_TOLERANCE: f64 = 0.01;

pub struct ReferenceData {
    pub templates: TemplateTable,
    pub minimums: MinimumsTable,
    pub classifiers: ClassifierBundle,
}

impl ReferenceData {
    pub fn new(
        templates: TemplateTable,
        minimums: MinimumsTable,
        classifiers: ClassifierBundle,
    ) -> Self {
        let data = Self {
            templates,
            minimums,
            classifiers,
        };
        for warning in data.template_warnings() {
            warn!("{warning}");
        }
        data
    }

    pub fn create_plan(&self, profile: &FinancialProfile, goal: &Goal) -> PlanResult {
        create_plan(
            profile,
            goal,
            &self.templates,
            &self.minimums,
            &self.classifiers,
        )
    }

    pub fn plan_with(
        &self,
        kind: ClassifierKind,
        profile: &FinancialProfile,
        goal: &Goal,
    ) -> PlanResult {
        plan_with_strategy(
            profile,
            goal,
            &self.templates,
            &self.minimums,
            self.classifiers.classifier(kind),
        )
    }

    pub fn template_warnings(&self) -> Vec<String> {
        self.templates
            .iter()
            .filter_map(|(key, plan)| {
                let total = plan.total();
                ((total - 100.0).abs() > TEMPLATE_TOTAL_TOLERANCE)
                    .then(|| format!("template {key} allocates {total:.2}% of income"))
            })
            .collect()
    }

    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_string(&(
            &self.templates,
            &self.minimums,
            &self.classifiers.rules,
        ))
        .unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
