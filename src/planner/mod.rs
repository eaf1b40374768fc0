pub mod arbiter;
pub mod feasibility;
pub mod minimums;
pub mod orchestrator;
pub mod redistribute;
pub mod selector;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierKind;
use crate::error::{PlanError, PlanStatus};
use crate::types::{Category, Plan};

pub type Shortfall = BTreeMap<Category, f64>;

pub(crate) const AMOUNT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResult {
    pub status: PlanStatus,
    pub message: String,
    pub strategy: Option<ClassifierKind>,
    pub template_key: Option<String>,
    pub goal_label: Option<String>,
    pub effective_goal: Option<f64>,
    pub plan: Option<Plan>,
    pub months_to_goal: Option<u32>,
    #[serde(default)]
    pub shortfall: Shortfall,
    #[serde(default)]
    pub adjustments: Vec<AdjustmentStep>,
    #[serde(default)]
    pub transfers: Vec<Transfer>,
    pub details: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl PlanResult {
    pub fn new(status: PlanStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            strategy: None,
            template_key: None,
            goal_label: None,
            effective_goal: None,
            plan: None,
            months_to_goal: None,
            shortfall: Shortfall::new(),
            adjustments: Vec::new(),
            transfers: Vec::new(),
            details: None,
            generated_at: Utc::now(),
        }
    }

    pub fn from_error(error: &PlanError) -> Self {
        Self::new(error.status(), error.message())
    }

    pub fn with_strategy(mut self, strategy: ClassifierKind) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_template_key(mut self, key: impl Into<String>) -> Self {
        self.template_key = Some(key.into());
        self
    }

    pub fn with_goal(mut self, label: impl Into<String>, effective_goal: f64) -> Self {
        self.goal_label = Some(label.into());
        self.effective_goal = Some(effective_goal);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdjustmentStep {
    pub field: Category,
    pub moved_percent: f64,
    pub savings_after: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transfer {
    pub from: Category,
    pub to: Category,
    pub amount: f64,
    pub percent: f64,
    pub donor_before: f64,
    pub donor_surplus: f64,
    pub deficit_before: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentStage {
    CheckingSavings,
    Adjusting,
    CheckingMinimums,
    Redistributing,
    Final,
}

impl Display for AdjustmentStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::CheckingSavings => "checking-savings",
            Self::Adjusting => "adjusting",
            Self::CheckingMinimums => "checking-minimums",
            Self::Redistributing => "redistributing",
            Self::Final => "final",
        };
        write!(f, "{display}")
    }
}
