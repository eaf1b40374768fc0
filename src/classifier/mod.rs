pub mod features;
pub mod rules;
pub mod tree;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::classifier::features::{FeatureVector, FEATURE_COUNT};
use crate::classifier::rules::RuleTable;
use crate::error::PlanError;
use crate::types::FinancialProfile;

pub use features::FEATURE_COLUMNS;
pub use rules::{RangeCondition, Rule, RuleRow};
pub use tree::{DecisionTree, TreeNode};

pub trait FeatureModel: Send + Sync {
    fn predict(&self, row: &[f64; FEATURE_COUNT]) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    Feature,
    Rule,
}

impl ClassifierKind {
    pub const ALL: [ClassifierKind; 2] = [ClassifierKind::Feature, ClassifierKind::Rule];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Rule => "rule",
        }
    }
}

impl Display for ClassifierKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Feature => "Decision tree",
            Self::Rule => "Association rules",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown classifier strategy: {0}")]
pub struct ClassifierKindParseError(pub String);

impl FromStr for ClassifierKind {
    type Err = ClassifierKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "feature" | "dt" | "tree" | "decision-tree" => Ok(Self::Feature),
            "rule" | "rules" | "apriori" => Ok(Self::Rule),
            _ => Err(ClassifierKindParseError(s.to_string())),
        }
    }
}

pub struct ClassifierBundle {
    pub model: Box<dyn FeatureModel>,
    pub rules: RuleTable,
}

impl ClassifierBundle {
    pub fn new(model: Box<dyn FeatureModel>, rules: RuleTable) -> Self {
        Self { model, rules }
    }

    pub fn classifier(&self, kind: ClassifierKind) -> Classifier<'_> {
        match kind {
            ClassifierKind::Feature => Classifier::Feature(self.model.as_ref()),
            ClassifierKind::Rule => Classifier::Rule(&self.rules),
        }
    }
}

#[derive(Clone, Copy)]
pub enum Classifier<'a> {
    Feature(&'a dyn FeatureModel),
    Rule(&'a RuleTable),
}

impl Classifier<'_> {
    pub fn kind(&self) -> ClassifierKind {
        match self {
            Self::Feature(_) => ClassifierKind::Feature,
            Self::Rule(_) => ClassifierKind::Rule,
        }
    }

    pub fn classify(&self, profile: &FinancialProfile) -> Result<String, PlanError> {
        let features = FeatureVector::from_profile(profile)?;
        let class = match self {
            Self::Feature(model) => model.predict(&features.model_row()).map_err(|e| {
                warn!("feature model failed: {e:#}");
                PlanError::Classification(format!("Error during classification: {e}"))
            })?,
            Self::Rule(table) => table.classify(&features)?,
        };
        debug!(strategy = self.kind().as_slug(), %class, "profile classified");
        Ok(class)
    }
}
