use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::PlanError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Housing,
    Food,
    Transportation,
    NonEssential,
    Health,
    University,
    Savings,
}

impl Category {
    pub const EXPENSES: [Category; 6] = [
        Category::Housing,
        Category::Food,
        Category::Transportation,
        Category::NonEssential,
        Category::Health,
        Category::University,
    ];

    pub const ADJUSTABLE: [Category; 3] = [
        Category::NonEssential,
        Category::Health,
        Category::Transportation,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Housing => "housing",
            Self::Food => "food",
            Self::Transportation => "transportation",
            Self::NonEssential => "non-essential",
            Self::Health => "health",
            Self::University => "university",
            Self::Savings => "savings",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown category: {0}")]
pub struct CategoryParseError(pub String);

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "housing" => Ok(Self::Housing),
            "food" => Ok(Self::Food),
            "transportation" => Ok(Self::Transportation),
            "non-essential" => Ok(Self::NonEssential),
            "health" => Ok(Self::Health),
            "university" => Ok(Self::University),
            "savings" => Ok(Self::Savings),
            _ => Err(CategoryParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    #[serde(rename = "type")]
    pub tag: String,
    #[serde(rename = "expense", default)]
    pub amount: f64,
}

impl Expense {
    pub fn new(tag: impl Into<String>, amount: f64) -> Self {
        Self {
            tag: tag.into(),
            amount,
        }
    }

    pub fn category(&self) -> Option<Category> {
        self.tag.parse().ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialProfile {
    pub income: f64,
    pub prior_savings: f64,
    pub expenses: Vec<Expense>,
}

impl FinancialProfile {
    pub fn pays_housing(&self) -> bool {
        self.expenses
            .iter()
            .any(|e| e.category() == Some(Category::Housing) && e.amount > 0.0)
    }

    pub fn missing_categories(&self) -> Vec<Category> {
        Category::EXPENSES
            .into_iter()
            .filter(|c| !self.expenses.iter().any(|e| e.category() == Some(*c)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub amount: f64,
    pub duration_months: u32,
    pub label: String,
}

impl Goal {
    pub fn effective_amount(&self, prior_savings: f64) -> f64 {
        self.amount - prior_savings
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan(BTreeMap<Category, f64>);

impl Plan {
    pub fn from_entries(entries: impl IntoIterator<Item = (Category, f64)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn get(&self, category: Category) -> f64 {
        self.0.get(&category).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, category: Category) -> bool {
        self.0.contains_key(&category)
    }

    pub fn savings(&self) -> f64 {
        self.get(Category::Savings)
    }

    pub fn amount(&self, category: Category, income: f64) -> f64 {
        income * self.get(category) / 100.0
    }

    pub fn shift(&mut self, from: Category, to: Category, percent: f64) {
        *self.0.entry(from).or_insert(0.0) -= percent;
        *self.0.entry(to).or_insert(0.0) += percent;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.0.iter().map(|(c, p)| (*c, *p))
    }

    pub fn categories(&self) -> Vec<Category> {
        self.0.keys().copied().collect()
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinimumsTable(BTreeMap<Category, f64>);

impl MinimumsTable {
    pub fn from_entries(entries: impl IntoIterator<Item = (Category, f64)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn get(&self, category: Category) -> Option<f64> {
        self.0.get(&category).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateTable(BTreeMap<String, Plan>);

impl TemplateTable {
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Plan)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn get(&self, key: &str) -> Option<&Plan> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Plan)> {
        self.0.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanRequest {
    pub income: Option<f64>,
    pub last_saving: Option<f64>,
    pub expenses: Option<Vec<Expense>>,
    pub goal: Option<f64>,
    pub duration: Option<u32>,
    pub goal_name: Option<String>,
}

impl PlanRequest {
    pub fn validate(&self) -> Result<(FinancialProfile, Goal), PlanError> {
        let mut missing = Vec::new();
        if self.income.is_none() {
            missing.push("income");
        }
        if self.last_saving.is_none() {
            missing.push("last_saving");
        }
        if self.expenses.is_none() {
            missing.push("expenses");
        }
        if self.goal.is_none() {
            missing.push("goal");
        }
        if self.duration.is_none() {
            missing.push("duration");
        }
        if self.goal_name.is_none() {
            missing.push("goal_name");
        }
        if !missing.is_empty() {
            return Err(PlanError::data(format!(
                "required fields are missing: {}",
                missing.join(", ")
            )));
        }

        let income = self.income.unwrap_or_default();
        if !income.is_finite() || income <= 0.0 {
            return Err(PlanError::data("income must be a positive number"));
        }
        let duration = self.duration.unwrap_or_default();
        if duration == 0 {
            return Err(PlanError::data("duration must be at least one month"));
        }

        let profile = FinancialProfile {
            income,
            prior_savings: self.last_saving.unwrap_or_default(),
            expenses: self.expenses.clone().unwrap_or_default(),
        };
        let missing_categories = profile.missing_categories();
        if !missing_categories.is_empty() {
            let names = missing_categories
                .iter()
                .map(Category::as_slug)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(PlanError::data(format!(
                "missing expense categories: {names}"
            )));
        }

        let goal = Goal {
            amount: self.goal.unwrap_or_default(),
            duration_months: duration,
            label: self.goal_name.clone().unwrap_or_default(),
        };
        Ok((profile, goal))
    }
}
