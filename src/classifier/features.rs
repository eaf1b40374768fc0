use crate::error::PlanError;
use crate::types::FinancialProfile;

pub const FEATURE_COUNT: usize = 7;

pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "income",
    "housing",
    "food",
    "transportation",
    "non-essential",
    "health",
    "university",
];

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    columns: Vec<(String, f64)>,
}

impl FeatureVector {
    pub fn from_profile(profile: &FinancialProfile) -> Result<Self, PlanError> {
        if !profile.income.is_finite() {
            return Err(PlanError::data("'income' must be provided as a number"));
        }
        let mut columns = Vec::with_capacity(profile.expenses.len() + 1);
        columns.push(("income".to_string(), profile.income));
        for expense in &profile.expenses {
            let column = match expense.category() {
                Some(category) => category.as_slug().to_string(),
                None => normalize_column(&expense.tag),
            };
            columns.push((column, expense.amount));
        }
        Ok(Self { columns })
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| *value)
    }

    pub fn model_row(&self) -> [f64; FEATURE_COUNT] {
        let mut row = [0.0; FEATURE_COUNT];
        for (slot, name) in row.iter_mut().zip(FEATURE_COLUMNS) {
            *slot = self.get(name).unwrap_or(0.0);
        }
        row
    }
}

pub fn normalize_column(tag: &str) -> String {
    tag.to_lowercase().replace(' ', "_")
}
