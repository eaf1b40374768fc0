//! Shared fixtures for unit tests.

use crate::classifier::rules::{RuleRow, RuleTable};
use crate::classifier::tree::{DecisionTree, TreeNode};
use crate::classifier::ClassifierBundle;
use crate::types::{
    Category, Expense, FinancialProfile, Goal, MinimumsTable, Plan, PlanRequest, TemplateTable,
};

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= 1e-6,
        "expected {expected}, got {actual}"
    );
}

pub fn sample_expenses() -> Vec<Expense> {
    vec![
        Expense::new("housing", 900.0),
        Expense::new("food", 450.0),
        Expense::new("transportation", 200.0),
        Expense::new("non-essential", 300.0),
        Expense::new("health", 100.0),
        Expense::new("university", 200.0),
    ]
}

pub fn sample_profile() -> FinancialProfile {
    FinancialProfile {
        income: 3000.0,
        prior_savings: 0.0,
        expenses: sample_expenses(),
    }
}

pub fn sample_goal() -> Goal {
    Goal {
        amount: 2000.0,
        duration_months: 24,
        label: "Emergency fund".to_string(),
    }
}

pub fn sample_request() -> PlanRequest {
    PlanRequest {
        income: Some(3000.0),
        last_saving: Some(0.0),
        expenses: Some(sample_expenses()),
        goal: Some(2000.0),
        duration: Some(24),
        goal_name: Some("Emergency fund".to_string()),
    }
}

pub fn sample_minimums() -> MinimumsTable {
    MinimumsTable::from_entries([
        (Category::Housing, 500.0),
        (Category::Food, 300.0),
        (Category::Transportation, 120.0),
        (Category::Health, 90.0),
        (Category::University, 150.0),
    ])
}

fn template(percentages: [f64; 7]) -> Plan {
    let [housing, food, transportation, non_essential, health, university, savings] = percentages;
    Plan::from_entries([
        (Category::Housing, housing),
        (Category::Food, food),
        (Category::Transportation, transportation),
        (Category::NonEssential, non_essential),
        (Category::Health, health),
        (Category::University, university),
        (Category::Savings, savings),
    ])
}

pub fn sample_templates() -> TemplateTable {
    TemplateTable::from_entries([
        ("1A".to_string(), template([30.0, 20.0, 10.0, 15.0, 10.0, 10.0, 5.0])),
        ("1B".to_string(), template([0.0, 25.0, 15.0, 20.0, 10.0, 15.0, 15.0])),
        ("2A".to_string(), template([25.0, 15.0, 10.0, 20.0, 10.0, 10.0, 10.0])),
        ("2B".to_string(), template([0.0, 20.0, 15.0, 25.0, 10.0, 15.0, 15.0])),
        ("3A".to_string(), template([30.0, 20.0, 10.0, 19.0, 10.0, 10.0, 1.0])),
        ("4B".to_string(), template([0.0, 8.0, 12.0, 25.0, 10.0, 15.0, 30.0])),
    ])
}

pub fn sample_rule_rows() -> Vec<RuleRow> {
    vec![
        RuleRow::new(
            "('income/2000-4000',) / '1'",
            "('food/200-700', 'housing/500-1200')",
        ),
        RuleRow::new("('income/2000-4000',) / '1'", "('transportation/100-300',)"),
        RuleRow::new("('income/0-2000',) / '2'", "('income/0-2000',)"),
        RuleRow::new("('food/0-300',) / '2'", "('food/0-300', 'health/0-200')"),
        RuleRow::new("('university/100-300',) / '2'", "('university/100-300',)"),
    ]
}

/// Income at or below 2500 is class "2", above is class "1".
pub fn sample_tree() -> DecisionTree {
    DecisionTree {
        nodes: vec![
            TreeNode::Split {
                feature: 0,
                threshold: 2500.0,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf {
                class: "2".to_string(),
            },
            TreeNode::Leaf {
                class: "1".to_string(),
            },
        ],
    }
}

pub fn sample_bundle() -> ClassifierBundle {
    ClassifierBundle::new(
        Box::new(sample_tree()),
        RuleTable::from_rows(&sample_rule_rows()).expect("sample rules"),
    )
}
