pub mod format;
pub mod meals;
pub mod normalizer;
pub mod profile;

use serde::{Deserialize, Serialize};

use crate::comparison::evaluator::compare_results;
use crate::comparison::Verdict;
use crate::report::normalizer::normalize_result;
use crate::types::{DietItem, Nutrient, OptimizeOutcome, Targets, Technique};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutrientLine {
    pub nutrient: Nutrient,
    pub target: f64,
    pub achieved: f64,
    pub delta: f64,
    pub target_text: String,
    pub achieved_text: String,
    pub delta_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayRecord {
    pub technique: Option<Technique>,
    pub nutrients: Vec<NutrientLine>,
    pub budget_text: String,
    pub cost: Option<f64>,
    pub cost_text: String,
    pub items: Vec<DietItem>,
    pub score: f64,
    pub score_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NormalizedResult {
    NoSolution { technique: Option<Technique> },
    Solution(DisplayRecord),
}

impl NormalizedResult {
    pub fn record(&self) -> Option<&DisplayRecord> {
        match self {
            Self::Solution(record) => Some(record),
            Self::NoSolution { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonView {
    pub ga: NormalizedResult,
    pub csp: NormalizedResult,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizationView {
    Single { result: NormalizedResult },
    Comparison(ComparisonView),
}

pub fn build_view(outcome: &OptimizeOutcome, targets: &Targets, budget: f64) -> OptimizationView {
    match outcome {
        OptimizeOutcome::Single(result) => OptimizationView::Single {
            result: normalize_result(result, targets, budget),
        },
        OptimizeOutcome::Comparison(payload) => OptimizationView::Comparison(ComparisonView {
            ga: normalize_result(&payload.ga, targets, budget),
            csp: normalize_result(&payload.csp, targets, budget),
            verdict: compare_results(&payload.ga, &payload.csp),
        }),
    }
}
