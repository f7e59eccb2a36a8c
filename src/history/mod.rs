pub mod aggregator;

use serde::{Deserialize, Serialize};

use crate::types::Technique;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodUsage {
    pub food: String,
    pub total_qty: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostPoint {
    pub label: String,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRow {
    pub label: String,
    pub technique: Option<Technique>,
    pub score: f64,
    pub score_text: String,
    pub foods: String,
    pub cost_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HistorySummary {
    pub rows: Vec<HistoryRow>,
    pub best_score: Option<f64>,
    pub food_usage: Vec<FoodUsage>,
    pub most_used_food: Option<String>,
    pub cost_series: Vec<CostPoint>,
}

impl HistorySummary {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn usage_of(&self, food: &str) -> Option<f64> {
        self.food_usage
            .iter()
            .find(|usage| usage.food == food)
            .map(|usage| usage.total_qty)
    }
}
