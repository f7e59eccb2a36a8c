use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Technique {
    Ga,
    Csp,
    Both,
}

impl Technique {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Ga => "ga",
            Self::Csp => "csp",
            Self::Both => "both",
        }
    }
}

impl Display for Technique {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Ga => "GA",
            Self::Csp => "CSP",
            Self::Both => "Both",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown technique: {0}")]
pub struct TechniqueParseError(pub String);

impl FromStr for Technique {
    type Err = TechniqueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "ga" | "genetic" => Ok(Self::Ga),
            "csp" | "constraint" => Ok(Self::Csp),
            "both" | "compare" => Ok(Self::Both),
            _ => Err(TechniqueParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Food {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub price: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidFood {
    #[error("food name cannot be empty")]
    EmptyName,
    #[error("{field} must be a non-negative number, got {value}")]
    Negative { field: &'static str, value: f64 },
}

impl Food {
    pub fn validate(&self) -> Result<(), InvalidFood> {
        if self.name.trim().is_empty() {
            return Err(InvalidFood::EmptyName);
        }
        let fields = [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
            ("price", self.price),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(InvalidFood::Negative { field, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DietItem {
    pub food: String,
    pub qty: f64,
}

impl DietItem {
    pub fn new(food: impl Into<String>, qty: f64) -> Self {
        Self {
            food: food.into(),
            qty,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Targets {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Default for Targets {
    fn default() -> Self {
        Self {
            calories: 2000.0,
            protein: 100.0,
            carbs: 250.0,
            fat: 70.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Totals {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Calories,
    Protein,
    Carbs,
    Fat,
}

impl Nutrient {
    pub const ALL: [Nutrient; 4] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Carbs,
        Nutrient::Fat,
    ];

    pub fn unit(self) -> &'static str {
        match self {
            Self::Calories => "",
            Self::Protein | Self::Carbs | Self::Fat => "g",
        }
    }

    pub fn decimals(self) -> usize {
        match self {
            Self::Calories => 0,
            Self::Protein | Self::Carbs | Self::Fat => 1,
        }
    }

    pub fn target(self, targets: &Targets) -> f64 {
        match self {
            Self::Calories => targets.calories,
            Self::Protein => targets.protein,
            Self::Carbs => targets.carbs,
            Self::Fat => targets.fat,
        }
    }

    pub fn achieved(self, totals: &Totals) -> Option<f64> {
        match self {
            Self::Calories => totals.calories,
            Self::Protein => totals.protein,
            Self::Carbs => totals.carbs,
            Self::Fat => totals.fat,
        }
    }
}

impl Display for Nutrient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Calories => "Calories",
            Self::Protein => "Protein",
            Self::Carbs => "Carbs",
            Self::Fat => "Fat",
        };
        write!(f, "{display}")
    }
}

// `diet: None` means the payload carried no diet; `Some(vec![])` is an empty answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OptimizationResult {
    pub diet: Option<Vec<DietItem>>,
    pub totals: Totals,
    pub cost: Option<f64>,
    pub score: Option<f64>,
    pub technique: Option<Technique>,
}

impl OptimizationResult {
    pub fn new(diet: Vec<DietItem>) -> Self {
        Self {
            diet: Some(diet),
            ..Self::default()
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_totals(mut self, totals: Totals) -> Self {
        self.totals = totals;
        self
    }

    pub fn with_technique(mut self, technique: Technique) -> Self {
        self.technique = Some(technique);
        self
    }

    pub fn items(&self) -> &[DietItem] {
        self.diet.as_deref().unwrap_or_default()
    }

    pub fn has_solution(&self) -> bool {
        !self.items().is_empty()
    }

    pub fn score_or_zero(&self) -> f64 {
        self.score.filter(|s| s.is_finite()).unwrap_or(0.0)
    }

    pub fn cost_or_zero(&self) -> f64 {
        self.cost.filter(|c| c.is_finite()).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonPayload {
    pub ga: OptimizationResult,
    pub csp: OptimizationResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizeOutcome {
    Single(OptimizationResult),
    Comparison(ComparisonPayload),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverParams {
    pub population_size: u32,
    pub generations: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_qty_per_food: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            population_size: 30,
            generations: 50,
            mutation_rate: None,
            max_qty_per_food: None,
            tolerance: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizeRequest {
    pub targets: Targets,
    pub budget: f64,
    pub technique: Technique,
    #[serde(flatten)]
    pub params: SolverParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryEntry {
    Single {
        created_at: Option<DateTime<Utc>>,
        result: OptimizationResult,
    },
    Dual {
        created_at: Option<DateTime<Utc>>,
        ga: OptimizationResult,
        csp: OptimizationResult,
    },
}

impl HistoryEntry {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Single { created_at, .. } | Self::Dual { created_at, .. } => *created_at,
        }
    }

    pub fn contributions(&self) -> Vec<(Option<Technique>, &OptimizationResult)> {
        match self {
            Self::Single { result, .. } => vec![(None, result)],
            Self::Dual { ga, csp, .. } => {
                vec![(Some(Technique::Ga), ga), (Some(Technique::Csp), csp)]
            }
        }
    }
}
