pub mod evaluator;

use serde::{Deserialize, Serialize};

use crate::types::Technique;

/// Costs closer than this are not worth a note.
pub const COST_NOTE_THRESHOLD: f64 = 0.01;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "result", content = "technique", rename_all = "snake_case")]
pub enum Outcome {
    Winner(Technique),
    Tie,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Verdict {
    pub outcome: Outcome,
    pub winner_label: String,
    pub ga_score: f64,
    pub csp_score: f64,
    pub score_analysis: String,
    pub cheaper: Option<Technique>,
    pub cost_analysis: Option<String>,
}
