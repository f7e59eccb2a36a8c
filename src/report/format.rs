use chrono::{DateTime, Utc};

use crate::types::Nutrient;

pub const COST_PLACEHOLDER: &str = "-";
pub const TIMESTAMP_PLACEHOLDER: &str = "-";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn format_cost(cost: Option<f64>) -> String {
    match cost.filter(|c| c.is_finite()) {
        Some(cost) => format!("${cost:.2}"),
        None => COST_PLACEHOLDER.to_string(),
    }
}

pub fn format_money(value: f64) -> String {
    format!("${}", format_plain(value))
}

pub fn format_score(score: f64) -> String {
    format!("{score:.2}")
}

/// Shortest representation, so `2000.0` prints as `2000`.
pub fn format_plain(value: f64) -> String {
    format!("{value}")
}

pub fn format_amount(nutrient: Nutrient, value: f64) -> String {
    format!("{:.*}{}", nutrient.decimals(), value, nutrient.unit())
}

pub fn format_target(nutrient: Nutrient, value: f64) -> String {
    format!("{}{}", format_plain(value), nutrient.unit())
}

pub fn format_delta(nutrient: Nutrient, delta: f64) -> String {
    format!("{:+.*}{}", nutrient.decimals(), delta, nutrient.unit())
}

pub fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| TIMESTAMP_PLACEHOLDER.to_string())
}
