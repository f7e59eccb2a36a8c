use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::types::{
    ComparisonPayload, DietItem, Food, HistoryEntry, OptimizationResult, OptimizeOutcome,
    Technique, Totals,
};

const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub fn parse_optimization_result(value: &Value) -> OptimizationResult {
    let Some(object) = value.as_object() else {
        return OptimizationResult::default();
    };
    OptimizationResult {
        diet: object_get_case_insensitive(object, "diet")
            .and_then(Value::as_array)
            .map(|items| parse_diet(items)),
        totals: object_get_case_insensitive(object, "totals")
            .and_then(Value::as_object)
            .map(parse_totals)
            .unwrap_or_default(),
        cost: number_field(object, "cost"),
        score: number_field(object, "score"),
        technique: string_field(object, "technique").and_then(|raw| raw.parse().ok()),
    }
}

pub fn parse_outcome(value: &Value, requested: Technique) -> Option<OptimizeOutcome> {
    match requested {
        Technique::Both => {
            let object = value.as_object()?;
            let ga = first_object(object, &["ga", "ga_result"])?;
            let csp = first_object(object, &["csp", "csp_result"])?;
            Some(OptimizeOutcome::Comparison(ComparisonPayload {
                ga: tag_technique(parse_optimization_result(ga), Technique::Ga),
                csp: tag_technique(parse_optimization_result(csp), Technique::Csp),
            }))
        }
        single => Some(OptimizeOutcome::Single(tag_technique(
            parse_optimization_result(value),
            single,
        ))),
    }
}

pub fn parse_history(value: &Value) -> Option<Vec<HistoryEntry>> {
    let entries = candidate_array(value)?;
    Some(entries.iter().map(parse_history_entry).collect())
}

pub fn parse_history_entry(value: &Value) -> HistoryEntry {
    let Some(object) = value.as_object() else {
        return HistoryEntry::Single {
            created_at: None,
            result: OptimizationResult::default(),
        };
    };
    let created_at = string_field(object, "created_at").and_then(|raw| parse_timestamp(&raw));
    match (
        first_object(object, &["ga_result", "ga"]),
        first_object(object, &["csp_result", "csp"]),
    ) {
        (Some(ga), Some(csp)) => HistoryEntry::Dual {
            created_at,
            ga: tag_technique(parse_optimization_result(ga), Technique::Ga),
            csp: tag_technique(parse_optimization_result(csp), Technique::Csp),
        },
        _ => HistoryEntry::Single {
            created_at,
            result: parse_optimization_result(value),
        },
    }
}

pub fn parse_foods(value: &Value) -> Option<Vec<Food>> {
    let entries = candidate_array(value)?;
    Some(
        entries
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|object| {
                let name = string_field(object, "name")?;
                Some(Food {
                    name,
                    calories: number_field(object, "calories").unwrap_or(0.0),
                    protein: number_field(object, "protein").unwrap_or(0.0),
                    carbs: number_field(object, "carbs").unwrap_or(0.0),
                    fat: number_field(object, "fat").unwrap_or(0.0),
                    price: number_field(object, "price").unwrap_or(0.0).max(0.0),
                })
            })
            .collect(),
    )
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| naive.and_utc())
}

// Every entry becomes an item so the diet length survives decoding.
fn parse_diet(items: &[Value]) -> Vec<DietItem> {
    items
        .iter()
        .map(|item| match item.as_object() {
            Some(object) => DietItem {
                food: food_name(object),
                qty: number_field(object, "qty").unwrap_or(0.0).max(0.0),
            },
            None => DietItem::new("", 0.0),
        })
        .collect()
}

fn food_name(object: &Map<String, Value>) -> String {
    match object_get_case_insensitive(object, "food") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn parse_totals(object: &Map<String, Value>) -> Totals {
    Totals {
        calories: number_field(object, "calories"),
        protein: number_field(object, "protein"),
        carbs: number_field(object, "carbs"),
        fat: number_field(object, "fat"),
    }
}

fn tag_technique(mut result: OptimizationResult, technique: Technique) -> OptimizationResult {
    if result.technique.is_none() {
        result.technique = Some(technique);
    }
    result
}

fn candidate_array(value: &Value) -> Option<&Vec<Value>> {
    if let Some(arr) = value.as_array() {
        return Some(arr);
    }
    let object = value.as_object()?;
    ["results", "items", "data", "foods"]
        .iter()
        .find_map(|key| object_get_case_insensitive(object, key).and_then(Value::as_array))
}

fn first_object<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object_get_case_insensitive(object, key))
        .find(|v| v.is_object())
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object_get_case_insensitive(object, key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// Numeric-looking strings do not count.
fn number_field(object: &Map<String, Value>, key: &str) -> Option<f64> {
    object_get_case_insensitive(object, key)?
        .as_f64()
        .filter(|v| v.is_finite())
}

fn object_get_case_insensitive<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).or_else(|| {
        object
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}
