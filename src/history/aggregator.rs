use std::collections::HashMap;

use crate::history::{CostPoint, FoodUsage, HistoryRow, HistorySummary};
use crate::report::format::{format_cost, format_score, format_timestamp};
use crate::types::{DietItem, HistoryEntry, OptimizationResult, Technique};

pub fn aggregate_history(entries: &[HistoryEntry]) -> HistorySummary {
    let mut summary = HistorySummary::default();
    let mut usage_index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let timestamp = format_timestamp(entry.created_at());
        for (technique, result) in entry.contributions() {
            let label = contribution_label(&timestamp, technique);
            accumulate_usage(&mut summary.food_usage, &mut usage_index, result.items());

            let score = result.score_or_zero();
            summary.best_score = Some(match summary.best_score {
                Some(best) => best.max(score),
                None => score,
            });

            summary.cost_series.push(CostPoint {
                label: label.clone(),
                cost: result.cost_or_zero(),
            });
            summary.rows.push(history_row(label, technique, result, score));
        }
    }

    summary.most_used_food = most_used_food(&summary.food_usage).map(|u| u.food.clone());
    summary
}

// Ties go to the food seen first.
pub fn most_used_food(usage: &[FoodUsage]) -> Option<&FoodUsage> {
    let mut best: Option<&FoodUsage> = None;
    for candidate in usage {
        match best {
            Some(current) if candidate.total_qty <= current.total_qty => {}
            _ => best = Some(candidate),
        }
    }
    best
}

pub fn summarize_history(summary: &HistorySummary) -> String {
    let Some(best) = summary.best_score else {
        return "No history records found.".to_string();
    };
    format!(
        "Best Score: {} | Most Used Food: {}",
        format_score(best),
        summary.most_used_food.as_deref().unwrap_or("-")
    )
}

fn accumulate_usage(
    usage: &mut Vec<FoodUsage>,
    index: &mut HashMap<String, usize>,
    items: &[DietItem],
) {
    for item in items {
        let qty = if item.qty.is_finite() { item.qty } else { 0.0 };
        match index.get(&item.food) {
            Some(&slot) => usage[slot].total_qty += qty,
            None => {
                index.insert(item.food.clone(), usage.len());
                usage.push(FoodUsage {
                    food: item.food.clone(),
                    total_qty: qty,
                });
            }
        }
    }
}

fn contribution_label(timestamp: &str, technique: Option<Technique>) -> String {
    match technique {
        Some(technique) => format!("{timestamp} ({technique})"),
        None => timestamp.to_string(),
    }
}

fn history_row(
    label: String,
    technique: Option<Technique>,
    result: &OptimizationResult,
    score: f64,
) -> HistoryRow {
    let foods = result
        .items()
        .iter()
        .map(|item| item.food.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    HistoryRow {
        label,
        technique,
        score,
        score_text: format_score(score),
        foods,
        cost_text: format_cost(result.cost),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn single(diet: Vec<DietItem>, score: f64, cost: f64) -> HistoryEntry {
        HistoryEntry::Single {
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 9, 8, 15, 0).unwrap()),
            result: OptimizationResult::new(diet).with_score(score).with_cost(cost),
        }
    }

    fn dual() -> HistoryEntry {
        HistoryEntry::Dual {
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 10, 19, 0, 0).unwrap()),
            ga: OptimizationResult::new(vec![DietItem::new("Rice", 2.0)])
                .with_score(91.5)
                .with_cost(6.0),
            csp: OptimizationResult::new(vec![DietItem::new("Beans", 3.0)]).with_score(64.0),
        }
    }

    #[test]
    fn empty_history_is_identity() {
        let summary = aggregate_history(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary.best_score, None);
        assert!(summary.food_usage.is_empty());
        assert!(summary.cost_series.is_empty());
        assert_eq!(summary.most_used_food, None);
        assert_eq!(summarize_history(&summary), "No history records found.");
    }

    #[test]
    fn usage_is_a_plain_sum_including_duplicates() {
        let entries = vec![
            single(
                vec![
                    DietItem::new("Rice", 2.0),
                    DietItem::new("Eggs", 1.0),
                    DietItem::new("Rice", 1.5),
                ],
                50.0,
                4.0,
            ),
            single(vec![DietItem::new("Eggs", 4.0)], 40.0, 3.0),
        ];
        let summary = aggregate_history(&entries);
        assert_eq!(summary.usage_of("Rice"), Some(3.5));
        assert_eq!(summary.usage_of("Eggs"), Some(5.0));
        let total: f64 = summary.food_usage.iter().map(|u| u.total_qty).sum();
        assert_eq!(total, 8.5);
        assert_eq!(summary.most_used_food.as_deref(), Some("Eggs"));
    }

    #[test]
    fn dual_entries_contribute_two_rows_and_samples() {
        let entries = vec![single(vec![DietItem::new("Oats", 1.0)], 70.0, 5.0), dual()];
        let summary = aggregate_history(&entries);
        assert_eq!(summary.rows.len(), 3);
        assert_eq!(summary.cost_series.len(), 3);
        assert_eq!(summary.cost_series[0].label, "2024-03-09 08:15");
        assert_eq!(summary.cost_series[1].label, "2024-03-10 19:00 (GA)");
        assert_eq!(summary.cost_series[2].label, "2024-03-10 19:00 (CSP)");
        assert_eq!(summary.cost_series[2].cost, 0.0);
        assert_eq!(summary.rows[2].cost_text, "-");
        assert_eq!(summary.rows[1].technique, Some(Technique::Ga));
        assert_eq!(summary.best_score, Some(91.5));
        assert_eq!(
            summarize_history(&summary),
            "Best Score: 91.50 | Most Used Food: Beans"
        );
    }

    #[test]
    fn ties_go_to_the_first_food_seen() {
        let entries = vec![
            single(vec![DietItem::new("Tofu", 2.0)], 10.0, 1.0),
            single(
                vec![DietItem::new("Apple", 2.0), DietItem::new("Kale", 1.0)],
                12.0,
                1.0,
            ),
        ];
        let summary = aggregate_history(&entries);
        assert_eq!(summary.most_used_food.as_deref(), Some("Tofu"));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let entries = vec![dual(), single(vec![DietItem::new("Rice", 1.0)], 33.0, 2.5)];
        let first = aggregate_history(&entries);
        let second = aggregate_history(&entries);
        assert_eq!(first, second);
    }

    #[test]
    fn missing_score_counts_as_zero() {
        let entries = vec![HistoryEntry::Single {
            created_at: None,
            result: OptimizationResult::new(vec![DietItem::new("Milk", 1.0)]),
        }];
        let summary = aggregate_history(&entries);
        assert_eq!(summary.best_score, Some(0.0));
        assert_eq!(summary.rows[0].label, "-");
        assert_eq!(summary.rows[0].score_text, "0.00");
    }

    #[test]
    fn entry_without_diet_still_counts_as_a_run() {
        let entries = vec![HistoryEntry::Single {
            created_at: None,
            result: OptimizationResult::default().with_score(12.0),
        }];
        let summary = aggregate_history(&entries);
        assert!(!summary.is_empty());
        assert!(summary.food_usage.is_empty());
        assert_eq!(summary.most_used_food, None);
        assert_eq!(
            summarize_history(&summary),
            "Best Score: 12.00 | Most Used Food: -"
        );
    }
}
