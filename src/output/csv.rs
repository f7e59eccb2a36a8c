use anyhow::Result;

use crate::history::HistorySummary;
use crate::report::{NormalizedResult, OptimizationView};
use crate::types::{Food, Technique};

pub fn diet_to_csv(view: &OptimizationView) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["technique", "food", "qty", "score", "cost"])?;
    let results: Vec<&NormalizedResult> = match view {
        OptimizationView::Single { result } => vec![result],
        OptimizationView::Comparison(cmp) => vec![&cmp.ga, &cmp.csp],
    };
    for result in results {
        let Some(record) = result.record() else {
            continue;
        };
        let technique = technique_slug(record.technique);
        for item in &record.items {
            writer.write_record([
                technique.to_string(),
                item.food.clone(),
                item.qty.to_string(),
                format!("{:.2}", record.score),
                record.cost.map(|c| format!("{c:.2}")).unwrap_or_default(),
            ])?;
        }
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn history_to_csv(summary: &HistorySummary) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["label", "technique", "score", "foods", "cost"])?;
    for (row, point) in summary.rows.iter().zip(&summary.cost_series) {
        writer.write_record([
            row.label.clone(),
            technique_slug(row.technique).to_string(),
            format!("{:.2}", row.score),
            row.foods.clone(),
            format!("{:.2}", point.cost),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn foods_to_csv(foods: &[Food]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["name", "calories", "protein", "carbs", "fat", "price"])?;
    for food in foods {
        writer.write_record([
            food.name.clone(),
            food.calories.to_string(),
            food.protein.to_string(),
            food.carbs.to_string(),
            food.fat.to_string(),
            food.price.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

fn technique_slug(technique: Option<Technique>) -> &'static str {
    technique.map(|t| t.as_slug()).unwrap_or_default()
}
