pub mod buffer;
pub mod surface;

use crate::binder::surface::{ChartHandle, ChartSeries, ChartSpec, Region, RegionContent, Surface};
use crate::comparison::Outcome;
use crate::history::aggregator::summarize_history;
use crate::history::HistorySummary;
use crate::report::format::{format_cost, format_plain};
use crate::report::meals::split_meals;
use crate::report::{ComparisonView, DisplayRecord, NormalizedResult, OptimizationView};
use crate::types::{DietItem, Food, Technique};

pub const OPTIMIZING_MESSAGE: &str = "Optimizing diet, please wait...";
pub const NO_SOLUTION_MESSAGE: &str = "No valid diet found for the given constraints.";

const RESULT_REGIONS: [Region; 4] = [
    Region::ResultSection,
    Region::ResultSummary,
    Region::ResultTable,
    Region::ResultScore,
];
const HISTORY_REGIONS: [Region; 3] = [
    Region::HistorySection,
    Region::HistoryTable,
    Region::HistoryBest,
];

#[derive(Debug, Default)]
pub struct Binder {
    nutrition_chart: Option<ChartHandle>,
    cost_chart: Option<ChartHandle>,
}

impl Binder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_optimization(&mut self, surface: &mut dyn Surface) {
        if !has_all(surface, &RESULT_REGIONS) {
            return;
        }
        surface.set_visible(Region::ResultSection, false);
        surface.write(Region::ResultSummary, RegionContent::info(OPTIMIZING_MESSAGE));
        surface.clear(Region::ResultTable);
        surface.clear(Region::ResultScore);
        surface.clear(Region::Comparison);
        surface.write(Region::Status, RegionContent::info(OPTIMIZING_MESSAGE));
    }

    pub fn render_view(&mut self, surface: &mut dyn Surface, view: &OptimizationView) {
        match view {
            OptimizationView::Single { result } => self.render_single(surface, result),
            OptimizationView::Comparison(cmp) => self.render_comparison(surface, cmp),
        }
    }

    pub fn render_single(&mut self, surface: &mut dyn Surface, result: &NormalizedResult) {
        if !has_all(surface, &RESULT_REGIONS) {
            return;
        }
        surface.set_visible(Region::ResultSection, true);
        surface.clear(Region::Status);
        surface.clear(Region::Comparison);
        let Some(record) = result.record() else {
            self.show_empty_result(surface, RegionContent::error(NO_SOLUTION_MESSAGE));
            return;
        };

        let mut summary = Vec::new();
        if let Some(technique) = record.technique {
            summary.push(format!("Technique: {technique}"));
        }
        summary.extend(summary_lines(record));
        surface.write(Region::ResultSummary, RegionContent::Text { lines: summary });
        surface.write(
            Region::ResultTable,
            RegionContent::Table {
                header: vec!["Food".to_string(), "Qty".to_string()],
                rows: record
                    .items
                    .iter()
                    .map(|item| vec![item.food.clone(), format_plain(item.qty)])
                    .collect(),
            },
        );
        surface.write(
            Region::ResultScore,
            RegionContent::text(format!("Fitness Score: {}", record.score_text)),
        );
        self.show_quantity_chart(surface, quantity_chart(&record.items));
        render_meals(surface, &record.items);
    }

    pub fn render_comparison(&mut self, surface: &mut dyn Surface, view: &ComparisonView) {
        if !has_all(surface, &RESULT_REGIONS) {
            return;
        }
        surface.set_visible(Region::ResultSection, true);
        surface.clear(Region::Status);
        let (ga, csp) = (view.ga.record(), view.csp.record());
        let Some(shared) = ga.or(csp) else {
            surface.clear(Region::Comparison);
            self.show_empty_result(surface, RegionContent::error(NO_SOLUTION_MESSAGE));
            return;
        };

        let mut summary = vec!["Technique: GA vs CSP".to_string()];
        summary.extend(summary_lines(shared).into_iter().take(1));
        surface.write(Region::ResultSummary, RegionContent::Text { lines: summary });

        let mut rows = Vec::new();
        for (technique, record) in [(Technique::Ga, ga), (Technique::Csp, csp)] {
            match record {
                Some(record) => rows.extend(record.items.iter().map(|item| {
                    vec![
                        technique.to_string(),
                        item.food.clone(),
                        format_plain(item.qty),
                    ]
                })),
                None => rows.push(vec![
                    technique.to_string(),
                    NO_SOLUTION_MESSAGE.to_string(),
                    String::new(),
                ]),
            }
        }
        surface.write(
            Region::ResultTable,
            RegionContent::Table {
                header: vec!["Technique".to_string(), "Food".to_string(), "Qty".to_string()],
                rows,
            },
        );

        let verdict = &view.verdict;
        let mut verdict_lines = vec![
            format!("Winner: {}", verdict.winner_label),
            verdict.score_analysis.clone(),
        ];
        if let Some(cost_note) = &verdict.cost_analysis {
            verdict_lines.push(cost_note.clone());
        }
        surface.write(
            Region::ResultScore,
            RegionContent::Text {
                lines: verdict_lines,
            },
        );
        if surface.has_region(Region::Comparison) {
            surface.write(Region::Comparison, comparison_table(ga, csp));
        }

        // Meals follow the winner; a tie falls back to whichever side has a diet.
        let preferred = match verdict.outcome {
            Outcome::Winner(Technique::Csp) => csp.or(ga),
            _ => ga.or(csp),
        };
        let items = preferred.map(|r| r.items.as_slice()).unwrap_or_default();
        self.show_quantity_chart(surface, comparison_chart(ga, csp));
        render_meals(surface, items);
    }

    pub fn render_failure(&mut self, surface: &mut dyn Surface, message: &str) {
        if !has_all(surface, &RESULT_REGIONS) {
            self.render_status_error(surface, message);
            return;
        }
        surface.set_visible(Region::ResultSection, true);
        surface.clear(Region::Status);
        surface.clear(Region::Comparison);
        self.show_empty_result(surface, RegionContent::error(message));
    }

    pub fn render_status_error(&mut self, surface: &mut dyn Surface, message: &str) {
        if surface.has_region(Region::Status) {
            surface.write(Region::Status, RegionContent::error(message));
        }
    }

    pub fn render_foods(&mut self, surface: &mut dyn Surface, foods: &[Food]) {
        if !surface.has_region(Region::FoodTable) {
            return;
        }
        surface.clear(Region::Status);
        surface.write(
            Region::FoodTable,
            RegionContent::Table {
                header: ["Name", "Calories", "Protein", "Carbs", "Fat", "Price"]
                    .map(String::from)
                    .to_vec(),
                rows: foods
                    .iter()
                    .map(|food| {
                        vec![
                            food.name.clone(),
                            format_plain(food.calories),
                            format_plain(food.protein),
                            format_plain(food.carbs),
                            format_plain(food.fat),
                            format!("${}", format_plain(food.price)),
                        ]
                    })
                    .collect(),
            },
        );
    }

    pub fn render_history(&mut self, surface: &mut dyn Surface, summary: &HistorySummary) {
        if !has_all(surface, &HISTORY_REGIONS) {
            return;
        }
        surface.clear(Region::Status);
        if let Some(handle) = self.cost_chart.take() {
            surface.destroy_chart(handle);
        }
        if summary.is_empty() {
            surface.set_visible(Region::HistorySection, false);
            surface.clear(Region::HistoryTable);
            surface.clear(Region::HistoryBest);
            return;
        }

        surface.set_visible(Region::HistorySection, true);
        surface.write(
            Region::HistoryTable,
            RegionContent::Table {
                header: ["Date", "Score", "Foods", "Cost"].map(String::from).to_vec(),
                rows: summary
                    .rows
                    .iter()
                    .map(|row| {
                        vec![
                            row.label.clone(),
                            row.score_text.clone(),
                            row.foods.clone(),
                            row.cost_text.clone(),
                        ]
                    })
                    .collect(),
            },
        );
        surface.write(
            Region::HistoryBest,
            RegionContent::text(summarize_history(summary)),
        );
        if surface.has_region(Region::CostChart) {
            self.cost_chart = surface.create_chart(
                Region::CostChart,
                ChartSpec {
                    title: "Cost per run".to_string(),
                    labels: summary.cost_series.iter().map(|p| p.label.clone()).collect(),
                    series: vec![ChartSeries {
                        label: "Cost".to_string(),
                        values: summary.cost_series.iter().map(|p| p.cost).collect(),
                    }],
                },
            );
        }
    }

    pub fn release(&mut self, surface: &mut dyn Surface) {
        for handle in [self.nutrition_chart.take(), self.cost_chart.take()]
            .into_iter()
            .flatten()
        {
            surface.destroy_chart(handle);
        }
    }

    fn show_empty_result(&mut self, surface: &mut dyn Surface, summary: RegionContent) {
        surface.write(Region::ResultSummary, summary);
        surface.clear(Region::ResultTable);
        surface.clear(Region::ResultScore);
        surface.clear(Region::Meals);
        if let Some(handle) = self.nutrition_chart.take() {
            surface.destroy_chart(handle);
        }
        surface.set_visible(Region::ChartsSection, false);
    }

    fn show_quantity_chart(&mut self, surface: &mut dyn Surface, spec: ChartSpec) {
        if !surface.has_region(Region::ChartsSection) {
            return;
        }
        if let Some(handle) = self.nutrition_chart.take() {
            surface.destroy_chart(handle);
        }
        surface.set_visible(Region::ChartsSection, true);
        self.nutrition_chart = surface.create_chart(Region::ChartsSection, spec);
    }
}

fn has_all(surface: &dyn Surface, regions: &[Region]) -> bool {
    regions.iter().all(|region| surface.has_region(*region))
}

fn summary_lines(record: &DisplayRecord) -> Vec<String> {
    let targets = record
        .nutrients
        .iter()
        .map(|line| format!("{}: {}", line.nutrient, line.target_text))
        .collect::<Vec<_>>()
        .join(", ");
    let achieved = record
        .nutrients
        .iter()
        .map(|line| format!("{}: {}", line.nutrient, line.achieved_text))
        .collect::<Vec<_>>()
        .join(", ");
    let delta = record
        .nutrients
        .iter()
        .map(|line| format!("{}: {}", line.nutrient, line.delta_text))
        .collect::<Vec<_>>()
        .join(", ");
    let mut lines = vec![
        format!("Targets: {targets}, Budget: {}", record.budget_text),
        format!("Achieved: {achieved}"),
        format!("Difference: {delta}"),
    ];
    if record.cost.is_some() {
        lines.push(format!("Total Cost: {}", record.cost_text));
    }
    lines
}

fn quantity_chart(items: &[DietItem]) -> ChartSpec {
    ChartSpec {
        title: "Quantity".to_string(),
        labels: items.iter().map(|item| item.food.clone()).collect(),
        series: vec![ChartSeries {
            label: "Quantity".to_string(),
            values: items.iter().map(|item| item.qty).collect(),
        }],
    }
}

fn comparison_chart(ga: Option<&DisplayRecord>, csp: Option<&DisplayRecord>) -> ChartSpec {
    let mut labels: Vec<String> = Vec::new();
    for record in [ga, csp].into_iter().flatten() {
        for item in &record.items {
            if !labels.contains(&item.food) {
                labels.push(item.food.clone());
            }
        }
    }
    let series_for = |technique: Technique, record: Option<&DisplayRecord>| ChartSeries {
        label: technique.to_string(),
        values: labels
            .iter()
            .map(|food| {
                record
                    .map(|r| {
                        r.items
                            .iter()
                            .filter(|item| &item.food == food)
                            .map(|item| item.qty)
                            .sum::<f64>()
                    })
                    .unwrap_or(0.0)
            })
            .collect(),
    };
    let series = vec![
        series_for(Technique::Ga, ga),
        series_for(Technique::Csp, csp),
    ];
    ChartSpec {
        title: "Quantity by technique".to_string(),
        labels,
        series,
    }
}

fn comparison_table(ga: Option<&DisplayRecord>, csp: Option<&DisplayRecord>) -> RegionContent {
    let mut rows = vec![
        side_by_side("Score", ga, csp, |r| r.score_text.clone()),
        side_by_side("Cost", ga, csp, |r| format_cost(r.cost)),
        side_by_side("Foods", ga, csp, |r| r.items.len().to_string()),
    ];
    let lines = ga.or(csp).map(|r| r.nutrients.as_slice()).unwrap_or_default();
    for (idx, line) in lines.iter().enumerate() {
        rows.push(side_by_side(&line.nutrient.to_string(), ga, csp, |r| {
            r.nutrients
                .get(idx)
                .map(|line| line.achieved_text.clone())
                .unwrap_or_else(|| "-".to_string())
        }));
    }
    RegionContent::Table {
        header: ["", "GA", "CSP"].map(String::from).to_vec(),
        rows,
    }
}

fn side_by_side(
    label: &str,
    ga: Option<&DisplayRecord>,
    csp: Option<&DisplayRecord>,
    pick: impl Fn(&DisplayRecord) -> String,
) -> Vec<String> {
    let cell = |record: Option<&DisplayRecord>| record.map(&pick).unwrap_or_else(|| "-".to_string());
    vec![label.to_string(), cell(ga), cell(csp)]
}

fn render_meals(surface: &mut dyn Surface, items: &[DietItem]) {
    if !surface.has_region(Region::Meals) {
        return;
    }
    let plan = split_meals(items);
    let lines = plan
        .meals()
        .iter()
        .map(|(meal, items)| {
            let listed = if items.is_empty() {
                "-".to_string()
            } else {
                items
                    .iter()
                    .map(|item| format!("{} x{}", item.food, format_plain(item.qty)))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!("{meal}: {listed}")
        })
        .collect();
    surface.write(Region::Meals, RegionContent::Text { lines });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::buffer::BufferedSurface;
    use crate::history::aggregator::aggregate_history;
    use crate::report::build_view;
    use crate::report::normalizer::normalize_result;
    use crate::types::{
        ComparisonPayload, HistoryEntry, OptimizationResult, OptimizeOutcome, Targets, Totals,
    };

    fn solved() -> OptimizationResult {
        OptimizationResult::new(vec![
            DietItem::new("Oats", 2.0),
            DietItem::new("Milk", 1.0),
            DietItem::new("Beans", 0.0),
            DietItem::new("Rice", 1.5),
        ])
        .with_score(87.5)
        .with_cost(8.4)
        .with_totals(Totals {
            calories: Some(1890.0),
            protein: Some(92.5),
            carbs: Some(260.1),
            fat: Some(61.0),
        })
    }

    fn text_lines(content: Option<&RegionContent>) -> Vec<String> {
        match content {
            Some(RegionContent::Text { lines }) => lines.clone(),
            other => panic!("expected text content, got {other:?}"),
        }
    }

    #[test]
    fn single_result_fills_result_regions() {
        let mut surface = BufferedSurface::with_all_regions(20);
        let mut binder = Binder::new();
        let result = normalize_result(&solved(), &Targets::default(), 10.0);
        binder.render_single(&mut surface, &result);

        assert!(surface.is_visible(Region::ResultSection));
        let summary = text_lines(surface.content(Region::ResultSummary));
        assert_eq!(
            summary[0],
            "Targets: Calories: 2000, Protein: 100g, Carbs: 250g, Fat: 70g, Budget: $10"
        );
        assert_eq!(
            summary[1],
            "Achieved: Calories: 1890, Protein: 92.5g, Carbs: 260.1g, Fat: 61.0g"
        );
        assert_eq!(summary[3], "Total Cost: $8.40");
        let Some(RegionContent::Table { rows, .. }) = surface.content(Region::ResultTable) else {
            panic!("expected diet table");
        };
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2], vec!["Beans".to_string(), "0".to_string()]);
        assert_eq!(
            text_lines(surface.content(Region::ResultScore)),
            vec!["Fitness Score: 87.50".to_string()]
        );
        let meals = text_lines(surface.content(Region::Meals));
        assert_eq!(meals[0], "Breakfast: Oats x2, Rice x1.5");
        assert_eq!(surface.chart_in(Region::ChartsSection).map(|c| c.labels.len()), Some(4));
    }

    #[test]
    fn empty_diet_renders_no_solution_state() {
        let mut surface = BufferedSurface::with_all_regions(20);
        let mut binder = Binder::new();
        binder.render_single(
            &mut surface,
            &normalize_result(&solved(), &Targets::default(), 10.0),
        );
        binder.render_single(
            &mut surface,
            &normalize_result(&OptimizationResult::new(vec![]), &Targets::default(), 10.0),
        );

        assert_eq!(
            surface.content(Region::ResultSummary),
            Some(&RegionContent::error(NO_SOLUTION_MESSAGE))
        );
        assert!(surface.content(Region::ResultTable).is_none());
        assert!(surface.content(Region::ResultScore).is_none());
        assert_eq!(surface.live_charts(), 0);
        assert!(!surface.is_visible(Region::ChartsSection));
    }

    #[test]
    fn every_entry_point_is_a_noop_without_its_regions() {
        let mut surface = BufferedSurface::new([Region::ResultSection, Region::Status], 20);
        let mut binder = Binder::new();
        let view = build_view(
            &OptimizeOutcome::Single(solved()),
            &Targets::default(),
            10.0,
        );
        binder.begin_optimization(&mut surface);
        binder.render_view(&mut surface, &view);
        binder.render_foods(&mut surface, &[]);
        binder.render_history(&mut surface, &aggregate_history(&[]));

        assert!(!surface.is_visible(Region::ResultSection));
        assert!(surface.content(Region::Status).is_none());
        assert_eq!(surface.live_charts(), 0);

        // Failure still reaches the status line when the result area is absent.
        binder.render_failure(&mut surface, "Error connecting to backend.");
        assert_eq!(
            surface.content(Region::Status),
            Some(&RegionContent::error("Error connecting to backend."))
        );
    }

    #[test]
    fn previous_chart_is_released_before_a_new_one() {
        let mut surface = BufferedSurface::with_all_regions(20);
        let mut binder = Binder::new();
        let result = normalize_result(&solved(), &Targets::default(), 10.0);
        for _ in 0..3 {
            binder.render_single(&mut surface, &result);
        }
        assert_eq!(surface.live_charts(), 1);
        assert_eq!(surface.released_charts(), 2);

        binder.release(&mut surface);
        assert_eq!(surface.live_charts(), 0);
    }

    #[test]
    fn begin_optimization_hides_result_and_shows_progress() {
        let mut surface = BufferedSurface::with_all_regions(20);
        let mut binder = Binder::new();
        binder.render_single(
            &mut surface,
            &normalize_result(&solved(), &Targets::default(), 10.0),
        );
        binder.begin_optimization(&mut surface);
        assert!(!surface.is_visible(Region::ResultSection));
        assert_eq!(
            surface.content(Region::Status),
            Some(&RegionContent::info(OPTIMIZING_MESSAGE))
        );
        assert!(surface.content(Region::ResultTable).is_none());
    }

    #[test]
    fn comparison_shows_verdict_and_both_sides() {
        let mut surface = BufferedSurface::with_all_regions(20);
        let mut binder = Binder::new();
        let outcome = OptimizeOutcome::Comparison(ComparisonPayload {
            ga: solved().with_score(70.0).with_cost(10.0),
            csp: OptimizationResult::new(vec![DietItem::new("Tofu", 1.0)])
                .with_score(70.0)
                .with_cost(12.0),
        });
        binder.render_view(
            &mut surface,
            &build_view(&outcome, &Targets::default(), 10.0),
        );

        let verdict = text_lines(surface.content(Region::ResultScore));
        assert_eq!(verdict[0], "Winner: Tie");
        assert_eq!(verdict[2], "GA is cheaper: $10.00 vs $12.00");
        let Some(RegionContent::Table { rows, .. }) = surface.content(Region::ResultTable) else {
            panic!("expected diet table");
        };
        assert_eq!(rows.len(), 5);
        let chart = surface.chart_in(Region::ChartsSection).expect("chart");
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.labels.last().map(String::as_str), Some("Tofu"));
    }

    #[test]
    fn comparison_without_diets_drops_the_side_by_side_table() {
        let mut surface = BufferedSurface::with_all_regions(20);
        let mut binder = Binder::new();
        let solved_both = OptimizeOutcome::Comparison(ComparisonPayload {
            ga: solved(),
            csp: solved().with_score(60.0),
        });
        binder.render_view(
            &mut surface,
            &build_view(&solved_both, &Targets::default(), 10.0),
        );
        assert!(surface.content(Region::Comparison).is_some());

        let empty_both = OptimizeOutcome::Comparison(ComparisonPayload {
            ga: OptimizationResult::new(vec![]),
            csp: OptimizationResult::default(),
        });
        binder.render_view(
            &mut surface,
            &build_view(&empty_both, &Targets::default(), 10.0),
        );
        assert!(surface.content(Region::Comparison).is_none());
        assert_eq!(
            surface.content(Region::ResultSummary),
            Some(&RegionContent::error(NO_SOLUTION_MESSAGE))
        );
    }

    #[test]
    fn empty_history_hides_the_section() {
        let mut surface = BufferedSurface::with_all_regions(20);
        let mut binder = Binder::new();
        let entries = vec![HistoryEntry::Single {
            created_at: None,
            result: solved(),
        }];
        binder.render_history(&mut surface, &aggregate_history(&entries));
        assert!(surface.is_visible(Region::HistorySection));
        assert_eq!(
            text_lines(surface.content(Region::HistoryBest)),
            vec!["Best Score: 87.50 | Most Used Food: Oats".to_string()]
        );
        assert!(surface.chart_in(Region::CostChart).is_some());

        binder.render_history(&mut surface, &aggregate_history(&[]));
        assert!(!surface.is_visible(Region::HistorySection));
        assert!(surface.content(Region::HistoryTable).is_none());
        assert_eq!(surface.live_charts(), 0);
    }

    #[test]
    fn foods_render_as_table() {
        let mut surface = BufferedSurface::with_all_regions(20);
        let mut binder = Binder::new();
        binder.render_foods(
            &mut surface,
            &[Food {
                name: "Oats".to_string(),
                calories: 389.0,
                protein: 16.9,
                carbs: 66.0,
                fat: 6.9,
                price: 0.5,
            }],
        );
        let Some(RegionContent::Table { rows, .. }) = surface.content(Region::FoodTable) else {
            panic!("expected food table");
        };
        assert_eq!(rows[0][5], "$0.5");
    }
}
