use crate::report::format::{
    format_amount, format_cost, format_delta, format_money, format_score, format_target,
};
use crate::report::{DisplayRecord, NormalizedResult, NutrientLine};
use crate::types::{Nutrient, OptimizationResult, Targets};

pub fn normalize_result(
    result: &OptimizationResult,
    targets: &Targets,
    budget: f64,
) -> NormalizedResult {
    if !result.has_solution() {
        return NormalizedResult::NoSolution {
            technique: result.technique,
        };
    }

    let nutrients = Nutrient::ALL
        .iter()
        .map(|nutrient| nutrient_line(*nutrient, targets, result))
        .collect();
    let score = result.score_or_zero();

    NormalizedResult::Solution(DisplayRecord {
        technique: result.technique,
        nutrients,
        budget_text: format_money(budget),
        cost: result.cost.filter(|c| c.is_finite()),
        cost_text: format_cost(result.cost),
        items: result.items().to_vec(),
        score,
        score_text: format_score(score),
    })
}

fn nutrient_line(nutrient: Nutrient, targets: &Targets, result: &OptimizationResult) -> NutrientLine {
    let target = nutrient.target(targets);
    let achieved = nutrient
        .achieved(&result.totals)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0);
    let delta = achieved - target;
    NutrientLine {
        nutrient,
        target,
        achieved,
        delta,
        target_text: format_target(nutrient, target),
        achieved_text: format_amount(nutrient, achieved),
        delta_text: format_delta(nutrient, delta),
    }
}
