use std::cmp::Ordering;

use crate::comparison::{Outcome, Verdict, COST_NOTE_THRESHOLD};
use crate::report::format::format_score;
use crate::types::{OptimizationResult, Technique};

/// Ranks the GA run against the CSP run.
pub fn compare_results(ga: &OptimizationResult, csp: &OptimizationResult) -> Verdict {
    let ga_score = ga.score_or_zero();
    let csp_score = csp.score_or_zero();

    let outcome = match ga_score.partial_cmp(&csp_score) {
        Some(Ordering::Greater) => Outcome::Winner(Technique::Ga),
        Some(Ordering::Less) => Outcome::Winner(Technique::Csp),
        _ => Outcome::Tie,
    };

    let (winner_label, score_analysis) = match outcome {
        Outcome::Winner(winner) => {
            let (best, other) = if winner == Technique::Ga {
                (ga_score, csp_score)
            } else {
                (csp_score, ga_score)
            };
            (
                winner.to_string(),
                format!(
                    "{winner} wins with a higher fitness score ({} vs {})",
                    format_score(best),
                    format_score(other)
                ),
            )
        }
        Outcome::Tie => (
            "Tie".to_string(),
            format!("Tie: both techniques scored {}", format_score(ga_score)),
        ),
    };

    let ga_cost = ga.cost_or_zero();
    let csp_cost = csp.cost_or_zero();
    let cheaper = if (ga_cost - csp_cost).abs() > COST_NOTE_THRESHOLD {
        Some(if ga_cost < csp_cost {
            Technique::Ga
        } else {
            Technique::Csp
        })
    } else {
        None
    };
    let cost_analysis = cheaper.map(|technique| {
        let (own, other) = if technique == Technique::Ga {
            (ga_cost, csp_cost)
        } else {
            (csp_cost, ga_cost)
        };
        format!("{technique} is cheaper: ${own:.2} vs ${other:.2}")
    });

    Verdict {
        outcome,
        winner_label,
        ga_score,
        csp_score,
        score_analysis,
        cheaper,
        cost_analysis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DietItem;

    fn run(score: f64, cost: f64) -> OptimizationResult {
        OptimizationResult::new(vec![DietItem::new("Rice", 1.0)])
            .with_score(score)
            .with_cost(cost)
    }

    #[test]
    fn equal_scores_tie_and_cheaper_side_is_noted() {
        let verdict = compare_results(&run(70.0, 10.0), &run(70.0, 12.0));
        assert_eq!(verdict.outcome, Outcome::Tie);
        assert_eq!(verdict.winner_label, "Tie");
        assert_eq!(verdict.cheaper, Some(Technique::Ga));
        let note = verdict.cost_analysis.expect("cost note");
        assert!(note.starts_with("GA"));
        assert!(note.contains("10.00"));
        assert!(note.contains("12.00"));
    }

    #[test]
    fn higher_score_wins_regardless_of_cost() {
        let verdict = compare_results(&run(82.0, 15.0), &run(75.0, 9.0));
        assert_eq!(verdict.outcome, Outcome::Winner(Technique::Ga));
        assert_eq!(verdict.winner_label, "GA");
        assert!(verdict.score_analysis.contains("82.00 vs 75.00"));
        assert_eq!(verdict.cheaper, Some(Technique::Csp));
    }

    #[test]
    fn csp_can_win() {
        let verdict = compare_results(&run(60.5, 8.0), &run(61.0, 8.0));
        assert_eq!(verdict.outcome, Outcome::Winner(Technique::Csp));
        assert!(verdict.cost_analysis.is_none());
    }

    #[test]
    fn missing_fields_are_zero() {
        let empty = OptimizationResult::default();
        let verdict = compare_results(&empty, &run(0.0, 0.005));
        assert_eq!(verdict.outcome, Outcome::Tie);
        assert!(verdict.cost_analysis.is_none());

        let verdict = compare_results(&empty, &run(1.0, 4.0));
        assert_eq!(verdict.outcome, Outcome::Winner(Technique::Csp));
        assert_eq!(verdict.cheaper, Some(Technique::Ga));
    }

    #[test]
    fn near_equal_scores_are_not_a_tie() {
        let verdict = compare_results(&run(0.1 + 0.2, 5.0), &run(0.3, 5.0));
        assert_eq!(verdict.outcome, Outcome::Winner(Technique::Ga));
    }
}
