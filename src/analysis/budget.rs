use serde::{Deserialize, Serialize};

use crate::output::format_gbp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub within_budget: bool,
    pub remaining: f64,
    pub excess: f64,
    pub message: String,
}

pub fn check_budget(total_cost: f64, budget: f64) -> BudgetStatus {
    if total_cost <= budget {
        let remaining = budget - total_cost;
        BudgetStatus {
            within_budget: true,
            remaining,
            excess: 0.0,
            message: format!(
                "All improvements fit within budget. {} remaining.",
                format_gbp(remaining)
            ),
        }
    } else {
        let excess = total_cost - budget;
        BudgetStatus {
            within_budget: false,
            remaining: 0.0,
            excess,
            message: format!("Total cost exceeds budget by {}.", format_gbp(excess)),
        }
    }
}
