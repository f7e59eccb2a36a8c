use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::types::DietItem;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
}

impl Display for Meal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MealPlan {
    pub breakfast: Vec<DietItem>,
    pub lunch: Vec<DietItem>,
    pub dinner: Vec<DietItem>,
}

impl MealPlan {
    pub fn meals(&self) -> [(Meal, &[DietItem]); 3] {
        [
            (Meal::Breakfast, self.breakfast.as_slice()),
            (Meal::Lunch, self.lunch.as_slice()),
            (Meal::Dinner, self.dinner.as_slice()),
        ]
    }
}

pub fn split_meals(items: &[DietItem]) -> MealPlan {
    let mut plan = MealPlan::default();
    for (idx, item) in items.iter().enumerate() {
        let bucket = match idx % 3 {
            0 => &mut plan.breakfast,
            1 => &mut plan.lunch,
            _ => &mut plan.dinner,
        };
        bucket.push(item.clone());
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deals_items_round_robin() {
        let items: Vec<DietItem> = ["Oats", "Rice", "Beans", "Milk"]
            .iter()
            .map(|name| DietItem::new(*name, 1.0))
            .collect();
        let plan = split_meals(&items);
        assert_eq!(plan.breakfast.len(), 2);
        assert_eq!(plan.breakfast[1].food, "Milk");
        assert_eq!(plan.lunch[0].food, "Rice");
        assert_eq!(plan.dinner[0].food, "Beans");
    }

    #[test]
    fn empty_diet_gives_empty_meals() {
        let plan = split_meals(&[]);
        assert!(plan.meals().iter().all(|(_, items)| items.is_empty()));
    }
}
