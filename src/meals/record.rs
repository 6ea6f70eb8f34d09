use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// One logged meal. `calories` is kept as the raw string the form submitted;
/// presence is validated at input time but numeric-ness deliberately is not,
/// so the aggregate has to tolerate garbage (see [`MealRecord::calories_kcal`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub calories: String,
}

impl MealRecord {
    /// Calories as an integer, with unparseable or missing values counted as
    /// zero so one bad record cannot corrupt the aggregate.
    pub fn calories_kcal(&self) -> i64 {
        self.calories.trim().parse().unwrap_or(0)
    }
}

#[cfg(test)]
mod record_tests {
    use super::*;

    #[test]
    fn calories_parse_tolerates_garbage() {
        let mut meal = MealRecord {
            id: 1,
            name: "Oatmeal".into(),
            description: "Morning bowl".into(),
            category: Category::Breakfast,
            calories: "300".into(),
        };
        assert_eq!(meal.calories_kcal(), 300);
        meal.calories = " 450 ".into();
        assert_eq!(meal.calories_kcal(), 450);
        meal.calories = "abc".into();
        assert_eq!(meal.calories_kcal(), 0);
        meal.calories = String::new();
        assert_eq!(meal.calories_kcal(), 0);
    }

    #[test]
    fn category_serializes_as_variant_name() {
        let json = serde_json::to_string(&Category::Breakfast).unwrap();
        assert_eq!(json, "\"Breakfast\"");
        let back: Category = serde_json::from_str("\"Snack\"").unwrap();
        assert_eq!(back, Category::Snack);
    }
}
