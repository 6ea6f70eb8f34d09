use serde::{Deserialize, Serialize};

use crate::meals::record::{Category, MealRecord};

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub calories: String,
}

#[derive(Debug, Serialize)]
pub struct MealResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub calories: String,
}

impl From<MealRecord> for MealResponse {
    fn from(r: MealRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            category: r.category,
            calories: r.calories,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub count: usize,
    pub total_calories: i64,
}

/// Deletion is two-step: the client must resubmit with `confirm=true`.
#[derive(Debug, Deserialize)]
pub struct DeleteConfirm {
    #[serde(default)]
    pub confirm: bool,
}
