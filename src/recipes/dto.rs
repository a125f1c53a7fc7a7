use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A recipe as served to clients, nutrients already parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub cuisine: Option<String>,
    pub rating: Option<f64>,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub total_time: Option<i64>,
    pub description: Option<String>,
    pub nutrients: Option<Map<String, Value>>,
    pub serves: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipePage {
    pub pages: i64, // row offset the page starts at
    pub limit: i64,
    pub total: i64,
    pub data: Vec<Recipe>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub pages: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}
fn default_limit() -> i64 { 10 }

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub title: String,
    pub calories: Option<String>,
    pub rating: Option<String>,
}
