use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};

use super::dto::Recipe;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecipeRow {
    pub id: i64,
    pub cuisine: Option<String>,
    pub title: String,
    pub rating: Option<f64>,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub total_time: Option<i64>,
    pub description: Option<String>,
    pub nutrients: Option<String>, // serialized JSON object
    pub serves: Option<String>,
}

/// A normalized record ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub cuisine: Option<String>,
    pub title: String,
    pub rating: Option<f64>,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub total_time: Option<i64>,
    pub description: Option<String>,
    pub nutrients: Option<String>,
    pub serves: Option<String>,
}

impl TryFrom<RecipeRow> for Recipe {
    type Error = serde_json::Error;

    fn try_from(r: RecipeRow) -> Result<Self, Self::Error> {
        let nutrients = match r.nutrients.as_deref() {
            Some(raw) => serde_json::from_str(raw)?,
            None => None,
        };
        Ok(Self {
            id: r.id,
            title: r.title,
            cuisine: r.cuisine,
            rating: r.rating,
            prep_time: r.prep_time,
            cook_time: r.cook_time,
            total_time: r.total_time,
            description: r.description,
            nutrients,
            serves: r.serves,
        })
    }
}

const COLUMNS: &str = "id, cuisine, title, rating, prep_time, cook_time, total_time, \
                       description, nutrients, serves";

pub async fn insert(tx: &mut Transaction<'_, Sqlite>, r: &NewRecipe) -> anyhow::Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO recipes
            (cuisine, title, rating, prep_time, cook_time, total_time,
             description, nutrients, serves)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&r.cuisine)
    .bind(&r.title)
    .bind(r.rating)
    .bind(r.prep_time)
    .bind(r.cook_time)
    .bind(r.total_time)
    .bind(&r.description)
    .bind(&r.nutrients)
    .bind(&r.serves)
    .execute(&mut **tx)
    .await?
    .last_insert_rowid();
    Ok(id)
}

pub async fn count(db: &SqlitePool) -> anyhow::Result<i64> {
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes")
        .fetch_one(db)
        .await?;
    Ok(total)
}

pub async fn list_by_rating(
    db: &SqlitePool,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<RecipeRow>> {
    let sql = format!(
        "SELECT {} FROM recipes ORDER BY rating DESC, id ASC LIMIT ? OFFSET ?",
        COLUMNS
    );
    let rows = sqlx::query_as::<_, RecipeRow>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Rows whose title contains `needle`, in id order. Matching follows the
/// default `LIKE` collation (ASCII case-insensitive).
pub async fn search_by_title(db: &SqlitePool, needle: &str) -> anyhow::Result<Vec<RecipeRow>> {
    let sql = format!(
        r"SELECT {} FROM recipes WHERE title LIKE ? ESCAPE '\' ORDER BY id ASC",
        COLUMNS
    );
    let rows = sqlx::query_as::<_, RecipeRow>(&sql)
        .bind(like_pattern(needle))
        .fetch_all(db)
        .await?;
    Ok(rows)
}

fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
