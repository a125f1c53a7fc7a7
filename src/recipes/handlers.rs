use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::state::AppState;

use super::dto::{ListParams, Recipe, RecipePage, SearchParams};
use super::filters::SearchFilter;
use super::repo::{self, RecipeRow};

pub const SEARCH_RESULT_LIMIT: usize = 10;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/api/recipes/", get(list_recipes))
        .route("/api/recipes/search/", get(search_recipes))
}

/// GET /api/recipes/?pages=<offset>&limit=<n>
#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(p): Query<ListParams>,
) -> Result<Json<RecipePage>, (StatusCode, String)> {
    let rows = repo::list_by_rating(&state.db, p.limit, p.pages)
        .await
        .map_err(|e| {
            error!(error = %e, "list_by_rating failed");
            internal(e)
        })?;
    let total = repo::count(&state.db).await.map_err(|e| {
        error!(error = %e, "count failed");
        internal(e)
    })?;

    Ok(Json(RecipePage {
        pages: p.pages,
        limit: p.limit,
        total,
        data: to_recipes(rows)?,
    }))
}

/// GET /api/recipes/search/?title=<str>&calories=<op><n>&rating=<op><n>
#[instrument(skip(state))]
pub async fn search_recipes(
    State(state): State<AppState>,
    Query(q): Query<SearchParams>,
) -> Result<Json<Vec<Recipe>>, (StatusCode, String)> {
    let filter = SearchFilter::parse(q.calories.as_deref(), q.rating.as_deref()).map_err(|e| {
        warn!(error = %e, "rejected search filter");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    let rows = repo::search_by_title(&state.db, &q.title)
        .await
        .map_err(|e| {
            error!(error = %e, title = %q.title, "search_by_title failed");
            internal(e)
        })?;
    let candidates = rows.len();

    let found: Vec<Recipe> = to_recipes(rows)?
        .into_iter()
        .filter(|r| filter.matches(r))
        .take(SEARCH_RESULT_LIMIT)
        .collect();

    info!(candidates, returned = found.len(), "search done");
    Ok(Json(found))
}

fn to_recipes(rows: Vec<RecipeRow>) -> Result<Vec<Recipe>, (StatusCode, String)> {
    rows.into_iter()
        .map(|row| {
            let id = row.id;
            Recipe::try_from(row).map_err(|e| {
                error!(error = %e, id, "stored nutrients are not valid json");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            })
        })
        .collect()
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
