use tracing::error;

use super::{Action, CatalogClient, SearchFilters};
use crate::recipes::dto::Recipe;

pub const DEFAULT_PAGE_SIZE: i64 = 15;

/// Table state of the catalog browser: pagination, filters, results and the
/// recipe open in the detail panel.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseState {
    pub page: i64, // 1-based
    pub page_size: i64,
    pub total: i64,
    pub filters: SearchFilters,
    pub search_mode: bool,
    pub recipes: Vec<Recipe>,
    pub selected: Option<Recipe>,
    pub error: Option<&'static str>,
}

impl Default for BrowseState {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total: 0,
            filters: SearchFilters::default(),
            search_mode: false,
            recipes: Vec::new(),
            selected: None,
            error: None,
        }
    }
}

impl BrowseState {
    /// `(offset, limit)` for the current page of the listing.
    pub fn list_request(&self) -> (i64, i64) {
        let offset = (self.page.max(1) - 1).saturating_mul(self.page_size);
        (offset, self.page_size)
    }

    pub fn page_count(&self) -> i64 {
        if self.page_size <= 0 {
            return 0;
        }
        self.total / self.page_size + i64::from(self.total % self.page_size != 0)
    }

    pub fn set_page(&mut self, page: i64) {
        self.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: i64) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn select(&mut self, recipe: Recipe) {
        self.selected = Some(recipe);
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    pub fn clear_filters(&mut self) {
        self.filters = SearchFilters::default();
        self.page = 1;
    }

    /// Loads the current listing page. Search results are not paginated, so
    /// this also leaves search mode.
    pub async fn fetch(&mut self, client: &CatalogClient) {
        self.error = None;
        let (offset, limit) = self.list_request();
        match client.list(offset, limit).await {
            Ok(page) => {
                self.recipes = page.data;
                self.total = page.total;
                self.search_mode = false;
            }
            Err(e) => {
                error!(error = %e, "error fetching recipes");
                self.error = Some(e.user_message(Action::Fetch));
            }
        }
    }

    pub async fn search(&mut self, client: &CatalogClient) {
        self.error = None;
        match client.search(&self.filters).await {
            Ok(recipes) => {
                self.recipes = recipes;
                self.search_mode = true;
                self.page = 1;
            }
            Err(e) => {
                error!(error = %e, "error searching recipes");
                self.error = Some(e.user_message(Action::Search));
            }
        }
    }

    pub async fn change_page(&mut self, client: &CatalogClient, page: i64) {
        self.set_page(page);
        if !self.search_mode {
            self.fetch(client).await;
        }
    }

    pub async fn change_page_size(&mut self, client: &CatalogClient, page_size: i64) {
        self.set_page_size(page_size);
        if !self.search_mode {
            self.fetch(client).await;
        }
    }

    pub async fn reset(&mut self, client: &CatalogClient) {
        self.clear_filters();
        self.fetch(client).await;
    }
}
