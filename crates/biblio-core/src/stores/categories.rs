use serde::Deserialize;

use super::{replace_by, StoreStatus, DEFAULT_PER_PAGE};
use crate::api::{ApiClient, ApiError, ApiRequest};
use crate::models::{Category, CategoryInput, Pagination};

const FETCH_FAILED: &str = "An error occurred while loading categories";
const CREATE_FAILED: &str = "An error occurred while creating the category";
const UPDATE_FAILED: &str = "An error occurred while updating the category";

#[derive(Debug, Deserialize)]
struct CategoryPage {
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct CategoryEnvelope {
    #[serde(rename = "categorie")]
    category: Category,
}

pub struct CategoryStore {
    api: ApiClient,
    pub categories: Vec<Category>,
    pub pagination: Pagination,
    pub status: StoreStatus,
}

impl CategoryStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            categories: Vec::new(),
            pagination: Pagination::default(),
            status: StoreStatus::default(),
        }
    }

    pub async fn fetch_categories(&mut self, page: u32) {
        self.status.begin();
        let request = ApiRequest::get("/categories")
            .query("page", page)
            .query("par_page", DEFAULT_PER_PAGE);
        let result = self.api.send::<CategoryPage>(request).await;
        if let Ok(page) = self.status.finish(result, FETCH_FAILED) {
            self.categories = page.categories;
            self.pagination = page.pagination;
        }
    }

    pub async fn create_category(&mut self, input: &CategoryInput) -> Result<Category, ApiError> {
        self.status.begin();
        let result = self.api.post::<CategoryEnvelope, _>("/categories", input).await;
        let category = self.status.finish(result, CREATE_FAILED)?.category;
        self.categories.push(category.clone());
        Ok(category)
    }

    pub async fn update_category(
        &mut self,
        id: i64,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        self.status.begin();
        let result = self
            .api
            .put::<CategoryEnvelope, _>(&format!("/categories/{}", id), input)
            .await;
        let category = self.status.finish(result, UPDATE_FAILED)?.category;
        replace_by(&mut self.categories, &category, |a, b| a.id == b.id);
        Ok(category)
    }
}
