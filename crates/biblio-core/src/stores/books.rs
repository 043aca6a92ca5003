use serde::Deserialize;

use super::{replace_by, StoreStatus};
use crate::api::{Acknowledgement, ApiClient, ApiError, ApiRequest};
use crate::models::{Book, BookInput, BookUpdate, Pagination};

const FETCH_FAILED: &str = "An error occurred while loading books";
const FETCH_ONE_FAILED: &str = "An error occurred while loading the book";
const SEARCH_FAILED: &str = "An error occurred while searching books";
const CREATE_FAILED: &str = "An error occurred while creating the book";
const UPDATE_FAILED: &str = "An error occurred while updating the book";
const DELETE_FAILED: &str = "An error occurred while deleting the book";

#[derive(Debug, Deserialize)]
struct BookPage {
    #[serde(rename = "livres", default)]
    books: Vec<Book>,
    #[serde(default)]
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct BookEnvelope {
    #[serde(rename = "livre")]
    book: Book,
}

/// Catalog cache.
pub struct BookStore {
    api: ApiClient,
    pub books: Vec<Book>,
    /// Book currently open in a detail view
    pub book: Option<Book>,
    pub pagination: Pagination,
    pub status: StoreStatus,
}

impl BookStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            books: Vec::new(),
            book: None,
            pagination: Pagination::default(),
            status: StoreStatus::default(),
        }
    }

    pub async fn fetch_books(&mut self, page: u32, per_page: u32) {
        self.status.begin();
        let request = ApiRequest::get("/books")
            .query("page", page)
            .query("par_page", per_page);
        let result = self.api.send::<BookPage>(request).await;
        if let Ok(page) = self.status.finish(result, FETCH_FAILED) {
            self.books = page.books;
            self.pagination = page.pagination;
        }
    }

    pub async fn fetch_book(&mut self, id: i64) {
        self.status.begin();
        self.book = None;
        let result = self.api.get::<BookEnvelope>(&format!("/books/{}", id)).await;
        if let Ok(envelope) = self.status.finish(result, FETCH_ONE_FAILED) {
            self.book = Some(envelope.book);
        }
    }

    /// Search title, author and ISBN.
    pub async fn search_books(&mut self, term: &str, page: u32, per_page: u32) {
        self.status.begin();
        let request = ApiRequest::get("/books/search")
            .query("terme", term)
            .query("page", page)
            .query("par_page", per_page);
        let result = self.api.send::<BookPage>(request).await;
        if let Ok(page) = self.status.finish(result, SEARCH_FAILED) {
            self.books = page.books;
            self.pagination = page.pagination;
        }
    }

    pub async fn create_book(&mut self, input: &BookInput) -> Result<Book, ApiError> {
        self.status.begin();
        let result = self.api.post::<BookEnvelope, _>("/books", input).await;
        self.status.finish(result, CREATE_FAILED).map(|e| e.book)
    }

    /// Update a book, refreshing any cached copy of it.
    pub async fn update_book(&mut self, id: i64, update: &BookUpdate) -> Result<Book, ApiError> {
        self.status.begin();
        let result = self
            .api
            .put::<BookEnvelope, _>(&format!("/books/{}", id), update)
            .await;
        let book = self.status.finish(result, UPDATE_FAILED)?.book;

        if self.book.as_ref().map(|b| b.id) == Some(id) {
            self.book = Some(book.clone());
        }
        replace_by(&mut self.books, &book, |a, b| a.id == b.id);
        Ok(book)
    }

    pub async fn delete_book(&mut self, id: i64) -> Result<(), ApiError> {
        self.status.begin();
        let result = self
            .api
            .delete::<Acknowledgement>(&format!("/books/{}", id))
            .await;
        self.status.finish(result, DELETE_FAILED)?;

        self.books.retain(|b| b.id != id);
        if self.book.as_ref().map(|b| b.id) == Some(id) {
            self.book = None;
        }
        Ok(())
    }
}
