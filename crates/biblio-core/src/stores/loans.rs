use serde::Deserialize;

use super::{replace_by, StoreStatus};
use crate::api::{ApiClient, ApiError, ApiRequest};
use crate::models::{Loan, LoanRequest, Pagination};

const ACTIVE_FAILED: &str = "An error occurred while loading active loans";
const HISTORY_FAILED: &str = "An error occurred while loading the loan history";
const ALL_FAILED: &str = "An error occurred while loading loans";
const BORROW_FAILED: &str = "An error occurred while borrowing the book";
const RETURN_FAILED: &str = "An error occurred while returning the book";

#[derive(Debug, Deserialize)]
struct LoanPage {
    #[serde(rename = "emprunts", default)]
    loans: Vec<Loan>,
    #[serde(default)]
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct LoanEnvelope {
    #[serde(rename = "emprunt")]
    loan: Loan,
}

/// Loans of the current user, plus the full list for administrators.
pub struct LoanStore {
    api: ApiClient,
    pub active: Vec<Loan>,
    pub history: Vec<Loan>,
    /// Every loan in the system; admin only
    pub all: Vec<Loan>,
    pub pagination: Pagination,
    pub status: StoreStatus,
}

impl LoanStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            active: Vec::new(),
            history: Vec::new(),
            all: Vec::new(),
            pagination: Pagination::default(),
            status: StoreStatus::default(),
        }
    }

    async fn fetch_page(&mut self, request: ApiRequest, default_message: &str) -> Option<Vec<Loan>> {
        self.status.begin();
        let result = self.api.send::<LoanPage>(request).await;
        let page = self.status.finish(result, default_message).ok()?;
        self.pagination = page.pagination;
        Some(page.loans)
    }

    pub async fn fetch_active_loans(&mut self, page: u32, per_page: u32) {
        let request = ApiRequest::get("/loans/active")
            .query("page", page)
            .query("par_page", per_page);
        if let Some(loans) = self.fetch_page(request, ACTIVE_FAILED).await {
            self.active = loans;
        }
    }

    pub async fn fetch_loan_history(&mut self, page: u32, per_page: u32) {
        let request = ApiRequest::get("/loans/history")
            .query("page", page)
            .query("par_page", per_page);
        if let Some(loans) = self.fetch_page(request, HISTORY_FAILED).await {
            self.history = loans;
        }
    }

    pub async fn fetch_all_loans(&mut self, page: u32, per_page: u32, active_only: bool) {
        let request = ApiRequest::get("/loans")
            .query("page", page)
            .query("par_page", per_page)
            .query("actif_seulement", active_only);
        if let Some(loans) = self.fetch_page(request, ALL_FAILED).await {
            self.all = loans;
        }
    }

    /// Borrow a book. The loan is prepended to `active` if that list is loaded.
    pub async fn borrow_book(&mut self, request: &LoanRequest) -> Result<Loan, ApiError> {
        self.status.begin();
        let result = self.api.post::<LoanEnvelope, _>("/loans", request).await;
        let loan = self.status.finish(result, BORROW_FAILED)?.loan;

        if !self.active.is_empty() {
            self.active.insert(0, loan.clone());
        }
        Ok(loan)
    }

    /// Return a book, moving the loan from `active` to `history`.
    pub async fn return_book(&mut self, loan_id: i64) -> Result<Loan, ApiError> {
        self.status.begin();
        let result = self
            .api
            .patch::<LoanEnvelope>(&format!("/loans/{}/return", loan_id))
            .await;
        let loan = self.status.finish(result, RETURN_FAILED)?.loan;

        if let Some(index) = self.active.iter().position(|l| l.id == loan_id) {
            self.active.remove(index);
            if !self.history.is_empty() {
                self.history.insert(0, loan.clone());
            }
        }
        replace_by(&mut self.all, &loan, |a, b| a.id == b.id);
        Ok(loan)
    }
}
