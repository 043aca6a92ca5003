use anyhow::{bail, Result};
use biblio_core::models::{Loan, LoanRequest};
use biblio_core::stores::DEFAULT_PER_PAGE;
use biblio_core::Client;

use super::store_failure;

fn print_loan(loan: &Loan, with_user: bool) {
    let due = loan
        .due_at
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    if with_user {
        println!(
            "{:>5}  user {:>5}  book {:>5}  due {}  {}",
            loan.id,
            loan.user_id,
            loan.book_id,
            due,
            loan.status_display()
        );
    } else {
        println!(
            "{:>5}  book {:>5}  due {}  {}",
            loan.id,
            loan.book_id,
            due,
            loan.status_display()
        );
    }
}

/// List the caller's active loans, their history, or (admin) every active loan.
pub async fn list(client: &Client, history: bool, all: bool, page: u32) -> Result<()> {
    let mut store = client.loans();
    if all {
        store.fetch_all_loans(page, DEFAULT_PER_PAGE, true).await;
    } else if history {
        store.fetch_loan_history(page, DEFAULT_PER_PAGE).await;
    } else {
        store.fetch_active_loans(page, DEFAULT_PER_PAGE).await;
    }
    if let Some(e) = store.status.last_error {
        bail!(e);
    }

    let loans = if all {
        &store.all
    } else if history {
        &store.history
    } else {
        &store.active
    };
    if loans.is_empty() {
        println!("No loans");
        return Ok(());
    }
    for loan in loans {
        print_loan(loan, all);
    }
    println!("{}", store.pagination.display());
    Ok(())
}

pub async fn borrow(client: &Client, book_id: i64, days: Option<u32>) -> Result<()> {
    let mut store = client.loans();
    let request = LoanRequest {
        book_id,
        duration_days: days,
    };
    let loan = match store.borrow_book(&request).await {
        Ok(loan) => loan,
        Err(e) => return Err(store_failure(&store.status, e)),
    };

    println!("Borrowed book {} (loan {})", loan.book_id, loan.id);
    print_loan(&loan, false);
    Ok(())
}

pub async fn give_back(client: &Client, loan_id: i64) -> Result<()> {
    let mut store = client.loans();
    let loan = match store.return_book(loan_id).await {
        Ok(loan) => loan,
        Err(e) => return Err(store_failure(&store.status, e)),
    };

    println!("Returned book {} (loan {})", loan.book_id, loan.id);
    Ok(())
}
