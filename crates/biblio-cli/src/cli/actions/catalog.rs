use anyhow::{bail, Result};
use biblio_core::stores::DEFAULT_PER_PAGE;
use biblio_core::Client;

use super::clip;

pub async fn books(client: &Client, search: Option<&str>, page: u32) -> Result<()> {
    let mut store = client.books();
    match search {
        Some(term) => store.search_books(term, page, DEFAULT_PER_PAGE).await,
        None => store.fetch_books(page, DEFAULT_PER_PAGE).await,
    }
    if let Some(e) = store.status.last_error {
        bail!(e);
    }

    if store.books.is_empty() {
        println!("No books found");
        return Ok(());
    }
    for book in &store.books {
        println!(
            "{:>5}  {:<40}  {:<25}  {}",
            book.id,
            clip(&book.title, 40),
            clip(&book.author, 25),
            book.availability_display()
        );
    }
    println!("{}", store.pagination.display());
    Ok(())
}

pub async fn book(client: &Client, id: i64) -> Result<()> {
    let mut store = client.books();
    store.fetch_book(id).await;
    if let Some(e) = store.status.last_error {
        bail!(e);
    }
    let Some(book) = store.book else {
        bail!("Book {} not found", id);
    };

    println!("{}", book.title);
    println!("  Author:    {}", book.author);
    println!("  ISBN:      {}", book.isbn);
    if let Some(published) = book.published_on {
        println!("  Published: {}", published);
    }
    println!("  Stock:     {}", book.availability_display());
    Ok(())
}

pub async fn categories(client: &Client, page: u32) -> Result<()> {
    let mut store = client.categories();
    store.fetch_categories(page).await;
    if let Some(e) = store.status.last_error {
        bail!(e);
    }

    if store.categories.is_empty() {
        println!("No categories");
        return Ok(());
    }
    for category in &store.categories {
        println!(
            "{:>5}  {:<30}  {:>4} book(s)  {}",
            category.id,
            clip(&category.name, 30),
            category.book_count,
            category.description.as_deref().unwrap_or("")
        );
    }
    println!("{}", store.pagination.display());
    Ok(())
}
