//! Business rules of the book catalog on top of [`BookRepository`].
//!
//! Store outcomes are passed to callers as [`ApiError`] variants, nothing is turned into
//! a success here.

use std::future::Future;

use garde::Validate as _;
use serde_json::{Map, Value};
use shelf_dal::{
    book::{Book, BookRepository, CreateBook, UpdateBook, WRITABLE_FIELDS},
    rating::Stars,
    Pool,
};
use tracing::{debug, info, warn};

use crate::{
    error::{ApiError, ApiResult},
    rest_api::Paging,
    state::{AppConfig, AppState},
};

pub struct Catalog {
    books: BookRepository,
    default_page_size: u32,
    max_page_size: u32,
}

impl axum::extract::FromRequestParts<AppState> for Catalog {
    type Rejection = http::StatusCode;

    fn from_request_parts(
        _parts: &mut http::request::Parts,
        state: &AppState,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        futures::future::ready(Ok(Catalog::new(state.pool().clone(), state.config())))
    }
}

/// Checks patch keys against the list of client writable fields
pub fn apply_write_mask(patch: Map<String, Value>) -> ApiResult<UpdateBook> {
    if let Some(field) = patch
        .keys()
        .find(|k| !WRITABLE_FIELDS.contains(&k.as_str()))
    {
        return Err(ApiError::Validation(format!(
            "field `{field}` cannot be updated, writable fields are: {}",
            WRITABLE_FIELDS.join(", ")
        )));
    }
    let update: UpdateBook = serde_json::from_value(Value::Object(patch))
        .map_err(|e| ApiError::Validation(format!("invalid update: {e}")))?;
    update.validate()?;
    Ok(update)
}

impl Catalog {
    pub fn new(pool: Pool, config: &AppConfig) -> Self {
        Self {
            books: BookRepository::new(pool),
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        }
    }

    pub async fn create(&self, payload: CreateBook) -> ApiResult<Book> {
        payload.validate()?;
        if self.books.find_by_isbn(&payload.isbn).await?.is_some() {
            warn!("Attempted to create duplicate ISBN: {}", payload.isbn);
            return Err(ApiError::Conflict(format!(
                "ISBN {} already exists",
                payload.isbn
            )));
        }
        let book = self.books.insert(payload).await?;
        info!("Created book: {} (ID: {})", book.title, book.id);
        Ok(book)
    }

    pub async fn get(&self, id: i64) -> ApiResult<Book> {
        let book = self.books.get(id).await?;
        debug!("Retrieved book: {} (ID: {id})", book.title);
        Ok(book)
    }

    pub async fn find_by_isbn(&self, isbn: &str) -> ApiResult<Book> {
        self.books
            .find_by_isbn(isbn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Book with ISBN {isbn}")))
    }

    pub async fn list(&self, paging: Paging) -> ApiResult<Vec<Book>> {
        let params = paging.into_listing_params(self.default_page_size, self.max_page_size)?;
        let books = self.books.list(params).await?;
        debug!("Retrieved {} books", books.len());
        Ok(books)
    }

    pub async fn count(&self, author: Option<&str>) -> ApiResult<u64> {
        let author = author.filter(|a| !a.trim().is_empty());
        Ok(self.books.count(author).await?)
    }

    pub async fn update(&self, id: i64, patch: Map<String, Value>) -> ApiResult<Book> {
        let update = apply_write_mask(patch)?;
        let book = self.books.update_fields(id, update).await?;
        info!("Updated book: {} (ID: {id})", book.title);
        Ok(book)
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.books.delete(id).await?;
        info!("Deleted book ID: {id}");
        Ok(())
    }

    pub async fn vote(&self, id: i64, stars: i64) -> ApiResult<Book> {
        let stars = Stars::try_from(stars)?;
        let book = self.books.apply_vote(id, stars).await?;
        info!(
            "Vote added to book {}: {} stars (new avg: {:.2})",
            book.title,
            stars.value(),
            book.rating
        );
        Ok(book)
    }
}
