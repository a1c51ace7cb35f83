use crate::{
    Error, ListingParams,
    error::Result,
    rating::{RunningAverage, Stars},
};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::Pool;
use time::OffsetDateTime;
use tracing::debug;

/// Fields a client may change on an existing book
pub const WRITABLE_FIELDS: &[&str] = &["title", "author", "description", "published_year"];

const COLUMNS: &str = "id, isbn, title, author, description, published_year, rating, vote_count, version, created_at, updated_at";

fn not_blank(value: &str, _ctx: &()) -> garde::Result {
    if value.trim().is_empty() {
        Err(garde::Error::new("must not be blank"))
    } else {
        Ok(())
    }
}

fn not_blank_if_set(value: &Option<String>, ctx: &()) -> garde::Result {
    match value {
        Some(value) => not_blank(value, ctx),
        None => Ok(()),
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateBook {
    #[garde(length(min = 1, max = 32), custom(not_blank))]
    pub isbn: String,
    #[garde(length(min = 1, max = 511), custom(not_blank))]
    pub title: String,
    #[garde(length(min = 1, max = 255), custom(not_blank))]
    pub author: String,
    #[garde(length(max = 5000))]
    pub description: Option<String>,
    #[garde(range(min = -5000, max = 9999))]
    pub published_year: Option<i32>,
}

/// Partial update, fields left as `None` keep their stored value
#[derive(Debug, Serialize, Deserialize, Clone, Default, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(deny_unknown_fields)]
pub struct UpdateBook {
    #[garde(length(min = 1, max = 511), custom(not_blank_if_set))]
    pub title: Option<String>,
    #[garde(length(min = 1, max = 255), custom(not_blank_if_set))]
    pub author: Option<String>,
    #[garde(length(max = 5000))]
    pub description: Option<String>,
    #[garde(range(min = -5000, max = 9999))]
    pub published_year: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub published_year: Option<i32>,
    pub rating: f64,
    pub vote_count: i64,
    #[serde(skip)]
    pub version: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub type BookRepository = BookRepositoryImpl<Pool<crate::ChosenDB>>;

pub struct BookRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> BookRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn insert(&self, payload: CreateBook) -> Result<Book> {
        let now = OffsetDateTime::now_utc();
        let sql = format!(
            "INSERT INTO book (isbn, title, author, description, published_year, rating, vote_count, version, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 0.0, 0, 1, ?, ?) RETURNING {COLUMNS}"
        );
        let record = sqlx::query_as::<_, Book>(&sql)
            .bind(&payload.isbn)
            .bind(&payload.title)
            .bind(&payload.author)
            .bind(&payload.description)
            .bind(payload.published_year)
            .bind(now)
            .bind(now)
            .fetch_one(&self.executor)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_error) if db_error.is_unique_violation() => {
                    debug!("Unique constraint hit for ISBN {}", payload.isbn);
                    Error::Conflict(format!("ISBN {} already exists", payload.isbn))
                }
                e => e.into(),
            })?;
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> Result<Book> {
        let sql = format!("SELECT {COLUMNS} FROM book WHERE id = ?");
        sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("Book {id}")))
    }

    pub async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let sql = format!("SELECT {COLUMNS} FROM book WHERE isbn = ?");
        let record = sqlx::query_as::<_, Book>(&sql)
            .bind(isbn)
            .fetch_optional(&self.executor)
            .await?;
        Ok(record)
    }

    pub async fn list(&self, params: ListingParams) -> Result<Vec<Book>> {
        let (offset, limit) = params.bounds();
        let sql = format!(
            "SELECT {COLUMNS} FROM book
            WHERE (?1 IS NULL OR instr(lower(author), lower(?1)) > 0)
            ORDER BY id LIMIT ?2 OFFSET ?3"
        );
        let records = sqlx::query_as::<_, Book>(&sql)
            .bind(&params.author)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.executor)
            .await?;
        Ok(records)
    }

    pub async fn count(&self, author: Option<&str>) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM book WHERE (?1 IS NULL OR instr(lower(author), lower(?1)) > 0)",
        )
        .bind(author)
        .fetch_one(&self.executor)
        .await?;
        Ok(count.max(0) as u64)
    }

    pub async fn update_fields(&self, id: i64, payload: UpdateBook) -> Result<Book> {
        let sql = format!(
            "UPDATE book SET
            title = COALESCE(?, title),
            author = COALESCE(?, author),
            description = COALESCE(?, description),
            published_year = COALESCE(?, published_year),
            version = version + 1,
            updated_at = max(?, created_at)
            WHERE id = ? RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&sql)
            .bind(&payload.title)
            .bind(&payload.author)
            .bind(&payload.description)
            .bind(payload.published_year)
            .bind(OffsetDateTime::now_utc())
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("Book {id}")))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM book WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound(format!("Book {id}")))
        } else {
            Ok(())
        }
    }

    /// Adds vote to the running average of the book.
    ///
    /// Average is recomputed by the database from the stored state in the same statement
    /// that writes it, using the formula of [`RunningAverage::with_vote`], so concurrent
    /// votes are serialized by the write lock and none of them is lost.
    pub async fn apply_vote(&self, id: i64, stars: Stars) -> Result<Book> {
        let sql = format!(
            "UPDATE book SET
            rating = min({max:.1}, max({min:.1}, (rating * vote_count + ?) / (vote_count + 1))),
            vote_count = vote_count + 1,
            version = version + 1,
            updated_at = max(?, updated_at)
            WHERE id = ? RETURNING {COLUMNS}",
            min = RunningAverage::MIN,
            max = RunningAverage::MAX,
        );
        let record = sqlx::query_as::<_, Book>(&sql)
            .bind(f64::from(stars.value()))
            .bind(OffsetDateTime::now_utc())
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("Book {id}")))?;
        debug!(
            "Vote {} on book {id}, vote count {}",
            stars.value(),
            record.vote_count
        );
        Ok(record)
    }
}
