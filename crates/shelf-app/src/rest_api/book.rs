use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post},
    Json,
};
use garde::Validate;
use http::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
#[cfg_attr(not(feature = "openapi"), allow(unused_imports))]
use shelf_dal::book::{Book, CreateBook, UpdateBook};

use crate::{
    catalog::Catalog, error::ApiResult, rest_api::Paging, state::AppState, validate::Garde,
};

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VoteRequest {
    /// Rating from 0 to 5 stars
    #[garde(range(min = 0, max = 5))]
    pub stars: i64,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct CountQuery {
    pub author: Option<String>,
}

#[cfg(feature = "openapi")]
#[derive(utoipa::OpenApi)]
#[openapi(paths(create, list, count, get_one, get_by_isbn, update, delete, vote))]
struct ModuleDocs;

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    ModuleDocs::openapi()
}

#[cfg_attr(feature = "openapi",  utoipa::path(post, path = "", tag = "Book", operation_id = "createBook",
    request_body = CreateBook,
    responses((status = StatusCode::CREATED, description = "Created Book", body = Book),
    (status = StatusCode::CONFLICT, description = "ISBN already exists", body = crate::error::ErrorBody))))]
pub async fn create(
    catalog: Catalog,
    Json(payload): Json<CreateBook>,
) -> ApiResult<impl IntoResponse> {
    let record = catalog.create(payload).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "", tag = "Book", operation_id = "listBooks",
    params(Paging), responses((status = StatusCode::OK, description = "Books ordered by id", body = Vec<Book>))))]
pub async fn list(catalog: Catalog, Query(paging): Query<Paging>) -> ApiResult<impl IntoResponse> {
    let books = catalog.list(paging).await?;
    Ok((StatusCode::OK, Json(books)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/count", tag = "Book", operation_id = "countBooks",
    params(CountQuery), responses((status = StatusCode::OK, description = "Count", body = u64))))]
pub async fn count(
    catalog: Catalog,
    Query(query): Query<CountQuery>,
) -> ApiResult<impl IntoResponse> {
    let count = catalog.count(query.author.as_deref()).await?;
    Ok((StatusCode::OK, Json(count)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/{id}", tag = "Book", operation_id = "getBook",
    params(("id" = i64, Path, description = "Book id")),
    responses((status = StatusCode::OK, description = "Get one", body = Book),
    (status = StatusCode::NOT_FOUND, description = "Book not found", body = crate::error::ErrorBody))))]
pub async fn get_one(Path(id): Path<i64>, catalog: Catalog) -> ApiResult<impl IntoResponse> {
    let record = catalog.get(id).await?;

    Ok((StatusCode::OK, Json(record)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/isbn/{isbn}", tag = "Book", operation_id = "getBookByIsbn",
    params(("isbn" = String, Path, description = "Book ISBN")),
    responses((status = StatusCode::OK, description = "Book with given ISBN", body = Book))))]
pub async fn get_by_isbn(
    Path(isbn): Path<String>,
    catalog: Catalog,
) -> ApiResult<impl IntoResponse> {
    let record = catalog.find_by_isbn(&isbn).await?;

    Ok((StatusCode::OK, Json(record)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(put, path = "/{id}", tag = "Book", operation_id = "updateBook",
    params(("id" = i64, Path, description = "Book id")),
    request_body = UpdateBook,
    responses((status = StatusCode::OK, description = "Updated Book", body = Book))))]
pub async fn update(
    Path(id): Path<i64>,
    catalog: Catalog,
    Json(patch): Json<Map<String, Value>>,
) -> ApiResult<impl IntoResponse> {
    let record = catalog.update(id, patch).await?;

    Ok((StatusCode::OK, Json(record)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(delete, path = "/{id}", tag = "Book", operation_id = "deleteBook",
    params(("id" = i64, Path, description = "Book id")),
    responses((status = StatusCode::NO_CONTENT, description = "Deleted successfully"))))]
pub async fn delete(Path(id): Path<i64>, catalog: Catalog) -> ApiResult<impl IntoResponse> {
    catalog.delete(id).await?;

    Ok((StatusCode::NO_CONTENT, ()))
}

#[cfg_attr(feature = "openapi",  utoipa::path(post, path = "/{id}/vote", tag = "Book", operation_id = "voteBook",
    params(("id" = i64, Path, description = "Book id")),
    request_body = VoteRequest,
    responses((status = StatusCode::OK, description = "Book with updated rating", body = Book))))]
pub async fn vote(
    Path(id): Path<i64>,
    catalog: Catalog,
    Garde(Json(vote)): Garde<Json<VoteRequest>>,
) -> ApiResult<impl IntoResponse> {
    let record = catalog.vote(id, vote.stars).await?;

    Ok((StatusCode::OK, Json(record)))
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", post(create).get(list))
        .route("/count", get(count))
        .route("/isbn/{isbn}", get(get_by_isbn))
        .route(
            "/{id}",
            get(get_one).put(update).patch(update).delete(delete),
        )
        .route("/{id}/vote", post(vote))
}
