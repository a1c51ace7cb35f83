use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;
use shelf_dal::book::Book;
use tracing::info;
use url::Url;

use crate::extend_url;

pub async fn create_book(
    client: &reqwest::Client,
    base_url: &Url,
    isbn: &str,
    title: &str,
    author: &str,
) -> Result<Book> {
    let payload = json!({"isbn": isbn, "title": title, "author": author});
    let api_url = base_url.join("books")?;

    let response = client.post(api_url).json(&payload).send().await?;
    info!("Create response: {:#?}", response);
    assert_eq!(response.status(), StatusCode::CREATED);

    let new_book: Book = response.json().await?;
    Ok(new_book)
}

pub async fn vote(
    client: &reqwest::Client,
    base_url: &Url,
    id: i64,
    stars: i64,
) -> Result<reqwest::Response> {
    let api_url = extend_url(&extend_url(&base_url.join("books")?, id), "vote");
    let response = client
        .post(api_url)
        .json(&json!({ "stars": stars }))
        .send()
        .await?;
    Ok(response)
}

pub async fn get_book(client: &reqwest::Client, base_url: &Url, id: i64) -> Result<reqwest::Response> {
    let api_url = extend_url(&base_url.join("books")?, id);
    Ok(client.get(api_url).send().await?)
}
