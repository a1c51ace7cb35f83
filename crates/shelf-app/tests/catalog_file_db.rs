use std::time::Duration;

use shelf_app::{catalog::Catalog, error::ApiError, state::AppConfig};
use shelf_dal::book::CreateBook;
use tempfile::TempDir;
use tracing_test::traced_test;

async fn file_pool(dir: &TempDir) -> shelf_dal::Pool {
    let url = format!("sqlite://{}", dir.path().join("shelf.db").display());
    shelf_dal::new_pool(&url, Duration::from_secs(30))
        .await
        .unwrap()
}

fn new_book(isbn: &str, title: &str) -> CreateBook {
    CreateBook {
        isbn: isbn.to_string(),
        title: title.to_string(),
        author: "X".to_string(),
        description: None,
        published_year: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[traced_test]
async fn test_concurrent_create_same_isbn() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir).await;
    let config = AppConfig::default();
    let first = Catalog::new(pool.clone(), &config);
    let second = Catalog::new(pool.clone(), &config);

    let (r1, r2) = tokio::join!(
        first.create(new_book("SAME", "First")),
        second.create(new_book("SAME", "Second"))
    );
    let results = [r1, r2];
    let ok = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(ApiError::Conflict(_))))
        .count();
    assert_eq!(ok, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(first.count(None).await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_votes_through_catalog() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir).await;
    let config = AppConfig::default();
    let catalog = Catalog::new(pool.clone(), &config);
    let book = catalog.create(new_book("V1", "Voted")).await.unwrap();

    let handles = (0..300)
        .map(|i| {
            let catalog = Catalog::new(pool.clone(), &config);
            let id = book.id;
            tokio::spawn(async move { catalog.vote(id, if i % 2 == 0 { 1 } else { 5 }).await })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let book = catalog.get(book.id).await.unwrap();
    assert_eq!(book.vote_count, 300);
    assert!((book.rating - 3.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_create_is_validated() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir).await;
    let catalog = Catalog::new(pool, &AppConfig::default());

    let res = catalog.create(new_book("A1", "  ")).await;
    assert!(matches!(res, Err(ApiError::Validation(_))));
    let res = catalog.vote(1, 6).await;
    assert!(matches!(res, Err(ApiError::Validation(_))));
    assert_eq!(catalog.count(None).await.unwrap(), 0);
}
