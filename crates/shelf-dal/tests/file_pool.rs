use std::time::Duration;

use shelf_dal::{
    Error,
    book::{BookRepository, CreateBook, UpdateBook},
    rating::Stars,
};
use tempfile::TempDir;
use tracing_test::traced_test;

async fn file_pool(dir: &TempDir) -> shelf_dal::Pool {
    let url = format!("sqlite://{}", dir.path().join("shelf.db").display());
    shelf_dal::new_pool(&url, Duration::from_secs(30))
        .await
        .unwrap()
}

fn new_book(isbn: &str) -> CreateBook {
    CreateBook {
        isbn: isbn.to_string(),
        title: "Crowded".to_string(),
        author: "Many".to_string(),
        description: None,
        published_year: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[traced_test]
async fn test_many_votes_on_file_database() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir).await;
    let repo = BookRepository::new(pool.clone());
    let book = repo.insert(new_book("V1")).await.unwrap();

    let votes: Vec<i64> = (0..400).map(|i| (i * 5) % 6).collect();
    let handles = votes
        .iter()
        .map(|v| {
            let repo = BookRepository::new(pool.clone());
            let stars = Stars::try_from(*v).unwrap();
            let id = book.id;
            tokio::spawn(async move { repo.apply_vote(id, stars).await })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let book = repo.get(book.id).await.unwrap();
    let mean = votes.iter().sum::<i64>() as f64 / votes.len() as f64;
    assert_eq!(book.vote_count, votes.len() as i64);
    assert!((book.rating - mean).abs() < 1e-6);
    assert_eq!(book.version, 1 + votes.len() as i64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_votes_and_updates_on_file_database() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir).await;
    let repo = BookRepository::new(pool.clone());
    let book = repo.insert(new_book("V2")).await.unwrap();

    let mut handles = vec![];
    for i in 0..100 {
        let voter = BookRepository::new(pool.clone());
        let editor = BookRepository::new(pool.clone());
        let id = book.id;
        handles.push(tokio::spawn(async move {
            voter
                .apply_vote(id, Stars::try_from(2).unwrap())
                .await
                .map(|_| ())
        }));
        handles.push(tokio::spawn(async move {
            let update = UpdateBook {
                description: Some(format!("Edit {i}")),
                ..Default::default()
            };
            editor.update_fields(id, update).await.map(|_| ())
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let book = repo.get(book.id).await.unwrap();
    assert_eq!(book.vote_count, 100);
    assert!((book.rating - 2.0).abs() < 1e-9);
    assert_eq!(book.version, 201);
    assert!(book.updated_at >= book.created_at);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_duplicate_isbn_on_file_database() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir).await;

    let handles = (0..8)
        .map(|_| {
            let repo = BookRepository::new(pool.clone());
            tokio::spawn(async move { repo.insert(new_book("SAME")).await })
        })
        .collect::<Vec<_>>();
    let mut ok = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(Error::Conflict(_)) => conflicts += 1,
            Err(e) => panic!("Unexpected error: {e}"),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(conflicts, 7);

    let repo = BookRepository::new(pool);
    assert_eq!(repo.count(None).await.unwrap(), 1);
}
