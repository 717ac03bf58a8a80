//! Concurrent readers racing for the same destructive secret

mod common;

use ::common::prelude::*;

const READERS: usize = 64;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_exactly_one_reader_wins() {
    for _ in 0..20 {
        let vault = common::memory_vault();
        let id = vault.create_secret("only once", None, true).await.unwrap();

        let handles: Vec<_> = (0..READERS)
            .map(|_| {
                let vault = vault.clone();
                tokio::spawn(async move { vault.fetch_note(&id).await })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(note) => {
                    assert_eq!(note.text, b"only once");
                    winners += 1;
                }
                Err(e) => assert_eq!(e, VaultError::NotFound),
            }
        }
        assert_eq!(winners, 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_non_destructive_readers_all_win() {
    let vault = common::memory_vault();
    let id = vault
        .create_secret("shared", Some(Attachment::new("f.txt", b"f".to_vec())), false)
        .await
        .unwrap();

    let handles: Vec<_> = (0..READERS)
        .map(|i| {
            let vault = vault.clone();
            tokio::spawn(async move {
                if i % 2 == 0 {
                    vault.fetch_note(&id).await.map(|_| ())
                } else {
                    vault.fetch_file(&id).await.map(|_| ())
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_distinct_ids() {
    let vault = common::memory_vault();

    let handles: Vec<_> = (0..READERS)
        .map(|i| {
            let vault = vault.clone();
            tokio::spawn(async move { vault.create_secret(format!("note {}", i), None, false).await })
        })
        .collect();

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().unwrap());
    }
    assert_eq!(ids.len(), READERS);
    assert_eq!(vault.store().len(), READERS);
}
