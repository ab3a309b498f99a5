use checkout_index::{IndexBuilder, IndexConfig, IndexLayout, Query, SearchEngine};
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::tempdir;
use tokio::sync::Barrier;
use tokio::task;

fn build_config(dir: &std::path::Path, ids: usize, per_id: usize) -> IndexConfig {
    let config = IndexConfig::in_dir(dir).with_table_size(32);
    let mut dataset = String::new();
    for round in 0..per_id {
        for id in 0..ids {
            dataset.push_str(&format!(
                "{id},BC{round}-{id},BOOK,Main,QA{round},{:02}/15/2010 09:00:00\n",
                round % 12 + 1
            ));
        }
    }
    fs::write(&config.dataset_path, dataset).expect("Failed to write dataset");

    IndexBuilder::new(32)
        .with_layout(IndexLayout::Versioned)
        .build(&config.dataset_path, &config.header_path, &config.chain_path)
        .expect("Failed to build index");
    config
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_searches_share_one_index() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = build_config(dir.path(), 20, 12);
    let engine = Arc::new(SearchEngine::open(&config).expect("Failed to open engine"));

    let expected: Vec<Vec<u8>> = (0..20)
        .map(|id| {
            engine
                .search(&Query::by_id(id.to_string()))
                .expect("Search failed")
                .into_payload()
        })
        .collect();
    let expected = Arc::new(expected);

    let barrier = Arc::new(Barrier::new(8));
    let checked = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();

    for worker in 0..8 {
        let engine = Arc::clone(&engine);
        let expected = Arc::clone(&expected);
        let barrier = Arc::clone(&barrier);
        let checked = Arc::clone(&checked);

        handles.push(task::spawn(async move {
            barrier.wait().await;
            for i in 0..40 {
                let id = (worker * 7 + i) % 20;
                let engine = Arc::clone(&engine);
                let payload = task::spawn_blocking(move || {
                    engine
                        .search(&Query::by_id(id.to_string()))
                        .expect("Search failed")
                        .into_payload()
                })
                .await
                .expect("Search task panicked");

                assert_eq!(payload, expected[id], "Mismatch for id {id}");
                checked.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    for handle in handles {
        handle.await.expect("Worker panicked");
    }

    assert_eq!(checked.load(Ordering::Relaxed), 8 * 40);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cloned_engines_see_the_same_table() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = build_config(dir.path(), 5, 24);
    let engine = SearchEngine::open(&config).expect("Failed to open engine");

    let mut handles = Vec::new();
    for month in 1..=12u32 {
        let cloned = engine.clone();
        assert!(Arc::ptr_eq(cloned.index(), engine.index()));
        handles.push(task::spawn_blocking(move || {
            cloned
                .search(&Query::new("3", 2010, month))
                .expect("Search failed")
                .match_count()
        }));
    }

    for handle in handles {
        // 24 rounds spread over 12 months.
        assert_eq!(handle.await.expect("Search task panicked"), 2);
    }
}
