use checkout_index::constants::{CHAIN_NODE_SIZE, PREAMBLE_SIZE, SENTINEL_OFFSET};
use checkout_index::digest::bucket_for;
use checkout_index::{
    ChainStore, HashIndex, HeaderFormat, IndexBuilder, IndexError, IndexLayout, Query,
    RecordStore, SearchEngine, IndexConfig,
};
use std::fs;
use tempfile::tempdir;

const DATASET: &str = "\
BibNumber,ItemBarcode,ItemType,Collection,CallNumber,CheckoutDateTime
100,B1,BOOK,Main,QA1,01/01/2005 10:00:00
200,B2,BOOK,Main,QA2,02/01/2005 10:00:00

100,B3,DVD,Branch,PN1,03/01/2005 10:00:00
";

#[test]
fn test_build_report_and_file_sizes() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = IndexConfig::in_dir(dir.path()).with_table_size(128);
    fs::write(&config.dataset_path, DATASET).expect("Failed to write dataset");

    let report = IndexBuilder::new(128)
        .skip_header_row(true)
        .build(&config.dataset_path, &config.header_path, &config.chain_path)
        .expect("Build failed");

    assert_eq!(report.records_indexed, 3);
    assert_eq!(report.lines_skipped, 2); // column header + blank line
    assert_eq!(report.longest_chain, 2);
    assert_eq!(report.occupied_buckets, 2);
    assert_eq!(report.chain_bytes, 3 * CHAIN_NODE_SIZE as u64);
    assert_eq!(report.header_bytes, (PREAMBLE_SIZE + 128 * 8) as u64);

    assert_eq!(
        fs::metadata(&config.chain_path).expect("No chain file").len(),
        report.chain_bytes
    );
    assert_eq!(
        fs::metadata(&config.header_path).expect("No header file").len(),
        report.header_bytes
    );
}

#[test]
fn test_every_node_points_at_a_line_of_its_bucket() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = IndexConfig::in_dir(dir.path()).with_table_size(4);
    fs::write(&config.dataset_path, DATASET).expect("Failed to write dataset");

    IndexBuilder::new(4)
        .with_layout(IndexLayout::Legacy)
        .build(&config.dataset_path, &config.header_path, &config.chain_path)
        .expect("Build failed");

    let index = HashIndex::load(&config.header_path, 4, HeaderFormat::Auto).expect("Load failed");
    assert_eq!(index.layout(), IndexLayout::Legacy);

    let chain = ChainStore::open(&config.chain_path, IndexLayout::Legacy).expect("Open failed");
    let mut records = RecordStore::open(&config.dataset_path).expect("Open failed");
    let mut seen = 0;

    for bucket in 0..4 {
        let head = index.bucket_head(bucket);
        if head == SENTINEL_OFFSET {
            continue;
        }

        for step in chain.walk(head, None) {
            let (_, node) = step.expect("Walk failed");
            let line = records
                .read_line_at(node.data_offset)
                .expect("Read failed")
                .expect("Dangling data offset");
            let key = line.split(|&b| b == b',').next().expect("No key");
            assert_eq!(bucket_for(key, 4), bucket);
            seen += 1;
        }
    }

    // Without skipping, the column header row is indexed too.
    assert_eq!(seen, 4);
}

#[test]
fn test_rebuilt_index_is_searchable() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = IndexConfig::in_dir(dir.path()).with_table_size(16);
    fs::write(&config.dataset_path, DATASET).expect("Failed to write dataset");

    let builder = IndexBuilder::new(16).skip_header_row(true);
    builder
        .build(&config.dataset_path, &config.header_path, &config.chain_path)
        .expect("Build failed");

    // Append to the dataset and rebuild in place.
    let mut grown = DATASET.to_string();
    grown.push_str("300,B4,BOOK,Main,QA9,12/24/2005 18:00:00\n");
    fs::write(&config.dataset_path, grown).expect("Failed to write dataset");
    let report = builder
        .build(&config.dataset_path, &config.header_path, &config.chain_path)
        .expect("Rebuild failed");
    assert_eq!(report.records_indexed, 4);

    let engine = SearchEngine::open(&config).expect("Open failed");
    assert_eq!(engine.search(&Query::by_id("100")).expect("Search failed").match_count(), 2);
    assert_eq!(
        engine.search(&Query::new("300", 2005, 12)).expect("Search failed").match_count(),
        1
    );
}

#[test]
fn test_crlf_dataset_lines_keep_their_offsets() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = IndexConfig::in_dir(dir.path()).with_table_size(8);
    fs::write(
        &config.dataset_path,
        "1,A,BOOK,Main,QA1,05/05/2005 10:00:00\r\n2,B,BOOK,Main,QA1,06/06/2006 10:00:00\r\n",
    )
    .expect("Failed to write dataset");

    IndexBuilder::new(8)
        .build(&config.dataset_path, &config.header_path, &config.chain_path)
        .expect("Build failed");

    let engine = SearchEngine::open(&config).expect("Open failed");
    let result = engine.search(&Query::new("2", 2006, 6)).expect("Search failed");
    assert!(result.as_text().contains("2,B,BOOK,Main,QA1,06/06/2006 10:00:00\r\n"));
}

#[test]
fn test_zero_table_size_is_rejected() {
    let dir = tempdir().expect("Failed to create temp dir");
    let dataset = dir.path().join("Data2005.csv");
    fs::write(&dataset, DATASET).expect("Failed to write dataset");

    let err = IndexBuilder::new(0)
        .build(&dataset, &dir.path().join("h.dat"), &dir.path().join("c.dat"))
        .expect_err("Zero buckets");
    assert!(matches!(err, IndexError::Configuration(_)));
}

#[test]
fn test_missing_dataset_is_unavailable() {
    let dir = tempdir().expect("Failed to create temp dir");
    let err = IndexBuilder::new(8)
        .build(
            &dir.path().join("missing.csv"),
            &dir.path().join("h.dat"),
            &dir.path().join("c.dat"),
        )
        .expect_err("Missing dataset");
    assert!(matches!(err, IndexError::IndexUnavailable { .. }));
}
