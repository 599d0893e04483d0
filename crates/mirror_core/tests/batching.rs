use std::path::PathBuf;

use mirror_core::BatchCoordinator;

fn p(name: &str) -> PathBuf {
    PathBuf::from(name)
}

#[test]
fn flushes_at_threshold_then_trailing_remainder() {
    let mut coordinator = BatchCoordinator::new(2);

    assert_eq!(coordinator.ingest(p("x")), None);
    let first = coordinator.ingest(p("y")).expect("full batch");
    assert_eq!(first.number, 1);
    assert_eq!(first.paths, vec![p("x"), p("y")]);

    assert_eq!(coordinator.ingest(p("z")), None);
    let trailing = coordinator.finish().expect("trailing batch");
    assert_eq!(trailing.number, 2);
    assert_eq!(trailing.paths, vec![p("z")]);

    // Nothing left once the trailing batch is emitted.
    assert_eq!(coordinator.finish(), None);
    assert_eq!(coordinator.pending_len(), 0);
}

#[test]
fn no_trailing_batch_when_stream_divides_evenly() {
    let mut coordinator = BatchCoordinator::new(2);
    assert!(coordinator.ingest(p("a")).is_none());
    assert!(coordinator.ingest(p("b")).is_some());
    assert_eq!(coordinator.finish(), None);
}

#[test]
fn deduplicates_keeping_first_occurrence_order() {
    let mut coordinator = BatchCoordinator::new(3);
    assert!(coordinator.ingest(p("a")).is_none());
    assert!(coordinator.ingest(p("b")).is_none());
    let batch = coordinator.ingest(p("a")).expect("full batch");
    assert_eq!(batch.paths, vec![p("a"), p("b")]);
}

#[test]
fn total_flushed_paths_equal_unique_ingested_paths() {
    let mut coordinator = BatchCoordinator::new(4);
    let names = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];

    let mut flushed = 0;
    for name in names {
        if let Some(batch) = coordinator.ingest(p(name)) {
            flushed += batch.len();
        }
    }
    if let Some(batch) = coordinator.finish() {
        flushed += batch.len();
    }
    assert_eq!(flushed, names.len());
}

#[test]
fn batch_numbers_increase_monotonically() {
    let mut coordinator = BatchCoordinator::new(1);
    let numbers: Vec<u64> = ["a", "b", "c"]
        .into_iter()
        .map(|name| coordinator.ingest(p(name)).expect("threshold of one").number)
        .collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[test]
fn zero_threshold_behaves_as_one() {
    let mut coordinator = BatchCoordinator::new(0);
    let batch = coordinator.ingest(p("only")).expect("emitted immediately");
    assert_eq!(batch.paths, vec![p("only")]);
}
