use std::collections::HashSet;
use std::path::PathBuf;

/// A flush-ready group of unique local paths, labelled with its per-run
/// number. Numbers only appear in human-readable commit messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub number: u64,
    pub paths: Vec<PathBuf>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Accumulates successfully-changed paths and emits size-bounded batches.
///
/// The coordinator is a pure state machine: the caller owns what happens to
/// an emitted batch, and a flush that fails downstream never feeds back into
/// this state. A batch is emitted exactly once and then discarded.
#[derive(Debug)]
pub struct BatchCoordinator {
    threshold: usize,
    pending: Vec<PathBuf>,
    next_number: u64,
}

impl BatchCoordinator {
    /// A threshold of zero would never emit; clamp to one.
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            pending: Vec::new(),
            next_number: 1,
        }
    }

    /// Record one changed path in arrival order. Returns a sealed batch when
    /// the in-progress batch reaches the threshold.
    pub fn ingest(&mut self, path: PathBuf) -> Option<Batch> {
        self.pending.push(path);
        (self.pending.len() >= self.threshold).then(|| self.seal())
    }

    /// Emit the trailing batch once the input stream is exhausted. The
    /// trailing batch may be smaller than the threshold, never larger.
    pub fn finish(&mut self) -> Option<Batch> {
        (!self.pending.is_empty()).then(|| self.seal())
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Deduplicate keeping first-occurrence order, stamp the next batch
    /// number, and reset the in-progress state.
    fn seal(&mut self) -> Batch {
        let mut seen = HashSet::new();
        let paths: Vec<PathBuf> = self
            .pending
            .drain(..)
            .filter(|path| seen.insert(path.clone()))
            .collect();
        let number = self.next_number;
        self.next_number += 1;
        Batch { number, paths }
    }
}
