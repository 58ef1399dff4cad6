//! The canonical six-operation workload, executed strictly sequentially.
//!
//! Operation order is fixed: INSERT precedes all reads, updates and the final
//! DELETE, and operation N+1 assumes operation N's backend state. Point reads
//! run under a warmup-then-measure discipline; single measurements time the
//! operation once. A failing operation never aborts the pass: it is logged
//! and recorded as a `Failed` sentinel, so every backend always produces a
//! value for every row.

use crate::generator::{author_count, DataGen, DEFAULT_SEED};
use crate::measure::{timed, Sample};
use crate::report::{Operation, ResultMatrix};
use crate::{BookStore, StoreResult};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const RARE_PEN_NAME: &str = "The Quiet Quill";
const POPULAR_PEN_NAME: &str = "The Market Favorite";

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Measured repetitions per point-read scenario.
    pub measured_reads: usize,
    /// Unmeasured reads before each read scenario, to let caches and
    /// connections stabilize.
    pub warmup_reads: usize,
    /// Fixed settle pause before each read scenario.
    pub settle_pause: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            measured_reads: 50,
            warmup_reads: 10,
            settle_pause: Duration::from_millis(25),
        }
    }
}

pub struct WorkloadRunner {
    cfg: RunnerConfig,
}

impl WorkloadRunner {
    pub fn new(cfg: RunnerConfig) -> Self {
        Self { cfg }
    }

    /// Execute the full workload at `scale` against every backend and return
    /// the populated matrix. `indexed` only labels the pass; index state is
    /// managed by the caller between passes.
    pub fn run_workload(
        &self,
        scale: usize,
        backends: &mut [Box<dyn BookStore>],
        indexed: bool,
    ) -> ResultMatrix {
        let mut gen = DataGen::new(DEFAULT_SEED);
        let authors = gen.gen_authors(author_count(scale));
        let books = gen.gen_books(scale, &authors);
        let popular = authors[0].id;
        let rare = authors[authors.len() - 1].id;

        let mut matrix = ResultMatrix::new(scale, indexed);

        matrix.push(
            Operation::Insert,
            per_backend(backends, |s| {
                self.once(s, Operation::Insert, |s| s.insert_all(&authors, &books))
            }),
        );

        thread::sleep(self.cfg.settle_pause);
        matrix.push(
            Operation::ReadSimple,
            per_backend(backends, |s| {
                self.averaged_read(s, Operation::ReadSimple, |s| s.find_author(rare).map(drop))
            }),
        );

        thread::sleep(self.cfg.settle_pause);
        matrix.push(
            Operation::ReadJoin,
            per_backend(backends, |s| {
                self.averaged_read(s, Operation::ReadJoin, |s| {
                    s.find_author_with_books(rare).map(drop)
                })
            }),
        );

        matrix.push(
            Operation::UpdateSingle,
            per_backend(backends, |s| {
                self.once(s, Operation::UpdateSingle, |s| {
                    s.rename_author(rare, RARE_PEN_NAME)
                })
            }),
        );

        // The popular author is referenced by roughly half the books, so this
        // measures a logically-shared-field update across each representation.
        matrix.push(
            Operation::UpdateMass,
            per_backend(backends, |s| {
                self.once(s, Operation::UpdateMass, |s| {
                    s.rename_author(popular, POPULAR_PEN_NAME)
                })
            }),
        );

        matrix.push(
            Operation::Delete,
            per_backend(backends, |s| {
                self.once(s, Operation::Delete, |s| s.delete_all())
            }),
        );

        matrix
    }

    /// Time one operation once.
    fn once(
        &self,
        store: &mut dyn BookStore,
        operation: Operation,
        f: impl FnOnce(&mut dyn BookStore) -> StoreResult<()>,
    ) -> Sample {
        let name = store.name();
        match timed(|| f(store)) {
            Ok((elapsed, ())) => Sample::Ok(elapsed),
            Err(e) => {
                warn!(
                    backend = name,
                    operation = operation.label(),
                    error = %e.source,
                    "operation failed"
                );
                Sample::Failed(e.elapsed)
            }
        }
    }

    /// Warmup-then-measure read loop; the sample is the arithmetic mean of
    /// the successful measured reads. Warmup errors are swallowed; measured
    /// errors are logged without aborting the loop. All measured reads
    /// failing yields a `Failed` sentinel.
    fn averaged_read(
        &self,
        store: &mut dyn BookStore,
        operation: Operation,
        mut f: impl FnMut(&mut dyn BookStore) -> StoreResult<()>,
    ) -> Sample {
        let name = store.name();
        for _ in 0..self.cfg.warmup_reads {
            if let Err(e) = f(store) {
                debug!(
                    backend = name,
                    operation = operation.label(),
                    error = %e,
                    "warmup read failed"
                );
            }
        }

        let mut total = Duration::ZERO;
        let mut successes = 0u32;
        let mut failed_total = Duration::ZERO;
        let mut failures = 0u32;
        for _ in 0..self.cfg.measured_reads {
            match timed(|| f(&mut *store)) {
                Ok((elapsed, ())) => {
                    total += elapsed;
                    successes += 1;
                }
                Err(e) => {
                    failures += 1;
                    failed_total += e.elapsed;
                    warn!(
                        backend = name,
                        operation = operation.label(),
                        error = %e.source,
                        "measured read failed"
                    );
                }
            }
        }

        if successes > 0 {
            if failures > 0 {
                warn!(
                    backend = name,
                    operation = operation.label(),
                    failures,
                    "partial failures excluded from the mean"
                );
            }
            Sample::Ok(total / successes)
        } else {
            Sample::Failed(failed_total / failures.max(1))
        }
    }
}

fn per_backend(
    backends: &mut [Box<dyn BookStore>],
    mut f: impl FnMut(&mut dyn BookStore) -> Sample,
) -> [Sample; 3] {
    // Cells for absent backends stay at the sentinel, so the matrix always
    // carries a value per backend column.
    let mut out = [Sample::Failed(Duration::ZERO); 3];
    for store in backends.iter_mut() {
        let column = store.kind().column();
        out[column] = f(store.as_mut());
    }
    out
}
