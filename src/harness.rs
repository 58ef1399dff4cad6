//! Multi-scale orchestration.
//!
//! Per scale: cleanup, drop indexes, baseline pass, create indexes, cleanup,
//! indexed pass. Both passes feed the aggregator; nothing escapes as an
//! error — every failure degrades to a log entry plus a sentinel cell so a
//! report is always produced.

use crate::indexing;
use crate::report;
use crate::runner::{RunnerConfig, WorkloadRunner};
use crate::BookStore;
use tracing::{info, warn};

pub const DEFAULT_SCALES: [usize; 4] = [100, 1_000, 10_000, 100_000];

pub struct Harness {
    scales: Vec<usize>,
    runner: WorkloadRunner,
}

impl Harness {
    pub fn new(scales: Vec<usize>, cfg: RunnerConfig) -> Self {
        let scales = if scales.is_empty() {
            DEFAULT_SCALES.to_vec()
        } else {
            scales
        };
        Self { scales, runner: WorkloadRunner::new(cfg) }
    }

    /// Run the full comparison and return the rendered multi-scale report.
    pub fn run_comparison_table(&self, backends: &mut [Box<dyn BookStore>]) -> String {
        let mut per_scale = Vec::with_capacity(self.scales.len());
        for &scale in &self.scales {
            info!(scale, "starting scale pass");
            cleanup(backends);
            indexing::drop_indexes(backends);
            let baseline = self.runner.run_workload(scale, backends, false);

            indexing::create_indexes(backends);
            cleanup(backends);
            let indexed = self.runner.run_workload(scale, backends, true);

            per_scale.push((baseline, indexed));
        }
        report::render(&per_scale)
    }
}

/// The cleanup barrier between passes: a pass never starts until every
/// backend's data from the previous pass is removed.
fn cleanup(backends: &mut [Box<dyn BookStore>]) {
    for store in backends.iter_mut() {
        if let Err(e) = store.delete_all() {
            warn!(backend = store.name(), error = %e, "cleanup failed");
        }
    }
}
