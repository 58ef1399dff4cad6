//! Result aggregation and report rendering.
//!
//! One pipe-delimited fixed-width table per scale (operation rows × backend
//! columns × index state), plus a cross-scale percentage-improvement summary.

use crate::measure::Sample;
use crate::BackendKind;
use std::fmt::Write as _;

// ────────────────────────────────────────────────────────────────────────────────
// Operations
// ────────────────────────────────────────────────────────────────────────────────

/// The six canonical workload operations, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    ReadSimple,
    ReadJoin,
    UpdateSingle,
    UpdateMass,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Insert,
        Operation::ReadSimple,
        Operation::ReadJoin,
        Operation::UpdateSingle,
        Operation::UpdateMass,
        Operation::Delete,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Operation::Insert => "INSERT",
            Operation::ReadSimple => "READ-simple",
            Operation::ReadJoin => "READ-join",
            Operation::UpdateSingle => "UPDATE-single",
            Operation::UpdateMass => "UPDATE-mass",
            Operation::Delete => "DELETE",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────────
// Result matrix
// ────────────────────────────────────────────────────────────────────────────────

/// Per-pass timing table: one row per operation, one sample per backend in
/// `BackendKind::column()` order. Populated once by the runner, read-only
/// afterwards.
#[derive(Debug, Clone)]
pub struct ResultMatrix {
    pub scale: usize,
    pub indexed: bool,
    rows: Vec<(Operation, [Sample; 3])>,
}

impl ResultMatrix {
    pub fn new(scale: usize, indexed: bool) -> Self {
        Self { scale, indexed, rows: Vec::with_capacity(Operation::ALL.len()) }
    }

    pub fn push(&mut self, operation: Operation, samples: [Sample; 3]) {
        self.rows.push((operation, samples));
    }

    pub fn rows(&self) -> &[(Operation, [Sample; 3])] {
        &self.rows
    }

    pub fn get(&self, operation: Operation) -> Option<&[Sample; 3]> {
        self.rows
            .iter()
            .find(|(op, _)| *op == operation)
            .map(|(_, samples)| samples)
    }
}

// ────────────────────────────────────────────────────────────────────────────────
// Rendering
// ────────────────────────────────────────────────────────────────────────────────

const OP_W: usize = 14;
const SIZE_W: usize = 8;
const CELL_W: usize = 20;

fn cell(sample: &Sample) -> String {
    match sample {
        Sample::Ok(_) => format!("{:.2}", sample.millis()),
        Sample::Failed(_) => "FAIL".to_string(),
    }
}

/// Merge the two passes of one scale into a fixed-width table.
pub fn merge(no_index: &ResultMatrix, indexed: &ResultMatrix) -> String {
    let mut header = format!("{:<ow$} | {:>sw$}", "Operation", "Size", ow = OP_W, sw = SIZE_W);
    for kind in BackendKind::ALL {
        let _ = write!(
            header,
            " | {:>cw$} | {:>cw$}",
            format!("{} (no idx)", kind.label()),
            format!("{} (idx)", kind.label()),
            cw = CELL_W,
        );
    }
    let rule = "-".repeat(header.len());

    let mut out = String::new();
    let _ = writeln!(out, "=== Scale {} ===", no_index.scale);
    out.push_str(&header);
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    for (operation, baseline) in no_index.rows() {
        let with_index = indexed.get(*operation);
        let _ = write!(
            out,
            "{:<ow$} | {:>sw$}",
            operation.label(),
            no_index.scale,
            ow = OP_W,
            sw = SIZE_W,
        );
        for col in 0..3 {
            let base = cell(&baseline[col]);
            let idx = with_index
                .map(|samples| cell(&samples[col]))
                .unwrap_or_else(|| "--".to_string());
            let _ = write!(out, " | {:>cw$} | {:>cw$}", base, idx, cw = CELL_W);
        }
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');
    out
}

/// Percentage improvement of the indexed pass over the baseline, or `None`
/// when either sample failed. A zero baseline reports 0%.
pub fn improvement(no_index: &Sample, indexed: &Sample) -> Option<f64> {
    match (no_index, indexed) {
        (Sample::Ok(_), Sample::Ok(_)) => {
            let base = no_index.millis();
            if base == 0.0 {
                Some(0.0)
            } else {
                Some((base - indexed.millis()) / base * 100.0)
            }
        }
        _ => None,
    }
}

/// Render the full multi-scale report: one table per scale followed by the
/// cross-scale improvement summary.
pub fn render(per_scale: &[(ResultMatrix, ResultMatrix)]) -> String {
    let mut out = String::new();
    for (baseline, indexed) in per_scale {
        out.push_str(&merge(baseline, indexed));
        out.push('\n');
    }
    out.push_str(&summary(per_scale));
    out
}

fn summary(per_scale: &[(ResultMatrix, ResultMatrix)]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== Index speedup, avg % across scales ((no idx - idx) / no idx) ==="
    );
    let mut header = format!("{:<ow$}", "Operation", ow = OP_W);
    for kind in BackendKind::ALL {
        let _ = write!(header, " | {:>cw$}", kind.label(), cw = CELL_W);
    }
    let rule = "-".repeat(header.len());
    out.push_str(&header);
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for operation in Operation::ALL {
        let _ = write!(out, "{:<ow$}", operation.label(), ow = OP_W);
        for kind in BackendKind::ALL {
            let col = kind.column();
            let gains: Vec<f64> = per_scale
                .iter()
                .filter_map(|(baseline, indexed)| {
                    let base = baseline.get(operation)?;
                    let idx = indexed.get(operation)?;
                    improvement(&base[col], &idx[col])
                })
                .collect();
            let text = if gains.is_empty() {
                "--".to_string()
            } else {
                format!("{:.2}", gains.iter().sum::<f64>() / gains.len() as f64)
            };
            let _ = write!(out, " | {:>cw$}", text, cw = CELL_W);
        }
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn matrix(scale: usize, indexed: bool, ms: u64) -> ResultMatrix {
        let mut m = ResultMatrix::new(scale, indexed);
        for operation in Operation::ALL {
            m.push(operation, [Sample::Ok(Duration::from_millis(ms)); 3]);
        }
        m
    }

    #[test]
    fn merge_emits_exactly_six_data_rows() {
        let table = merge(&matrix(100, false, 10), &matrix(100, true, 5));
        assert!(table.contains("100"));
        let lines: Vec<&str> = table.lines().collect();
        let rules: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.starts_with('-'))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1] - rules[0] - 1, 6);
    }

    #[test]
    fn improvement_guards_zero_baseline() {
        let zero = Sample::Ok(Duration::ZERO);
        let idx = Sample::Ok(Duration::from_millis(5));
        assert_eq!(improvement(&zero, &idx), Some(0.0));
    }

    #[test]
    fn improvement_skips_failed_samples() {
        let ok = Sample::Ok(Duration::from_millis(10));
        let failed = Sample::Failed(Duration::from_millis(3));
        assert_eq!(improvement(&ok, &failed), None);
        assert_eq!(improvement(&failed, &ok), None);
    }

    #[test]
    fn improvement_computes_percent_gain() {
        let base = Sample::Ok(Duration::from_millis(10));
        let idx = Sample::Ok(Duration::from_millis(5));
        let gain = improvement(&base, &idx).unwrap();
        assert!((gain - 50.0).abs() < 1e-9);
    }

    #[test]
    fn failed_cells_render_the_sentinel() {
        let mut baseline = ResultMatrix::new(100, false);
        let mut indexed = ResultMatrix::new(100, true);
        for operation in Operation::ALL {
            baseline.push(
                operation,
                [
                    Sample::Ok(Duration::from_millis(1)),
                    Sample::Failed(Duration::from_millis(1)),
                    Sample::Ok(Duration::from_millis(1)),
                ],
            );
            indexed.push(operation, [Sample::Ok(Duration::from_millis(1)); 3]);
        }
        let table = merge(&baseline, &indexed);
        assert!(table.contains("FAIL"));
    }

    #[test]
    fn render_appends_the_summary() {
        let report = render(&[(matrix(100, false, 10), matrix(100, true, 5))]);
        assert!(report.contains("Index speedup"));
        assert!(report.contains("50.00"));
    }
}
