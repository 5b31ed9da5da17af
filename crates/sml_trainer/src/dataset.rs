//! Case dataset loading and summary statistics
//!
//! Datasets are JSON Lines: one case record per line. Blank lines and lines
//! starting with `#` are skipped. A file whose content starts with `[` is
//! read as a single JSON array instead.

use anyhow::{Context, Result};
use dispute_sml_core::features::extract_labelled;
use dispute_sml_core::{CaseRecord, Verdict, FEATURE_COUNT, NUM_VERDICTS};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Load case records from a JSONL (or JSON array) file
pub fn load_cases<P: AsRef<Path>>(path: P) -> Result<Vec<CaseRecord>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;
    parse_cases(&content).with_context(|| format!("Invalid dataset {}", path.display()))
}

/// Parse case records from JSONL (or JSON array) text
pub fn parse_cases(content: &str) -> Result<Vec<CaseRecord>> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content).context("Failed to parse JSON array of cases");
    }

    let mut cases = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let case: CaseRecord = serde_json::from_str(line)
            .with_context(|| format!("Line {}: invalid case record", line_idx + 1))?;
        cases.push(case);
    }
    Ok(cases)
}

/// Write case records as JSONL
pub fn write_cases<P: AsRef<Path>>(path: P, cases: &[CaseRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for case in cases {
        serde_json::to_writer(&mut writer, case)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Summary of a case dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub total: usize,
    /// Records with a verdict code inside the class range
    pub labelled: usize,
    /// Count per verdict class
    pub label_counts: [usize; NUM_VERDICTS],
    /// Per-feature (min, max) over labelled records
    pub feature_ranges: Vec<(f64, f64)>,
}

impl DatasetStats {
    pub fn from_cases(cases: &[CaseRecord]) -> Self {
        let (features, labels) = extract_labelled(cases);

        let mut label_counts = [0; NUM_VERDICTS];
        for &label in &labels {
            label_counts[label] += 1;
        }

        let mut feature_ranges = vec![(f64::INFINITY, f64::NEG_INFINITY); FEATURE_COUNT];
        for row in &features {
            for (range, &value) in feature_ranges.iter_mut().zip(row.iter()) {
                range.0 = range.0.min(value);
                range.1 = range.1.max(value);
            }
        }
        if features.is_empty() {
            feature_ranges = vec![(0.0, 0.0); FEATURE_COUNT];
        }

        Self {
            total: cases.len(),
            labelled: labels.len(),
            label_counts,
            feature_ranges,
        }
    }

    /// Records dropped at training time for out-of-range verdict codes
    pub fn unlabelled(&self) -> usize {
        self.total - self.labelled
    }

    /// Verdict with the most records, lowest code on ties
    pub fn majority_verdict(&self) -> Option<Verdict> {
        if self.labelled == 0 {
            return None;
        }
        let mut best = 0;
        for (class, &count) in self.label_counts.iter().enumerate() {
            if count > self.label_counts[best] {
                best = class;
            }
        }
        Verdict::from_class_index(best)
    }
}
