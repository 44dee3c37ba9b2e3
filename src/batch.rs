use std::{
    fs::read_to_string,
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::{client::Verifier, record::AddressRecord};

#[derive(Debug, Serialize)]
pub struct ReportEntry {
    pub index: usize,
    pub valid: bool,
    pub record: AddressRecord,
}

fn progress(len: usize) -> ProgressBar {
    ProgressBar::new(len as u64).with_style(
        ProgressStyle::with_template("{wide_bar} {pos}/{len} records, {msg} invalid ({eta})")
            .expect("hardcoded")
            .progress_chars("=> "),
    )
}

pub fn load(path: &Path) -> Result<Vec<AddressRecord>> {
    let raw = read_to_string(path).with_context(|| format!("failed to read {path:?}"))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {path:?}"))
}

/// Validates every record in parallel. The first provider or configuration
/// failure aborts the run.
pub fn run(records: Vec<AddressRecord>, verifier: &impl Verifier) -> Result<Vec<ReportEntry>> {
    let pb = progress(records.len());
    pb.set_message("0");
    let report = validate_all(records, verifier, &pb);
    pb.finish_and_clear();

    let report = report?;
    info!(
        total = report.len(),
        valid = report.iter().filter(|x| x.valid).count(),
        "batch verified"
    );
    Ok(report)
}

fn validate_all(
    records: Vec<AddressRecord>,
    verifier: &impl Verifier,
    pb: &ProgressBar,
) -> Result<Vec<ReportEntry>> {
    let invalid = AtomicUsize::new(0);
    records
        .into_par_iter()
        .enumerate()
        .map(|(index, mut record)| -> Result<ReportEntry> {
            let valid = record
                .validate(verifier)
                .with_context(|| format!("record {index} failed verification"))?;
            if !valid {
                let count = invalid.fetch_add(1, Ordering::Relaxed) + 1;
                pb.set_message(count.to_string());
            }
            pb.inc(1);
            Ok(ReportEntry {
                index,
                valid,
                record,
            })
        })
        .collect()
}

pub fn render(report: &[ReportEntry]) -> Result<String> {
    let mut output = serde_json::to_string_pretty(report)?;
    output.push('\n');
    Ok(output)
}
