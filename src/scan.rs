//! Fan-out/fan-in scan of a document source.
//!
//! Every document gets its own extraction task; the report is only built once
//! all of them have been joined. Outcomes are folded into the [`Aggregator`]
//! in dispatch order, so list order in the report does not depend on which
//! extraction finished first.

use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::{sync::Arc, time::Instant};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, info, warn};

use crate::aggregator::Aggregator;
use crate::parsers;
use crate::report::ReportView;
use crate::source::Source;
use crate::types::{DocumentRecord, KeywordSet, Payload, PendingDocument, SkippedDocument};

/// Knobs for a scan run.
#[derive(Clone, Debug)]
pub struct ScanOptions {
    /// Maximum number of extractions running at once
    pub jobs: usize,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
    /// Only keep documents whose name matches this glob
    pub pattern: Option<glob::Pattern>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            show_progress: false,
            pattern: None,
        }
    }
}

pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Result of a completed scan.
#[derive(Debug)]
pub struct ScanSummary {
    pub aggregator: Aggregator,
    pub skipped: Vec<SkippedDocument>,
}

impl ScanSummary {
    pub fn report(&self) -> ReportView {
        self.aggregator.report(&self.skipped)
    }
}

/// Read and extract one document. Runs on the blocking pool.
pub fn extract_document(doc: PendingDocument) -> Result<DocumentRecord> {
    let bytes = match doc.payload {
        Payload::Bytes(bytes) => bytes,
        Payload::Path(path) => std::fs::read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
    };

    let text = parsers::extract_text(doc.file_type, &bytes)
        .with_context(|| format!("Failed to extract {} text from {}", doc.file_type.label(), doc.name))?;

    Ok(DocumentRecord::new(doc.name, &text))
}

/// Scan every document of `source` for `keywords`.
pub async fn scan(source: &Source, keywords: KeywordSet, options: &ScanOptions) -> Result<ScanSummary> {
    let collected = source.collect(options.pattern.as_ref())?;
    let (records, mut skipped) = extract_all(collected.documents, options).await;

    let mut all_skipped = collected.skipped;
    all_skipped.append(&mut skipped);

    let mut aggregator = Aggregator::new(keywords);
    for record in &records {
        aggregator.process_record(record);
    }

    info!(
        processed = aggregator.documents_processed(),
        skipped = all_skipped.len(),
        "scan complete"
    );

    Ok(ScanSummary {
        aggregator,
        skipped: all_skipped,
    })
}

/// Blocking wrapper around [`scan`] for synchronous front ends.
pub fn scan_blocking(source: &Source, keywords: KeywordSet, options: &ScanOptions) -> Result<ScanSummary> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(scan(source, keywords, options))
}

type Outcome = (usize, String, Result<DocumentRecord>);

/// Dispatch one extraction per document and join all of them.
///
/// Returned records keep the order of `documents`.
pub async fn extract_all(
    documents: Vec<PendingDocument>,
    options: &ScanOptions,
) -> (Vec<DocumentRecord>, Vec<SkippedDocument>) {
    let start = Instant::now();
    let total = documents.len();
    let progress = progress_bar(total as u64, options.show_progress);
    let permits = Arc::new(Semaphore::new(options.jobs.max(1)));

    let mut tasks: JoinSet<Outcome> = JoinSet::new();
    for (index, doc) in documents.into_iter().enumerate() {
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let name = doc.name.clone();
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return (index, name, Err(anyhow!("Extraction pool closed: {}", e))),
            };
            let result = match tokio::task::spawn_blocking(move || extract_document(doc)).await {
                Ok(result) => result,
                Err(e) if e.is_panic() => Err(anyhow!("Extraction panicked")),
                Err(e) => Err(anyhow!("Extraction task failed: {}", e)),
            };
            (index, name, result)
        });
    }
    debug!(tasks = total, "dispatched extraction tasks");

    let mut slots: Vec<Option<Outcome>> = (0..total).map(|_| None).collect();
    let mut skipped = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => {
                progress.set_message(outcome.1.clone());
                let index = outcome.0;
                slots[index] = Some(outcome);
            }
            Err(e) => {
                warn!(error = %e, "extraction task aborted");
                skipped.push(SkippedDocument {
                    name: "<unknown>".to_string(),
                    reason: e.to_string(),
                });
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    let mut records = Vec::with_capacity(total);
    for (_, name, result) in slots.into_iter().flatten() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => {
                let reason = format!("{:#}", e);
                warn!(file = %name, error = %reason, "skipping document");
                skipped.push(SkippedDocument { name, reason });
            }
        }
    }

    debug!(
        extracted = records.len(),
        failed = skipped.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "joined extraction tasks"
    );
    (records, skipped)
}

fn progress_bar(total: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::hidden());
    }

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} Extracting: [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}")
    {
        pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏ "));
    }
    pb
}
