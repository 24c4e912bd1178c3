use crate::job_controller::state::JobUpdate;
use crate::store::Store;
use common::jobs::JobStatus;
use common::model::snapshot::Directory;
use common::rules::import::{check_header, parse_row, ImportKind, ImportReport, ParsedRow};
use log::debug;
use rayon::prelude::*;
use std::time::Instant;
use tokio::sync::mpsc;

const CHUNK_SIZE: usize = 5_000;
const DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// The candidate appearing most often in the header line. Ties go to the
/// earlier candidate, so a line without any of them reads as `,`.
pub(crate) fn detect_delimiter(header_line: &str) -> char {
    let (best, _) = DELIMITERS.iter().fold((',', 0), |(best, top), &d| {
        let count = header_line.matches(d).count();
        if count > top { (d, count) } else { (best, top) }
    });
    best
}

/// Splits the upload into rows of trimmed cells, numbered from 1 like the
/// spreadsheet they came from. Blank rows are dropped.
pub(crate) fn read_rows(text: &str) -> Result<Vec<(usize, Vec<String>)>, String> {
    let header_line = text.lines().next().unwrap_or_default();
    let delimiter = detect_delimiter(header_line);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| format!("row {}: {}", idx + 1, e))?;
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        rows.push((idx + 1, cells));
    }
    Ok(rows)
}

fn process_chunk(
    chunk: &[(usize, Vec<String>)],
    kind: ImportKind,
    directory: &Directory<'_>,
) -> Vec<ParsedRow> {
    chunk
        .par_iter()
        .map(|(row, cells)| parse_row(kind, *row, cells, directory))
        .collect()
}

/// Parses an uploaded spreadsheet into an `ImportReport`, pushing progress
/// updates after every chunk of rows.
pub(crate) fn verify_import_blocking(
    tx: mpsc::Sender<JobUpdate>,
    job_id: String,
    kind: ImportKind,
    bytes: Vec<u8>,
    store: Store,
) -> Result<ImportReport, String> {
    let start = Instant::now();
    let text = String::from_utf8(bytes).map_err(|_| "the file is not valid UTF-8".to_string())?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut rows = read_rows(text)?.into_iter();
    let Some((_, header)) = rows.next() else {
        return Err("the file is empty".to_string());
    };
    let data: Vec<(usize, Vec<String>)> = rows.collect();

    let snapshot = store.snapshot().map_err(|e| e.to_string())?;
    let directory = snapshot.directory();

    let mut report = ImportReport {
        kind,
        records: Vec::with_capacity(data.len()),
        issues: check_header(kind, &header),
    };
    let mut processed = 0usize;
    for chunk in data.chunks(CHUNK_SIZE) {
        for parsed in process_chunk(chunk, kind, &directory) {
            report.records.extend(parsed.record);
            report.issues.extend(parsed.issues);
        }
        processed += chunk.len();
        let _ = tx.blocking_send(JobUpdate {
            job_id: job_id.clone(),
            status: JobStatus::InProgress(processed as u32),
        });
    }

    debug!(
        "Import job {} parsed {} rows in {:.2?}",
        job_id,
        processed,
        start.elapsed()
    );
    Ok(report)
}
