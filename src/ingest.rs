//! Single-pass batch ingestion.
//!
//! Reads the delimited source, skips the header line, validates every row
//! (rows are independent, so validation runs on the rayon pool with line
//! numbers preserved), tallies valid/invalid counts, and hands the valid
//! observations to the store: a full replace followed by fixed-size
//! batches, awaited strictly in order. A failed clear or batch write aborts
//! the run; there is no retry.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rayon::prelude::*;

use crate::errors::{PipelineError, RowError, RowErrorKind};
use crate::metrics::METRICS;
use crate::models::{Location, WeatherObservation};
use crate::parser;
use crate::store::ObservationStore;

/// Rows handed to the store per batch.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Invalid-row messages kept for operator feedback.
pub const ERROR_PREVIEW_LIMIT: usize = 5;

/// Outcome of one ingestion run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IngestionSummary {
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub inserted: u64,
    /// First few rejection messages, capped at [`ERROR_PREVIEW_LIMIT`].
    pub error_preview: Vec<String>,
    /// Distinct locations seen among valid rows, in first-seen order.
    pub locations: Vec<Location>,
}

/// Ingests one source file. An unreadable file aborts only this invocation
/// and is reported as [`PipelineError::Io`].
pub async fn ingest_file<S: ObservationStore>(
    store: &S,
    path: &Path,
    delimiter: u8,
    batch_size: usize,
) -> Result<IngestionSummary, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!("Ingesting readings from {}", path.display());
    ingest_reader(store, file, delimiter, batch_size).await
}

pub async fn ingest_reader<S: ObservationStore, R: Read>(
    store: &S,
    reader: R,
    delimiter: u8,
    batch_size: usize,
) -> Result<IngestionSummary, PipelineError> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    // Rows are collected first so validation can fan out; line numbers are
    // 1-based and account for the skipped header. A record the reader
    // itself cannot produce still becomes an invalid row, never a crash.
    let rows: Vec<(usize, Result<csv::StringRecord, RowError>)> = csv_reader
        .records()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2;
            let record = result.map_err(|e| {
                RowError::new(
                    line,
                    RowErrorKind::UnexpectedParseFailure {
                        cause: e.to_string(),
                    },
                )
            });
            (line, record)
        })
        .collect();

    let outcomes: Vec<Result<WeatherObservation, RowError>> = rows
        .into_par_iter()
        .map(|(line, record)| record.and_then(|r| parser::parse_record(&r, line)))
        .collect();

    let mut summary = IngestionSummary::default();
    let mut valid = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok(obs) => {
                if !summary.locations.contains(&obs.location) {
                    summary.locations.push(obs.location.clone());
                }
                summary.valid_rows += 1;
                valid.push(obs);
            }
            Err(err) => {
                summary.invalid_rows += 1;
                if summary.error_preview.len() < ERROR_PREVIEW_LIMIT {
                    summary.error_preview.push(err.to_string());
                }
            }
        }
    }

    METRICS
        .lock()
        .record_rows(summary.valid_rows as u64, summary.invalid_rows as u64);
    for message in &summary.error_preview {
        warn!("{message}");
    }
    info!(
        "Validated {} rows: {} valid, {} invalid",
        summary.valid_rows + summary.invalid_rows,
        summary.valid_rows,
        summary.invalid_rows
    );

    // Full replace: prior observations are discarded before the new set is
    // inserted, even when the new set is empty.
    store.clear().await?;

    let batches: Vec<&[WeatherObservation]> = valid.chunks(batch_size.max(1)).collect();
    let progress = ProgressBar::new(batches.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    for batch in &batches {
        summary.inserted += store.insert_batch(batch).await?;
        progress.inc(1);
    }
    progress.finish_and_clear();

    METRICS.lock().record_insertion(summary.inserted);
    info!(
        "Inserted {} observations in {} batches",
        summary.inserted,
        batches.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;
    use chrono::NaiveDateTime;
    use std::io::Cursor;

    async fn ingest_text(store: &MemStore, text: &str, batch_size: usize) -> IngestionSummary {
        ingest_reader(store, Cursor::new(text.to_string()), b',', batch_size)
            .await
            .unwrap()
    }

    fn seeded_store() -> MemStore {
        let store = MemStore::new();
        store.seed(vec![WeatherObservation {
            taken_at: NaiveDateTime::parse_from_str("2023-05-01 12:00", "%Y-%m-%d %H:%M").unwrap(),
            location: Location::Outdoor,
            temperature_c: Some(18.0),
            humidity_percent: Some(55.0),
        }]);
        store
    }

    #[tokio::test]
    async fn header_only_file_yields_nothing_and_still_replaces() {
        let store = seeded_store();
        let summary = ingest_text(&store, "timestamp,location,temperature,humidity\n", 1000).await;
        assert_eq!(summary.valid_rows, 0);
        assert_eq!(summary.invalid_rows, 0);
        assert_eq!(summary.inserted, 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn empty_file_yields_nothing() {
        let store = MemStore::new();
        let summary = ingest_text(&store, "", 1000).await;
        assert_eq!(summary.valid_rows, 0);
        assert_eq!(summary.invalid_rows, 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn mixed_file_tallies_and_stores_only_valid_rows() {
        let store = seeded_store();
        let text = "timestamp,location,temperature,humidity\n\
                    2024-01-15 08:00,ute,5.0,80\n\
                    2024-01-15 09:00,inne,abc,60\n\
                    2024-01-15 10:00,ute,-60,50\n\
                    2024-01-15 11:00,INNE,21,45\n\
                    2024-01-15 12:00,balkong,12,70\n";
        let summary = ingest_text(&store, text, 1000).await;
        assert_eq!(summary.valid_rows, 3);
        assert_eq!(summary.invalid_rows, 2);
        assert_eq!(summary.inserted, 3);
        assert_eq!(store.len(), 3);
        assert_eq!(
            summary.locations,
            vec![
                Location::Outdoor,
                Location::Indoor,
                Location::Other("balkong".to_string())
            ]
        );
        // The seeded pre-existing observation was replaced, not merged.
        let remaining = store.query(&Location::Outdoor, None).await.unwrap();
        assert!(remaining.iter().all(|o| o.taken_at.date()
            == chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
    }

    #[tokio::test]
    async fn error_preview_is_capped_and_names_line_numbers() {
        let store = MemStore::new();
        let mut text = String::from("timestamp,location,temperature,humidity\n");
        for _ in 0..8 {
            text.push_str("not-a-date,ute,20,50\n");
        }
        let summary = ingest_text(&store, &text, 1000).await;
        assert_eq!(summary.invalid_rows, 8);
        assert_eq!(summary.error_preview.len(), ERROR_PREVIEW_LIMIT);
        assert!(summary.error_preview[0].contains("row 2"));
        assert!(summary.error_preview[0].contains("not-a-date"));
    }

    #[tokio::test]
    async fn valid_rows_are_split_into_fixed_size_batches() {
        let store = MemStore::new();
        let mut text = String::from("timestamp,location,temperature,humidity\n");
        for i in 0..25 {
            text.push_str(&format!("2024-01-{:02} 08:00,ute,10,50\n", (i % 28) + 1));
        }
        let summary = ingest_text(&store, &text, 10).await;
        assert_eq!(summary.valid_rows, 25);
        assert_eq!(summary.inserted, 25);
        assert_eq!(store.batch_sizes(), vec![10, 10, 5]);
    }

    #[tokio::test]
    async fn unreadable_record_becomes_an_invalid_row() {
        let store = MemStore::new();
        let bytes = b"timestamp,location,temperature,humidity\n\xff\xfe,ute,20,75\n".to_vec();
        let summary = ingest_reader(&store, Cursor::new(bytes), b',', 1000)
            .await
            .unwrap();
        assert_eq!(summary.valid_rows, 0);
        assert!(summary.invalid_rows >= 1);
        assert!(summary.error_preview[0].contains("unexpected parse failure"));
    }

    #[tokio::test]
    async fn missing_file_is_reported_not_propagated_as_panic() {
        let store = MemStore::new();
        let result = ingest_file(
            &store,
            Path::new("/definitely/not/here.csv"),
            b',',
            DEFAULT_BATCH_SIZE,
        )
        .await;
        assert!(matches!(result, Err(PipelineError::Io { .. })));
    }
}
