//! Storage collaborator for the pipeline.
//!
//! A load is always "replace all": `clear` runs once, then `insert_batch`
//! once per fixed-size batch, strictly in program order. The handle is
//! passed explicitly into each pipeline stage; nothing here is ambient
//! state.

use chrono::{NaiveDate, NaiveTime};
use parking_lot::Mutex;
use pin_utils::pin_mut;
use tokio_postgres::binary_copy::BinaryCopyInWriter;
use tokio_postgres::types::{ToSql, Type};

use crate::db::DbPool;
use crate::errors::PipelineError;
use crate::models::{Location, WeatherObservation};

#[allow(async_fn_in_trait)]
pub trait ObservationStore {
    /// Discards every stored observation.
    async fn clear(&self) -> Result<(), PipelineError>;

    /// Inserts one batch and returns the number of rows written.
    async fn insert_batch(&self, batch: &[WeatherObservation]) -> Result<u64, PipelineError>;

    /// Stored observations for a location, optionally restricted to an
    /// inclusive calendar-date range, ordered by timestamp.
    async fn query(
        &self,
        location: &Location,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<WeatherObservation>, PipelineError>;
}

const TABLE: &str = "weather_observation";
const COLUMNS: [&str; 4] = ["taken_at", "location", "temperature_c", "humidity_percent"];

fn column_types() -> Vec<Type> {
    vec![
        Type::TIMESTAMP, // taken_at (no timezone shift was applied at parse time)
        Type::TEXT,      // location
        Type::FLOAT8,    // temperature_c
        Type::FLOAT8,    // humidity_percent
    ]
}

/// PostgreSQL-backed store. Batches are written with binary COPY inside a
/// transaction per batch.
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ObservationStore for PgStore {
    async fn clear(&self) -> Result<(), PipelineError> {
        let mut client = self
            .pool
            .get()
            .await
            .map_err(PipelineError::DbConnectionError)?;
        let transaction = client
            .transaction()
            .await
            .map_err(PipelineError::DbQueryError)?;
        transaction
            .execute(&format!("DELETE FROM {TABLE}"), &[])
            .await
            .map_err(PipelineError::DbQueryError)?;
        transaction
            .commit()
            .await
            .map_err(PipelineError::DbQueryError)?;
        Ok(())
    }

    async fn insert_batch(&self, batch: &[WeatherObservation]) -> Result<u64, PipelineError> {
        let mut client = self
            .pool
            .get()
            .await
            .map_err(PipelineError::DbConnectionError)?;
        let transaction = client
            .transaction()
            .await
            .map_err(PipelineError::DbQueryError)?;

        let copy_sql = format!("COPY {TABLE} ({}) FROM STDIN BINARY", COLUMNS.join(", "));
        let sink = transaction
            .copy_in(&copy_sql)
            .await
            .map_err(PipelineError::DbQueryError)?;
        let writer = BinaryCopyInWriter::new(sink, &column_types());
        pin_mut!(writer);

        for obs in batch {
            let label = obs.location.label();
            let row: [&(dyn ToSql + Sync); 4] = [
                &obs.taken_at,
                &label,
                &obs.temperature_c,
                &obs.humidity_percent,
            ];
            writer
                .as_mut()
                .write(&row)
                .await
                .map_err(PipelineError::DbQueryError)?;
        }

        let written = writer
            .as_mut()
            .finish()
            .await
            .map_err(PipelineError::DbQueryError)?;
        transaction
            .commit()
            .await
            .map_err(PipelineError::DbQueryError)?;
        Ok(written)
    }

    async fn query(
        &self,
        location: &Location,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<WeatherObservation>, PipelineError> {
        let client = self
            .pool
            .get()
            .await
            .map_err(PipelineError::DbConnectionError)?;
        let label = location.label();

        let rows = match range {
            Some((from, to)) => {
                let start = from.and_time(NaiveTime::MIN);
                // Inclusive date range: everything before the day after `to`.
                let end = to
                    .succ_opt()
                    .unwrap_or(NaiveDate::MAX)
                    .and_time(NaiveTime::MIN);
                let sql = format!(
                    "SELECT {} FROM {TABLE} \
                     WHERE location = $1 AND taken_at >= $2 AND taken_at < $3 \
                     ORDER BY taken_at",
                    COLUMNS.join(", ")
                );
                client
                    .query(&sql, &[&label, &start, &end])
                    .await
                    .map_err(PipelineError::DbQueryError)?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM {TABLE} WHERE location = $1 ORDER BY taken_at",
                    COLUMNS.join(", ")
                );
                client
                    .query(&sql, &[&label])
                    .await
                    .map_err(PipelineError::DbQueryError)?
            }
        };

        Ok(rows
            .iter()
            .map(|row| WeatherObservation {
                taken_at: row.get(0),
                location: Location::from_label(row.get(1)),
                temperature_c: row.get(2),
                humidity_percent: row.get(3),
            })
            .collect())
    }
}

/// In-memory store used by tests and database-less runs. Records the size
/// of every batch it receives so replace/batching semantics can be
/// asserted.
#[derive(Default)]
pub struct MemStore {
    rows: Mutex<Vec<WeatherObservation>>,
    batch_sizes: Mutex<Vec<usize>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().clone()
    }

    /// Pre-populates the store, bypassing batch accounting.
    pub fn seed(&self, observations: Vec<WeatherObservation>) {
        self.rows.lock().extend(observations);
    }
}

impl ObservationStore for MemStore {
    async fn clear(&self) -> Result<(), PipelineError> {
        self.rows.lock().clear();
        self.batch_sizes.lock().clear();
        Ok(())
    }

    async fn insert_batch(&self, batch: &[WeatherObservation]) -> Result<u64, PipelineError> {
        self.batch_sizes.lock().push(batch.len());
        self.rows.lock().extend_from_slice(batch);
        Ok(batch.len() as u64)
    }

    async fn query(
        &self,
        location: &Location,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<WeatherObservation>, PipelineError> {
        let mut matching: Vec<WeatherObservation> = self
            .rows
            .lock()
            .iter()
            .filter(|obs| obs.location == *location)
            .filter(|obs| match range {
                Some((from, to)) => {
                    let date = obs.taken_at.date();
                    date >= from && date <= to
                }
                None => true,
            })
            .cloned()
            .collect();
        matching.sort_by_key(|obs| obs.taken_at);
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn obs(timestamp: &str, location: Location) -> WeatherObservation {
        WeatherObservation {
            taken_at: NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M").unwrap(),
            location,
            temperature_c: Some(10.0),
            humidity_percent: Some(50.0),
        }
    }

    #[tokio::test]
    async fn mem_store_clear_then_insert_replaces_everything() {
        let store = MemStore::new();
        store.seed(vec![obs("2023-05-01 12:00", Location::Outdoor)]);
        assert_eq!(store.len(), 1);

        store.clear().await.unwrap();
        let written = store
            .insert_batch(&[obs("2024-01-15 08:00", Location::Outdoor)])
            .await
            .unwrap();
        assert_eq!(written, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.batch_sizes(), vec![1]);
    }

    #[tokio::test]
    async fn mem_store_query_filters_by_location_and_date_range() {
        let store = MemStore::new();
        store.seed(vec![
            obs("2024-01-14 08:00", Location::Outdoor),
            obs("2024-01-15 08:00", Location::Outdoor),
            obs("2024-01-15 09:00", Location::Indoor),
            obs("2024-01-16 08:00", Location::Outdoor),
        ]);

        let jan15 = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let found = store
            .query(&Location::Outdoor, Some((jan15, jan15)))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].taken_at.date(), jan15);

        let all_outdoor = store.query(&Location::Outdoor, None).await.unwrap();
        assert_eq!(all_outdoor.len(), 3);
    }

    #[tokio::test]
    async fn mem_store_query_is_sorted_by_timestamp() {
        let store = MemStore::new();
        store.seed(vec![
            obs("2024-01-16 08:00", Location::Outdoor),
            obs("2024-01-14 08:00", Location::Outdoor),
            obs("2024-01-15 08:00", Location::Outdoor),
        ]);
        let found = store.query(&Location::Outdoor, None).await.unwrap();
        let timestamps: Vec<_> = found.iter().map(|o| o.taken_at).collect();
        let mut sorted = timestamps.clone();
        sorted.sort();
        assert_eq!(timestamps, sorted);
    }
}
