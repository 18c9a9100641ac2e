use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Global metrics instance
pub static METRICS: Lazy<Mutex<Metrics>> = Lazy::new(|| Mutex::new(Metrics::new()));

/// Run-level counters for one pipeline invocation.
#[derive(Debug, Default)]
pub struct Metrics {
    pub rows_valid: u64,
    pub rows_invalid: u64,
    pub observations_inserted: u64,
    pub processing_times: HashMap<String, Duration>,
    pub start_time: Option<Instant>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn record_rows(&mut self, valid: u64, invalid: u64) {
        self.rows_valid += valid;
        self.rows_invalid += invalid;
    }

    pub fn record_insertion(&mut self, count: u64) {
        self.observations_inserted += count;
    }

    pub fn record_processing_time(&mut self, operation: String, duration: Duration) {
        self.processing_times.insert(operation, duration);
    }

    pub fn get_total_duration(&self) -> Duration {
        self.start_time
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }

    pub fn get_throughput(&self) -> f64 {
        let duration_secs = self.get_total_duration().as_secs_f64();
        if duration_secs > 0.0 {
            (self.rows_valid + self.rows_invalid) as f64 / duration_secs
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        let duration = self.get_total_duration();
        println!("\n========== Pipeline Metrics Summary ==========");
        println!("Total Duration: {:.2?}", duration);
        println!("Rows Valid: {}", self.rows_valid);
        println!("Rows Invalid: {}", self.rows_invalid);
        println!("Observations Inserted: {}", self.observations_inserted);
        println!("Throughput: {:.2} rows/sec", self.get_throughput());

        if !self.processing_times.is_empty() {
            println!("\nProcessing Times:");
            for (op, duration) in &self.processing_times {
                println!("  {}: {:.2?}", op, duration);
            }
        }
        println!("=============================================\n");
    }
}

/// Helper macro to time an operation
#[macro_export]
macro_rules! time_operation {
    ($name:expr, $op:expr) => {{
        let start = std::time::Instant::now();
        let result = $op;
        let duration = start.elapsed();
        $crate::metrics::METRICS
            .lock()
            .record_processing_time($name.to_string(), duration);
        result
    }};
}
