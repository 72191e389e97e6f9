use converter_types::{MeasurementRecord, MetricsEmitter};
use std::sync::Mutex;

/// Keeps every emitted record in memory. Used in tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    records: Mutex<Vec<MeasurementRecord>>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records emitted so far.
    pub fn records(&self) -> Vec<MeasurementRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetricsEmitter for RecordingEmitter {
    fn emit(&self, record: MeasurementRecord) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
    }
}
