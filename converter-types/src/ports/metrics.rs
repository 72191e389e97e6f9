//! Metrics emitter port.

use std::sync::Arc;

use crate::domain::MeasurementRecord;

/// Best-effort sink for measurement records.
///
/// `emit` must not block on the network and must never fail visibly:
/// implementations log their own errors and move on.
pub trait MetricsEmitter: Send + Sync + 'static {
    fn emit(&self, record: MeasurementRecord);
}

impl<M: MetricsEmitter + ?Sized> MetricsEmitter for Arc<M> {
    fn emit(&self, record: MeasurementRecord) {
        (**self).emit(record)
    }
}
