//! Metrics emission for conversion outcomes.
//!
//! Records are encoded in InfluxDB line protocol and written to the v2 write
//! API. Emission is best effort: failures are logged and never reach the
//! caller.

pub mod influx;
pub mod line_protocol;
pub mod recording;

pub use influx::{InfluxConfig, InfluxEmitter, MetricsError};
pub use line_protocol::{encode, encode_at};
pub use recording::RecordingEmitter;
