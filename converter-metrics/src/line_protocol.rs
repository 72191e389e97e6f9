//! InfluxDB line protocol encoding.
//!
//! `measurement[,tag=value...] field=value[,field=value...] timestamp`

use chrono::Utc;
use converter_types::{FieldValue, MeasurementRecord};
use std::fmt::Write;

/// Encodes `record`, stamping it with the current time unless it carries one.
pub fn encode(record: &MeasurementRecord) -> String {
    let now = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
    encode_at(record, record.timestamp_nanos().unwrap_or(now))
}

/// Encodes `record` with an explicit timestamp in nanoseconds since epoch.
pub fn encode_at(record: &MeasurementRecord, timestamp_nanos: i64) -> String {
    let mut line = String::with_capacity(128);
    escape_into(&mut line, record.name(), &[',', ' ']);

    for (key, value) in record.tags() {
        if value.is_empty() {
            continue;
        }
        line.push(',');
        escape_into(&mut line, key, &[',', '=', ' ']);
        line.push('=');
        escape_into(&mut line, value, &[',', '=', ' ']);
    }

    line.push(' ');
    let mut wrote_field = false;
    for (key, value) in record.fields() {
        let Some(encoded) = encode_field(value) else {
            continue;
        };
        if wrote_field {
            line.push(',');
        }
        escape_into(&mut line, key, &[',', '=', ' ']);
        line.push('=');
        line.push_str(&encoded);
        wrote_field = true;
    }
    // A point needs at least one field.
    if !wrote_field {
        line.push_str("value=1i");
    }

    let _ = write!(line, " {}", timestamp_nanos);
    line
}

fn encode_field(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Float(v) if v.is_finite() => Some(v.to_string()),
        FieldValue::Float(_) => None,
        FieldValue::Int(v) => Some(format!("{}i", v)),
        FieldValue::Bool(v) => Some(v.to_string()),
        FieldValue::Str(s) => {
            let mut quoted = String::with_capacity(s.len() + 2);
            quoted.push('"');
            escape_into(&mut quoted, s, &['"', '\\']);
            quoted.push('"');
            Some(quoted)
        }
    }
}

/// Line breaks end a point, so they are written as spaces everywhere.
fn escape_into(out: &mut String, raw: &str, special: &[char]) {
    for c in raw.chars() {
        let c = if c == '\n' || c == '\r' { ' ' } else { c };
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}
