use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{
    error::Error,
    model::quarantine::{QuarantineEntry, QuarantineReason},
};

/// Records of one extract file, with the rows that could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Extract<T> {
    pub records: Vec<T>,
    pub malformed: Vec<QuarantineEntry>,
}

impl<T> Default for Extract<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            malformed: Vec::new(),
        }
    }
}

/// Reads every record of a headed CSV file.
///
/// Columns are matched by header name and surrounding whitespace is trimmed;
/// empty cells deserialize to `None`. A record that cannot be parsed is kept
/// as a `MalformedRecord` quarantine entry and reading continues; only I/O
/// failures and an unreadable header fail the file.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Extract<T>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = reader.headers()?.clone();
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut extract = Extract::default();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|pos| pos.line()).unwrap_or(0);
                extract
                    .malformed
                    .push(malformed(&file, line, &e, &headers, None));
                continue;
            }
        };

        match record.deserialize::<T>(Some(&headers)) {
            Ok(parsed) => extract.records.push(parsed),
            Err(e) => {
                let line = record.position().map(|pos| pos.line()).unwrap_or(0);
                extract
                    .malformed
                    .push(malformed(&file, line, &e, &headers, Some(&record)));
            }
        }
    }

    if extract.malformed.is_empty() {
        tracing::debug!("Read {} records from {}", extract.records.len(), path.display());
    } else {
        tracing::warn!(
            "Read {} records from {}, {} malformed",
            extract.records.len(),
            path.display(),
            extract.malformed.len()
        );
    }

    Ok(extract)
}

/// Like [`read_records`], but a missing file yields no records.
pub fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Extract<T>, Error> {
    if !path.exists() {
        tracing::warn!("Source file {} not found, skipping", path.display());
        return Ok(Extract::default());
    }

    read_records(path)
}

fn malformed(
    file: &str,
    line: u64,
    error: &csv::Error,
    headers: &csv::StringRecord,
    record: Option<&csv::StringRecord>,
) -> QuarantineEntry {
    let fields: serde_json::Map<String, serde_json::Value> = record
        .map(|record| {
            headers
                .iter()
                .zip(record.iter())
                .map(|(name, value)| (name.to_string(), value.into()))
                .collect()
        })
        .unwrap_or_default();
    let field = |name: &str| fields.get(name).and_then(|v| v.as_str()).map(str::to_string);

    QuarantineEntry {
        order_id: field("order_id").unwrap_or_default(),
        order_item_id: field("order_item_id")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
        reasons: vec![QuarantineReason::MalformedRecord {
            file: file.to_string(),
            line,
            error: error.to_string(),
        }],
        payload: serde_json::Value::Object(fields),
    }
}
