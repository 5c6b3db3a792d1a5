// Spellbook - core/export.rs
//
// CSV, JSON and token-line export of a filtered record set.
// Core layer: writes to any Write trait object.

use crate::core::detail::format_detail;
use crate::core::model::SpellRecord;
use crate::util::constants::MAX_EXPORT_RECORDS;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Output format for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    /// One `"<token> = <id>,"` line per record.
    Lines,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "lines" => Ok(ExportFormat::Lines),
            other => Err(format!(
                "unknown export format '{other}' (expected csv, json or lines)"
            )),
        }
    }
}

/// Export `records` in the given format.
pub fn export<'a, W: Write>(
    format: ExportFormat,
    records: impl IntoIterator<Item = &'a SpellRecord>,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let records: Vec<&SpellRecord> = records.into_iter().collect();
    if records.len() > MAX_EXPORT_RECORDS {
        return Err(ExportError::TooManyRecords {
            count: records.len(),
            max: MAX_EXPORT_RECORDS,
        });
    }

    let count = match format {
        ExportFormat::Csv => export_csv(&records, writer, export_path)?,
        ExportFormat::Json => export_json(&records, writer, export_path)?,
        ExportFormat::Lines => export_lines(&records, writer, export_path)?,
    };

    tracing::info!(
        path = %export_path.display(),
        format = ?format,
        records = count,
        "Export written"
    );
    Ok(count)
}

/// Export records to CSV.
///
/// The header is the union of field names in first-seen order; fields a
/// record lacks are written empty.
pub fn export_csv<W: Write>(
    records: &[&SpellRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };

    let mut columns: Vec<&str> = Vec::new();
    for record in records {
        for (key, _) in record.fields() {
            if !columns.contains(&key) {
                columns.push(key);
            }
        }
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    if !columns.is_empty() {
        csv_writer.write_record(&columns).map_err(csv_err)?;
    }

    let mut count = 0;
    for record in records {
        let row = columns.iter().map(|col| record.get(col).unwrap_or(""));
        csv_writer.write_record(row).map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Export records to JSON (array of ordered objects).
pub fn export_json<W: Write>(
    records: &[&SpellRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, records).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(records.len())
}

/// Export one `"<token> = <id>,"` line per record. Records without an id
/// are skipped.
pub fn export_lines<W: Write>(
    records: &[&SpellRecord],
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let io_err = |e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    };

    let mut count = 0;
    for record in records {
        let detail = format_detail(Some(*record));
        if detail.id.is_empty() {
            continue;
        }
        writeln!(writer, "{}", detail.export_line()).map_err(io_err)?;
        count += 1;
    }
    writer.flush().map_err(io_err)?;
    Ok(count)
}
