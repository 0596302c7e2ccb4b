//! Flattening secrets into rows for use outside the originating application

use crate::types::SecretRecord;
use derive_more::From;
use std::io;
use thiserror::Error;
use tracing::debug;

/// Column names of the header row, in output order
pub const COLUMNS: [&str; 5] = ["Description", "Id", "PIN", "Email", "Notes"];

#[derive(Debug, Error)]
/// Errors encountered exporting secrets
pub enum ExportError {
    /// The CSV writer failed
    #[error("Error writing CSV - {0}")]
    Csv(#[from] csv::Error),
    /// The output failed while writing or flushing
    #[error("IO error writing export - {0}")]
    Io(#[from] io::Error),
    /// Only the header row was written as there were no secrets
    #[error("No secrets to export")]
    NothingToExport,
}

#[derive(Debug, Clone, PartialEq, Eq, From)]
/// One output row, cells in [`COLUMNS`] order
pub struct ExportRow(Vec<String>);

impl ExportRow {
    /// The row of column names
    pub fn header() -> ExportRow {
        ExportRow(COLUMNS.iter().map(|c| c.to_string()).collect())
    }

    /// Render a record, using the unmasked export form of the password
    pub fn from_record(record: &SecretRecord) -> ExportRow {
        let cell = |value: Option<&str>| value.unwrap_or_default().to_string();
        ExportRow(vec![
            cell(record.description()),
            cell(record.username()),
            cell(record.password_for_export()),
            cell(record.email()),
            cell(record.note()),
        ])
    }

    /// Cell values of this row
    pub fn cells(&self) -> &[String] {
        &self.0
    }
}

/// Destination for exported rows
pub trait RowSink {
    /// Write a single row
    fn write_row(&mut self, row: &ExportRow) -> Result<(), ExportError>;
    /// Flush anything buffered, called once whether or not writing succeeded
    fn finish(&mut self) -> Result<(), ExportError>;
}

impl<W: io::Write> RowSink for csv::Writer<W> {
    fn write_row(&mut self, row: &ExportRow) -> Result<(), ExportError> {
        self.write_record(row.cells())?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ExportError> {
        self.flush()?;
        Ok(())
    }
}

impl RowSink for Vec<ExportRow> {
    fn write_row(&mut self, row: &ExportRow) -> Result<(), ExportError> {
        self.push(row.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ExportError> {
        Ok(())
    }
}

/// CSV writer with every field quoted and `\n` line endings
pub fn csv_writer<W: io::Write>(output: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(output)
}

fn write_rows<S: RowSink + ?Sized>(
    records: &[SecretRecord],
    sink: &mut S,
) -> Result<usize, ExportError> {
    sink.write_row(&ExportRow::header())?;
    let mut rows = 0;
    for record in records {
        sink.write_row(&ExportRow::from_record(record))?;
        rows += 1;
    }
    Ok(rows)
}

/// Write the header row and one row per record to `sink`
///
/// The sink is finished on every path. Returns the number of data rows,
/// or [`ExportError::NothingToExport`] if there were none, in which case
/// the header row has still been written.
pub fn export_records<S: RowSink + ?Sized>(
    records: &[SecretRecord],
    sink: &mut S,
) -> Result<usize, ExportError> {
    let written = write_rows(records, sink);
    let finished = sink.finish();
    let rows = written?;
    finished?;
    debug!(rows, "Exported secrets");
    if rows == 0 {
        return Err(ExportError::NothingToExport);
    }
    Ok(rows)
}

/// Export records as CSV to `output`
pub fn write_csv<W: io::Write>(records: &[SecretRecord], output: W) -> Result<usize, ExportError> {
    let mut writer = csv_writer(output);
    export_records(records, &mut writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> SecretRecord {
        SecretRecord {
            description: Some("Bank".into()),
            username: Some("alice".into()),
            password: Some("s3cr3t".into()),
            email: Some(String::new()),
            note: Some("main".into()),
            ..Default::default()
        }
    }

    struct FailingSink {
        finished: bool,
    }

    impl RowSink for FailingSink {
        fn write_row(&mut self, _row: &ExportRow) -> Result<(), ExportError> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full").into())
        }

        fn finish(&mut self) -> Result<(), ExportError> {
            self.finished = true;
            Ok(())
        }
    }

    #[test]
    fn rows_follow_column_order() {
        let mut rows = Vec::new();
        assert_eq!(export_records(&[bank()], &mut rows).unwrap(), 1);
        assert_eq!(rows[0].cells(), COLUMNS);
        assert_eq!(rows[1].cells(), ["Bank", "alice", "s3cr3t", "", "main"]);
    }

    #[test]
    fn absent_fields_are_empty_cells() {
        let mut rows = Vec::new();
        export_records(&[SecretRecord::default()], &mut rows).unwrap();
        assert_eq!(rows[1], ExportRow::from(vec![String::new(); 5]));
    }

    #[test]
    fn csv_quotes_every_field() {
        let mut output = Vec::new();
        write_csv(&[bank()], &mut output).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "\"Description\",\"Id\",\"PIN\",\"Email\",\"Notes\"\n\
             \"Bank\",\"alice\",\"s3cr3t\",\"\",\"main\"\n"
        );
    }

    #[test]
    fn embedded_quotes_and_newlines_are_escaped() {
        let record = SecretRecord {
            note: Some("say \"hi\"\nbye".into()),
            ..Default::default()
        };
        let mut output = Vec::new();
        write_csv(&[record], &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.ends_with("\"\",\"\",\"\",\"\",\"say \"\"hi\"\"\nbye\"\n"));
    }

    #[test]
    fn empty_export_still_writes_header() {
        let mut output = Vec::new();
        match write_csv(&[], &mut output) {
            Err(ExportError::NothingToExport) => {}
            other => panic!("Unexpected result {:?}", other),
        }
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "\"Description\",\"Id\",\"PIN\",\"Email\",\"Notes\"\n"
        );
    }

    #[test]
    fn sink_is_finished_after_failure() {
        let mut sink = FailingSink { finished: false };
        assert!(matches!(
            export_records(&[bank()], &mut sink),
            Err(ExportError::Io(_))
        ));
        assert!(sink.finished);
    }
}
