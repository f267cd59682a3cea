use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ReportError;
use crate::parsing::compact_timestamp;
use crate::types::{ReportRow, TimeWindow};

pub const HEADER: [&str; 4] = [
    "Namespace",
    "Deployment",
    "CPU Usage Max (percent)",
    "Memory Usage Max (percent)",
];

pub fn report_file_name(namespace: &str, window: &TimeWindow) -> String {
    format!(
        "deployments_metrics_{}_{}_to_{}.csv",
        namespace,
        compact_timestamp(&window.start),
        compact_timestamp(&window.end)
    )
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// CSV report written one row at a time; each row reaches disk before the
/// next deployment is fetched.
pub struct CsvReport {
    path: PathBuf,
    file: File,
    rows: usize,
}

impl CsvReport {
    /// Creates (or truncates) the report file inside `dir` and writes the header.
    pub fn create(dir: &Path, namespace: &str, window: &TimeWindow) -> Result<Self, ReportError> {
        let path = dir.join(report_file_name(namespace, window));
        let file = File::create(&path).map_err(|source| ReportError::Create {
            path: path.clone(),
            source,
        })?;

        let mut report = Self { path, file, rows: 0 };
        report.write_line(&csv_line(&HEADER))?;
        Ok(report)
    }

    pub fn write_row(&mut self, row: &ReportRow) -> Result<(), ReportError> {
        let line = csv_line(&[
            row.namespace.clone(),
            row.deployment.clone(),
            format!("{:.6}", row.cpu_max_percent),
            format!("{:.6}", row.mem_max_percent),
        ]);
        self.write_line(&line)?;
        self.rows += 1;
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<(), ReportError> {
        self.file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
            .map_err(|source| ReportError::Write {
                path: self.path.clone(),
                source,
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}
