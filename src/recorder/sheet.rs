use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub const HEADER: [&str; 5] = ["timestamp", "agentName", "occasion", "ticketLink", "productLink"];

#[derive(Debug)]
pub enum SheetError {
    Io(std::io::Error),
}

impl std::fmt::Display for SheetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetError::Io(err) => write!(f, "Sheet I/O error: {err}"),
        }
    }
}

impl std::error::Error for SheetError {}

impl From<std::io::Error> for SheetError {
    fn from(err: std::io::Error) -> Self {
        SheetError::Io(err)
    }
}

/// Durable, append-only row storage.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Append one row and return its 1-based row number.
    async fn append_row(&self, row: [&str; 5]) -> Result<u64, SheetError>;
}

/// A CSV file laid out like a spreadsheet: a header on row 1, one
/// submission per row after it. Appends are serialised in-process.
pub struct CsvSheet {
    path: PathBuf,
    /// Number of records currently in the file, header included.
    rows: Mutex<u64>,
}

impl CsvSheet {
    /// Open the sheet at `path`, writing the header if the file is new or empty.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SheetError> {
        let path = path.as_ref().to_path_buf();

        let existing = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let mut rows = count_records(&existing);
        // Terminate a last record saved without a newline so appends start on their own line.
        if !existing.is_empty() && !existing.ends_with('\n') {
            append_line(&path, "\n").await?;
            rows += 1;
        }
        if rows == 0 {
            append_line(&path, &encode_row(HEADER)).await?;
            rows = 1;
        }

        tracing::info!("Sheet {} opened with {rows} rows", path.display());

        Ok(Self {
            path,
            rows: Mutex::new(rows),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SheetStore for CsvSheet {
    async fn append_row(&self, row: [&str; 5]) -> Result<u64, SheetError> {
        let mut rows = self.rows.lock().await;
        append_line(&self.path, &encode_row(row)).await?;
        *rows += 1;
        Ok(*rows)
    }
}

async fn append_line(path: &Path, line: &str) -> Result<(), SheetError> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

fn encode_row(row: [&str; 5]) -> String {
    let mut line = row.map(csv_escape).join(",");
    line.push('\n');
    line
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Count newline-terminated records, ignoring newlines inside quoted fields.
fn count_records(contents: &str) -> u64 {
    let mut in_quotes = false;
    let mut records = 0;
    for c in contents.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\n' if !in_quotes => records += 1,
            _ => {}
        }
    }
    records
}
