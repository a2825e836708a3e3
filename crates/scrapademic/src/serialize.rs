//! Output encodings for a scraped publication list.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{PublicationRecord, ScrapeError, ScrapeResult};

/// Table name used by the SQL encoding.
pub const SQL_TABLE: &str = "publications";

const CSV_HEADER: [&str; 5] = ["title", "authors", "journal", "year", "citedBy"];

/// Supported output encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// One title per line.
    Text,
    /// Pretty-printed JSON array.
    #[default]
    Json,
    Csv,
    /// `CREATE TABLE` plus one batch `INSERT`.
    Sql,
    /// Markdown summary with a numbered section per publication.
    Summary,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Text,
        OutputFormat::Json,
        OutputFormat::Csv,
        OutputFormat::Sql,
        OutputFormat::Summary,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Sql => "sql",
            OutputFormat::Summary => "summary",
        }
    }

    /// File extension used for the default output file name.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Sql => "sql",
            OutputFormat::Summary => "md",
        }
    }

    /// `scholar_output.<ext>`
    pub fn default_file_name(self) -> String {
        format!("scholar_output.{}", self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "sql" => Ok(OutputFormat::Sql),
            "summary" | "md" | "markdown" => Ok(OutputFormat::Summary),
            other => Err(ScrapeError::Serialization(format!(
                "unsupported output format {other:?} (expected text, json, csv, sql or summary)"
            ))),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Render `records` in the requested encoding.
pub fn serialize(records: &[PublicationRecord], format: OutputFormat) -> ScrapeResult<String> {
    match format {
        OutputFormat::Text => Ok(to_text(records)),
        OutputFormat::Json => serde_json::to_string_pretty(records)
            .map_err(|e| ScrapeError::Serialization(format!("JSON encoding failed: {e}"))),
        OutputFormat::Csv => to_csv(records),
        OutputFormat::Sql => Ok(to_sql(records)),
        OutputFormat::Summary => Ok(to_summary(records)),
    }
}

fn to_text(records: &[PublicationRecord]) -> String {
    records
        .iter()
        .map(|r| format!("{}\n", r.title))
        .collect()
}

fn to_csv(records: &[PublicationRecord]) -> ScrapeResult<String> {
    let csv_err = |e: csv::Error| ScrapeError::Serialization(format!("CSV encoding failed: {e}"));

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_err)?;
    for r in records {
        let authors = r.authors.join("; ");
        let cited_by = r.cited_by.to_string();
        writer
            .write_record([
                r.title.as_str(),
                authors.as_str(),
                r.journal.as_str(),
                r.year.as_str(),
                cited_by.as_str(),
            ])
            .map_err(csv_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ScrapeError::Serialization(format!("CSV flush failed: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| ScrapeError::Serialization(format!("CSV output is not UTF-8: {e}")))
}

fn to_sql(records: &[PublicationRecord]) -> String {
    let mut out = format!(
        "CREATE TABLE IF NOT EXISTS {SQL_TABLE} (\n  \
         title TEXT NOT NULL,\n  \
         authors TEXT NOT NULL,\n  \
         journal TEXT NOT NULL,\n  \
         year TEXT NOT NULL,\n  \
         cited_by INTEGER NOT NULL\n);\n"
    );

    if records.is_empty() {
        return out;
    }

    let _ = writeln!(
        out,
        "\nINSERT INTO {SQL_TABLE} (title, authors, journal, year, cited_by) VALUES"
    );
    let rows: Vec<String> = records
        .iter()
        .map(|r| {
            format!(
                "  ({}, {}, {}, {}, {})",
                sql_quote(&r.title),
                sql_quote(&r.authors.join(", ")),
                sql_quote(&r.journal),
                sql_quote(&r.year),
                r.cited_by
            )
        })
        .collect();
    out.push_str(&rows.join(",\n"));
    out.push_str(";\n");
    out
}

fn sql_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn to_summary(records: &[PublicationRecord]) -> String {
    let mut out = String::from("# Publications\n");

    if records.is_empty() {
        out.push_str("\nNo publications found.\n");
        return out;
    }

    for (i, r) in records.iter().enumerate() {
        let _ = write!(
            out,
            "\n## {}. {}\n\n\
             - **Authors:** {}\n\
             - **Journal:** {}\n\
             - **Year:** {}\n\
             - **Cited by:** {}\n",
            i + 1,
            r.title,
            r.authors.join(", "),
            r.journal,
            r.year,
            r.cited_by
        );
    }
    out
}
