//! Table output for command results
//!
//! Commands fill a [`Table`] and render it in the requested format:
//! rounded tables for `auto`, markdown for `md`, and tab-separated rows for
//! `tsv` so output can be piped into `cut`, `awk` or a spreadsheet.

use tabled::{builder::Builder, settings::Style};

use crate::cli::OutputFormat;

/// Rows of pre-formatted cells under a header
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.rows.push(row.into_iter().map(|c| c.to_string()).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Render for `format`; JSON and YAML are handled by the caller
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Tsv => {
                let mut out = self.headers.join("\t");
                out.push('\n');
                for row in &self.rows {
                    out.push_str(&row.join("\t"));
                    out.push('\n');
                }
                out
            }
            OutputFormat::Md => self.build().with(Style::markdown()).to_string() + "\n",
            _ => self.build().with(Style::rounded()).to_string() + "\n",
        }
    }

    fn build(&self) -> tabled::Table {
        let mut builder = Builder::default();
        builder.push_record(self.headers.iter().map(String::as_str));
        for row in &self.rows {
            builder.push_record(row.iter().map(String::as_str));
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(["Part", "Qty"]);
        table.push(["Side", "2"]);
        table.push(["Door", "2"]);
        table
    }

    #[test]
    fn test_tsv() {
        assert_eq!(sample().render(OutputFormat::Tsv), "Part\tQty\nSide\t2\nDoor\t2\n");
    }

    #[test]
    fn test_markdown() {
        let md = sample().render(OutputFormat::Md);
        assert!(md.contains("| Part | Qty |"));
        assert!(md.contains("| Side | 2   |"));
    }

    #[test]
    fn test_len() {
        let table = sample();
        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());
        assert!(Table::new(["A"]).is_empty());
    }
}
