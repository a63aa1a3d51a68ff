//! Header-indexed CSV tables.
//!
//! Section rows, trial rows and language-model rows are all small CSV files
//! with a header line. Reading honours RFC 4180 quoting (quoted commas,
//! doubled quotes and embedded newlines); writing quotes only fields that
//! need it.

use std::io::{self, Write};

/// A parse failure with the 1-based line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableError {
    pub line: usize,
    pub reason: String,
}

/// One data record and the line it started on.
#[derive(Debug, Clone)]
pub struct Record {
    pub line: usize,
    fields: Vec<String>,
}

impl Record {
    /// Field at `index`, or the empty string when the row is short.
    pub fn get(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }
}

/// A parsed CSV file: header plus data records.
#[derive(Debug, Clone)]
pub struct Table {
    header: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    /// Parse CSV text. The first non-empty record is the header.
    pub fn parse(text: &str) -> Result<Self, TableError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut records = split_records(text)?.into_iter();
        let header = match records.next() {
            Some(r) => r.fields.into_iter().map(|h| h.trim().to_string()).collect(),
            None => {
                return Err(TableError {
                    line: 1,
                    reason: "missing header row".to_string(),
                });
            }
        };
        Ok(Self {
            header,
            records: records.collect(),
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Index of the first column whose name matches any of `names`
    /// (case-insensitive).
    pub fn column(&self, names: &[&str]) -> Option<usize> {
        names.iter().find_map(|name| {
            self.header
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
        })
    }

    /// Like [`Table::column`], but a missing column is an error on the header line.
    pub fn require_column(&self, names: &[&str]) -> Result<usize, TableError> {
        self.column(names).ok_or_else(|| TableError {
            line: 1,
            reason: format!("missing column {}", names.join("|")),
        })
    }
}

fn split_records(text: &str) -> Result<Vec<Record>, TableError> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut start_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut fields), start_line);
                line += 1;
                start_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(TableError {
            line: start_line,
            reason: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        push_record(&mut records, fields, start_line);
    }
    Ok(records)
}

fn push_record(records: &mut Vec<Record>, fields: Vec<String>, line: usize) {
    let blank = fields.iter().all(|f| f.trim().is_empty());
    if !blank {
        records.push(Record { line, fields });
    }
}

/// Quote a field if it contains a comma, quote, or line break.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write one CSV row terminated by `\n`.
pub fn write_row<W: Write, S: AsRef<str>>(w: &mut W, fields: &[S]) -> io::Result<()> {
    let line: Vec<String> = fields.iter().map(|f| escape_field(f.as_ref())).collect();
    writeln!(w, "{}", line.join(","))
}
