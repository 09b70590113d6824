use std::collections::HashSet;

pub use crate::config::*;

/// A builder for assembling a sheet row by row.
///
/// Readers of spreadsheet formats use it to normalize what they decode: headers
/// are made distinct and rows without any content are dropped.
///
/// ```
/// use survey_parser::builder::SheetBuilder;
///
/// let sheet = SheetBuilder::new("Alice")
///     .headers(&["Name", "[Listens actively] Communication skills"])
///     .text_row(&["Bob", "Demonstrated"])
///     .text_row(&["", ""])
///     .text_row(&["", "Excellent"])
///     .build();
///
/// assert_eq!(sheet.rows.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SheetBuilder {
    name: String,
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl SheetBuilder {
    pub fn new(name: &str) -> SheetBuilder {
        SheetBuilder {
            name: name.to_string(),
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn headers(mut self, headers: &[&str]) -> SheetBuilder {
        self.set_headers(headers.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn row(mut self, row: Row) -> SheetBuilder {
        self.push_row(row);
        self
    }

    /// Adds a row of text cells. Empty strings become empty cells.
    pub fn text_row(mut self, cells: &[&str]) -> SheetBuilder {
        self.push_row(cells.iter().map(|s| CellValue::from(*s)).collect());
        self
    }

    /// Replaces the headers. Blank headers are named `__EMPTY`, `__EMPTY_1`, ... and
    /// repeated headers get a numerical suffix.
    pub fn set_headers(&mut self, headers: Vec<String>) {
        self.headers = unique_headers(headers);
    }

    /// Adds a row, padded or truncated to the width of the header.
    /// Rows made only of empty cells are skipped.
    pub fn push_row(&mut self, mut row: Row) {
        if row.iter().all(|c| *c == CellValue::Empty) {
            return;
        }
        row.resize(self.headers.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn build(self) -> Sheet {
        Sheet {
            name: self.name,
            headers: self.headers,
            rows: self.rows,
        }
    }
}

fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut res: Vec<String> = Vec::new();
    for h in headers {
        let base = if h.trim().is_empty() {
            "__EMPTY".to_string()
        } else {
            h
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        seen.insert(candidate.clone());
        res.push(candidate);
    }
    res
}

/// Collects sheets in order.
#[derive(Debug, Clone, Default)]
pub struct WorkbookBuilder {
    sheets: Vec<Sheet>,
}

impl WorkbookBuilder {
    pub fn new() -> WorkbookBuilder {
        WorkbookBuilder::default()
    }

    pub fn sheet(mut self, sheet: SheetBuilder) -> WorkbookBuilder {
        self.add_sheet(sheet.build());
        self
    }

    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn build(self) -> Workbook {
        Workbook {
            sheets: self.sheets,
        }
    }
}
