use std::path::Path;

use survey_parser::builder::SheetBuilder;
use survey_parser::{CellValue, Sheet};

/// The name of a file without its directory and its extension.
pub fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// The lowercase extension of a file, or an empty string.
pub fn file_extension(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Builds a sheet from a grid of cells. The first row holds the headers.
pub fn assemble_sheet(name: &str, header: Vec<String>, rows: Vec<Vec<CellValue>>) -> Sheet {
    let mut builder = SheetBuilder::new(name);
    builder.set_headers(header);
    for row in rows {
        builder.push_row(row);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(file_stem("/data/2024/Jane Doe.csv"), "Jane Doe");
        assert_eq!(file_stem("survey"), "survey");
        assert_eq!(file_extension("/data/Survey.XLSX"), "xlsx");
        assert_eq!(file_extension("/data/survey"), "");
    }

    #[test]
    fn sheets_are_normalized() {
        let sheet = assemble_sheet(
            "Alice",
            vec!["Q".to_string(), "Q".to_string(), "".to_string()],
            vec![
                vec![CellValue::from("Excellent")],
                vec![CellValue::Empty, CellValue::Empty, CellValue::Empty],
            ],
        );
        assert_eq!(sheet.headers, vec!["Q", "Q_1", "__EMPTY"]);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].len(), 3);
    }
}
