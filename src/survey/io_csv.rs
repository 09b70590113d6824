// Primitives for reading CSV files.

use snafu::prelude::*;
use survey_parser::builder::WorkbookBuilder;
use survey_parser::{CellValue, Workbook};

use crate::survey::{io_common::assemble_sheet, *};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads a CSV export as a workbook with a single sheet. All the cells are text.
pub fn read_csv(bytes: &[u8], sheet_name: &str) -> SurveyResult<Workbook> {
    let data = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut lines: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        let line = line_r.context(DecodingCsvSnafu {})?;
        debug!("read_csv: lineno: {:?} row: {:?}", idx + 1, line);
        lines.push(line.iter().map(|s| s.to_string()).collect());
    }

    let mut iter = lines.into_iter();
    let mut header: Vec<String> = iter.next().unwrap_or_default();
    let body: Vec<Vec<CellValue>> = iter
        .map(|l| l.iter().map(|s| CellValue::from(s.as_str())).collect())
        .collect();
    // Cells past the end of the header row get blank headers.
    let width = body.iter().map(|r| r.len()).max().unwrap_or(0);
    if header.len() < width {
        header.resize(width, String::new());
    }

    let mut builder = WorkbookBuilder::new();
    builder.add_sheet(assemble_sheet(sheet_name, header, body));
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_lines() {
        let wb = read_csv(b"Name,Teamwork\nBob,Excellent,extra\n,\nCarol\n", "Lee").unwrap();
        let sheet = &wb.sheets[0];
        assert_eq!(sheet.name, "Lee");
        assert_eq!(sheet.headers, vec!["Name", "Teamwork", "__EMPTY"]);
        // The blank line is dropped.
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.get(0, "__EMPTY"), Some(&CellValue::from("extra")));
        assert_eq!(sheet.get(1, "Teamwork"), Some(&CellValue::Empty));
    }

    #[test]
    fn numbers_stay_text() {
        let wb = read_csv(b"Timestamp,Teamwork\n45000.5,Demonstrated\n", "Lee").unwrap();
        assert_eq!(
            wb.sheets[0].get(0, "Timestamp"),
            Some(&CellValue::Text("45000.5".to_string()))
        );
    }
}
