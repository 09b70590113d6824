// Readers for the spreadsheet formats that calamine decodes.

use std::io::Cursor;

use calamine::{DataType, Ods, Range, Reader, Xls, Xlsx};
use snafu::prelude::*;

use survey_parser::builder::WorkbookBuilder;
use survey_parser::{format_number, CellValue, Sheet, Workbook};

use crate::survey::io_common::assemble_sheet;
use crate::survey::*;

pub fn read_xlsx(bytes: &[u8]) -> SurveyResult<Workbook> {
    let mut excel: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec())).context(DecodingXlsxSnafu {})?;
    let names = excel.sheet_names().to_owned();
    collect_sheets(names, |name| excel.worksheet_range(name), |source| {
        SurveyError::DecodingXlsx { source }
    })
}

pub fn read_xls(bytes: &[u8]) -> SurveyResult<Workbook> {
    let mut excel: Xls<_> = Xls::new(Cursor::new(bytes.to_vec())).context(DecodingXlsSnafu {})?;
    let names = excel.sheet_names().to_owned();
    collect_sheets(names, |name| excel.worksheet_range(name), |source| {
        SurveyError::DecodingXls { source }
    })
}

pub fn read_ods(bytes: &[u8]) -> SurveyResult<Workbook> {
    let mut excel: Ods<_> = Ods::new(Cursor::new(bytes.to_vec())).context(DecodingOdsSnafu {})?;
    let names = excel.sheet_names().to_owned();
    collect_sheets(names, |name| excel.worksheet_range(name), |source| {
        SurveyError::DecodingOds { source }
    })
}

// Sheets are kept in the order of the workbook.
fn collect_sheets<E>(
    names: Vec<String>,
    mut range_of: impl FnMut(&str) -> Option<Result<Range<DataType>, E>>,
    decoding_error: impl Fn(E) -> SurveyError,
) -> SurveyResult<Workbook> {
    let mut builder = WorkbookBuilder::new();
    for name in names.iter() {
        let wrange = range_of(name)
            .context(MissingSheetSnafu { name })?
            .map_err(&decoding_error)?;
        debug!(
            "collect_sheets: sheet {:?}: size {:?}",
            name,
            wrange.get_size()
        );
        builder.add_sheet(range_to_sheet(name, &wrange));
    }
    Ok(builder.build())
}

fn range_to_sheet(name: &str, wrange: &Range<DataType>) -> Sheet {
    let mut rows = wrange.rows();
    let header: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(header_text).collect(),
        None => Vec::new(),
    };
    debug!("range_to_sheet: {:?}: header: {:?}", name, header);
    let body: Vec<Vec<CellValue>> = rows
        .map(|cells| cells.iter().map(cell_value).collect())
        .collect();
    assemble_sheet(name, header, body)
}

fn header_text(cell: &DataType) -> String {
    match cell_value(cell) {
        CellValue::Text(s) => s,
        CellValue::Number(n) => format_number(n),
        CellValue::Empty => String::new(),
    }
}

fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(s) => CellValue::from(s.as_str()),
        DataType::Float(f) => CellValue::Number(*f),
        DataType::Int(i) => CellValue::Number(*i as f64),
        DataType::DateTime(f) => CellValue::Number(*f),
        DataType::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        _ => CellValue::Empty,
    }
}
