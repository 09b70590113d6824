use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::json;
use serde_json::Value as JSValue;
use survey_parser::insights::{leader_insights, rank_leaders};
use survey_parser::validation::{validate_with_label, Diagnostic};
use survey_parser::*;
use text_diff::print_diff;

use crate::args::Args;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;

pub use crate::survey::config_reader::*;

#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display("Error reading file {path}"))]
    ReadingInput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Could not decode the xlsx workbook"))]
    DecodingXlsx { source: calamine::XlsxError },
    #[snafu(display("Could not decode the xls workbook"))]
    DecodingXls { source: calamine::XlsError },
    #[snafu(display("Could not decode the ods workbook"))]
    DecodingOds { source: calamine::OdsError },
    #[snafu(display("Could not decode the csv file"))]
    DecodingCsv { source: csv::Error },
    #[snafu(display("Sheet {name:?} is listed in the workbook but could not be found"))]
    MissingSheet { name: String },
    #[snafu(display("Unknown input type {input_type:?}, expected one of xlsx, xls, ods, csv"))]
    UnknownInputType { input_type: String },
    #[snafu(display("Error opening json file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing json file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Invalid survey vocabulary"))]
    InvalidVocabulary { source: ConfigError },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error serializing the output"))]
    SerializingJson { source: serde_json::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;

/// The containers a survey can be read from.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Xlsx,
    Xls,
    Ods,
    Csv,
}

impl InputType {
    pub fn parse(s: &str) -> SurveyResult<InputType> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "xlsm" => Ok(InputType::Xlsx),
            "xls" => Ok(InputType::Xls),
            "ods" => Ok(InputType::Ods),
            "csv" => Ok(InputType::Csv),
            _ => UnknownInputTypeSnafu { input_type: s }.fail(),
        }
    }

    /// Guesses the type from the extension of the file.
    pub fn from_path(path: &str) -> SurveyResult<InputType> {
        let ext = io_common::file_extension(path);
        InputType::parse(&ext)
    }
}

/// Decodes the bytes of a spreadsheet into sheets of header-keyed rows.
///
/// `default_sheet_name` names the single sheet of formats without sheet names (csv).
pub fn decode_workbook(
    bytes: &[u8],
    input_type: InputType,
    default_sheet_name: &str,
) -> SurveyResult<Workbook> {
    let workbook = match input_type {
        InputType::Xlsx => io_excel::read_xlsx(bytes),
        InputType::Xls => io_excel::read_xls(bytes),
        InputType::Ods => io_excel::read_ods(bytes),
        InputType::Csv => io_csv::read_csv(bytes, default_sheet_name),
    }?;
    debug!(
        "decode_workbook: {:?}: sheets: {:?}",
        input_type,
        workbook
            .sheets
            .iter()
            .map(|s| (s.name.as_str(), s.rows.len()))
            .collect::<Vec<_>>()
    );
    Ok(workbook)
}

/// Decodes and parses a survey. A decoding failure fails the whole operation.
pub fn parse_bytes(
    parser: &SurveyParser,
    bytes: &[u8],
    input_type: InputType,
    default_sheet_name: &str,
) -> SurveyResult<Vec<LeaderRecord>> {
    let workbook = decode_workbook(bytes, input_type, default_sheet_name)?;
    Ok(parser.parse_workbook(&workbook))
}

fn write_output(out: Option<&str>, contents: &str) -> SurveyResult<()> {
    match out {
        None | Some("stdout") => {
            println!("{}", contents);
            Ok(())
        }
        Some(path) => {
            info!("Writing {:?}", path);
            fs::write(path, contents).context(WritingOutputSnafu { path })
        }
    }
}

fn build_summary_js(records: &[LeaderRecord], config: &ParserConfig, top: Option<usize>) -> JSValue {
    let max_rating = config
        .rating_scale
        .levels()
        .iter()
        .map(|l| l.value)
        .max()
        .unwrap_or(0);
    let leaders: Vec<_> = records
        .iter()
        .map(|r| leader_insights(r, max_rating))
        .collect();
    json!({
        "leaders": leaders,
        "ranking": rank_leaders(records, top)
    })
}

fn report_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        info!("Validation: no issue found");
    }
    for d in diagnostics.iter() {
        warn!("Validation: {}", d);
        eprintln!("{}", d);
    }
}

// All the numbers become floats, so that `4` in a reference equals a computed `4.0`.
fn normalize_numbers(js: JSValue) -> JSValue {
    match js {
        JSValue::Number(n) => match n.as_f64().and_then(serde_json::Number::from_f64) {
            Some(f) => JSValue::Number(f),
            None => JSValue::Number(n),
        },
        JSValue::Array(l) => JSValue::Array(l.into_iter().map(normalize_numbers).collect()),
        JSValue::Object(m) => JSValue::Object(
            m.into_iter()
                .map(|(k, v)| (k, normalize_numbers(v)))
                .collect(),
        ),
        x => x,
    }
}

/// Compares the records to a reference dataset, and prints the differences.
/// Numbers are compared by value: `4` and `4.0` are the same.
pub fn check_reference(reference_path: &str, records: &[LeaderRecord]) -> SurveyResult<()> {
    let reference = normalize_numbers(read_reference(reference_path)?);
    let computed = normalize_numbers(serde_json::to_value(records).context(SerializingJsonSnafu {})?);
    let pretty_reference = serde_json::to_string_pretty(&reference).context(SerializingJsonSnafu {})?;
    let pretty_computed = serde_json::to_string_pretty(&computed).context(SerializingJsonSnafu {})?;
    if pretty_reference != pretty_computed {
        warn!("Found differences with the reference {:?}", reference_path);
        print_diff(pretty_reference.as_str(), pretty_computed.as_str(), "\n");
        whatever!("Difference detected between the parsed survey and the reference");
    }
    info!("Output matches the reference {:?}", reference_path);
    Ok(())
}

pub fn run_survey(args: &Args) -> SurveyResult<()> {
    let parser_config = match args.config.as_deref() {
        Some(path) => read_config(path)?,
        None => ParserConfig::default(),
    };
    let parser = SurveyParser::new(parser_config).context(InvalidVocabularySnafu {})?;

    let input_type = match args.input_type.as_deref() {
        Some(s) => InputType::parse(s)?,
        None => InputType::from_path(&args.input)?,
    };
    info!("Reading survey {:?} as {:?}", args.input, input_type);
    let bytes = fs::read(&args.input).context(ReadingInputSnafu {
        path: args.input.clone(),
    })?;

    let sheet_name = io_common::file_stem(&args.input);
    let records = parse_bytes(&parser, &bytes, input_type, &sheet_name)?;
    info!("Parsed {} leaders", records.len());

    let pretty = serde_json::to_string_pretty(&records).context(SerializingJsonSnafu {})?;
    write_output(args.out.as_deref(), &pretty)?;

    if args.validate {
        let diagnostics = validate_with_label(&records, &parser.config().no_comments_label);
        report_diagnostics(&diagnostics);
    }

    if let Some(summary_path) = args.summary.as_deref() {
        let js = build_summary_js(&records, parser.config(), args.top);
        let pretty_summary = serde_json::to_string_pretty(&js).context(SerializingJsonSnafu {})?;
        write_output(Some(summary_path), &pretty_summary)?;
    }

    if let Some(reference_path) = args.reference.as_deref() {
        check_reference(reference_path, &records)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("fb360-{}", std::process::id()));
        fs::create_dir_all(&p).unwrap();
        p.push(name);
        p
    }

    fn args_for(input: &str) -> Args {
        Args {
            input: input.to_string(),
            input_type: None,
            config: None,
            out: None,
            reference: None,
            summary: None,
            top: None,
            validate: false,
            verbose: false,
        }
    }

    const CSV_SURVEY: &str = "\
Timestamp,Name,Relationship with the Leader,[Listens actively] Communication skills,What should this leader STOP doing?
2024-01-02,Bob,Peer,Demonstrated,Interrupting
2024-01-03,Carol,Direct report,Excellent,
,,,Highly demonstrated,Nothing
";

    fn write_rows(ws: &mut rust_xlsxwriter::Worksheet, rows: &[Vec<&str>]) {
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                if !v.is_empty() {
                    ws.write_string(r as u32, c as u16, *v).unwrap();
                }
            }
        }
    }

    fn survey_xlsx() -> Vec<u8> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        {
            let ws = workbook.add_worksheet();
            ws.set_name("Alice").unwrap();
            write_rows(
                ws,
                &[
                    vec!["Timestamp", "Name", "Teamwork [Shares credit]", "Teamwork [Helps others]"],
                    vec!["", "Bob", "Excellent", "Demonstrated"],
                    vec!["", "Carol", "Partially demonstrated", ""],
                    vec!["", "", "Demonstrated", "Excellent"],
                ],
            );
            ws.write_number(1, 0, 45000.5).unwrap();
            ws.write_number(2, 0, 45001.5).unwrap();
        }
        {
            let ws = workbook.add_worksheet();
            ws.set_name("Nobody").unwrap();
        }
        {
            let ws = workbook.add_worksheet();
            ws.set_name("Dave").unwrap();
            write_rows(
                ws,
                &[
                    vec!["Email", "Leadership", "Leadership", ""],
                    vec!["e@x.com", "Excellent", "Excellent", "x"],
                ],
            );
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn input_types() {
        assert_eq!(InputType::parse("XLSX").unwrap(), InputType::Xlsx);
        assert_eq!(InputType::parse("xlsm").unwrap(), InputType::Xlsx);
        assert_eq!(
            InputType::from_path("/tmp/Survey Results.ods").unwrap(),
            InputType::Ods
        );
        assert_eq!(InputType::from_path("a.b.csv").unwrap(), InputType::Csv);
        assert!(matches!(
            InputType::from_path("survey.pdf"),
            Err(SurveyError::UnknownInputType { .. })
        ));
        assert!(InputType::from_path("survey").is_err());
    }

    #[test]
    fn csv_survey() {
        let records = parse_bytes(
            &SurveyParser::default(),
            CSV_SURVEY.as_bytes(),
            InputType::Csv,
            "Alice",
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.leader, "Alice");
        assert_eq!(r.peer_response_count, 2);
        assert_eq!(r.average_scores["Communication"], Some(4.0));
        assert_eq!(r.self_assessment["Communication"], Some(4.0));
        assert_eq!(r.questions[0].short_question, "Listens actively");
        assert_eq!(r.questions[0].peer_ratings, vec![3, 5]);
        assert_eq!(r.comments.stop, "Interrupting");
        assert_eq!(r.relationship_breakdown.len(), 2);
    }

    #[test]
    fn csv_with_bom_and_empty_input() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(CSV_SURVEY.as_bytes());
        let wb = decode_workbook(&bytes, InputType::Csv, "s").unwrap();
        assert_eq!(wb.sheets[0].headers[0], "Timestamp");

        let records = parse_bytes(&SurveyParser::default(), b"", InputType::Csv, "s").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn invalid_csv_is_a_decoding_error() {
        let res = decode_workbook(b"a,b\n\xff\xfe,x\n", InputType::Csv, "s");
        assert!(matches!(res, Err(SurveyError::DecodingCsv { .. })));
    }

    #[test]
    fn xlsx_survey() {
        let records =
            parse_bytes(&SurveyParser::default(), &survey_xlsx(), InputType::Xlsx, "unused").unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.leader.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Dave"]);

        let alice = &records[0];
        assert_eq!(alice.peer_response_count, 2);
        assert_eq!(alice.average_scores["Teamwork"], Some(3.33));
        assert_eq!(alice.self_assessment["Teamwork"], Some(4.0));
        assert_eq!(alice.questions.len(), 2);
        assert_eq!(alice.questions[0].short_question, "Shares credit");
        assert_eq!(alice.questions[1].peer_ratings, vec![3]);
        assert_eq!(alice.questions[1].self_rating, Some(5));

        let dave = &records[1];
        assert_eq!(dave.peer_response_count, 1);
        assert_eq!(dave.questions[1].full_question, "Leadership_1");
        assert_eq!(dave.average_scores["Leadership"], Some(5.0));
        assert!(dave.self_assessment.values().all(|v| v.is_none()));
    }

    #[test]
    fn garbage_is_a_decoding_error() {
        let res = decode_workbook(b"not a spreadsheet", InputType::Xlsx, "s");
        assert!(matches!(res, Err(SurveyError::DecodingXlsx { .. })));
        let res = decode_workbook(b"not a spreadsheet", InputType::Ods, "s");
        assert!(matches!(res, Err(SurveyError::DecodingOds { .. })));
        let res = decode_workbook(b"not a spreadsheet", InputType::Xls, "s");
        assert!(matches!(res, Err(SurveyError::DecodingXls { .. })));
    }

    #[test]
    fn parsing_twice_gives_the_same_output() {
        let bytes = survey_xlsx();
        let parser = SurveyParser::default();
        let a = parse_bytes(&parser, &bytes, InputType::Xlsx, "s").unwrap();
        let b = parse_bytes(&parser, &bytes, InputType::Xlsx, "s").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn run_end_to_end() {
        let input = temp_path("Alice.csv");
        let out = temp_path("out.json");
        let summary = temp_path("summary.json");
        fs::write(&input, CSV_SURVEY).unwrap();

        let mut args = args_for(input.to_str().unwrap());
        args.out = Some(out.to_str().unwrap().to_string());
        args.summary = Some(summary.to_str().unwrap().to_string());
        args.validate = true;
        run_survey(&args).unwrap();

        let js: JSValue = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(js[0]["leader"], "Alice");
        assert_eq!(js[0]["peerResponseCount"], 2);

        let sjs: JSValue = serde_json::from_str(&fs::read_to_string(&summary).unwrap()).unwrap();
        assert_eq!(sjs["ranking"][0]["leader"], "Alice");
        assert_eq!(sjs["leaders"][0]["overallPeerAverage"], 4.0);

        // The output is its own reference.
        args.summary = None;
        args.reference = Some(out.to_str().unwrap().to_string());
        run_survey(&args).unwrap();

        let reference = temp_path("reference.json");
        fs::write(&reference, "[]").unwrap();
        args.reference = Some(reference.to_str().unwrap().to_string());
        assert!(matches!(
            run_survey(&args),
            Err(SurveyError::Whatever { .. })
        ));

        for p in [input, out, summary, reference] {
            let _ = fs::remove_file(p);
        }
    }

    #[test]
    fn reference_numbers_compare_by_value() {
        let records = parse_bytes(
            &SurveyParser::default(),
            CSV_SURVEY.as_bytes(),
            InputType::Csv,
            "Alice",
        )
        .unwrap();
        let mut js = serde_json::to_value(&records).unwrap();
        // Written by hand, without a fractional part.
        js[0]["questions"][0]["peerAverage"] = json!(4);
        js[0]["averageScores"]["Communication"] = json!(4);
        let reference = temp_path("integer-reference.json");
        fs::write(&reference, serde_json::to_string(&js).unwrap()).unwrap();
        assert!(check_reference(reference.to_str().unwrap(), &records).is_ok());

        js[0]["questions"][0]["peerAverage"] = json!(4.5);
        fs::write(&reference, serde_json::to_string(&js).unwrap()).unwrap();
        assert!(matches!(
            check_reference(reference.to_str().unwrap(), &records),
            Err(SurveyError::Whatever { .. })
        ));
        let _ = fs::remove_file(reference);
    }

    #[test]
    fn missing_input_file() {
        let args = args_for("/this/file/does/not/exist.xlsx");
        assert!(matches!(
            run_survey(&args),
            Err(SurveyError::ReadingInput { .. })
        ));
    }
}
