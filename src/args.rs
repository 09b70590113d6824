use clap::Parser;

/// Turns 360-degree leadership survey spreadsheets into a JSON dataset, one record per leader.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The survey workbook: one sheet per leader, one row per respondent.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (xlsx, xls, ods or csv) The type of the input. By default, it is guessed from the
    /// extension of the input file.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path, optional) A JSON file replacing parts of the survey vocabulary: rating
    /// labels, categories, comment columns. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the leader records. Defaults to the
    /// standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the expected records in JSON format. If provided,
    /// fb360 will check that the parsed output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path or 'stdout') If specified, the insights for each leader and the ranking of the
    /// leaders are written there.
    #[clap(long, value_parser)]
    pub summary: Option<String>,

    /// (number) Only keeps this many leaders in the ranking of the summary.
    #[clap(long, value_parser)]
    pub top: Option<usize>,

    /// If passed as an argument, reports the missing data of each leader on the standard error.
    #[clap(long, takes_value = false)]
    pub validate: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
