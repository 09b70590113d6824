// ********* Input data structures ***********

use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The content of a single cell, once decoded from the spreadsheet.
#[derive(PartialEq, Debug, Clone)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
}

pub(crate) static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    /// The trimmed text of this cell, or None if there is nothing to read
    /// (empty cell or whitespace only). Numbers are rendered as text.
    pub fn as_trimmed_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t.to_string())
                }
            }
            CellValue::Number(n) => Some(format_number(*n)),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.as_trimmed_text().is_none()
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// Integral numbers are printed without a fractional part (`3` and not `3.0`).
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// A row of cells. The position of a cell is the position of its header in the sheet.
pub type Row = Vec<CellValue>;

/// One sheet of the survey, which holds the responses about a single leader.
#[derive(PartialEq, Debug, Clone)]
pub struct Sheet {
    /// The name of the sheet, used as the display name of the leader.
    pub name: String,
    /// The column headers. They are expected to be distinct.
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The value of a cell, looked up by header. Returns None for an unknown header
    /// or a row out of bounds.
    pub fn get(&self, row: usize, header: &str) -> Option<&CellValue> {
        let col = self.headers.iter().position(|h| h == header)?;
        self.rows.get(row).map(|r| cell(r, col))
    }
}

// Rows may be shorter than the header: the missing cells are empty.
pub(crate) fn cell(row: &[CellValue], col: usize) -> &CellValue {
    row.get(col).unwrap_or(&EMPTY_CELL)
}

/// An ordered collection of sheets.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

// ******** Output data structures *********

/// Average rating per category, in the order of the configured categories.
/// A category without any rated cell maps to None.
pub type CategoryScores = IndexMap<String, Option<f64>>;

/// Statistics for one rated question (one column of the sheet).
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub full_question: String,
    pub short_question: String,
    pub peer_ratings: Vec<u8>,
    pub peer_average: Option<f64>,
    pub self_rating: Option<u8>,
}

/// The free-text answers, one entry per comment field.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Comments {
    pub start: String,
    pub stop: String,
    pub r#continue: String,
    pub general: String,
}

impl Comments {
    pub(crate) fn filled_with(label: &str) -> Comments {
        Comments {
            start: label.to_string(),
            stop: label.to_string(),
            r#continue: label.to_string(),
            general: label.to_string(),
        }
    }

    pub fn get(&self, field: CommentField) -> &str {
        match field {
            CommentField::Start => &self.start,
            CommentField::Stop => &self.stop,
            CommentField::Continue => &self.r#continue,
            CommentField::General => &self.general,
        }
    }

    pub(crate) fn set(&mut self, field: CommentField, text: String) {
        match field {
            CommentField::Start => self.start = text,
            CommentField::Stop => self.stop = text,
            CommentField::Continue => self.r#continue = text,
            CommentField::General => self.general = text,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipCount {
    pub relationship: String,
    pub count: usize,
}

/// Everything extracted from the sheet of one leader.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderRecord {
    pub leader: String,
    pub peer_response_count: usize,
    pub average_scores: CategoryScores,
    pub self_assessment: CategoryScores,
    pub questions: Vec<QuestionRecord>,
    pub comments: Comments,
    /// How many peers answered under each relationship to the leader, by order of appearance.
    pub relationship_breakdown: Vec<RelationshipCount>,
}

// ********* Configuration **********

/// The free-text fields collected from the survey.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentField {
    Start,
    Stop,
    Continue,
    General,
}

impl CommentField {
    pub const ALL: [CommentField; 4] = [
        CommentField::Start,
        CommentField::Stop,
        CommentField::Continue,
        CommentField::General,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CommentField::Start => "start",
            CommentField::Stop => "stop",
            CommentField::Continue => "continue",
            CommentField::General => "general",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RatingLevel {
    pub label: String,
    pub value: u8,
}

/// The ordinal labels a respondent can pick, with their numerical value.
///
/// Labels are matched without regard to case or to surrounding whitespace.
/// Only text cells are rated.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RatingScale {
    levels: Vec<RatingLevel>,
}

impl RatingScale {
    pub fn new(levels: &[(&str, u8)]) -> Result<RatingScale, ConfigError> {
        if levels.is_empty() {
            return Err(ConfigError::EmptyRatingScale);
        }
        let mut seen: HashSet<String> = HashSet::new();
        let mut res: Vec<RatingLevel> = Vec::new();
        for (label, value) in levels.iter() {
            let norm = label.trim().to_lowercase();
            if norm.is_empty() || *value == 0 {
                return Err(ConfigError::InvalidRatingLevel {
                    label: label.to_string(),
                    value: *value,
                });
            }
            if !seen.insert(norm) {
                return Err(ConfigError::DuplicateRatingLabel(label.to_string()));
            }
            res.push(RatingLevel {
                label: label.trim().to_string(),
                value: *value,
            });
        }
        Ok(RatingScale { levels: res })
    }

    pub fn levels(&self) -> &[RatingLevel] {
        &self.levels
    }

    pub fn rate_text(&self, s: &str) -> Option<u8> {
        let norm = s.trim().to_lowercase();
        self.levels
            .iter()
            .find(|l| l.label.to_lowercase() == norm)
            .map(|l| l.value)
    }

    pub fn rate(&self, cell: &CellValue) -> Option<u8> {
        match cell {
            CellValue::Text(s) => self.rate_text(s),
            _ => None,
        }
    }
}

impl Default for RatingScale {
    fn default() -> Self {
        RatingScale {
            levels: [
                ("Not demonstrated", 1),
                ("Partially demonstrated", 2),
                ("Demonstrated", 3),
                ("Highly demonstrated", 4),
                ("Excellent", 5),
            ]
            .iter()
            .map(|(label, value)| RatingLevel {
                label: label.to_string(),
                value: *value,
            })
            .collect(),
        }
    }
}

/// A leadership dimension, recognized by keywords in the column headers.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(name: &str, keywords: &[&str]) -> CategoryRule {
        CategoryRule {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// A header belongs to the category if it contains any of the keywords.
    /// A header may belong to several categories.
    pub fn matches(&self, header: &str) -> bool {
        contains_any(header, &self.keywords)
    }
}

/// The phrases that locate the column of a comment field.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CommentRule {
    pub field: CommentField,
    pub phrases: Vec<String>,
}

impl CommentRule {
    pub fn new(field: CommentField, phrases: &[&str]) -> CommentRule {
        CommentRule {
            field,
            phrases: phrases.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn matches(&self, header: &str) -> bool {
        contains_any(header, &self.phrases)
    }
}

/// Case-insensitive substring match against a list of keywords.
pub(crate) fn contains_any(header: &str, keywords: &[String]) -> bool {
    let h = header.to_lowercase();
    keywords.iter().any(|k| h.contains(&k.to_lowercase()))
}

/// The vocabulary of a survey template.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParserConfig {
    pub rating_scale: RatingScale,
    pub categories: Vec<CategoryRule>,
    pub comment_columns: Vec<CommentRule>,
    /// Columns that identify a respondent. The self-assessment leaves them empty.
    pub metadata_keywords: Vec<String>,
    /// Locates the column describing how a peer relates to the leader.
    pub relationship_keywords: Vec<String>,
    /// The text used for a comment field that has no content.
    pub no_comments_label: String,
}

impl ParserConfig {
    pub const NO_COMMENTS: &'static str = "No comments";

    pub fn default_categories() -> Vec<CategoryRule> {
        vec![
            CategoryRule::new("Self Awareness", &["self awareness"]),
            CategoryRule::new("Drive for Results", &["drive for results"]),
            CategoryRule::new("Leadership", &["leadership"]),
            CategoryRule::new("Communication", &["communication"]),
            CategoryRule::new("Teamwork", &["teamwork"]),
            CategoryRule::new(
                "Ownership and Accountability",
                &["ownership", "accountability"],
            ),
            CategoryRule::new(
                "Business Acumen, Innovation and Growth Mindset",
                &["business acumen", "innovation", "growth mindset"],
            ),
        ]
    }

    pub fn default_comment_columns() -> Vec<CommentRule> {
        vec![
            CommentRule::new(CommentField::Start, &["START doing"]),
            CommentRule::new(CommentField::Stop, &["STOP doing"]),
            CommentRule::new(CommentField::Continue, &["CONTINUE doing"]),
            CommentRule::new(
                CommentField::General,
                &["comments you would like to share"],
            ),
        ]
    }

    pub fn default_metadata_keywords() -> Vec<String> {
        [
            "name",
            "email",
            "timestamp",
            "relationship",
            "group",
            "division",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    /// Checks that the tables are usable. The rating scale is checked at construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names: HashSet<&str> = HashSet::new();
        for c in self.categories.iter() {
            if c.name.trim().is_empty() {
                return Err(ConfigError::EmptyCategoryName);
            }
            if !names.insert(c.name.as_str()) {
                return Err(ConfigError::DuplicateCategory(c.name.clone()));
            }
            if c.keywords.is_empty() || c.keywords.iter().any(|k| k.is_empty()) {
                return Err(ConfigError::MissingKeywords(c.name.clone()));
            }
        }
        let mut fields: HashSet<CommentField> = HashSet::new();
        for r in self.comment_columns.iter() {
            if !fields.insert(r.field) {
                return Err(ConfigError::DuplicateCommentField(r.field));
            }
            if r.phrases.is_empty() || r.phrases.iter().any(|p| p.is_empty()) {
                return Err(ConfigError::MissingKeywords(r.field.key().to_string()));
            }
        }
        // An empty keyword would match every header.
        if self
            .metadata_keywords
            .iter()
            .chain(self.relationship_keywords.iter())
            .any(|k| k.is_empty())
        {
            return Err(ConfigError::EmptyKeyword);
        }
        Ok(())
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            rating_scale: RatingScale::default(),
            categories: ParserConfig::default_categories(),
            comment_columns: ParserConfig::default_comment_columns(),
            metadata_keywords: ParserConfig::default_metadata_keywords(),
            relationship_keywords: vec!["relationship".to_string()],
            no_comments_label: ParserConfig::NO_COMMENTS.to_string(),
        }
    }
}

/// Errors in the vocabulary given to the parser.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ConfigError {
    EmptyRatingScale,
    InvalidRatingLevel { label: String, value: u8 },
    DuplicateRatingLabel(String),
    EmptyCategoryName,
    DuplicateCategory(String),
    DuplicateCommentField(CommentField),
    MissingKeywords(String),
    EmptyKeyword,
}

impl Error for ConfigError {}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptyRatingScale => write!(f, "the rating scale has no level"),
            ConfigError::InvalidRatingLevel { label, value } => {
                write!(f, "invalid rating level {:?} with value {}", label, value)
            }
            ConfigError::DuplicateRatingLabel(l) => {
                write!(f, "rating label {:?} is defined more than once", l)
            }
            ConfigError::EmptyCategoryName => write!(f, "a category has an empty name"),
            ConfigError::DuplicateCategory(c) => {
                write!(f, "category {:?} is defined more than once", c)
            }
            ConfigError::DuplicateCommentField(c) => {
                write!(f, "comment field {:?} is defined more than once", c.key())
            }
            ConfigError::MissingKeywords(n) => {
                write!(f, "{:?} needs at least one non-empty keyword", n)
            }
            ConfigError::EmptyKeyword => write!(f, "keywords may not be empty"),
        }
    }
}
