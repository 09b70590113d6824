/*!
Parser for 360-degree leadership feedback surveys.

A survey workbook holds one sheet per leader. Each sheet holds the answers of the
peers of this leader (one row per peer) and, usually as the last row, the answer
of the leader about themselves. This crate turns every sheet into a
[LeaderRecord]: average rating per leadership category, per-question statistics,
the self-assessment and the free-text comments.

The parser works on an already decoded [Workbook] and has no I/O. It never fails:
missing data turns into `None` values or into the "No comments" label.

```
use survey_parser::builder::{SheetBuilder, WorkbookBuilder};

let workbook = WorkbookBuilder::new()
    .sheet(
        SheetBuilder::new("Alice")
            .headers(&["Name", "[Listens actively] Communication skills"])
            .text_row(&["Bob", "Demonstrated"])
            .text_row(&["Carol", "Excellent"])
            .text_row(&["", "Highly demonstrated"]),
    )
    .build();

let records = survey_parser::parse_workbook(&workbook);
assert_eq!(records[0].peer_response_count, 2);
assert_eq!(records[0].questions[0].short_question, "Listens actively");
assert_eq!(records[0].questions[0].peer_average, Some(4.0));
assert_eq!(records[0].questions[0].self_rating, Some(4));
```

See the [manual] for the details of the format.
*/

mod config;
pub mod builder;
pub mod insights;
pub mod manual;
pub mod validation;

use indexmap::IndexMap;
use log::{debug, info, warn};

pub use crate::config::*;

/// Parses all the sheets of a workbook with the default survey vocabulary.
pub fn parse_workbook(workbook: &Workbook) -> Vec<LeaderRecord> {
    SurveyParser::default().parse_workbook(workbook)
}

/// Extracts leader records, given the vocabulary of a survey template.
#[derive(Debug, Clone, Default)]
pub struct SurveyParser {
    config: ParserConfig,
}

// The columns of a sheet that play a role, found once per sheet.
#[derive(Debug)]
struct ColumnLayout {
    metadata: Vec<usize>,
    categories: Vec<(String, Vec<usize>)>,
    comments: Vec<(CommentField, Option<usize>)>,
    relationship: Option<usize>,
}

impl ColumnLayout {
    fn new(headers: &[String], config: &ParserConfig) -> ColumnLayout {
        let metadata: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| contains_any(h, &config.metadata_keywords))
            .map(|(idx, _)| idx)
            .collect();
        let categories = config
            .categories
            .iter()
            .map(|cat| {
                let cols: Vec<usize> = headers
                    .iter()
                    .enumerate()
                    .filter(|(_, h)| cat.matches(h))
                    .map(|(idx, _)| idx)
                    .collect();
                (cat.name.clone(), cols)
            })
            .collect();
        let comments = config
            .comment_columns
            .iter()
            .map(|rule| (rule.field, headers.iter().position(|h| rule.matches(h))))
            .collect();
        let relationship = headers
            .iter()
            .position(|h| contains_any(h, &config.relationship_keywords));
        ColumnLayout {
            metadata,
            categories,
            comments,
            relationship,
        }
    }
}

impl SurveyParser {
    pub fn new(config: ParserConfig) -> Result<SurveyParser, ConfigError> {
        config.validate()?;
        Ok(SurveyParser { config })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses every sheet, in order. Empty sheets are skipped.
    pub fn parse_workbook(&self, workbook: &Workbook) -> Vec<LeaderRecord> {
        info!(
            "parse_workbook: processing {} sheets",
            workbook.sheets.len()
        );
        let res: Vec<LeaderRecord> = workbook
            .sheets
            .iter()
            .filter_map(|sheet| self.parse_sheet(sheet))
            .collect();
        info!("parse_workbook: {} leader records", res.len());
        res
    }

    /// Builds the record of one leader. Returns None if the sheet has no row.
    pub fn parse_sheet(&self, sheet: &Sheet) -> Option<LeaderRecord> {
        if sheet.is_empty() {
            warn!("parse_sheet: sheet {:?} is empty, skipping", sheet.name);
            return None;
        }
        let scale = &self.config.rating_scale;
        let layout = ColumnLayout::new(&sheet.headers, &self.config);
        debug!("parse_sheet: sheet {:?} layout: {:?}", sheet.name, layout);

        let (peers, self_row): (&[Row], Option<&Row>) =
            match find_self_assessment_row(&sheet.rows, &layout.metadata, scale) {
                Some(idx) => {
                    debug!(
                        "parse_sheet: sheet {:?}: self-assessment at row {}",
                        sheet.name, idx
                    );
                    (&sheet.rows[..idx], Some(&sheet.rows[idx]))
                }
                None => {
                    warn!(
                        "parse_sheet: sheet {:?}: no self-assessment row found, all rows are peer responses",
                        sheet.name
                    );
                    (&sheet.rows[..], None)
                }
            };

        let average_scores = category_scores(peers, &layout, scale);
        let self_assessment = match self_row {
            Some(row) => category_scores(std::slice::from_ref(row), &layout, scale),
            None => layout
                .categories
                .iter()
                .map(|(name, _)| (name.clone(), None))
                .collect(),
        };
        let questions = extract_questions(&sheet.headers, peers, self_row, scale);
        let comments = self.extract_comments(peers, &layout);
        let relationship_breakdown = count_relationships(peers, layout.relationship);

        info!(
            "parse_sheet: leader {:?}: {} peer responses, {} questions",
            sheet.name,
            peers.len(),
            questions.len()
        );
        Some(LeaderRecord {
            leader: sheet.name.clone(),
            peer_response_count: peers.len(),
            average_scores,
            self_assessment,
            questions,
            comments,
            relationship_breakdown,
        })
    }

    fn extract_comments(&self, peers: &[Row], layout: &ColumnLayout) -> Comments {
        let mut comments = Comments::filled_with(&self.config.no_comments_label);
        for (field, col_o) in layout.comments.iter() {
            if let Some(col) = col_o {
                let texts: Vec<String> = peers
                    .iter()
                    .filter_map(|row| cell(row, *col).as_trimmed_text())
                    .collect();
                if !texts.is_empty() {
                    comments.set(*field, texts.join("\n"));
                }
            } else {
                debug!("extract_comments: no column for {:?}", field.key());
            }
        }
        comments
    }
}

/// Tells if a row looks like the answer of the leader about themselves: it contains
/// at least one rating, and nothing in the columns that identify a respondent.
pub fn is_self_assessment_row(
    row: &[CellValue],
    metadata_columns: &[usize],
    scale: &RatingScale,
) -> bool {
    let has_rating = row.iter().any(|c| scale.rate(c).is_some());
    has_rating && metadata_columns.iter().all(|col| cell(row, *col).is_blank())
}

/// The position of the self-assessment row: the last row that satisfies
/// [is_self_assessment_row]. The rows before it are the peer responses.
pub fn find_self_assessment_row(
    rows: &[Row],
    metadata_columns: &[usize],
    scale: &RatingScale,
) -> Option<usize> {
    rows.iter()
        .rposition(|row| is_self_assessment_row(row, metadata_columns, scale))
}

fn category_scores(rows: &[Row], layout: &ColumnLayout, scale: &RatingScale) -> CategoryScores {
    let mut res: CategoryScores = IndexMap::new();
    for (name, cols) in layout.categories.iter() {
        let ratings: Vec<u8> = rows
            .iter()
            .flat_map(|row| cols.iter().filter_map(|col| scale.rate(cell(row, *col))))
            .collect();
        res.insert(name.clone(), mean_rating(&ratings));
    }
    res
}

fn extract_questions(
    headers: &[String],
    peers: &[Row],
    self_row: Option<&Row>,
    scale: &RatingScale,
) -> Vec<QuestionRecord> {
    let mut res: Vec<QuestionRecord> = Vec::new();
    for (col, header) in headers.iter().enumerate() {
        let peer_ratings: Vec<u8> = peers
            .iter()
            .filter_map(|row| scale.rate(cell(row, col)))
            .collect();
        if peer_ratings.is_empty() {
            continue;
        }
        res.push(QuestionRecord {
            full_question: header.clone(),
            short_question: short_label(header),
            peer_average: mean_rating(&peer_ratings),
            peer_ratings,
            self_rating: self_row.and_then(|row| scale.rate(cell(row, col))),
        });
    }
    res
}

fn count_relationships(peers: &[Row], col_o: Option<usize>) -> Vec<RelationshipCount> {
    let col = match col_o {
        Some(col) => col,
        None => return Vec::new(),
    };
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for row in peers.iter() {
        if let Some(rel) = cell(row, col).as_trimmed_text() {
            *counts.entry(rel).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|(relationship, count)| RelationshipCount {
            relationship,
            count,
        })
        .collect()
}

/// The text between the first pair of brackets of a question, or the full question
/// if it has no brackets. The brackets must be on the same line.
pub fn short_label(question: &str) -> String {
    let mut rest = question;
    while let Some(start) = rest.find('[') {
        let after = &rest[start + 1..];
        match after.find(|c: char| c == ']' || c == '\n') {
            Some(end) if after[end..].starts_with(']') => {
                return after[..end].to_string();
            }
            Some(_) => rest = after,
            None => break,
        }
    }
    question.to_string()
}

/// Mean of the ratings, rounded to 2 decimals.
pub fn mean_rating(ratings: &[u8]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let total: u32 = ratings.iter().map(|r| *r as u32).sum();
    Some(round_2dp(total as f64 / ratings.len() as f64))
}

/// Rounds to 2 decimals from the exact binary value of `x`. Ties go to the larger
/// magnitude. `1.075` is stored below its decimal spelling and gives `1.07`, while
/// `1.125` is exact and gives `1.13`.
pub(crate) fn round_2dp(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let bits = x.to_bits();
    let negative = bits >> 63 == 1;
    let exp_bits = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    // x = mantissa * 2^exponent
    let (mantissa, exponent) = if exp_bits == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), exp_bits - 1075)
    };
    if exponent >= 0 {
        // Already an integer.
        return x;
    }
    let scaled = mantissa as u128 * 100;
    let shift = (-exponent) as u32;
    let hundredths: u128 = if shift > 64 {
        // scaled < 2^60, less than half a unit.
        0
    } else {
        let quotient = scaled >> shift;
        let remainder = scaled - (quotient << shift);
        if remainder >= (1u128 << (shift - 1)) {
            quotient + 1
        } else {
            quotient
        }
    };
    let res = hundredths as f64 / 100.0;
    if negative {
        -res
    } else {
        res
    }
}
