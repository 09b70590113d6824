//! Checks over the parsed records, reporting what a reader of the dashboard would miss.
//!
//! The checks never change the records. They only describe the gaps, for example
//! a leader who did not fill in a self-assessment.

use std::fmt::Display;

use log::debug;
use serde::Serialize;

use crate::config::*;

/// One gap found in the data of the survey.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// No leader could be extracted from the workbook.
    NoData,
    /// All the category averages of the peers are missing.
    NoAverageScores { leader: String, sheet: usize },
    NoSelfAssessment { leader: String, sheet: usize },
    NoQuestions { leader: String, sheet: usize },
    NoPeerResponses { leader: String, sheet: usize },
    MissingComments {
        leader: String,
        sheet: usize,
        field: CommentField,
    },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::NoData => write!(
                f,
                "No data found. Please upload a valid Excel file with survey sheets."
            ),
            Diagnostic::NoAverageScores { leader, sheet } => write!(
                f,
                "Leader \"{}\" (sheet #{}) has no average peer scores.",
                leader, sheet
            ),
            Diagnostic::NoSelfAssessment { leader, sheet } => write!(
                f,
                "Leader \"{}\" (sheet #{}) has no self-assessment data.",
                leader, sheet
            ),
            Diagnostic::NoQuestions { leader, sheet } => write!(
                f,
                "Leader \"{}\" (sheet #{}) has no question-level data.",
                leader, sheet
            ),
            Diagnostic::NoPeerResponses { leader, sheet } => write!(
                f,
                "Leader \"{}\" (sheet #{}) has no peer responses.",
                leader, sheet
            ),
            Diagnostic::MissingComments {
                leader,
                sheet,
                field,
            } => write!(
                f,
                "Leader \"{}\" (sheet #{}) is missing {} comments.",
                leader,
                sheet,
                field.key()
            ),
        }
    }
}

// The order in which missing comment fields are reported.
const REPORTED_COMMENTS: [CommentField; 4] = [
    CommentField::Stop,
    CommentField::Start,
    CommentField::Continue,
    CommentField::General,
];

/// Validates the records with the default "No comments" label.
pub fn validate(records: &[LeaderRecord]) -> Vec<Diagnostic> {
    validate_with_label(records, ParserConfig::NO_COMMENTS)
}

/// Validates the records. `no_comments_label` is the text that marks an empty comment field.
///
/// Sheets are numbered from 1, in the order of the records.
pub fn validate_with_label(records: &[LeaderRecord], no_comments_label: &str) -> Vec<Diagnostic> {
    if records.is_empty() {
        return vec![Diagnostic::NoData];
    }
    let mut res: Vec<Diagnostic> = Vec::new();
    for (idx, r) in records.iter().enumerate() {
        let leader = r.leader.clone();
        let sheet = idx + 1;
        if r.average_scores.values().all(|v| v.is_none()) {
            res.push(Diagnostic::NoAverageScores {
                leader: leader.clone(),
                sheet,
            });
        }
        if r.self_assessment.values().all(|v| v.is_none()) {
            res.push(Diagnostic::NoSelfAssessment {
                leader: leader.clone(),
                sheet,
            });
        }
        if r.questions.is_empty() {
            res.push(Diagnostic::NoQuestions {
                leader: leader.clone(),
                sheet,
            });
        }
        if r.peer_response_count == 0 {
            res.push(Diagnostic::NoPeerResponses {
                leader: leader.clone(),
                sheet,
            });
        }
        for field in REPORTED_COMMENTS {
            let text = r.comments.get(field);
            if text.is_empty() || text == no_comments_label {
                res.push(Diagnostic::MissingComments {
                    leader: leader.clone(),
                    sheet,
                    field,
                });
            }
        }
    }
    debug!("validate: {} diagnostics", res.len());
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SheetBuilder;
    use crate::SurveyParser;

    #[test]
    fn no_records() {
        let diags = validate(&[]);
        assert_eq!(diags, vec![Diagnostic::NoData]);
        assert_eq!(
            diags[0].to_string(),
            "No data found. Please upload a valid Excel file with survey sheets."
        );
    }

    #[test]
    fn complete_record_has_no_diagnostic() {
        let sheet = SheetBuilder::new("Alice")
            .headers(&[
                "Name",
                "Teamwork",
                "START doing",
                "STOP doing",
                "CONTINUE doing",
                "Other comments you would like to share",
            ])
            .text_row(&["Bob", "Excellent", "a", "b", "c", "d"])
            .text_row(&["", "Demonstrated", "", "", "", ""])
            .build();
        let record = SurveyParser::default().parse_sheet(&sheet).unwrap();
        assert!(validate(&[record]).is_empty());
    }

    #[test]
    fn gaps_are_reported() {
        // A single unrated row with no metadata: no peers, no self-assessment.
        let sheet = SheetBuilder::new("Alice")
            .headers(&["Teamwork", "STOP doing"])
            .text_row(&["n/a", "x"])
            .build();
        let mut record = SurveyParser::default().parse_sheet(&sheet).unwrap();
        assert_eq!(record.peer_response_count, 1);
        record.peer_response_count = 0;
        let msgs: Vec<String> = validate(&[record]).iter().map(|d| d.to_string()).collect();
        assert_eq!(
            msgs,
            vec![
                "Leader \"Alice\" (sheet #1) has no average peer scores.",
                "Leader \"Alice\" (sheet #1) has no self-assessment data.",
                "Leader \"Alice\" (sheet #1) has no question-level data.",
                "Leader \"Alice\" (sheet #1) has no peer responses.",
                "Leader \"Alice\" (sheet #1) is missing start comments.",
                "Leader \"Alice\" (sheet #1) is missing continue comments.",
                "Leader \"Alice\" (sheet #1) is missing general comments.",
            ]
        );
    }

    #[test]
    fn missing_comments_order() {
        let sheet = SheetBuilder::new("Lee")
            .headers(&["Name", "Teamwork"])
            .text_row(&["Bob", "Excellent"])
            .text_row(&["", "Excellent"])
            .build();
        let record = SurveyParser::default().parse_sheet(&sheet).unwrap();
        let fields: Vec<CommentField> = validate(&[record])
            .into_iter()
            .filter_map(|d| match d {
                Diagnostic::MissingComments { field, .. } => Some(field),
                _ => None,
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                CommentField::Stop,
                CommentField::Start,
                CommentField::Continue,
                CommentField::General
            ]
        );
    }
}
