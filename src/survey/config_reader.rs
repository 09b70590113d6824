use snafu::prelude::*;

use crate::survey::*;

use serde::{Deserialize, Serialize};

/// The vocabulary file given with `--config`. Every entry is optional: a missing
/// entry keeps the default vocabulary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SurveyConfig {
    pub rating_scale: Option<Vec<RatingLevelConfig>>,
    pub categories: Option<Vec<CategoryConfig>>,
    pub comment_columns: Option<CommentColumnsConfig>,
    pub metadata_keywords: Option<Vec<String>>,
    pub relationship_keywords: Option<Vec<String>>,
    pub no_comments_label: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RatingLevelConfig {
    pub label: String,
    pub value: u8,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    pub keywords: Vec<String>,
}

/// The phrases locating each comment column. A missing field keeps its default phrases.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct CommentColumnsConfig {
    pub start: Option<Vec<String>>,
    pub stop: Option<Vec<String>>,
    #[serde(rename = "continue")]
    pub r#continue: Option<Vec<String>>,
    pub general: Option<Vec<String>>,
}

impl CommentColumnsConfig {
    fn phrases(&self, field: CommentField) -> Option<&Vec<String>> {
        match field {
            CommentField::Start => self.start.as_ref(),
            CommentField::Stop => self.stop.as_ref(),
            CommentField::Continue => self.r#continue.as_ref(),
            CommentField::General => self.general.as_ref(),
        }
    }
}

fn as_strs(v: &[String]) -> Vec<&str> {
    v.iter().map(|s| s.as_str()).collect()
}

impl SurveyConfig {
    /// Merges the file with the default vocabulary. The result is not validated yet.
    pub fn to_parser_config(&self) -> SurveyResult<ParserConfig> {
        let mut config = ParserConfig::default();
        if let Some(levels) = &self.rating_scale {
            let pairs: Vec<(&str, u8)> = levels.iter().map(|l| (l.label.as_str(), l.value)).collect();
            config.rating_scale = RatingScale::new(&pairs).context(InvalidVocabularySnafu {})?;
        }
        if let Some(cats) = &self.categories {
            config.categories = cats
                .iter()
                .map(|c| CategoryRule::new(&c.name, &as_strs(&c.keywords)))
                .collect();
        }
        if let Some(cols) = &self.comment_columns {
            for rule in config.comment_columns.iter_mut() {
                if let Some(phrases) = cols.phrases(rule.field) {
                    *rule = CommentRule::new(rule.field, &as_strs(phrases));
                }
            }
        }
        if let Some(kws) = &self.metadata_keywords {
            config.metadata_keywords = kws.clone();
        }
        if let Some(kws) = &self.relationship_keywords {
            config.relationship_keywords = kws.clone();
        }
        if let Some(label) = &self.no_comments_label {
            config.no_comments_label = label.clone();
        }
        debug!("to_parser_config: {:?}", config);
        Ok(config)
    }
}

pub fn parse_config(contents: &str, path: &str) -> SurveyResult<ParserConfig> {
    let sc: SurveyConfig = serde_json::from_str(contents).context(ParsingJsonSnafu { path })?;
    sc.to_parser_config()
}

pub fn read_config(path: &str) -> SurveyResult<ParserConfig> {
    info!("Reading vocabulary {:?}", path);
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    parse_config(&contents, path)
}

pub fn read_reference(path: &str) -> SurveyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_the_default() {
        assert_eq!(parse_config("{}", "x").unwrap(), ParserConfig::default());
    }

    #[test]
    fn partial_config() {
        let js = r#"{
            "ratingScale": [{"label": "Low", "value": 1}, {"label": "High", "value": 2}],
            "categories": [{"name": "Focus", "keywords": ["focus", "priorities"]}],
            "commentColumns": {"continue": ["keep doing"]},
            "noCommentsLabel": "-"
        }"#;
        let config = parse_config(js, "x").unwrap();
        assert_eq!(config.rating_scale.rate_text("high"), Some(2));
        assert_eq!(config.rating_scale.rate_text("Excellent"), None);
        assert_eq!(config.category_names(), vec!["Focus".to_string()]);
        assert_eq!(config.no_comments_label, "-");
        assert_eq!(
            config.metadata_keywords,
            ParserConfig::default_metadata_keywords()
        );
        let cont = config
            .comment_columns
            .iter()
            .find(|r| r.field == CommentField::Continue)
            .unwrap();
        assert!(cont.matches("What should they KEEP DOING?"));
        let stop = config
            .comment_columns
            .iter()
            .find(|r| r.field == CommentField::Stop)
            .unwrap();
        assert!(stop.matches("What should they STOP doing?"));
    }

    #[test]
    fn bad_configs() {
        assert!(matches!(
            parse_config(r#"{"colors": []}"#, "x"),
            Err(SurveyError::ParsingJson { .. })
        ));
        assert!(matches!(
            parse_config(r#"{"ratingScale": []}"#, "x"),
            Err(SurveyError::InvalidVocabulary { .. })
        ));
        assert!(matches!(
            read_config("/no/such/config.json"),
            Err(SurveyError::OpeningJson { .. })
        ));
    }
}
