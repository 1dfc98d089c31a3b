use serde::Deserialize;
use serde_json::{Map, Value};

/// Body shared by the `google` and `google_related_questions` engines.
/// Everything except the related questions and a possible error is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RawResult {
    pub related_questions: Option<Vec<RawQuestion>>,
    pub error: Option<String>,
}

impl RawResult {
    /// Related questions in upstream order; empty when the field is absent.
    pub fn into_questions(self) -> Vec<RawQuestion> {
        self.related_questions.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuestion {
    pub question: String,
    pub next_page_token: Option<String>,
    pub serpapi_link: Option<String>,
    /// Snippet, title, link, source, etc. Whatever SerpApi sends is kept.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawQuestion {
    /// The continuation token, if present and non-blank.
    pub fn token(&self) -> Option<&str> {
        self.next_page_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_unknown_fields_and_splits_known_ones() {
        let raw: RawQuestion = serde_json::from_value(serde_json::json!({
            "question": "What is rust?",
            "snippet": "A language.",
            "next_page_token": "tok",
            "serpapi_link": "https://serpapi.com/search.json?engine=google_related_questions",
        }))
        .unwrap();

        assert_eq!(raw.question, "What is rust?");
        assert_eq!(raw.token(), Some("tok"));
        assert!(raw.serpapi_link.is_some());
        assert_eq!(raw.extra.len(), 1);
        assert_eq!(raw.extra["snippet"], "A language.");
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let raw = RawQuestion {
            question: "q".into(),
            next_page_token: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(raw.token(), None);
    }

    #[test]
    fn missing_related_questions_is_empty() {
        let result: RawResult =
            serde_json::from_str(r#"{"search_metadata": {"status": "Success"}}"#).unwrap();
        assert!(result.error.is_none());
        assert!(result.into_questions().is_empty());
    }
}
