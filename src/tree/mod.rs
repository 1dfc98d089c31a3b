//! Recursive expansion of "People Also Ask" questions into a depth-annotated tree.

pub mod format;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::serpapi::{RawQuestion, SearchClient, SerpApiError};

/// Upstream keys dropped from pass-through fields so they cannot shadow the node's own.
const RESERVED_KEYS: [&str; 3] = ["depth", "children", "error"];

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("depth must be at least 1, got {0}")]
    InvalidDepth(u32),

    #[error("seed search failed: {0}")]
    Upstream(#[from] SerpApiError),
}

/// A cleaned tree node. Continuation token and `serpapi_link` are never carried over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub question: String,
    /// Remaining upstream fields (snippet, title, link, ...), serialized inline.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub depth: u32,
    pub children: Vec<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub query: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    pub nodes: usize,
    pub max_depth: u32,
    pub failed: usize,
}

/// Outcome of trying to expand one question.
enum Expansion {
    Leaf,
    Expanded(Vec<Question>),
    Failed(String),
}

impl Question {
    fn from_raw(raw: RawQuestion, depth: u32, expansion: Expansion) -> Self {
        let RawQuestion {
            question,
            extra: mut fields,
            ..
        } = raw;
        fields.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));

        let (children, error) = match expansion {
            Expansion::Leaf => (Vec::new(), None),
            Expansion::Expanded(children) => (children, None),
            Expansion::Failed(message) => (Vec::new(), Some(message)),
        };

        Self {
            question,
            fields,
            depth,
            children,
            error,
        }
    }
}

impl SearchResult {
    pub fn stats(&self) -> TreeStats {
        fn walk(nodes: &[Question], stats: &mut TreeStats) {
            for node in nodes {
                stats.nodes += 1;
                stats.max_depth = stats.max_depth.max(node.depth);
                if node.error.is_some() {
                    stats.failed += 1;
                }
                walk(&node.children, stats);
            }
        }

        let mut stats = TreeStats::default();
        walk(&self.questions, &mut stats);
        stats
    }
}

/// Runs the seed search for `query` and expands follow-up questions down to `max_depth`.
///
/// Only a failure of the seed search is an error. Expansion failures further down are
/// recorded on the affected node and the rest of the tree is still built.
pub async fn build_tree(
    client: &impl SearchClient,
    query: &str,
    max_depth: u32,
    force_fresh: bool,
) -> Result<SearchResult, BuildError> {
    if query.trim().is_empty() {
        return Err(BuildError::EmptyQuery);
    }
    if max_depth < 1 {
        return Err(BuildError::InvalidDepth(max_depth));
    }

    info!(query, max_depth, force_fresh, "building question tree");

    let roots = client.search(query, force_fresh).await?.into_questions();
    if roots.is_empty() {
        info!(query, "no related questions returned");
        return Ok(SearchResult {
            query: query.to_string(),
            questions: Vec::new(),
        });
    }

    let questions = expand(client, roots, max_depth, 1, force_fresh).await;
    Ok(SearchResult {
        query: query.to_string(),
        questions,
    })
}

/// Expands `questions` found at `depth`, one upstream call at a time in source order.
async fn expand<C: SearchClient>(
    client: &C,
    questions: Vec<RawQuestion>,
    max_depth: u32,
    depth: u32,
    force_fresh: bool,
) -> Vec<Question> {
    if depth >= max_depth {
        return questions
            .into_iter()
            .map(|raw| Question::from_raw(raw, depth, Expansion::Leaf))
            .collect();
    }

    let mut nodes = Vec::with_capacity(questions.len());
    for raw in questions {
        let expansion = match raw.token() {
            None => Expansion::Leaf,
            Some(token) => match client.fetch_more(token, force_fresh).await {
                Ok(result) => {
                    let next = result.into_questions();
                    debug!(question = %raw.question, depth, found = next.len(), "expanded");
                    if next.is_empty() {
                        Expansion::Leaf
                    } else {
                        Expansion::Expanded(
                            Box::pin(expand(client, next, max_depth, depth + 1, force_fresh))
                                .await,
                        )
                    }
                }
                Err(e) => {
                    warn!(question = %raw.question, depth, error = %e, "expansion failed (continuing)");
                    Expansion::Failed(e.to_string())
                }
            },
        };
        nodes.push(Question::from_raw(raw, depth, expansion));
    }
    nodes
}
