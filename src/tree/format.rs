use super::{Question, SearchResult};

/// Every node paired with its provenance path (`"2.1.3"`), in depth-first pre-order.
pub fn label_paths(result: &SearchResult) -> Vec<(String, &Question)> {
    fn walk<'a>(nodes: &'a [Question], prefix: &str, out: &mut Vec<(String, &'a Question)>) {
        for (i, node) in nodes.iter().enumerate() {
            let label = if prefix.is_empty() {
                (i + 1).to_string()
            } else {
                format!("{prefix}.{}", i + 1)
            };
            out.push((label.clone(), node));
            walk(&node.children, &label, out);
        }
    }

    let mut out = Vec::new();
    walk(&result.questions, "", &mut out);
    out
}

/// Markdown outline of the tree, one indented line per question.
pub fn format_outline(result: &SearchResult) -> String {
    let mut output = format!("# People also ask: {}\n\n", single_line(&result.query));

    if result.questions.is_empty() {
        output.push_str("(no related questions)\n");
        return output;
    }

    for (label, node) in label_paths(result) {
        let indent = "  ".repeat(node.depth.saturating_sub(1) as usize);
        output.push_str(&format!("{indent}- {label} {}", single_line(&node.question)));
        if let Some(error) = &node.error {
            output.push_str(&format!(" (expansion failed: {})", single_line(error)));
        }
        output.push('\n');
    }

    output
}

fn single_line(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn node(text: &str, depth: u32, children: Vec<Question>) -> Question {
        Question {
            question: text.to_string(),
            fields: Map::new(),
            depth,
            children,
            error: None,
        }
    }

    fn sample() -> SearchResult {
        SearchResult {
            query: "rust".into(),
            questions: vec![
                node("A", 1, vec![]),
                node(
                    "B",
                    1,
                    vec![
                        node("B1", 2, vec![]),
                        node("B2", 2, vec![node("B2a", 3, vec![])]),
                    ],
                ),
            ],
        }
    }

    #[test]
    fn labels_follow_sibling_positions() {
        let result = sample();
        let labels: Vec<_> = label_paths(&result)
            .into_iter()
            .map(|(label, node)| format!("{label}={}", node.question))
            .collect();
        assert_eq!(labels, vec!["1=A", "2=B", "2.1=B1", "2.2=B2", "2.2.1=B2a"]);
    }

    #[test]
    fn outline_indents_by_depth_and_notes_failures() {
        let mut result = sample();
        result.questions[0].error = Some("SerpApi error (500): boom".into());
        result.questions[1].children[0].question = "multi\nline?".into();

        let text = format_outline(&result);
        assert!(text.starts_with("# People also ask: rust\n\n"));
        assert!(text.contains("- 1 A (expansion failed: SerpApi error (500): boom)\n"));
        assert!(text.contains("\n  - 2.1 multi line?\n"));
        assert!(text.contains("\n    - 2.2.1 B2a\n"));
    }

    #[test]
    fn outline_of_empty_tree() {
        let result = SearchResult {
            query: "nothing".into(),
            questions: vec![],
        };
        assert!(format_outline(&result).contains("(no related questions)"));
    }
}
