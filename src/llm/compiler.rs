//! Natural language to GraphQL query compiler.
//!
//! The model receives the endpoint's SDL as grounding context plus a set of
//! domain rules, and must answer with query text only. Output passes through
//! a sanitizer (fence and preamble stripping) and a structural validator;
//! invalid output triggers a bounded re-request with the rejection reason
//! folded into the next attempt.

use crate::llm::chat::ChatProvider;
use crate::types::{Error, Result};
use regex::Regex;
use std::sync::Arc;
use std::sync::OnceLock;
use tracing::{debug, warn};

const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Domain conventions the model must follow regardless of prompt wording.
const DOMAIN_RULES: &str = r#"Rules:
- The root fields you may query are `movies` and `people`.
- When the same field is selected more than once with different arguments, you MUST alias every occurrence. Example: `directedAggregate1: directedAggregate(where: { released_GT: 2000 }) { count }` alongside `directedAggregate2: directedAggregate(where: { released_LT: 2000 }) { count }`.
- Gender values are lowercase strings: "male" and "female".
- Interpret "family-friendly" as the filter `genres_INCLUDES: "Family"`.
- Respond with the GraphQL query text only. No markdown, no commentary."#;

/// Compiles natural-language prompts into schema-grounded GraphQL queries.
pub struct QueryCompiler {
    chat: Arc<dyn ChatProvider>,
    max_attempts: usize,
}

impl QueryCompiler {
    /// Create a compiler over the given chat provider.
    pub fn new(chat: Arc<dyn ChatProvider>) -> Self {
        Self {
            chat,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the re-request bound (minimum 1).
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Compile a prompt into a GraphQL query grounded in the given SDL.
    ///
    /// Each attempt is sanitized and structurally validated; a rejected
    /// attempt's reason is appended to the next request. After the attempt
    /// bound is exhausted the last rejection surfaces as an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::ModelContract` when no attempt produces valid query
    /// text, or the provider's own error on transport failure.
    pub async fn compile(&self, prompt: &str, sdl: &str) -> Result<String> {
        let system = build_system_instruction(sdl);
        let mut last_reason = String::new();

        for attempt in 1..=self.max_attempts {
            let user = if attempt == 1 {
                prompt.to_string()
            } else {
                format!(
                    "{}\n\nThe previous response was rejected: {}. Respond with the GraphQL query text only, starting with '{{'.",
                    prompt, last_reason
                )
            };

            let raw = self.chat.complete(&system, &user).await?;
            let query = sanitize(&raw);

            match validate(&query) {
                Ok(()) => {
                    debug!(attempt, "compiled prompt to query");
                    return Ok(query);
                }
                Err(reason) => {
                    warn!(attempt, %reason, "rejected compiled query");
                    last_reason = reason;
                }
            }
        }

        Err(Error::ModelContract(format!(
            "no valid query after {} attempts: {}",
            self.max_attempts, last_reason
        )))
    }
}

fn build_system_instruction(sdl: &str) -> String {
    format!(
        "You translate natural language into GraphQL queries for the schema below.\n\n{}\n\nSchema:\n{}",
        DOMAIN_RULES, sdl
    )
}

/// Strip markdown fences, stray backticks, and any preamble before the first
/// `{` from raw model output.
pub fn sanitize(raw: &str) -> String {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?i)```[a-z]*\r?\n?").expect("static fence pattern")
    });

    let text = fence.replace_all(raw, "");
    let text = text.replace("```", "").replace('`', "");
    let text = text.trim();

    match text.find('{') {
        Some(idx) if idx > 0 => text[idx..].trim().to_string(),
        _ => text.to_string(),
    }
}

/// Structurally validate sanitized query text.
///
/// Checks the leading token, delimiter balance (string-literal aware), and
/// that no field at the top selection level repeats with arguments but
/// without an alias. Returns the rejection reason on failure.
pub fn validate(query: &str) -> std::result::Result<(), String> {
    if query.is_empty() {
        return Err("empty query text".to_string());
    }

    let starts_ok = query.starts_with('{')
        || query.starts_with("query")
        || query.starts_with("mutation");
    if !starts_ok {
        return Err("query must start with '{', 'query', or 'mutation'".to_string());
    }

    check_balance(query)?;
    check_duplicate_fields(query)?;
    Ok(())
}

fn check_balance(query: &str) -> std::result::Result<(), String> {
    let mut braces = 0i32;
    let mut parens = 0i32;
    let mut brackets = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for c in query.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => braces += 1,
            '}' => braces -= 1,
            '(' => parens += 1,
            ')' => parens -= 1,
            '[' => brackets += 1,
            ']' => brackets -= 1,
            _ => {}
        }

        if braces < 0 || parens < 0 || brackets < 0 {
            return Err("unbalanced delimiters".to_string());
        }
    }

    if in_string {
        return Err("unterminated string literal".to_string());
    }
    if braces != 0 || parens != 0 || brackets != 0 {
        return Err("unbalanced delimiters".to_string());
    }
    Ok(())
}

/// Reject queries that select the same parameterized field twice at the top
/// selection level without aliases. The server would reject the merge; the
/// alias mandate in the domain rules exists for exactly this case.
fn check_duplicate_fields(query: &str) -> std::result::Result<(), String> {
    let mut braces = 0i32;
    let mut parens = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut word = String::new();
    let mut seen: Vec<String> = Vec::new();
    let mut pending: Option<String> = None;
    let mut alias_next = false;

    for c in query.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c.is_alphanumeric() || c == '_' {
            word.push(c);
            continue;
        }

        // A ':' at the top selection level marks an alias; the word that
        // follows it is the aliased field and is exempt from the check.
        let finished = std::mem::take(&mut word);
        if braces == 1 && parens == 0 {
            if c == ':' {
                alias_next = true;
                pending = None;
            } else if !finished.is_empty() {
                if alias_next {
                    alias_next = false;
                } else {
                    pending = Some(finished);
                }
            }
        }

        match c {
            '"' => in_string = true,
            '{' => braces += 1,
            '}' => braces -= 1,
            '(' => {
                if parens == 0 && braces == 1 {
                    if let Some(name) = pending.take() {
                        if seen.contains(&name) {
                            return Err(format!(
                                "field '{}' selected more than once without an alias",
                                name
                            ));
                        }
                        seen.push(name);
                    }
                }
                parens += 1;
            }
            ')' => parens -= 1,
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_fenced_block() {
        let raw = "```graphql\n{ movies { title } }\n```";
        assert_eq!(sanitize(raw), "{ movies { title } }");
    }

    #[test]
    fn test_sanitize_strips_plain_fence() {
        let raw = "```\n{ x }\n```";
        assert_eq!(sanitize(raw), "{ x }");
    }

    #[test]
    fn test_sanitize_drops_preamble() {
        let raw = "Sure, here is the query:\n{ people { name } }";
        assert_eq!(sanitize(raw), "{ people { name } }");
    }

    #[test]
    fn test_sanitize_handles_inline_backticks() {
        let raw = "`{ people { name } }`";
        assert_eq!(sanitize(raw), "{ people { name } }");
    }

    #[test]
    fn test_sanitize_leaves_clean_query_untouched() {
        let raw = "{ movies { title } }";
        assert_eq!(sanitize(raw), raw);
    }

    #[test]
    fn test_validate_accepts_query_keyword() {
        assert!(validate("query Q { movies { title } }").is_ok());
    }

    #[test]
    fn test_validate_rejects_prose() {
        assert!(validate("Sure, here is the query").is_err());
        assert!(validate("").is_err());
    }

    #[test]
    fn test_validate_rejects_unbalanced() {
        assert!(validate("{ movies { title }").is_err());
        assert!(validate("{ movies(where: { released_GT: 2000 } { title } }").is_err());
    }

    #[test]
    fn test_validate_ignores_braces_in_strings() {
        assert!(validate(r#"{ movies(where: { title_CONTAINS: "a { b" }) { title } }"#).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_parameterized_fields() {
        let query = r#"{ movies(where: { released_GT: 2000 }) { title } movies(where: { released_LT: 2000 }) { title } }"#;
        let reason = validate(query).unwrap_err();
        assert!(reason.contains("movies"));
    }

    #[test]
    fn test_validate_accepts_aliased_duplicates() {
        let query = r#"{ recent: movies(where: { released_GT: 2000 }) { title } old: movies(where: { released_LT: 2000 }) { title } }"#;
        assert!(validate(query).is_ok());
    }

    #[test]
    fn test_validate_accepts_nested_repeats() {
        // Repetition below the top selection level is fine.
        let query = "{ people { movies { title } } movies { title } }";
        assert!(validate(query).is_ok());
    }
}
