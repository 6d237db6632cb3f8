//! Query bodies for the search engine.

use askbox_core::types::DbId;
use serde_json::{json, Value};

/// Upper bound on hits returned by one search.
pub const MAX_HITS: usize = 50;

/// Trim the keyword. Inner characters are kept as typed, so a title stays
/// findable by any substring of its own text.
///
/// Returns `None` when nothing searchable remains.
pub fn normalize_keyword(keyword: &str) -> Option<String> {
    let trimmed = keyword.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Escape the characters a `wildcard` value treats as operators.
pub fn escape_wildcard(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '*' | '?' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build the `_search` body for a normalized keyword.
///
/// A fuzzy `match` ranks whole-word hits, and a case-insensitive `wildcard`
/// on `*keyword*` catches title substrings.
pub fn build_title_query(keyword: &str) -> Value {
    json!({
        "size": MAX_HITS,
        "query": {
            "bool": {
                "should": [
                    {
                        "match": {
                            "title": {
                                "query": keyword,
                                "fuzziness": "AUTO",
                                "boost": 2.0
                            }
                        }
                    },
                    {
                        "wildcard": {
                            "title.keyword": {
                                "value": format!("*{}*", escape_wildcard(keyword)),
                                "case_insensitive": true
                            }
                        }
                    }
                ],
                "minimum_should_match": 1
            }
        }
    })
}

/// Index settings used when the index is created on first use.
pub fn index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": { "type": "long" },
                "title": {
                    "type": "text",
                    "fields": { "keyword": { "type": "keyword", "ignore_above": 256 } }
                }
            }
        }
    })
}

/// One page of the document id listing, ascending by id. `after` is the last
/// id of the previous page.
pub fn id_page_query(size: usize, after: Option<DbId>) -> Value {
    let mut body = json!({
        "size": size,
        "_source": false,
        "sort": [{ "id": "asc" }],
        "query": { "match_all": {} }
    });
    if let Some(after) = after {
        body["search_after"] = json!([after]);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_but_keeps_inner_text() {
        assert_eq!(normalize_keyword("  Vec  vs ").as_deref(), Some("Vec  vs"));
        assert_eq!(normalize_keyword("2*3?").as_deref(), Some("2*3?"));
    }

    #[test]
    fn normalize_empty_returns_none() {
        assert_eq!(normalize_keyword("   "), None);
        assert_eq!(normalize_keyword(""), None);
    }

    #[test]
    fn escape_wildcard_quotes_operators() {
        assert_eq!(escape_wildcard("2*3"), r"2\*3");
        assert_eq!(escape_wildcard(r"why? a\b"), r"why\? a\\b");
        assert_eq!(escape_wildcard("plain"), "plain");
    }

    #[test]
    fn title_query_matches_literal_wildcard_characters() {
        let body = build_title_query("2*3");
        let should = body["query"]["bool"]["should"].as_array().unwrap();
        assert_eq!(should[0]["match"]["title"]["query"], "2*3");
        assert_eq!(should[1]["wildcard"]["title.keyword"]["value"], r"*2\*3*");
    }

    #[test]
    fn id_pages_continue_after_last_id() {
        let first = id_page_query(500, None);
        assert_eq!(first["sort"][0]["id"], "asc");
        assert!(first.get("search_after").is_none());

        let next = id_page_query(500, Some(1234));
        assert_eq!(next["search_after"], serde_json::json!([1234]));
        assert_eq!(next["size"], 500);
    }

    #[test]
    fn title_query_contains_match_and_wildcard() {
        let body = build_title_query("borrow");
        let should = body["query"]["bool"]["should"].as_array().unwrap();
        assert_eq!(should.len(), 2);
        assert_eq!(should[0]["match"]["title"]["query"], "borrow");
        assert_eq!(should[1]["wildcard"]["title.keyword"]["value"], "*borrow*");
        assert_eq!(body["size"], MAX_HITS);
    }
}
