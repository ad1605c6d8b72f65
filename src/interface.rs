//! Explicit state for a query editor.
//!
//! A UI owns one [`Session`] and feeds it every keystroke; the session keeps
//! the current text, the suggestions and validation error derived from it, and
//! the outcomes of queries handed to the remote executor. All derivation goes
//! through the pure [`parse_query`] and [`autocomplete`] functions, so the
//! session holds no state that could drift from its input.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::autocomplete::{Suggestion, autocomplete};
use crate::error::Result;
use crate::parser::{ParseOptions, ParsedQuery, QueryError, parse_query};

/// What came back for one submitted query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct Session {
    input: String,
    suggestions: Vec<Suggestion>,
    error: Option<QueryError>,
    results: Vec<QueryOutcome>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn input(&self) -> &str {
        &self.input
    }
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }
    /// The validation error for the current input, if it is at a boundary.
    pub fn error(&self) -> Option<&QueryError> {
        self.error.as_ref()
    }
    pub fn results(&self) -> &[QueryOutcome] {
        &self.results
    }

    /// Replaces the input and recomputes everything derived from it.
    pub fn update(&mut self, input: impl Into<String>) -> Result<&[Suggestion]> {
        self.input = input.into();
        self.suggestions.clear();
        self.error = parse_query(&self.input, ParseOptions::validating()).err();
        self.suggestions = autocomplete(&self.input)?;
        debug!(input = %self.input, suggestions = self.suggestions.len(), "session updated");
        Ok(&self.suggestions)
    }

    /// Replaces the word being typed with `token` and moves past it.
    pub fn accept(&mut self, token: &str) -> Result<&[Suggestion]> {
        let keep = self.input.rfind(' ').map_or(0, |i| i + 1);
        let mut input = self.input[..keep].to_string();
        input.push_str(token);
        input.push(' ');
        self.update(input)
    }

    /// Validates the current input and returns the query to send for
    /// execution. Incomplete queries are refused.
    pub fn submit(&self) -> std::result::Result<String, QueryError> {
        let parsed: ParsedQuery = parse_query(&self.input, ParseOptions::validating())?;
        if !parsed.is_complete() {
            return Err(QueryError {
                position: None,
                message: "Query needs fields, an entity and at least one chain".to_string(),
            });
        }
        let query = self.input.trim().to_string();
        info!(%query, "query submitted");
        Ok(query)
    }

    /// Records an executor response of the shape
    /// `{"result": [{"query", "result"}], "error": {"query", "message"}}`.
    pub fn record_response(&mut self, query: &str, response: &Value) -> &QueryOutcome {
        let error = response.get("error").filter(|e| !e.is_null());
        let first = response
            .get("result")
            .and_then(Value::as_array)
            .and_then(|rows| rows.first());
        let outcome = match (error, first) {
            (Some(error), _) => QueryOutcome {
                query: error["query"].as_str().unwrap_or(query).to_string(),
                result: None,
                error: Some(error["message"].as_str().unwrap_or_default().to_string()),
            },
            (None, Some(first)) => QueryOutcome {
                query: first["query"].as_str().unwrap_or(query).to_string(),
                result: first.get("result").cloned(),
                error: None,
            },
            (None, None) => QueryOutcome {
                query: query.to_string(),
                result: None,
                error: Some("No results found".to_string()),
            },
        };
        let index = self.results.len();
        self.results.push(outcome);
        &self.results[index]
    }

    pub fn clear_results(&mut self) {
        debug!(count = self.results.len(), "clearing results");
        self.results.clear();
    }
}
