//! Tolerant parser for EQL queries.
//!
//! A query is typed one keystroke at a time, so most inputs the parser sees
//! are incomplete. Parsing therefore never fails on its own: whatever could
//! be recognised is returned as a [`ParsedQuery`] with the rest left as
//! `None`. Only when the caller asks for validation (and the input sits at a
//! token boundary) are semantic problems reported as a [`QueryError`].
//!
//! ```
//! use eql::parser::{parse_query, ParseOptions};
//! use eql::schema::Keyword;
//!
//! let parsed = parse_query("GET hash, value FROM tx WHERE value > 1000000 ON eth", ParseOptions::default()).unwrap();
//! assert_eq!(parsed.entity.as_deref(), Some("tx"));
//! assert_eq!(parsed.last_keyword, Some(Keyword::On));
//! ```

use serde::Serialize;
use tracing::{debug, trace};

use crate::lexer::{Token, TokenKind, tokenize};
use crate::schema::{CHAINS, Entity, Keyword, Operator, WILDCARD, is_known_field};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Validate the query when it is complete or ends at a token boundary.
    pub validate_partial: bool,
}

impl ParseOptions {
    pub fn validating() -> Self {
        Self { validate_partial: true }
    }
}

/// One `field operator value` clause of a `WHERE`, possibly still being typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub field: String,
    pub operator: Option<Operator>,
    pub value: Option<String>,
}

impl Filter {
    pub fn new(field: &str, operator: Option<Operator>, value: Option<&str>) -> Self {
        Self {
            field: field.to_string(),
            operator,
            value: value.map(String::from),
        }
    }
    fn placeholder(raw: &str) -> Self {
        Self::new(raw, None, None)
    }
    pub fn is_complete(&self) -> bool {
        self.operator.is_some() && self.value.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuery {
    /// Entity as typed (lower-cased) or inferred; not checked against the schema.
    pub entity: Option<String>,
    /// Identifier following the entity name, e.g. `vitalik.eth` or `10:1000`.
    pub entity_id: Option<String>,
    pub fields: Option<Vec<String>>,
    pub filters: Option<Vec<Filter>>,
    pub chains: Option<Vec<String>>,
    pub dump: Option<String>,
    pub last_keyword: Option<Keyword>,
}

impl ParsedQuery {
    pub fn known_entity(&self) -> Option<Entity> {
        self.entity.as_deref().and_then(Entity::from_name)
    }
    pub fn is_complete(&self) -> bool {
        self.entity.is_some() && self.fields.is_some() && self.chains.is_some()
    }
    pub fn has_wildcard(&self) -> bool {
        self.fields
            .as_ref()
            .is_some_and(|fields| fields.iter().any(|f| f == WILDCARD))
    }
}

/// Character offsets into the untrimmed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct QueryError {
    pub position: Option<Span>,
    pub message: String,
}

impl QueryError {
    /// Points at the first occurrence of `offending` in `query`, so an earlier
    /// identical substring is highlighted instead of the real culprit.
    fn at(query: &str, offending: &str, message: String) -> Self {
        let position = query.find(offending).map(|byte| {
            let start = query[..byte].chars().count();
            Span {
                start,
                end: start + offending.chars().count(),
            }
        });
        Self { position, message }
    }
}

// ------------- Clauses -------------
/// Tokens between one clause keyword and the next.
struct Clause<'t, 'q> {
    keyword: Option<Keyword>,
    tokens: &'t [Token<'q>],
    text: &'q str,
}

fn span_text<'q>(query: &'q str, tokens: &[Token<'q>]) -> &'q str {
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => &query[first.span.start..last.span.end],
        _ => "",
    }
}

fn split_clauses<'t, 'q>(query: &'q str, tokens: &'t [Token<'q>]) -> Vec<Clause<'t, 'q>> {
    let mut clauses = Vec::new();
    let mut keyword = None;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if let Some(next) = token.keyword() {
            clauses.push(Clause {
                keyword,
                tokens: &tokens[start..i],
                text: span_text(query, &tokens[start..i]),
            });
            keyword = Some(next);
            start = i + 1;
        }
    }
    clauses.push(Clause {
        keyword,
        tokens: &tokens[start..],
        text: span_text(query, &tokens[start..]),
    });
    clauses
}

fn first_clause<'c, 't, 'q>(
    clauses: &'c [Clause<'t, 'q>],
    keyword: Keyword,
) -> Option<&'c Clause<'t, 'q>> {
    clauses.iter().find(|c| c.keyword == Some(keyword))
}

// ------------- GET -------------
fn parse_get(head: &str, parsed: &mut ParsedQuery) {
    let Some(list) = head.strip_prefix("GET ") else {
        return;
    };
    let list = list.trim();
    if list == WILDCARD {
        parsed.fields = Some(vec![WILDCARD.to_string()]);
        return;
    }
    let fields: Vec<String> = list
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(String::from)
        .collect();
    parsed.entity = infer_entity(&fields).map(|e| e.as_str().to_string());
    parsed.fields = Some(fields);
}

/// The entity owning strictly more of the typed fields than any other.
/// Any tie, including nobody owning anything, leaves the entity open.
fn infer_entity(fields: &[String]) -> Option<Entity> {
    let mut best = None;
    let mut best_count = 0;
    let mut tie = false;
    for entity in Entity::ALL {
        let count = fields.iter().filter(|f| entity.has_field(f)).count();
        if count == 0 {
            continue;
        }
        if count > best_count {
            best = Some(entity);
            best_count = count;
            tie = false;
        } else if count == best_count {
            tie = true;
        }
    }
    trace!(?best, best_count, tie, "entity inference");
    if tie { None } else { best }
}

// ------------- FROM -------------
fn parse_from(clause: &Clause, parsed: &mut ParsedQuery) {
    let text = clause.text.trim();
    let (name, id) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    // an empty FROM keeps whatever entity the fields implied
    if name.is_empty() {
        return;
    }
    parsed.entity = Some(name.to_lowercase());
    let id = id.trim();
    parsed.entity_id = (!id.is_empty()).then(|| id.to_string());
}

// ------------- WHERE -------------
/// Splits on commas that are not nested in parentheses, so
/// `Transfer(address,address,uint)` stays a single value.
fn split_filters<'t, 'q>(tokens: &'t [Token<'q>]) -> Vec<&'t [Token<'q>]> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::OpenParen => depth += 1,
            TokenKind::CloseParen => depth = depth.saturating_sub(1),
            TokenKind::Comma if depth == 0 => {
                groups.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    groups.push(&tokens[start..]);
    groups.retain(|group| !group.is_empty());
    groups
}

fn parse_filter(query: &str, tokens: &[Token]) -> Filter {
    let operator = |token: &Token| match token.kind {
        TokenKind::Operator => token.text.parse::<Operator>().ok(),
        _ => None,
    };
    match tokens {
        [field] if field.is_identifier() => Filter::new(field.text, None, None),
        // the field must open the clause; leading words make it a placeholder
        [field, op, value @ ..] if field.is_identifier() => match operator(op) {
            Some(op) => {
                let value = span_text(query, value);
                Filter::new(field.text, Some(op), (!value.is_empty()).then_some(value))
            }
            None => Filter::placeholder(span_text(query, tokens)),
        },
        _ => Filter::placeholder(span_text(query, tokens)),
    }
}

fn parse_where(query: &str, clause: &Clause, parsed: &mut ParsedQuery) {
    let filters: Vec<Filter> = split_filters(clause.tokens)
        .into_iter()
        .map(|tokens| parse_filter(query, tokens))
        .collect();
    parsed.filters = (!filters.is_empty()).then_some(filters);
}

// ------------- ON / >> -------------
fn parse_on(clause: &Clause, parsed: &mut ParsedQuery) {
    let chains: Vec<String> = clause
        .text
        .split(',')
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect();
    parsed.chains = (!chains.is_empty()).then_some(chains);
}

fn parse_dump(clause: &Clause, parsed: &mut ParsedQuery) {
    let file = clause.text.trim();
    parsed.dump = (!file.is_empty()).then(|| file.to_string());
}

/// Parses a possibly incomplete query.
///
/// Without validation this never returns an error. With
/// [`ParseOptions::validate_partial`] the query is checked once it is
/// complete or the raw input ends in a space, so a half-typed word is never
/// flagged.
pub fn parse_query(raw: &str, options: ParseOptions) -> Result<ParsedQuery, QueryError> {
    let mut parsed = ParsedQuery::default();
    let query = raw.trim();
    if query.is_empty() {
        return Ok(parsed);
    }

    let tokens = tokenize(query);
    let clauses = split_clauses(query, &tokens);

    if clauses[0].text.starts_with(Keyword::Get.as_str()) {
        parsed.last_keyword = Some(Keyword::Get);
        parse_get(clauses[0].text, &mut parsed);
    }
    if let Some(clause) = first_clause(&clauses, Keyword::From) {
        parse_from(clause, &mut parsed);
    }
    if let Some(clause) = first_clause(&clauses, Keyword::Where) {
        parse_where(query, clause, &mut parsed);
    }
    if let Some(clause) = first_clause(&clauses, Keyword::On) {
        parse_on(clause, &mut parsed);
    }
    if let Some(clause) = first_clause(&clauses, Keyword::Dump) {
        parse_dump(clause, &mut parsed);
    }
    // the rightmost keyword wins
    if let Some(keyword) = clauses.last().and_then(|c| c.keyword) {
        parsed.last_keyword = Some(keyword);
    }
    debug!(
        query,
        last_keyword = ?parsed.last_keyword,
        entity = ?parsed.entity,
        "parsed query"
    );

    if options.validate_partial && (parsed.is_complete() || raw.ends_with(' ')) {
        validate(&parsed, raw)?;
    }
    Ok(parsed)
}

/// Stops at the first problem found.
fn validate(parsed: &ParsedQuery, raw: &str) -> Result<(), QueryError> {
    if !raw.starts_with("GET ") {
        return Err(QueryError {
            position: Some(Span {
                start: 0,
                end: raw.chars().count(),
            }),
            message: "Query must start with GET".to_string(),
        });
    }

    let entity = match parsed.entity.as_deref() {
        Some(name) => match Entity::from_name(name) {
            Some(entity) => Some(entity),
            None => {
                return Err(QueryError::at(raw, name, format!("Invalid entity \"{name}\"")));
            }
        },
        None => None,
    };

    for field in parsed.fields.iter().flatten().filter(|f| *f != WILDCARD) {
        match entity {
            Some(entity) if !entity.has_field(field) => {
                return Err(QueryError::at(
                    raw,
                    field,
                    format!("Invalid field \"{field}\" for entity \"{entity}\""),
                ));
            }
            None if !is_known_field(field) => {
                return Err(QueryError::at(raw, field, format!("Invalid field \"{field}\"")));
            }
            _ => {}
        }
    }

    // filters are checked against the entity even when no field was typed
    if let Some(entity) = entity {
        for filter in parsed.filters.iter().flatten() {
            if entity.filter(&filter.field).is_none() {
                let field = &filter.field;
                return Err(QueryError::at(
                    raw,
                    field,
                    format!("Invalid filter \"{field}\" for entity \"{entity}\""),
                ));
            }
        }
    }

    // a prefix of a known chain is accepted, so abbreviations validate
    for chain in parsed.chains.iter().flatten() {
        if !CHAINS.iter().any(|known| known.starts_with(chain.as_str())) {
            return Err(QueryError::at(raw, chain, format!("Invalid chain \"{chain}\"")));
        }
    }
    Ok(())
}
