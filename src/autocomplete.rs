//! Next-token suggestions for a query being typed.
//!
//! The cursor is assumed to sit at the end of the input. Suggestions only
//! appear once a token boundary has been crossed (a keyword followed by a
//! space, a comma and a space after a completed item) or while a word is
//! being typed, in which case they are narrowed to that fragment. Order always
//! follows the schema tables.

use serde::Serialize;
use tracing::debug;

use crate::error::{EqlError, Result};
use crate::parser::{Filter, ParseOptions, ParsedQuery, parse_query};
use crate::schema::{
    CHAINS, DUMP_FORMATS, Entity, Keyword, Operator, WILDCARD, chains_without_wildcard,
    is_known_field,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Suggestion {
    PlainToken(&'static str),
    /// Fields of one entity, offered side by side while the entity is open.
    FieldGroup {
        schema: Entity,
        fields: Vec<&'static str>,
    },
}

impl Suggestion {
    pub fn text(&self) -> Option<&'static str> {
        match self {
            Suggestion::PlainToken(text) => Some(*text),
            Suggestion::FieldGroup { .. } => None,
        }
    }
}

fn plain<I>(tokens: I) -> Vec<Suggestion>
where
    I: IntoIterator<Item = &'static str>,
{
    tokens.into_iter().map(Suggestion::PlainToken).collect()
}

/// The tail of the input as seen from the cursor.
struct Input<'a> {
    raw: &'a str,
    /// Last space separated word of the trimmed input.
    last_word: &'a str,
    /// Last space separated word of the raw input, empty after a space.
    fragment: &'a str,
    /// The word before the fragment, unless it is the first word.
    previous_word: Option<&'a str>,
}

impl<'a> Input<'a> {
    fn new(raw: &'a str) -> Self {
        let words: Vec<&str> = raw.split(' ').collect();
        Self {
            raw,
            last_word: raw.trim().split(' ').next_back().unwrap_or_default(),
            fragment: words.last().copied().unwrap_or_default(),
            previous_word: (words.len() > 2).then(|| words[words.len() - 2]),
        }
    }
    /// A plain space, not the one following a comma.
    fn ends_in_space(&self) -> bool {
        self.raw.ends_with(' ') && !self.raw.ends_with(", ")
    }
    fn fragment_starts(&self, word: &str) -> bool {
        word.to_lowercase().starts_with(&self.fragment.to_lowercase())
    }
}

// ------------- GET -------------
fn featured_groups() -> Vec<Suggestion> {
    let mut suggestions = plain([WILDCARD]);
    suggestions.extend(Entity::ALL.into_iter().map(|entity| Suggestion::FieldGroup {
        schema: entity,
        fields: entity.featured_fields().to_vec(),
    }));
    suggestions
}

fn suggest_fields(parsed: &ParsedQuery, input: &Input) -> Vec<Suggestion> {
    let fields = parsed.fields.as_deref().unwrap_or_default();
    if !fields.is_empty() && input.ends_in_space() {
        return plain([Keyword::From.as_str()]);
    }
    // "GET nonce fr" is on its way to FROM
    let after_list = input
        .previous_word
        .is_some_and(|word| !word.is_empty() && !word.ends_with(','));
    if after_list && !input.fragment.is_empty() && input.fragment_starts(Keyword::From.as_str()) {
        return plain([Keyword::From.as_str()]);
    }
    if input.raw.ends_with(',') || is_known_field(input.fragment) || input.last_word == WILDCARD {
        return Vec::new();
    }

    let used = |field: &str| fields.iter().any(|f| f.as_str() == field);
    if let Some(entity) = parsed.known_entity() {
        let typing = fields.last().filter(|f| !entity.has_field(f));
        return plain(
            entity
                .fields()
                .iter()
                .copied()
                .filter(|field| !used(*field))
                .filter(|field| typing.is_none_or(|t| field.contains(t.as_str()))),
        );
    }

    let Some((last, rest)) = fields.split_last() else {
        return featured_groups();
    };
    let narrow = !input.fragment.is_empty();
    let mut suggestions = Vec::new();
    if WILDCARD.starts_with(last.as_str()) {
        suggestions.push(Suggestion::PlainToken(WILDCARD));
    }
    for entity in Entity::ALL {
        let group = entity.featured_fields();
        let consistent = rest.iter().all(|f| group.contains(&f.as_str()));
        if !consistent || !group.iter().any(|g| g.starts_with(last.as_str())) {
            continue;
        }
        suggestions.push(Suggestion::FieldGroup {
            schema: entity,
            fields: group
                .iter()
                .copied()
                .filter(|g| !narrow || g.starts_with(last.as_str()))
                .collect(),
        });
    }
    // a single surviving entity is shown as plain fields
    if let [Suggestion::FieldGroup { fields, .. }] = suggestions.as_slice() {
        return plain(fields.iter().copied());
    }
    suggestions
}

// ------------- FROM -------------
fn suggest_entity(parsed: &ParsedQuery, input: &Input) -> Vec<Suggestion> {
    let Some(entity) = parsed.known_entity() else {
        if let Some(fields) = parsed.fields.as_ref().filter(|_| !parsed.has_wildcard()) {
            return plain(
                Entity::ALL
                    .into_iter()
                    .filter(|e| fields.iter().all(|f| e.has_field(f)))
                    .map(|e| e.as_str()),
            );
        }
        return plain(
            Entity::ALL
                .into_iter()
                .map(|e| e.as_str())
                .filter(|name| input.fragment.is_empty() || name.starts_with(input.last_word)),
        );
    };

    let entity_complete = input.raw.ends_with(&format!("{entity} "));
    let comma_after_id = input.raw.ends_with(", ")
        && !input.last_word.is_empty()
        && Entity::from_name(input.last_word).is_none();
    if entity_complete || comma_after_id {
        return plain(entity.identifier_hints().iter().copied());
    }
    if input.last_word == Keyword::From.as_str() {
        return plain([entity.as_str()]);
    }

    let ready = Entity::from_name(input.last_word).is_none()
        && !Keyword::is_keyword(input.last_word)
        && input.raw.ends_with(' ');
    let partial = !input.fragment.is_empty()
        && (input.fragment_starts(Keyword::Where.as_str()) || input.fragment_starts(Keyword::On.as_str()));
    if !ready && !partial {
        return Vec::new();
    }
    if entity.filters().is_empty() {
        return plain([Keyword::On.as_str()]);
    }
    plain(
        [Keyword::Where, Keyword::On]
            .into_iter()
            .map(|k| k.as_str())
            .filter(|k| input.fragment_starts(k)),
    )
}

// ------------- WHERE -------------
fn suggest_filters(parsed: &ParsedQuery, input: &Input) -> Result<Vec<Suggestion>> {
    let entity = parsed
        .known_entity()
        .ok_or(EqlError::MissingEntity { keyword: Keyword::Where })?;
    let filters = parsed.filters.as_deref().unwrap_or_default();
    let last = filters.last();

    if last.is_some_and(Filter::is_complete) && input.ends_in_space() {
        return Ok(plain([Keyword::On.as_str()]));
    }

    let terminated = input.raw.ends_with([',', '(', ')']);
    let value_complete = last
        .and_then(|f| f.value.as_deref())
        .is_some_and(|value| value == input.last_word);
    let field_complete = !input.fragment.is_empty() && entity.filter(input.fragment).is_some();
    if terminated || value_complete || field_complete {
        return Ok(Vec::new());
    }

    let unmatched = last.filter(|f| {
        f.operator.is_none() && f.value.is_none() && entity.filter(&f.field).is_none()
    });
    if let Some(filter) = unmatched {
        return Ok(plain(
            entity
                .filter_fields()
                .filter(|field| field.starts_with(filter.field.as_str())),
        ));
    }

    // operator typed, value still to come
    if input.raw.trim_end().ends_with(Operator::is_operator_char) {
        return Ok(Vec::new());
    }

    if input.raw.ends_with(' ') {
        if let Some(filter) = last.filter(|f| f.value.is_none()) {
            let definition = entity.filter(&filter.field).ok_or_else(|| EqlError::UnknownFilter {
                entity,
                field: filter.field.clone(),
            })?;
            return Ok(plain(definition.operators.iter().map(|op| op.as_str())));
        }
    }

    let used = |field: &str| filters.iter().any(|f| f.is_complete() && f.field == field);
    Ok(plain(entity.filter_fields().filter(|field| !used(*field))))
}

// ------------- ON -------------
fn suggest_chains(parsed: &ParsedQuery, input: &Input) -> Vec<Suggestion> {
    let chains = parsed.chains.as_deref().unwrap_or_default();
    if !chains.is_empty() && input.ends_in_space() {
        return plain([Keyword::Dump.as_str()]);
    }
    if input.last_word == Keyword::On.as_str() {
        return plain(CHAINS.iter().copied());
    }
    if input.raw.ends_with(',') || input.last_word == WILDCARD || CHAINS.contains(&input.last_word) {
        return Vec::new();
    }
    plain(
        chains_without_wildcard()
            .filter(|chain| chain.starts_with(input.fragment))
            .filter(|chain| !chains.iter().any(|selected| selected.as_str() == *chain)),
    )
}

// ------------- >> -------------
fn suggest_dump(input: &Input) -> Vec<Suggestion> {
    if input.raw.ends_with(' ') {
        plain(DUMP_FORMATS.iter().copied())
    } else {
        Vec::new()
    }
}

/// Suggestions for the token following `raw`.
///
/// Invalid input (once it reaches a token boundary) yields no suggestions.
/// Asking for `WHERE` suggestions before the entity is known is a caller
/// error and reported as [`EqlError::MissingEntity`].
pub fn autocomplete(raw: &str) -> Result<Vec<Suggestion>> {
    let parsed = match parse_query(raw, ParseOptions::validating()) {
        Ok(parsed) => parsed,
        Err(error) => {
            debug!(query = raw, %error, "no suggestions for invalid query");
            return Ok(Vec::new());
        }
    };
    let input = Input::new(raw);
    // still typing a keyword
    if Keyword::is_keyword(input.fragment) {
        return Ok(Vec::new());
    }

    let suggestions = match parsed.last_keyword {
        None => plain([Keyword::Get.as_str()]),
        Some(Keyword::Get) => suggest_fields(&parsed, &input),
        Some(Keyword::From) => suggest_entity(&parsed, &input),
        Some(Keyword::Where) => suggest_filters(&parsed, &input)?,
        Some(Keyword::On) => suggest_chains(&parsed, &input),
        Some(Keyword::Dump) => suggest_dump(&input),
    };
    debug!(query = raw, count = suggestions.len(), "suggestions");
    Ok(suggestions)
}
