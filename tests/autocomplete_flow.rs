use eql::EqlError;
use eql::autocomplete::{Suggestion, autocomplete};
use eql::schema::{ALL_OPERATORS, CHAINS, Entity, Keyword, chains_without_wildcard};

fn texts(query: &str) -> Vec<&'static str> {
    autocomplete(query)
        .unwrap_or_else(|e| panic!("autocomplete failed for {query:?}: {e}"))
        .iter()
        .filter_map(Suggestion::text)
        .collect()
}

// ------------- GET -------------
#[test]
fn empty_input_suggests_get() {
    assert_eq!(texts(""), vec!["GET"]);
}

#[test]
fn fields_start_with_wildcard_and_featured_groups() {
    let suggestions = autocomplete("GET ").expect("suggestions");
    assert_eq!(suggestions.len(), 1 + Entity::ALL.len());
    assert_eq!(suggestions[0], Suggestion::PlainToken("*"));
    assert_eq!(
        suggestions[1],
        Suggestion::FieldGroup {
            schema: Entity::Account,
            fields: vec!["nonce", "balance", "code", "chain"],
        }
    );
    assert!(matches!(suggestions[4], Suggestion::FieldGroup { schema: Entity::Log, .. }));
}

#[test]
fn partial_field_narrows_to_inferred_entity() {
    assert_eq!(texts("GET balance, non"), vec!["nonce"]);
}

#[test]
fn unused_fields_after_comma() {
    assert_eq!(texts("GET balance, "), vec!["nonce", "code", "chain"]);
}

#[test]
fn complete_field_waits_for_a_boundary() {
    assert!(texts("GET nonce").is_empty());
    assert!(texts("GET *").is_empty());
    assert!(texts("GET nonce,").is_empty());
}

#[test]
fn field_list_followed_by_space_suggests_from() {
    assert_eq!(texts("GET nonce, balance "), vec!["FROM"]);
    assert_eq!(texts("GET * "), vec!["FROM"]);
    assert_eq!(texts("GET nonce, balance FR"), vec!["FROM"]);
}

#[test]
fn typing_a_keyword_in_full_yields_nothing() {
    assert!(texts("GET * FROM").is_empty());
    assert!(texts("GET * FROM tx WHERE").is_empty());
}

// ------------- FROM -------------
#[test]
fn wildcard_offers_every_entity() {
    assert_eq!(texts("GET * FROM "), vec!["account", "block", "tx", "log"]);
    assert_eq!(texts("GET * FROM ac"), vec!["account"]);
}

#[test]
fn entities_owning_every_field() {
    assert_eq!(texts("GET nonce, balance FROM "), vec!["account"]);
    assert_eq!(texts("GET nonce FROM "), vec!["account", "tx"]);
}

#[test]
fn identifier_hints_follow_the_entity() {
    assert_eq!(texts("GET nonce, balance FROM account "), vec![".eth", "0x"]);
    assert_eq!(texts("GET * FROM log "), vec!["WHERE"]);
    assert_eq!(
        texts("GET * FROM block "),
        vec!["1", "1:10", "latest", "pending", "finalized", "earliest"]
    );
}

#[test]
fn clause_keywords_after_identifier() {
    assert_eq!(texts("GET nonce, balance FROM account vitalik.eth "), vec!["ON"]);
    assert_eq!(texts("GET * FROM tx 0x1 "), vec!["WHERE", "ON"]);
    assert_eq!(texts("GET * FROM tx 0x1 WH"), vec!["WHERE"]);
    assert_eq!(texts("GET * FROM block 1 O"), vec!["ON"]);
}

// ------------- WHERE -------------
#[test]
fn filters_for_the_entity() {
    assert_eq!(
        texts("GET * FROM log WHERE "),
        vec!["block", "event_signature", "topic0", "topic1", "topic2", "topic3", "address"]
    );
    assert_eq!(texts("GET * FROM tx WHERE bl"), vec!["block", "blob_versioned_hashes"]);
}

#[test]
fn operators_for_a_filter() {
    assert_eq!(texts("GET * FROM log WHERE topic0 "), vec!["="]);
    let all: Vec<&str> = ALL_OPERATORS.iter().map(|op| op.as_str()).collect();
    assert_eq!(texts("GET * FROM tx WHERE value "), all);
    assert_eq!(texts("GET * FROM tx WHERE to "), vec!["=", "!="]);
}

#[test]
fn values_are_left_to_the_user() {
    assert!(texts("GET * FROM tx WHERE value =").is_empty());
    assert!(texts("GET * FROM tx WHERE value = 123").is_empty());
    assert!(texts("GET * FROM tx WHERE value").is_empty());
}

#[test]
fn remaining_filters_after_comma() {
    assert_eq!(
        texts("GET * FROM log WHERE block = 123, "),
        vec!["event_signature", "topic0", "topic1", "topic2", "topic3", "address"]
    );
}

#[test]
fn completed_filter_suggests_on() {
    assert_eq!(texts("GET * FROM log WHERE block = 123 "), vec!["ON"]);
}

#[test]
fn where_without_entity_is_an_error() {
    match autocomplete("GET * WHERE va") {
        Err(EqlError::MissingEntity { keyword }) => assert_eq!(keyword, Keyword::Where),
        other => panic!("expected a missing entity error, got {other:?}"),
    }
}

// ------------- ON -------------
#[test]
fn every_chain_after_on() {
    assert_eq!(texts("GET * FROM account vitalik.eth ON "), CHAINS.to_vec());
    assert!(texts("GET * FROM account vitalik.eth ON *").is_empty());
}

#[test]
fn selected_chains_are_not_offered_again() {
    let expected: Vec<&str> = chains_without_wildcard().filter(|c| *c != "eth").collect();
    assert_eq!(texts("GET * FROM account vitalik.eth ON eth, "), expected);

    let expected: Vec<&str> = chains_without_wildcard()
        .filter(|c| *c != "eth" && *c != "arb")
        .collect();
    assert_eq!(texts("GET * FROM account vitalik.eth ON eth, arb, "), expected);
}

#[test]
fn partial_chain() {
    assert_eq!(texts("GET * FROM account vitalik.eth ON eth, ar"), vec!["arb"]);
}

#[test]
fn chains_then_dump() {
    assert_eq!(texts("GET * FROM account vitalik.eth ON eth "), vec![">>"]);
}

// ------------- >> -------------
#[test]
fn dump_formats() {
    assert_eq!(
        texts("GET * FROM account vitalik.eth ON eth >> "),
        vec![".json", ".csv", ".parquet"]
    );
    assert!(texts("GET * FROM account vitalik.eth ON eth >> out").is_empty());
}

// ------------- Invalid input -------------
#[test]
fn invalid_queries_get_no_suggestions() {
    assert!(texts("GET asdf ").is_empty());
    assert!(texts("GET nonce, balance FROM acc ").is_empty());
    assert!(texts("hello ").is_empty());
}
