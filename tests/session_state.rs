use eql::EqlError;
use eql::autocomplete::Suggestion;
use eql::interface::Session;
use serde_json::json;

#[test]
fn fresh_session_is_empty() {
    let session = Session::new();
    assert_eq!(session.input(), "");
    assert!(session.suggestions().is_empty());
    assert!(session.error().is_none());
    assert!(session.results().is_empty());
}

#[test]
fn update_derives_suggestions_and_error() {
    let mut session = Session::new();
    let count = session.update("GET ").expect("update").len();
    assert_eq!(count, 5);
    assert!(session.error().is_none());

    session.update("GET asdf ").expect("update");
    assert!(session.suggestions().is_empty());
    let error = session.error().expect("invalid field is reported");
    assert_eq!(error.message, "Invalid field \"asdf\"");

    // fixing the input clears the error again
    session.update("GET balance ").expect("update");
    assert!(session.error().is_none());
    assert_eq!(session.suggestions(), &[Suggestion::PlainToken("FROM")]);
}

#[test]
fn accept_replaces_the_fragment() {
    let mut session = Session::new();
    session.update("").expect("update");
    session.accept("GET").expect("accept");
    assert_eq!(session.input(), "GET ");

    session.update("GET balance, non").expect("update");
    let suggestions = session.accept("nonce").expect("accept").to_vec();
    assert_eq!(session.input(), "GET balance, nonce ");
    assert_eq!(suggestions, vec![Suggestion::PlainToken("FROM")]);

    session.accept("FROM").expect("accept");
    session.accept("account").expect("accept");
    assert_eq!(session.input(), "GET balance, nonce FROM account ");
    assert_eq!(
        session.suggestions(),
        &[Suggestion::PlainToken(".eth"), Suggestion::PlainToken("0x")]
    );
}

#[test]
fn misuse_is_propagated() {
    let mut session = Session::new();
    let result = session.update("GET * WHERE va");
    assert!(matches!(result, Err(EqlError::MissingEntity { .. })));
}

#[test]
fn submit_requires_a_complete_valid_query() {
    let mut session = Session::new();
    session.update("GET * FROM block 1 ON eth ").expect("update");
    assert_eq!(session.submit().as_deref(), Ok("GET * FROM block 1 ON eth"));

    session.update("GET * FROM block ").expect("update");
    let error = session.submit().expect_err("no chain yet");
    assert_eq!(error.message, "Query needs fields, an entity and at least one chain");
    assert_eq!(error.position, None);

    session.update("GET * FROM blok ON eth").expect("update");
    let error = session.submit().expect_err("unknown entity");
    assert_eq!(error.message, "Invalid entity \"blok\"");
}

#[test]
fn responses_are_recorded_in_order() {
    let mut session = Session::new();
    let q = "GET balance FROM account vitalik.eth ON eth";

    let outcome = session
        .record_response(q, &json!({"result": [{"query": q, "result": {"balance": "1"}}]}))
        .clone();
    assert_eq!(outcome.query, q);
    assert_eq!(outcome.result, Some(json!({"balance": "1"})));
    assert_eq!(outcome.error, None);

    let outcome = session
        .record_response(q, &json!({"error": {"query": q, "message": "rpc timeout"}}))
        .clone();
    assert_eq!(outcome.error.as_deref(), Some("rpc timeout"));
    assert_eq!(outcome.result, None);

    let outcome = session.record_response(q, &json!({"result": []})).clone();
    assert_eq!(outcome.error.as_deref(), Some("No results found"));

    assert_eq!(session.results().len(), 3);
    session.clear_results();
    assert!(session.results().is_empty());
}
