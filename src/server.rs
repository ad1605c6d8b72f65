use axum::http::StatusCode;
use axum::{Json, Router, routing::{get, post}};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::autocomplete::{Suggestion, autocomplete};
use crate::parser::{ParseOptions, ParsedQuery, QueryError, parse_query};
use crate::schema::{ALL_OPERATORS, CHAINS, Entity, FilterDefinition, Keyword, Operator};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    pub query: String,
    #[serde(default)]
    pub validate_partial: bool,
}

#[derive(Deserialize)]
pub struct AutocompleteRequest {
    pub query: String,
}

#[derive(Serialize)]
pub struct ParseResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<ParsedQuery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<QueryError>,
}

#[derive(Serialize)]
pub struct AutocompleteResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<Suggestion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct EntitySchema {
    pub name: Entity,
    pub fields: &'static [&'static str],
    pub filters: &'static [FilterDefinition],
}

#[derive(Serialize)]
pub struct SchemaResponse {
    pub entities: Vec<EntitySchema>,
    pub chains: &'static [&'static str],
    pub keywords: Vec<Keyword>,
    pub operators: &'static [Operator],
}

pub async fn parse(Json(req): Json<ParseRequest>) -> (StatusCode, Json<ParseResponse>) {
    let options = ParseOptions { validate_partial: req.validate_partial };
    match parse_query(&req.query, options) {
        Ok(parsed) => {
            let body = ParseResponse { status: "ok", query: Some(parsed), error: None };
            (StatusCode::OK, Json(body))
        }
        Err(error) => {
            info!(query = %req.query, %error, "query rejected");
            let body = ParseResponse { status: "error", query: None, error: Some(error) };
            (StatusCode::BAD_REQUEST, Json(body))
        }
    }
}

pub async fn suggest(Json(req): Json<AutocompleteRequest>) -> (StatusCode, Json<AutocompleteResponse>) {
    match autocomplete(&req.query) {
        Ok(suggestions) => {
            let body = AutocompleteResponse { status: "ok", suggestions: Some(suggestions), message: None };
            (StatusCode::OK, Json(body))
        }
        Err(e) => {
            let msg = format!("{e}");
            warn!(query = %req.query, %msg, "autocomplete misuse");
            let body = AutocompleteResponse { status: "error", suggestions: None, message: Some(msg) };
            (StatusCode::BAD_REQUEST, Json(body))
        }
    }
}

pub async fn schema() -> Json<SchemaResponse> {
    Json(SchemaResponse {
        entities: Entity::ALL
            .into_iter()
            .map(|name| EntitySchema { name, fields: name.fields(), filters: name.filters() })
            .collect(),
        chains: CHAINS,
        keywords: Keyword::ALL.to_vec(),
        operators: ALL_OPERATORS,
    })
}

pub fn router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);
    Router::new()
        .route("/v1/parse", post(parse))
        .route("/v1/autocomplete", post(suggest))
        .route("/v1/schema", get(schema))
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parse_reports_validation_errors_as_bad_request() {
        let req = ParseRequest { query: "GET asdf FROM account ".into(), validate_partial: true };
        let (status, Json(body)) = parse(Json(req)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.status, "error");
        let error = body.error.expect("error body");
        assert_eq!(error.message, "Invalid field \"asdf\" for entity \"account\"");
    }

    #[tokio::test]
    async fn parse_returns_the_structured_query() {
        let req = ParseRequest { query: "GET * FROM tx WHERE value > 1 ON eth".into(), validate_partial: false };
        let (status, Json(body)) = parse(Json(req)).await;
        assert_eq!(status, StatusCode::OK);
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["query"]["lastKeyword"], "ON");
        assert_eq!(json["query"]["filters"][0]["operator"], ">");
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn suggest_serializes_plain_tokens_and_groups() {
        let req = AutocompleteRequest { query: "GET ".into() };
        let (status, Json(body)) = suggest(Json(req)).await;
        assert_eq!(status, StatusCode::OK);
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["suggestions"][0], "*");
        assert_eq!(json["suggestions"][1]["schema"], "account");
    }

    #[tokio::test]
    async fn suggest_surfaces_missing_entity() {
        let req = AutocompleteRequest { query: "GET * WHERE va".into() };
        let (status, Json(body)) = suggest(Json(req)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message.as_deref(), Some("WHERE suggestions require an entity"));
    }

    #[tokio::test]
    async fn schema_lists_every_entity() {
        let Json(body) = schema().await;
        assert_eq!(body.entities.len(), 4);
        assert_eq!(body.chains[0], "*");
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["entities"][3]["filters"][0]["field"], "block");
        assert_eq!(json["keywords"][4], ">>");
    }
}
