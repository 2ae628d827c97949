use async_graphql::Variables;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::DomainError;

use super::schema::{RelaySchema, MAX_NESTING};

/// Body of a GraphQL-over-HTTP request.
#[derive(Debug, Default, Deserialize)]
pub struct GraphQlRequest {
    pub query: Option<String>,
    #[serde(default)]
    pub variables: Option<Value>,
    #[serde(default, rename = "operationName")]
    pub operation_name: Option<String>,
}

/// Runs `request` against `schema` and returns the `data` object.
///
/// Any error fails the whole request. Errors raised by the relay itself keep
/// their status; parse and validation errors are 400.
pub async fn execute(schema: &RelaySchema, request: GraphQlRequest) -> Result<Value, DomainError> {
    let query = request
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| DomainError::validation("Query is required"))?;

    let variables = match request.variables {
        Some(Value::Object(map)) => Value::Object(map),
        Some(Value::Null) | None => Value::Object(Default::default()),
        Some(_) => return Err(DomainError::validation("Variables must be an object")),
    };

    check_nesting(&query)?;

    let mut graphql_request =
        async_graphql::Request::new(query).variables(Variables::from_json(variables));
    if let Some(name) = request.operation_name {
        debug!("Selecting GraphQL operation {}", name);
        graphql_request = graphql_request.operation_name(name);
    }

    let response = schema.execute(graphql_request).await;

    if let Some(first) = response.errors.first() {
        let relayed = response
            .errors
            .iter()
            .find_map(|e| e.source::<DomainError>());
        return Err(match relayed {
            Some(error) => error.clone(),
            None => DomainError::validation(first.message.clone()),
        });
    }

    serde_json::to_value(&response.data)
        .map_err(|e| DomainError::internal(format!("failed to encode GraphQL data: {e}")))
}

/// Rejects documents whose brackets nest deeper than [`MAX_NESTING`] before
/// they reach the recursive parser. String literals and comments are skipped.
fn check_nesting(query: &str) -> Result<(), DomainError> {
    let bytes = query.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'"' if bytes[i..].starts_with(b"\"\"\"") => {
                i += 3;
                while i < bytes.len() && !bytes[i..].starts_with(b"\"\"\"") {
                    i += if bytes[i..].starts_with(b"\\\"\"\"") { 4 } else { 1 };
                }
                i += 2;
            }
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' && bytes[i] != b'\n' {
                    i += if bytes[i] == b'\\' { 2 } else { 1 };
                }
            }
            b'{' | b'[' | b'(' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(DomainError::validation("Document nested too deeply"));
                }
            }
            b'}' | b']' | b')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::application::ForwardChatUseCase;
    use crate::connector::api::graphql::{build_schema, HELLO_GREETING};
    use crate::connector::MockChatClient;

    fn schema_with(mock: Arc<MockChatClient>) -> RelaySchema {
        build_schema(Arc::new(ForwardChatUseCase::new(mock)))
    }

    fn request(query: &str, variables: Value) -> GraphQlRequest {
        GraphQlRequest {
            query: Some(query.to_string()),
            variables: Some(variables),
            operation_name: None,
        }
    }

    #[tokio::test]
    async fn hello_query() {
        let schema = schema_with(Arc::new(MockChatClient::new()));
        let data = execute(&schema, request("query { greeting: hello }", Value::Null))
            .await
            .unwrap();
        assert_eq!(data, json!({"greeting": HELLO_GREETING}));
    }

    #[tokio::test]
    async fn send_message_returns_only_selected_fields() {
        let mock = Arc::new(MockChatClient::with_reply("hello"));
        let schema = schema_with(mock.clone());

        let data = execute(
            &schema,
            request(
                "mutation chat($input: ChatInput!) { reply: chat(input: $input) { choices { message { content } finish_reason } } }",
                json!({"input": {"messages": [{"role": "user", "content": "hi"}]}}),
            ),
        )
        .await
        .unwrap();

        assert_eq!(
            data,
            json!({"reply": {"choices": [{"message": {"content": "hello"}, "finish_reason": "stop"}]}})
        );
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn fragments_and_block_strings_are_supported() {
        let mock = Arc::new(MockChatClient::new());
        let schema = schema_with(mock.clone());

        let query = r#"
            mutation {
              sendMessage(input: {messages: [{role: "user", content: """two
lines"""}]}) { ...Reply }
            }
            fragment Reply on ChatResponse { choices { message { content } } }
        "#;
        let data = execute(&schema, request(query, Value::Null)).await.unwrap();

        assert_eq!(
            data["sendMessage"]["choices"][0]["message"]["content"],
            "Echo: two\nlines"
        );
    }

    #[tokio::test]
    async fn missing_query_is_rejected() {
        let schema = schema_with(Arc::new(MockChatClient::new()));
        let err = execute(&schema, GraphQlRequest::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Query is required");
    }

    #[tokio::test]
    async fn empty_messages_never_reach_upstream() {
        let mock = Arc::new(MockChatClient::new());
        let schema = schema_with(mock.clone());

        let err = execute(
            &schema,
            request(
                "mutation($input: ChatInput!) { sendMessage(input: $input) { model } }",
                json!({"input": {"messages": []}}),
            ),
        )
        .await
        .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn undeclared_variable_is_rejected() {
        let mock = Arc::new(MockChatClient::new());
        let schema = schema_with(mock.clone());

        let err = execute(
            &schema,
            request(
                "mutation { sendMessage(input: $input) { model } }",
                json!({"input": {"messages": [{"role": "user", "content": "hi"}]}}),
            ),
        )
        .await
        .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_field_is_rejected() {
        let schema = schema_with(Arc::new(MockChatClient::new()));
        let err = execute(&schema, request("query { sendMessage { model } }", Value::Null))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn upstream_failure_keeps_its_status() {
        let schema = schema_with(Arc::new(MockChatClient::new().failing_with(503)));
        let err = execute(
            &schema,
            request(
                r#"mutation { chat(input: {messages: [{role: "user", content: "hi"}]}) { model } }"#,
                Value::Null,
            ),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "Upstream provider error: 503");
    }

    #[test]
    fn deep_nesting_is_rejected_before_parsing() {
        let query = format!(
            "mutation {{ chat(input: {}{}) {{ model }} }}",
            "[".repeat(10_000),
            "]".repeat(10_000)
        );
        let err = check_nesting(&query).unwrap_err();
        assert_eq!(err.to_string(), "Document nested too deeply");
    }

    #[test]
    fn brackets_inside_strings_do_not_count() {
        let text = "{".repeat(200);
        let query = format!(
            "# {text}\nmutation {{ chat(input: {{messages: [{{role: \"user\", content: \"{text}\"}}]}}) {{ model }} }}"
        );
        assert!(check_nesting(&query).is_ok());
        let block = format!("query {{ hello(x: \"\"\"{text}\"\"\") }}");
        assert!(check_nesting(&block).is_ok());
    }
}
