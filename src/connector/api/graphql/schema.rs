use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, InputObject, Object, Schema, SimpleObject};
use serde::Serialize;
use tracing::info;

use crate::application::ForwardChatUseCase;
use crate::domain::{ChatCompletion, ChatRequest, Choice, DomainError, ReplyMessage, Usage};

pub const HELLO_GREETING: &str = "Hello from GraphQL API!";

/// Deepest selection or value nesting a document may use.
pub const MAX_NESTING: usize = 64;

pub type RelaySchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// ```graphql
/// type Query    { hello: String! }
/// type Mutation { sendMessage(input: ChatInput!): ChatResponse!
///                 chat(input: ChatInput!): ChatResponse! }
/// ```
pub fn build_schema(forward: Arc<ForwardChatUseCase>) -> RelaySchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(forward)
        .limit_depth(MAX_NESTING)
        .limit_recursive_depth(MAX_NESTING)
        .finish()
}

#[derive(Debug, InputObject, Serialize)]
pub struct ChatInput {
    pub messages: Vec<MessageInput>,
}

#[derive(Debug, InputObject, Serialize)]
pub struct MessageInput {
    pub role: String,
    pub content: String,
}

#[derive(Debug, SimpleObject)]
#[graphql(rename_fields = "snake_case")]
pub struct ChatResponse {
    pub id: Option<String>,
    pub model: Option<String>,
    pub choices: Vec<ChatChoice>,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, SimpleObject)]
#[graphql(rename_fields = "snake_case")]
pub struct ChatChoice {
    pub index: Option<u32>,
    pub message: ChatReply,
    pub finish_reason: Option<String>,
}

#[derive(Debug, SimpleObject)]
pub struct ChatReply {
    pub role: String,
    pub content: Option<String>,
}

#[derive(Debug, SimpleObject)]
#[graphql(rename_fields = "snake_case")]
pub struct TokenUsage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

impl From<ChatCompletion> for ChatResponse {
    fn from(completion: ChatCompletion) -> Self {
        Self {
            id: completion
                .extra
                .get("id")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            model: completion.model,
            choices: completion.choices.into_iter().map(ChatChoice::from).collect(),
            usage: completion.usage.map(TokenUsage::from),
        }
    }
}

impl From<Choice> for ChatChoice {
    fn from(choice: Choice) -> Self {
        Self {
            index: choice.index,
            message: ChatReply::from(choice.message),
            finish_reason: choice.finish_reason,
        }
    }
}

impl From<ReplyMessage> for ChatReply {
    fn from(message: ReplyMessage) -> Self {
        Self {
            role: message.role,
            content: message.content,
        }
    }
}

impl From<Usage> for TokenUsage {
    fn from(usage: Usage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

pub struct QueryRoot;

#[Object(name = "Query")]
impl QueryRoot {
    async fn hello(&self) -> &'static str {
        HELLO_GREETING
    }
}

pub struct MutationRoot;

#[Object(name = "Mutation")]
impl MutationRoot {
    async fn send_message(
        &self,
        ctx: &Context<'_>,
        input: ChatInput,
    ) -> async_graphql::Result<ChatResponse> {
        forward(ctx, "sendMessage", input).await
    }

    async fn chat(&self, ctx: &Context<'_>, input: ChatInput) -> async_graphql::Result<ChatResponse> {
        forward(ctx, "chat", input).await
    }
}

async fn forward(
    ctx: &Context<'_>,
    field: &str,
    input: ChatInput,
) -> async_graphql::Result<ChatResponse> {
    let use_case = ctx.data::<Arc<ForwardChatUseCase>>()?;
    info!("Executing {} mutation", field);

    let outcome: Result<ChatCompletion, DomainError> = async {
        let messages = serde_json::to_value(&input.messages)
            .map_err(|e| DomainError::internal(format!("failed to encode messages: {e}")))?;
        let request = ChatRequest::from_messages_value(Some(&messages))?;
        use_case.execute(request).await
    }
    .await;

    // The source travels with the field error so the endpoint can pick the status.
    outcome
        .map(ChatResponse::from)
        .map_err(|e| async_graphql::Error::new_with_source(e))
}
