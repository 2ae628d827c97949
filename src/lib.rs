pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    ChatClient, ChatSession, ForwardChatUseCase, ProxyTransport, SendMessageUseCase,
    NO_ANSWER_FALLBACK,
};

pub use connector::{
    check_connection, check_health, router, serve, ClientConfig, ConnectionReport, Container,
    ContainerConfig, GraphQlTransport, MockChatClient, OpenAiCompatClient, RestTransport, UpstreamSettings,
};

pub use domain::{
    ChatCompletion, ChatMessage, ChatRequest, Choice, ReplyMessage, ClientError, DisplayMessage, DomainError,
    Role, Transcript, TransportKind, TransportPolicy, Usage,
};
