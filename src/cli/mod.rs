use clap::Subcommand;

use crate::domain::TransportKind;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the relay proxy
    Serve {
        #[arg(short, long, default_value = "8787")]
        port: u16,

        /// Bind to 0.0.0.0 instead of 127.0.0.1, exposing the proxy on all network interfaces
        #[arg(long)]
        public: bool,

        /// Upstream deadline in seconds (overrides UPSTREAM_TIMEOUT_SECS)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Upstream model (overrides UPSTREAM_MODEL)
        #[arg(long)]
        model: Option<String>,
    },

    /// Chat with a running proxy; reads lines from stdin when no message is given
    Chat {
        message: Option<String>,

        /// Proxy base URL (overrides CHAT_RELAY_URL)
        #[arg(long)]
        url: Option<String>,

        /// Transports to try in order, e.g. `graphql,rest`
        #[arg(short, long, value_delimiter = ',', default_value = "rest", value_parser = parse_transport)]
        transport: Vec<TransportKind>,

        /// Cap on attempts per message (defaults to transports times tries)
        #[arg(long)]
        max_attempts: Option<usize>,

        /// Attempts per transport before falling back to the next one
        #[arg(long, default_value = "1")]
        tries: usize,

        /// Base backoff between attempts; the n-th retry waits n times this
        #[arg(long, default_value = "1000")]
        retry_delay_ms: u64,
    },

    /// Check that a proxy answers on its health and GraphQL endpoints
    Health {
        /// Proxy base URL (overrides CHAT_RELAY_URL)
        #[arg(long)]
        url: Option<String>,
    },
}

pub fn parse_transport(s: &str) -> Result<TransportKind, String> {
    TransportKind::parse(s).ok_or_else(|| format!("unknown transport '{s}' (expected rest or graphql)"))
}
