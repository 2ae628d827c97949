use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use chat_relay::cli::Commands;
use chat_relay::{
    check_connection, serve, ChatSession, ClientConfig, Container, ContainerConfig, TransportPolicy,
};

#[derive(Parser)]
#[command(name = "chat-relay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Answer from the built-in echo upstream instead of the provider
    #[arg(long, global = true)]
    mock_upstream: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Serve {
            port,
            public,
            timeout_secs,
            model,
        } => {
            let mut config = ContainerConfig::from_env();
            config.mock_upstream = cli.mock_upstream;
            if let Some(secs) = timeout_secs {
                config.upstream.timeout = Duration::from_secs(secs);
            }
            if let Some(model) = model {
                config.upstream.model = model;
            }

            let host = if public {
                IpAddr::V4(Ipv4Addr::UNSPECIFIED)
            } else {
                IpAddr::V4(Ipv4Addr::LOCALHOST)
            };
            let container = Arc::new(Container::new(config));
            serve(container, SocketAddr::new(host, port)).await?;
        }

        Commands::Chat {
            message,
            url,
            transport,
            max_attempts,
            tries,
            retry_delay_ms,
        } => {
            let mut config = match url {
                Some(url) => ClientConfig::new(url),
                None => ClientConfig::from_env(),
            };
            let mut policy = TransportPolicy::new(transport)
                .with_tries_per_transport(tries)
                .with_retry_delay(Duration::from_millis(retry_delay_ms));
            if let Some(max) = max_attempts {
                policy = policy.with_max_attempts(max);
            }
            config = config.with_policy(policy);
            info!("Chatting with {}", config.base_url);

            let mut session = config.chat_session();
            match message {
                Some(message) => {
                    if let Some(reply) = session.submit(&message).await {
                        println!("{}", reply.content());
                    }
                }
                None => run_repl(&mut session).await?,
            }
        }

        Commands::Health { url } => {
            let config = match url {
                Some(url) => ClientConfig::new(url),
                None => ClientConfig::from_env(),
            };
            let report = check_connection(&config).await;
            let status = |ok: bool| if ok { "OK" } else { "FAIL" };
            println!("health:  {} ({})", status(report.health), config.health_url());
            println!("graphql: {} ({})", status(report.graphql), config.graphql_url());
            if !report.is_connected() {
                anyhow::bail!("{} is not fully reachable", config.base_url);
            }
            println!("{} is connected", config.base_url);
        }
    }

    Ok(())
}

async fn run_repl(session: &mut ChatSession) -> Result<()> {
    println!("Type a message, /clear to start over, /quit to leave.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear();
                println!("(cleared)");
            }
            input => {
                if let Some(reply) = session.submit(input).await {
                    println!("{}\n", reply.content());
                }
            }
        }
    }

    Ok(())
}
