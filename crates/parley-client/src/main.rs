use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use parley_client::ui::{self, LoadingIndicator};
use parley_client::{ChatDispatcher, Command, Conversation, HttpChatBackend};
use parley_core::Message;
use std::fs::OpenOptions;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(about = "Terminal chat with URL summaries and web search")]
#[command(version)]
struct Cli {
    /// Base URL of the Parley server
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server_url: String,

    /// Log level, written to parley.log
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Seconds to wait for each server reply
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// Do not send earlier turns with chat messages
    #[arg(long)]
    no_history: bool,

    /// Send a single message, print the reply and exit
    #[arg(long)]
    once: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to a file so they never interleave with the conversation
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("parley.log")
        .context("Failed to create parley.log file")?;
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(LevelFilter::Info))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let backend = HttpChatBackend::new(&cli.server_url)
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    if let Err(e) = backend.health_check().await {
        log::warn!("Server at {} is not healthy: {:#}", backend.base_url(), e);
    }
    let dispatcher = ChatDispatcher::new(backend).with_history(!cli.no_history);

    if let Some(text) = cli.once {
        let Some(command) = Command::parse(&text) else {
            return Ok(());
        };
        let reply = dispatcher.dispatch(&command, &[]).await;
        println!("{}", reply.content);
        return Ok(());
    }

    ui::print_banner();
    let mut conversation = Conversation::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        ui::prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/help" => {
                ui::print_banner();
                continue;
            }
            _ => {}
        }

        let Some(command) = Command::parse(&line) else {
            continue;
        };

        let user_message = Message::user(line.trim());
        ui::print_bubble(&user_message);
        conversation.push(user_message);

        let loading = LoadingIndicator::start();
        let outcome = dispatcher.try_dispatch(&command, &conversation.history()).await;
        loading.stop();

        match outcome {
            Ok(reply) => {
                ui::print_bubble(&reply);
                conversation.push(reply);
            }
            Err(failure) => {
                ui::print_bubble(&failure);
                conversation.push_failure(failure);
            }
        }
    }

    log::info!("Session ended after {} messages", conversation.len());
    Ok(())
}
