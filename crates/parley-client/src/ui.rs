//! Terminal rendering of the chat: banner, bubbles and a loading indicator.

use crossterm::style::Stylize;
use parley_core::{Message, Role};
use std::io::Write;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const BANNER_TITLE: &str = "Chat Interaction";

pub fn banner_text() -> String {
    [
        "Interact with the AI in real-time. Simply type your message and receive an immediate response.",
        "Special commands:",
        "- /summarize [url] - Summarize content from a URL",
        "- /search [query] - Search for the latest information on a topic",
        "",
        "Type your message, or use /summarize [url]",
        "Type /help to see this again, /quit to leave.",
    ]
    .join("\n")
}

pub fn print_banner() {
    println!("{}", BANNER_TITLE.bold().cyan());
    println!("{}", banner_text().dark_grey());
    println!();
}

pub fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Assistant",
        Role::System => "System",
    }
}

/// Plain-text rendering of one bubble: the speaker line, then the indented body.
pub fn bubble_text(message: &Message) -> String {
    let body = message
        .content
        .lines()
        .map(|line| format!("  {}", line.replace('\t', "  ")))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n{}", speaker(message.role), body)
}

pub fn print_bubble(message: &Message) {
    let text = bubble_text(message);
    let (header, body) = text.split_once('\n').unwrap_or((text.as_str(), ""));
    let header = match message.role {
        Role::User => header.bold().green(),
        Role::Assistant => header.bold().blue(),
        Role::System => header.bold().yellow(),
    };
    println!("{}", header);
    if !body.is_empty() {
        println!("{}", body);
    }
    println!();
}

pub fn prompt() {
    print!("{} ", ">".bold().cyan());
    let _ = std::io::stdout().flush();
}

/// Animated "thinking" dots shown while a request is in flight.
pub struct LoadingIndicator {
    handle: JoinHandle<()>,
}

impl LoadingIndicator {
    pub fn start() -> Self {
        let handle = tokio::spawn(async {
            let mut dots = 0usize;
            loop {
                print!("\r{}{:<3}", "Thinking".dark_grey(), ".".repeat(dots));
                let _ = std::io::stdout().flush();
                dots = (dots + 1) % 4;
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
        });
        Self { handle }
    }

    pub fn stop(self) {
        self.handle.abort();
        print!("\r{:<12}\r", "");
        let _ = std::io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bubble_text() {
        let message = Message::assistant("line one\n\tline two");
        assert_eq!(bubble_text(&message), "Assistant\n  line one\n    line two");

        let message = Message::user("hi");
        assert_eq!(bubble_text(&message), "You\n  hi");
    }

    #[test]
    fn test_banner_lists_commands() {
        let text = banner_text();
        assert!(text.contains("/summarize [url]"));
        assert!(text.contains("/search [query]"));
    }
}
