#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod tests;

use parley_core::{Message, SearchResult};

use crate::backend::ChatBackend;
use crate::command::Command;

pub const CHAT_FAILURE: &str = "An error occurred while sending your message.";

pub fn summarize_failure(url: &str) -> String {
    format!(
        "Failed to summarize the URL: {}. Please check if the URL is valid and try again.",
        url
    )
}

pub fn search_failure(query: &str) -> String {
    format!("Failed to search for \"{}\". Please try again later.", query)
}

/// Routes a classified command to the backend and always yields an assistant message.
pub struct ChatDispatcher<B: ChatBackend> {
    backend: B,
    send_history: bool,
}

impl<B: ChatBackend> ChatDispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            send_history: true,
        }
    }

    /// Whether plain chat sends the earlier conversation along.
    pub fn with_history(mut self, send_history: bool) -> Self {
        self.send_history = send_history;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// `history` is the conversation before this command's user message.
    ///
    /// Always yields an assistant message; failures become the fixed
    /// friendly replies.
    pub async fn dispatch(&self, command: &Command, history: &[Message]) -> Message {
        self.try_dispatch(command, history)
            .await
            .unwrap_or_else(|failure| failure)
    }

    /// Like [`dispatch`](Self::dispatch), but a failure reply comes back as `Err`
    /// so callers can keep it out of later history.
    pub async fn try_dispatch(
        &self,
        command: &Command,
        history: &[Message],
    ) -> Result<Message, Message> {
        match command {
            Command::Chat { text } => {
                let history: &[Message] = if self.send_history { history } else { &[] };
                match self.backend.send_text(text, history).await {
                    Ok(reply) => Ok(Message::assistant(reply.content)),
                    Err(e) => {
                        log::error!("Error sending message: {:#}", e);
                        Err(Message::assistant(CHAT_FAILURE))
                    }
                }
            }
            Command::Summarize { url } => match self.backend.summarize(url).await {
                Ok(summary) => Ok(Message::assistant(format_summary(url, &summary.content))),
                Err(e) => {
                    log::error!("Error summarizing URL {}: {:#}", url, e);
                    Err(Message::assistant(summarize_failure(url)))
                }
            },
            Command::Search { query } => match self.backend.search(query).await {
                Ok(reply) => Ok(Message::assistant(match &reply.search_results {
                    Some(results) => format_search(query, results, &reply.content),
                    None => reply.content,
                })),
                Err(e) => {
                    log::error!("Error searching for {}: {:#}", query, e);
                    Err(Message::assistant(search_failure(query)))
                }
            },
        }
    }
}

pub fn format_summary(url: &str, content: &str) -> String {
    format!("**Summary of [{}]({})**\n\n{}", url, url, content)
}

pub fn format_search_result(result: &SearchResult) -> String {
    format!(
        "### [{}]({})\n**Source:** {} | **Published:** {}\n\n{}",
        result.title,
        result.url,
        result.source,
        result.published_at.as_deref().unwrap_or("Unknown"),
        result.description
    )
}

pub fn format_search(query: &str, results: &[SearchResult], analysis: &str) -> String {
    let listing = results
        .iter()
        .map(format_search_result)
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    format!(
        "**Search Results for \"{}\"**\n\n{}\n\n**Analysis:**\n{}",
        query, listing, analysis
    )
}
