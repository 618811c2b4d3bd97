#[cfg(test)]
#[path = "command_test.rs"]
mod tests;

use once_cell::sync::Lazy;
use regex::Regex;

static SUMMARIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^/sum(?:marize)?\s+(https?://.+)$").expect("static regex compile")
});
static SEARCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^/search\s+(.+)$").expect("static regex compile"));

/// What a line of user input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Chat { text: String },
    Summarize { url: String },
    Search { query: String },
}

impl Command {
    /// Classify raw input. Returns `None` for blank input, which is never sent.
    ///
    /// `/summarize` (or `/sum`) only counts when followed by an http(s) URL;
    /// anything else, including `/summarize not-a-url`, is plain chat.
    pub fn parse(input: &str) -> Option<Command> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(caps) = SUMMARIZE.captures(trimmed) {
            return Some(Command::Summarize {
                url: caps[1].trim().to_string(),
            });
        }

        if let Some(caps) = SEARCH.captures(trimmed) {
            let query = caps[1].trim();
            if !query.is_empty() {
                return Some(Command::Search {
                    query: query.to_string(),
                });
            }
        }

        Some(Command::Chat {
            text: trimmed.to_string(),
        })
    }
}
