//! Terminal chat client for a Parley server.
//!
//! Input lines are classified into chat, `/summarize` and `/search` commands,
//! routed to the matching server endpoint and rendered back as assistant
//! messages. Failures never escape the dispatcher; they become friendly replies.

pub mod backend;
pub mod command;
pub mod conversation;
pub mod dispatcher;
pub mod ui;

pub use backend::{ChatBackend, HttpChatBackend};
pub use command::Command;
pub use conversation::Conversation;
pub use dispatcher::{format_search, format_search_result, format_summary, ChatDispatcher};
