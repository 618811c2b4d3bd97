use parley_core::Message;

#[derive(Debug, Clone)]
struct Entry {
    message: Message,
    // Friendly failure replies are shown but never sent back to the model
    failed: bool,
}

/// In-memory, append-only chat log for one session.
#[derive(Debug, Default, Clone)]
pub struct Conversation {
    entries: Vec<Entry>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.entries.push(Entry {
            message,
            failed: false,
        });
    }

    /// Record a reply that stands in for a failed request.
    pub fn push_failure(&mut self, message: Message) {
        self.entries.push(Entry {
            message,
            failed: true,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Messages before the most recent one, i.e. the history for the turn in
    /// flight, without failure replies.
    pub fn history(&self) -> Vec<Message> {
        let earlier = match self.entries.split_last() {
            Some((_, earlier)) => earlier,
            None => &[],
        };
        earlier
            .iter()
            .filter(|entry| !entry.failed)
            .map(|entry| entry.message.clone())
            .collect()
    }
}
