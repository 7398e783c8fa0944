use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Assistant text shown when a dispatch fails for any reason.
pub const DISPATCH_ERROR_TEXT: &str = "Error contacting AI";

/// Assistant text shown when a backend answers without a reply.
pub const NO_RESPONSE_TEXT: &str = "No response";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnAuthor {
    User,
    Assistant,
}

impl TurnAuthor {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnAuthor::User => "user",
            TurnAuthor::Assistant => "assistant",
        }
    }

    pub fn is_assistant(self) -> bool {
        self == TurnAuthor::Assistant
    }
}

impl std::fmt::Display for TurnAuthor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in the conversation. Never changes once built.
///
/// `time` is for display only; position in the timeline is what orders turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    author: TurnAuthor,
    text: String,
    time: String,
}

impl ChatTurn {
    pub fn new(author: TurnAuthor, text: impl Into<String>) -> Self {
        Self::stamped(author, text, Local::now())
    }

    pub fn stamped(author: TurnAuthor, text: impl Into<String>, at: DateTime<Local>) -> Self {
        Self {
            author,
            text: text.into(),
            time: display_time(&at),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(TurnAuthor::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(TurnAuthor::Assistant, text)
    }

    pub fn author(&self) -> TurnAuthor {
        self.author
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn time(&self) -> &str {
        &self.time
    }
}

/// Wall-clock label like `9:05 PM`.
pub fn display_time(at: &DateTime<Local>) -> String {
    at.format("%-I:%M %p").to_string()
}

/// Append-only, in-memory conversation log for one dashboard session.
#[derive(Debug, Default, Clone)]
pub struct ConversationTimeline {
    turns: Vec<ChatTurn>,
}

impl ConversationTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// The only mutator. Returns the index the turn landed at.
    pub fn append(&mut self, turn: ChatTurn) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    pub fn count_by(&self, author: TurnAuthor) -> usize {
        self.turns
            .iter()
            .filter(|turn| turn.author == author)
            .count()
    }
}
