use serde::{Deserialize, Serialize};

/// Chat commands the relay answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Stats,
    Help,
}

impl Command {
    /// Command words as typed after the prefix, with their help text.
    pub const USAGE: [(&'static str, &'static str); 2] = [
        ("stats", "Show statistics about the most shared Steam games"),
        ("help_steam", "Show this help message"),
    ];
}
