//! Rendering of share reports, stats and help as embeds.

use super::controller::SharedLink;
use crate::commands::Command;
use crate::ledger::ShareLedger;
use crate::links::CatalogIdentifier;
use crate::transport::channels::embed::{Embed, MAX_EMBED_FIELDS};
use crate::transport::channels::traits::InboundMessage;
use serde::Serialize;

/// Steam's dark blue.
pub const STEAM_COLOR: u32 = 0x1b_28_38;

/// Fields after the per-link counts: jump link and source channel.
const CONTEXT_FIELDS: usize = 2;

/// Entries shown by the stats command.
pub const STATS_LIMIT: usize = 10;

pub const NO_SHARES_YET: &str = "No games have been shared yet.";

/// One ranked line of the stats query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsEntry {
    pub rank: usize,
    pub identifier: CatalogIdentifier,
    pub canonical_url: String,
    pub share_count: u64,
    pub first_sharer_id: Option<String>,
    pub unique_sharers: usize,
}

pub fn stats_entries(ledger: &ShareLedger, limit: usize) -> Vec<StatsEntry> {
    ledger
        .top_n(limit)
        .into_iter()
        .enumerate()
        .map(|(i, (identifier, record))| StatsEntry {
            rank: i + 1,
            unique_sharers: record.unique_sharers(),
            identifier,
            canonical_url: record.canonical_url,
            share_count: record.share_count,
            first_sharer_id: record.first_sharer_id,
        })
        .collect()
}

pub fn share_report(message: &InboundMessage, shared: &[SharedLink]) -> Embed {
    let description = match shared {
        [single] => format!("**Link:** {}", single.url),
        _ => {
            let lines: Vec<String> = shared
                .iter()
                .map(|link| format!("• {}", link.url))
                .collect();
            format!("**Links:**\n{}", lines.join("\n"))
        }
    };

    let mut embed = Embed::new("Steam Game Shared")
        .description(description)
        .color(STEAM_COLOR)
        .author(
            format!("Shared by {}", message.author_name),
            message.author_avatar_url.clone(),
        );

    for link in shared.iter().take(MAX_EMBED_FIELDS - CONTEXT_FIELDS) {
        let name = if shared.len() == 1 {
            "Times Shared".to_string()
        } else {
            format!("Times Shared · app {}", link.identifier)
        };
        embed = embed.field(name, times_shared(link.share_count, link.unique_sharers), true);
    }

    if let Some(permalink) = &message.permalink {
        embed = embed.field("Original Message", format!("[Jump to message]({permalink})"), true);
    }

    embed
        .field("Channel", format!("<#{}>", message.channel_id), true)
        .timestamp(message.timestamp)
        .footer("Steam Link Relay")
}

fn times_shared(count: u64, unique_sharers: usize) -> String {
    match unique_sharers {
        0 | 1 => count.to_string(),
        n => format!("{count} ({n} people)"),
    }
}

pub fn stats_embed(entries: &[StatsEntry], total_shares: u64) -> Embed {
    let mut embed = Embed::new("Steam Game Sharing Statistics")
        .description(format!(
            "Most frequently shared Steam games ({total_shares} shares in total):"
        ))
        .color(STEAM_COLOR);

    for entry in entries {
        let first = entry
            .first_sharer_id
            .as_deref()
            .map(|id| format!(" · first shared by <@{id}>"))
            .unwrap_or_default();
        embed = embed.field(
            format!("{}. Shared {} times", entry.rank, entry.share_count),
            format!("[Steam Link]({}){first}", entry.canonical_url),
            false,
        );
    }

    embed
}

pub fn help_embed(prefix: &str) -> Embed {
    Command::USAGE.iter().fold(
        Embed::new("Steam Link Bot Help")
            .description(
                "This bot detects Steam game links and shares them in a designated channel.",
            )
            .color(STEAM_COLOR),
        |embed, (word, help)| embed.field(format!("{prefix}{word}"), *help, false),
    )
}
