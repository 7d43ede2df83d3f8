use super::report::{self, NO_SHARES_YET, STATS_LIMIT, StatsEntry};
use crate::commands::{Command, parse_command};
use crate::config::{Config, DEFAULT_COMMAND_PREFIX};
use crate::ledger::ShareLedger;
use crate::links::{CatalogIdentifier, LinkValidator, extract_links, identifier_of};
use crate::transport::channels::traits::{Channel, InboundMessage};
use std::sync::Arc;

/// Where reports go and how commands are recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub target_channel_id: Option<String>,
    pub command_prefix: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            target_channel_id: None,
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
        }
    }
}

impl RelaySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            target_channel_id: config.target_channel().map(str::to_string),
            command_prefix: config.command_prefix.clone(),
        }
    }
}

/// A link that passed validation and was counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedLink {
    pub url: String,
    pub identifier: CatalogIdentifier,
    pub share_count: u64,
    pub unique_sharers: usize,
}

/// Per-message orchestration: commands, extraction, validation, counting
/// and the report to the target channel.
pub struct RelayController {
    channel: Arc<dyn Channel>,
    validator: Arc<LinkValidator>,
    ledger: Arc<ShareLedger>,
    settings: RelaySettings,
}

impl RelayController {
    pub fn new(
        channel: Arc<dyn Channel>,
        validator: Arc<LinkValidator>,
        ledger: Arc<ShareLedger>,
        settings: RelaySettings,
    ) -> Self {
        Self {
            channel,
            validator,
            ledger,
            settings,
        }
    }

    /// Handle one inbound message. Returns the links that were counted.
    ///
    /// Never fails: catalog and dispatch problems are logged and the ledger
    /// keeps whatever was already recorded.
    pub async fn handle_message(&self, message: &InboundMessage) -> Vec<SharedLink> {
        if self.is_own_message(message) {
            return Vec::new();
        }
        if self.is_target_channel(&message.channel_id) {
            tracing::trace!(channel = %message.channel_id, "ignoring message in target channel");
            return Vec::new();
        }

        if let Some(command) = parse_command(&message.body, &self.settings.command_prefix) {
            self.answer(command, &message.channel_id).await;
        }

        let shared = self.count_links(message).await;
        if !shared.is_empty() {
            self.dispatch_report(message, &shared).await;
        }
        shared
    }

    /// Ranked entries for the stats query.
    pub fn stats(&self) -> Vec<StatsEntry> {
        report::stats_entries(&self.ledger, STATS_LIMIT)
    }

    pub async fn answer(&self, command: Command, reply_channel: &str) {
        let result = match command {
            Command::Stats => {
                let entries = self.stats();
                if entries.is_empty() {
                    self.channel.send(NO_SHARES_YET, reply_channel).await
                } else {
                    let embed = report::stats_embed(&entries, self.ledger.total_shares());
                    self.channel.send_embed(&embed, reply_channel).await
                }
            }
            Command::Help => {
                let embed = report::help_embed(&self.settings.command_prefix);
                self.channel.send_embed(&embed, reply_channel).await
            }
        };

        if let Err(e) = result {
            tracing::error!(?command, channel = reply_channel, "failed to answer command: {e:#}");
        }
    }

    async fn count_links(&self, message: &InboundMessage) -> Vec<SharedLink> {
        let urls = extract_links(&message.body);
        if urls.is_empty() {
            return Vec::new();
        }
        tracing::info!(
            author = %message.author_name,
            channel = %message.channel_id,
            links = urls.len(),
            "found store links"
        );

        let mut shared = Vec::new();
        for url in urls {
            if !self.validator.validate(&url).await {
                tracing::info!(%url, "link rejected by catalog check");
                continue;
            }
            let Some(identifier) = identifier_of(&url) else {
                continue;
            };
            let Some(tally) = self.ledger.record_share(&identifier, &url, &message.author_id)
            else {
                continue;
            };
            tracing::info!(
                %url,
                app_id = %identifier,
                share_count = tally.share_count,
                "counted share"
            );

            shared.push(SharedLink {
                url,
                identifier,
                share_count: tally.share_count,
                unique_sharers: tally.unique_sharers,
            });
        }
        shared
    }

    async fn dispatch_report(&self, message: &InboundMessage, shared: &[SharedLink]) {
        let Some(target) = self.settings.target_channel_id.as_deref() else {
            tracing::error!("no target channel configured; share counted but not relayed");
            return;
        };

        let embed = report::share_report(message, shared);
        match self.channel.send_embed(&embed, target).await {
            Ok(()) => tracing::info!(target, links = shared.len(), "relayed share report"),
            Err(e) => tracing::error!(target, "failed to relay share report: {e:#}"),
        }
    }

    fn is_own_message(&self, message: &InboundMessage) -> bool {
        self.channel
            .self_id()
            .is_some_and(|id| id == message.author_id)
    }

    fn is_target_channel(&self, channel_id: &str) -> bool {
        self.settings.target_channel_id.as_deref() == Some(channel_id)
    }
}
