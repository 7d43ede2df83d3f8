pub mod discord;
pub mod embed;
pub mod runtime;
pub mod traits;

pub use discord::DiscordChannel;
pub use embed::{Embed, EmbedAuthor, EmbedField, EmbedFooter};
pub use traits::{Channel, InboundMessage};
