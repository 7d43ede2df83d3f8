use crate::relay_harness::{
    Harness, RecordingChannel, SOURCE_CHANNEL, TARGET_CHANNEL, catalog, message,
};
use steam_link_relay::RelaySettings;

#[tokio::test]
async fn stats_on_empty_ledger_replies_with_text() {
    let server = catalog(&[], &[]).await;
    let h = Harness::with_target(&server);

    h.controller.handle_message(&message("A", "!stats")).await;

    assert_eq!(
        h.channel.texts_to(SOURCE_CHANNEL),
        vec!["No games have been shared yet.".to_string()]
    );
}

#[tokio::test]
async fn stats_ranks_games_in_source_channel() {
    let server = catalog(&["570", "730"], &[]).await;
    let h = Harness::with_target(&server);
    for (user, body) in [
        ("A", "https://store.steampowered.com/app/730"),
        ("B", "https://store.steampowered.com/app/570"),
        ("C", "https://store.steampowered.com/app/570/Dota_2"),
    ] {
        h.controller.handle_message(&message(user, body)).await;
    }

    h.controller.handle_message(&message("D", "!STATS")).await;

    let replies = h.channel.embeds_to(SOURCE_CHANNEL);
    assert_eq!(replies.len(), 1);
    let stats = &replies[0];
    assert_eq!(stats.title.as_deref(), Some("Steam Game Sharing Statistics"));
    assert_eq!(stats.fields[0].name, "1. Shared 2 times");
    assert!(stats.fields[0].value.contains("first shared by <@B>"));
    assert!(stats.fields[0].value.contains("/app/570/Dota_2"));
    assert_eq!(stats.fields[1].name, "2. Shared 1 times");

    let entries = h.controller.stats();
    assert_eq!(entries[0].identifier.as_str(), "570");
    assert_eq!(entries[1].identifier.as_str(), "730");
    // reports from the three shares only
    assert_eq!(h.channel.embeds_to(TARGET_CHANNEL).len(), 3);
}

#[tokio::test]
async fn help_lists_commands() {
    let server = catalog(&[], &[]).await;
    let h = Harness::with_target(&server);

    h.controller.handle_message(&message("A", "!help_steam")).await;

    let replies = h.channel.embeds_to(SOURCE_CHANNEL);
    assert_eq!(replies[0].title.as_deref(), Some("Steam Link Bot Help"));
    assert_eq!(replies[0].fields[0].name, "!stats");
}

#[tokio::test]
async fn custom_prefix_replaces_bang() {
    let server = catalog(&[], &[]).await;
    let settings = RelaySettings {
        target_channel_id: Some(TARGET_CHANNEL.to_string()),
        command_prefix: "?".to_string(),
    };
    let h = Harness::new(&server, RecordingChannel::new(), settings);

    h.controller.handle_message(&message("A", "!stats")).await;
    assert!(h.channel.sent().is_empty());

    h.controller.handle_message(&message("A", "?stats")).await;
    assert_eq!(h.channel.texts_to(SOURCE_CHANNEL).len(), 1);
}

#[tokio::test]
async fn command_and_link_in_one_message_both_handled() {
    let server = catalog(&["570"], &[]).await;
    let h = Harness::with_target(&server);

    h.controller
        .handle_message(&message(
            "A",
            "!stats https://store.steampowered.com/app/570",
        ))
        .await;

    assert_eq!(h.channel.texts_to(SOURCE_CHANNEL).len(), 1);
    assert_eq!(h.channel.embeds_to(TARGET_CHANNEL).len(), 1);
}
