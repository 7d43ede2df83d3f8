use crate::relay_harness::{BOT_ID, Harness, TARGET_CHANNEL, catalog, message};
use steam_link_relay::CatalogIdentifier;

const DOTA: &str = "https://store.steampowered.com/app/570";

#[tokio::test]
async fn own_messages_are_ignored() {
    let server = catalog(&["570"], &[]).await;
    let h = Harness::with_target(&server);

    let shared = h.controller.handle_message(&message(BOT_ID, DOTA)).await;

    assert!(shared.is_empty());
    assert!(h.ledger.is_empty());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn messages_in_target_channel_are_ignored() {
    let server = catalog(&["570"], &[]).await;
    let h = Harness::with_target(&server);
    let mut msg = message("A", &format!("!stats {DOTA}"));
    msg.channel_id = TARGET_CHANNEL.to_string();

    h.controller.handle_message(&msg).await;

    assert!(h.ledger.is_empty());
    assert!(h.channel.sent().is_empty());
}

#[tokio::test]
async fn other_bots_are_relayed() {
    let server = catalog(&["570"], &[]).await;
    let h = Harness::with_target(&server);
    let mut msg = message("42", DOTA);
    msg.author_is_bot = true;

    h.controller.handle_message(&msg).await;

    assert_eq!(h.ledger.count_for(&CatalogIdentifier::new("570")), 1);
}
