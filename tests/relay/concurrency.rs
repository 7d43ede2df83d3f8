use std::sync::Arc;
use std::time::Duration;

use crate::relay_harness::{Harness, SOURCE_CHANNEL, Sent, TARGET_CHANNEL, catalog, message};
use serde_json::json;
use steam_link_relay::CatalogIdentifier;
use steam_link_relay::app::run::relay_loop;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOTA: &str = "https://store.steampowered.com/app/570/Dota_2/";

#[tokio::test]
async fn stats_reply_is_not_held_behind_a_slow_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/appdetails"))
        .and(query_param("appids", "570"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "570": { "success": true } }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    let h = Harness::with_target(&server);

    let (tx, rx) = mpsc::channel(8);
    let relay = tokio::spawn(relay_loop(rx, Arc::clone(&h.controller)));
    tx.send(message("A", DOTA)).await.unwrap();
    tx.send(message("B", "!stats")).await.unwrap();
    drop(tx);

    let sent = h.wait_for_sends(2, Duration::from_secs(5)).await;
    relay.await.unwrap();

    match &sent[0] {
        Sent::Text { channel, body } => {
            assert_eq!(channel, SOURCE_CHANNEL);
            assert_eq!(body, "No games have been shared yet.");
        }
        other => panic!("stats reply should come first, got {other:?}"),
    }
    match &sent[1] {
        Sent::Embed { channel, embed } => {
            assert_eq!(channel, TARGET_CHANNEL);
            assert_eq!(embed.title.as_deref(), Some("Steam Game Shared"));
        }
        other => panic!("expected the share report, got {other:?}"),
    }
}

#[tokio::test]
async fn concurrent_shares_report_distinct_counts() {
    const SHARERS: u64 = 20;
    let server = catalog(&["570"], &[]).await;
    let h = Harness::with_target(&server);

    let (tx, rx) = mpsc::channel(32);
    let relay = tokio::spawn(relay_loop(rx, Arc::clone(&h.controller)));
    for user in 0..SHARERS {
        tx.send(message(&format!("u{user}"), DOTA)).await.unwrap();
    }
    drop(tx);

    h.wait_for_sends(SHARERS as usize, Duration::from_secs(5)).await;
    relay.await.unwrap();

    let mut counts: Vec<String> = h
        .channel
        .embeds_to(TARGET_CHANNEL)
        .iter()
        .map(|report| report.fields[0].value.clone())
        .collect();
    counts.sort_by_key(|value| {
        value
            .split_whitespace()
            .next()
            .and_then(|n| n.parse::<u64>().ok())
    });

    let expected: Vec<String> = (1..=SHARERS)
        .map(|n| match n {
            1 => "1".to_string(),
            n => format!("{n} ({n} people)"),
        })
        .collect();
    assert_eq!(counts, expected);
    assert_eq!(h.ledger.count_for(&CatalogIdentifier::new("570")), SHARERS);
}
