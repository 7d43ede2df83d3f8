use crate::relay_harness::{
    Harness, RecordingChannel, SOURCE_CHANNEL, TARGET_CHANNEL, catalog, message,
    target_settings,
};
use serde_json::json;
use steam_link_relay::{CatalogIdentifier, RelaySettings};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOTA: &str = "https://store.steampowered.com/app/570/Dota_2/";
const CS: &str = "https://store.steampowered.com/app/730";

#[tokio::test]
async fn valid_link_is_counted_and_reported_to_target() {
    let server = catalog(&["570"], &[]).await;
    let h = Harness::with_target(&server);

    let shared = h
        .controller
        .handle_message(&message("A", &format!("Check out {DOTA} it's great!")))
        .await;

    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].url, DOTA);
    assert_eq!(h.ledger.count_for(&CatalogIdentifier::new("570")), 1);

    let reports = h.channel.embeds_to(TARGET_CHANNEL);
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.title.as_deref(), Some("Steam Game Shared"));
    assert_eq!(
        report.description.as_deref(),
        Some("**Link:** https://store.steampowered.com/app/570/Dota_2/")
    );
    assert_eq!(report.author.as_ref().unwrap().name, "Shared by user-A");
    assert_eq!(report.fields[0].name, "Times Shared");
    assert_eq!(report.fields[0].value, "1");
    assert!(
        report
            .fields
            .iter()
            .any(|f| f.value == format!("<#{SOURCE_CHANNEL}>"))
    );
    assert!(h.channel.embeds_to(SOURCE_CHANNEL).is_empty());
}

#[tokio::test]
async fn second_sharer_increments_count() {
    let server = catalog(&["570"], &[]).await;
    let h = Harness::with_target(&server);

    h.controller.handle_message(&message("A", DOTA)).await;
    h.controller
        .handle_message(&message("B", "https://store.steampowered.com/app/570"))
        .await;

    let id = CatalogIdentifier::new("570");
    assert_eq!(h.ledger.count_for(&id), 2);
    assert_eq!(h.ledger.unique_sharers(&id), 2);
    let record = h.ledger.record(&id).unwrap();
    assert_eq!(record.first_sharer_id.as_deref(), Some("A"));

    let reports = h.channel.embeds_to(TARGET_CHANNEL);
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1].fields[0].value, "2 (2 people)");
}

#[tokio::test]
async fn repeated_link_in_one_message_counts_each_occurrence() {
    let server = catalog(&["730"], &[]).await;
    let h = Harness::with_target(&server);

    let shared = h
        .controller
        .handle_message(&message("A", &format!("{CS} and again {CS}")))
        .await;

    assert_eq!(shared.len(), 2);
    assert_eq!(shared[1].share_count, 2);
    assert_eq!(h.ledger.count_for(&CatalogIdentifier::new("730")), 2);
    assert_eq!(h.channel.embeds_to(TARGET_CHANNEL).len(), 1);
}

#[tokio::test]
async fn several_games_share_one_report_in_message_order() {
    let server = catalog(&["570", "730"], &[]).await;
    let h = Harness::with_target(&server);

    h.controller
        .handle_message(&message("A", &format!("{CS} then {DOTA}")))
        .await;

    let reports = h.channel.embeds_to(TARGET_CHANNEL);
    assert_eq!(reports.len(), 1);
    let names: Vec<_> = reports[0]
        .fields
        .iter()
        .take(2)
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Times Shared · app 730", "Times Shared · app 570"]
    );
}

#[tokio::test]
async fn unlisted_game_is_not_counted() {
    let server = catalog(&[], &["1"]).await;
    let h = Harness::with_target(&server);

    let shared = h
        .controller
        .handle_message(&message("A", "https://store.steampowered.com/app/1"))
        .await;

    assert!(shared.is_empty());
    assert!(h.ledger.is_empty());
    assert!(h.channel.sent().is_empty());
}

#[tokio::test]
async fn only_listed_links_of_a_mixed_message_are_reported() {
    let server = catalog(&["570"], &["1"]).await;
    let h = Harness::with_target(&server);

    let shared = h
        .controller
        .handle_message(&message(
            "A",
            &format!("https://store.steampowered.com/app/1 {DOTA}"),
        ))
        .await;

    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].identifier.as_str(), "570");
    assert_eq!(h.ledger.len(), 1);
}

#[tokio::test]
async fn unreadable_catalog_answer_still_counts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    let h = Harness::with_target(&server);

    h.controller.handle_message(&message("A", DOTA)).await;

    assert_eq!(h.ledger.count_for(&CatalogIdentifier::new("570")), 1);
    assert_eq!(h.channel.embeds_to(TARGET_CHANNEL).len(), 1);
}

#[tokio::test]
async fn catalog_error_status_rejects_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let h = Harness::with_target(&server);

    h.controller.handle_message(&message("A", DOTA)).await;

    assert!(h.ledger.is_empty());
}

#[tokio::test]
async fn failed_dispatch_keeps_the_count() {
    let server = catalog(&["570"], &[]).await;
    let h = Harness::new(&server, RecordingChannel::failing(), target_settings());

    let shared = h.controller.handle_message(&message("A", DOTA)).await;

    assert_eq!(shared.len(), 1);
    assert_eq!(h.ledger.count_for(&CatalogIdentifier::new("570")), 1);
    assert!(h.channel.sent().is_empty());
}

#[tokio::test]
async fn missing_target_counts_without_reporting() {
    let server = catalog(&["570"], &[]).await;
    let h = Harness::new(&server, RecordingChannel::new(), RelaySettings::default());

    h.controller.handle_message(&message("A", DOTA)).await;

    assert_eq!(h.ledger.count_for(&CatalogIdentifier::new("570")), 1);
    assert!(h.channel.sent().is_empty());
}

#[tokio::test]
async fn text_without_store_links_never_reaches_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    let h = Harness::with_target(&server);

    for body in [
        "no links here",
        "https://steamcommunity.com/app/570",
        "https://store.steampowered.com/sub/570",
    ] {
        assert!(h.controller.handle_message(&message("A", body)).await.is_empty());
    }
    assert!(h.channel.sent().is_empty());
}
