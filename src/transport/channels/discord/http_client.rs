use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Method, Response, StatusCode, header::HeaderMap};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::time::{Instant, sleep};

use super::types::API_BASE;
use crate::transport::channels::embed::Embed;

const MAX_RATE_LIMIT_RETRIES: u8 = 3;
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct GatewayBot {
    url: String,
}

#[derive(Debug, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    pub name: Option<String>,
}

/// Windows during which requests must hold off, per route and globally.
#[derive(Debug, Default)]
struct RateLimits {
    global_until: Option<Instant>,
    routes: HashMap<String, Instant>,
}

impl RateLimits {
    /// How long a request on `route` has to wait at `now`.
    fn wait_for(&self, route: &str, now: Instant) -> Option<Duration> {
        let until = match (self.global_until, self.routes.get(route).copied()) {
            (Some(global), Some(local)) => global.max(local),
            (global, local) => global.or(local)?,
        };
        (until > now).then(|| until - now)
    }

    /// Track the bucket headers of a response; an exhausted bucket blocks its route.
    fn observe(&mut self, route: &str, headers: &HeaderMap, now: Instant) {
        let remaining = header_value::<u32>(headers, "X-RateLimit-Remaining");
        let reset_after = header_value::<f64>(headers, "X-RateLimit-Reset-After");
        match (remaining, reset_after) {
            (Some(0), Some(secs)) => {
                self.routes.insert(route.to_string(), now + seconds(secs));
            }
            (Some(_), _) => {
                self.routes.remove(route);
            }
            _ => {}
        }
    }

    fn throttle(&mut self, route: &str, global: bool, retry_after: Duration, now: Instant) {
        let until = now + retry_after;
        if global {
            self.global_until = Some(until);
        } else {
            self.routes.insert(route.to_string(), until);
        }
    }
}

/// Discord REST client; waits out rate limits and retries 429s.
pub struct DiscordHttpClient {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
    limits: Mutex<RateLimits>,
}

impl DiscordHttpClient {
    #[must_use]
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self::with_api_base(API_BASE, bot_token)
    }

    #[must_use]
    pub fn with_api_base(api_base: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            limits: Mutex::new(RateLimits::default()),
        }
    }

    pub async fn send_message(&self, channel_id: &str, content: &str) -> Result<()> {
        self.post_message(channel_id, json!({ "content": content }))
            .await
            .context("send Discord message")
    }

    pub async fn send_embed(&self, channel_id: &str, embed: &Embed) -> Result<()> {
        self.post_message(channel_id, json!({ "embeds": [embed] }))
            .await
            .context("send Discord embed")
    }

    pub async fn get_channel(&self, channel_id: &str) -> Result<ChannelInfo> {
        let response = self
            .request(Method::GET, &format!("/channels/{channel_id}"), None)
            .await
            .context("fetch Discord channel")?;
        response.json().await.context("parse Discord channel JSON")
    }

    /// Websocket URL recommended for this bot.
    pub async fn gateway_url(&self) -> Result<String> {
        let response = self
            .request(Method::GET, "/gateway/bot", None)
            .await
            .context("fetch Discord gateway URL")?;
        let bot: GatewayBot = response
            .json()
            .await
            .context("parse Discord gateway bot JSON")?;
        Ok(bot.url)
    }

    async fn post_message(&self, channel_id: &str, body: Value) -> Result<()> {
        let route = format!("/channels/{channel_id}/messages");
        self.request(Method::POST, &route, Some(body)).await?;
        Ok(())
    }

    async fn request(&self, method: Method, route: &str, body: Option<Value>) -> Result<Response> {
        let url = format!("{}{route}", self.api_base);
        let bucket = bucket_key(route);

        for attempt in 0..=MAX_RATE_LIMIT_RETRIES {
            let wait = self.limits().wait_for(&bucket, Instant::now());
            if let Some(wait) = wait {
                tracing::debug!(route = %bucket, ?wait, "Discord rate limit; waiting");
                sleep(wait).await;
            }

            let mut builder = self
                .client
                .request(method.clone(), &url)
                .header("Authorization", format!("Bot {}", self.bot_token));
            if let Some(payload) = &body {
                builder = builder.json(payload);
            }
            let response = builder
                .send()
                .await
                .with_context(|| format!("send Discord request {method} {route}"))?;

            self.limits()
                .observe(&bucket, response.headers(), Instant::now());

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt == MAX_RATE_LIMIT_RETRIES {
                    break;
                }
                let headers = response.headers();
                let retry_after = header_value::<f64>(headers, "Retry-After")
                    .map_or(DEFAULT_RETRY_AFTER, seconds);
                let global = is_global_limit(headers);
                tracing::warn!(route = %bucket, global, ?retry_after, "Discord returned 429");
                self.limits()
                    .throttle(&bucket, global, retry_after, Instant::now());
                continue;
            }

            if !status.is_success() {
                let body_text = response
                    .text()
                    .await
                    .unwrap_or_else(|error| format!("<failed to read response body: {error}>"));
                anyhow::bail!("Discord request {method} {route} failed ({status}): {body_text}");
            }

            return Ok(response);
        }

        anyhow::bail!("Discord request {method} {route} gave up after repeated 429s")
    }

    fn limits(&self) -> std::sync::MutexGuard<'_, RateLimits> {
        self.limits.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.parse().ok()
}

fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or_default()
}

fn is_global_limit(headers: &HeaderMap) -> bool {
    headers
        .get("X-RateLimit-Global")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

/// Route with numeric ids collapsed, e.g. `/channels/{id}/messages`.
fn bucket_key(route: &str) -> String {
    let segments: Vec<&str> = route
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if segment.bytes().all(|b| b.is_ascii_digit()) {
                "{id}"
            } else {
                segment
            }
        })
        .collect();
    format!("/{}", segments.join("/"))
}
