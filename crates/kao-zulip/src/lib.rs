//! Zulip adapter (reqwest).
//!
//! Implements the `kao-core` `ChatClient` and `EditApi` ports over the Zulip REST API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub mod router;
pub mod wire;

use kao_core::{
    config::{AccountCredentials, Config},
    domain::Address,
    errors::Error,
    messaging::{
        port::{ChatClient, EditApi},
        types::{InboundMessage, OutboundEdit},
    },
    Result,
};

use crate::wire::{ApiStatus, EventsResponse, RawEvent, RegisterResponse, StreamsResponse};

const ERROR_BODY_MAX: usize = 200;

#[derive(Clone, Debug)]
struct EventQueue {
    id: String,
    last_event_id: i64,
}

/// Bot-account client: event queue, private messages, stream discovery.
pub struct ZulipClient {
    http: reqwest::Client,
    api_base: String,
    bot: AccountCredentials,
    discovery: AccountCredentials,
    queue: Mutex<Option<EventQueue>>,
}

impl ZulipClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.http_timeout)
            .user_agent(concat!("kao/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::External(format!("http client build failed: {e}")))?;

        Ok(Self {
            http,
            api_base: cfg.api_base.clone(),
            bot: cfg.bot.clone(),
            discovery: cfg.discovery.clone(),
            queue: Mutex::new(None),
        })
    }

    /// Edit endpoint sharing this client's connection pool.
    pub fn edit_api(&self) -> ZulipEditApi {
        ZulipEditApi {
            http: self.http.clone(),
            api_base: self.api_base.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    fn as_bot(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.basic_auth(self.bot.address.as_str(), Some(&self.bot.api_key))
    }

    async fn register(&self) -> Result<EventQueue> {
        let resp = self
            .as_bot(self.http.post(self.url("register")))
            .form(&[
                ("event_types", r#"["message"]"#),
                ("apply_markdown", "false"),
            ])
            .send()
            .await
            .map_err(request_err)?;

        let reg: RegisterResponse = parse(resp, "register event queue").await?;
        info!(queue_id = %reg.queue_id, "event queue registered");
        Ok(EventQueue {
            id: reg.queue_id,
            last_event_id: reg.last_event_id,
        })
    }
}

#[async_trait]
impl ChatClient for ZulipClient {
    fn own_address(&self) -> &Address {
        &self.bot.address
    }

    async fn poll_events(&self) -> Result<Vec<InboundMessage>> {
        let mut queue = self.queue.lock().await;
        if queue.is_none() {
            *queue = Some(self.register().await?);
        }
        let Some(q) = queue.as_mut() else {
            return Ok(Vec::new());
        };

        let resp = self
            .as_bot(self.http.get(self.url("events")))
            .query(&[
                ("queue_id", q.id.clone()),
                ("last_event_id", q.last_event_id.to_string()),
            ])
            .send()
            .await
            .map_err(request_err)?;

        let status = resp.status();
        let body = resp.text().await.map_err(request_err)?;
        if !status.is_success() {
            let st: ApiStatus = serde_json::from_str(&body).unwrap_or_default();
            if st.code.as_deref() == Some("BAD_EVENT_QUEUE_ID") {
                info!(queue_id = %q.id, "event queue expired; re-registering");
                *queue = None;
                return Ok(Vec::new());
            }
            return Err(api_err(status, &body, "poll events"));
        }

        let events: EventsResponse = serde_json::from_str(&body)?;
        let mut out = Vec::new();
        for ev in events.events {
            q.last_event_id = q.last_event_id.max(ev.id);
            if let Some(msg) = RawEvent::into_inbound(ev) {
                out.push(msg);
            }
        }
        debug!(count = out.len(), last_event_id = q.last_event_id, "events polled");
        Ok(out)
    }

    async fn send_private(&self, to: &Address, content: &str) -> Result<()> {
        let resp = self
            .as_bot(self.http.post(self.url("messages")))
            .form(&[("type", "private"), ("to", to.as_str()), ("content", content)])
            .send()
            .await
            .map_err(request_err)?;

        let _: ApiStatus = parse(resp, "send private message").await?;
        Ok(())
    }

    async fn list_streams(&self) -> Result<Vec<String>> {
        let resp = self
            .http
            .get(self.url("streams"))
            .basic_auth(
                self.discovery.address.as_str(),
                Some(&self.discovery.api_key),
            )
            .send()
            .await
            .map_err(request_err)?;

        let streams: StreamsResponse = parse(resp, "list streams").await?;
        Ok(streams.streams.into_iter().map(|s| s.name).collect())
    }

    async fn subscribe(&self, streams: &[String]) -> Result<()> {
        let subs: Vec<serde_json::Value> = streams
            .iter()
            .map(|name| serde_json::json!({ "name": name }))
            .collect();
        let subs = serde_json::to_string(&subs)?;

        let resp = self
            .as_bot(self.http.post(self.url("users/me/subscriptions")))
            .form(&[("subscriptions", subs)])
            .send()
            .await
            .map_err(request_err)?;

        let _: ApiStatus = parse(resp, "subscribe to streams").await?;
        Ok(())
    }
}

/// `PATCH /messages/{id}`, authenticated as the message author.
#[derive(Clone, Debug)]
pub struct ZulipEditApi {
    http: reqwest::Client,
    api_base: String,
}

#[async_trait]
impl EditApi for ZulipEditApi {
    async fn edit(&self, edit: &OutboundEdit) -> Result<()> {
        let url = format!("{}/messages/{}", self.api_base, edit.message_id.0);
        let resp = self
            .http
            .patch(url)
            .basic_auth(
                edit.credential.address.as_str(),
                Some(edit.credential.secret.expose()),
            )
            .form(&[("content", edit.new_body.as_str())])
            .send()
            .await
            .map_err(request_err)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::EditApi {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }
        Ok(())
    }
}

fn request_err(e: reqwest::Error) -> Error {
    Error::External(format!("zulip request error: {e}"))
}

/// 401/403 mean the account is rejected; everything else is a fetch failure.
fn api_err(status: StatusCode, body: &str, what: &str) -> Error {
    let detail = serde_json::from_str::<ApiStatus>(body)
        .ok()
        .map(|st| st.msg)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| truncate(body));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::TransportAuth(format!("{what}: {status} {detail}"))
        }
        _ => Error::TransportFetch(format!("{what}: {status} {detail}")),
    }
}

async fn parse<T: DeserializeOwned>(resp: reqwest::Response, what: &str) -> Result<T> {
    let status = resp.status();
    let body = resp.text().await.map_err(request_err)?;
    if !status.is_success() {
        return Err(api_err(status, &body, what));
    }
    Ok(serde_json::from_str(&body)?)
}

fn truncate(s: &str) -> String {
    s.chars().take(ERROR_BODY_MAX).collect()
}
