//! Hand-written port fakes shared by the unit tests.

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;

use crate::{
    credentials::{RecordStore, StoreError, StoreResult},
    domain::Address,
    errors::Error,
    messaging::{
        port::{ChatClient, EditApi},
        types::{InboundMessage, OutboundEdit},
    },
    Result,
};

pub const KEY: &str = "a1b2c3d4e5f6g7h8i9j0k1l2m3n4o5p6";

/// Serves queued batches (or errors) from `poll_events`, then blocks forever.
/// Private messages are recorded in `sent`.
pub struct FakeChat {
    pub me: Address,
    batches: Mutex<VecDeque<Result<Vec<InboundMessage>>>>,
    pub sent: Mutex<Vec<(Address, String)>>,
}

impl FakeChat {
    pub fn new() -> Self {
        Self::scripted(Vec::new())
    }

    pub fn scripted(batches: Vec<Result<Vec<InboundMessage>>>) -> Self {
        Self {
            me: Address::from("kao-bot@example.com"),
            batches: Mutex::new(batches.into()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, t)| t.clone())
            .collect()
    }
}

#[async_trait]
impl ChatClient for FakeChat {
    fn own_address(&self) -> &Address {
        &self.me
    }
    async fn poll_events(&self) -> Result<Vec<InboundMessage>> {
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => std::future::pending().await,
        }
    }
    async fn send_private(&self, to: &Address, content: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.clone(), content.to_string()));
        Ok(())
    }
    async fn list_streams(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
    async fn subscribe(&self, _streams: &[String]) -> Result<()> {
        Ok(())
    }
}

/// Records every edit; answers 403 when `fail` is set.
#[derive(Default)]
pub struct FakeEdits {
    fail: bool,
    pub edits: Mutex<Vec<OutboundEdit>>,
}

impl FakeEdits {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl EditApi for FakeEdits {
    async fn edit(&self, edit: &OutboundEdit) -> Result<()> {
        self.edits.lock().unwrap().push(edit.clone());
        if self.fail {
            return Err(Error::EditApi {
                status: 403,
                body: "forbidden".to_string(),
            });
        }
        Ok(())
    }
}

/// Every call fails as if the database went away.
pub struct FailingRecords;

impl RecordStore for FailingRecords {
    fn select(&self, _address: &str) -> StoreResult<Option<String>> {
        Err(StoreError::Backend("disk I/O error".to_string()))
    }
    fn insert(&mut self, _address: &str, _secret: &str) -> StoreResult<()> {
        Err(StoreError::Backend("disk I/O error".to_string()))
    }
    fn update(&mut self, _address: &str, _secret: &str) -> StoreResult<usize> {
        Err(StoreError::Backend("disk I/O error".to_string()))
    }
    fn delete(&mut self, _address: &str) -> StoreResult<usize> {
        Err(StoreError::Backend("disk I/O error".to_string()))
    }
}
