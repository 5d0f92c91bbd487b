//! Conference operations.

use serde_json::Value;
use uuid::Uuid;

use coherent_core::cache::Cache;
use coherent_core::collection::CollectionOp;
use coherent_core::entity::conference::{
    self, CONFBRIDGE_ID, CONFERENCECALL_IDS, DATA, DETAIL, NAME, RECORDING_ID, RECORDING_IDS,
    STATUS, TIMEOUT, TRANSCRIBE_ID, TRANSCRIBE_IDS,
};
use coherent_core::entity::{enum_to_text, Conference, ConferenceStatus};
use coherent_core::storage::{Result, Store};

use super::CachedRepository;

pub type ConferenceRepository<S, C> = CachedRepository<Conference, S, C>;

impl<S, C> CachedRepository<Conference, S, C>
where
    S: Store + ?Sized,
    C: Cache + ?Sized,
{
    /// Gets the alive conference running on a confbridge.
    pub async fn get_by_confbridge(&self, confbridge_id: Uuid) -> Result<Conference> {
        self.get_by(CONFBRIDGE_ID, confbridge_id).await
    }

    pub async fn update_basic_info(
        &self,
        id: Uuid,
        name: &str,
        detail: &str,
        timeout: i64,
    ) -> Result<()> {
        self.update(
            id,
            vec![
                (NAME, name.into()),
                (DETAIL, detail.into()),
                (TIMEOUT, timeout.into()),
            ],
        )
        .await
    }

    pub async fn set_status(&self, id: Uuid, status: ConferenceStatus) -> Result<()> {
        self.update(id, vec![(STATUS, enum_to_text(&status)?)]).await
    }

    /// Marks the conference terminated and stamps `tm_end`.
    pub async fn end(&self, id: Uuid) -> Result<()> {
        let now = self.now();
        self.update_at(id, conference::end_fields(now)?, now).await
    }

    pub async fn add_conferencecall_id(&self, id: Uuid, conferencecall_id: Uuid) -> Result<()> {
        self.mutate(id, CONFERENCECALL_IDS, CollectionOp::append(&conferencecall_id)?)
            .await
    }

    pub async fn remove_conferencecall_id(&self, id: Uuid, conferencecall_id: Uuid) -> Result<()> {
        self.mutate(id, CONFERENCECALL_IDS, CollectionOp::remove(&conferencecall_id)?)
            .await
    }

    pub async fn add_recording_id(&self, id: Uuid, recording_id: Uuid) -> Result<()> {
        self.mutate(id, RECORDING_IDS, CollectionOp::append(&recording_id)?)
            .await
    }

    pub async fn add_transcribe_id(&self, id: Uuid, transcribe_id: Uuid) -> Result<()> {
        self.mutate(id, TRANSCRIBE_IDS, CollectionOp::append(&transcribe_id)?)
            .await
    }

    /// Sets one entry of the free-form data map, overwriting any previous value.
    pub async fn set_data_item(&self, id: Uuid, key: &str, value: &Value) -> Result<()> {
        self.mutate(id, DATA, CollectionOp::set_key(key, value)?).await
    }

    pub async fn remove_data_item(&self, id: Uuid, key: &str) -> Result<()> {
        self.mutate(id, DATA, CollectionOp::remove_key(key)).await
    }

    /// Sets the active recording. `Uuid::nil()` clears it.
    pub async fn set_recording_id(&self, id: Uuid, recording_id: Uuid) -> Result<()> {
        self.update(id, vec![(RECORDING_ID, recording_id.into())])
            .await
    }

    /// Sets the active transcribe. `Uuid::nil()` clears it.
    pub async fn set_transcribe_id(&self, id: Uuid, transcribe_id: Uuid) -> Result<()> {
        self.update(id, vec![(TRANSCRIBE_ID, transcribe_id.into())])
            .await
    }
}
