//! Confbridge operations.

use uuid::Uuid;

use coherent_core::cache::Cache;
use coherent_core::collection::CollectionOp;
use coherent_core::entity::confbridge::{
    BRIDGE_ID, CHANNEL_CALL_IDS, EXTERNAL_MEDIA_ID, FLAGS, RECORDING_ID, RECORDING_IDS, STATUS,
};
use coherent_core::entity::{enum_to_text, Confbridge, ConfbridgeStatus};
use coherent_core::storage::{Result, Store};

use super::CachedRepository;

pub type ConfbridgeRepository<S, C> = CachedRepository<Confbridge, S, C>;

impl<S, C> CachedRepository<Confbridge, S, C>
where
    S: Store + ?Sized,
    C: Cache + ?Sized,
{
    pub async fn get_by_bridge_id(&self, bridge_id: &str) -> Result<Confbridge> {
        self.get_by(BRIDGE_ID, bridge_id).await
    }

    pub async fn set_bridge_id(&self, id: Uuid, bridge_id: &str) -> Result<()> {
        self.update(id, vec![(BRIDGE_ID, bridge_id.into())]).await
    }

    pub async fn set_status(&self, id: Uuid, status: ConfbridgeStatus) -> Result<()> {
        self.update(id, vec![(STATUS, enum_to_text(&status)?)]).await
    }

    /// Replaces the whole flag set. Duplicates are dropped.
    pub async fn set_flags(&self, id: Uuid, flags: &[String]) -> Result<()> {
        self.mutate(id, FLAGS, CollectionOp::replace(flags)?).await
    }

    /// Records which call sits on a channel. An existing channel is overwritten.
    pub async fn add_channel_call_id(&self, id: Uuid, channel_id: &str, call_id: Uuid) -> Result<()> {
        self.mutate(id, CHANNEL_CALL_IDS, CollectionOp::set_key(channel_id, &call_id)?)
            .await
    }

    pub async fn remove_channel_call_id(&self, id: Uuid, channel_id: &str) -> Result<()> {
        self.mutate(id, CHANNEL_CALL_IDS, CollectionOp::remove_key(channel_id))
            .await
    }

    pub async fn set_recording_id(&self, id: Uuid, recording_id: Uuid) -> Result<()> {
        self.update(id, vec![(RECORDING_ID, recording_id.into())])
            .await
    }

    pub async fn add_recording_id(&self, id: Uuid, recording_id: Uuid) -> Result<()> {
        self.mutate(id, RECORDING_IDS, CollectionOp::append(&recording_id)?)
            .await
    }

    pub async fn set_external_media_id(&self, id: Uuid, external_media_id: Uuid) -> Result<()> {
        self.update(id, vec![(EXTERNAL_MEDIA_ID, external_media_id.into())])
            .await
    }
}
