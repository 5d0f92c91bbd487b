//! Chat operations.

use uuid::Uuid;

use coherent_core::cache::Cache;
use coherent_core::collection::CollectionOp;
use coherent_core::entity::chat::{DETAIL, NAME, PARTICIPANT_IDS, ROOM_OWNER_ID};
use coherent_core::entity::Chat;
use coherent_core::storage::{Result, Store};

use super::CachedRepository;

pub type ChatRepository<S, C> = CachedRepository<Chat, S, C>;

impl<S, C> CachedRepository<Chat, S, C>
where
    S: Store + ?Sized,
    C: Cache + ?Sized,
{
    pub async fn update_basic_info(&self, id: Uuid, name: &str, detail: &str) -> Result<()> {
        self.update(id, vec![(NAME, name.into()), (DETAIL, detail.into())])
            .await
    }

    pub async fn update_room_owner(&self, id: Uuid, room_owner_id: Uuid) -> Result<()> {
        self.update(id, vec![(ROOM_OWNER_ID, room_owner_id.into())])
            .await
    }

    /// Adds a participant. Adding one already present changes nothing.
    pub async fn add_participant(&self, id: Uuid, participant_id: Uuid) -> Result<()> {
        self.mutate(id, PARTICIPANT_IDS, CollectionOp::append(&participant_id)?)
            .await
    }

    pub async fn remove_participant(&self, id: Uuid, participant_id: Uuid) -> Result<()> {
        self.mutate(id, PARTICIPANT_IDS, CollectionOp::remove(&participant_id)?)
            .await
    }
}
