//! Recording operations.

use uuid::Uuid;

use coherent_core::cache::Cache;
use coherent_core::collection::CollectionOp;
use coherent_core::entity::recording::{self, FILENAMES};
use coherent_core::entity::{Recording, RecordingStatus};
use coherent_core::storage::{Result, Store};

use super::CachedRepository;

pub type RecordingRepository<S, C> = CachedRepository<Recording, S, C>;

impl<S, C> CachedRepository<Recording, S, C>
where
    S: Store + ?Sized,
    C: Cache + ?Sized,
{
    /// Moves the recording to `status`, stamping `tm_start` on `recording`
    /// and `tm_end` on `ended`. Returns `InvalidStatus` for `initiating`.
    pub async fn set_status(&self, id: Uuid, status: RecordingStatus) -> Result<()> {
        let now = self.now();
        let fields = recording::transition_fields(status, now)?;
        self.update_at(id, fields, now).await
    }

    pub async fn add_filename(&self, id: Uuid, filename: &str) -> Result<()> {
        self.mutate(id, FILENAMES, CollectionOp::append(filename)?).await
    }
}
