//! Trunk operations.

use uuid::Uuid;

use coherent_core::cache::Cache;
use coherent_core::collection::{CollectionKind, CollectionOp};
use coherent_core::entity::trunk::{
    ALLOWED_IPS, AUTH_TYPES, DETAIL, DOMAIN_NAME, NAME, PASSWORD, USERNAME,
};
use coherent_core::entity::{AuthType, Trunk};
use coherent_core::storage::{FieldValue, Result, Store};

use super::CachedRepository;

pub type TrunkRepository<S, C> = CachedRepository<Trunk, S, C>;

impl<S, C> CachedRepository<Trunk, S, C>
where
    S: Store + ?Sized,
    C: Cache + ?Sized,
{
    pub async fn get_by_domain_name(&self, domain_name: &str) -> Result<Trunk> {
        self.get_by(DOMAIN_NAME, domain_name).await
    }

    pub async fn update_basic_info(
        &self,
        id: Uuid,
        name: &str,
        detail: &str,
        auth_types: &[AuthType],
        username: &str,
        password: &str,
    ) -> Result<()> {
        self.update(
            id,
            vec![
                (NAME, name.into()),
                (DETAIL, detail.into()),
                (AUTH_TYPES, FieldValue::collection(CollectionKind::Set, auth_types)?),
                (USERNAME, username.into()),
                (PASSWORD, password.into()),
            ],
        )
        .await
    }

    pub async fn add_allowed_ip(&self, id: Uuid, ip: &str) -> Result<()> {
        self.mutate(id, ALLOWED_IPS, CollectionOp::append(ip)?).await
    }

    pub async fn remove_allowed_ip(&self, id: Uuid, ip: &str) -> Result<()> {
        self.mutate(id, ALLOWED_IPS, CollectionOp::remove(ip)?).await
    }
}
