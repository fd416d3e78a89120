use std::sync::Arc;

use models::player::{validate_id, validate_name};
use models::{codec, Player, PlayerId};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::policy::DirectoryPolicy;
use crate::errors::ServiceError;
use crate::storage::RecordStore;

const ID_TAKEN: &str = "ID is already taken, please try again";
const ID_RESERVED: &str = "ID is reserved, please try again";
const NAME_TAKEN: &str = "Name is already taken, please try again";
const UPDATE_TARGET_MISSING: &str = "Player with ID does not exist, please try again";

/// Player directory over a key-value store.
///
/// Each record lives under one key and is written with the store's
/// conditional primitives: create uses set-if-absent, update uses
/// set-if-present and delete reports whether a key was removed, so none of
/// them needs a separate existence read. The store is the only state.
///
/// Ids whose record key would fall inside the name index are rejected, so
/// records and name claims never share a key.
pub struct DirectoryService<S: RecordStore + ?Sized> {
    store: Arc<S>,
    policy: DirectoryPolicy,
}

impl<S: RecordStore + ?Sized> DirectoryService<S> {
    pub fn new(store: Arc<S>, policy: DirectoryPolicy) -> Self { Self { store, policy } }

    /// Fetch a player by id.
    #[instrument(skip(self))]
    pub async fn get_player(&self, id: Option<PlayerId>) -> Result<Player, ServiceError> {
        let id = self.checked_id(id.as_ref())?;
        self.load(id.as_str())
            .await?
            .ok_or_else(|| ServiceError::not_found(&format!("player {}", id)))
    }

    /// Persist a new player. A missing or empty id is replaced by a
    /// server-generated one; the returned player carries the effective id.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use models::{Player, PlayerId};
    /// use service::directory::{DirectoryPolicy, DirectoryService};
    /// use service::storage::MemoryStore;
    /// let svc = DirectoryService::new(Arc::new(MemoryStore::new()), DirectoryPolicy::default());
    /// let created = tokio_test::block_on(svc.create_player(Player::new("p1", "Aria"))).unwrap();
    /// let fetched = tokio_test::block_on(svc.get_player(Some(PlayerId::new("p1")))).unwrap();
    /// assert_eq!(created, fetched);
    /// ```
    #[instrument(skip(self, player), fields(player_name = %player.name))]
    pub async fn create_player(&self, mut player: Player) -> Result<Player, ServiceError> {
        validate_name(&player.name)?;

        let requested = player.key_id().map(str::to_string);
        let id = match requested {
            Some(id) => {
                self.reject_reserved(&id)?;
                id
            }
            None => {
                let id = Uuid::new_v4().simple().to_string();
                player.id = Some(PlayerId::new(id.clone()));
                id
            }
        };
        let raw = self.encode(&player)?;
        let key = self.policy.record_key(&id);

        // an overwriting create hands the replaced record's name back
        let replaced_name = if self.policy.enforce_unique_name && !self.policy.enforce_unique_id {
            self.stored_name(&key, &id).await?
        } else {
            None
        };

        let fresh_claim = self.claim_name(&player.name, &id).await?;
        let written = if self.policy.enforce_unique_id {
            self.store.set_if_absent(&key, &raw).await
        } else {
            self.store.set(&key, &raw).await.map(|()| true)
        };

        match written {
            Ok(true) => {
                if let Some(old) = replaced_name.filter(|old| *old != player.name) {
                    self.release_name(&old, &id).await;
                }
                info!(player_id = %id, "player_created");
                Ok(player)
            }
            Ok(false) => {
                if fresh_claim {
                    self.release_name(&player.name, &id).await;
                }
                warn!(player_id = %id, "create rejected, id already taken");
                Err(ServiceError::Conflict(ID_TAKEN.into()))
            }
            Err(e) => {
                if fresh_claim {
                    self.release_name(&player.name, &id).await;
                }
                Err(e.into())
            }
        }
    }

    /// Replace the stored record at `player.id` with `player`.
    ///
    /// This is a full overwrite, not a merge: fields left unset in `player`
    /// are stored as their defaults.
    #[instrument(skip(self, player), fields(player_name = %player.name))]
    pub async fn update_player(&self, player: Player) -> Result<Player, ServiceError> {
        let id = self.checked_id(player.id.as_ref())?.as_str().to_string();
        let raw = self.encode(&player)?;

        let mut renamed_from = None;
        let mut fresh_claim = false;
        if self.policy.enforce_unique_name {
            let current = self
                .load(&id)
                .await?
                .ok_or_else(|| ServiceError::Validation(UPDATE_TARGET_MISSING.into()))?;
            if current.name != player.name {
                fresh_claim = self.claim_name(&player.name, &id).await?;
                renamed_from = Some(current.name);
            }
        }

        match self.store.set_if_present(&self.policy.record_key(&id), &raw).await {
            Ok(true) => {
                if let Some(old) = renamed_from {
                    self.release_name(&old, &id).await;
                }
                info!(player_id = %id, "player_updated");
                Ok(player)
            }
            Ok(false) => {
                if fresh_claim {
                    self.release_name(&player.name, &id).await;
                }
                warn!(player_id = %id, "update rejected, no such player");
                Err(ServiceError::Validation(UPDATE_TARGET_MISSING.into()))
            }
            Err(e) => {
                if fresh_claim {
                    self.release_name(&player.name, &id).await;
                }
                Err(e.into())
            }
        }
    }

    /// Remove the player stored at `id` and echo the id back.
    #[instrument(skip(self))]
    pub async fn delete_player(&self, id: Option<PlayerId>) -> Result<PlayerId, ServiceError> {
        let id = self.checked_id(id.as_ref())?.clone();
        let key = self.policy.record_key(id.as_str());

        // the name index needs the stored name before the record goes away
        let name = if self.policy.enforce_unique_name {
            match self.load(id.as_str()).await? {
                Some(player) => Some(player.name),
                None => return Err(ServiceError::not_found(&format!("player {}", id))),
            }
        } else {
            None
        };

        if !self.store.delete(&key).await? {
            return Err(ServiceError::not_found(&format!("player {}", id)));
        }
        if let Some(name) = name {
            self.release_name(&name, id.as_str()).await;
        }
        info!(player_id = %id, "player_deleted");
        Ok(id)
    }

    fn checked_id<'a>(&self, id: Option<&'a PlayerId>) -> Result<&'a PlayerId, ServiceError> {
        let id = validate_id(id)?;
        self.reject_reserved(id.as_str())?;
        Ok(id)
    }

    fn reject_reserved(&self, id: &str) -> Result<(), ServiceError> {
        if self.policy.is_reserved_id(id) {
            warn!(player_id = %id, "id collides with the name index");
            return Err(ServiceError::Validation(ID_RESERVED.into()));
        }
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<Player>, ServiceError> {
        let Some(raw) = self.store.get(&self.policy.record_key(id)).await? else {
            return Ok(None);
        };
        match codec::decode(&raw) {
            Ok(player) => Ok(Some(player)),
            Err(e) => {
                error!(player_id = %id, error = %e, "stored player record is malformed");
                Err(e.into())
            }
        }
    }

    // Name of the record about to be overwritten. A malformed record has no
    // claim to hand back.
    async fn stored_name(&self, key: &str, id: &str) -> Result<Option<String>, ServiceError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match codec::decode(&raw) {
            Ok(player) => Ok(Some(player.name)),
            Err(e) => {
                warn!(player_id = %id, error = %e, "overwriting malformed player record");
                Ok(None)
            }
        }
    }

    fn encode(&self, player: &Player) -> Result<String, ServiceError> {
        codec::encode(player).map_err(|e| {
            error!(error = %e, "failed to encode player");
            e.into()
        })
    }

    /// Claim `name` for `id`. Returns `true` when this call took the claim,
    /// `false` when `id` already held it.
    async fn claim_name(&self, name: &str, id: &str) -> Result<bool, ServiceError> {
        if !self.policy.enforce_unique_name || name.is_empty() {
            return Ok(false);
        }
        let key = self.policy.name_key(name);
        if self.store.set_if_absent(&key, id).await? {
            return Ok(true);
        }
        if self.store.get(&key).await?.as_deref() == Some(id) {
            return Ok(false);
        }
        warn!(player_id = %id, player_name = name, "name already taken");
        Err(ServiceError::Conflict(NAME_TAKEN.into()))
    }

    // Best effort: a leftover claim only blocks the name, it never loses data.
    async fn release_name(&self, name: &str, id: &str) {
        if !self.policy.enforce_unique_name || name.is_empty() {
            return;
        }
        let key = self.policy.name_key(name);
        match self.store.get(&key).await {
            Ok(Some(owner)) if owner == id => {
                if let Err(e) = self.store.delete(&key).await {
                    warn!(player_id = %id, player_name = name, error = %e, "failed to release name");
                }
            }
            Ok(_) => {}
            Err(e) => warn!(player_id = %id, player_name = name, error = %e, "failed to read name owner"),
        }
    }
}
