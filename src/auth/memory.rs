// In-process identity store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::models::{Identity, IdentityChanges, NewIdentity};
use crate::auth::repository::IdentityRepository;
use crate::db::RepositoryError;

/// Identity store held in memory
///
/// Each mutation runs its uniqueness check and its write under one write
/// lock, which gives the same insert-if-absent atomicity as the unique index.
#[derive(Default)]
pub struct InMemoryIdentityRepository {
    identities: RwLock<HashMap<Uuid, Identity>>,
}

impl InMemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn username_taken(identities: &HashMap<Uuid, Identity>, username: &str, except: Option<Uuid>) -> bool {
    identities
        .values()
        .any(|identity| Some(identity.id) != except && identity.has_username(username))
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, RepositoryError> {
        let identities = self.identities.read().await;
        Ok(identities.values().find(|i| i.has_username(username)).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, RepositoryError> {
        Ok(self.identities.read().await.get(&id).cloned())
    }

    async fn create(&self, new_identity: NewIdentity) -> Result<Identity, RepositoryError> {
        let mut identities = self.identities.write().await;
        if username_taken(&identities, &new_identity.username, None) {
            return Err(RepositoryError::DuplicateUsername(new_identity.username));
        }

        let identity = Identity {
            id: Uuid::new_v4(),
            username: new_identity.username,
            password_hash: new_identity.password_hash,
            email: new_identity.email,
            birthday: new_identity.birthday,
            favorite_movies: Vec::new(),
        };
        identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn update(&self, id: Uuid, changes: IdentityChanges) -> Result<Option<Identity>, RepositoryError> {
        let mut identities = self.identities.write().await;
        if let Some(username) = &changes.username {
            if username_taken(&identities, username, Some(id)) {
                return Err(RepositoryError::DuplicateUsername(username.clone()));
            }
        }

        let Some(identity) = identities.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = changes.username {
            identity.username = username;
        }
        if let Some(password_hash) = changes.password_hash {
            identity.password_hash = password_hash;
        }
        if let Some(email) = changes.email {
            identity.email = email;
        }
        if let Some(birthday) = changes.birthday {
            identity.birthday = Some(birthday);
        }
        Ok(Some(identity.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self.identities.write().await.remove(&id).is_some())
    }

    async fn list(&self) -> Result<Vec<Identity>, RepositoryError> {
        let mut identities: Vec<Identity> = self.identities.read().await.values().cloned().collect();
        identities.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(identities)
    }

    async fn add_favorite(&self, id: Uuid, movie_id: Uuid) -> Result<Option<Identity>, RepositoryError> {
        let mut identities = self.identities.write().await;
        Ok(identities.get_mut(&id).map(|identity| {
            if !identity.favorite_movies.contains(&movie_id) {
                identity.favorite_movies.push(movie_id);
            }
            identity.clone()
        }))
    }

    async fn remove_favorite(&self, id: Uuid, movie_id: Uuid) -> Result<Option<Identity>, RepositoryError> {
        let mut identities = self.identities.write().await;
        Ok(identities.get_mut(&id).map(|identity| {
            identity.favorite_movies.retain(|m| *m != movie_id);
            identity.clone()
        }))
    }
}
