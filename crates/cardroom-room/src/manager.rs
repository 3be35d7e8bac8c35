//! Room registry: creates, tracks, and looks up rooms by id.

use std::collections::HashMap;
use std::sync::Arc;

use cardroom_protocol::RoomId;
use cardroom_transport::Connection;
use tokio::sync::RwLock;

use crate::{Room, RoomConfig, RoomError, TableEngine};

/// Every room in the process, keyed by caller-supplied id.
///
/// The map has its own lock; each room has another. Looking up a room
/// only holds the map lock for the lookup, so rooms never contend with
/// each other.
pub struct RoomRegistry<E, C> {
    rooms: RwLock<HashMap<RoomId, Arc<Room<E, C>>>>,
    config: RoomConfig,
}

impl<E: TableEngine, C: Connection> RoomRegistry<E, C> {
    /// Creates an empty registry. Every room it creates uses `config`.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Creates a room with the given id.
    ///
    /// # Errors
    /// [`RoomError::AlreadyExists`] if the id is taken; the existing room
    /// is left untouched.
    pub async fn create_room(&self, room_id: RoomId) -> Result<Arc<Room<E, C>>, RoomError> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&room_id) {
            return Err(RoomError::AlreadyExists(room_id));
        }
        let room = Arc::new(Room::new(room_id.clone(), self.config.clone()));
        rooms.insert(room_id.clone(), Arc::clone(&room));
        tracing::info!(%room_id, "room created");
        Ok(room)
    }

    /// Looks up a room.
    pub async fn get(&self, room_id: &RoomId) -> Option<Arc<Room<E, C>>> {
        self.rooms.read().await.get(room_id).cloned()
    }

    /// Looks up a room, creating it if it doesn't exist yet.
    ///
    /// Two callers racing on the same unknown id get the same room.
    pub async fn get_or_create(&self, room_id: &RoomId) -> Arc<Room<E, C>> {
        if let Some(room) = self.get(room_id).await {
            return room;
        }
        let mut rooms = self.rooms.write().await;
        let room = rooms.entry(room_id.clone()).or_insert_with(|| {
            tracing::info!(%room_id, "room created on first connect");
            Arc::new(Room::new(room_id.clone(), self.config.clone()))
        });
        Arc::clone(room)
    }

    /// Like [`get`](Self::get), but an unknown id is an error.
    pub async fn require(&self, room_id: &RoomId) -> Result<Arc<Room<E, C>>, RoomError> {
        self.get(room_id)
            .await
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    /// Returns the number of rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Lists all room ids, sorted.
    pub async fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockConnection, ScriptedEngine};

    fn registry() -> RoomRegistry<ScriptedEngine, MockConnection> {
        RoomRegistry::new(RoomConfig::default())
    }

    #[tokio::test]
    async fn test_create_room_rejects_duplicate_id() {
        let reg = registry();
        reg.create_room(RoomId::from("r1")).await.unwrap();
        let result = reg.create_room(RoomId::from("r1")).await;
        assert!(matches!(result, Err(RoomError::AlreadyExists(id)) if id.as_str() == "r1"));
        assert_eq!(reg.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_room_is_none() {
        let reg = registry();
        assert!(reg.get(&RoomId::from("nope")).await.is_none());
        assert!(matches!(
            reg.require(&RoomId::from("nope")).await,
            Err(RoomError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_get_or_create_returns_same_room() {
        let reg = registry();
        let a = reg.get_or_create(&RoomId::from("r1")).await;
        let b = reg.get_or_create(&RoomId::from("r1")).await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(reg.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_get_or_create_sees_explicitly_created_room() {
        let reg = registry();
        let created = reg.create_room(RoomId::from("r1")).await.unwrap();
        let found = reg.get_or_create(&RoomId::from("r1")).await;
        assert!(Arc::ptr_eq(&created, &found));
    }

    #[tokio::test]
    async fn test_room_ids_sorted() {
        let reg = registry();
        for id in ["b", "c", "a"] {
            reg.create_room(RoomId::from(id)).await.unwrap();
        }
        let ids: Vec<String> = reg.room_ids().await.into_iter().map(|r| r.0).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
