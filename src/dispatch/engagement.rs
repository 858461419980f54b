use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

use crate::domain::MapId;

/// Tracks maps that currently have an in-flight render job.
///
/// Engagement lives in this side table, keyed by map identity, rather than
/// as a flag on the map itself: the map stays read-only to the core, and
/// release is tied to the guard's lifetime instead of manual bookkeeping.
#[derive(Default, Clone)]
pub struct EngagementTable {
    maps: Arc<DashMap<MapId, ()>>,
}

#[derive(Debug, Error)]
pub enum EngagementError {
    #[error("map {map_id} is already engaged in a render job")]
    AlreadyEngaged { map_id: MapId },
}

impl EngagementTable {
    pub fn new() -> Self {
        Self {
            maps: Arc::new(DashMap::new()),
        }
    }

    /// Claim the engagement slot for a map, failing if a job already holds
    /// it. Dropping the returned guard releases the slot.
    pub fn acquire(&self, map_id: MapId) -> Result<EngagementGuard, EngagementError> {
        use dashmap::mapref::entry::Entry;

        match self.maps.entry(map_id) {
            Entry::Vacant(vacant) => {
                vacant.insert(());
                Ok(EngagementGuard {
                    map_id,
                    maps: Arc::clone(&self.maps),
                })
            }
            Entry::Occupied(_) => Err(EngagementError::AlreadyEngaged { map_id }),
        }
    }

    /// Read-only engagement check, for hosts that pool maps externally.
    pub fn is_engaged(&self, map_id: MapId) -> bool {
        self.maps.contains_key(&map_id)
    }
}

/// RAII claim on a map's engagement slot. Held by the job from submission
/// until the completion callback has returned.
pub struct EngagementGuard {
    map_id: MapId,
    maps: Arc<DashMap<MapId, ()>>,
}

impl EngagementGuard {
    pub fn map_id(&self) -> MapId {
        self.map_id
    }
}

impl Drop for EngagementGuard {
    fn drop(&mut self) {
        self.maps.remove(&self.map_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn second_acquire_is_rejected_while_guard_lives() {
        let table = EngagementTable::new();
        let map_id = Uuid::new_v4();

        let guard = table.acquire(map_id).expect("first acquire should succeed");
        assert!(table.is_engaged(map_id));
        assert!(matches!(
            table.acquire(map_id),
            Err(EngagementError::AlreadyEngaged { .. })
        ));

        drop(guard);
        assert!(!table.is_engaged(map_id));
        table
            .acquire(map_id)
            .expect("acquire should succeed after release");
    }

    #[test]
    fn distinct_maps_do_not_contend() {
        let table = EngagementTable::new();
        let _a = table.acquire(Uuid::new_v4()).expect("first map");
        let _b = table.acquire(Uuid::new_v4()).expect("second map");
    }
}
