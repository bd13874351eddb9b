use async_trait::async_trait;
use log::debug;
use std::any::type_name;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{StoreError, StoreResult};
use crate::model::Entity;

/// Storage for one entity type.
///
/// Missing ids are reported as `Ok(None)` / empty vectors; `Err` is reserved
/// for backend failures.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    async fn get(&self, id: &str) -> StoreResult<Option<T>>;

    /// Insert-or-replace keyed by id. A replaced entity keeps its position.
    async fn upsert(&self, entity: T) -> StoreResult<T>;

    /// Insert-or-replace where a replacement first sees the stored entity
    /// through `merge`, within the same write.
    async fn upsert_with(
        &self,
        entity: T,
        merge: Box<dyn for<'a> FnOnce(&'a T, &'a mut T) + Send>,
    ) -> StoreResult<T>;

    /// Entities whose `parent_id` matches, in insertion order.
    async fn find_by_parent(&self, parent_id: &str) -> StoreResult<Vec<T>>;

    /// Applies `apply` to the entity with `id` in place. Returns `false` when
    /// no such entity exists.
    async fn update(
        &self,
        id: &str,
        apply: Box<dyn for<'a> FnOnce(&'a mut T) + Send>,
    ) -> StoreResult<bool>;

    /// Removes every entity matching `predicate` and returns them.
    async fn remove_where(
        &self,
        predicate: &(dyn for<'a> Fn(&'a T) -> bool + Sync),
    ) -> StoreResult<Vec<T>>;

    async fn list(&self) -> StoreResult<Vec<T>>;
}

/// Ordered, in-memory repository. All data is lost when dropped.
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    entries: RwLock<Vec<T>>,
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::with_entries(Vec::new())
    }

    pub fn with_entries(entries: Vec<T>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Vec<T>>> {
        self.entries
            .read()
            .map_err(|_| StoreError::Poisoned(type_name::<T>()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Vec<T>>> {
        self.entries
            .write()
            .map_err(|_| StoreError::Poisoned(type_name::<T>()))
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn get(&self, id: &str) -> StoreResult<Option<T>> {
        Ok(self.read()?.iter().find(|entry| entry.id() == id).cloned())
    }

    async fn upsert(&self, entity: T) -> StoreResult<T> {
        let mut entries = self.write()?;
        match entries.iter().position(|entry| entry.id() == entity.id()) {
            Some(index) => {
                debug!("replacing {} {} at {index}", type_name::<T>(), entity.id());
                entries[index] = entity.clone();
            }
            None => entries.push(entity.clone()),
        }
        Ok(entity)
    }

    async fn upsert_with(
        &self,
        mut entity: T,
        merge: Box<dyn for<'a> FnOnce(&'a T, &'a mut T) + Send>,
    ) -> StoreResult<T> {
        let mut entries = self.write()?;
        match entries.iter().position(|entry| entry.id() == entity.id()) {
            Some(index) => {
                merge(&entries[index], &mut entity);
                entries[index] = entity.clone();
            }
            None => entries.push(entity.clone()),
        }
        Ok(entity)
    }

    async fn find_by_parent(&self, parent_id: &str) -> StoreResult<Vec<T>> {
        Ok(self
            .read()?
            .iter()
            .filter(|entry| entry.parent_id() == parent_id)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: &str,
        apply: Box<dyn for<'a> FnOnce(&'a mut T) + Send>,
    ) -> StoreResult<bool> {
        let mut entries = self.write()?;
        let Some(entry) = entries.iter_mut().find(|entry| entry.id() == id) else {
            return Ok(false);
        };
        apply(entry);
        Ok(true)
    }

    async fn remove_where(
        &self,
        predicate: &(dyn for<'a> Fn(&'a T) -> bool + Sync),
    ) -> StoreResult<Vec<T>> {
        let mut entries = self.write()?;
        let (removed, kept): (Vec<T>, Vec<T>) = entries.drain(..).partition(|entry| predicate(entry));
        *entries = kept;
        Ok(removed)
    }

    async fn list(&self) -> StoreResult<Vec<T>> {
        Ok(self.read()?.clone())
    }
}
