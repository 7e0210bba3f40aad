use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Result, TourGuideError};
use crate::models::User;

/// In-memory user registry keyed by user name
///
/// Constructed once by the owning process and handed to the components that
/// need it. Users live until removed.
#[derive(Debug, Default)]
pub struct UserStore {
    users: DashMap<String, Arc<User>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    /// Register a user unless the name is already taken
    ///
    /// Returns the stored user, which is the existing one on a name clash.
    pub fn add_user(&self, user: User) -> Arc<User> {
        match self.users.entry(user.name().to_string()) {
            Entry::Occupied(existing) => Arc::clone(existing.get()),
            Entry::Vacant(slot) => {
                tracing::debug!(user = %user.name(), "User added");
                Arc::clone(slot.insert(Arc::new(user)).value())
            }
        }
    }

    pub fn get_user(&self, name: &str) -> Result<Arc<User>> {
        self.users
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| TourGuideError::UserNotFound(name.to_string()))
    }

    pub fn get_user_by_id(&self, id: Uuid) -> Result<Arc<User>> {
        self.users
            .iter()
            .find(|entry| entry.value().id() == id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| TourGuideError::UserNotFound(id.to_string()))
    }

    pub fn all_users(&self) -> Vec<Arc<User>> {
        self.users
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub fn remove_user(&self, name: &str) -> Option<Arc<User>> {
        self.users.remove(name).map(|(_, user)| user)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.users.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> User {
        User::new(Uuid::new_v4(), name, "000", &format!("{}@tourGuide.com", name))
    }

    #[test]
    fn test_add_and_get_user() {
        let store = UserStore::new();
        let jon = store.add_user(user("jon"));
        let jon2 = store.add_user(user("jon2"));

        assert_eq!(store.get_user("jon").unwrap().id(), jon.id());
        assert_eq!(store.get_user_by_id(jon2.id()).unwrap().name(), "jon2");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_add_user_keeps_existing_name() {
        let store = UserStore::new();
        let first = store.add_user(user("jon"));
        let second = store.add_user(user("jon"));

        assert_eq!(first.id(), second.id());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_user_fails() {
        let store = UserStore::new();

        assert!(matches!(store.get_user("ghost"), Err(TourGuideError::UserNotFound(name)) if name == "ghost"));
        assert!(store.get_user_by_id(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_remove_user() {
        let store = UserStore::new();
        store.add_user(user("jon"));

        assert!(store.remove_user("jon").is_some());
        assert!(!store.contains("jon"));
        assert!(store.is_empty());
    }
}
