//! The profile book
//!
//! An ordered list of profiles with one of them active. The book is never
//! empty.

use serde::Serialize;
use tracing::debug;

use crate::error::{ProfileError, ProfileResult};
use crate::profile::{DEFAULT_INSTANCE_NAME, NetworkProfile};

/// Ordered profiles plus the id of the active one
///
/// Loaded books go through [`ProfileBook::from_parts`] so the non-empty
/// rule holds for anything read from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileBook {
    profiles: Vec<NetworkProfile>,
    active_id: String,
}

impl Default for ProfileBook {
    fn default() -> Self {
        let profile = NetworkProfile::default();
        Self {
            active_id: profile.id.clone(),
            profiles: vec![profile],
        }
    }
}

impl ProfileBook {
    /// Build a book from loaded profiles
    ///
    /// An empty list yields a single default profile. An `active_id` that
    /// matches nothing selects the first profile.
    pub fn from_parts(profiles: Vec<NetworkProfile>, active_id: Option<&str>) -> Self {
        if profiles.is_empty() {
            return Self::default();
        }
        let active_id = active_id
            .filter(|id| profiles.iter().any(|p| p.id == *id))
            .map(str::to_string)
            .unwrap_or_else(|| profiles[0].id.clone());
        Self {
            profiles,
            active_id,
        }
    }

    pub fn profiles(&self) -> &[NetworkProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// The active profile
    pub fn active(&self) -> &NetworkProfile {
        self.profiles
            .iter()
            .find(|p| p.id == self.active_id)
            .unwrap_or(&self.profiles[0])
    }

    pub fn get(&self, id: &str) -> Option<&NetworkProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Select the active profile
    pub fn set_active(&mut self, id: &str) -> ProfileResult<()> {
        if self.get(id).is_none() {
            return Err(ProfileError::NotFound(id.to_string()));
        }
        self.active_id = id.to_string();
        Ok(())
    }

    /// Append a fresh profile and make it active
    ///
    /// The instance name is `meshlens-N` for the first free N, starting at
    /// the new book length.
    pub fn add_new(&mut self) -> &NetworkProfile {
        let mut n = self.profiles.len() + 1;
        let name = loop {
            let candidate = format!("{DEFAULT_INSTANCE_NAME}-{n}");
            if !self.profiles.iter().any(|p| p.instance_name == candidate) {
                break candidate;
            }
            n += 1;
        };

        let profile = NetworkProfile::named(name);
        debug!(id = %profile.id, name = %profile.instance_name, "Added profile");
        self.active_id = profile.id.clone();
        self.profiles.push(profile);
        &self.profiles[self.profiles.len() - 1]
    }

    /// Replace the profile with the same id
    pub fn update(&mut self, profile: NetworkProfile) -> ProfileResult<()> {
        let slot = self
            .profiles
            .iter_mut()
            .find(|p| p.id == profile.id)
            .ok_or_else(|| ProfileError::NotFound(profile.id.clone()))?;
        *slot = profile;
        Ok(())
    }

    /// Remove a profile
    ///
    /// The last profile cannot be removed. Removing the active profile
    /// selects the one before it, or the new first one.
    pub fn delete(&mut self, id: &str) -> ProfileResult<NetworkProfile> {
        if self.profiles.len() <= 1 {
            return Err(ProfileError::LastProfile);
        }
        let index = self
            .profiles
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| ProfileError::NotFound(id.to_string()))?;

        let removed = self.profiles.remove(index);
        if removed.id == self.active_id {
            let next = index.saturating_sub(1);
            self.active_id = self.profiles[next].id.clone();
        }
        debug!(id = %removed.id, active = %self.active_id, "Deleted profile");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(book: &ProfileBook) -> Vec<&str> {
        book.profiles()
            .iter()
            .map(|p| p.instance_name.as_str())
            .collect()
    }

    #[test]
    fn test_default_book() {
        let book = ProfileBook::default();
        assert_eq!(book.len(), 1);
        assert_eq!(book.active().id, book.active_id());
        assert_eq!(book.active().instance_name, DEFAULT_INSTANCE_NAME);
    }

    #[test]
    fn test_from_parts() {
        let a = NetworkProfile::named("a");
        let b = NetworkProfile::named("b");

        let book = ProfileBook::from_parts(vec![a.clone(), b.clone()], Some(b.id.as_str()));
        assert_eq!(book.active().instance_name, "b");

        let book = ProfileBook::from_parts(vec![a.clone(), b.clone()], Some("gone"));
        assert_eq!(book.active().instance_name, "a");

        let book = ProfileBook::from_parts(Vec::new(), Some(a.id.as_str()));
        assert_eq!(book.len(), 1);
        assert_ne!(book.active().id, a.id);
    }

    #[test]
    fn test_add_new_picks_free_name() {
        let mut book = ProfileBook::default();
        let id = book.add_new().id.clone();
        assert_eq!(book.active_id(), id);
        assert_eq!(names(&book), vec!["meshlens", "meshlens-2"]);

        // Rename so the next candidate collides.
        let mut first = book.profiles()[0].clone();
        first.instance_name = "meshlens-3".to_string();
        book.update(first).unwrap();

        book.add_new();
        assert_eq!(names(&book), vec!["meshlens-3", "meshlens-2", "meshlens-4"]);
    }

    #[test]
    fn test_delete_last_profile_refused() {
        let mut book = ProfileBook::default();
        let id = book.active_id().to_string();
        assert!(matches!(book.delete(&id), Err(ProfileError::LastProfile)));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_delete_active_selects_previous() {
        let mut book = ProfileBook::default();
        let first = book.active_id().to_string();
        let second = book.add_new().id.clone();
        let third = book.add_new().id.clone();

        book.set_active(&second).unwrap();
        book.delete(&second).unwrap();
        assert_eq!(book.active_id(), first);

        book.set_active(&first).unwrap();
        book.delete(&first).unwrap();
        assert_eq!(book.active_id(), third);
    }

    #[test]
    fn test_delete_inactive_keeps_selection() {
        let mut book = ProfileBook::default();
        let first = book.active_id().to_string();
        let second = book.add_new().id.clone();

        book.delete(&first).unwrap();
        assert_eq!(book.active_id(), second);
        assert!(matches!(
            book.delete("missing"),
            Err(ProfileError::LastProfile)
        ));
    }

    #[test]
    fn test_unknown_ids() {
        let mut book = ProfileBook::default();
        book.add_new();
        assert!(matches!(book.delete("missing"), Err(ProfileError::NotFound(_))));
        assert!(matches!(book.set_active("missing"), Err(ProfileError::NotFound(_))));
        assert!(matches!(
            book.update(NetworkProfile::default()),
            Err(ProfileError::NotFound(_))
        ));
    }
}
