use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{PoisonError, RwLock},
};

use spendbook_auth::Verifier;

/// State shared by all handlers.
#[derive(Debug)]
pub struct AppServices {
    pub verifier: Verifier,
    pub groups: GroupDirectory,
}

impl AppServices {
    pub fn new(verifier: Verifier) -> Self {
        Self {
            verifier,
            groups: GroupDirectory::default(),
        }
    }
}

/// In-memory group membership, keyed by group name.
///
/// Stands in for the persistence layer; members are stored as emails because
/// that is what the group-member policy matches on.
#[derive(Debug, Default)]
pub struct GroupDirectory {
    inner: RwLock<BTreeMap<String, BTreeSet<String>>>,
}

impl GroupDirectory {
    /// Members of `name`; an unknown group has no members.
    pub fn members(&self, name: &str) -> BTreeSet<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Replace the membership of `name`, creating the group if needed.
    pub fn replace(&self, name: &str, members: BTreeSet<String>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), members);
    }
}
