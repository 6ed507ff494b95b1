use std::collections::BTreeMap;
use std::fmt;

/// Containers running one specific content digest of an image
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestGroup {
    pub containers: Vec<String>,
}

/// An image reference in use by at least one container.
///
/// `digest_groups` is filled while the inventory is built and left alone
/// afterwards; `current_digest` is set once by the refresher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub id: String,
    pub current_digest: Option<String>,
    pub digest_groups: BTreeMap<String, DigestGroup>,
}

impl Image {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            current_digest: None,
            digest_groups: BTreeMap::new(),
        }
    }

    /// Adds a container under the given digest, creating the group on first sight
    pub fn insert(&mut self, digest: &str, container_id: &str) {
        self.digest_groups
            .entry(digest.to_string())
            .or_default()
            .containers
            .push(container_id.to_string());
    }

    pub fn container_count(&self) -> usize {
        self.digest_groups
            .values()
            .map(|group| group.containers.len())
            .sum()
    }

    pub fn is_current(&self, digest: &str) -> bool {
        self.current_digest.as_deref() == Some(digest)
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
