use std::collections::HashMap;

/// Point-in-time view of a container as reported by the runtime.
///
/// Snapshots are never mutated; callers re-inspect when they need fresh state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSnapshot {
    pub id: String,
    /// Image reference the container was created from (e.g. `registry/repo:tag`)
    pub image_ref: String,
    /// Content digest of the image the container is running
    pub image_digest: String,
    pub running: bool,
    pub labels: HashMap<String, String>,
}

impl ContainerSnapshot {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// Image metadata returned by an image inspect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub digest: String,
}

/// Per-container override of the global warn-only mode, read from a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarnOverride {
    /// No usable label: follow the global mode
    Inherit,
    /// Label is `"true"`: never touch this container
    ForceSkip,
    /// Label is `"false"`: act on this container even in warn-only mode
    ForceKick,
}

impl WarnOverride {
    /// Parses a raw label value. Unrecognized values fall back to `Inherit`.
    pub fn from_label(value: Option<&str>) -> Self {
        match value {
            Some("true") => Self::ForceSkip,
            Some("false") => Self::ForceKick,
            _ => Self::Inherit,
        }
    }

    /// True when the label was present but held neither `"true"` nor `"false"`
    pub fn is_unrecognized(value: Option<&str>) -> bool {
        matches!(value, Some(v) if v != "true" && v != "false")
    }

    /// Resolves the effective warn-only decision for a container.
    pub fn warn_only(self, global_warn_only: bool) -> bool {
        match self {
            Self::Inherit => global_warn_only,
            Self::ForceSkip => true,
            Self::ForceKick => false,
        }
    }
}
