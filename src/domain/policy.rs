pub const DEFAULT_WARN_LABEL: &str = "io.upkick.warn_only";

/// Image references never pulled or kicked: ourselves and the orchestrator agents
pub const DEFAULT_BLACKLIST: [&str; 3] = [
    "rancher/agent",
    "rancher/agent-instance",
    "camptocamp/upkick",
];

/// Read-only exclusion and action policy for a reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KickPolicy {
    /// Only warn about stale containers instead of stopping them
    pub warn_only: bool,
    pub blacklist: Vec<String>,
    /// Label key holding the per-container override
    pub warn_label: String,
}

impl KickPolicy {
    pub fn new(warn_only: bool) -> Self {
        Self {
            warn_only,
            ..Self::default()
        }
    }

    /// Checks the base reference (everything before the first `:`) against the blacklist
    pub fn is_blacklisted(&self, tag: &str) -> bool {
        let base = tag.split(':').next().unwrap_or(tag);
        self.blacklist.iter().any(|entry| entry == base)
    }
}

impl Default for KickPolicy {
    fn default() -> Self {
        Self {
            warn_only: false,
            blacklist: DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect(),
            warn_label: DEFAULT_WARN_LABEL.to_string(),
        }
    }
}
