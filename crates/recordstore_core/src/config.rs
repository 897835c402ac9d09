//! Container configuration.

/// How bulk sync treats a UID that appears more than once in one payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateUidPolicy {
    /// Reject the whole payload before any change is made.
    #[default]
    Reject,
    /// Apply every entry in turn; the UID keeps its first position.
    LastWins,
}

/// Configuration for a record container.
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// Schema names stamped on every record the container creates.
    pub schemas: Vec<String>,

    /// Whether container-level modified events are emitted.
    pub emit_container_events: bool,

    /// Treatment of repeated UIDs in bulk sync payloads.
    pub duplicate_uids: DuplicateUidPolicy,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            schemas: Vec::new(),
            emit_container_events: true,
            duplicate_uids: DuplicateUidPolicy::Reject,
        }
    }
}

impl ContainerConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a schema name stamped on created records.
    #[must_use]
    pub fn schema(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.schemas.contains(&name) {
            self.schemas.push(name);
        }
        self
    }

    /// Sets whether container-level modified events are emitted.
    #[must_use]
    pub const fn emit_container_events(mut self, value: bool) -> Self {
        self.emit_container_events = value;
        self
    }

    /// Sets the duplicate UID policy for bulk sync.
    #[must_use]
    pub const fn duplicate_uids(mut self, policy: DuplicateUidPolicy) -> Self {
        self.duplicate_uids = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ContainerConfig::default();
        assert!(config.schemas.is_empty());
        assert!(config.emit_container_events);
        assert_eq!(config.duplicate_uids, DuplicateUidPolicy::Reject);
    }

    #[test]
    fn builder_pattern() {
        let config = ContainerConfig::new()
            .schema("app.Person")
            .schema("app.Person")
            .emit_container_events(false)
            .duplicate_uids(DuplicateUidPolicy::LastWins);

        assert_eq!(config.schemas, vec!["app.Person".to_string()]);
        assert!(!config.emit_container_events);
        assert_eq!(config.duplicate_uids, DuplicateUidPolicy::LastWins);
    }
}
