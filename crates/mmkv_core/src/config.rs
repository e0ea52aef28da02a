//! Scan configuration.

/// What a tombstone record does to a key's earlier values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TombstonePolicy {
    /// A tombstone only suppresses insertion; earlier values stay visible.
    ///
    /// This matches how the log has historically been read: if a removal is
    /// the last record for a key, the removed value is still returned.
    #[default]
    KeepHistory,

    /// A tombstone drops every earlier value for the key.
    ///
    /// A key that is removed and never written again disappears from the map.
    ClearHistory,
}

/// Configuration for scanning a log.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Size of the chunks the cursor reads from the source.
    pub read_buffer_size: usize,

    /// Largest key length accepted before the scan is abandoned.
    ///
    /// Unlimited by default; lengths running past the source end the scan
    /// as truncated without allocating.
    pub max_key_len: u32,

    /// Largest value length accepted before the scan is abandoned.
    pub max_value_len: u32,

    /// How tombstone records affect earlier values.
    pub tombstone_policy: TombstonePolicy,

    /// Scan to the end of the source when the declared size is zero.
    ///
    /// Freshly created logs are sometimes written with a zero size header
    /// even though they hold records.
    pub zero_size_unbounded: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: 64 * 1024,      // 64 KB
            max_key_len: u32::MAX,
            max_value_len: u32::MAX,
            tombstone_policy: TombstonePolicy::KeepHistory,
            zero_size_unbounded: true,
        }
    }
}

impl ScanConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cursor read chunk size. Zero is treated as one byte.
    #[must_use]
    pub const fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = if size == 0 { 1 } else { size };
        self
    }

    /// Sets the maximum accepted key length.
    #[must_use]
    pub const fn max_key_len(mut self, len: u32) -> Self {
        self.max_key_len = len;
        self
    }

    /// Sets the maximum accepted value length.
    #[must_use]
    pub const fn max_value_len(mut self, len: u32) -> Self {
        self.max_value_len = len;
        self
    }

    /// Sets the tombstone policy.
    #[must_use]
    pub const fn tombstone_policy(mut self, policy: TombstonePolicy) -> Self {
        self.tombstone_policy = policy;
        self
    }

    /// Sets whether a zero declared size means "scan to end of source".
    #[must_use]
    pub const fn zero_size_unbounded(mut self, value: bool) -> Self {
        self.zero_size_unbounded = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.tombstone_policy, TombstonePolicy::KeepHistory);
        assert!(config.zero_size_unbounded);
        assert_eq!(config.read_buffer_size, 64 * 1024);
        assert_eq!(config.max_key_len, u32::MAX);
        assert_eq!(config.max_value_len, u32::MAX);
    }

    #[test]
    fn builder_pattern() {
        let config = ScanConfig::new()
            .read_buffer_size(16)
            .max_key_len(8)
            .tombstone_policy(TombstonePolicy::ClearHistory)
            .zero_size_unbounded(false);

        assert_eq!(config.read_buffer_size, 16);
        assert_eq!(config.max_key_len, 8);
        assert_eq!(config.tombstone_policy, TombstonePolicy::ClearHistory);
        assert!(!config.zero_size_unbounded);
    }

    #[test]
    fn zero_buffer_size_is_clamped() {
        assert_eq!(ScanConfig::new().read_buffer_size(0).read_buffer_size, 1);
    }
}
