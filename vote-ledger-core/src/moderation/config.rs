//! Configuration types for downvote-triggered moderation.

/// Default number of downvotes at which an item is hidden.
pub const DEFAULT_AUTO_HIDE_THRESHOLD: u32 = 3;

/// Configuration for the auto-hide check run after each vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModerationConfig {
    /// Downvote count at or above which the moderation collaborator is invoked.
    ///
    /// `0` disables auto-hide.
    pub auto_hide_threshold: u32,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            auto_hide_threshold: DEFAULT_AUTO_HIDE_THRESHOLD,
        }
    }
}

impl ModerationConfig {
    pub fn new(auto_hide_threshold: u32) -> Self {
        Self { auto_hide_threshold }
    }

    /// A config that never invokes the moderation collaborator.
    pub fn disabled() -> Self {
        Self {
            auto_hide_threshold: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.auto_hide_threshold > 0
    }

    pub fn reaches_threshold(&self, downvotes: i64) -> bool {
        self.is_enabled() && downvotes >= i64::from(self.auto_hide_threshold)
    }
}
