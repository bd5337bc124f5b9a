//! Centralized constants for the power core.
//!
//! Tick timing, document encoding and message keys shared by the codec,
//! cooldown tracker and permission cache. Defaults here seed
//! [`crate::config::PowerCoreConfig`].

// =====================================================
// Timing
// =====================================================

/// Logical game ticks per real-time second
pub const TICKS_PER_SECOND: u64 = 20;

/// Wall-clock milliseconds per logical tick
pub const MILLIS_PER_TICK: u64 = 1000 / TICKS_PER_SECOND;

// =====================================================
// Document encoding
// =====================================================

/// Separator used for collection attributes in the config document
pub const LIST_SEPARATOR: char = ',';

/// Literal token that resets an attribute to its unset/default value
pub const NULL_TOKEN: &str = "null";

/// Literal token resolving an item-type attribute to the sender's held item
pub const HAND_TOKEN: &str = "HAND";

/// Namespace applied to resource keys written without one
pub const DEFAULT_NAMESPACE: &str = "core";

/// Separator between permission nodes in a permission string
pub const PERMISSION_SEPARATOR: char = ';';

/// Permission string that requires nothing
pub const WILDCARD_PERMISSION: &str = "*";

/// Default capacity of the permission parse cache
pub const PERMISSION_CACHE_CAPACITY: usize = 1000;

// =====================================================
// Message keys (resolved by the host's localization)
// =====================================================

pub const MSG_IGNORED_TRIGGER: &str = "message.power.ignored_trigger";
pub const MSG_COOLDOWN_POWER: &str = "message.cooldown.power";
pub const MSG_COOLDOWN_GENERAL: &str = "message.cooldown.general";
pub const MSG_INVALID_VALUE: &str = "message.error.invalid_value";

/// Returns true when `key` matches the strict resource key grammar `[a-z0-9/._-]+`
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.bytes().all(|b| {
            b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'/' | b'.' | b'_' | b'-')
        })
}
