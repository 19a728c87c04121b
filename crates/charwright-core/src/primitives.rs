//! # Rule Primitives
//!
//! Hardcoded rule constants for the Charwright core.
//!
//! The catalog supplies every option, but the arithmetic around those options
//! is fixed. These values are compiled into the binary and immutable at runtime.

use std::time::Duration;

/// Canonical attribute names every character starts with.
///
/// Species tables overlay these; a species may introduce additional attributes
/// but never removes one of these.
pub const CORE_ATTRIBUTES: [&str; 6] = ["Might", "Finesse", "Vitality", "Intellect", "Wits", "Presence"];

/// Base value for any core attribute a species table leaves out.
pub const DEFAULT_ATTRIBUTE_VALUE: i32 = 10;

/// Marker used by trait options that grant nothing in a stat slot.
pub const NO_STAT: &str = "None";

// =============================================================================
// ELIGIBILITY
// =============================================================================

/// Minimum attribute total required to unlock a spell keyed to that attribute.
pub const SPELL_ATTRIBUTE_THRESHOLD: i32 = 12;

/// Maximum number of spells a character may hold.
pub const MAX_CHOSEN_SPELLS: usize = 2;

/// Only spells of this tier are offered during character building.
pub const SELECTABLE_SPELL_TIER: u8 = 1;

// =============================================================================
// WIZARD
// =============================================================================

/// How long a validation notice stays visible after a rejected advance.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

/// Effect text attached to every skill granted by a background option.
pub const SKILL_MASTERY_EFFECT: &str = "Skill Mastery";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_attribute_value_is_ten() {
        assert_eq!(DEFAULT_ATTRIBUTE_VALUE, 10);
    }

    #[test]
    fn core_attributes_are_unique() {
        let unique: std::collections::BTreeSet<_> = CORE_ATTRIBUTES.iter().collect();
        assert_eq!(unique.len(), CORE_ATTRIBUTES.len());
    }

    #[test]
    fn notice_ttl_is_three_seconds() {
        assert_eq!(NOTICE_TTL.as_secs(), 3);
    }
}
