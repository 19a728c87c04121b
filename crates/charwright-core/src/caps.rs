//! # Golden Rule Cap
//!
//! Advisory ceiling on the cumulative bonus an attribute may carry, based on
//! its base value.
//!
//! | Base | Cap |
//! |------|-----|
//! | ≥ 11 | 6 |
//! | 10 | 5 |
//! | ≤ 9 | 4 |
//!
//! **Caps are informational only.** Exceeding one produces a warning for
//! display; it never blocks a selection or a step transition.

use crate::stats::DerivedStats;
use serde::{Deserialize, Serialize};

/// Bonus ceiling for an attribute with the given base value.
#[must_use]
pub const fn cap_for(base: i32) -> i32 {
    if base >= 11 {
        6
    } else if base == 10 {
        5
    } else {
        4
    }
}

/// An attribute whose bonus exceeds its cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapWarning {
    pub attribute: String,
    pub base: i32,
    pub bonus: i32,
    pub cap: i32,
    pub message: String,
}

/// Every attribute over its cap, in attribute order.
#[must_use]
pub fn cap_warnings(stats: &DerivedStats) -> Vec<CapWarning> {
    stats
        .base
        .iter()
        .filter_map(|(attribute, &base)| {
            let bonus = stats.bonus(attribute).unwrap_or(0);
            let cap = cap_for(base);
            (bonus > cap).then(|| CapWarning {
                attribute: attribute.clone(),
                base,
                bonus,
                cap,
                message: format!(
                    "{attribute} bonus +{bonus} exceeds the Golden Rule cap of +{cap} for base {base}"
                ),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributeMap;

    fn stats_with(attribute: &str, base: i32, bonus: i32) -> DerivedStats {
        let mut stats = DerivedStats::from_base(AttributeMap::from([(attribute.to_string(), base)]));
        stats.bonus.insert(attribute.to_string(), bonus);
        stats.total.insert(attribute.to_string(), base + bonus);
        stats
    }

    #[test]
    fn cap_table() {
        assert_eq!(cap_for(9), 4);
        assert_eq!(cap_for(10), 5);
        assert_eq!(cap_for(11), 6);
        assert_eq!(cap_for(25), 6);
        assert_eq!(cap_for(-3), 4);
    }

    #[test]
    fn cap_is_monotonic() {
        for base in -20..40 {
            assert!(cap_for(base) <= cap_for(base + 1));
        }
    }

    #[test]
    fn at_cap_is_not_warned() {
        assert!(cap_warnings(&stats_with("Might", 10, 5)).is_empty());
    }

    #[test]
    fn over_cap_is_warned_without_touching_totals() {
        let stats = stats_with("Might", 9, 5);
        let warnings = cap_warnings(&stats);

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].cap, 4);
        assert!(warnings[0].message.contains("Might"));
        assert_eq!(stats.total("Might"), Some(14));
    }
}
