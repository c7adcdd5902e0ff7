//! How insights from the backend map onto visual treatment: an icon per
//! insight type and a colour per priority.

use crate::api::models::{InsightKind, InsightPriority};

/// The colour family for an insight's priority chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityTone {
    /// Red, for high priority insights that need attention now.
    Error,
    /// Amber, for medium priority insights.
    Warning,
    /// Green, for low priority informational insights.
    Success,
}

pub fn priority_tone(priority: InsightPriority) -> PriorityTone {
    match priority {
        InsightPriority::High => PriorityTone::Error,
        InsightPriority::Medium => PriorityTone::Warning,
        InsightPriority::Low => PriorityTone::Success,
    }
}

pub fn priority_chip_class(priority: InsightPriority) -> &'static str {
    match priority_tone(priority) {
        PriorityTone::Error => {
            "inline-flex items-center px-2.5 py-0.5 text-xs font-semibold \
            rounded-full text-red-800 bg-red-100 dark:bg-red-900 dark:text-red-300"
        }
        PriorityTone::Warning => {
            "inline-flex items-center px-2.5 py-0.5 text-xs font-semibold \
            rounded-full text-amber-800 bg-amber-100 dark:bg-amber-900 dark:text-amber-300"
        }
        PriorityTone::Success => {
            "inline-flex items-center px-2.5 py-0.5 text-xs font-semibold \
            rounded-full text-green-800 bg-green-100 dark:bg-green-900 dark:text-green-300"
        }
    }
}

/// The glyph shown next to an insight title.
pub fn insight_icon(kind: InsightKind) -> &'static str {
    match kind {
        InsightKind::Spending => "↓",
        InsightKind::Saving => "$",
        InsightKind::Investment => "↗",
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::{InsightKind, InsightPriority};

    use super::{PriorityTone, insight_icon, priority_tone};

    #[test]
    fn priority_maps_to_tone() {
        assert_eq!(priority_tone(InsightPriority::High), PriorityTone::Error);
        assert_eq!(priority_tone(InsightPriority::Medium), PriorityTone::Warning);
        assert_eq!(priority_tone(InsightPriority::Low), PriorityTone::Success);
    }

    #[test]
    fn each_insight_kind_has_a_distinct_icon() {
        let icons = [
            insight_icon(InsightKind::Spending),
            insight_icon(InsightKind::Saving),
            insight_icon(InsightKind::Investment),
        ];

        for (i, icon) in icons.iter().enumerate() {
            for other in &icons[i + 1..] {
                assert_ne!(icon, other);
            }
        }
    }
}
