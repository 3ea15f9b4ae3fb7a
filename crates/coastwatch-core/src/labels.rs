//! The closed pollution label set and its display registry.
//!
//! Label order is an invariant: it defines the index mapping shared with
//! the prompt set and the classification distribution. Reordering the
//! variants without reordering the prompts breaks the classifier.

use serde::{Deserialize, Serialize};

/// A pollution category. The variant order is load-bearing (see module docs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Plastic,
    OilSpill,
    OtherSolidWaste,
    MarineDebris,
    NoWaste,
}

impl Label {
    /// Number of labels in the closed set.
    pub const COUNT: usize = 5;

    /// All labels in canonical order.
    pub const ALL: [Label; Label::COUNT] = [
        Label::Plastic,
        Label::OilSpill,
        Label::OtherSolidWaste,
        Label::MarineDebris,
        Label::NoWaste,
    ];

    /// Position of this label in the canonical order.
    pub fn index(self) -> usize {
        match self {
            Label::Plastic => 0,
            Label::OilSpill => 1,
            Label::OtherSolidWaste => 2,
            Label::MarineDebris => 3,
            Label::NoWaste => 4,
        }
    }

    /// Snake_case identifier, as stored by the application layer.
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Plastic => "plastic",
            Label::OilSpill => "oil_spill",
            Label::OtherSolidWaste => "other_solid_waste",
            Label::MarineDebris => "marine_debris",
            Label::NoWaste => "no_waste",
        }
    }

    /// Parse a stored identifier. Returns `None` for anything outside the
    /// closed set; callers wanting a safe default should go through
    /// [`category_info_for`] instead.
    pub fn parse(s: &str) -> Option<Label> {
        Label::ALL.into_iter().find(|l| l.as_str() == s)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display metadata for a pollution category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    /// Human-readable category name
    pub display_name: &'static str,
    /// Emoji icon for client rendering
    pub icon: &'static str,
    /// Hex color for client rendering
    pub color: &'static str,
}

/// Static display table, indexed in label order.
const CATEGORY_TABLE: [CategoryInfo; Label::COUNT] = [
    CategoryInfo {
        display_name: "Plastic Pollution",
        icon: "🥤",
        color: "#ef4444",
    },
    CategoryInfo {
        display_name: "Oil Spill",
        icon: "🛢️",
        color: "#1f2937",
    },
    CategoryInfo {
        display_name: "Solid Waste",
        icon: "🗑️",
        color: "#92400e",
    },
    CategoryInfo {
        display_name: "Marine Debris",
        icon: "🎣",
        color: "#0ea5e9",
    },
    CategoryInfo {
        display_name: "No Waste Detected",
        icon: "✅",
        color: "#22c55e",
    },
];

/// Look up display metadata for a label.
pub fn category_info(label: Label) -> &'static CategoryInfo {
    &CATEGORY_TABLE[label.index()]
}

/// Look up display metadata for a raw label string.
///
/// Unrecognized input (e.g. stale persisted data) resolves to the
/// `other_solid_waste` entry rather than failing.
pub fn category_info_for(raw: &str) -> &'static CategoryInfo {
    let label = Label::parse(raw).unwrap_or(Label::OtherSolidWaste);
    category_info(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_order_matches_index() {
        for (i, label) in Label::ALL.into_iter().enumerate() {
            assert_eq!(label.index(), i);
        }
    }

    #[test]
    fn test_label_parse_roundtrip() {
        for label in Label::ALL {
            assert_eq!(Label::parse(label.as_str()), Some(label));
        }
        assert_eq!(Label::parse("sewage"), None);
    }

    #[test]
    fn test_label_serde_snake_case() {
        let json = serde_json::to_string(&Label::OilSpill).unwrap();
        assert_eq!(json, "\"oil_spill\"");
        let parsed: Label = serde_json::from_str("\"marine_debris\"").unwrap();
        assert_eq!(parsed, Label::MarineDebris);
    }

    #[test]
    fn test_category_info_no_waste() {
        let info = category_info(Label::NoWaste);
        assert_eq!(info.display_name, "No Waste Detected");
        assert_eq!(info.color, "#22c55e");
    }

    #[test]
    fn test_category_info_for_unknown_falls_back() {
        let info = category_info_for("chemical_runoff");
        assert_eq!(info.display_name, "Solid Waste");
        assert_eq!(info.color, "#92400e");
    }

    #[test]
    fn test_category_info_for_known() {
        let info = category_info_for("plastic");
        assert_eq!(info.display_name, "Plastic Pollution");
    }
}
