use serde::{Deserialize, Serialize};
use std::fmt;

/// ClickUp task priority. The wire value is the integer id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    Urgent,
    High,
    Normal,
    Low,
}

impl Priority {
    /// Dialog order: the default first.
    pub const LABELS: [&'static str; 4] = ["Normal", "Low", "High", "Urgent"];

    pub fn value(&self) -> u8 {
        match self {
            Priority::Urgent => 1,
            Priority::High => 2,
            Priority::Normal => 3,
            Priority::Low => 4,
        }
    }

    pub fn from_value(value: u8) -> Option<Priority> {
        match value {
            1 => Some(Priority::Urgent),
            2 => Some(Priority::High),
            3 => Some(Priority::Normal),
            4 => Some(Priority::Low),
            _ => None,
        }
    }

    /// Unknown or missing labels fall back to `Normal`.
    pub fn from_label(label: Option<&str>) -> Priority {
        match label {
            Some("Urgent") => Priority::Urgent,
            Some("High") => Priority::High,
            Some("Low") => Priority::Low,
            _ => Priority::Normal,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Urgent => "Urgent",
            Priority::High => "High",
            Priority::Normal => "Normal",
            Priority::Low => "Low",
        }
    }

    /// Label used in task tables.
    pub fn display_label(&self) -> &'static str {
        match self {
            Priority::Urgent => "\u{1F534} Urgent",
            Priority::High => "\u{1F7E0} High",
            Priority::Normal => "\u{1F535} Normal",
            Priority::Low => "\u{26AA} Low",
        }
    }
}

/// Sort rank for an optional priority: Urgent first, unset last.
pub fn sort_rank(priority: Option<Priority>) -> u8 {
    match priority {
        Some(p) => p.value() - 1,
        None => u8::MAX,
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        p.value()
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Priority::from_value(value).ok_or_else(|| format!("invalid priority {value}"))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_mapping_is_fixed() {
        assert_eq!(Priority::from_label(Some("Low")).value(), 4);
        assert_eq!(Priority::from_label(Some("Normal")).value(), 3);
        assert_eq!(Priority::from_label(Some("High")).value(), 2);
        assert_eq!(Priority::from_label(Some("Urgent")).value(), 1);
    }

    #[test]
    fn unknown_or_missing_label_defaults_to_normal() {
        assert_eq!(Priority::from_label(None).value(), 3);
        assert_eq!(Priority::from_label(Some("urgent")).value(), 3);
        assert_eq!(Priority::from_label(Some("")).value(), 3);
        assert_eq!(Priority::from_label(Some("Critical")).value(), 3);
    }

    #[test]
    fn dialog_labels_round_trip() {
        for label in Priority::LABELS {
            assert_eq!(Priority::from_label(Some(label)).label(), label);
        }
        assert_eq!(Priority::LABELS[0], Priority::Normal.label());
    }

    #[test]
    fn serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Priority::Urgent).unwrap(), "1");
        let p: Priority = serde_json::from_str("4").unwrap();
        assert_eq!(p, Priority::Low);
        assert!(serde_json::from_str::<Priority>("7").is_err());
    }

    #[test]
    fn unset_sorts_last() {
        let mut ranks = vec![
            sort_rank(None),
            sort_rank(Some(Priority::Low)),
            sort_rank(Some(Priority::Urgent)),
            sort_rank(Some(Priority::Normal)),
            sort_rank(Some(Priority::High)),
        ];
        ranks.sort();
        assert_eq!(ranks, vec![0, 1, 2, 3, u8::MAX]);
    }
}
