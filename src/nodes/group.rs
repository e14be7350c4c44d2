//! Expandable node groups
//!
//! A group is a run of like-typed slots that grows when its trailing free slot
//! gets connected and shrinks back when slots are released. Slots are never
//! renumbered, so ids held by the connection registry stay valid.

use super::ids::PortId;
use super::layout::even_fraction;
use super::port::PortDirection;
use crate::constants::group::{DEFAULT_BASE_LABEL, DEFAULT_MAX_FREE, MIN_AVAILABLE};
use serde::{Deserialize, Serialize};

/// How slot labels are derived from their 1-based index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "template", rename_all = "snake_case")]
pub enum LabelFormat {
    /// "Craft 1", "Craft 2", ...
    Numbered,
    /// "Craft", "Craft 2", "Craft 3", ...
    BareFirst,
    /// Template with `{base}` and `{index}` placeholders
    Template(String),
}

impl LabelFormat {
    pub fn format(&self, base: &str, index: usize) -> String {
        match self {
            LabelFormat::Numbered => format!("{} {}", base, index),
            LabelFormat::BareFirst if index == 1 => base.to_string(),
            LabelFormat::BareFirst => format!("{} {}", base, index),
            LabelFormat::Template(template) => template
                .replace("{base}", base)
                .replace("{index}", &index.to_string()),
        }
    }
}

impl Default for LabelFormat {
    fn default() -> Self {
        LabelFormat::Numbered
    }
}

/// Static description of an expandable group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub base_label: String,
    pub label_format: LabelFormat,
    pub direction: PortDirection,
    pub node_type: String,
    pub section: Option<String>,
    pub anchor: Option<String>,
    pub anchor_offset: f32,
    pub min_spacing: Option<f32>,
    /// Hard cap on simultaneously unconnected slots
    pub max_free: usize,
    pub allow_multiple_connections: bool,
    /// Defaults to the edge matching `direction`
    pub relative_x: Option<f32>,
    /// Vertical band the slots are evenly spread over
    pub band: (f32, f32),
}

impl GroupConfig {
    pub fn new(direction: PortDirection, node_type: impl Into<String>) -> Self {
        Self {
            base_label: DEFAULT_BASE_LABEL.to_string(),
            label_format: LabelFormat::default(),
            direction,
            node_type: node_type.into(),
            section: None,
            anchor: None,
            anchor_offset: 0.0,
            min_spacing: None,
            max_free: DEFAULT_MAX_FREE,
            allow_multiple_connections: false,
            relative_x: None,
            band: (0.0, 1.0),
        }
    }

    pub fn labeled(mut self, base_label: impl Into<String>, format: LabelFormat) -> Self {
        self.base_label = base_label.into();
        self.label_format = format;
        self
    }

    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_anchor(mut self, anchor: impl Into<String>, offset: f32) -> Self {
        self.anchor = Some(anchor.into());
        self.anchor_offset = offset;
        self
    }

    pub fn with_min_spacing(mut self, spacing: f32) -> Self {
        self.min_spacing = Some(spacing);
        self
    }

    pub fn with_max_free(mut self, max_free: usize) -> Self {
        self.max_free = max_free;
        self
    }

    pub fn with_band(mut self, top: f32, bottom: f32) -> Self {
        self.band = (top, bottom);
        self
    }

    pub fn multiple(mut self, allow: bool) -> Self {
        self.allow_multiple_connections = allow;
        self
    }

    /// The cap actually enforced; a group always keeps room for one free slot
    pub fn effective_max_free(&self) -> usize {
        self.max_free.max(MIN_AVAILABLE)
    }

    pub fn label_for(&self, index: usize) -> String {
        self.label_format.format(&self.base_label, index)
    }

    pub fn relative_x(&self) -> f32 {
        self.relative_x.unwrap_or(match self.direction {
            PortDirection::Input => 0.0,
            PortDirection::Output => 1.0,
        })
    }

    /// Relative Y of slot `index` out of `total`
    pub fn relative_y_for(&self, index: usize, total: usize) -> f32 {
        let (top, bottom) = self.band;
        top + (bottom - top) * even_fraction(index, total)
    }
}

/// Live group state: configuration plus ordered member slots
#[derive(Debug, Clone)]
pub struct ExpandableGroup {
    pub key: String,
    pub config: GroupConfig,
    pub members: Vec<PortId>,
}

impl ExpandableGroup {
    pub fn new(key: impl Into<String>, config: GroupConfig) -> Self {
        Self {
            key: key.into(),
            config,
            members: Vec::new(),
        }
    }

    /// 1-based index for the next appended slot
    pub fn next_index(&self) -> usize {
        self.members.len() + 1
    }

    pub fn snapshot(&self) -> GroupSnapshot {
        GroupSnapshot {
            key: self.key.clone(),
            slots: self.members.clone(),
        }
    }

    /// Whether a slot should be appended after one of the members got connected
    ///
    /// `free[i]` tells whether member `i` is unconnected.
    pub fn should_grow(&self, free: &[bool]) -> bool {
        let free_count = free.iter().filter(|f| **f).count();
        let trailing_free = free.last().copied().unwrap_or(false);
        free_count < self.config.effective_max_free() && (free_count < MIN_AVAILABLE || !trailing_free)
    }

    /// Member indices to remove after one of the members got released
    ///
    /// The trailing free run is cut back to a single slot, then free slots are
    /// dropped from the end until the cap holds. At least one slot remains.
    pub fn slots_to_trim(&self, free: &[bool]) -> Vec<usize> {
        let mut removed = Vec::new();
        let mut remaining = free.len();

        let trailing_run = free.iter().rev().take_while(|f| **f).count();
        for index in (free.len() - trailing_run + 1..free.len()).rev() {
            if remaining <= MIN_AVAILABLE {
                break;
            }
            removed.push(index);
            remaining -= 1;
        }

        let mut free_count = free.iter().filter(|f| **f).count() - removed.len();
        for index in (0..free.len()).rev() {
            if free_count <= self.config.effective_max_free() || remaining <= MIN_AVAILABLE {
                break;
            }
            if free[index] && !removed.contains(&index) {
                removed.push(index);
                remaining -= 1;
                free_count -= 1;
            }
        }
        removed
    }
}

/// Serialized form of a group: its ordered slot ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    pub key: String,
    pub slots: Vec<PortId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(max_free: usize, members: usize) -> ExpandableGroup {
        let mut group = ExpandableGroup::new(
            "craft-slots",
            GroupConfig::new(PortDirection::Input, "craft").with_max_free(max_free),
        );
        group.members = (0..members).map(|i| PortId::new(format!("slot-{i}"))).collect();
        group
    }

    #[test]
    fn test_label_formats() {
        assert_eq!(LabelFormat::Numbered.format("Connection", 1), "Connection 1");
        assert_eq!(LabelFormat::BareFirst.format("Craft", 1), "Craft");
        assert_eq!(LabelFormat::BareFirst.format("Craft", 3), "Craft 3");
        assert_eq!(
            LabelFormat::Template("{base} #{index}".into()).format("Bay", 2),
            "Bay #2"
        );
    }

    #[test]
    fn test_grow_when_last_free_slot_connects() {
        let group = group(2, 1);
        assert!(group.should_grow(&[false]));
    }

    #[test]
    fn test_no_grow_while_trailing_slot_free() {
        let group = group(2, 3);
        assert!(!group.should_grow(&[false, true, true]));
        assert!(!group.should_grow(&[true, false, true]));
    }

    #[test]
    fn test_grow_when_trailing_slot_taken_under_cap() {
        let group = group(2, 3);
        assert!(group.should_grow(&[false, true, false]));
    }

    #[test]
    fn test_saturated_group_does_not_grow() {
        let group = group(2, 3);
        assert!(!group.should_grow(&[true, true, false]));
    }

    #[test]
    fn test_trim_trailing_run_to_one() {
        let group = group(2, 4);
        assert_eq!(group.slots_to_trim(&[false, true, true, true]), vec![3, 2]);
    }

    #[test]
    fn test_trim_keeps_interior_free_slots() {
        let group = group(2, 3);
        assert!(group.slots_to_trim(&[true, false, true]).is_empty());
    }

    #[test]
    fn test_trim_enforces_cap() {
        let group = group(2, 4);
        assert_eq!(group.slots_to_trim(&[true, true, false, true]), vec![3]);
    }

    #[test]
    fn test_trim_never_empties_group() {
        let group = group(2, 3);
        assert_eq!(group.slots_to_trim(&[true, true, true]), vec![2, 1]);
    }

    #[test]
    fn test_zero_cap_still_allows_one_free_slot() {
        let group = group(0, 1);
        assert_eq!(group.config.effective_max_free(), 1);
        assert!(group.should_grow(&[false]));
    }

    #[test]
    fn test_relative_y_uses_even_spacing_within_band() {
        let config = GroupConfig::new(PortDirection::Input, "craft").with_band(0.2, 0.6);
        assert!((config.relative_y_for(0, 1) - 0.4).abs() < 1e-6);
        assert!((config.relative_y_for(0, 3) - 0.3).abs() < 1e-6);
        assert!((config.relative_y_for(2, 3) - 0.5).abs() < 1e-6);
    }
}
