//! Reflow engine: turns relative port positions into on-widget pixel positions
//!
//! Ports are laid out in two columns, inputs on the left edge and outputs on
//! the right. Within a column, ports that share an anchor keep at least their
//! minimum spacing from each other. Overlapping ports are gathered into blocks
//! centered on the mean of their targets, so a crowd spreads out evenly in
//! both directions and keeps its order.

use super::port::{Port, PortDirection};
use crate::config::LayoutConfig;
use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vertical metrics of a widget's content box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub header_height: f32,
    pub top_padding: f32,
    pub bottom_padding: f32,
    pub available_height: f32,
    pub content_top: f32,
    pub content_bottom: f32,
}

impl LayoutMetrics {
    pub fn compute(height: f32, config: &LayoutConfig) -> Self {
        let available_height = (height
            - config.header_height
            - config.top_padding
            - config.bottom_padding)
            .max(config.min_available_height);
        let content_top = config.header_height + config.top_padding;
        Self {
            header_height: config.header_height,
            top_padding: config.top_padding,
            bottom_padding: config.bottom_padding,
            available_height,
            content_top,
            content_bottom: content_top + available_height,
        }
    }

    /// Maps a 0..1 value into the content box, clamping out-of-range input
    pub fn y_for(&self, normalized: f32) -> f32 {
        self.content_top + normalized.clamp(0.0, 1.0) * self.available_height
    }

    pub fn normalize(&self, y: f32) -> f32 {
        ((y - self.content_top) / self.available_height).clamp(0.0, 1.0)
    }
}

/// A named region on the widget that ports can pin themselves to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorRegion {
    /// Top edge relative to the widget's top edge
    pub top: f32,
    pub height: f32,
    /// Extra offset applied to every port on this anchor
    #[serde(default)]
    pub offset: f32,
}

impl AnchorRegion {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height, offset: 0.0 }
    }

    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    pub fn center(&self) -> f32 {
        self.top + self.height / 2.0 + self.offset
    }
}

/// Anchor regions by name; re-adding a name replaces the old region
#[derive(Debug, Clone, Default)]
pub struct LayoutAnchors {
    regions: Vec<(String, AnchorRegion)>,
}

impl LayoutAnchors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: impl Into<String>, region: AnchorRegion) {
        let id = id.into();
        self.regions.retain(|(existing, _)| *existing != id);
        self.regions.push((id, region));
    }

    pub fn get(&self, id: &str) -> Option<&AnchorRegion> {
        self.regions
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, region)| region)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Even-spacing law shared by routes and expandable groups:
/// a single item sits at 0.5, otherwise item `i` of `n` sits at `(i+1)/(n+1)`
pub fn even_fraction(index: usize, total: usize) -> f32 {
    if total <= 1 {
        0.5
    } else {
        (index + 1) as f32 / (total + 1) as f32
    }
}

/// Target Y of a port before spacing is resolved
pub fn target_y(port: &Port, anchors: &LayoutAnchors, metrics: &LayoutMetrics) -> f32 {
    let mut normalized = port.relative_y.clamp(0.0, 1.0);
    if let Some(region) = port.anchor.as_deref().and_then(|id| anchors.get(id)) {
        normalized = metrics.normalize(region.center() + port.anchor_offset);
    }
    metrics.y_for(normalized)
}

/// Center X of a port, pushed outward from the widget edge
pub fn port_x(port: &Port, width: f32, config: &LayoutConfig) -> f32 {
    let base = width * port.relative_x.clamp(0.0, 1.0);
    let outward = config.edge_offset + config.port_size / 2.0;
    match port.direction {
        PortDirection::Input => base - outward,
        PortDirection::Output => base + outward,
    }
}

/// One port's input to spacing resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingEntry {
    pub target: f32,
    pub min_spacing: f32,
}

#[derive(Debug)]
struct Block {
    /// Indices into the sorted order
    members: Vec<usize>,
    /// Offset of each member from the block's first member
    offsets: Vec<f32>,
    /// Sum of `target - offset` over members; `start = sum / len`
    sum: f32,
}

impl Block {
    fn start(&self) -> f32 {
        self.sum / self.members.len() as f32
    }

    fn end(&self) -> f32 {
        self.start() + self.offsets.last().copied().unwrap_or(0.0)
    }

    fn first(&self) -> usize {
        self.members[0]
    }

    fn last(&self) -> usize {
        self.members[self.members.len() - 1]
    }

    fn absorb(mut self, next: Block, gap: f32) -> Block {
        let shift = self.offsets.last().copied().unwrap_or(0.0) + gap;
        self.sum += next.sum - shift * next.members.len() as f32;
        self.offsets.extend(next.offsets.iter().map(|offset| offset + shift));
        self.members.extend(next.members);
        self
    }
}

/// Resolves overlaps between ports sharing an anchor
///
/// Returns one Y per entry, in entry order. Consecutive ports (by target, ties
/// broken by entry order) end up at least `max(a.min_spacing, b.min_spacing)`
/// apart. The result is then fitted into `[top, bottom]`; when the entries do
/// not fit, spacing wins over the top bound.
pub fn resolve_spacing(entries: &[SpacingEntry], top: f32, bottom: f32) -> Vec<f32> {
    let count = entries.len();
    if count == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..count).collect();
    order.sort_by(|a, b| entries[*a].target.total_cmp(&entries[*b].target));

    let gap = |a: usize, b: usize| -> f32 {
        entries[order[a]].min_spacing.max(entries[order[b]].min_spacing).max(0.0)
    };

    let mut blocks: Vec<Block> = Vec::new();
    for (rank, &index) in order.iter().enumerate() {
        let mut block = Block {
            members: vec![rank],
            offsets: vec![0.0],
            sum: entries[index].target,
        };
        while let Some(previous) = blocks.last() {
            let required = gap(previous.last(), block.first());
            if previous.end() + required <= block.start() {
                break;
            }
            let Some(previous) = blocks.pop() else { break };
            block = previous.absorb(block, required);
        }
        blocks.push(block);
    }

    let mut sorted_y = vec![0.0; count];
    for block in &blocks {
        let start = block.start();
        for (member, offset) in block.members.iter().zip(&block.offsets) {
            sorted_y[*member] = start + offset;
        }
    }

    // Fit into the content box without breaking spacing
    sorted_y[0] = sorted_y[0].max(top);
    for rank in 1..count {
        sorted_y[rank] = sorted_y[rank].max(sorted_y[rank - 1] + gap(rank - 1, rank));
    }
    sorted_y[count - 1] = sorted_y[count - 1].min(bottom);
    for rank in (0..count - 1).rev() {
        sorted_y[rank] = sorted_y[rank].min(sorted_y[rank + 1] - gap(rank, rank + 1));
    }

    let mut result = vec![0.0; count];
    for (rank, &index) in order.iter().enumerate() {
        result[index] = sorted_y[rank];
    }
    result
}

/// Recomputes `position` for every port of a widget of the given size
///
/// Only `position` is written, so the pass is idempotent.
pub fn reflow(ports: &mut [Port], size: Vec2, anchors: &LayoutAnchors, config: &LayoutConfig) {
    let metrics = LayoutMetrics::compute(size.y, config);

    let mut buckets: BTreeMap<(PortDirection, Option<String>), Vec<usize>> = BTreeMap::new();
    for (index, port) in ports.iter().enumerate() {
        buckets
            .entry((port.direction, port.anchor.clone()))
            .or_default()
            .push(index);
    }

    for members in buckets.values() {
        let entries: Vec<SpacingEntry> = members
            .iter()
            .map(|&index| SpacingEntry {
                target: target_y(&ports[index], anchors, &metrics),
                min_spacing: ports[index].min_spacing.unwrap_or(config.default_min_spacing),
            })
            .collect();
        let resolved = resolve_spacing(&entries, metrics.content_top, metrics.content_bottom);
        for (&index, y) in members.iter().zip(resolved) {
            let x = port_x(&ports[index], size.x, config);
            ports[index].position = Pos2::new(x, y);
        }
    }
}
