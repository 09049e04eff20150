//! Diagram layout: which neurons are drawn, where, and how they connect.
//!
//! Coordinates are in diagram units with the y axis pointing up; the renderer
//! flips them onto the screen.

use std::collections::HashMap;
use std::fmt;

use egui::{Align2, Pos2, Rect, Vec2, pos2, vec2};

use crate::config::{Orientation, RenderConfig, normalize_max_display};
use crate::error::{Result, VisualizerError};
use crate::model::LayerInfo;
use crate::style::Role;

/// Distance between consecutive layers.
pub const LAYER_SPACING: f32 = 3.0;
/// Distance between neighbouring neurons of a layer.
pub const NEURON_SPACING: f32 = 1.5;
pub const NODE_RADIUS: f32 = 0.45;

/// Where the input/output annotations start or end, measured from the neuron center.
const ARROW_REACH: f32 = 0.9;
const BOX_DEPTH: f32 = LAYER_SPACING - 0.5;

/// One drawn position within a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Neuron at this zero-based index within its layer.
    Neuron(usize),
    /// Marker standing in for the elided middle of the layer.
    Ellipsis,
}

/// Text drawn inside a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotLabel {
    /// Global, 1-based neuron id.
    Neuron(usize),
    Ellipsis,
}

impl SlotLabel {
    pub fn id(self) -> Option<usize> {
        match self {
            SlotLabel::Neuron(id) => Some(id),
            SlotLabel::Ellipsis => None,
        }
    }
}

impl fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotLabel::Neuron(id) => write!(f, "{id}"),
            SlotLabel::Ellipsis => write!(f, "..."),
        }
    }
}

/// Which neurons of a layer are drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPlan {
    /// Real neuron count of the layer.
    pub width: usize,
    pub slots: Vec<Slot>,
    pub is_elided: bool,
}

impl DisplayPlan {
    /// Every neuron drawn, no ellipsis.
    pub fn full(width: usize) -> Self {
        Self {
            width,
            slots: (0..width).map(Slot::Neuron).collect(),
            is_elided: false,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of real neurons drawn.
    pub fn drawn_neurons(&self) -> usize {
        self.slots.iter().filter(|s| matches!(s, Slot::Neuron(_))).count()
    }

    /// Labels for each slot, given the global id of the layer's first neuron.
    pub fn labels(&self, first_id: usize) -> Vec<SlotLabel> {
        self.slots
            .iter()
            .map(|slot| match *slot {
                Slot::Neuron(i) => SlotLabel::Neuron(first_id + i),
                Slot::Ellipsis => SlotLabel::Ellipsis,
            })
            .collect()
    }
}

/// Decides which neurons of a `width`-wide layer are drawn under a display cap.
///
/// The cap is first normalized to an odd number (see [`normalize_max_display`]).
/// Wider layers keep their first and last `cap / 2` neurons with one ellipsis
/// slot between them.
pub fn summarize(width: usize, max_display: usize) -> DisplayPlan {
    let cap = normalize_max_display(max_display);
    if width <= cap {
        return DisplayPlan::full(width);
    }
    let half = cap / 2;
    let mut slots = Vec::with_capacity(2 * half + 1);
    slots.extend((0..half).map(Slot::Neuron));
    slots.push(Slot::Ellipsis);
    slots.extend((width - half..width).map(Slot::Neuron));
    DisplayPlan {
        width,
        slots,
        is_elided: true,
    }
}

/// Identifies a drawn slot: layer index and position within the drawn subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub layer: usize,
    pub slot: usize,
}

/// A piece of text anchored at a point.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub pos: Pos2,
    pub text: String,
    /// Which side of the text sits on `pos`.
    pub align: Align2,
}

/// Input/output annotation: an arrow with its `x_i` / `y_i` label.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowLayout {
    pub tail: Pos2,
    pub tip: Pos2,
    pub label: TextLayout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub key: NodeKey,
    pub center: Pos2,
    pub label: SlotLabel,
    pub arrow: Option<ArrowLayout>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerLayout {
    pub index: usize,
    pub role: Role,
    pub plan: DisplayPlan,
    /// Global id of the layer's first neuron, drawn or not.
    pub first_id: usize,
    pub nodes: Vec<NodeLayout>,
    /// Background box.
    pub bbox: Rect,
    pub title: TextLayout,
    pub info: Option<TextLayout>,
}

impl LayerLayout {
    pub fn width(&self) -> usize {
        self.plan.width
    }

    pub fn labels(&self) -> Vec<SlotLabel> {
        self.nodes.iter().map(|n| n.label).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: NodeKey,
    pub to: NodeKey,
    pub start: Pos2,
    pub end: Pos2,
}

/// All edges between layer `from_layer` and the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGroup {
    pub from_layer: usize,
    pub edges: Vec<Edge>,
}

/// Fully computed diagram, ready to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkLayout {
    pub orientation: Orientation,
    pub layers: Vec<LayerLayout>,
    pub edge_groups: Vec<EdgeGroup>,
    /// Figure size in inches; one diagram unit is one inch.
    pub canvas: Vec2,
    /// Widest displayed layer, in slots.
    pub max_display_width: usize,
}

impl NetworkLayout {
    pub fn layer(&self, idx: usize) -> Option<&LayerLayout> {
        self.layers.get(idx)
    }

    pub fn edge_count(&self) -> usize {
        self.edge_groups.iter().map(|g| g.edges.len()).sum()
    }

    /// Total neurons in the network, including elided ones.
    pub fn neuron_count(&self) -> usize {
        self.layers.iter().map(LayerLayout::width).sum()
    }

    /// Rectangle covering every box and anchor, with a margin for text.
    pub fn bounds(&self) -> Rect {
        let mut bounds = Rect::NOTHING;
        for layer in &self.layers {
            bounds = bounds.union(layer.bbox);
            bounds.extend_with(layer.title.pos);
            if let Some(info) = &layer.info {
                bounds.extend_with(info.pos);
            }
            for node in &layer.nodes {
                if let Some(arrow) = &node.arrow {
                    bounds.extend_with(arrow.label.pos);
                }
            }
        }
        bounds.expand2(vec2(2.0, 1.0))
    }

    /// Plain-text overview: one line per layer, one per edge group.
    pub fn describe(&self) -> String {
        let mut s = String::new();
        for layer in &self.layers {
            let labels: Vec<String> = layer.labels().iter().map(ToString::to_string).collect();
            s.push_str(&format!(
                "{}: {} neurons [{}]\n",
                layer.role.label(layer.index),
                layer.width(),
                labels.join(" ")
            ));
        }
        for group in &self.edge_groups {
            s.push_str(&format!(
                "edges {} -> {}: {}\n",
                group.from_layer,
                group.from_layer + 1,
                group.edges.len()
            ));
        }
        s
    }
}

/// Coordinate arithmetic for one orientation.
#[derive(Debug, Clone, Copy)]
struct Geometry {
    orientation: Orientation,
    n_layers: usize,
    max_width: usize,
}

impl Geometry {
    /// Position of the layer along the orientation axis.
    fn layer_axis(&self, layer_idx: usize) -> f32 {
        match self.orientation {
            Orientation::Vertical => (self.n_layers - 1 - layer_idx) as f32 * LAYER_SPACING,
            Orientation::Horizontal => layer_idx as f32 * LAYER_SPACING,
        }
    }

    /// Offset of a slot from the layer's central axis.
    fn slot_offset(slot: usize, n_slots: usize) -> f32 {
        if n_slots <= 1 {
            return 0.0;
        }
        slot as f32 * NEURON_SPACING - (n_slots - 1) as f32 * NEURON_SPACING / 2.0
    }

    fn node_center(&self, layer_idx: usize, slot: usize, n_slots: usize) -> Pos2 {
        let axis = self.layer_axis(layer_idx);
        let offset = Self::slot_offset(slot, n_slots);
        match self.orientation {
            Orientation::Vertical => pos2(offset, axis),
            // First neuron on top.
            Orientation::Horizontal => pos2(axis, -offset),
        }
    }

    fn layer_box(&self, layer_idx: usize) -> Rect {
        let axis = self.layer_axis(layer_idx);
        match self.orientation {
            Orientation::Vertical => Rect::from_center_size(
                pos2(0.0, axis),
                vec2(self.max_width as f32 * NEURON_SPACING, BOX_DEPTH),
            ),
            Orientation::Horizontal => Rect::from_center_size(
                pos2(axis, 0.0),
                vec2(
                    BOX_DEPTH,
                    self.max_width.saturating_sub(1) as f32 * NEURON_SPACING + 2.0,
                ),
            ),
        }
    }

    fn title(&self, layer_idx: usize, bbox: Rect, text: String) -> TextLayout {
        let axis = self.layer_axis(layer_idx);
        match self.orientation {
            Orientation::Vertical => TextLayout {
                pos: pos2(bbox.min.x - 0.5, axis),
                text,
                align: Align2::RIGHT_CENTER,
            },
            Orientation::Horizontal => TextLayout {
                pos: pos2(axis, bbox.max.y + 0.6),
                text,
                align: Align2::CENTER_BOTTOM,
            },
        }
    }

    fn info(&self, layer_idx: usize, bbox: Rect, text: String) -> TextLayout {
        let axis = self.layer_axis(layer_idx);
        match self.orientation {
            Orientation::Vertical => TextLayout {
                pos: pos2(bbox.max.x + 0.3, axis),
                text,
                align: Align2::LEFT_CENTER,
            },
            Orientation::Horizontal => TextLayout {
                pos: pos2(axis, bbox.min.y - 0.5),
                text,
                align: Align2::CENTER_TOP,
            },
        }
    }

    /// Arrow pointing into an input neuron.
    fn input_arrow(&self, center: Pos2, id: usize) -> ArrowLayout {
        let text = format!("x_{id}");
        match self.orientation {
            Orientation::Vertical => {
                let tail = center + vec2(0.0, ARROW_REACH);
                ArrowLayout {
                    tail,
                    tip: center + vec2(0.0, NODE_RADIUS),
                    label: TextLayout {
                        pos: tail,
                        text,
                        align: Align2::CENTER_BOTTOM,
                    },
                }
            }
            Orientation::Horizontal => {
                let tail = center - vec2(ARROW_REACH, 0.0);
                ArrowLayout {
                    tail,
                    tip: center - vec2(NODE_RADIUS, 0.0),
                    label: TextLayout {
                        pos: tail,
                        text,
                        align: Align2::RIGHT_CENTER,
                    },
                }
            }
        }
    }

    /// Arrow leaving an output neuron.
    fn output_arrow(&self, center: Pos2, id: usize) -> ArrowLayout {
        let text = format!("y_{id}");
        match self.orientation {
            Orientation::Vertical => {
                let tip = center - vec2(0.0, ARROW_REACH);
                ArrowLayout {
                    tail: center - vec2(0.0, NODE_RADIUS + 0.05),
                    tip,
                    label: TextLayout {
                        pos: tip,
                        text,
                        align: Align2::CENTER_TOP,
                    },
                }
            }
            Orientation::Horizontal => {
                let tip = center + vec2(NODE_RADIUS + 0.5, 0.0);
                ArrowLayout {
                    tail: center + vec2(NODE_RADIUS + 0.1, 0.0),
                    tip,
                    label: TextLayout {
                        pos: tip,
                        text,
                        align: Align2::LEFT_CENTER,
                    },
                }
            }
        }
    }

    /// Edge endpoints on the facing rims of two neurons.
    fn edge(&self, from: Pos2, to: Pos2) -> (Pos2, Pos2) {
        match self.orientation {
            Orientation::Vertical => (from - vec2(0.0, NODE_RADIUS), to + vec2(0.0, NODE_RADIUS)),
            Orientation::Horizontal => (from + vec2(NODE_RADIUS, 0.0), to - vec2(NODE_RADIUS, 0.0)),
        }
    }

    fn canvas(&self) -> Vec2 {
        let across = (self.max_width as f32).max(6.0);
        let along = (self.n_layers as f32 * 3.5).max(12.0);
        match self.orientation {
            Orientation::Vertical => vec2(across, along),
            Orientation::Horizontal => vec2(along, across),
        }
    }
}

/// Bookkeeping threaded through the per-layer steps of one layout run.
#[derive(Debug)]
pub struct LayoutState {
    /// Global id of the next layer's first neuron.
    next_id: usize,
    positions: HashMap<NodeKey, Pos2>,
    layers: Vec<LayerLayout>,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutState {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            positions: HashMap::new(),
            layers: Vec::new(),
        }
    }

    pub fn next_id(&self) -> usize {
        self.next_id
    }

    pub fn position(&self, key: NodeKey) -> Option<Pos2> {
        self.positions.get(&key).copied()
    }

    /// Lays out one layer and advances the id counter past all of its neurons.
    fn place_layer(
        &mut self,
        geometry: &Geometry,
        layer_idx: usize,
        plan: DisplayPlan,
        info: Option<&LayerInfo>,
    ) {
        let role = Role::classify(layer_idx, geometry.n_layers);
        let first_id = self.next_id;
        let n_slots = plan.slot_count();

        let nodes: Vec<NodeLayout> = plan
            .labels(first_id)
            .into_iter()
            .enumerate()
            .map(|(slot, label)| {
                let key = NodeKey {
                    layer: layer_idx,
                    slot,
                };
                let center = geometry.node_center(layer_idx, slot, n_slots);
                self.positions.insert(key, center);
                let arrow = match (role, label) {
                    (Role::Input, SlotLabel::Neuron(id)) => Some(geometry.input_arrow(center, id)),
                    (Role::Output, SlotLabel::Neuron(id)) => Some(geometry.output_arrow(center, id)),
                    _ => None,
                };
                NodeLayout {
                    key,
                    center,
                    label,
                    arrow,
                }
            })
            .collect();

        let bbox = geometry.layer_box(layer_idx);
        let title = geometry.title(layer_idx, bbox, role.label(layer_idx));
        let info = info.map(|i| geometry.info(layer_idx, bbox, i.describe()));

        // Elided neurons still consume ids.
        self.next_id += plan.width;

        self.layers.push(LayerLayout {
            index: layer_idx,
            role,
            plan,
            first_id,
            nodes,
            bbox,
            title,
            info,
        });
    }

    /// Dense connections between the displayed neurons of adjacent layers.
    fn connect(&self, geometry: &Geometry) -> Vec<EdgeGroup> {
        self.layers
            .windows(2)
            .map(|pair| {
                let (a, b) = (&pair[0], &pair[1]);
                let mut edges = Vec::with_capacity(a.plan.drawn_neurons() * b.plan.drawn_neurons());
                let drawn = |layer: &LayerLayout| -> Vec<(NodeKey, Pos2)> {
                    layer
                        .nodes
                        .iter()
                        .filter(|n| n.label != SlotLabel::Ellipsis)
                        .filter_map(|n| self.position(n.key).map(|p| (n.key, p)))
                        .collect()
                };
                let targets = drawn(b);
                for (from, from_pos) in drawn(a) {
                    for &(to, to_pos) in &targets {
                        let (start, end) = geometry.edge(from_pos, to_pos);
                        edges.push(Edge {
                            from,
                            to,
                            start,
                            end,
                        });
                    }
                }
                EdgeGroup {
                    from_layer: a.index,
                    edges,
                }
            })
            .collect()
    }
}

/// Checks that a topology can be drawn: at least two layers, none empty, and
/// few enough neurons in total to number them.
pub fn validate_topology(layer_sizes: &[usize]) -> Result<()> {
    if layer_sizes.len() < 2 {
        return Err(VisualizerError::topology(format!(
            "need at least an input and an output layer, got {} layer(s)",
            layer_sizes.len()
        )));
    }
    if let Some(idx) = layer_sizes.iter().position(|&w| w == 0) {
        return Err(VisualizerError::topology(format!("layer {idx} has no neurons")));
    }
    // Ids run from 1 to the total, so the total must leave room for the counter.
    let total = layer_sizes
        .iter()
        .try_fold(0usize, |acc, &w| acc.checked_add(w))
        .filter(|&total| total < usize::MAX);
    if total.is_none() {
        return Err(VisualizerError::topology("total neuron count overflows the id counter"));
    }
    Ok(())
}

/// Computes the complete diagram for a topology.
///
/// `layer_infos[i]` annotates layer `i + 1`; missing entries leave a layer
/// without annotation.
pub fn layout_network(
    layer_sizes: &[usize],
    layer_infos: &[LayerInfo],
    config: &RenderConfig,
) -> Result<NetworkLayout> {
    validate_topology(layer_sizes)?;
    if !layer_infos.is_empty() && layer_infos.len() + 1 != layer_sizes.len() {
        tracing::warn!(
            layers = layer_sizes.len(),
            infos = layer_infos.len(),
            "layer info count does not match the topology"
        );
    }

    let cap = config.display_cap();
    let widest = layer_sizes.iter().copied().max().unwrap_or(1);
    let geometry = Geometry {
        orientation: config.orientation,
        n_layers: layer_sizes.len(),
        max_width: cap.map_or(widest, |c| widest.min(c)),
    };

    let mut state = LayoutState::new();
    for (layer_idx, &width) in layer_sizes.iter().enumerate() {
        let plan = match cap {
            Some(cap) => summarize(width, cap),
            None => DisplayPlan::full(width),
        };
        if plan.is_elided {
            tracing::debug!(layer = layer_idx, width, slots = plan.slot_count(), "eliding layer");
        }
        let info = if config.show_layer_info && layer_idx > 0 {
            layer_infos.get(layer_idx - 1)
        } else {
            None
        };
        state.place_layer(&geometry, layer_idx, plan, info);
    }

    let edge_groups = state.connect(&geometry);
    Ok(NetworkLayout {
        orientation: config.orientation,
        layers: state.layers,
        edge_groups,
        canvas: geometry.canvas(),
        max_display_width: geometry.max_width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config(orientation: Orientation) -> RenderConfig {
        RenderConfig {
            orientation,
            ..RenderConfig::default()
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn summarize_keeps_narrow_layers_whole() {
        let plan = summarize(19, 19);
        assert!(!plan.is_elided);
        assert_eq!(plan.slot_count(), 19);
        assert!(plan.slots.iter().all(|s| matches!(s, Slot::Neuron(_))));
    }

    #[test]
    fn summarize_elides_the_middle() {
        let plan = summarize(64, 7);
        assert!(plan.is_elided);
        assert_eq!(
            plan.slots,
            vec![
                Slot::Neuron(0),
                Slot::Neuron(1),
                Slot::Neuron(2),
                Slot::Ellipsis,
                Slot::Neuron(61),
                Slot::Neuron(62),
                Slot::Neuron(63),
            ]
        );
        assert_eq!(plan.drawn_neurons(), 6);
    }

    #[rstest]
    #[case(20, 19, 19)]
    #[case(20, 18, 19)]
    #[case(100, 4, 5)]
    #[case(10, 1, 3)]
    fn summarize_slot_count_is_odd_cap(#[case] width: usize, #[case] max: usize, #[case] slots: usize) {
        let plan = summarize(width, max);
        assert!(plan.is_elided);
        assert_eq!(plan.slot_count(), slots);
        assert_eq!(plan.slots.iter().filter(|s| **s == Slot::Ellipsis).count(), 1);
    }

    #[test]
    fn labels_use_global_ids_around_ellipsis() {
        let plan = summarize(30, 5);
        let labels = plan.labels(11);
        assert_eq!(
            labels,
            vec![
                SlotLabel::Neuron(11),
                SlotLabel::Neuron(12),
                SlotLabel::Ellipsis,
                SlotLabel::Neuron(39),
                SlotLabel::Neuron(40),
            ]
        );
        assert_eq!(labels[2].to_string(), "...");
    }

    #[test]
    fn numbering_continues_after_elided_layer() {
        let cfg = RenderConfig {
            max_neurons_display: 5,
            ..RenderConfig::default()
        };
        let layout = layout_network(&[3, 10, 2], &[], &cfg).unwrap();
        assert_eq!(layout.layers[1].first_id, 4);
        assert_eq!(
            layout.layers[1].labels(),
            vec![
                SlotLabel::Neuron(4),
                SlotLabel::Neuron(5),
                SlotLabel::Ellipsis,
                SlotLabel::Neuron(12),
                SlotLabel::Neuron(13),
            ]
        );
        assert_eq!(
            layout.layers[2].labels(),
            vec![SlotLabel::Neuron(14), SlotLabel::Neuron(15)]
        );
    }

    #[test]
    fn accepts_largest_numberable_topology() {
        let sizes = [usize::MAX - 2, 1];
        assert!(validate_topology(&sizes).is_ok());
        let plan = summarize(sizes[0], 3);
        assert_eq!(plan.labels(1).last(), Some(&SlotLabel::Neuron(usize::MAX - 2)));
    }

    #[test]
    fn even_cap_one_below_width_draws_every_neuron() {
        // A cap of 20 rounds up to 21, so a 21-wide layer fits without elision.
        let plan = summarize(21, 20);
        assert!(!plan.is_elided);
        assert_eq!(plan.slot_count(), 21);
        assert_eq!(plan, DisplayPlan::full(21));

        let cfg = RenderConfig {
            max_neurons_display: 20,
            ..RenderConfig::default()
        };
        let layout = layout_network(&[21, 1], &[], &cfg).unwrap();
        assert!(!layout.layers[0].labels().contains(&SlotLabel::Ellipsis));
        assert_eq!(layout.edge_count(), 21);

        assert!(summarize(22, 20).is_elided);
    }

    #[test]
    fn edges_follow_recorded_positions() {
        let layout = layout_network(&[2, 3], &[], &config(Orientation::Vertical)).unwrap();
        for edge in &layout.edge_groups[0].edges {
            let from = layout.layers[0].nodes[edge.from.slot].center;
            let to = layout.layers[1].nodes[edge.to.slot].center;
            assert!(approx(edge.start.x, from.x) && approx(edge.start.y, from.y - NODE_RADIUS));
            assert!(approx(edge.end.x, to.x) && approx(edge.end.y, to.y + NODE_RADIUS));
        }
    }

    #[test]
    fn state_tracks_positions_and_counter() {
        let geometry = Geometry {
            orientation: Orientation::Vertical,
            n_layers: 2,
            max_width: 3,
        };
        let mut state = LayoutState::new();
        state.place_layer(&geometry, 0, DisplayPlan::full(3), None);
        assert_eq!(state.next_id(), 4);
        state.place_layer(&geometry, 1, summarize(50, 3), None);
        assert_eq!(state.next_id(), 54);
        let p = state.position(NodeKey { layer: 1, slot: 1 }).unwrap();
        assert!(approx(p.x, 0.0));
        assert!(approx(p.y, 0.0));
        assert!(state.position(NodeKey { layer: 1, slot: 3 }).is_none());
    }

    #[rstest]
    #[case(Orientation::Vertical)]
    #[case(Orientation::Horizontal)]
    fn single_neuron_is_centered(#[case] orientation: Orientation) {
        let layout = layout_network(&[1, 1], &[], &config(orientation)).unwrap();
        for (idx, layer) in layout.layers.iter().enumerate() {
            let c = layer.nodes[0].center;
            match orientation {
                Orientation::Vertical => {
                    assert!(approx(c.x, 0.0));
                    assert!(approx(c.y, (1 - idx) as f32 * LAYER_SPACING));
                }
                Orientation::Horizontal => {
                    assert!(approx(c.y, 0.0));
                    assert!(approx(c.x, idx as f32 * LAYER_SPACING));
                }
            }
        }
    }

    #[test]
    fn vertical_layers_run_top_to_bottom() {
        let layout = layout_network(&[3, 2], &[], &config(Orientation::Vertical)).unwrap();
        let xs: Vec<f32> = layout.layers[0].nodes.iter().map(|n| n.center.x).collect();
        assert!(approx(xs[0], -1.5) && approx(xs[1], 0.0) && approx(xs[2], 1.5));
        assert!(approx(layout.layers[0].nodes[0].center.y, 3.0));
        assert!(approx(layout.layers[1].nodes[0].center.y, 0.0));
        assert!(approx(layout.layers[1].nodes[0].center.x, -0.75));
    }

    #[test]
    fn horizontal_layers_run_left_to_right() {
        let layout = layout_network(&[3, 2], &[], &config(Orientation::Horizontal)).unwrap();
        let ys: Vec<f32> = layout.layers[0].nodes.iter().map(|n| n.center.y).collect();
        assert!(approx(ys[0], 1.5) && approx(ys[1], 0.0) && approx(ys[2], -1.5));
        assert!(approx(layout.layers[1].nodes[0].center.x, 3.0));
    }

    #[test]
    fn boxes_span_the_widest_displayed_layer() {
        let cfg = RenderConfig {
            max_neurons_display: 5,
            ..RenderConfig::default()
        };
        let layout = layout_network(&[2, 40, 1], &[], &cfg).unwrap();
        assert_eq!(layout.max_display_width, 5);
        for layer in &layout.layers {
            assert!(approx(layer.bbox.width(), 5.0 * NEURON_SPACING));
            assert!(approx(layer.bbox.height(), 2.5));
        }

        let horizontal = layout_network(&[2, 3], &[], &config(Orientation::Horizontal)).unwrap();
        assert!(approx(horizontal.layers[0].bbox.height(), 2.0 * NEURON_SPACING + 2.0));
        assert!(approx(horizontal.layers[0].bbox.width(), 2.5));
    }

    #[test]
    fn arrows_mark_inputs_and_outputs_only() {
        let layout = layout_network(&[2, 3, 2], &[], &config(Orientation::Vertical)).unwrap();
        let input_texts: Vec<&str> = layout.layers[0]
            .nodes
            .iter()
            .map(|n| n.arrow.as_ref().unwrap().label.text.as_str())
            .collect();
        assert_eq!(input_texts, ["x_1", "x_2"]);
        assert!(layout.layers[1].nodes.iter().all(|n| n.arrow.is_none()));
        let output_texts: Vec<&str> = layout.layers[2]
            .nodes
            .iter()
            .map(|n| n.arrow.as_ref().unwrap().label.text.as_str())
            .collect();
        assert_eq!(output_texts, ["y_6", "y_7"]);

        let arrow = layout.layers[0].nodes[0].arrow.as_ref().unwrap();
        assert!(arrow.tail.y > arrow.tip.y);
    }

    #[test]
    fn ellipsis_gets_no_arrow_and_no_edges() {
        let cfg = RenderConfig {
            max_neurons_display: 3,
            ..RenderConfig::default()
        };
        let layout = layout_network(&[10, 10], &[], &cfg).unwrap();
        assert!(layout.layers[0].nodes[1].arrow.is_none());
        assert_eq!(layout.edge_count(), 4);
        for edge in &layout.edge_groups[0].edges {
            assert_ne!(edge.from.slot, 1);
            assert_ne!(edge.to.slot, 1);
        }
    }

    #[test]
    fn edges_touch_the_neuron_rims() {
        let layout = layout_network(&[1, 1], &[], &config(Orientation::Horizontal)).unwrap();
        let edge = layout.edge_groups[0].edges[0];
        assert!(approx(edge.start.x, NODE_RADIUS));
        assert!(approx(edge.end.x, LAYER_SPACING - NODE_RADIUS));
    }

    #[test]
    fn canvas_grows_with_layers_and_width() {
        let small = layout_network(&[2, 2], &[], &config(Orientation::Vertical)).unwrap();
        assert_eq!(small.canvas, vec2(6.0, 12.0));
        let wide = RenderConfig {
            summarized: false,
            ..RenderConfig::default()
        };
        let big = layout_network(&[40, 2, 2, 2, 2], &[], &wide).unwrap();
        assert_eq!(big.canvas, vec2(40.0, 17.5));
        let horizontal = layout_network(&[40, 2, 2, 2, 2], &[], &config(Orientation::Horizontal)).unwrap();
        assert_eq!(horizontal.canvas, vec2(17.5, 19.0));
    }

    #[rstest]
    #[case(&[])]
    #[case(&[4])]
    #[case(&[4, 0, 3])]
    #[case(&[usize::MAX, 1])]
    #[case(&[usize::MAX - 1, 1])]
    #[case(&[usize::MAX / 2, usize::MAX / 2, 2])]
    fn rejects_bad_topologies(#[case] sizes: &[usize]) {
        let err = layout_network(sizes, &[], &RenderConfig::default()).unwrap_err();
        assert!(matches!(err, VisualizerError::InvalidTopology { .. }));
    }

    #[test]
    fn describe_lists_layers_and_edges() {
        let cfg = RenderConfig {
            max_neurons_display: 3,
            ..RenderConfig::default()
        };
        let text = layout_network(&[2, 5, 1], &[], &cfg).unwrap().describe();
        assert_eq!(
            text,
            "Input Layer: 2 neurons [1 2]\n\
             Hidden Layer 1: 5 neurons [3 ... 7]\n\
             Output Layer: 1 neurons [8]\n\
             edges 0 -> 1: 4\n\
             edges 1 -> 2: 2\n"
        );
    }
}
