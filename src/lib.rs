//! Static diagrams of feedforward neural networks.
//!
//! A model is reduced to its layer widths and per-layer metadata
//! ([`extract_layer_sizes`]), laid out ([`layout::layout_network`]) and
//! painted in a native window ([`draw_feedforward_network`]).

pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod render;
pub mod style;

pub use config::{Orientation, RenderConfig};
pub use error::{Result, VisualizerError};
pub use layout::{DisplayPlan, NetworkLayout, layout_network, summarize};
pub use model::{LayerInfo, Model, Sequential, extract_layer_sizes};

/// Validates and lays out the topology, then shows it in a window.
///
/// Errors are reported before any window opens.
pub fn draw_feedforward_network(
    layer_sizes: &[usize],
    layer_infos: &[LayerInfo],
    config: &RenderConfig,
) -> Result<()> {
    let layout = layout_network(layer_sizes, layer_infos, config)?;
    render::show(layout, layer_infos.to_vec())
}

/// Introspects `model` and draws it.
pub fn plot_neural_network<M: Model>(model: &mut M, config: &RenderConfig) -> Result<()> {
    let (layer_sizes, layer_infos) = extract_layer_sizes(model)?;
    draw_feedforward_network(&layer_sizes, &layer_infos, config)
}
