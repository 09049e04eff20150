//! CLI entry point for nn-diagram.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nn_diagram::{
    LayerInfo, Orientation, RenderConfig, Result, Sequential, VisualizerError, extract_layer_sizes,
    layout_network, render,
};

#[derive(Parser)]
#[command(name = "nn-diagram")]
#[command(about = "Draw the layer structure of a feedforward neural network")]
#[command(version)]
struct Cli {
    /// JSON description of a sequential model
    #[arg(required_unless_present = "sizes", conflicts_with = "sizes")]
    model: Option<PathBuf>,

    /// Layer widths instead of a model, e.g. 4,5,3
    #[arg(long, value_delimiter = ',')]
    sizes: Option<Vec<usize>>,

    /// JSON render configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// horizontal (h) or vertical (v)
    #[arg(long)]
    orientation: Option<String>,

    /// Draw every neuron, however wide the layer
    #[arg(long)]
    no_summary: bool,

    /// Slots drawn for a summarized layer
    #[arg(long)]
    max_neurons: Option<usize>,

    /// Hide the technical annotation next to each layer
    #[arg(long)]
    no_layer_info: bool,

    /// Print the layout instead of opening a window
    #[arg(long)]
    print_layout: bool,
}

impl Cli {
    fn render_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
            None => RenderConfig::default(),
        };
        if let Some(raw) = &self.orientation {
            config.orientation = raw.parse::<Orientation>()?;
        }
        if self.no_summary {
            config.summarized = false;
        }
        if let Some(max) = self.max_neurons {
            config.max_neurons_display = max;
        }
        if self.no_layer_info {
            config.show_layer_info = false;
        }
        Ok(config)
    }

    fn topology(&self) -> Result<(Vec<usize>, Vec<LayerInfo>)> {
        if let Some(sizes) = &self.sizes {
            return Ok((sizes.clone(), Vec::new()));
        }
        let path = self
            .model
            .as_ref()
            .ok_or_else(|| VisualizerError::InvalidTopology {
                reason: "neither a model file nor --sizes was given".to_string(),
            })?;
        let mut model = Sequential::from_json(&std::fs::read_to_string(path)?)?;
        extract_layer_sizes(&mut model)
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = cli.render_config()?;
    let (layer_sizes, layer_infos) = cli.topology()?;
    let layout = layout_network(&layer_sizes, &layer_infos, &config)?;

    if cli.print_layout {
        print!("{}", layout.describe());
        return Ok(());
    }
    render::show(layout, layer_infos)
}
