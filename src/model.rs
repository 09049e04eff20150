//! Model introspection.
//!
//! Any model that can list its layers can be drawn: implement [`Model`] and
//! [`Layer`] for it, or describe the network as JSON and load a [`Sequential`].

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VisualizerError};

/// Text shown in place of a shape that could not be introspected.
pub const UNKNOWN_SHAPE: &str = "(unknown)";

/// Tensor shape; `None` marks a dimension that is not fixed (usually the batch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape(pub Vec<Option<usize>>);

impl Shape {
    /// Batched feature vector: `(None, width)`.
    pub fn batched(width: usize) -> Self {
        Shape(vec![None, Some(width)])
    }

    pub fn last_dim(&self) -> Option<usize> {
        self.0.last().copied().flatten()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, dim) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match dim {
                Some(d) => write!(f, "{d}")?,
                None => write!(f, "None")?,
            }
        }
        // One-element tuples keep their trailing comma.
        if self.0.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

/// A single layer as seen by the introspector.
pub trait Layer {
    fn name(&self) -> &str;
    /// Classification tag, e.g. `"Dense"` or `"Dropout"`.
    fn kind(&self) -> &str;
    fn is_dense(&self) -> bool {
        self.kind() == "Dense"
    }
    /// Neuron count for dense layers.
    fn units(&self) -> Option<usize>;
    /// `None` when the shape cannot be determined for this layer.
    fn input_shape(&self) -> Option<Shape>;
    fn output_shape(&self) -> Option<Shape>;
    fn count_params(&self) -> usize;
    fn activation(&self) -> Option<&str>;
}

/// A trained or constructed model exposing an ordered layer sequence.
pub trait Model {
    type Layer: Layer;

    fn layers(&self) -> &[Self::Layer];
    fn is_built(&self) -> bool;
    /// Input dimensionality declared on the first layer, if any.
    fn declared_input_dim(&self) -> Option<usize>;
    /// Resolve weight shapes for the given input dimensionality.
    fn build(&mut self, input_dim: usize) -> std::result::Result<(), String>;
    /// Width of the input layer; only meaningful once built.
    fn input_width(&self) -> Option<usize>;
}

/// Technical description of one non-input layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub layer_type: String,
    pub units: usize,
    pub input_shape: String,
    pub output_shape: String,
    pub params: usize,
    pub activation: Option<String>,
}

impl LayerInfo {
    /// Multi-line annotation placed next to the layer box.
    pub fn describe(&self) -> String {
        let mut s = format!(
            "{} ({})\nIn: {}\nOut: {}\nParams: {}",
            self.name, self.layer_type, self.input_shape, self.output_shape, self.params
        );
        if let Some(activation) = &self.activation {
            s.push_str(&format!("\nAct: {activation}"));
        }
        s
    }
}

/// Reads neuron counts and per-layer metadata out of a model.
///
/// Only dense layers contribute; everything else is skipped. An unbuilt model
/// is built first from the input dimensionality of its first layer.
pub fn extract_layer_sizes<M: Model>(model: &mut M) -> Result<(Vec<usize>, Vec<LayerInfo>)> {
    if !model.is_built() {
        let input_dim = model.declared_input_dim().ok_or_else(|| {
            VisualizerError::not_buildable("model is not built and its first layer declares no input dimension")
        })?;
        tracing::debug!(input_dim, "building model before introspection");
        model
            .build(input_dim)
            .map_err(|e| VisualizerError::not_buildable(format!("build failed: {e}")))?;
    }

    let input_width = model
        .input_width()
        .ok_or_else(|| VisualizerError::not_buildable("model reports no input width"))?;

    let mut layer_sizes = vec![input_width];
    let mut layer_infos = Vec::new();

    for layer in model.layers() {
        if !layer.is_dense() {
            tracing::debug!(name = layer.name(), kind = layer.kind(), "skipping non-dense layer");
            continue;
        }
        let Some(units) = layer.units() else {
            tracing::debug!(name = layer.name(), "skipping dense layer without units");
            continue;
        };

        let (input_shape, output_shape) = match (layer.input_shape(), layer.output_shape()) {
            (Some(input), Some(output)) => (input.to_string(), output.to_string()),
            _ => {
                tracing::warn!(name = layer.name(), "shape introspection unavailable");
                (UNKNOWN_SHAPE.to_string(), UNKNOWN_SHAPE.to_string())
            }
        };

        layer_sizes.push(units);
        layer_infos.push(LayerInfo {
            name: layer.name().to_string(),
            layer_type: layer.kind().to_string(),
            units,
            input_shape,
            output_shape,
            params: layer.count_params(),
            activation: layer.activation().map(str::to_string),
        });
    }

    Ok((layer_sizes, layer_infos))
}

/// Layer kinds that leave the feature width unchanged.
const PASS_THROUGH: &[&str] = &[
    "Dropout",
    "Activation",
    "BatchNormalization",
    "LayerNormalization",
    "GaussianNoise",
    "GaussianDropout",
    "AlphaDropout",
];

fn default_use_bias() -> bool {
    true
}

/// One layer of a [`Sequential`] model, as written in its JSON description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub layer_type: String,
    #[serde(default)]
    pub units: Option<usize>,
    #[serde(default)]
    pub activation: Option<String>,
    #[serde(default = "default_use_bias")]
    pub use_bias: bool,
    /// Input dimensionality, only meaningful on the first layer.
    #[serde(default)]
    pub input_dim: Option<usize>,
}

impl LayerSpec {
    pub fn dense(units: usize, activation: &str) -> Self {
        Self {
            name: None,
            layer_type: "Dense".to_string(),
            units: Some(units),
            activation: Some(activation.to_string()),
            use_bias: true,
            input_dim: None,
        }
    }

    pub fn other(layer_type: &str) -> Self {
        Self {
            name: None,
            layer_type: layer_type.to_string(),
            units: None,
            activation: None,
            use_bias: true,
            input_dim: None,
        }
    }

    pub fn with_input_dim(mut self, input_dim: usize) -> Self {
        self.input_dim = Some(input_dim);
        self
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// JSON description of a sequential model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequentialSpec {
    /// Present when the model was created with an explicit input.
    #[serde(default)]
    pub input_dim: Option<usize>,
    pub layers: Vec<LayerSpec>,
}

/// A layer of a [`Sequential`] model with resolved widths.
#[derive(Debug, Clone)]
pub struct SequentialLayer {
    name: String,
    spec: LayerSpec,
    in_width: Option<usize>,
    out_width: Option<usize>,
}

impl Layer for SequentialLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        &self.spec.layer_type
    }

    fn units(&self) -> Option<usize> {
        self.spec.units
    }

    fn input_shape(&self) -> Option<Shape> {
        // A dense layer behind an opaque layer has no resolvable shapes at all.
        if self.is_dense() && self.in_width.is_none() {
            return None;
        }
        self.in_width.map(Shape::batched)
    }

    fn output_shape(&self) -> Option<Shape> {
        if self.is_dense() && self.in_width.is_none() {
            return None;
        }
        self.out_width.map(Shape::batched)
    }

    fn count_params(&self) -> usize {
        match self.spec.layer_type.as_str() {
            "Dense" => {
                let units = self.spec.units.unwrap_or(0);
                let bias = if self.spec.use_bias { units } else { 0 };
                self.in_width.map_or(0, |w| w * units) + bias
            }
            "BatchNormalization" => self.in_width.map_or(0, |w| 4 * w),
            _ => 0,
        }
    }

    fn activation(&self) -> Option<&str> {
        match self.spec.activation.as_deref() {
            Some(a) => Some(a),
            None if self.is_dense() => Some("linear"),
            None => None,
        }
    }
}

/// Keras-style sequential model loaded from a JSON description.
#[derive(Debug, Clone)]
pub struct Sequential {
    layers: Vec<SequentialLayer>,
    input_dim: Option<usize>,
    built: bool,
}

impl Sequential {
    /// Creates an unbuilt model; the input width comes from the first layer's `input_dim`.
    pub fn new(layers: Vec<LayerSpec>) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let layers = layers
            .into_iter()
            .map(|spec| {
                let name = spec.name.clone().unwrap_or_else(|| {
                    let base = snake_case(&spec.layer_type);
                    let n = counts.entry(base.clone()).or_insert(0);
                    let name = if *n == 0 { base } else { format!("{base}_{n}") };
                    *n += 1;
                    name
                });
                SequentialLayer {
                    name,
                    spec,
                    in_width: None,
                    out_width: None,
                }
            })
            .collect();
        Self {
            layers,
            input_dim: None,
            built: false,
        }
    }

    /// Creates a model with an explicit input, built immediately.
    pub fn with_input(input_dim: usize, layers: Vec<LayerSpec>) -> Result<Self> {
        let mut model = Self::new(layers);
        model
            .build(input_dim)
            .map_err(|e| VisualizerError::not_buildable(format!("build failed: {e}")))?;
        Ok(model)
    }

    pub fn from_spec(spec: SequentialSpec) -> Result<Self> {
        match spec.input_dim {
            Some(dim) => Self::with_input(dim, spec.layers),
            None => Ok(Self::new(spec.layers)),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let spec: SequentialSpec = serde_json::from_str(json)?;
        Self::from_spec(spec)
    }
}

impl Model for Sequential {
    type Layer = SequentialLayer;

    fn layers(&self) -> &[SequentialLayer] {
        &self.layers
    }

    fn is_built(&self) -> bool {
        self.built
    }

    fn declared_input_dim(&self) -> Option<usize> {
        self.layers.first().and_then(|l| l.spec.input_dim)
    }

    fn build(&mut self, input_dim: usize) -> std::result::Result<(), String> {
        if self.layers.is_empty() {
            return Err("model has no layers".to_string());
        }
        if input_dim == 0 {
            return Err("input dimension must be positive".to_string());
        }
        // Widths are committed only once every layer resolves.
        let mut widths = Vec::with_capacity(self.layers.len());
        let mut width = Some(input_dim);
        for layer in &self.layers {
            let out = match layer.spec.layer_type.as_str() {
                "Dense" => match layer.spec.units {
                    Some(units) => Some(units),
                    None => return Err(format!("dense layer '{}' has no units", layer.name)),
                },
                kind if PASS_THROUGH.contains(&kind) => width,
                _ => None,
            };
            widths.push((width, out));
            width = out;
        }
        for (layer, (in_width, out_width)) in self.layers.iter_mut().zip(widths) {
            layer.in_width = in_width;
            layer.out_width = out_width;
        }
        self.input_dim = Some(input_dim);
        self.built = true;
        Ok(())
    }

    fn input_width(&self) -> Option<usize> {
        if self.built { self.input_dim } else { None }
    }
}

/// Keras-style layer name base: `BatchNormalization` → `batch_normalization`,
/// `LSTM` → `lstm`, `GRUCell` → `gru_cell`.
fn snake_case(kind: &str) -> String {
    let chars: Vec<char> = kind.chars().collect();
    let mut out = String::with_capacity(kind.len() + 4);
    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_ascii_lowercase());
            // Word boundary after a lowercase letter, or at the last capital of an acronym.
            if prev.is_ascii_lowercase() || (next_is_lower && prev != '_') {
                out.push('_');
            }
        }
        out.push(ch.to_ascii_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_prints_like_a_tuple() {
        assert_eq!(Shape::batched(4).to_string(), "(None, 4)");
        assert_eq!(Shape(vec![Some(3)]).to_string(), "(3,)");
        assert_eq!(Shape(vec![]).to_string(), "()");
        assert_eq!(Shape::batched(4).last_dim(), Some(4));
    }

    #[test]
    fn default_names_follow_kind_counters() {
        let model = Sequential::new(vec![
            LayerSpec::dense(5, "relu"),
            LayerSpec::other("Dropout"),
            LayerSpec::dense(3, "softmax"),
            LayerSpec::other("BatchNormalization"),
        ]);
        let names: Vec<&str> = model.layers().iter().map(|l| l.name()).collect();
        assert_eq!(names, ["dense", "dropout", "dense_1", "batch_normalization"]);
    }

    #[test]
    fn build_propagates_widths_and_params() {
        let model = Sequential::with_input(
            4,
            vec![
                LayerSpec::dense(5, "relu"),
                LayerSpec::other("BatchNormalization"),
                LayerSpec::dense(3, "softmax"),
            ],
        )
        .unwrap();
        let layers = model.layers();
        assert_eq!(layers[0].count_params(), 4 * 5 + 5);
        assert_eq!(layers[1].count_params(), 20);
        assert_eq!(layers[2].input_shape(), Some(Shape::batched(5)));
        assert_eq!(layers[2].count_params(), 5 * 3 + 3);
    }

    #[test]
    fn dense_without_activation_reports_linear() {
        let mut spec = LayerSpec::dense(2, "relu");
        spec.activation = None;
        let model = Sequential::with_input(2, vec![spec]).unwrap();
        assert_eq!(model.layers()[0].activation(), Some("linear"));
    }

    #[test]
    fn describe_omits_missing_activation() {
        let info = LayerInfo {
            name: "dense".into(),
            layer_type: "Dense".into(),
            units: 3,
            input_shape: "(None, 4)".into(),
            output_shape: "(None, 3)".into(),
            params: 15,
            activation: None,
        };
        assert_eq!(info.describe(), "dense (Dense)\nIn: (None, 4)\nOut: (None, 3)\nParams: 15");

        let with_act = LayerInfo {
            activation: Some("relu".into()),
            ..info
        };
        assert!(with_act.describe().ends_with("\nAct: relu"));
    }

    #[test]
    fn build_rejects_dense_without_units() {
        let mut model = Sequential::new(vec![LayerSpec::other("Dense")]);
        assert!(model.build(3).is_err());
        assert!(!model.is_built());
    }

    #[test]
    fn failed_build_leaves_earlier_layers_untouched() {
        let mut model = Sequential::new(vec![
            LayerSpec::dense(5, "relu"),
            LayerSpec::other("Dropout"),
            LayerSpec::other("Dense"),
        ]);
        assert!(model.build(4).is_err());
        for layer in model.layers() {
            assert_eq!(layer.in_width, None);
            assert_eq!(layer.out_width, None);
        }
        assert_eq!(model.layers()[0].count_params(), 5);
        assert_eq!(model.input_width(), None);
    }

    #[test]
    fn snake_case_keeps_acronyms_together() {
        assert_eq!(snake_case("Dense"), "dense");
        assert_eq!(snake_case("BatchNormalization"), "batch_normalization");
        assert_eq!(snake_case("LSTM"), "lstm");
        assert_eq!(snake_case("GRUCell"), "gru_cell");
        assert_eq!(snake_case("Conv2D"), "conv2d");
        assert_eq!(snake_case("PReLU"), "p_re_lu");
    }

    #[test]
    fn acronym_kinds_get_single_word_names() {
        let model = Sequential::new(vec![LayerSpec::other("LSTM"), LayerSpec::other("LSTM")]);
        let names: Vec<&str> = model.layers().iter().map(|l| l.name()).collect();
        assert_eq!(names, ["lstm", "lstm_1"]);
    }
}
