//! Layer roles and their colors.

use egui::Color32;

/// Position of a layer in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Input,
    Hidden,
    Output,
}

impl Role {
    pub fn classify(layer_idx: usize, n_layers: usize) -> Self {
        if layer_idx == 0 {
            Role::Input
        } else if layer_idx + 1 == n_layers {
            Role::Output
        } else {
            Role::Hidden
        }
    }

    /// Text placed next to the layer box.
    pub fn label(self, layer_idx: usize) -> String {
        match self {
            Role::Input => "Input Layer".to_string(),
            Role::Hidden => format!("Hidden Layer {layer_idx}"),
            Role::Output => "Output Layer".to_string(),
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Role::Input => Palette {
                fill: Color32::from_rgb(0x27, 0xae, 0x60),
                background: Color32::from_rgb(0xd4, 0xef, 0xdf),
            },
            Role::Hidden => Palette {
                fill: Color32::from_rgb(0x2e, 0x86, 0xc1),
                background: Color32::from_rgb(0xd4, 0xe6, 0xf1),
            },
            Role::Output => Palette {
                fill: Color32::from_rgb(0xc0, 0x39, 0x2b),
                background: Color32::from_rgb(0xf9, 0xe1, 0xe0),
            },
        }
    }
}

/// Neuron fill and layer box background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fill: Color32,
    pub background: Color32,
}
