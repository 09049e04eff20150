//! Native window painting a [`NetworkLayout`] with egui.

use eframe::egui;

use crate::error::{Result, VisualizerError};
use crate::layout::{NODE_RADIUS, NetworkLayout, NodeKey, SlotLabel, TextLayout};
use crate::model::LayerInfo;

/// Screen pixels per diagram unit at zoom 1.0.
const PIXELS_PER_UNIT: f32 = 80.0;
const MAX_WINDOW: egui::Vec2 = egui::vec2(1600.0, 1000.0);

/// Opens a window showing the diagram and blocks until it is closed.
pub fn show(layout: NetworkLayout, layer_infos: Vec<LayerInfo>) -> Result<()> {
    let size = (layout.canvas * PIXELS_PER_UNIT).min(MAX_WINDOW);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Neural Network")
            .with_inner_size(size),
        ..Default::default()
    };
    tracing::info!(
        layers = layout.layers.len(),
        edges = layout.edge_count(),
        orientation = %layout.orientation,
        "opening diagram window"
    );
    let app = DiagramApp::new(layout, layer_infos);
    eframe::run_native(
        "NN Diagram",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| VisualizerError::Display(e.to_string()))
}

struct DiagramApp {
    layout: NetworkLayout,
    layer_infos: Vec<LayerInfo>,
    selected_node: Option<NodeKey>,

    // Zoom and pan state
    zoom: f32,
    pan: egui::Vec2,
    is_panning: bool,
    last_pan_pos: Option<egui::Pos2>,
    needs_fit: bool,
}

impl DiagramApp {
    fn new(layout: NetworkLayout, layer_infos: Vec<LayerInfo>) -> Self {
        Self {
            layout,
            layer_infos,
            selected_node: None,
            zoom: 1.0,
            pan: egui::Vec2::ZERO,
            is_panning: false,
            last_pan_pos: None,
            needs_fit: true,
        }
    }

    fn scale(&self) -> f32 {
        PIXELS_PER_UNIT * self.zoom
    }

    /// Diagram coordinates (y up) to screen coordinates (y down).
    fn to_screen(&self, p: egui::Pos2) -> egui::Pos2 {
        egui::pos2(p.x, -p.y) * self.scale() + self.pan
    }

    /// Zoom and pan so the whole diagram fits the rect.
    fn fit_to(&mut self, rect: egui::Rect) {
        let bounds = self.layout.bounds();
        let fit_zoom_x = rect.width() / (bounds.width() * PIXELS_PER_UNIT);
        let fit_zoom_y = rect.height() / (bounds.height() * PIXELS_PER_UNIT);
        self.zoom = fit_zoom_x.min(fit_zoom_y).clamp(0.05, 5.0);
        let center = bounds.center();
        self.pan = rect.center().to_vec2() - egui::vec2(center.x, -center.y) * self.scale();
    }

    fn handle_zoom_pan(&mut self, ui: &egui::Ui, rect: egui::Rect, resp: &egui::Response) {
        // Mouse wheel zoom around the cursor
        if let Some(pos) = ui.input(|i| i.pointer.hover_pos()) {
            if rect.contains(pos) {
                let scroll = ui.input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    let zoom_factor = 1.15_f32;
                    let old_zoom = self.zoom;
                    let new_zoom = (self.zoom * zoom_factor.powf(scroll.signum())).clamp(0.05, 5.0);
                    let before = (pos - self.pan).to_vec2() / old_zoom;
                    self.zoom = new_zoom;
                    let after = before * self.zoom;
                    self.pan += pos.to_vec2() - (after + self.pan);
                }
            }
        }
        // Mouse drag pan
        if resp.drag_started() {
            self.is_panning = true;
            self.last_pan_pos = resp.interact_pointer_pos();
        }
        if self.is_panning && resp.dragged() {
            if let (Some(last), Some(cur)) = (self.last_pan_pos, resp.interact_pointer_pos()) {
                self.pan += cur - last;
                self.last_pan_pos = Some(cur);
            }
        }
        if resp.drag_stopped() {
            self.is_panning = false;
            self.last_pan_pos = None;
        }
    }

    /// Neuron under the pointer, ignoring ellipsis slots.
    fn hit_node(&self, pointer: egui::Pos2) -> Option<NodeKey> {
        let radius = NODE_RADIUS * self.scale();
        self.layout
            .layers
            .iter()
            .flat_map(|l| l.nodes.iter())
            .filter(|n| n.label != SlotLabel::Ellipsis)
            .find(|n| self.to_screen(n.center).distance(pointer) <= radius)
            .map(|n| n.key)
    }

    fn node_info(&self, key: NodeKey) -> Option<String> {
        let layer = self.layout.layer(key.layer)?;
        let node = layer.nodes.get(key.slot)?;
        let mut s = format!("{}\nNeuron: {}\n", layer.role.label(layer.index), node.label);
        match key.layer.checked_sub(1).and_then(|i| self.layer_infos.get(i)) {
            Some(info) => s.push_str(&info.describe()),
            None => s.push_str(&format!("Width: {}", layer.width())),
        }
        Some(s)
    }

    fn paint_text(&self, painter: &egui::Painter, text: &TextLayout, font: egui::FontId) {
        painter.text(
            self.to_screen(text.pos),
            text.align,
            &text.text,
            font,
            egui::Color32::BLACK,
        );
    }

    fn draw_network(&mut self, ui: &mut egui::Ui) {
        let (rect, resp) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        if self.needs_fit {
            self.fit_to(rect);
            self.needs_fit = false;
        }
        self.handle_zoom_pan(ui, rect, &resp);
        if resp.clicked() {
            if let Some(pos) = resp.interact_pointer_pos() {
                let hit = self.hit_node(pos);
                self.selected_node = if hit == self.selected_node { None } else { hit };
            }
        }

        let painter = ui.painter_at(rect);
        let s = self.scale();
        let small_font = egui::FontId::proportional((0.16 * s).max(6.0));
        let label_font = egui::FontId::proportional((0.18 * s).max(7.0));
        let info_font = egui::FontId::monospace((0.14 * s).max(6.0));

        // Background boxes and layer texts
        for layer in &self.layout.layers {
            let min = self.to_screen(egui::pos2(layer.bbox.min.x, layer.bbox.max.y));
            let max = self.to_screen(egui::pos2(layer.bbox.max.x, layer.bbox.min.y));
            painter.rect_filled(
                egui::Rect::from_min_max(min, max),
                (0.1 * s).min(12.0),
                layer.role.palette().background,
            );
            self.paint_text(&painter, &layer.title, label_font.clone());
            if let Some(info) = &layer.info {
                self.paint_text(&painter, info, info_font.clone());
            }
        }

        // Connections
        let edge_stroke = egui::Stroke::new(0.5, egui::Color32::BLACK);
        for group in &self.layout.edge_groups {
            for edge in &group.edges {
                painter.line_segment([self.to_screen(edge.start), self.to_screen(edge.end)], edge_stroke);
            }
        }

        // Neurons and their annotations
        let arrow_stroke = egui::Stroke::new(1.0, egui::Color32::BLACK);
        for layer in &self.layout.layers {
            let fill = layer.role.palette().fill;
            for node in &layer.nodes {
                let center = self.to_screen(node.center);
                match node.label {
                    SlotLabel::Ellipsis => {
                        painter.text(
                            center,
                            egui::Align2::CENTER_CENTER,
                            node.label.to_string(),
                            label_font.clone(),
                            egui::Color32::BLACK,
                        );
                    }
                    SlotLabel::Neuron(_) => {
                        let color = if self.selected_node == Some(node.key) {
                            egui::Color32::YELLOW
                        } else {
                            fill
                        };
                        painter.circle_filled(center, NODE_RADIUS * s, color);
                        painter.text(
                            center,
                            egui::Align2::CENTER_CENTER,
                            node.label.to_string(),
                            small_font.clone(),
                            egui::Color32::WHITE,
                        );
                    }
                }
                if let Some(arrow) = &node.arrow {
                    let tail = self.to_screen(arrow.tail);
                    let tip = self.to_screen(arrow.tip);
                    painter.arrow(tail, tip - tail, arrow_stroke);
                    self.paint_text(&painter, &arrow.label, label_font.clone());
                }
            }
        }

        // Info box for selected node
        if let Some(key) = self.selected_node {
            let anchor = self
                .layout
                .layer(key.layer)
                .and_then(|l| l.nodes.get(key.slot))
                .map(|n| self.to_screen(n.center));
            if let (Some(pos), Some(info)) = (anchor, self.node_info(key)) {
                draw_info_box(&painter, rect, pos, &info);
            }
        }
    }
}

/// Rounded, semi-transparent box next to `pos`, kept inside `rect`.
fn draw_info_box(painter: &egui::Painter, rect: egui::Rect, pos: egui::Pos2, info: &str) {
    let font = egui::FontId::proportional(13.0);
    let lines: Vec<&str> = info.lines().collect();
    let line_height = 16.0;
    let vertical_padding = 16.0;
    let horizontal_padding = 16.0;
    let mut max_line_width: f32 = 0.0;
    for line in &lines {
        let galley = painter.layout_no_wrap(line.to_string(), font.clone(), egui::Color32::BLACK);
        max_line_width = max_line_width.max(galley.size().x);
    }
    let box_size = egui::vec2(
        max_line_width + 2.0 * horizontal_padding,
        lines.len() as f32 * line_height + 2.0 * vertical_padding,
    );
    let margin = 10.0;
    // Default offset: right of node
    let mut box_pos = pos + egui::vec2(30.0, -40.0);
    let min = rect.left_top();
    let max = rect.right_bottom() - box_size;
    if box_pos.x > max.x {
        box_pos.x = pos.x - box_size.x - 30.0;
    }
    if box_pos.x < min.x {
        box_pos.x = min.x + margin;
    }
    if box_pos.y > max.y {
        box_pos.y = max.y - margin;
    }
    if box_pos.y < min.y {
        box_pos.y = min.y + margin;
    }
    let rect_box = egui::Rect::from_min_size(box_pos, box_size);
    painter.rect_filled(rect_box, 8.0, egui::Color32::from_rgba_unmultiplied(255, 255, 220, 230));
    let start_y = rect_box.top() + vertical_padding + line_height / 2.0;
    for (i, line) in lines.iter().enumerate() {
        painter.text(
            egui::pos2(rect_box.center().x, start_y + i as f32 * line_height),
            egui::Align2::CENTER_CENTER,
            *line,
            font.clone(),
            egui::Color32::BLACK,
        );
    }
}

impl eframe::App for DiagramApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("-").clicked() {
                    self.zoom = (self.zoom * 0.9).max(0.05);
                }
                if ui.button("+").clicked() {
                    self.zoom = (self.zoom * 1.1).min(5.0);
                }
                ui.label(format!("Zoom: {:.2}x", self.zoom));
                if ui.button("Reset View").clicked() {
                    self.needs_fit = true;
                }
                ui.separator();
                ui.label(format!(
                    "{} layers, {} neurons, {} connections drawn",
                    self.layout.layers.len(),
                    self.layout.neuron_count(),
                    self.layout.edge_count()
                ));
            });
            ui.separator();
            self.draw_network(ui);
        });
    }
}
