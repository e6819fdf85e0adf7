//! Overlay rendering for the marquee rectangle, the mode indicator and the sidebar toggle.

use egui_graphs::MetadataFrame;
use graph_marquee_core::{Bounds, DashedStroke, DrawingSurface, Point, PointerButton, RgbaColor};

/// Affine canvas-to-screen mapping of one frame: `screen = canvas * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTransform {
    pub scale: f32,
    pub offset: egui::Vec2,
}

impl CanvasTransform {
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            offset: egui::Vec2::ZERO,
        }
    }

    /// Derive the mapping from `egui_graphs` frame metadata and the widget's top-left corner.
    pub fn from_frame(meta: &MetadataFrame, widget_min: egui::Pos2) -> Self {
        let p0 = meta.canvas_to_screen_pos(egui::Pos2::ZERO);
        let p1 = meta.canvas_to_screen_pos(egui::pos2(1.0, 0.0));
        Self {
            scale: p1.x - p0.x,
            offset: p0.to_vec2() + widget_min.to_vec2(),
        }
    }

    pub fn apply(&self, p: Point) -> egui::Pos2 {
        egui::pos2(p.x * self.scale, p.y * self.scale) + self.offset
    }

    pub fn rect(&self, bounds: Bounds) -> egui::Rect {
        egui::Rect::from_two_pos(self.apply(bounds.min), self.apply(bounds.max))
    }
}

fn color32(color: RgbaColor) -> egui::Color32 {
    let [r, g, b, a] = color.to_rgba8();
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// [`DrawingSurface`] over an egui painter, in canvas coordinates.
pub struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    transform: CanvasTransform,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a egui::Painter, transform: CanvasTransform) -> Self {
        Self { painter, transform }
    }
}

impl DrawingSurface for PainterSurface<'_> {
    fn stroke_dashed_rect(&mut self, bounds: Bounds, stroke: DashedStroke) {
        let rect = self.transform.rect(bounds);
        let outline = [
            rect.left_top(),
            rect.right_top(),
            rect.right_bottom(),
            rect.left_bottom(),
            rect.left_top(),
        ];
        // Dash pattern is in canvas units; scale it with the zoom like the outline.
        let scale = self.transform.scale.abs().max(f32::EPSILON);
        self.painter.extend(egui::Shape::dashed_line(
            &outline,
            egui::Stroke::new(stroke.width, color32(stroke.color)),
            stroke.dash_length * scale,
            stroke.gap_length * scale,
        ));
    }

    fn fill_rect(&mut self, bounds: Bounds, color: RgbaColor) {
        self.painter
            .rect_filled(self.transform.rect(bounds), 0.0, color32(color));
    }
}

/// Hint shown next to the mode badge for the configured trigger button.
fn mode_hint(trigger: PointerButton, dragging: bool) -> String {
    if dragging {
        "  release to select".to_string()
    } else {
        let button = trigger.label();
        format!("  {button}-drag to select, {button}-click a joint to remove it")
    }
}

/// Draw the marquee mode indicator in the top-left corner.
pub fn draw_mode_indicator(
    ui: &mut egui::Ui,
    attached: bool,
    dragging: bool,
    trigger: PointerButton,
) {
    if !attached {
        return;
    }

    let rect = ui.max_rect();
    let indicator_pos = egui::pos2(rect.left() + 10.0, rect.top() + 10.0);
    let hint = mode_hint(trigger, dragging);

    egui::Area::new(egui::Id::new("marquee_mode_indicator"))
        .order(egui::Order::Foreground)
        .fixed_pos(indicator_pos)
        .movable(false)
        .show(ui.ctx(), |ui| {
            egui::Frame::new()
                .fill(egui::Color32::from_rgba_unmultiplied(0, 0, 0, 180))
                .corner_radius(4.0)
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new("▭ MARQUEE")
                                .color(egui::Color32::from_rgb(78, 146, 237))
                                .strong(),
                        );
                        ui.label(egui::RichText::new(hint).color(egui::Color32::GRAY).small());
                    });
                });
        });
}

/// Draw the sidebar toggle button in the bottom-right corner.
pub fn draw_sidebar_toggle(ui: &mut egui::Ui, show_sidebar: &mut bool) {
    let g_rect = ui.max_rect();
    let btn_size = egui::vec2(32.0, 32.0);
    let margin = 10.0;

    let toggle_pos = egui::pos2(
        g_rect.right() - margin - btn_size.x,
        g_rect.bottom() - margin - btn_size.y,
    );

    let (arrow, tip) = if *show_sidebar {
        ("▶", "Hide sidebar")
    } else {
        ("◀", "Show sidebar")
    };

    egui::Area::new(egui::Id::new("sidebar_toggle_btn"))
        .order(egui::Order::Foreground)
        .fixed_pos(toggle_pos)
        .movable(false)
        .show(ui.ctx(), |ui_area| {
            ui_area.set_clip_rect(g_rect);
            let arrow_text = egui::RichText::new(arrow).size(18.0);
            let response = ui_area.add_sized(btn_size, egui::Button::new(arrow_text));
            if response.on_hover_text(tip).clicked() {
                *show_sidebar = !*show_sidebar;
            }
        });
}
