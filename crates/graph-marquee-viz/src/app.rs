//! Main application state and rendering logic.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use eframe::{App, CreationContext};
use egui::{CollapsingHeader, Context};
use egui_graphs::{
    FruchtermanReingoldWithCenterGravity, FruchtermanReingoldWithCenterGravityState, GraphView,
    LayoutForceDirected, MetadataFrame,
};
use tracing::{info, warn};

use graph_marquee_core::{
    Container, DragSelectOverlay, EventHub, GraphEngine, HoverSource, JointRemoval, MemoryGraph,
    NetworkGraph, NodeKey, OverlayConfig, OverlayHandle, OverlayOutcome, Point, PointerEventKind,
    SharedHover,
};

use crate::engine::EguiGraphEngine;
use crate::input::{CanvasContainer, PointerTranslator};
use crate::sample::{create_sample_model, create_sample_network};
use crate::settings::{SettingsInteraction, SettingsNavigation, SettingsStyle};
use crate::ui::{draw_mode_indicator, draw_sidebar_toggle, CanvasTransform, PainterSurface};

// Type aliases for Force-Directed layout with Center Gravity
type ForceLayout = LayoutForceDirected<FruchtermanReingoldWithCenterGravity>;
type ForceState = FruchtermanReingoldWithCenterGravityState;

/// Canvas context menu shown while the overlay is detached.
#[derive(Debug, Default)]
struct ContextMenuState {
    show: bool,
    just_opened: bool,
    screen_pos: egui::Pos2,
    /// Node under the pointer when the menu opened.
    node: Option<NodeKey>,
}

/// The main visualization application.
pub struct MarqueeGraphApp {
    /// Keyed engine shared with the overlay listeners
    engine: Rc<RefCell<EguiGraphEngine>>,
    /// Pointer listener and render hook registry for the canvas
    hub: EventHub,
    /// Canvas placement and context-menu switch
    container: Rc<CanvasContainer>,
    /// Node under the pointer, refreshed every frame
    hover: SharedHover,
    translator: PointerTranslator,
    config: OverlayConfig,
    /// Live overlay; `None` while detached
    handle: Option<OverlayHandle>,
    /// Joints removed through the overlay, newest last
    removals: Rc<RefCell<Vec<JointRemoval>>>,
    last_outcome: Option<OverlayOutcome>,
    context_menu: ContextMenuState,
    settings_interaction: SettingsInteraction,
    settings_navigation: SettingsNavigation,
    settings_style: SettingsStyle,
    show_sidebar: bool,
    dark_mode: bool,
    graph_metadata: HashMap<String, String>,
}

impl MarqueeGraphApp {
    /// Create a new app with the stored configuration and host or sample data.
    pub fn new(cc: &CreationContext<'_>) -> Self {
        let config = OverlayConfig::load().unwrap_or_else(|err| {
            warn!(error = %err, "falling back to default overlay config");
            OverlayConfig::default()
        });
        Self::with_config(cc, config, Self::load_from_host())
    }

    /// Create the app for `network` (or the sample when `None`) with an explicit
    /// overlay configuration.
    pub fn with_config(
        cc: &CreationContext<'_>,
        config: OverlayConfig,
        network: Option<NetworkGraph>,
    ) -> Self {
        let marker = config.edge_joint_marker.as_str();
        let loaded = network.map(|network| {
            MemoryGraph::from_network_with_marker(&network, marker)
                .map(|model| (model, network.metadata))
        });
        let (model, metadata) = match loaded {
            Some(Ok(loaded)) => loaded,
            other => {
                if let Some(Err(err)) = other {
                    warn!(error = %err, "invalid network, showing sample instead");
                }
                let sample = create_sample_network();
                let model = create_sample_model(&sample, marker).unwrap_or_default();
                (model, sample.metadata)
            }
        };
        info!(
            nodes = model.node_count(),
            edges = model.edge_count(),
            joints = model.joints().len(),
            "graph loaded"
        );

        let mut app = Self {
            engine: Rc::new(RefCell::new(EguiGraphEngine::new(model))),
            hub: EventHub::new(),
            container: Rc::new(CanvasContainer::new()),
            hover: SharedHover::new(),
            translator: PointerTranslator::new(),
            config,
            handle: None,
            removals: Rc::new(RefCell::new(Vec::new())),
            last_outcome: None,
            context_menu: ContextMenuState::default(),
            settings_interaction: SettingsInteraction::default(),
            settings_navigation: SettingsNavigation::default(),
            settings_style: SettingsStyle::default(),
            show_sidebar: true,
            dark_mode: cc.egui_ctx.style().visuals.dark_mode,
            graph_metadata: metadata,
        };
        app.attach_overlay();
        app
    }

    /// Graph data embedded by the host page, if any.
    fn load_from_host() -> Option<NetworkGraph> {
        #[cfg(target_arch = "wasm32")]
        {
            Self::try_load_from_window()
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            None
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn try_load_from_window() -> Option<NetworkGraph> {
        let window = web_sys::window()?;
        let data = js_sys::Reflect::get(&window, &"GRAPH_MARQUEE_DATA".into()).ok()?;
        let json_str = data.as_string()?;
        match NetworkGraph::from_json(&json_str) {
            Ok(network) => Some(network),
            Err(err) => {
                warn!(error = %err, "ignoring GRAPH_MARQUEE_DATA");
                None
            }
        }
    }

    pub fn is_overlay_attached(&self) -> bool {
        self.handle.as_ref().is_some_and(OverlayHandle::is_attached)
    }

    /// Bolt a fresh marquee overlay onto the canvas.
    pub fn attach_overlay(&mut self) {
        if self.is_overlay_attached() {
            return;
        }
        let engine = Rc::clone(&self.engine);
        let removals = Rc::clone(&self.removals);
        let remover = Box::new(move |key: &NodeKey| {
            if let Some(removal) = engine.borrow_mut().remove_edge_joint(key) {
                info!(joint = %key, restored = %removal.restored_edge, "edge joint removed");
                removals.borrow_mut().push(removal);
            }
        });

        let container: Rc<dyn Container> = self.container.clone();
        let hover: Rc<dyn HoverSource> = Rc::new(self.hover.clone());
        self.handle = Some(DragSelectOverlay::new(self.config.clone()).attach(
            &self.hub,
            container,
            Rc::clone(&self.engine),
            hover,
            remover,
        ));
        info!(button = self.config.trigger_button.label(), "marquee overlay attached");
    }

    pub fn detach_overlay(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.dispose();
            info!("marquee overlay detached");
        }
    }

    /// Re-create the overlay so config edits take effect.
    fn reattach_overlay(&mut self) {
        if self.is_overlay_attached() {
            self.detach_overlay();
            self.attach_overlay();
        }
    }

    fn info_icon(ui: &mut egui::Ui, tip: &str) {
        ui.add_space(4.0);
        ui.small_button("ℹ").on_hover_text(tip);
    }

    fn ui_info(&self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Graph Info")
            .default_open(true)
            .show(ui, |ui| {
                let engine = self.engine.borrow();
                let model = engine.model();
                ui.label(format!("Nodes: {}", model.node_count()));
                ui.label(format!("Edges: {}", model.edge_count()));
                ui.label(format!("Edge joints: {}", model.joints().len()));

                if !self.graph_metadata.is_empty() {
                    ui.separator();
                    for (key, value) in &self.graph_metadata {
                        ui.label(format!("{}: {}", key, value));
                    }
                }
            });
    }

    fn ui_marquee(&mut self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Marquee")
            .default_open(true)
            .show(ui, |ui| {
                let mut attached = self.is_overlay_attached();
                ui.horizontal(|ui| {
                    if ui.checkbox(&mut attached, "enabled").changed() {
                        if attached {
                            self.attach_overlay();
                        } else {
                            self.detach_overlay();
                        }
                    }
                    Self::info_icon(
                        ui,
                        "Drag with the trigger button to select; click an edge joint to remove it",
                    );
                });

                ui.label(format!("Trigger: {}", self.config.trigger_button.label()));
                ui.label(format!("Joint marker: {}", self.config.edge_joint_marker));

                let mut changed = false;
                changed |= ui
                    .add(
                        egui::Slider::new(&mut self.config.style.stroke_width, 0.5..=6.0)
                            .text("stroke"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut self.config.style.dash_length, 1.0..=20.0)
                            .text("dash"),
                    )
                    .changed();
                ui.add(
                    egui::Slider::new(&mut self.config.hover_radius, 2.0..=30.0)
                        .text("hover radius"),
                );
                if changed {
                    self.reattach_overlay();
                }

                if let Some(outcome) = &self.last_outcome {
                    ui.separator();
                    let text = match outcome {
                        OverlayOutcome::Selected(keys) => {
                            format!("Selected {} node(s)", keys.len())
                        }
                        OverlayOutcome::Removed(key) => format!("Removed {}", key),
                        OverlayOutcome::Abandoned => "Drag abandoned".to_string(),
                        OverlayOutcome::Ignored => String::new(),
                    };
                    ui.label(text);
                }
            });
    }

    fn ui_joints(&mut self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Edge Joints")
            .default_open(false)
            .show(ui, |ui| {
                let edges = self.engine.borrow().edges();
                let mut split = None;
                let mut remove = None;

                ui.label("Relations");
                for (key, from, to) in &edges {
                    ui.horizontal(|ui| {
                        if ui.small_button("+").on_hover_text("Add joint").clicked() {
                            split = Some(key.clone());
                        }
                        ui.label(format!("{} → {}", from, to));
                    });
                }

                let joints: Vec<NodeKey> = {
                    let engine = self.engine.borrow();
                    let model = engine.model();
                    model
                        .node_keys()
                        .into_iter()
                        .filter(|k| model.joints().contains(k))
                        .collect()
                };
                if !joints.is_empty() {
                    ui.separator();
                    ui.label("Joints");
                    for joint in &joints {
                        ui.horizontal(|ui| {
                            if ui.small_button("✕").on_hover_text("Remove joint").clicked() {
                                remove = Some(joint.clone());
                            }
                            ui.label(joint.as_str());
                        });
                    }
                }

                let removed = self.removals.borrow().len();
                if removed > 0 {
                    ui.separator();
                    ui.label(format!("Removed by click: {}", removed));
                }

                let mut engine = self.engine.borrow_mut();
                if let Some(edge) = split {
                    engine.split_edge(&edge);
                }
                if let Some(joint) = remove {
                    engine.remove_edge_joint(&joint);
                }
            });
    }

    fn ui_navigation(&mut self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Navigation")
            .default_open(false)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    if ui
                        .checkbox(
                            &mut self.settings_navigation.fit_to_screen_enabled,
                            "fit_to_screen",
                        )
                        .clicked()
                    {
                        self.settings_navigation.zoom_and_pan_enabled =
                            !self.settings_navigation.zoom_and_pan_enabled;
                    }
                    Self::info_icon(ui, "Auto-fit graph to viewport");
                });

                ui.add_enabled_ui(self.settings_navigation.fit_to_screen_enabled, |ui| {
                    ui.add(
                        egui::Slider::new(
                            &mut self.settings_navigation.fit_to_screen_padding,
                            0.0..=1.0,
                        )
                        .text("padding"),
                    );
                });

                ui.horizontal(|ui| {
                    if ui
                        .checkbox(
                            &mut self.settings_navigation.zoom_and_pan_enabled,
                            "zoom_and_pan",
                        )
                        .clicked()
                    {
                        self.settings_navigation.fit_to_screen_enabled =
                            !self.settings_navigation.fit_to_screen_enabled;
                    }
                    Self::info_icon(ui, "Manual zoom and pan");
                });

                ui.add_enabled_ui(self.settings_navigation.zoom_and_pan_enabled, |ui| {
                    ui.add(
                        egui::Slider::new(&mut self.settings_navigation.zoom_speed, 0.01..=2.0)
                            .text("zoom_speed"),
                    );
                });
            });
    }

    fn ui_layout(&mut self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Layout")
            .default_open(false)
            .show(ui, |ui| {
                let mut state = egui_graphs::get_layout_state::<ForceState>(ui, None);

                ui.horizontal(|ui| {
                    ui.checkbox(&mut state.base.is_running, "running");
                    Self::info_icon(ui, "Run/pause simulation");
                });
                ui.add(egui::Slider::new(&mut state.base.dt, 0.001..=0.2).text("dt"));
                ui.add(egui::Slider::new(&mut state.base.damping, 0.0..=1.0).text("damping"));
                ui.add(egui::Slider::new(&mut state.base.k_scale, 0.2..=3.0).text("k_scale"));

                egui_graphs::set_layout_state::<ForceState>(ui, state, None);
            });
    }

    fn ui_interaction(&mut self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Interaction")
            .default_open(false)
            .show(ui, |ui| {
                ui.checkbox(&mut self.settings_interaction.dragging_enabled, "dragging");
                ui.checkbox(&mut self.settings_interaction.hover_enabled, "hover");
                ui.checkbox(
                    &mut self.settings_interaction.node_selection_enabled,
                    "click selection",
                );
                ui.add_enabled_ui(self.settings_interaction.node_selection_enabled, |ui| {
                    ui.checkbox(
                        &mut self.settings_interaction.node_selection_multi_enabled,
                        "multi selection",
                    );
                });
            });
    }

    fn ui_style(&mut self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Style")
            .default_open(false)
            .show(ui, |ui| {
                let mut dark = ui.ctx().style().visuals.dark_mode;
                if ui.checkbox(&mut dark, "dark mode").changed() {
                    let visuals = if dark {
                        egui::Visuals::dark()
                    } else {
                        egui::Visuals::light()
                    };
                    ui.ctx().set_visuals(visuals);
                    self.dark_mode = dark;
                }
                ui.checkbox(&mut self.settings_style.labels_always, "Always show labels");
            });
    }

    fn ui_selected(&self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Selected")
            .default_open(true)
            .show(ui, |ui| {
                let engine = self.engine.borrow();
                let selected = engine.selected_keys();
                if selected.is_empty() {
                    ui.label("Nothing selected");
                    return;
                }
                ui.label(format!("{} node(s)", selected.len()));
                egui::ScrollArea::vertical()
                    .max_height(200.0)
                    .show(ui, |ui| {
                        for key in &selected {
                            let label = engine.label(key).unwrap_or_default();
                            if label.is_empty() {
                                ui.label(key.as_str());
                            } else {
                                ui.label(format!("{} ({})", label, key));
                            }
                        }
                    });
            });
    }

    /// Resolve the node under the pointer into the shared hover slot.
    fn update_hover(&self, pointer: Option<egui::Pos2>, rect: egui::Rect) {
        let hovered = pointer.filter(|p| rect.contains(*p)).and_then(|p| {
            let engine = self.engine.borrow();
            let local = Point::new(p.x - rect.min.x, p.y - rect.min.y);
            engine.node_at(engine.screen_to_canvas(local), self.config.hover_radius)
        });
        self.hover.set(hovered);
    }

    /// Feed this frame's pointer input through the hub.
    fn dispatch_pointer(&mut self, ctx: &Context, rect: egui::Rect) {
        let translator = &mut self.translator;
        let events = ctx.input(|i| translator.translate_input(i));
        for event in events {
            // Gestures start only on the canvas; moves and releases are followed anywhere.
            let on_canvas = rect.contains(egui::pos2(event.position.x, event.position.y));
            if event.kind == PointerEventKind::Down && !on_canvas {
                continue;
            }
            self.hub.dispatch(&event);
        }
        if let Some(outcome) = self.handle.as_ref().and_then(OverlayHandle::take_outcome) {
            self.last_outcome = Some(outcome);
        }
    }

    /// Open the native-style menu on a trigger click while the overlay is detached.
    fn open_context_menu(&mut self, ctx: &Context, rect: egui::Rect) {
        if self.container.context_menu_suppressed() {
            return;
        }
        let clicked = ctx.input(|i| {
            i.pointer
                .button_clicked(crate::input::egui_button(self.config.trigger_button))
        });
        if let Some(pos) = ctx.input(|i| i.pointer.interact_pos()) {
            if clicked && rect.contains(pos) {
                self.context_menu = ContextMenuState {
                    show: true,
                    just_opened: true,
                    screen_pos: pos,
                    node: self.hover.current_hover(),
                };
            }
        }
    }

    fn draw_context_menu(&mut self, ui: &mut egui::Ui) {
        let mut attach = false;
        let mut clear = false;

        let area_response = egui::Area::new(egui::Id::new("graph_context_menu"))
            .order(egui::Order::Foreground)
            .fixed_pos(self.context_menu.screen_pos)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.vertical(|ui| {
                        if let Some(key) = &self.context_menu.node {
                            ui.label(egui::RichText::new(key.as_str()).strong());
                            ui.separator();
                        }
                        if ui.button("Enable marquee selection").clicked() {
                            attach = true;
                        }
                        if ui.button("Clear selection").clicked() {
                            clear = true;
                        }
                        ui.separator();
                        if ui.button("Cancel").clicked() {
                            self.context_menu.show = false;
                        }
                    });
                })
            });

        if attach || clear {
            self.context_menu.show = false;
        }
        if attach {
            self.attach_overlay();
        }
        if clear {
            self.engine.borrow_mut().select_nodes(&[]);
        }

        // Click-outside-to-close after the first frame
        if !self.context_menu.just_opened && ui.input(|i| i.pointer.primary_clicked()) {
            if let Some(click_pos) = ui.input(|i| i.pointer.interact_pos()) {
                if !area_response.response.rect.contains(click_pos) {
                    self.context_menu.show = false;
                }
            }
        }
        self.context_menu.just_opened = false;
    }
}

// =============================================================================

impl App for MarqueeGraphApp {
    fn update(&mut self, ctx: &Context, _: &mut eframe::Frame) {
        ctx.input(|i| {
            if i.key_pressed(egui::Key::Tab) {
                self.show_sidebar = !self.show_sidebar;
            }
        });
        if ctx.input(|i| i.key_pressed(egui::Key::M)) {
            if self.is_overlay_attached() {
                self.detach_overlay();
            } else {
                self.attach_overlay();
            }
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.engine.borrow_mut().select_nodes(&[]);
        }

        // Right sidebar with controls
        if self.show_sidebar {
            egui::SidePanel::right("right_panel")
                .default_width(280.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        ui.heading("Graph Marquee");
                        ui.separator();

                        self.ui_info(ui);
                        ui.separator();

                        self.ui_marquee(ui);
                        ui.separator();

                        self.ui_joints(ui);
                        ui.separator();

                        self.ui_navigation(ui);
                        ui.separator();

                        self.ui_layout(ui);
                        ui.separator();

                        self.ui_interaction(ui);
                        ui.separator();

                        self.ui_style(ui);
                        ui.separator();

                        self.ui_selected(ui);
                    });
                });
        }

        // Central panel with graph
        egui::CentralPanel::default().show(ctx, |ui| {
            // While the trigger button is held the canvas must not pan or drag nodes.
            let trigger = self.config.trigger_button;
            let gesture_held = self.is_overlay_attached()
                && ui.input(|i| i.pointer.button_down(crate::input::egui_button(trigger)));
            let effective_dragging = self.settings_interaction.dragging_enabled && !gesture_held;
            let effective_zoom_pan = self.settings_navigation.zoom_and_pan_enabled && !gesture_held;

            let dark_mode = self.dark_mode;

            let settings_interaction = egui_graphs::SettingsInteraction::new()
                .with_dragging_enabled(effective_dragging)
                .with_hover_enabled(self.settings_interaction.hover_enabled)
                .with_node_clicking_enabled(self.settings_interaction.node_clicking_enabled)
                .with_node_selection_enabled(self.settings_interaction.node_selection_enabled)
                .with_node_selection_multi_enabled(
                    self.settings_interaction.node_selection_multi_enabled,
                );

            let settings_navigation = egui_graphs::SettingsNavigation::new()
                .with_fit_to_screen_enabled(self.settings_navigation.fit_to_screen_enabled)
                .with_zoom_and_pan_enabled(effective_zoom_pan)
                .with_zoom_speed(self.settings_navigation.zoom_speed)
                .with_fit_to_screen_padding(self.settings_navigation.fit_to_screen_padding);

            let settings_style = egui_graphs::SettingsStyle::new()
                .with_labels_always(self.settings_style.labels_always)
                .with_node_stroke_hook(move |selected, dragged, _color, _stroke, _style| {
                    if selected {
                        let color = if dark_mode {
                            egui::Color32::from_rgb(0, 255, 255)
                        } else {
                            egui::Color32::from_rgb(0, 150, 200)
                        };
                        egui::Stroke::new(3.0, color)
                    } else if dragged {
                        egui::Stroke::new(2.0, egui::Color32::from_rgb(255, 200, 0))
                    } else {
                        egui::Stroke::NONE
                    }
                });

            let graph_response = {
                let mut engine = self.engine.borrow_mut();
                ui.add(
                    &mut GraphView::<_, _, _, _, _, _, ForceState, ForceLayout>::new(
                        engine.view_mut(),
                    )
                    .with_interactions(&settings_interaction)
                    .with_navigations(&settings_navigation)
                    .with_styles(&settings_style),
                )
            };
            let rect = graph_response.rect;

            let meta = MetadataFrame::new(None).load(ui);
            let transform = CanvasTransform::from_frame(&meta, rect.min);
            self.engine.borrow_mut().update_frame(meta);
            self.container.set_origin(rect.min);

            self.update_hover(ui.input(|i| i.pointer.hover_pos()), rect);
            self.dispatch_pointer(ui.ctx(), rect);

            let painter = ui.painter_at(rect);
            let mut surface = PainterSurface::new(&painter, transform);
            self.hub.run_render_hooks(&mut surface);

            if self.engine.borrow_mut().take_redraw_request() {
                ui.ctx().request_repaint();
            }

            self.open_context_menu(ui.ctx(), rect);
            if self.context_menu.show {
                self.draw_context_menu(ui);
            }

            let dragging = self.handle.as_ref().is_some_and(OverlayHandle::is_dragging);
            draw_mode_indicator(
                ui,
                self.is_overlay_attached(),
                dragging,
                self.config.trigger_button,
            );
            draw_sidebar_toggle(ui, &mut self.show_sidebar);
        });
    }
}
