//! egui input translated into overlay pointer events, and the canvas container.

use std::cell::Cell;

use graph_marquee_core::{Container, Point, PointerButton, PointerEvent};

fn map_button(button: egui::PointerButton) -> PointerButton {
    match button {
        egui::PointerButton::Primary => PointerButton::Primary,
        egui::PointerButton::Secondary => PointerButton::Secondary,
        egui::PointerButton::Middle => PointerButton::Middle,
        egui::PointerButton::Extra1 | egui::PointerButton::Extra2 => PointerButton::Extra,
    }
}

pub(crate) fn egui_button(button: PointerButton) -> egui::PointerButton {
    match button {
        PointerButton::Primary => egui::PointerButton::Primary,
        PointerButton::Secondary => egui::PointerButton::Secondary,
        PointerButton::Middle => egui::PointerButton::Middle,
        PointerButton::Extra => egui::PointerButton::Extra1,
    }
}

/// Turns the ordered egui event list of a frame into [`PointerEvent`]s.
///
/// Tracks which button is held so moves carry it. If egui no longer reports
/// the held button as down and no release for it is queued, the next move
/// reports no button.
#[derive(Debug, Default)]
pub struct PointerTranslator {
    held: Option<PointerButton>,
}

impl PointerTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held(&self) -> Option<PointerButton> {
        self.held
    }

    /// Translate with egui's live pointer state.
    pub fn translate_input(&mut self, input: &egui::InputState) -> Vec<PointerEvent> {
        self.translate(&input.events, |b| input.pointer.button_down(egui_button(b)))
    }

    /// Translate `events`, asking `is_down` whether a button is still held.
    pub fn translate(
        &mut self,
        events: &[egui::Event],
        is_down: impl Fn(PointerButton) -> bool,
    ) -> Vec<PointerEvent> {
        let mut out = Vec::new();
        for (i, event) in events.iter().enumerate() {
            match event {
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    ..
                } => {
                    let button = map_button(*button);
                    let position = Point::new(pos.x, pos.y);
                    if *pressed {
                        self.held = Some(button);
                        out.push(PointerEvent::down(position, button));
                    } else {
                        if self.held == Some(button) {
                            self.held = None;
                        }
                        out.push(PointerEvent::up(position, button));
                    }
                }
                egui::Event::PointerMoved(pos) => {
                    let held = self.held.filter(|&b| {
                        is_down(b) || released_later(&events[i + 1..], b)
                    });
                    self.held = held;
                    out.push(PointerEvent::moved(Point::new(pos.x, pos.y), held));
                }
                _ => {}
            }
        }
        out
    }
}

fn released_later(events: &[egui::Event], button: PointerButton) -> bool {
    events.iter().any(|event| {
        matches!(
            event,
            egui::Event::PointerButton { button: b, pressed: false, .. } if map_button(*b) == button
        )
    })
}

/// The graph widget's rectangle on screen plus the context-menu switch.
#[derive(Debug, Default)]
pub struct CanvasContainer {
    origin: Cell<Point>,
    menu_suppressed: Cell<bool>,
}

impl CanvasContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the top-left corner after the widget is laid out.
    pub fn set_origin(&self, origin: egui::Pos2) {
        self.origin.set(Point::new(origin.x, origin.y));
    }

    pub fn context_menu_suppressed(&self) -> bool {
        self.menu_suppressed.get()
    }
}

impl Container for CanvasContainer {
    fn origin(&self) -> Point {
        self.origin.get()
    }

    fn set_context_menu_suppressed(&self, suppressed: bool) {
        self.menu_suppressed.set(suppressed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_marquee_core::PointerEventKind;

    fn press(x: f32, y: f32, button: egui::PointerButton, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos: egui::pos2(x, y),
            button,
            pressed,
            modifiers: egui::Modifiers::NONE,
        }
    }

    fn moved(x: f32, y: f32) -> egui::Event {
        egui::Event::PointerMoved(egui::pos2(x, y))
    }

    #[test]
    fn press_move_release_keeps_button_on_moves() {
        let mut t = PointerTranslator::new();
        let events = [
            press(10.0, 10.0, egui::PointerButton::Secondary, true),
            moved(20.0, 25.0),
            press(20.0, 25.0, egui::PointerButton::Secondary, false),
        ];
        // Released by end of frame, but the release is queued after the move.
        let out = t.translate(&events, |_| false);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].kind, PointerEventKind::Down);
        assert_eq!(out[0].button, Some(PointerButton::Secondary));
        assert_eq!(out[1].kind, PointerEventKind::Move);
        assert_eq!(out[1].button, Some(PointerButton::Secondary));
        assert_eq!(out[2].kind, PointerEventKind::Up);
        assert_eq!(t.held(), None);
    }

    #[test]
    fn held_button_survives_across_frames() {
        let mut t = PointerTranslator::new();
        t.translate(&[press(0.0, 0.0, egui::PointerButton::Secondary, true)], |_| true);
        let out = t.translate(&[moved(5.0, 5.0)], |b| b == PointerButton::Secondary);
        assert_eq!(out[0].button, Some(PointerButton::Secondary));
        assert_eq!(out[0].position, Point::new(5.0, 5.0));
    }

    #[test]
    fn lost_release_reports_move_without_button() {
        let mut t = PointerTranslator::new();
        t.translate(&[press(0.0, 0.0, egui::PointerButton::Secondary, true)], |_| true);
        let out = t.translate(&[moved(5.0, 5.0), moved(6.0, 6.0)], |_| false);
        assert_eq!(out[0].button, None);
        assert_eq!(out[1].button, None);
        assert_eq!(t.held(), None);
    }

    #[test]
    fn plain_hover_moves_have_no_button() {
        let mut t = PointerTranslator::new();
        let out = t.translate(&[moved(1.0, 2.0)], |_| false);
        assert_eq!(out[0].kind, PointerEventKind::Move);
        assert_eq!(out[0].button, None);
    }

    #[test]
    fn non_pointer_events_are_skipped() {
        let mut t = PointerTranslator::new();
        let out = t.translate(&[egui::Event::PointerGone, egui::Event::Copy], |_| false);
        assert!(out.is_empty());
    }

    #[test]
    fn container_tracks_origin_and_menu_flag() {
        let c = CanvasContainer::new();
        c.set_origin(egui::pos2(40.0, 60.0));
        assert_eq!(c.origin(), Point::new(40.0, 60.0));
        assert!(!c.context_menu_suppressed());
        c.set_context_menu_suppressed(true);
        assert!(c.context_menu_suppressed());
    }
}
