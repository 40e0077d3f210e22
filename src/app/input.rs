//! Per-frame mouse state, fed by winit events.

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Mouse state accumulated over one frame.
///
/// Deltas accumulate across events within a frame and are cleared by
/// [`end_frame`](Self::end_frame); positions and button state persist.
#[derive(Default, Debug, Clone)]
pub struct Input {
    /// Cursor position in window coordinates.
    pub cursor_position: Vec2,
    /// Cursor movement since the last frame.
    pub cursor_delta: Vec2,
    /// Scroll amount this frame.
    pub scroll_delta: Vec2,
    /// Window size in physical pixels.
    pub screen_size: Vec2,
    /// Buttons currently held down.
    pub mouse_buttons: HashSet<MouseButton>,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the per-frame deltas. Call after the update step has
    /// consumed them.
    pub fn end_frame(&mut self) {
        self.cursor_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    pub fn handle_resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width as f32, height as f32);
    }

    pub fn handle_cursor_move(&mut self, x: f64, y: f64) {
        let position = Vec2::new(x as f32, y as f32);
        // The very first event has no previous position to diff against.
        if self.cursor_position != Vec2::ZERO {
            self.cursor_delta += position - self.cursor_position;
        }
        self.cursor_position = position;
    }

    pub fn handle_mouse_input(&mut self, state: ElementState, button: MouseButton) {
        match state {
            ElementState::Pressed => {
                self.mouse_buttons.insert(button);
            }
            ElementState::Released => {
                self.mouse_buttons.remove(&button);
            }
        }
    }

    pub fn handle_mouse_wheel(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(x, y) => {
                self.scroll_delta += Vec2::new(x, y);
            }
            MouseScrollDelta::PixelDelta(position) => {
                // Pixel deltas run much larger than line deltas.
                self.scroll_delta += Vec2::new(position.x as f32, position.y as f32) * 0.1;
            }
        }
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_accumulate_and_clear() {
        let mut input = Input::new();
        input.handle_cursor_move(10.0, 10.0);
        input.handle_cursor_move(15.0, 12.0);
        input.handle_cursor_move(18.0, 11.0);
        assert_eq!(input.cursor_delta, Vec2::new(8.0, 1.0));

        input.end_frame();
        assert_eq!(input.cursor_delta, Vec2::ZERO);
        assert_eq!(input.cursor_position, Vec2::new(18.0, 11.0));
    }

    #[test]
    fn button_state_persists_across_frames() {
        let mut input = Input::new();
        input.handle_mouse_input(ElementState::Pressed, MouseButton::Left);
        input.end_frame();
        assert!(input.is_button_pressed(MouseButton::Left));

        input.handle_mouse_input(ElementState::Released, MouseButton::Left);
        assert!(!input.is_button_pressed(MouseButton::Left));
    }
}
