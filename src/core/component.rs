//! Component and Focusable traits.

use crate::core::input_event::InputEvent;

/// Renderable, input-driven terminal component.
pub trait Component {
    /// Render to a list of lines at the given width.
    fn render(&mut self, width: usize) -> Vec<String>;

    /// Handle input events.
    fn handle_event(&mut self, _event: &InputEvent) {}

    /// Invalidate any cached state.
    fn invalidate(&mut self) {}

    /// Optional focus behavior.
    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        None
    }
}

/// Focusable behavior for components that track focus.
pub trait Focusable {
    fn set_focused(&mut self, focused: bool);
    fn is_focused(&self) -> bool;
}
