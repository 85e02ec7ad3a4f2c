use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable UI component.
///
/// Components receive their data as props (struct fields) and render it into
/// a `Rect` of the frame. The chat's components are all built fresh each
/// frame from `App`, so none of them keeps state between frames.
pub trait Component {
    /// Render the component into the given area.
    ///
    /// Callers clip `area` to the frame first; a component may assume every
    /// cell of `area` exists.
    fn render(&mut self, frame: &mut Frame, area: Rect);
}
