use glam::Vec2;

/// A high-level view action produced from raw input.
///
/// The desktop app consumes actions, never raw events, so the camera logic
/// does not depend on the windowing library.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Orbit the camera by a pointer delta in pixels.
    Orbit(Vec2),
    /// Pan the orbit target by a pointer delta in pixels.
    Pan(Vec2),
    /// Zoom by wheel steps. Positive moves toward the target.
    Zoom(f32),
    /// Return the camera to its starting pose.
    ResetCamera,
    /// Show or hide the debug panel.
    ToggleInspector,
    /// Close the application.
    Quit,
    /// No-op (used for input that is not bound).
    Noop,
}

impl Action {
    /// Whether this action moves the camera.
    pub fn is_camera_motion(&self) -> bool {
        matches!(self, Action::Orbit(_) | Action::Pan(_) | Action::Zoom(_))
    }
}
