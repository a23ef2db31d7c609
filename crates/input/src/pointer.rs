use crate::action::Action;
use glam::Vec2;

/// Which kind of drag a pressed button starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragButton {
    /// Left button: orbit.
    Primary,
    /// Right or middle button: pan.
    Secondary,
}

/// Tracks cursor position and held buttons, turning motion into actions.
#[derive(Debug, Default)]
pub struct PointerTracker {
    cursor: Option<Vec2>,
    held: Option<DragButton>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, button: DragButton) {
        // The first button pressed decides the drag mode.
        if self.held.is_none() {
            self.held = Some(button);
        }
    }

    pub fn release(&mut self, button: DragButton) {
        if self.held == Some(button) {
            self.held = None;
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.held.is_some()
    }

    /// Record a new cursor position and return the action it causes.
    pub fn moved(&mut self, position: Vec2) -> Action {
        let previous = self.cursor.replace(position);
        let (Some(held), Some(previous)) = (self.held, previous) else {
            return Action::Noop;
        };
        let delta = position - previous;
        if delta == Vec2::ZERO {
            return Action::Noop;
        }
        match held {
            DragButton::Primary => Action::Orbit(delta),
            DragButton::Secondary => Action::Pan(delta),
        }
    }

    /// Cursor left the window: the next move must not produce a jump.
    pub fn left(&mut self) {
        self.cursor = None;
        self.held = None;
    }

    /// Map a wheel delta in lines to a zoom action.
    pub fn wheel_lines(&self, lines: f32) -> Action {
        if lines == 0.0 {
            Action::Noop
        } else {
            Action::Zoom(lines)
        }
    }

    /// Map a wheel delta in pixels to a zoom action. Roughly one line per 50px.
    pub fn wheel_pixels(&self, pixels: f32) -> Action {
        self.wheel_lines(pixels / 50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_without_button_is_noop() {
        let mut p = PointerTracker::new();
        assert_eq!(p.moved(Vec2::new(10.0, 10.0)), Action::Noop);
        assert_eq!(p.moved(Vec2::new(20.0, 10.0)), Action::Noop);
    }

    #[test]
    fn primary_drag_orbits() {
        let mut p = PointerTracker::new();
        p.moved(Vec2::new(10.0, 10.0));
        p.press(DragButton::Primary);
        assert_eq!(p.moved(Vec2::new(15.0, 8.0)), Action::Orbit(Vec2::new(5.0, -2.0)));
        p.release(DragButton::Primary);
        assert!(!p.is_dragging());
        assert_eq!(p.moved(Vec2::new(30.0, 8.0)), Action::Noop);
    }

    #[test]
    fn secondary_drag_pans() {
        let mut p = PointerTracker::new();
        p.moved(Vec2::ZERO);
        p.press(DragButton::Secondary);
        assert_eq!(p.moved(Vec2::new(0.0, 4.0)), Action::Pan(Vec2::new(0.0, 4.0)));
    }

    #[test]
    fn first_button_wins() {
        let mut p = PointerTracker::new();
        p.moved(Vec2::ZERO);
        p.press(DragButton::Primary);
        p.press(DragButton::Secondary);
        p.release(DragButton::Secondary);
        assert!(p.is_dragging());
        assert!(matches!(p.moved(Vec2::ONE), Action::Orbit(_)));
    }

    #[test]
    fn press_before_any_motion_does_not_jump() {
        let mut p = PointerTracker::new();
        p.press(DragButton::Primary);
        assert_eq!(p.moved(Vec2::new(500.0, 500.0)), Action::Noop);
        assert!(matches!(p.moved(Vec2::new(501.0, 500.0)), Action::Orbit(_)));
    }

    #[test]
    fn leaving_window_resets() {
        let mut p = PointerTracker::new();
        p.moved(Vec2::ZERO);
        p.press(DragButton::Primary);
        p.left();
        assert!(!p.is_dragging());
        assert_eq!(p.moved(Vec2::new(100.0, 0.0)), Action::Noop);
    }

    #[test]
    fn wheel_maps_to_zoom() {
        let p = PointerTracker::new();
        assert_eq!(p.wheel_lines(1.0), Action::Zoom(1.0));
        assert_eq!(p.wheel_lines(0.0), Action::Noop);
        assert_eq!(p.wheel_pixels(100.0), Action::Zoom(2.0));
    }
}
