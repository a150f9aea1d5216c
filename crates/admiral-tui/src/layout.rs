//! Screen layout definitions for the TUI

use ratatui::layout::{Constraint, Layout, Rect};

/// Screen areas for the main layout
#[derive(Debug, Clone, Copy)]
pub struct ScreenAreas {
    /// View tab bar
    pub header: Rect,

    /// Main content area (the active view)
    pub content: Rect,

    /// Status bar (connection, hints, rescan progress)
    pub status: Rect,
}

/// Create the main screen layout
pub fn create(area: Rect) -> ScreenAreas {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Tab bar with borders
        Constraint::Min(3),    // Content
        Constraint::Length(1), // Status line
    ])
    .split(area);

    ScreenAreas {
        header: chunks[0],
        content: chunks[1],
        status: chunks[2],
    }
}

/// A centered overlay rect for dialogs, clamped to the screen.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_layout() {
        let areas = create(Rect::new(0, 0, 80, 24));
        assert_eq!(areas.header.height, 3);
        assert_eq!(areas.content.height, 20);
        assert_eq!(areas.status.height, 1);
    }

    #[test]
    fn test_centered_clamps_to_screen() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered(area, 60, 20);
        assert!(rect.width <= 40);
        assert!(rect.height <= 10);

        let rect = centered(area, 20, 6);
        assert_eq!(rect.x, 10);
        assert_eq!(rect.y, 2);
    }
}
