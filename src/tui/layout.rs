use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};

/// Screen regions for the archive browser
pub struct AppLayout {
    pub search_area: Rect,
    pub results_area: Rect,
    pub preview_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// - Search bar: 3 rows at the top
    /// - Message list: 55% width (left)
    /// - Preview pane: 45% width (right)
    /// - Status bar: bottom row
    pub fn new(area: Rect) -> Self {
        let vertical_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar
                Constraint::Min(3),    // Main area
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        let horizontal_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(vertical_chunks[1]);

        Self {
            search_area: vertical_chunks[0],
            results_area: horizontal_chunks[0],
            preview_area: horizontal_chunks[1],
            status_area: vertical_chunks[2],
        }
    }
}

/// Centered popup of at most `width` x `height`, clamped to `area`
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    popup
}
