/// Scroll position of the chat pane, counted in lines from the bottom.
///
/// Zero means "follow latest": new turns stay in view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    offset_from_bottom: usize,
}

impl ScrollState {
    pub fn is_following(&self) -> bool {
        self.offset_from_bottom == 0
    }

    pub fn offset_from_bottom(&self) -> usize {
        self.offset_from_bottom
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.offset_from_bottom = self.offset_from_bottom.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.offset_from_bottom = self.offset_from_bottom.saturating_sub(lines);
    }

    pub fn follow(&mut self) {
        self.offset_from_bottom = 0;
    }

    /// Keeps the offset within the scrollable range.
    pub fn clamp(&mut self, total_lines: usize, viewport_height: usize) {
        let max = total_lines.saturating_sub(viewport_height);
        self.offset_from_bottom = self.offset_from_bottom.min(max);
    }

    /// First visible line for the given content and viewport size.
    pub fn first_visible(&self, total_lines: usize, viewport_height: usize) -> usize {
        let max = total_lines.saturating_sub(viewport_height);
        max.saturating_sub(self.offset_from_bottom.min(max))
    }
}

/// Chat pane state.
#[derive(Debug, Default)]
pub struct ChatState {
    pub scroll: ScrollState,
    /// Visible rows of the chat pane at the last frame; used as page size.
    pub viewport_height: usize,
    /// Turns seen at the last frame, to snap back to latest on new turns.
    pub seen_turns: usize,
}

impl ChatState {
    pub fn page(&self) -> usize {
        (self.viewport_height / 2).max(1)
    }
}
