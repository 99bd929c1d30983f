use unicode_width::UnicodeWidthStr;

#[derive(Debug, Default, Clone)]
pub struct ScrollableParagraphState {
    pub content: String,
    pub scroll_offset_vertical: u16,
    viewport_width: u16,
    viewport_height: u16,
}

impl ScrollableParagraphState {
    pub fn set_content(&mut self, content: String) {
        if self.content != content {
            self.content = content;
            self.scroll_offset_vertical = 0; // Reset scroll when content changes
        }
    }

    pub fn set_dimensions(&mut self, width: u16, height: u16) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.scroll_offset_vertical = self.scroll_offset_vertical.min(self.max_scroll());
    }

    /// Rough number of wrapped lines, good enough to cap scrolling.
    pub fn wrapped_line_count(&self) -> usize {
        let width = self.viewport_width.max(1) as usize;
        self.content.lines().map(|line| line.width().max(1).div_ceil(width)).sum()
    }

    pub fn max_scroll(&self) -> u16 {
        let overflow = self.wrapped_line_count().saturating_sub(self.viewport_height as usize);
        u16::try_from(overflow).unwrap_or(u16::MAX)
    }

    pub fn scroll_up(&mut self, amount: u16) {
        self.scroll_offset_vertical = self.scroll_offset_vertical.saturating_sub(amount);
    }

    pub fn scroll_down(&mut self, amount: u16) {
        self.scroll_offset_vertical =
            self.scroll_offset_vertical.saturating_add(amount).min(self.max_scroll());
    }

    pub fn page_size(&self) -> u16 {
        self.viewport_height.saturating_sub(1).max(1)
    }
}
