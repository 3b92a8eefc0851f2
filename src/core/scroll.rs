//! Scroll position of the message list, and whether to offer "jump to bottom".
//!
//! The list starts pinned to the bottom. Scrolling up unpins it; scrolling
//! back down to the end, or jumping, pins it again. While pinned, new
//! content keeps the newest message in view.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollController {
    offset: u16,
    content_height: u16,
    viewport_height: u16,
    stick_to_bottom: bool,
}

impl Default for ScrollController {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollController {
    pub fn new() -> Self {
        Self {
            offset: 0,
            content_height: 0,
            viewport_height: 0,
            stick_to_bottom: true,
        }
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }

    pub fn is_pinned(&self) -> bool {
        self.stick_to_bottom
    }

    fn max_offset(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    pub fn is_at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    /// Called every frame with the measured content and viewport.
    pub fn set_extent(&mut self, content_height: u16, viewport_height: u16) {
        self.content_height = content_height;
        self.viewport_height = viewport_height;
        if self.stick_to_bottom {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    /// The "jump to bottom" affordance is offered when scrolled away.
    pub fn show_jump_button(&self) -> bool {
        !self.stick_to_bottom && !self.is_at_bottom()
    }

    pub fn jump_to_bottom(&mut self) {
        self.stick_to_bottom = true;
        self.offset = self.max_offset();
    }

    pub fn scroll_up(&mut self, lines: u16) {
        if lines == 0 || self.offset == 0 {
            return;
        }
        self.offset = self.offset.saturating_sub(lines);
        self.stick_to_bottom = false;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.offset = self.offset.saturating_add(lines).min(self.max_offset());
        if self.is_at_bottom() {
            self.stick_to_bottom = true;
        }
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.viewport_height.max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.viewport_height.max(1));
    }
}
