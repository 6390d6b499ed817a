use super::geometry::Vec2;
use super::texture::Rgba;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UiId(pub u64);

/// Screen elements are placed in logical screen pixels and ignore the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    World,
    Screen,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiKind {
    /// Center-aligned bitmap text; `\n` starts a new line.
    Text {
        text: String,
        color: Rgba,
        pixel_scale: u32,
    },
    Panel {
        size: Vec2,
        color: Rgba,
    },
}

/// Text or filled panel centered on `position`.
#[derive(Debug, Clone, PartialEq)]
pub struct UiElement {
    pub kind: UiKind,
    pub position: Vec2,
    pub depth: f32,
    pub visible: bool,
    pub space: Space,
}

impl UiElement {
    pub fn text(text: &str, color: Rgba, pixel_scale: u32, space: Space) -> Self {
        Self {
            kind: UiKind::Text {
                text: text.to_string(),
                color,
                pixel_scale: pixel_scale.max(1),
            },
            position: Vec2::ZERO,
            depth: 0.0,
            visible: true,
            space,
        }
    }

    pub fn panel(size: Vec2, color: Rgba, space: Space) -> Self {
        Self {
            kind: UiKind::Panel { size, color },
            position: Vec2::ZERO,
            depth: 0.0,
            visible: true,
            space,
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            UiKind::Text { text, .. } => Some(text),
            UiKind::Panel { .. } => None,
        }
    }

    /// Replaces the text of a text element; panels are left alone.
    pub fn set_text(&mut self, value: &str) {
        if let UiKind::Text { text, .. } = &mut self.kind {
            value.clone_into(text);
        }
    }
}
