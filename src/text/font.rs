use crate::foundation::core::Color;

/// Horizontal placement of text inside its rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Font state carried by a bitmap and used by `draw_text` / `text_size`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Font {
    /// Family names tried in order; the first registered font is used when none match.
    pub names: Vec<String>,
    /// Pixel size.
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
    pub outline: bool,
    pub shadow: bool,
    pub color: Color,
    pub out_color: Color,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            size: 24,
            bold: false,
            italic: false,
            outline: true,
            shadow: false,
            color: Color::white(),
            out_color: Color::new(0.0, 0.0, 0.0, 128.0),
        }
    }
}

impl Font {
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Same font at `size * num / den`, rounded, at least 1px. Used for hires mirrors.
    pub(crate) fn scaled(&self, num: u32, den: u32) -> Self {
        let size = crate::foundation::math::scale_round(self.size as i32, num, den).max(1);
        Self {
            size: size as u32,
            ..self.clone()
        }
    }
}
