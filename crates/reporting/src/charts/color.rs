use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_svg_fill(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_svg_fill())
    }
}

pub const BLACK: Color = Color::rgb(0, 0, 0);
pub const GRID: Color = Color::rgb(221, 221, 221);
pub const MUTED: Color = Color::rgb(119, 119, 119);

/// Series colors, cycled by index.
pub const PALETTE: [Color; 8] = [
    Color::rgb(31, 119, 180),
    Color::rgb(255, 127, 14),
    Color::rgb(44, 160, 44),
    Color::rgb(214, 39, 40),
    Color::rgb(148, 103, 189),
    Color::rgb(140, 86, 75),
    Color::rgb(227, 119, 194),
    Color::rgb(127, 127, 127),
];

pub fn palette(i: usize) -> Color {
    PALETTE[i % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_fill_is_lowercase_hex() {
        assert_eq!(Color::rgb(255, 127, 14).to_svg_fill(), "#ff7f0e");
        assert_eq!(palette(8), palette(0));
    }
}
