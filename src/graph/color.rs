/// An 8-bit RGB display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel midpoint of two colors, rounded down.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let mid = |a: u8, b: u8| ((u16::from(a) + u16::from(b)) / 2) as u8;
        Self {
            r: mid(self.r, other.r),
            g: mid(self.g, other.g),
            b: mid(self.b, other.b),
        }
    }
}

/// Line colors, handed out round-robin.
pub const PALETTE: [Color; 8] = [
    Color::rgb(255, 64, 64),
    Color::rgb(64, 160, 255),
    Color::rgb(64, 255, 96),
    Color::rgb(255, 220, 64),
    Color::rgb(200, 96, 255),
    Color::rgb(64, 255, 240),
    Color::rgb(255, 140, 32),
    Color::rgb(255, 255, 255),
];

/// Palette color for the `index`-th line ever created.
#[must_use]
pub fn palette_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}
