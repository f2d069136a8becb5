use clap::ValueEnum;

/// Marker drawn for every point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum MarkerSymbol {
    #[default]
    Disc,
    Ring,
    Square,
    Diamond,
    TriangleUp,
    Cross,
    Plus,
}

impl MarkerSymbol {
    pub const ALL: [MarkerSymbol; 7] = [
        MarkerSymbol::Disc,
        MarkerSymbol::Ring,
        MarkerSymbol::Square,
        MarkerSymbol::Diamond,
        MarkerSymbol::TriangleUp,
        MarkerSymbol::Cross,
        MarkerSymbol::Plus,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MarkerSymbol::Disc => "disc",
            MarkerSymbol::Ring => "ring",
            MarkerSymbol::Square => "square",
            MarkerSymbol::Diamond => "diamond",
            MarkerSymbol::TriangleUp => "triangle",
            MarkerSymbol::Cross => "cross",
            MarkerSymbol::Plus => "plus",
        }
    }

    /// Outline-only symbols, drawn with strokes instead of fills.
    pub fn is_stroked(self) -> bool {
        matches!(
            self,
            MarkerSymbol::Ring | MarkerSymbol::Cross | MarkerSymbol::Plus
        )
    }
}

/// Which colors the scatter uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum ColorMode {
    /// Colors loaded from the file, or a flat default when the file has none.
    #[default]
    Original,
    /// Distance-to-reference gradient.
    Gradient,
}

impl ColorMode {
    pub const ALL: [ColorMode; 2] = [ColorMode::Original, ColorMode::Gradient];

    pub fn label(self) -> &'static str {
        match self {
            ColorMode::Original => "original colors",
            ColorMode::Gradient => "depth gradient",
        }
    }
}
