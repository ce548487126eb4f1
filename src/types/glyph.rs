//! Glyph markers and composites

use serde::{Serialize, Serializer};

/// Placeholder shown for ticks that emit no glyph
pub const BASELINE_DOT: char = '·';

/// A single output marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Marker {
    Alarm,
    Containment,
    Replay,
    Seal,
}

impl Marker {
    /// All markers in emission precedence
    pub const ALL: [Marker; 4] = [
        Marker::Alarm,
        Marker::Containment,
        Marker::Replay,
        Marker::Seal,
    ];

    pub fn symbol(&self) -> char {
        match self {
            Marker::Alarm => '⁂',
            Marker::Containment => '∥',
            Marker::Replay => '↺',
            Marker::Seal => '●',
        }
    }

    fn bit(&self) -> u8 {
        match self {
            Marker::Alarm => 1,
            Marker::Containment => 1 << 1,
            Marker::Replay => 1 << 2,
            Marker::Seal => 1 << 3,
        }
    }
}

/// A non-empty ordered set of markers emitted on one tick
///
/// Composites always iterate and render in [`Marker::ALL`] order no matter
/// how they were built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Glyph {
    bits: u8,
}

impl Glyph {
    /// Build a glyph from markers; `None` when the iterator is empty
    pub fn from_markers<I: IntoIterator<Item = Marker>>(markers: I) -> Option<Self> {
        let bits = markers.into_iter().fold(0u8, |acc, m| acc | m.bit());
        (bits != 0).then_some(Self { bits })
    }

    pub fn single(marker: Marker) -> Self {
        Self { bits: marker.bit() }
    }

    pub fn contains(&self, marker: Marker) -> bool {
        self.bits & marker.bit() != 0
    }

    pub fn is_composite(&self) -> bool {
        self.bits.count_ones() > 1
    }

    pub fn markers(&self) -> impl Iterator<Item = Marker> + '_ {
        Marker::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl std::fmt::Display for Glyph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for m in self.markers() {
            write!(f, "{}", m.symbol())?;
        }
        Ok(())
    }
}

impl Serialize for Glyph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Render a tick's output, substituting the baseline dot for no glyph
pub fn render(glyph: Option<&Glyph>) -> String {
    match glyph {
        Some(g) => g.to_string(),
        None => BASELINE_DOT.to_string(),
    }
}
