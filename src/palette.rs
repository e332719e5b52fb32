use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

const HEX_DIGIT_VALUES: u8 = 16;

const CHART_PALETTE: [HexColor; 12] = [
    HexColor::new(0x5E, 0x16, 0xEC),
    HexColor::new(0x34, 0xE8, 0x9E),
    HexColor::new(0xFF, 0x44, 0x44),
    HexColor::new(0xF9, 0xAE, 0x58),
    HexColor::new(0x64, 0xCB, 0xB8),
    HexColor::new(0x9C, 0xBA, 0xFF),
    HexColor::new(0xFF, 0x7A, 0xA5),
    HexColor::new(0xD6, 0xCD, 0x85),
    HexColor::new(0x1C, 0xC9, 0x10),
    HexColor::new(0x8D, 0xCC, 0xFF),
    HexColor::new(0xBC, 0xA4, 0xFF),
    HexColor::new(0x57, 0x5D, 0x9D),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for HexColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Assigns a display color to each genre slice of the stats chart.
pub trait ColorStrategy {
    fn color_for(&mut self, label: &str) -> HexColor;
}

/// Six independent hex digits, each uniform over 16 values. Colors differ
/// between runs.
pub struct RandomColors {
    rng: SmallRng,
}

impl RandomColors {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }

    #[cfg(test)]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomColors {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorStrategy for RandomColors {
    fn color_for(&mut self, _label: &str) -> HexColor {
        let mut digits = [0_u8; 6];
        for digit in &mut digits {
            *digit = self.rng.random_range(0..HEX_DIGIT_VALUES);
        }
        HexColor::new(
            (digits[0] << 4) | digits[1],
            (digits[2] << 4) | digits[3],
            (digits[4] << 4) | digits[5],
        )
    }
}

/// Same label, same color, on every run and every device.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashedColors;

impl ColorStrategy for HashedColors {
    fn color_for(&mut self, label: &str) -> HexColor {
        let digest = Sha256::digest(label.as_bytes());
        HexColor::new(digest[0], digest[1], digest[2])
    }
}

#[derive(Debug, Default)]
pub struct PaletteColors {
    assigned: HashMap<String, usize>,
}

impl ColorStrategy for PaletteColors {
    fn color_for(&mut self, label: &str) -> HexColor {
        let next_index = self.assigned.len();
        let index = *self.assigned.entry(label.to_string()).or_insert(next_index);
        CHART_PALETTE[index % CHART_PALETTE.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorStrategyKind {
    #[default]
    Hashed,
    Palette,
    Random,
}

impl ColorStrategyKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Hashed => "hashed",
            Self::Palette => "palette",
            Self::Random => "random",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Hashed => Self::Palette,
            Self::Palette => Self::Random,
            Self::Random => Self::Hashed,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hashed" | "hash" => Some(Self::Hashed),
            "palette" => Some(Self::Palette),
            "random" => Some(Self::Random),
            _ => None,
        }
    }

    pub fn build(self) -> Box<dyn ColorStrategy> {
        match self {
            Self::Hashed => Box::new(HashedColors),
            Self::Palette => Box::new(PaletteColors::default()),
            Self::Random => Box::new(RandomColors::new()),
        }
    }
}
