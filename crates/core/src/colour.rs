use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceWebError};

pub const DEFAULT_PALETTE: [&str; 5] = ["blue", "green", "yellow", "purple", "orange"];

const MIN_PALETTE_LEN: usize = 4;

/// Fixed, ordered set of colour names handed out to services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Palette(Vec<String>);

impl Palette {
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|e| e.into().trim().to_string())
            .collect::<Vec<_>>();
        if entries.len() < MIN_PALETTE_LEN {
            return Err(TraceWebError::Config(format!(
                "palette needs at least {MIN_PALETTE_LEN} colours, got {}",
                entries.len()
            )));
        }
        if entries.iter().any(|e| e.is_empty()) {
            return Err(TraceWebError::Config(
                "palette entries cannot be empty".to_string(),
            ));
        }
        Ok(Self(entries))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Self::new(raw.split(',').filter(|s| !s.trim().is_empty()))
    }

    /// Picks the palette entry for `name` by CRC32 (IEEE) checksum.
    pub fn colour(&self, name: &str) -> &str {
        let idx = crc32fast::hash(name.as_bytes()) as usize % self.0.len();
        &self.0[idx]
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self(DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect())
    }
}

impl TryFrom<Vec<String>> for Palette {
    type Error = TraceWebError;

    fn try_from(value: Vec<String>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Palette> for Vec<String> {
    fn from(value: Palette) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_is_stable() {
        let palette = Palette::default();
        for name in ["", "api", "go.micro.srv.greeter", "db"] {
            assert_eq!(palette.colour(name), palette.colour(name));
        }
    }

    #[test]
    fn colour_follows_crc32() {
        let palette = Palette::default();
        // crc32("") == 0, crc32("a") == 0xe8b7be43
        assert_eq!(palette.colour(""), "blue");
        assert_eq!(palette.colour("a"), DEFAULT_PALETTE[(0xe8b7be43u32 % 5) as usize]);
    }

    #[test]
    fn colour_always_from_palette() {
        let palette = Palette::parse("red, teal, pink, grey").unwrap();
        for name in ["x", "y", "service-with-a-long-name", "ünïcode"] {
            assert!(palette.entries().iter().any(|e| e == palette.colour(name)));
        }
    }

    #[test]
    fn rejects_small_or_blank_palettes() {
        assert!(Palette::parse("red,green").is_err());
        assert!(Palette::new(["red", "green", " ", "blue"]).is_err());
    }

    #[test]
    fn deserializes_from_list() {
        let p: Palette = serde_json::from_str(r#"["a","b","c","d"]"#).unwrap();
        assert_eq!(p.entries().len(), 4);
        assert!(serde_json::from_str::<Palette>(r#"["a"]"#).is_err());
    }
}
