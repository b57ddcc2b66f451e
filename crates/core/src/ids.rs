use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceWebError};

/// Opaque trace identifier as used in `/trace/{id}` links. Only visible ASCII
/// outside of URL delimiters is accepted, so an id can be placed in a path
/// segment or `Location` header as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(String);

impl TraceId {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TraceWebError::InvalidArgument(
                "trace id cannot be empty".to_string(),
            ));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_graphic() && !matches!(c, '/' | '?' | '#' | '%'))
        {
            return Err(TraceWebError::InvalidArgument(format!(
                "invalid trace id: {input}"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ids() {
        let id = TraceId::parse(" 5a9f3c1e-0b7d-11e6-9a4d-6c4008a6b4e2 ").unwrap();
        assert_eq!(id.as_str(), "5a9f3c1e-0b7d-11e6-9a4d-6c4008a6b4e2");
        assert_eq!(TraceId::parse("abc").unwrap().to_string(), "abc");
    }

    #[test]
    fn rejects_bad_ids() {
        assert!(TraceId::parse("").is_err());
        assert!(TraceId::parse("   ").is_err());
        assert!(TraceId::parse("a/b").is_err());
        assert!(TraceId::parse("a b").is_err());
        assert!(TraceId::parse("abc?x=1").is_err());
        assert!(TraceId::parse("abc#frag").is_err());
        assert!(TraceId::parse("ab%2F").is_err());
        assert!(TraceId::parse("caf\u{e9}").is_err());
        assert!(matches!(
            TraceId::parse(""),
            Err(TraceWebError::InvalidArgument(_))
        ));
    }
}
