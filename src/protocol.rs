//! Route protocol as a typed enum.
//!
//! A context is bound to exactly one of the two schemes an embedded server
//! speaks. Parsing is case-insensitive; the canonical form is lowercase.

use std::fmt;
use std::str::FromStr;

use crate::error::InvalidArgument;

/// The protocol a route context answers on.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    /// Returns the lowercase canonical name (e.g. `"https"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http  => "http",
            Self::Https => "https",
        }
    }
}

/// Parses `"http"` or `"https"` in any letter case.
impl FromStr for Protocol {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("http") {
            Ok(Self::Http)
        } else if s.eq_ignore_ascii_case("https") {
            Ok(Self::Https)
        } else {
            Err(InvalidArgument::Protocol(s.to_owned()))
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_any_case() {
        assert_eq!("HTTP".parse::<Protocol>(), Ok(Protocol::Http));
        assert_eq!("hTtPs".parse::<Protocol>(), Ok(Protocol::Https));
        assert_eq!(Protocol::Https.to_string(), "https");
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(
            "ftp".parse::<Protocol>(),
            Err(InvalidArgument::Protocol("ftp".to_owned())),
        );
        assert!(" http".parse::<Protocol>().is_err());
        assert!("".parse::<Protocol>().is_err());
    }
}
