//! Where the index and documents live: a remote URL or a local path.

use std::fmt;
use std::path::PathBuf;

use url::Url;

/// A resource location given on the command line or in settings.
///
/// Anything that parses as an `http`/`https` URL is remote; everything else
/// is treated as a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Remote(Url),
    Local(PathBuf),
}

impl Location {
    pub fn parse(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Location::Remote(url),
            _ => Location::Local(PathBuf::from(raw)),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Remote(url) => write!(f, "{}", url),
            Location::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote() {
        let loc = Location::parse("https://example.com/skills_index.json");
        assert!(matches!(loc, Location::Remote(url) if url.host_str() == Some("example.com")));
    }

    #[test]
    fn test_parse_local() {
        assert_eq!(
            Location::parse("./skills_index.json"),
            Location::Local(PathBuf::from("./skills_index.json"))
        );
        // Drive letters parse as a URL scheme.
        assert!(matches!(Location::parse("C:/skills"), Location::Local(_)));
    }
}
