//! Key resolvers: how a trace query picks one key at an ambiguous level.
//!
//! The aggregator never prompts. When a message was seen from several sources,
//! towards several destinations or on several channels, it hands the candidate
//! keys to a [`KeyResolver`] supplied by the caller. Closures with the
//! signature of [`KeyResolver::choose`] are resolvers too.

use std::fmt;

use crate::types::errors::ResolveError;

/// Partition level a key is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Destination,
    Source,
    Channel,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyKind::Destination => "DA",
            KeyKind::Source => "SA",
            KeyKind::Channel => "CAN",
        })
    }
}

pub trait KeyResolver {
    /// Picks one of `candidates` (ascending, at least two) for `message`.
    fn choose(&mut self, kind: KeyKind, message: &str, candidates: &[u8]) -> Result<u8, ResolveError>;
}

impl<F> KeyResolver for F
where
    F: FnMut(KeyKind, &str, &[u8]) -> Result<u8, ResolveError>,
{
    fn choose(&mut self, kind: KeyKind, message: &str, candidates: &[u8]) -> Result<u8, ResolveError> {
        self(kind, message, candidates)
    }
}

/// Always takes the lowest key.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstCandidate;

impl KeyResolver for FirstCandidate {
    fn choose(&mut self, _kind: KeyKind, _message: &str, candidates: &[u8]) -> Result<u8, ResolveError> {
        candidates.first().copied().ok_or(ResolveError::NoCandidates)
    }
}

/// Stored preference per level; fails when the preferred key is not a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferredKeys {
    pub destination: Option<u8>,
    pub source: Option<u8>,
    pub channel: Option<u8>,
}

impl PreferredKeys {
    fn preference(&self, kind: KeyKind) -> Option<u8> {
        match kind {
            KeyKind::Destination => self.destination,
            KeyKind::Source => self.source,
            KeyKind::Channel => self.channel,
        }
    }
}

impl KeyResolver for PreferredKeys {
    fn choose(&mut self, kind: KeyKind, _message: &str, candidates: &[u8]) -> Result<u8, ResolveError> {
        self.preference(kind)
            .filter(|key| candidates.contains(key))
            .ok_or_else(|| ResolveError::Undecided {
                kind: kind.to_string(),
            })
    }
}

/// Refuses every choice; queries only succeed where nothing is ambiguous.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl KeyResolver for NoResolver {
    fn choose(&mut self, kind: KeyKind, _message: &str, _candidates: &[u8]) -> Result<u8, ResolveError> {
        Err(ResolveError::Undecided {
            kind: kind.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_candidate() {
        assert_eq!(FirstCandidate.choose(KeyKind::Source, "EEC1", &[3, 11]), Ok(3));
        assert_eq!(
            FirstCandidate.choose(KeyKind::Source, "EEC1", &[]),
            Err(ResolveError::NoCandidates)
        );
    }

    #[test]
    fn test_preferred_keys() {
        let mut prefs = PreferredKeys {
            channel: Some(2),
            ..Default::default()
        };
        assert_eq!(prefs.choose(KeyKind::Channel, "EEC1", &[1, 2]), Ok(2));
        assert_eq!(
            prefs.choose(KeyKind::Channel, "EEC1", &[1, 3]),
            Err(ResolveError::Undecided { kind: "CAN".into() })
        );
        assert!(prefs.choose(KeyKind::Source, "EEC1", &[1, 3]).is_err());
    }

    #[test]
    fn test_closure_resolver() {
        let mut asked: Vec<KeyKind> = Vec::new();
        let mut last = |kind: KeyKind, _: &str, candidates: &[u8]| {
            asked.push(kind);
            candidates.last().copied().ok_or(ResolveError::NoCandidates)
        };
        assert_eq!(last.choose(KeyKind::Destination, "TSC1", &[0, 0xFF]), Ok(0xFF));
        assert_eq!(asked, vec![KeyKind::Destination]);
    }

    #[test]
    fn test_no_resolver() {
        assert_eq!(
            NoResolver.choose(KeyKind::Destination, "TSC1", &[0, 1]),
            Err(ResolveError::Undecided { kind: "DA".into() })
        );
    }
}
