/// Alias resolver with substring search
///
/// Turns whatever the user typed into zero, one or many registry entries.
/// An exact alias wins outright; otherwise every alias containing the query
/// is a candidate.

use crate::core::registry::Registry;
use crate::store::{Alias, Entry, Listing, RegistryStore};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// How many "did you mean" hints a miss carries
const MAX_SUGGESTIONS: usize = 3;

/// Outcome of resolving a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one entry matched
    Unique(Entry),
    /// Several aliases contain the query; sorted by alias
    Ambiguous(Vec<Listing>),
    /// Nothing matched; `suggestions` are fuzzy near-misses for display only
    NotFound { suggestions: Vec<Alias> },
}

/// Resolves queries against a registry
pub struct Resolver {
    matcher: SkimMatcherV2,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Create a new resolver instance
    pub fn new() -> Self {
        Self {
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Resolve a query
    ///
    /// # Arguments
    /// * `registry` - Registry to search
    /// * `query` - Raw user input; compared case-insensitively
    pub fn resolve<S: RegistryStore>(&self, registry: &Registry<S>, query: &str) -> Resolution {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Resolution::NotFound {
                suggestions: Vec::new(),
            };
        }

        if let Some(entry) = Alias::parse(&needle).ok().and_then(|a| registry.get(&a)) {
            return Resolution::Unique(entry.clone());
        }

        // Registry iterates in alias order, so matches come out sorted
        let mut matches: Vec<&Entry> = registry
            .entries()
            .filter(|entry| entry.alias.as_str().contains(&needle))
            .collect();

        match matches.len() {
            0 => Resolution::NotFound {
                suggestions: self.suggest(registry, &needle),
            },
            1 => Resolution::Unique(matches.remove(0).clone()),
            _ => Resolution::Ambiguous(matches.into_iter().map(Entry::listing).collect()),
        }
    }

    /// Fuzzy near-misses for a query that matched nothing
    fn suggest<S: RegistryStore>(&self, registry: &Registry<S>, needle: &str) -> Vec<Alias> {
        let mut scored: Vec<(i64, &Alias)> = registry
            .entries()
            .filter_map(|entry| {
                self.matcher
                    .fuzzy_match(entry.alias.as_str(), needle)
                    .map(|score| (score, &entry.alias))
            })
            .collect();

        // Highest score first, alias order breaks ties
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));

        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, alias)| alias.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{EntryKind, MemoryStore};
    use std::fs;
    use tempfile::TempDir;

    fn setup(aliases: &[&str]) -> (Registry<MemoryStore>, TempDir) {
        let temp = TempDir::new().unwrap();
        let mut registry = Registry::open(MemoryStore::default());

        for alias in aliases {
            let path = temp.path().join(format!("{}.exe", alias));
            fs::write(&path, b"MZ").unwrap();
            registry.add(alias, &path, EntryKind::File).unwrap();
        }

        (registry, temp)
    }

    fn aliases(listing: &[Listing]) -> Vec<&str> {
        listing.iter().map(|l| l.alias.as_str()).collect()
    }

    #[test]
    fn test_cardinality() {
        let (registry, _temp) = setup(&["game1", "game2", "notes"]);
        let resolver = Resolver::new();

        match resolver.resolve(&registry, "game") {
            Resolution::Ambiguous(listing) => assert_eq!(aliases(&listing), vec!["game1", "game2"]),
            other => panic!("Expected Ambiguous, got {:?}", other),
        }

        match resolver.resolve(&registry, "notes") {
            Resolution::Unique(entry) => assert_eq!(entry.alias.as_str(), "notes"),
            other => panic!("Expected Unique, got {:?}", other),
        }

        assert!(matches!(
            resolver.resolve(&registry, "zzz"),
            Resolution::NotFound { .. }
        ));
    }

    #[test]
    fn test_case_insensitive_with_stored_path() {
        let (registry, temp) = setup(&["mygame"]);
        let resolver = Resolver::new();

        match resolver.resolve(&registry, "  MyGame ") {
            Resolution::Unique(entry) => {
                assert_eq!(entry.target, temp.path().join("mygame.exe"));
            }
            other => panic!("Expected Unique, got {:?}", other),
        }
    }

    #[test]
    fn test_exact_match_beats_substring_matches() {
        let (registry, _temp) = setup(&["game", "game2", "endgame"]);
        let resolver = Resolver::new();

        match resolver.resolve(&registry, "GAME") {
            Resolution::Unique(entry) => assert_eq!(entry.alias.as_str(), "game"),
            other => panic!("Expected Unique, got {:?}", other),
        }
    }

    #[test]
    fn test_renamed_alias_resolves_only_under_new_name() {
        let (mut registry, temp) = setup(&["nfs", "notes"]);
        let resolver = Resolver::new();

        registry.rename("NFS", "speed").unwrap();

        assert!(matches!(
            resolver.resolve(&registry, "nfs"),
            Resolution::NotFound { .. }
        ));
        match resolver.resolve(&registry, "speed") {
            Resolution::Unique(entry) => {
                assert_eq!(entry.alias.as_str(), "speed");
                assert_eq!(entry.target, temp.path().join("nfs.exe"));
            }
            other => panic!("Expected Unique, got {:?}", other),
        }
    }

    #[test]
    fn test_deleted_alias_is_not_found() {
        let (mut registry, _temp) = setup(&["game", "notes"]);
        let resolver = Resolver::new();

        registry.delete("game").unwrap();

        assert!(matches!(
            resolver.resolve(&registry, "game"),
            Resolution::NotFound { .. }
        ));
        assert!(matches!(
            resolver.resolve(&registry, "notes"),
            Resolution::Unique(_)
        ));
    }

    #[test]
    fn test_single_substring_match_is_unique() {
        let (registry, _temp) = setup(&["photoshop", "notes"]);
        let resolver = Resolver::new();

        match resolver.resolve(&registry, "shop") {
            Resolution::Unique(entry) => assert_eq!(entry.alias.as_str(), "photoshop"),
            other => panic!("Expected Unique, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_query() {
        let (registry, _temp) = setup(&["notes"]);
        assert_eq!(
            Resolver::new().resolve(&registry, "   "),
            Resolution::NotFound {
                suggestions: Vec::new()
            }
        );
    }

    #[test]
    fn test_setup_flag_never_matches() {
        let (mut registry, _temp) = setup(&["notes"]);
        registry.mark_path_setup_attempted();
        let resolver = Resolver::new();

        assert!(matches!(
            resolver.resolve(&registry, "path_set_attempted"),
            Resolution::NotFound { .. }
        ));
        assert!(matches!(
            resolver.resolve(&registry, "attempted"),
            Resolution::NotFound { .. }
        ));
    }

    #[test]
    fn test_fuzzy_suggestions_on_typo() {
        let (registry, _temp) = setup(&["npm", "cargo", "notes"]);

        match Resolver::new().resolve(&registry, "ntes") {
            Resolution::NotFound { suggestions } => {
                assert_eq!(suggestions[0].as_str(), "notes");
                assert!(suggestions.len() <= MAX_SUGGESTIONS);
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_ambiguous_listing_marks_missing() {
        let (registry, temp) = setup(&["game1", "game2"]);
        fs::remove_file(temp.path().join("game2.exe")).unwrap();

        match Resolver::new().resolve(&registry, "game") {
            Resolution::Ambiguous(listing) => {
                assert_eq!(listing[1].target, temp.path().join("game2.exe"));
                assert_eq!(listing[1].status.to_string(), "MISSING");
            }
            other => panic!("Expected Ambiguous, got {:?}", other),
        }
    }
}
