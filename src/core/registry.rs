// The alias registry and its mutations
//
// Every mutation saves the whole document before it reports success. A failed
// save doesn't undo the in-memory change; it comes back as a warning instead.

use crate::core::validator::Validator;
use crate::error::{Result, UrunError};
use crate::store::{
    load_or_empty, Alias, Entry, EntryKind, JsonFileStore, Listing, RegistryDocument,
    RegistryStore,
};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Non-fatal diagnostics attached to a successful operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// File registered without a launchable-looking extension
    UnusualExtension(PathBuf),
    /// Change applied in memory but the save failed
    NotPersisted(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnusualExtension(path) => write!(
                f,
                "Warning: The file '{}' does not have a common executable extension (.exe, .bat, etc.). Ensure it's launchable.",
                path.display()
            ),
            Warning::NotPersisted(reason) => write!(
                f,
                "Warning: The change is active for this session but was not saved to disk. {}",
                reason
            ),
        }
    }
}

/// Operation result plus whatever warnings it produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Report<T> {
    /// False if the change only lives in memory
    pub fn is_persisted(&self) -> bool {
        !self
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::NotPersisted(_)))
    }
}

/// Whether `add` created a new alias or replaced an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Replaced { previous: PathBuf },
}

/// The alias → path mapping, owned together with the store it saves to
pub struct Registry<S: RegistryStore = JsonFileStore> {
    store: S,
    entries: BTreeMap<Alias, Entry>,
    path_setup_attempted: bool,
    // Set while the unreadable document is still on disk
    degraded: bool,
}

impl<S: RegistryStore> Registry<S> {
    /// Load the registry from `store`
    ///
    /// A corrupt or unreadable document degrades to an empty registry (logged
    /// loudly); it never fails. The unreadable document is moved aside by the
    /// first save, never overwritten.
    pub fn open(store: S) -> Self {
        let loaded = load_or_empty(&store);
        let mut registry = Self::from_document(store, loaded.document);
        registry.degraded = loaded.degraded;
        registry
    }

    fn from_document(store: S, document: RegistryDocument) -> Self {
        let mut entries = BTreeMap::new();

        for (raw, target) in document.entries {
            let alias = match Alias::parse(&raw) {
                Ok(alias) => alias,
                Err(_) => {
                    warn!("Skipping unusable alias {:?} in the registry file.", raw);
                    continue;
                }
            };
            let entry = Entry {
                alias: alias.clone(),
                kind: EntryKind::infer(&target),
                target,
            };
            if entries.insert(alias.clone(), entry).is_some() {
                warn!(
                    "Alias '{}' appears more than once in the registry file; keeping the last one.",
                    alias
                );
            }
        }

        Self {
            store,
            entries,
            path_setup_attempted: document.path_set_attempted,
            degraded: false,
        }
    }

    /// Snapshot of the current state in its on-disk shape
    pub fn to_document(&self) -> RegistryDocument {
        RegistryDocument {
            path_set_attempted: self.path_setup_attempted,
            entries: self
                .entries
                .iter()
                .map(|(alias, entry)| (alias.as_str().to_string(), entry.target.clone()))
                .collect(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in alias order
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn get(&self, alias: &Alias) -> Option<&Entry> {
        self.entries.get(alias)
    }

    /// Look up raw user input, failing with `AliasNotFound`
    pub fn lookup(&self, raw: &str) -> Result<&Entry> {
        Alias::parse(raw)
            .ok()
            .and_then(|alias| self.entries.get(&alias))
            .ok_or_else(|| UrunError::AliasNotFound(raw.to_string()))
    }

    /// Every entry with its File / Folder / MISSING status checked right now
    pub fn list(&self) -> Vec<Listing> {
        self.entries.values().map(Entry::listing).collect()
    }

    pub fn path_setup_attempted(&self) -> bool {
        self.path_setup_attempted
    }

    /// Register `path` under `alias`, replacing any previous target
    ///
    /// # Returns
    /// * `Ok(Report<AddOutcome>)` - Entry stored; tells whether it was new
    /// * `Err(UrunError)` - Invalid or reserved alias, or a validation failure
    pub fn add(&mut self, alias: &str, path: &Path, kind: EntryKind) -> Result<Report<AddOutcome>> {
        let alias = Alias::parse(alias)?;
        if alias.is_reserved() {
            return Err(UrunError::ReservedAlias(alias.to_string()));
        }

        let validated = Validator::validate(path, kind)?;
        let mut warnings = validated.warnings;
        for warning in &warnings {
            warn!("{}", warning);
        }

        let entry = Entry {
            alias: alias.clone(),
            target: path.to_path_buf(),
            kind: validated.kind,
        };

        let outcome = match self.entries.insert(alias.clone(), entry) {
            Some(previous) => {
                info!(
                    "Alias '{}' already exists. Updating path from '{}' to '{}'.",
                    alias,
                    previous.target.display(),
                    path.display()
                );
                AddOutcome::Replaced {
                    previous: previous.target,
                }
            }
            None => {
                info!("Adding new alias '{}' with path '{}'.", alias, path.display());
                AddOutcome::Added
            }
        };

        self.persist(&mut warnings);
        info!("'{}' added/updated successfully as a {}.", alias, validated.kind);

        Ok(Report {
            value: outcome,
            warnings,
        })
    }

    /// Point an existing alias at a new path; the kind is re-inferred
    ///
    /// # Returns
    /// * `Ok(Report<PathBuf>)` - The path the alias used to point at
    /// * `Err(UrunError)` - `AliasNotFound` (nothing is saved) or a validation failure
    pub fn update(&mut self, alias: &str, new_path: &Path) -> Result<Report<PathBuf>> {
        let key = self.lookup(alias)?.alias.clone();

        let validated = Validator::validate_inferred(new_path)?;
        let mut warnings = validated.warnings;
        for warning in &warnings {
            warn!("{}", warning);
        }

        let entry = Entry {
            alias: key.clone(),
            target: new_path.to_path_buf(),
            kind: validated.kind,
        };
        let previous = self
            .entries
            .insert(key.clone(), entry)
            .map(|old| old.target)
            .unwrap_or_default();

        self.persist(&mut warnings);
        info!(
            "Path for '{}' updated from '{}' to '{}' (type: {}).",
            key,
            previous.display(),
            new_path.display(),
            validated.kind
        );

        Ok(Report {
            value: previous,
            warnings,
        })
    }

    /// Move an entry to a new alias in a single save
    ///
    /// # Returns
    /// * `Ok(Report<Alias>)` - The normalized new alias
    /// * `Err(UrunError)` - `AliasNotFound` for `old`, `AliasAlreadyExists` for a
    ///   taken (or reserved) `new`; the registry is untouched on error
    pub fn rename(&mut self, old: &str, new: &str) -> Result<Report<Alias>> {
        let old_key = self.lookup(old)?.alias.clone();
        let new_key = Alias::parse(new)?;

        if new_key.is_reserved() || self.entries.contains_key(&new_key) {
            return Err(UrunError::AliasAlreadyExists(new.to_string()));
        }

        if let Some(mut entry) = self.entries.remove(&old_key) {
            entry.alias = new_key.clone();
            self.entries.insert(new_key.clone(), entry);
        }

        let mut warnings = Vec::new();
        self.persist(&mut warnings);
        info!("Alias '{}' successfully renamed to '{}'.", old_key, new_key);

        Ok(Report {
            value: new_key,
            warnings,
        })
    }

    /// Remove an entry
    ///
    /// Unconditional: asking the user first is the caller's job.
    pub fn delete(&mut self, alias: &str) -> Result<Report<Entry>> {
        let key = self.lookup(alias)?.alias.clone();
        let removed = self
            .entries
            .remove(&key)
            .ok_or_else(|| UrunError::AliasNotFound(alias.to_string()))?;

        let mut warnings = Vec::new();
        self.persist(&mut warnings);
        info!("'{}' has been successfully removed.", key);

        Ok(Report {
            value: removed,
            warnings,
        })
    }

    /// Remember that PATH setup was offered, whatever the answer was
    pub fn mark_path_setup_attempted(&mut self) -> Report<()> {
        self.path_setup_attempted = true;
        let mut warnings = Vec::new();
        self.persist(&mut warnings);
        Report {
            value: (),
            warnings,
        }
    }

    /// True until the unreadable document from `open` has been moved aside
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    fn persist(&mut self, warnings: &mut Vec<Warning>) {
        if self.degraded {
            match self.store.set_aside() {
                Ok(_) => self.degraded = false,
                Err(e) => {
                    let warning = Warning::NotPersisted(e.user_message());
                    warn!("{}", warning);
                    warnings.push(warning);
                    return;
                }
            }
        }

        let document = self.to_document();
        if let Err(e) = self.store.save(&document) {
            let warning = Warning::NotPersisted(e.user_message());
            warn!("{}", warning);
            warnings.push(warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        registry: Registry<MemoryStore>,
    }

    impl Fixture {
        fn path(&self, name: &str) -> PathBuf {
            self.temp.path().join(name)
        }
    }

    fn setup() -> Fixture {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("game1.exe"), b"MZ").unwrap();
        fs::write(temp.path().join("game2.exe"), b"MZ").unwrap();
        fs::write(temp.path().join("notes.txt"), b"todo").unwrap();
        fs::create_dir(temp.path().join("photos")).unwrap();

        Fixture {
            temp,
            registry: Registry::open(MemoryStore::default()),
        }
    }

    #[test]
    fn test_add_new_and_replace() {
        let mut fx = setup();
        let game1 = fx.path("game1.exe");
        let game2 = fx.path("game2.exe");

        let report = fx.registry.add("Game", &game1, EntryKind::File).unwrap();
        assert_eq!(report.value, AddOutcome::Added);
        assert!(report.warnings.is_empty());

        let report = fx.registry.add("GAME", &game2, EntryKind::File).unwrap();
        assert_eq!(report.value, AddOutcome::Replaced { previous: game1 });

        assert_eq!(fx.registry.len(), 1);
        assert_eq!(fx.registry.lookup("game").unwrap().target, game2);
        assert_eq!(fx.registry.store().saves, 2);
    }

    #[test]
    fn test_add_folder() {
        let mut fx = setup();
        let photos = fx.path("photos");

        fx.registry.add("pics", &photos, EntryKind::Folder).unwrap();
        assert_eq!(fx.registry.lookup("pics").unwrap().kind, EntryKind::Folder);
    }

    #[test]
    fn test_add_carries_extension_warning() {
        let mut fx = setup();
        let notes = fx.path("notes.txt");

        let report = fx.registry.add("notes", &notes, EntryKind::File).unwrap();
        assert_eq!(report.warnings, vec![Warning::UnusualExtension(notes)]);
        assert!(report.is_persisted());
    }

    #[test]
    fn test_add_missing_path_leaves_registry_unchanged() {
        let mut fx = setup();
        let missing = fx.path("missing.exe");

        let result = fx.registry.add("ghost", &missing, EntryKind::File);
        assert!(matches!(result, Err(UrunError::PathNotFound(_))));
        assert!(fx.registry.is_empty());
        assert_eq!(fx.registry.store().saves, 0);
    }

    #[test]
    fn test_add_rejects_reserved_alias() {
        let mut fx = setup();
        let game1 = fx.path("game1.exe");

        let result = fx.registry.add("path_set_attempted", &game1, EntryKind::File);
        assert!(matches!(result, Err(UrunError::ReservedAlias(_))));
        assert!(fx.registry.is_empty());
    }

    #[test]
    fn test_update_unknown_alias_does_not_save() {
        let mut fx = setup();
        let game1 = fx.path("game1.exe");

        let result = fx.registry.update("nope", &game1);
        assert!(matches!(result, Err(UrunError::AliasNotFound(_))));
        assert_eq!(fx.registry.store().saves, 0);
    }

    #[test]
    fn test_update_reinfers_kind() {
        let mut fx = setup();
        let game1 = fx.path("game1.exe");
        let photos = fx.path("photos");
        fx.registry.add("stuff", &game1, EntryKind::File).unwrap();

        let report = fx.registry.update("STUFF", &photos).unwrap();
        assert_eq!(report.value, game1);

        let entry = fx.registry.lookup("stuff").unwrap();
        assert_eq!(entry.target, photos);
        assert_eq!(entry.kind, EntryKind::Folder);
    }

    #[test]
    fn test_update_to_missing_path_keeps_old_target() {
        let mut fx = setup();
        let game1 = fx.path("game1.exe");
        let gone = fx.path("gone.exe");
        fx.registry.add("game", &game1, EntryKind::File).unwrap();

        let result = fx.registry.update("game", &gone);
        assert!(matches!(result, Err(UrunError::PathNotFound(_))));
        assert_eq!(fx.registry.lookup("game").unwrap().target, game1);
    }

    #[test]
    fn test_rename_moves_entry() {
        let mut fx = setup();
        let game1 = fx.path("game1.exe");
        fx.registry.add("nfs", &game1, EntryKind::File).unwrap();

        let report = fx.registry.rename("NFS", "NFS_Shift").unwrap();
        assert_eq!(report.value.as_str(), "nfs_shift");

        assert!(fx.registry.lookup("nfs").is_err());
        let entry = fx.registry.lookup("nfs_shift").unwrap();
        assert_eq!(entry.target, game1);
        assert_eq!(entry.alias.as_str(), "nfs_shift");
        assert_eq!(fx.registry.store().saves, 2);
    }

    #[test]
    fn test_rename_onto_existing_alias_fails() {
        let mut fx = setup();
        let game1 = fx.path("game1.exe");
        let game2 = fx.path("game2.exe");
        fx.registry.add("a", &game1, EntryKind::File).unwrap();
        fx.registry.add("b", &game2, EntryKind::File).unwrap();
        let before = fx.registry.to_document();

        let result = fx.registry.rename("a", "B");
        assert!(matches!(result, Err(UrunError::AliasAlreadyExists(_))));
        assert_eq!(fx.registry.to_document(), before);
        assert_eq!(fx.registry.store().saves, 2);
    }

    #[test]
    fn test_rename_onto_reserved_key_fails() {
        let mut fx = setup();
        let game1 = fx.path("game1.exe");
        fx.registry.add("a", &game1, EntryKind::File).unwrap();

        let result = fx.registry.rename("a", "path_set_attempted");
        assert!(matches!(result, Err(UrunError::AliasAlreadyExists(_))));
    }

    #[test]
    fn test_rename_unknown_alias() {
        let mut fx = setup();
        let result = fx.registry.rename("ghost", "spirit");
        assert!(matches!(result, Err(UrunError::AliasNotFound(_))));
    }

    #[test]
    fn test_delete() {
        let mut fx = setup();
        let game1 = fx.path("game1.exe");
        fx.registry.add("game", &game1, EntryKind::File).unwrap();

        let report = fx.registry.delete("Game").unwrap();
        assert_eq!(report.value.target, game1);
        assert!(fx.registry.is_empty());

        let again = fx.registry.delete("game");
        assert!(matches!(again, Err(UrunError::AliasNotFound(_))));
    }

    #[test]
    fn test_failed_save_keeps_change_in_memory() {
        let temp = TempDir::new().unwrap();
        let game = temp.path().join("game.exe");
        fs::write(&game, b"MZ").unwrap();

        let store = MemoryStore {
            fail_saves: true,
            ..Default::default()
        };
        let mut registry = Registry::open(store);

        let report = registry.add("game", &game, EntryKind::File).unwrap();
        assert!(!report.is_persisted());
        assert!(matches!(report.warnings[0], Warning::NotPersisted(_)));
        assert_eq!(registry.lookup("game").unwrap().target, game);
    }

    #[test]
    fn test_list_reports_live_status() {
        let mut fx = setup();
        let notes = fx.path("notes.txt");
        let photos = fx.path("photos");
        fx.registry.add("notes", &notes, EntryKind::File).unwrap();
        fx.registry.add("pics", &photos, EntryKind::Folder).unwrap();
        fs::remove_file(&notes).unwrap();

        let listing = fx.registry.list();
        let statuses: Vec<_> = listing
            .iter()
            .map(|l| (l.alias.as_str(), l.status.to_string()))
            .collect();
        assert_eq!(
            statuses,
            vec![("notes", "MISSING".to_string()), ("pics", "Folder".to_string())]
        );
    }

    #[test]
    fn test_setup_flag_is_not_an_entry() {
        let mut fx = setup();
        let report = fx.registry.mark_path_setup_attempted();
        assert!(report.is_persisted());

        assert!(fx.registry.path_setup_attempted());
        assert!(fx.registry.is_empty());
        assert!(fx.registry.store().document.path_set_attempted);
    }

    #[test]
    fn test_open_normalizes_hand_edited_keys() {
        let mut document = RegistryDocument::default();
        document
            .entries
            .insert("MyDocs".to_string(), PathBuf::from("/nowhere/docs"));
        document
            .entries
            .insert("bad key".to_string(), PathBuf::from("/nowhere/bad"));
        let registry = Registry::open(MemoryStore {
            document,
            ..Default::default()
        });

        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("mydocs").is_ok());
    }

    #[test]
    fn test_file_store_round_trip() {
        let fx = setup();
        let data = fx.path("launcher_data.json");
        let game1 = fx.path("game1.exe");
        let photos = fx.path("photos");

        let mut registry = Registry::open(JsonFileStore::new(&data));
        registry.add("game", &game1, EntryKind::File).unwrap();
        registry.add("pics", &photos, EntryKind::Folder).unwrap();
        registry.mark_path_setup_attempted();
        let saved = registry.to_document();

        let reopened = Registry::open(JsonFileStore::new(&data));
        assert_eq!(reopened.to_document(), saved);
        assert!(reopened.path_setup_attempted());
        assert_eq!(reopened.lookup("pics").unwrap().kind, EntryKind::Folder);
    }

    #[test]
    fn test_corrupt_file_opens_empty() {
        let fx = setup();
        let data = fx.path("launcher_data.json");
        fs::write(&data, "][").unwrap();

        let registry = Registry::open(JsonFileStore::new(&data));
        assert!(registry.is_empty());
        assert!(!registry.path_setup_attempted());
        assert!(registry.is_degraded());
    }

    #[test]
    fn test_corrupt_file_survives_first_save() {
        let fx = setup();
        let data = fx.path("launcher_data.json");
        let corrupt = r#"{ "game": "/games/game.exe", "notes": "/x" ,}"#;
        fs::write(&data, corrupt).unwrap();

        let mut registry = Registry::open(JsonFileStore::new(&data));
        let report = registry.mark_path_setup_attempted();
        assert!(report.is_persisted());
        assert!(!registry.is_degraded());

        let backups: Vec<_> = fs::read_dir(fx.temp.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .unwrap()
                    .to_string_lossy()
                    .starts_with("launcher_data.json.corrupt-")
            })
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), corrupt);

        let reopened = Registry::open(JsonFileStore::new(&data));
        assert!(reopened.path_setup_attempted());
        assert!(!reopened.is_degraded());
    }

    #[test]
    fn test_degraded_store_is_set_aside_once() {
        let fx = setup();
        let game1 = fx.path("game1.exe");
        let mut registry = Registry::open(MemoryStore {
            fail_loads: true,
            ..Default::default()
        });
        assert!(registry.is_degraded());

        registry.add("game", &game1, EntryKind::File).unwrap();
        registry.mark_path_setup_attempted();

        assert_eq!(registry.store().set_asides, 1);
        assert_eq!(registry.store().saves, 2);
    }

    #[test]
    fn test_healthy_store_is_never_set_aside() {
        let mut fx = setup();
        fx.registry.mark_path_setup_attempted();
        assert_eq!(fx.registry.store().set_asides, 0);
    }
}
