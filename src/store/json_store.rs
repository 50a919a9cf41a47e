/// Registry persistence
///
/// Reads and writes the alias document as pretty-printed JSON. Writes go to a
/// sibling temp file first and are renamed into place.

use crate::error::{Result, UrunError};
use crate::store::models::RegistryDocument;
use chrono::Local;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, error, warn};

/// Anything that can hold the registry document
pub trait RegistryStore {
    /// Read the persisted document
    ///
    /// # Returns
    /// * `Ok(RegistryDocument)` - Stored document, or an empty one if none exists yet
    /// * `Err(UrunError::CorruptRegistry)` - Document exists but could not be read or parsed
    fn load(&self) -> Result<RegistryDocument>;

    /// Overwrite the persisted document
    fn save(&mut self, document: &RegistryDocument) -> Result<()>;

    /// Move an unreadable document out of the way before it gets overwritten
    ///
    /// # Returns
    /// * `Ok(Some(path))` - Where the old document now lives
    /// * `Ok(None)` - There was nothing to move
    fn set_aside(&mut self) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}

/// Outcome of a forgiving load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub document: RegistryDocument,
    /// The stored document could not be read and `document` is empty
    pub degraded: bool,
}

/// Load through a store, degrading to an empty document if it is unreadable
///
/// The file on disk is left untouched so the user can still repair it by hand.
pub fn load_or_empty<S: RegistryStore + ?Sized>(store: &S) -> Loaded {
    match store.load() {
        Ok(document) => Loaded {
            document,
            degraded: false,
        },
        Err(e) => {
            warn!("{}", UrunError::CorruptRegistry(e.to_string()).user_message());
            error!("Registry load failed: {:?}", e);
            Loaded {
                document: RegistryDocument::default(),
                degraded: true,
            }
        }
    }
}

/// JSON file on the local filesystem
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by `path`
    ///
    /// The file itself is created on the first save.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the document file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".corrupt-{}", Local::now().format("%Y%m%d-%H%M%S")));
        self.path.with_file_name(name)
    }

    fn persistence_failure(&self, reason: impl ToString) -> UrunError {
        UrunError::PersistenceFailure {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl RegistryStore for JsonFileStore {
    fn load(&self) -> Result<RegistryDocument> {
        if !self.path.exists() {
            debug!(
                "No existing data file found at '{}'. Starting fresh.",
                self.path.display()
            );
            return Ok(RegistryDocument::default());
        }

        let raw = fs::read_to_string(&self.path)
            .map_err(|e| UrunError::CorruptRegistry(format!("{}: {}", self.path.display(), e)))?;
        let document: RegistryDocument = serde_json::from_str(&raw)
            .map_err(|e| UrunError::CorruptRegistry(format!("{}: {}", self.path.display(), e)))?;

        debug!(
            "Loaded {} entries from '{}'.",
            document.entries.len(),
            self.path.display()
        );
        Ok(document)
    }

    fn save(&mut self, document: &RegistryDocument) -> Result<()> {
        let dir = self.dir();
        fs::create_dir_all(dir).map_err(|e| self.persistence_failure(e))?;

        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut buffer = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        document
            .serialize(&mut serializer)
            .map_err(|e| self.persistence_failure(e))?;
        buffer.push(b'\n');

        // Dropping the temp file on an early return removes it
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| self.persistence_failure(e))?;
        temp.write_all(&buffer)
            .map_err(|e| self.persistence_failure(e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| self.persistence_failure(e))?;
        temp.persist(&self.path)
            .map_err(|e| self.persistence_failure(e.error))?;

        debug!("Registry saved to '{}'.", self.path.display());
        Ok(())
    }

    fn set_aside(&mut self) -> Result<Option<PathBuf>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let backup = self.backup_path();
        fs::rename(&self.path, &backup).map_err(|e| self.persistence_failure(e))?;
        warn!(
            "The unreadable registry file was kept as '{}'.",
            backup.display()
        );
        Ok(Some(backup))
    }
}

/// In-memory store for tests; counts saves and can be told to fail them
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub document: RegistryDocument,
    pub saves: usize,
    pub fail_saves: bool,
    pub fail_loads: bool,
    pub set_asides: usize,
}

#[cfg(test)]
impl RegistryStore for MemoryStore {
    fn load(&self) -> Result<RegistryDocument> {
        if self.fail_loads {
            return Err(UrunError::CorruptRegistry(":memory: is unreadable".to_string()));
        }
        Ok(self.document.clone())
    }

    fn save(&mut self, document: &RegistryDocument) -> Result<()> {
        if self.fail_saves {
            return Err(UrunError::PersistenceFailure {
                path: PathBuf::from(":memory:"),
                reason: "disk full".to_string(),
            });
        }
        self.document = document.clone();
        self.saves += 1;
        Ok(())
    }

    fn set_aside(&mut self) -> Result<Option<PathBuf>> {
        self.set_asides += 1;
        Ok(Some(PathBuf::from(":memory:.corrupt")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn sample_document() -> RegistryDocument {
        let mut doc = RegistryDocument::default();
        doc.entries
            .insert("game".to_string(), PathBuf::from("/games/game.exe"));
        doc.entries
            .insert("docs".to_string(), PathBuf::from("/home/me/docs"));
        doc
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp.path().join("launcher_data.json"));

        let doc = store.load().unwrap();
        assert!(doc.entries.is_empty());
        assert!(!doc.path_set_attempted);
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(temp.path().join("nested").join("launcher_data.json"));

        let doc = sample_document();
        store.save(&doc).unwrap();

        assert_eq!(store.load().unwrap(), doc);

        // Nothing but the document itself is left behind
        let names: Vec<_> = fs::read_dir(temp.path().join("nested"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("launcher_data.json")]);
    }

    #[test]
    fn test_save_is_idempotent_on_disk() {
        let temp = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(temp.path().join("launcher_data.json"));
        store.save(&sample_document()).unwrap();
        let first = fs::read_to_string(store.path()).unwrap();

        let reloaded = store.load().unwrap();
        store.save(&reloaded).unwrap();
        let second = fs::read_to_string(store.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_document_is_pretty_printed() {
        let temp = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(temp.path().join("launcher_data.json"));
        let mut doc = sample_document();
        doc.path_set_attempted = true;
        store.save(&doc).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\n    \"docs\": \"/home/me/docs\""));
        assert!(raw.contains("\"path_set_attempted\": true"));
    }

    #[test]
    fn test_corrupt_file_is_error_and_left_alone() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("launcher_data.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);

        assert!(matches!(store.load(), Err(UrunError::CorruptRegistry(_))));

        let loaded = load_or_empty(&store);
        assert!(loaded.degraded);
        assert!(loaded.document.entries.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_corrupt_load_logs_warning_and_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("launcher_data.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);

        let output = Arc::new(Mutex::new(Vec::new()));
        let sink = output.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || CaptureWriter(sink.clone()))
            .finish();

        let loaded = tracing::subscriber::with_default(subscriber, || load_or_empty(&store));
        assert!(loaded.degraded);

        let logged = String::from_utf8(output.lock().unwrap().clone()).unwrap();
        let warn_line = logged
            .lines()
            .find(|line| line.contains("WARN"))
            .expect("no warning logged");
        assert!(warn_line.contains("corrupted"));
        let error_line = logged
            .lines()
            .find(|line| line.contains("ERROR"))
            .expect("no error logged");
        assert!(error_line.contains("Registry load failed"));
    }

    #[test]
    fn test_healthy_load_is_not_degraded() {
        let temp = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(temp.path().join("launcher_data.json"));
        store.save(&sample_document()).unwrap();

        let loaded = load_or_empty(&store);
        assert!(!loaded.degraded);
        assert_eq!(loaded.document, sample_document());
    }

    #[test]
    fn test_set_aside_keeps_file_bytes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("launcher_data.json");
        fs::write(&path, "{ \"game\": \"/games/game.exe\" ,}").unwrap();
        let mut store = JsonFileStore::new(&path);

        let backup = store.set_aside().unwrap().unwrap();
        assert!(!path.exists());
        assert_eq!(
            fs::read_to_string(&backup).unwrap(),
            "{ \"game\": \"/games/game.exe\" ,}"
        );
        assert!(backup
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("launcher_data.json.corrupt-"));

        // Nothing left to move
        assert_eq!(store.set_aside().unwrap(), None);
    }

    #[test]
    fn test_wrong_value_type_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("launcher_data.json");
        fs::write(&path, r#"{ "game": 42 }"#).unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(UrunError::CorruptRegistry(_))));
    }

    #[test]
    fn test_reads_legacy_layout() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("launcher_data.json");
        fs::write(
            &path,
            "{\n    \"nfs\": \"C:\\\\Games\\\\NFS\\\\nfs.exe\",\n    \"path_set_attempted\": true\n}",
        )
        .unwrap();

        let doc = JsonFileStore::new(&path).load().unwrap();
        assert!(doc.path_set_attempted);
        assert_eq!(
            doc.entries.get("nfs"),
            Some(&PathBuf::from("C:\\Games\\NFS\\nfs.exe"))
        );
    }
}
