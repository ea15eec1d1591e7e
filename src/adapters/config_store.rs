use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::domain::config::{CONFIG_DIR_ENV, CONFIG_FILE_NAME, DEFAULT_CONFIG};
use crate::domain::{Document, DomainError, Node};
use crate::ports::ConfigStore;

/// YAML-backed configuration store.
///
/// The document is read on first access and kept for the lifetime of the
/// store; a failed load is cached too, so every caller sees the same error.
pub struct YamlConfigStore {
    path: PathBuf,
    document: OnceCell<Result<RwLock<Document>, DomainError>>,
}

impl YamlConfigStore {
    /// Create a store at the default location.
    /// `$JH_CONFIG_DIR` wins over the OS-specific config directory.
    pub fn new() -> Result<Self, DomainError> {
        let path = Self::resolve_path(std::env::var_os(CONFIG_DIR_ENV))?;
        info!(path = ?path, "ConfigStore initialized");
        Ok(Self::at(path))
    }

    /// Create a store for an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: OnceCell::new(),
        }
    }

    /// Resolve the configuration file location.
    /// - override set and non-empty: `$JH_CONFIG_DIR/config.yml`
    /// - macOS: ~/Library/Application Support/jh/config.yml
    /// - Windows: %APPDATA%\jh\config.yml
    /// - Linux: ~/.config/jh/config.yml
    fn resolve_path(override_dir: Option<OsString>) -> Result<PathBuf, DomainError> {
        if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir).join(CONFIG_FILE_NAME));
        }

        dirs::config_dir()
            .map(|p| p.join("jh").join(CONFIG_FILE_NAME))
            .ok_or_else(|| DomainError::Config("Could not find user config directory".to_string()))
    }

    fn read_document(path: &Path) -> Result<Document, DomainError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = ?path, "Loading configuration");
                let document = Document::parse(&content)?;
                info!(path = ?path, "Configuration loaded");
                Ok(document)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = ?path, "Configuration file not found, using defaults");
                Document::parse(DEFAULT_CONFIG)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn document(&self) -> Result<&RwLock<Document>, DomainError> {
        self.document
            .get_or_init(|| Self::read_document(&self.path).map(RwLock::new))
            .as_ref()
            .map_err(Clone::clone)
    }

    fn write_atomically(path: &Path, content: &str) -> Result<(), DomainError> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut file = NamedTempFile::new_in(parent)?;
        file.write_all(content.as_bytes())?;
        file.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(file.path(), fs::Permissions::from_mode(0o600))?;
        }

        file.persist(path).map_err(|e| DomainError::from(e.error))?;
        Ok(())
    }
}

fn scalar_value(node: &Node, key: &str) -> Result<String, DomainError> {
    node.as_str()
        .map(str::to_string)
        .ok_or_else(|| DomainError::InvalidFormat(format!("'{key}' is a section, not a value")))
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<(), DomainError> {
        self.document().map(|_| ())
    }

    fn get(&self, key: &str) -> Result<String, DomainError> {
        let document = self.document()?.read();
        scalar_value(document.get(key)?, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        self.document()?.write().set(key, Node::scalar(value));
        Ok(())
    }

    fn get_nested(&self, path: &[&str]) -> Result<String, DomainError> {
        let document = self.document()?.read();
        scalar_value(document.get_nested(path)?, &path.join("."))
    }

    fn set_nested(&self, path: &[&str], value: &str) -> Result<(), DomainError> {
        self.document()?
            .write()
            .set_nested(path, Node::scalar(value))
    }

    fn write(&self) -> Result<(), DomainError> {
        let content = self.document()?.read().serialize();
        Self::write_atomically(&self.path, &content)?;

        info!(path = ?self.path, "Configuration saved");
        Ok(())
    }

    fn config_path(&self) -> PathBuf {
        self.path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{PROJECT_KEY_PATH, TOKEN_KEY};
    use crate::domain::IssueDefaults;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> YamlConfigStore {
        YamlConfigStore::at(dir.path().join(CONFIG_FILE_NAME))
    }

    #[test]
    fn test_resolve_path_prefers_override() {
        let path = YamlConfigStore::resolve_path(Some(OsString::from("/tmp/jh-test"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/jh-test").join("config.yml"));
    }

    #[test]
    fn test_resolve_path_ignores_empty_override() {
        if let Ok(path) = YamlConfigStore::resolve_path(Some(OsString::new())) {
            assert!(path.ends_with("jh/config.yml"));
        }
    }

    #[test]
    fn test_missing_file_uses_default_template() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.get("url").unwrap(), "");
        assert_eq!(store.auth_token().unwrap(), "");
        // Nothing is written until asked to.
        assert!(!store.config_path().exists());
    }

    #[test]
    fn test_auth_token_missing_key_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.config_path(), "username: \"\"\n").unwrap();

        assert_eq!(
            store.auth_token(),
            Err(DomainError::NotFound(TOKEN_KEY.to_string()))
        );
    }

    #[test]
    fn test_load_error_is_cached() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.config_path(), "- not\n- a mapping\n").unwrap();

        let first = store.load().unwrap_err();
        // Fixing the file does not matter any more: the outcome is memoized.
        fs::write(store.config_path(), "token: abc\n").unwrap();
        assert_eq!(store.get("token").unwrap_err(), first);
        assert!(matches!(first, DomainError::InvalidFormat(_)));
    }

    #[test]
    fn test_document_is_loaded_once() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.config_path(), "token: first\n").unwrap();

        assert_eq!(store.auth_token().unwrap(), "first");
        fs::write(store.config_path(), "token: second\n").unwrap();
        assert_eq!(store.auth_token().unwrap(), "first");
    }

    #[test]
    fn test_write_creates_parent_dirs_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("dir").join(CONFIG_FILE_NAME);
        let store = YamlConfigStore::at(&path);

        store.set("url", "url").unwrap();
        store.set("username", "username").unwrap();
        store.set("token", "token").unwrap();
        store
            .set_issue_defaults(&IssueDefaults {
                project_key: "PROJ".to_string(),
                issue_type_name: "Task".to_string(),
            })
            .unwrap();
        store.write().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "url: url\nusername: username\ntoken: token\nconfiguration:\n    issue:\n        projectKey: PROJ\n        issueTypeName: Task\n"
        );

        let reloaded = YamlConfigStore::at(&path);
        assert_eq!(reloaded.get_nested(&PROJECT_KEY_PATH).unwrap(), "PROJ");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set("token", "secret").unwrap();
        store.write().unwrap();

        let mode = fs::metadata(store.config_path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_get_section_is_invalid_format() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set_nested(&PROJECT_KEY_PATH, "PROJ").unwrap();

        assert!(matches!(
            store.get("configuration"),
            Err(DomainError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_concurrent_reads_and_writes() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store_in(&dir));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let key = format!("key{i}");
                    store.set(&key, &i.to_string()).unwrap();
                    store.get(&key).unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), i.to_string());
        }
        assert_eq!(store.get("url").unwrap(), "");
    }
}
