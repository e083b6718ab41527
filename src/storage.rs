use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    SerdeJson(serde_json::Error),
    InvalidImport { reason: String },
}

impl StoreError {
    pub fn invalid_import(reason: impl Into<String>) -> Self {
        Self::InvalidImport {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::SerdeJson(e) => write!(f, "json error: {e}"),
            Self::InvalidImport { reason } => write!(f, "invalid backup document: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::SerdeJson(e) => Some(e),
            Self::InvalidImport { .. } => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::SerdeJson(value)
    }
}

/// The five namespaced keys the site persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StorageKey {
    Properties,
    Settings,
    Testimonials,
    Blog,
    Messages,
}

impl StorageKey {
    pub const ALL: [StorageKey; 5] = [
        Self::Properties,
        Self::Settings,
        Self::Testimonials,
        Self::Blog,
        Self::Messages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Properties => "properties",
            Self::Settings => "settings",
            Self::Testimonials => "testimonials",
            Self::Blog => "blog",
            Self::Messages => "messages",
        }
    }
}

/// Raw string storage, one serialized JSON value per key.
pub trait KeyValueBackend: Send {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: StorageKey, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: StorageKey) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    values: BTreeMap<StorageKey, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(&key).cloned())
    }

    fn set(&mut self, key: StorageKey, value: &str) -> Result<(), StoreError> {
        self.values.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: StorageKey) -> Result<(), StoreError> {
        self.values.remove(&key);
        Ok(())
    }
}

/// Stores each key as `<data_dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    data_dir: PathBuf,
}

impl FileBackend {
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn path_for(&self, key: StorageKey) -> PathBuf {
        self.data_dir.join(format!("{}.json", key.as_str()))
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => Ok(None),
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: StorageKey, value: &str) -> Result<(), StoreError> {
        write_atomic(&self.path_for(key), value.as_bytes())?;
        Ok(())
    }

    fn remove(&mut self, key: StorageKey) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), io::Error> {
    let dir = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path has no parent directory")
    })?;
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let tmp_path = dir.join(format!("{}.tmp", file_name.to_string_lossy()));
    {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.write_all(b"\n")?;
        let _ = file.sync_all();
    }

    #[cfg(windows)]
    {
        if path.exists() {
            let _ = fs::remove_file(path);
        }
    }

    fs::rename(tmp_path, path)?;
    Ok(())
}
