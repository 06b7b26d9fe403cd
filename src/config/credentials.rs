use log::{ info, warn };
use serde::{ Deserialize, Serialize };
use std::fs;
use std::path::{ Path, PathBuf };
use std::sync::Mutex;

use crate::error::TravelError;

pub const GEMINI_KEY_NAME: &str = "gemini-api-key";
pub const SERP_KEY_NAME: &str = "serp-api-key";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub gemini_api_key: String,
    pub serp_api_key: Option<String>,
}

impl Credentials {
    pub fn has_gemini_key(&self) -> bool {
        !self.gemini_api_key.trim().is_empty()
    }

    pub fn serp_key(&self) -> Option<&str> {
        self.serp_api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Applies a save from the key form: the Gemini key is always replaced,
    /// the SerpAPI key only when a non-blank one was entered.
    pub fn updated(&self, gemini_api_key: &str, serp_api_key: Option<&str>) -> Credentials {
        let serp = serp_api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| self.serp_api_key.clone());
        Credentials {
            gemini_api_key: gemini_api_key.trim().to_string(),
            serp_api_key: serp,
        }
    }
}

/// On-disk shape: the same two fixed entries the key form writes.
#[derive(Serialize, Deserialize, Default)]
struct StoredCredentials {
    #[serde(rename = "gemini-api-key", default, skip_serializing_if = "Option::is_none")]
    gemini: Option<String>,
    #[serde(rename = "serp-api-key", default, skip_serializing_if = "Option::is_none")]
    serp: Option<String>,
}

pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Credentials, TravelError>;
    fn save(&self, credentials: &Credentials) -> Result<(), TravelError>;
}

pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Credentials, TravelError> {
        if !self.path.exists() {
            info!("No stored API keys at {}", self.path.display());
            return Ok(Credentials::default());
        }
        let content = fs
            ::read_to_string(&self.path)
            .map_err(|e|
                TravelError::Credentials(format!("Failed to read {}: {}", self.path.display(), e))
            )?;
        let stored: StoredCredentials = serde_json
            ::from_str(&content)
            .map_err(|e|
                TravelError::Credentials(format!("Failed to parse {}: {}", self.path.display(), e))
            )?;
        Ok(Credentials {
            gemini_api_key: stored.gemini.unwrap_or_default(),
            serp_api_key: stored.serp.filter(|k| !k.is_empty()),
        })
    }

    fn save(&self, credentials: &Credentials) -> Result<(), TravelError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e|
                    TravelError::Credentials(format!("Failed to create {}: {}", parent.display(), e))
                )?;
            }
        }
        let stored = StoredCredentials {
            gemini: Some(credentials.gemini_api_key.clone()),
            serp: credentials.serp_api_key.clone(),
        };
        let json = serde_json
            ::to_string_pretty(&stored)
            .map_err(|e| TravelError::Credentials(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e|
            TravelError::Credentials(format!("Failed to write {}: {}", self.path.display(), e))
        )?;
        info!("API keys saved to {}", self.path.display());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Credentials>,
}

impl MemoryCredentialStore {
    pub fn new(credentials: Credentials) -> Self {
        Self { inner: Mutex::new(credentials) }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Credentials, TravelError> {
        self.inner
            .lock()
            .map(|c| c.clone())
            .map_err(|e| TravelError::Credentials(e.to_string()))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), TravelError> {
        let mut guard = self.inner.lock().map_err(|e| TravelError::Credentials(e.to_string()))?;
        *guard = credentials.clone();
        Ok(())
    }
}

pub fn default_credentials_path() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join("wanderlust").join("credentials.json"),
        None => {
            warn!("No user config directory found, storing API keys in the working directory");
            PathBuf::from(".wanderlust-credentials.json")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_serp_key_keeps_previous_one() {
        let current = Credentials {
            gemini_api_key: "old".into(),
            serp_api_key: Some("serp".into()),
        };
        let next = current.updated(" new ", Some("  "));
        assert_eq!(next.gemini_api_key, "new");
        assert_eq!(next.serp_key(), Some("serp"));

        let replaced = current.updated("new", Some("serp2"));
        assert_eq!(replaced.serp_key(), Some("serp2"));
    }

    #[test]
    fn file_store_round_trips_under_fixed_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");
        let store = FileCredentialStore::new(&path);

        assert_eq!(store.load().unwrap(), Credentials::default());

        let creds = Credentials {
            gemini_api_key: "g-key".into(),
            serp_api_key: None,
        };
        store.save(&creds).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[GEMINI_KEY_NAME], "g-key");
        assert!(raw.get(SERP_KEY_NAME).is_none());
        assert_eq!(store.load().unwrap(), creds);
    }

    #[test]
    fn corrupt_file_is_a_credential_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "not json").unwrap();
        let err = FileCredentialStore::new(&path).load().unwrap_err();
        assert!(matches!(err, TravelError::Credentials(_)));
    }
}
