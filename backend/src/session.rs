//! The signed-in person, persisted to a small JSON file so a restart keeps
//! the terminal logged in.

use crate::error::StoreError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    person_id: String,
}

pub struct SessionStore {
    path: PathBuf,
    current: RwLock<Option<String>>,
}

impl SessionStore {
    /// Reads the session file if there is one. A missing or unreadable file
    /// means nobody is signed in.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let current = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<SessionFile>(&bytes) {
                Ok(file) => Some(file.person_id.trim().to_string()).filter(|id| !id.is_empty()),
                Err(e) => {
                    warn!("Ignoring corrupt session file {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Cannot read session file {}: {}", path.display(), e);
                None
            }
        };
        SessionStore {
            path,
            current: RwLock::new(current),
        }
    }

    pub async fn person_id(&self) -> Option<String> {
        self.current.read().await.clone()
    }

    pub async fn sign_in(&self, person_id: &str) -> Result<(), StoreError> {
        let mut current = self.current.write().await;
        let file = SessionFile {
            person_id: person_id.trim().to_string(),
        };
        fs::write(&self.path, serde_json::to_vec(&file)?)?;
        info!("Person {} signed in", file.person_id);
        *current = Some(file.person_id);
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<(), StoreError> {
        let mut current = self.current.write().await;
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        if let Some(id) = current.take() {
            info!("Person {} signed out", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn session_survives_reload_until_sign_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let session = SessionStore::load(&path);
        assert_eq!(session.person_id().await, None);

        session.sign_in(" p1 ").await.unwrap();
        assert_eq!(SessionStore::load(&path).person_id().await, Some("p1".into()));

        session.sign_out().await.unwrap();
        assert_eq!(session.person_id().await, None);
        assert!(!path.exists());
        session.sign_out().await.unwrap();
    }

    #[actix_web::test]
    async fn corrupt_file_means_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, b"{not json").unwrap();
        assert_eq!(SessionStore::load(&path).person_id().await, None);
    }
}
