use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Signed-in user, as needed to author reviews
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
}

pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    pub fn get_access_token(&self) -> Option<&String> {
        self.get("access_token")
    }

    pub fn set_access_token(&mut self, token: String) {
        self.set("access_token".to_string(), token);
    }

    pub fn get_user_id(&self) -> Option<&String> {
        self.get("user_id")
    }

    pub fn get_user_email(&self) -> Option<&String> {
        self.get("user_email")
    }

    pub fn get_last_review_sync(&self) -> Option<DateTime<Utc>> {
        self.get("reviews_last_sync")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn set_last_review_sync(&mut self, timestamp: DateTime<Utc>) {
        self.set("reviews_last_sync".to_string(), timestamp.to_rfc3339());
    }

    /// The stored session, if every part of it is present
    pub fn session(&self) -> Option<Session> {
        Some(Session {
            user_id: self.get_user_id()?.clone(),
            email: self.get_user_email()?.clone(),
            access_token: self.get_access_token()?.clone(),
        })
    }

    pub fn set_session(&mut self, session: Session) {
        self.set("user_id".to_string(), session.user_id);
        self.set("user_email".to_string(), session.email);
        self.set_access_token(session.access_token);
    }

    pub fn clear_session(&mut self) {
        for key in ["user_id", "user_email", "access_token", "reviews_last_sync"] {
            self.remove(key);
        }
    }
}
