use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Up,
    Down,
    Unknown,
}

/// Everything the CLI remembers between invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub server_url: String,
    pub user_name: Option<String>,
    pub token: Option<String>,
    pub expiration: Option<DateTime<Utc>>,
    pub last_ping: Option<DateTime<Utc>>,
    pub status: ServerStatus,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            user_name: None,
            token: None,
            expiration: None,
            last_ping: None,
            status: ServerStatus::Unknown,
        }
    }
}

impl Session {
    /// The stored token, unless it is missing or already expired.
    pub fn active_token(&self) -> Option<&str> {
        match (&self.token, self.expiration) {
            (Some(token), Some(expiration)) if expiration > Utc::now() => Some(token.as_str()),
            (Some(token), None) => Some(token.as_str()),
            _ => None,
        }
    }

    pub fn log_in(&mut self, user_name: String, token: String, expiration: DateTime<Utc>) {
        self.user_name = Some(user_name);
        self.token = Some(token);
        self.expiration = Some(expiration);
    }

    pub fn log_out(&mut self) {
        self.user_name = None;
        self.token = None;
        self.expiration = None;
    }

    pub fn update_ping(&mut self, status: ServerStatus) {
        self.last_ping = Some(Utc::now());
        self.status = status;
    }

    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let session_file = dir.join(SESSION_FILE);
        if !session_file.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(session_file)?;
        let session: Session = serde_json::from_str(&content)?;
        Ok(session)
    }

    pub fn save_to(&self, dir: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(dir.join(SESSION_FILE), content)?;
        Ok(())
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("TODO_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("todo").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session() -> anyhow::Result<Session> {
    Session::load_from(&get_config_dir()?)
}

pub fn save_session(session: &Session) -> anyhow::Result<()> {
    session.save_to(&get_config_dir()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn missing_session_file_yields_defaults() {
        let dir = std::env::temp_dir().join(format!("todo-cli-missing-{}", std::process::id()));
        let session = Session::load_from(&dir).unwrap();
        assert_eq!(session, Session::default());
        assert_eq!(session.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn session_persists_login() {
        let dir = std::env::temp_dir().join(format!("todo-cli-session-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let mut session = Session::default();
        session.log_in("Sample".to_string(), "abc".to_string(), Utc::now() + Duration::hours(3));
        session.save_to(&dir).unwrap();

        let loaded = Session::load_from(&dir).unwrap();
        assert_eq!(loaded, session);
        assert_eq!(loaded.active_token(), Some("abc"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn expired_token_is_inactive() {
        let mut session = Session::default();
        session.log_in("Sample".to_string(), "abc".to_string(), Utc::now() - Duration::minutes(1));
        assert_eq!(session.active_token(), None);

        session.log_out();
        assert!(session.token.is_none());
        assert!(session.user_name.is_none());
    }
}
