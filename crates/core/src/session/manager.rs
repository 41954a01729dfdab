//! Session manager: one live token per principal.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

use exrate_shared::config::{IdentityConfig, UserCredential};

use super::error::SessionError;
use super::token::{AlphanumericTokens, TokenGenerator};

/// A live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Logged-in user.
    pub principal: String,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct SessionTable {
    by_token: HashMap<String, Session>,
    by_principal: HashMap<String, String>,
}

impl SessionTable {
    fn revoke(&mut self, token: &str) -> Option<Session> {
        let session = self.by_token.remove(token)?;
        self.by_principal.remove(&session.principal);
        Some(session)
    }
}

/// Issues, validates and revokes session tokens.
pub struct SessionManager {
    users: Vec<UserCredential>,
    token_length: usize,
    max_token_attempts: usize,
    generator: Box<dyn TokenGenerator>,
    sessions: Mutex<SessionTable>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("users", &self.users.len())
            .field("token_length", &self.token_length)
            .field("max_token_attempts", &self.max_token_attempts)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a manager drawing random alphanumeric tokens.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self::with_generator(config, AlphanumericTokens)
    }

    /// Creates a manager with a custom token source.
    #[must_use]
    pub fn with_generator(config: &IdentityConfig, generator: impl TokenGenerator + 'static) -> Self {
        Self {
            users: config.users.clone(),
            token_length: config.token_length,
            max_token_attempts: config.max_token_attempts,
            generator: Box::new(generator),
            sessions: Mutex::new(SessionTable::default()),
        }
    }

    fn table(&self) -> MutexGuard<'_, SessionTable> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn verify(&self, username: &str, password: &str) -> bool {
        self.users.iter().any(|user| {
            user.username == username
                && bool::from(user.password.as_bytes().ct_eq(password.as_bytes()))
        })
    }

    /// Logs a user in and returns a fresh token.
    ///
    /// Any token the user already holds is revoked.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown user or wrong password,
    /// `TokenSpaceExhausted` if no unused token could be drawn.
    pub fn login(&self, username: &str, password: &str) -> Result<String, SessionError> {
        if !self.verify(username, password) {
            warn!(%username, "Login rejected");
            return Err(SessionError::InvalidCredentials);
        }

        let mut table = self.table();
        let token = self.draw_unused(&table)?;

        if let Some(previous) = table.by_principal.get(username).cloned() {
            table.revoke(&previous);
            debug!(%username, "Previous session replaced");
        }
        table.by_token.insert(
            token.clone(),
            Session {
                principal: username.to_string(),
                issued_at: Utc::now(),
            },
        );
        table
            .by_principal
            .insert(username.to_string(), token.clone());

        info!(%username, "User logged in");
        Ok(token)
    }

    fn draw_unused(&self, table: &SessionTable) -> Result<String, SessionError> {
        for _ in 0..self.max_token_attempts {
            let candidate = self.generator.generate(self.token_length);
            if !table.by_token.contains_key(&candidate) {
                return Ok(candidate);
            }
        }
        warn!(attempts = self.max_token_attempts, "Token space exhausted");
        Err(SessionError::TokenSpaceExhausted {
            attempts: self.max_token_attempts,
        })
    }

    /// Revokes a token and returns the principal it belonged to.
    ///
    /// # Errors
    ///
    /// `NotFound` if the token is not live.
    pub fn logout(&self, token: &str) -> Result<String, SessionError> {
        let session = self.table().revoke(token).ok_or(SessionError::NotFound)?;
        info!(username = %session.principal, "User logged out");
        Ok(session.principal)
    }

    /// Returns true if `token` is live.
    #[must_use]
    pub fn authorise(&self, token: &str) -> bool {
        self.table().by_token.contains_key(token)
    }

    /// Returns the user owning `token`, if live.
    #[must_use]
    pub fn principal_of(&self, token: &str) -> Option<String> {
        self.table()
            .by_token
            .get(token)
            .map(|session| session.principal.clone())
    }

    /// Returns the session behind `token`, if live.
    #[must_use]
    pub fn session(&self, token: &str) -> Option<Session> {
        self.table().by_token.get(token).cloned()
    }

    /// Number of live sessions.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.table().by_token.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;

    /// Replays a fixed list of tokens, repeating the last one forever.
    struct Scripted(Mutex<VecDeque<String>>);

    impl Scripted {
        fn new(tokens: &[&str]) -> Self {
            Self(Mutex::new(tokens.iter().map(ToString::to_string).collect()))
        }
    }

    impl TokenGenerator for Scripted {
        fn generate(&self, _length: usize) -> String {
            let mut queue = self.0.lock().unwrap();
            if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                queue.front().cloned().unwrap()
            }
        }
    }

    fn manager() -> SessionManager {
        SessionManager::new(&IdentityConfig::default())
    }

    #[test]
    fn test_login_issues_five_char_token() {
        let sessions = manager();
        let token = sessions.login("hayden", "1234").unwrap();

        assert_eq!(token.len(), 5);
        assert!(sessions.authorise(&token));
        assert_eq!(sessions.principal_of(&token).as_deref(), Some("hayden"));
        assert_eq!(sessions.active_sessions(), 1);
    }

    #[test]
    fn test_login_rejects_bad_credentials() {
        let sessions = manager();
        assert_eq!(
            sessions.login("hayden", "4321"),
            Err(SessionError::InvalidCredentials)
        );
        assert_eq!(
            sessions.login("mallory", "1234"),
            Err(SessionError::InvalidCredentials)
        );
        assert_eq!(sessions.active_sessions(), 0);
    }

    #[test]
    fn test_second_login_replaces_first() {
        let sessions = SessionManager::with_generator(
            &IdentityConfig::default(),
            Scripted::new(&["AAAAA", "BBBBB"]),
        );
        let first = sessions.login("hayden", "1234").unwrap();
        let second = sessions.login("hayden", "1234").unwrap();

        assert_eq!(first, "AAAAA");
        assert_eq!(second, "BBBBB");
        assert!(!sessions.authorise(&first));
        assert!(sessions.authorise(&second));
        assert_eq!(sessions.active_sessions(), 1);
    }

    #[test]
    fn test_users_hold_independent_sessions() {
        let sessions = manager();
        let hayden = sessions.login("hayden", "1234").unwrap();
        let josh = sessions.login("josh", "4321").unwrap();

        assert_ne!(hayden, josh);
        assert_eq!(sessions.active_sessions(), 2);
        assert_eq!(sessions.logout(&josh).unwrap(), "josh");
        assert!(sessions.authorise(&hayden));
    }

    #[test]
    fn test_logout() {
        let sessions = manager();
        let token = sessions.login("josh", "4321").unwrap();

        assert_eq!(sessions.logout(&token), Ok("josh".to_string()));
        assert!(!sessions.authorise(&token));
        assert_eq!(sessions.logout(&token), Err(SessionError::NotFound));
        assert_eq!(sessions.logout("never"), Err(SessionError::NotFound));
    }

    #[test]
    fn test_authorise_does_not_mutate() {
        let sessions = manager();
        assert!(!sessions.authorise("ZZZZZ"));
        assert!(!sessions.authorise(""));
        assert_eq!(sessions.active_sessions(), 0);
    }

    #[test]
    fn test_colliding_token_is_redrawn() {
        let sessions = SessionManager::with_generator(
            &IdentityConfig::default(),
            Scripted::new(&["AAAAA", "AAAAA", "AAAAA", "CCCCC"]),
        );
        let hayden = sessions.login("hayden", "1234").unwrap();
        let josh = sessions.login("josh", "4321").unwrap();

        assert_eq!(hayden, "AAAAA");
        assert_eq!(josh, "CCCCC");
        assert_eq!(sessions.principal_of("AAAAA").as_deref(), Some("hayden"));
    }

    #[test]
    fn test_token_space_exhausted() {
        let config = IdentityConfig {
            max_token_attempts: 3,
            ..IdentityConfig::default()
        };
        let sessions = SessionManager::with_generator(&config, Scripted::new(&["AAAAA"]));
        sessions.login("hayden", "1234").unwrap();

        assert_eq!(
            sessions.login("josh", "4321"),
            Err(SessionError::TokenSpaceExhausted { attempts: 3 })
        );
        assert!(sessions.principal_of("AAAAA").is_some());
    }

    #[test]
    fn test_revoked_token_may_be_reissued() {
        let sessions = SessionManager::with_generator(
            &IdentityConfig::default(),
            Scripted::new(&["AAAAA"]),
        );
        let token = sessions.login("hayden", "1234").unwrap();
        sessions.logout(&token).unwrap();

        assert_eq!(sessions.login("josh", "4321").unwrap(), "AAAAA");
        assert_eq!(sessions.principal_of("AAAAA").as_deref(), Some("josh"));
    }

    #[test]
    fn test_concurrent_logins() {
        let sessions = Arc::new(manager());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sessions = Arc::clone(&sessions);
                std::thread::spawn(move || {
                    let (user, pass) = if i % 2 == 0 { ("hayden", "1234") } else { ("josh", "4321") };
                    sessions.login(user, pass).unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(sessions.active_sessions(), 2);
    }
}
