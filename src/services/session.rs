use tracing::info;

use crate::auth::{self, TokenError, TokenIssuer};
use crate::database::manager::DatabaseError;
use crate::database::models::user::{NewUser, Role, User};
use crate::database::users::UserStore;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("user already exists")]
    AlreadyExists,
    #[error("user does not exist")]
    UserNotFound,
    #[error("incorrect password")]
    WrongPassword,
    #[error("invalid or expired refresh token")]
    InvalidRefreshToken,
    #[error("email already in use")]
    EmailInUse,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// Token pair handed out on signup and login.
#[derive(Debug)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Login, logout, refresh-token exchange and account mutation over an
/// abstract user store.
pub struct SessionService<S> {
    users: S,
    tokens: TokenIssuer,
}

impl<S: UserStore> SessionService<S> {
    pub fn new(users: S, tokens: TokenIssuer) -> Self {
        Self { users, tokens }
    }

    /// Emails are matched lowercase and trimmed everywhere; the store's
    /// unique index sees only the normalized form.
    fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<SessionTokens, SessionError> {
        let email = Self::normalize_email(email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(SessionError::AlreadyExists);
        }

        let hash = auth::hash_password(password)?;
        let user = self
            .users
            .insert(NewUser {
                email,
                password_hash: Some(hash),
                role: Role::User,
            })
            .await?;

        self.issue_session(user).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SessionTokens, SessionError> {
        let email = Self::normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(SessionError::UserNotFound)?;

        // An account without a local password (Google-provisioned) cannot
        // log in with one.
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(SessionError::WrongPassword)?;
        if !auth::verify_password(password, hash)? {
            return Err(SessionError::WrongPassword);
        }

        self.issue_session(user).await
    }

    /// Exchange a refresh token for a new access token. The refresh token
    /// itself is not rotated. Fails when the token does not verify, its
    /// subject is gone, or it has been revoked out of the stored list.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, SessionError> {
        let claims = self
            .tokens
            .verify_refresh(refresh_token)
            .map_err(|_| SessionError::InvalidRefreshToken)?;

        let user = self
            .users
            .find_by_id(claims.id)
            .await?
            .ok_or(SessionError::InvalidRefreshToken)?;

        if !user.refresh_tokens.iter().any(|t| t == refresh_token) {
            return Err(SessionError::InvalidRefreshToken);
        }

        let access_token = self.tokens.issue_access(&user)?;
        if !auth::is_well_formed(&access_token) {
            return Err(SessionError::Token(TokenError::Malformed));
        }
        Ok(access_token)
    }

    /// Revoke a single refresh token. Removing a token that is already gone
    /// is a no-op.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), SessionError> {
        let claims = self
            .tokens
            .verify_refresh(refresh_token)
            .map_err(|_| SessionError::InvalidRefreshToken)?;

        let user = self
            .users
            .find_by_id(claims.id)
            .await?
            .ok_or(SessionError::UserNotFound)?;

        self.users.remove_refresh_token(user.id, refresh_token).await?;
        Ok(())
    }

    pub async fn change_password(
        &self,
        email: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), SessionError> {
        let email = Self::normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(SessionError::UserNotFound)?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(SessionError::WrongPassword)?;
        if !auth::verify_password(old_password, hash)? {
            return Err(SessionError::WrongPassword);
        }

        let new_hash = auth::hash_password(new_password)?;
        self.users.update_password_hash(user.id, &new_hash).await?;
        // Existing refresh tokens stay valid until they expire or log out.
        Ok(())
    }

    pub async fn update_email(
        &self,
        old_email: &str,
        new_email: &str,
    ) -> Result<String, SessionError> {
        let old_email = Self::normalize_email(old_email);
        let new_email = Self::normalize_email(new_email);

        let user = self
            .users
            .find_by_email(&old_email)
            .await?
            .ok_or(SessionError::UserNotFound)?;

        if self.users.find_by_email(&new_email).await?.is_some() {
            return Err(SessionError::EmailInUse);
        }

        self.users.update_email(user.id, &new_email).await?;
        // Outstanding access tokens keep the old email claim until the next
        // login.
        Ok(new_email)
    }

    /// Existence probe used by the Google signup flow.
    pub async fn google_lookup(&self, email: &str) -> Result<Option<User>, SessionError> {
        Ok(self
            .users
            .find_by_email(&Self::normalize_email(email))
            .await?)
    }

    /// Google-verified callers are trusted on their claim that the email is
    /// theirs; no local credential is checked.
    pub async fn google_login(&self, email: &str) -> Result<SessionTokens, SessionError> {
        let user = self
            .google_lookup(email)
            .await?
            .ok_or(SessionError::UserNotFound)?;
        self.issue_session(user).await
    }

    /// Find-or-create for the Google auth callback. Created accounts have no
    /// local password.
    pub async fn find_or_create_google_user(&self, email: &str) -> Result<User, SessionError> {
        let email = Self::normalize_email(email);
        if let Some(user) = self.users.find_by_email(&email).await? {
            return Ok(user);
        }

        Ok(self
            .users
            .insert(NewUser {
                email,
                password_hash: None,
                role: Role::User,
            })
            .await?)
    }

    /// Create the configured admin account when it does not exist yet.
    pub async fn bootstrap_admin(&self, email: &str, password: &str) -> Result<(), SessionError> {
        let email = Self::normalize_email(email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Ok(());
        }

        let hash = auth::hash_password(password)?;
        self.users
            .insert(NewUser {
                email: email.clone(),
                password_hash: Some(hash),
                role: Role::Admin,
            })
            .await?;
        info!(email = %email, "created bootstrap admin user");
        Ok(())
    }

    /// Issue both tokens, sanity-check their shape, and record the refresh
    /// token against the user.
    async fn issue_session(&self, user: User) -> Result<SessionTokens, SessionError> {
        let access_token = self.tokens.issue_access(&user)?;
        let refresh_token = self.tokens.issue_refresh(&user)?;

        if !auth::is_well_formed(&access_token) || !auth::is_well_formed(&refresh_token) {
            return Err(SessionError::Token(TokenError::Malformed));
        }

        self.users.push_refresh_token(user.id, &refresh_token).await?;
        Ok(SessionTokens {
            access_token,
            refresh_token,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::is_well_formed;
    use crate::testing::{test_issuer, MemoryUserStore};

    fn service() -> SessionService<MemoryUserStore> {
        SessionService::new(MemoryUserStore::default(), test_issuer())
    }

    #[tokio::test]
    async fn signup_issues_both_tokens_and_records_the_refresh_token() {
        let sessions = service();

        let session = sessions.signup("new@example.com", "hunter2").await.unwrap();

        assert!(is_well_formed(&session.access_token));
        assert!(is_well_formed(&session.refresh_token));

        let stored = sessions
            .google_lookup("new@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.refresh_tokens, vec![session.refresh_token]);
    }

    #[tokio::test]
    async fn signup_normalizes_email_case_before_uniqueness_check() {
        let sessions = service();

        sessions.signup("Someone@Example.COM", "pw").await.unwrap();

        let second = sessions.signup("someone@example.com", "pw").await;
        assert!(matches!(second, Err(SessionError::AlreadyExists)));

        let third = sessions.signup("SOMEONE@EXAMPLE.COM", "pw").await;
        assert!(matches!(third, Err(SessionError::AlreadyExists)));
    }

    #[tokio::test]
    async fn login_rejects_unknown_user_and_wrong_password() {
        let sessions = service();
        sessions.signup("a@example.com", "right").await.unwrap();

        let unknown = sessions.login("b@example.com", "right").await;
        assert!(matches!(unknown, Err(SessionError::UserNotFound)));

        let wrong = sessions.login("a@example.com", "wrong").await;
        assert!(matches!(wrong, Err(SessionError::WrongPassword)));
    }

    #[tokio::test]
    async fn login_then_refresh_yields_a_well_formed_access_token() {
        let sessions = service();
        sessions.signup("a@example.com", "pw").await.unwrap();

        let session = sessions.login("a@example.com", "pw").await.unwrap();
        let access = sessions.refresh(&session.refresh_token).await.unwrap();

        assert!(is_well_formed(&access));
    }

    #[tokio::test]
    async fn logout_revokes_the_refresh_token() {
        let sessions = service();
        let session = sessions.signup("a@example.com", "pw").await.unwrap();

        sessions.logout(&session.refresh_token).await.unwrap();

        let refreshed = sessions.refresh(&session.refresh_token).await;
        assert!(matches!(refreshed, Err(SessionError::InvalidRefreshToken)));
    }

    #[tokio::test]
    async fn logout_of_an_absent_token_is_a_no_op() {
        let sessions = service();
        let first = sessions.signup("a@example.com", "pw").await.unwrap();
        // Tokens issued within the same second are byte-identical; cross a
        // second boundary so the two sessions hold distinct tokens.
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        let second = sessions.login("a@example.com", "pw").await.unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);

        sessions.logout(&first.refresh_token).await.unwrap();
        sessions.logout(&first.refresh_token).await.unwrap();

        // The other session's token survives.
        assert!(sessions.refresh(&second.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn refresh_rejects_a_token_missing_from_the_stored_list() {
        let sessions = service();
        let session = sessions.signup("a@example.com", "pw").await.unwrap();

        // A second token signed with the same secrets but never recorded.
        // A longer TTL keeps its bytes distinct from the recorded token.
        let user = sessions
            .google_lookup("a@example.com")
            .await
            .unwrap()
            .unwrap();
        let foreign_issuer = crate::auth::TokenIssuer::new(
            "test-access-secret",
            "test-refresh-secret",
            chrono::Duration::minutes(15),
            chrono::Duration::days(14),
        )
        .unwrap();
        let foreign = foreign_issuer.issue_refresh(&user).unwrap();
        assert_ne!(foreign, session.refresh_token);

        let result = sessions.refresh(&foreign).await;
        assert!(matches!(result, Err(SessionError::InvalidRefreshToken)));
    }

    #[tokio::test]
    async fn refresh_rejects_garbage_tokens() {
        let sessions = service();

        let result = sessions.refresh("definitely.not.ajwt").await;
        assert!(matches!(result, Err(SessionError::InvalidRefreshToken)));
    }

    #[tokio::test]
    async fn change_password_keeps_existing_refresh_tokens_valid() {
        let sessions = service();
        let session = sessions.signup("a@example.com", "old").await.unwrap();

        sessions
            .change_password("a@example.com", "old", "new")
            .await
            .unwrap();

        // Old password no longer works, new one does.
        assert!(matches!(
            sessions.login("a@example.com", "old").await,
            Err(SessionError::WrongPassword)
        ));
        sessions.login("a@example.com", "new").await.unwrap();

        // Tokens issued before the change were not revoked.
        assert!(sessions.refresh(&session.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn update_email_rejects_a_taken_address() {
        let sessions = service();
        sessions.signup("a@example.com", "pw").await.unwrap();
        sessions.signup("b@example.com", "pw").await.unwrap();

        let result = sessions.update_email("a@example.com", "B@example.com").await;
        assert!(matches!(result, Err(SessionError::EmailInUse)));
    }

    #[tokio::test]
    async fn update_email_moves_the_account() {
        let sessions = service();
        sessions.signup("a@example.com", "pw").await.unwrap();

        let new_email = sessions
            .update_email("a@example.com", "A2@Example.com")
            .await
            .unwrap();
        assert_eq!(new_email, "a2@example.com");

        assert!(sessions.login("a2@example.com", "pw").await.is_ok());
        assert!(matches!(
            sessions.login("a@example.com", "pw").await,
            Err(SessionError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn google_login_skips_password_verification() {
        let sessions = service();
        let user = sessions
            .find_or_create_google_user("g@example.com")
            .await
            .unwrap();
        assert!(user.password_hash.is_none());

        let session = sessions.google_login("g@example.com").await.unwrap();
        assert!(is_well_formed(&session.access_token));

        // But a password login against the same account fails.
        assert!(matches!(
            sessions.login("g@example.com", "anything").await,
            Err(SessionError::WrongPassword)
        ));
    }

    #[tokio::test]
    async fn find_or_create_google_user_is_idempotent() {
        let sessions = service();

        let first = sessions
            .find_or_create_google_user("g@example.com")
            .await
            .unwrap();
        let second = sessions
            .find_or_create_google_user("G@example.com")
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn bootstrap_admin_creates_once_and_is_idempotent() {
        let sessions = service();

        sessions
            .bootstrap_admin("Admin@Example.com", "s3cret")
            .await
            .unwrap();
        sessions
            .bootstrap_admin("admin@example.com", "s3cret")
            .await
            .unwrap();

        let admin = sessions
            .google_lookup("admin@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Admin);

        sessions.login("admin@example.com", "s3cret").await.unwrap();
    }
}
