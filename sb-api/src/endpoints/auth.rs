//! Authentication endpoints.

use tracing::info;

use sb_core::error::SbResult;
use sb_models::{Credentials, PasswordChange, Registration, SocialLogin, TokenPair, User};

use crate::client::{to_body, ApiClient};

impl ApiClient {
    /// Exchange a username and password for a token pair.
    ///
    /// The pair is returned, not installed; the caller decides whether
    /// to keep it.
    pub async fn obtain_tokens(&self, credentials: &Credentials) -> SbResult<TokenPair> {
        let tokens: TokenPair = self.post_json("/token/", &to_body(credentials)?).await?;
        info!("obtained tokens for {}", credentials.username);
        Ok(tokens)
    }

    /// Create an account. The backend does not sign the user in.
    pub async fn register(&self, registration: &Registration) -> SbResult<serde_json::Value> {
        self.post_json("/register/", &to_body(registration)?).await
    }

    /// Exchange a third-party access token for a token pair.
    pub async fn social_login(&self, login: &SocialLogin) -> SbResult<TokenPair> {
        self.post_json("/auth/social/login/", &to_body(login)?).await
    }

    /// Fetch the signed-in user.
    pub async fn me(&self) -> SbResult<User> {
        self.get_json("/me/").await
    }

    /// Change the signed-in user's password.
    pub async fn change_password(&self, change: &PasswordChange) -> SbResult<()> {
        self.post("/auth/change-password/", &to_body(change)?).await?;
        Ok(())
    }
}
