use crate::client::{ClientError, RecommendationApi};
use crate::session::SessionStore;

/// Verifies credentials and, on success, stores the returned token.
pub async fn sign_in(
    client: &dyn RecommendationApi,
    session: &SessionStore,
    username: &str,
    password: &str,
) -> Result<(), ClientError> {
    let token = client.login(username.trim(), password).await?;
    session.set(&token);
    tracing::info!(username = username.trim(), "signed in");
    Ok(())
}

/// Creates the account. The caller signs in separately afterwards.
pub async fn sign_up(
    client: &dyn RecommendationApi,
    username: &str,
    password: &str,
) -> Result<(), ClientError> {
    client.register(username.trim(), password).await?;
    tracing::info!(username = username.trim(), "account registered");
    Ok(())
}
