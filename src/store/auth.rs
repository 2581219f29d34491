//! OAuth2 bearer-token middleware for the Firestore client.
//!
//! The authenticator is built lazily from the service-account key on first
//! use and cached for the life of the client; `yup-oauth2` refreshes the
//! access token before it expires.

use http::Extensions;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use reqwest::{header, Request, Response};
use reqwest_middleware::{Middleware, Next};
use tokio::sync::OnceCell;
use yup_oauth2::authenticator::Authenticator;
use yup_oauth2::{ServiceAccountAuthenticator, ServiceAccountKey};

const SCOPES: &[&str] = &["https://www.googleapis.com/auth/datastore"];

type GoogleAuthenticator = Authenticator<HttpsConnector<HttpConnector>>;

pub struct GoogleAuthMiddleware {
    key: ServiceAccountKey,
    authenticator: OnceCell<GoogleAuthenticator>,
}

impl GoogleAuthMiddleware {
    pub fn new(key: ServiceAccountKey) -> Self {
        Self {
            key,
            authenticator: OnceCell::new(),
        }
    }

    async fn bearer_token(&self) -> Result<String, anyhow::Error> {
        let auth = self
            .authenticator
            .get_or_try_init(|| async {
                ServiceAccountAuthenticator::builder(self.key.clone())
                    .build()
                    .await
            })
            .await?;

        let token = auth.token(SCOPES).await?;
        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("authenticator returned an empty token"))
    }
}

#[async_trait::async_trait]
impl Middleware for GoogleAuthMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let token = self.bearer_token().await.map_err(|e| {
            reqwest_middleware::Error::Middleware(anyhow::anyhow!(
                "failed to obtain access token: {e}"
            ))
        })?;

        let value = header::HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
            reqwest_middleware::Error::Middleware(anyhow::anyhow!("invalid bearer token: {e}"))
        })?;
        req.headers_mut().insert(header::AUTHORIZATION, value);

        next.run(req, extensions).await
    }
}
