//! Where the authenticated user record comes from

use async_trait::async_trait;

use crate::error::Result;
use crate::record::UserRecord;

/// Fetches the record behind `GET /users/me` for a credential.
///
/// Failures carry the HTTP status when there is one, so the provider can tell
/// server-class errors (retried) from the rest (settled immediately).
#[async_trait]
pub trait UserSource: Send + Sync {
    async fn fetch_me(&self, credential: &str) -> Result<UserRecord>;
}

#[cfg(feature = "http")]
pub use http::HttpUserSource;

#[cfg(feature = "http")]
mod http {
    use async_trait::async_trait;
    use reqwest::header::AUTHORIZATION;
    use serde_json::Value;

    use super::UserSource;
    use crate::config::ProviderConfig;
    use crate::error::{GateError, Result};
    use crate::record::UserRecord;

    pub struct HttpUserSource {
        client: reqwest::Client,
        url: String,
        token_type: String,
    }

    impl HttpUserSource {
        pub fn new(config: &ProviderConfig) -> Self {
            HttpUserSource {
                client: reqwest::Client::new(),
                url: format!("{}/users/me", config.api_base_url.trim_end_matches('/')),
                token_type: config.token_type.clone(),
            }
        }

        fn request(&self, credential: &str) -> reqwest::RequestBuilder {
            self.client
                .get(&self.url)
                .header(AUTHORIZATION, format!("{} {}", self.token_type, credential))
        }
    }

    #[async_trait]
    impl UserSource for HttpUserSource {
        async fn fetch_me(&self, credential: &str) -> Result<UserRecord> {
            let res = self
                .request(credential)
                .send()
                .await
                .map_err(|e| GateError::fetch(e.status().map(|s| s.as_u16()), e.to_string()))?;

            let status = res.status();
            if !status.is_success() {
                let body = res.text().await.unwrap_or_default();
                return Err(GateError::fetch(Some(status.as_u16()), body));
            }
            let body: Value = res.json().await.map_err(|e| GateError::Decode(e.to_string()))?;
            UserRecord::from_me_response(body)
        }
    }

}
