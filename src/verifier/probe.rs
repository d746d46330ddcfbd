use async_trait::async_trait;
use reqwest::{redirect, Client, StatusCode};
use tracing::debug;

use super::{ProbeOutcome, ResourceProbe, VerifierError};
use crate::config::VerifierConfig;

/// Existence probe over HTTP: HEAD first, GET when HEAD is refused.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(config: &VerifierConfig) -> Result<Self, VerifierError> {
        let client = Client::builder()
            .timeout(config.probe_timeout())
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| VerifierError::ClientBuild(e.to_string()))?;
        Ok(Self { client })
    }

    async fn send(&self, url: &str, head: bool) -> Result<StatusCode, reqwest::Error> {
        let request = if head {
            self.client.head(url)
        } else {
            self.client.get(url)
        };
        Ok(request.send().await?.status())
    }
}

#[async_trait]
impl ResourceProbe for HttpProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        let status = match self.send(url, true).await {
            Ok(status)
                if status == StatusCode::METHOD_NOT_ALLOWED
                    || status == StatusCode::NOT_IMPLEMENTED =>
            {
                debug!(url, "HEAD refused, retrying with GET");
                self.send(url, false).await
            }
            other => other,
        };

        match status {
            Ok(status) => ProbeOutcome::Responded(status.as_u16()),
            Err(e) if e.is_timeout() => ProbeOutcome::Failed("timed out".to_string()),
            Err(e) if e.is_redirect() => ProbeOutcome::Failed("too many redirects".to_string()),
            Err(e) => ProbeOutcome::Failed(e.to_string()),
        }
    }
}
