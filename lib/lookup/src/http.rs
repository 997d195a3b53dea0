use crate::retry::with_retry;
use crate::{LookupConfig, LookupError, Result, RetryConfig};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// reqwest client plus the retry policy shared by every HTTP collaborator.
///
/// At most `concurrency` operations (retries included) are in flight per
/// client; callers beyond that wait for a permit.
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    client: reqwest::Client,
    retry: RetryConfig,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl HttpBackend {
    pub(crate) fn new(config: &LookupConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("semtab/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LookupError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            client,
            retry: config.retry.clone(),
            timeout: config.request_timeout(),
            permits: Arc::new(Semaphore::new(config.concurrency.max(1))),
        })
    }

    async fn limited<T, Fut>(&self, operation: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| LookupError::Network("request limiter closed".to_string()))?;
        operation.await
    }

    pub(crate) async fn get_json<T, Q>(&self, operation: &str, url: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.limited(with_retry(&self.retry, self.timeout, operation, move || async move {
            let response = self
                .client
                .get(url)
                .header(reqwest::header::ACCEPT, "application/json")
                .query(query)
                .send()
                .await?;
            decode(url, response).await
        }))
        .await
    }

    pub(crate) async fn post_form<T, F>(
        &self,
        operation: &str,
        url: &str,
        accept: &str,
        form: &F,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        F: Serialize + ?Sized,
    {
        self.limited(with_retry(&self.retry, self.timeout, operation, move || async move {
            let response = self
                .client
                .post(url)
                .header(reqwest::header::ACCEPT, accept)
                .form(form)
                .send()
                .await?;
            decode(url, response).await
        }))
        .await
    }

    pub(crate) async fn post_json<T, B>(&self, operation: &str, url: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.limited(with_retry(&self.retry, self.timeout, operation, move || async move {
            let response = self.client.post(url).json(body).send().await?;
            decode(url, response).await
        }))
        .await
    }
}

async fn decode<T: DeserializeOwned>(url: &str, response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::Status {
            status: status.as_u16(),
            endpoint: url.to_string(),
        });
    }
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
