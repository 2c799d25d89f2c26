use std::time::Duration;

use url::Url;

use crate::{FailureKind, FeedBatch, RequestError, Timestamp, WireMessage};

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    /// Timeout for login/logout requests.
    pub auth_timeout: Duration,
    /// Ceiling for one long-poll; the server normally answers well before
    /// this by returning an empty batch.
    pub poll_timeout: Duration,
    pub submit_timeout: Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://127.0.0.1:8000/").expect("default base url"),
            connect_timeout: Duration::from_secs(10),
            auth_timeout: Duration::from_secs(30),
            poll_timeout: Duration::from_secs(1200),
            submit_timeout: Duration::from_secs(30),
        }
    }
}

/// The four remote operations of the feed service.
#[async_trait::async_trait]
pub trait FeedService: Send + Sync {
    /// `POST /login/{username}`, empty body. 2xx means authenticated.
    async fn login(&self, username: &str) -> Result<(), RequestError>;
    /// `DELETE /login/{username}`, empty body. 2xx means deauthenticated.
    async fn logout(&self, username: &str) -> Result<(), RequestError>;
    /// `GET /feed?since_timestamp={since}`: long-poll for newer messages.
    async fn fetch_since(&self, since_timestamp: Timestamp)
        -> Result<Vec<WireMessage>, RequestError>;
    /// `POST /feed` with form-encoded `nickname` and `message`.
    async fn post_message(&self, nickname: &str, message: &str) -> Result<(), RequestError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFeedService {
    settings: FeedSettings,
}

impl ReqwestFeedService {
    pub fn new(settings: FeedSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self, request_timeout: Duration) -> Result<reqwest::Client, RequestError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|err| RequestError::new(FailureKind::Network, err.to_string()))
    }

    /// Appends path segments to the base URL, percent-escaping as needed.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RequestError> {
        let mut url = self.settings.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                RequestError::new(FailureKind::InvalidUrl, "base url cannot be a base")
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl FeedService for ReqwestFeedService {
    async fn login(&self, username: &str) -> Result<(), RequestError> {
        let url = self.endpoint(&["login", username])?;
        let client = self.build_client(self.settings.auth_timeout)?;
        let response = client.post(url).send().await.map_err(map_reqwest_error)?;
        check_status(&response)?;
        Ok(())
    }

    async fn logout(&self, username: &str) -> Result<(), RequestError> {
        let url = self.endpoint(&["login", username])?;
        let client = self.build_client(self.settings.auth_timeout)?;
        let response = client.delete(url).send().await.map_err(map_reqwest_error)?;
        check_status(&response)?;
        Ok(())
    }

    async fn fetch_since(
        &self,
        since_timestamp: Timestamp,
    ) -> Result<Vec<WireMessage>, RequestError> {
        let url = self.endpoint(&["feed"])?;
        let client = self.build_client(self.settings.poll_timeout)?;
        let response = client
            .get(url)
            .query(&[("since_timestamp", &since_timestamp.to_string())])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        check_status(&response)?;

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let batch: FeedBatch = serde_json::from_slice(&body)
            .map_err(|err| RequestError::new(FailureKind::InvalidResponse, err.to_string()))?;
        Ok(batch.messages)
    }

    async fn post_message(&self, nickname: &str, message: &str) -> Result<(), RequestError> {
        let url = self.endpoint(&["feed"])?;
        let client = self.build_client(self.settings.submit_timeout)?;
        let response = client
            .post(url)
            .form(&[("nickname", nickname), ("message", message)])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        check_status(&response)?;
        Ok(())
    }
}

fn check_status(response: &reqwest::Response) -> Result<(), RequestError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(RequestError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        return RequestError::new(FailureKind::Timeout, "timeout");
    }
    RequestError::new(FailureKind::Network, err.to_string())
}
