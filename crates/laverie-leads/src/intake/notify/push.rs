use async_trait::async_trait;

use crate::config::PushConfig;

const PUSHOVER_ENDPOINT: &str = "https://api.pushover.net/1/messages.json";

/// Operator push alert; `link` lands as the notification's action URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushAlert {
    pub title: String,
    pub message: String,
    pub link: String,
    pub link_title: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("push transport failure: {0}")]
    Transport(String),
    #[error("push api returned status {0}")]
    Status(u16),
}

/// Push-notification seam. The live implementation posts to the Pushover
/// messages API; tests record or fail on demand.
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn notify(&self, alert: PushAlert) -> Result<(), PushError>;
}

pub struct PushoverGateway {
    http: reqwest::Client,
    token: String,
    user: String,
}

impl PushoverGateway {
    pub fn new(config: &PushConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: config.token.clone(),
            user: config.user.clone(),
        }
    }
}

#[async_trait]
impl PushGateway for PushoverGateway {
    async fn notify(&self, alert: PushAlert) -> Result<(), PushError> {
        let params = [
            ("token", self.token.as_str()),
            ("user", self.user.as_str()),
            ("message", alert.message.as_str()),
            ("title", alert.title.as_str()),
            ("priority", "1"),
            ("sound", "pushover"),
            ("url", alert.link.as_str()),
            ("url_title", alert.link_title.as_str()),
        ];

        let response = self
            .http
            .post(PUSHOVER_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|err| PushError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(PushError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}
