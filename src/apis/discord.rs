use reqwest::{Client, Url};
use serde::Serialize;
use shuttle_runtime::async_trait;

use super::NotificationSink;
use crate::error::NotificationError;

pub struct DiscordWebhook {
    client: Client,
    url: Url,
}

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

impl DiscordWebhook {
    pub fn new(url: Url) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }

    pub async fn post(&self, content: &str) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&WebhookMessage { content })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotificationError::Rejected {
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl NotificationSink for DiscordWebhook {
    async fn send(&self, content: &str) -> Result<(), NotificationError> {
        self.post(content).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::{json, Value};
    use warp::{http::StatusCode, Filter};

    use super::*;

    async fn serve(received: Arc<Mutex<Vec<Value>>>) -> Url {
        let accepted = warp::post()
            .and(warp::path!("api" / "webhooks" / "1" / "token"))
            .and(warp::body::json())
            .map(move |body: Value| {
                received.lock().unwrap().push(body);
                warp::reply::with_status(String::new(), StatusCode::NO_CONTENT)
            });
        let throttled = warp::post()
            .and(warp::path!("api" / "webhooks" / "2" / "token"))
            .map(|| {
                warp::reply::with_status("slow down".to_string(), StatusCode::TOO_MANY_REQUESTS)
            });

        let (addr, server) =
            warp::serve(accepted.or(throttled)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        Url::parse(&format!("http://{addr}/api/webhooks/")).unwrap()
    }

    #[tokio::test]
    async fn test_posts_content_as_json() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let base = serve(received.clone()).await;
        let webhook = DiscordWebhook::new(base.join("1/token").unwrap());

        webhook
            .post("Company Handfield Air (HFA) completed a flight!")
            .await
            .unwrap();

        assert_eq!(
            *received.lock().unwrap(),
            vec![json!({ "content": "Company Handfield Air (HFA) completed a flight!" })]
        );
    }

    #[tokio::test]
    async fn test_rate_limited_post_is_rejected() {
        let base = serve(Arc::default()).await;
        let webhook = DiscordWebhook::new(base.join("2/token").unwrap());

        assert!(matches!(
            webhook.send("hello").await,
            Err(NotificationError::Rejected { status: 429 })
        ));
    }
}
