// SendGrid v3 mail client - the one external email provider we speak to

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

use crate::core::errors::VerifyError;
use crate::core::traits::Notifier;

const SENDGRID_API_URL: &str = "https://api.sendgrid.com";

#[derive(Debug, Serialize)]
struct EmailAddress {
    email: String,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<EmailAddress>,
}

#[derive(Debug, Serialize)]
struct MailContent {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct SendMailBody {
    personalizations: Vec<Personalization>,
    from: EmailAddress,
    subject: String,
    content: Vec<MailContent>,
}

/// HTTP client for the SendGrid transactional mail API.
///
/// One attempt per send; provider failures surface as
/// [`VerifyError::Provider`] and are never retried here.
pub struct SendGridClient {
    client: Client,
    api_key: String,
    sender_email: String,
    base_url: String,
}

impl SendGridClient {
    pub fn new(api_key: String, sender_email: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            sender_email,
            base_url: SENDGRID_API_URL.to_string(),
        }
    }

    /// Point the client at a different API host (used by tests).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait::async_trait]
impl Notifier for SendGridClient {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), VerifyError> {
        let body = SendMailBody {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: to.to_string(),
                }],
            }],
            from: EmailAddress {
                email: self.sender_email.clone(),
            },
            subject: subject.to_string(),
            content: vec![MailContent {
                content_type: "text/html".to_string(),
                value: html_body.to_string(),
            }],
        };

        let url = format!("{}/v3/mail/send", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VerifyError::Provider(format!("SendGrid request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!(status = %status, body = %text, "SendGrid rejected the message");
            return Err(VerifyError::Provider(format!(
                "SendGrid HTTP error: {}",
                status
            )));
        }

        info!(to = %to, "Email dispatched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_posts_v3_mail_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v3/mail/send")
            .match_header("authorization", "Bearer SG.test-key")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "from": { "email": "contact@yeklabs.com" },
                "subject": "MedipolDAO Authentication Code",
                "personalizations": [
                    { "to": [ { "email": "a@std.medipol.edu.tr" } ] }
                ],
            })))
            .with_status(202)
            .create_async()
            .await;

        let client = SendGridClient::new(
            "SG.test-key".to_string(),
            "contact@yeklabs.com".to_string(),
        )
        .with_base_url(server.url());

        client
            .send(
                "a@std.medipol.edu.tr",
                "MedipolDAO Authentication Code",
                "<h1>Auth Code: <b>123456</b></h1>",
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_provider_rejection_maps_to_provider_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v3/mail/send")
            .with_status(401)
            .with_body(r#"{"errors":[{"message":"invalid key"}]}"#)
            .create_async()
            .await;

        let client = SendGridClient::new("bad".to_string(), "contact@yeklabs.com".to_string())
            .with_base_url(server.url());

        let err = client.send("a@std.medipol.edu.tr", "s", "b").await.unwrap_err();
        assert!(matches!(err, VerifyError::Provider(_)));
        // Provider internals stay out of the client-facing message
        assert_eq!(err.user_message(), "Email was not sent.");
    }
}
