//! Reqwest-backed Expo push transport adapter.
//!
//! Owns transport details only: message serialisation, the optional access
//! token, HTTP error mapping, and ticket decoding back into per-message
//! outcomes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domain::ports::{PushMessage, PushOutcome, PushTransport, PushTransportError};

/// Expo caps one send request at 100 messages.
const EXPO_BATCH_LIMIT: usize = 100;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Push transport speaking the Expo push HTTP API.
pub struct ExpoPushTransport {
    client: Client,
    endpoint: Url,
    access_token: Option<String>,
}

impl ExpoPushTransport {
    /// Build the transport; `access_token` is required for production Expo
    /// projects and optional for development builds.
    pub fn new(endpoint: Url, access_token: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint,
            access_token,
        })
    }

    async fn send_chunk(
        &self,
        chunk: &[PushMessage],
    ) -> Result<Vec<PushOutcome>, PushTransportError> {
        let payload: Vec<ExpoPushMessageDto<'_>> =
            chunk.iter().map(ExpoPushMessageDto::from).collect();
        let mut request = self.client.post(self.endpoint.clone()).json(&payload);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| PushTransportError::transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| PushTransportError::transport(err.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let decoded: ExpoPushResponseDto = serde_json::from_slice(body.as_ref())
            .map_err(|err| PushTransportError::rejected(format!("undecodable response: {err}")))?;
        if decoded.data.len() != chunk.len() {
            return Err(PushTransportError::rejected(format!(
                "expected {} tickets, got {}",
                chunk.len(),
                decoded.data.len()
            )));
        }

        Ok(decoded
            .data
            .into_iter()
            .map(|ticket| ticket.into_outcome())
            .collect())
    }
}

#[async_trait]
impl PushTransport for ExpoPushTransport {
    async fn send(
        &self,
        batch: Vec<PushMessage>,
    ) -> Result<Vec<PushOutcome>, PushTransportError> {
        let mut outcomes = Vec::with_capacity(batch.len());
        for chunk in batch.chunks(EXPO_BATCH_LIMIT) {
            outcomes.extend(self.send_chunk(chunk).await?);
        }
        Ok(outcomes)
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PushTransportError {
    let body_text = String::from_utf8_lossy(body);
    if status.is_server_error() {
        PushTransportError::transport(format!("endpoint returned {status}"))
    } else {
        PushTransportError::rejected(format!("endpoint returned {status}: {body_text}"))
    }
}

#[derive(Debug, Serialize)]
struct ExpoPushMessageDto<'a> {
    to: &'a str,
    sound: &'a str,
    title: &'a str,
    body: &'a str,
    data: &'a Value,
}

impl<'a> From<&'a PushMessage> for ExpoPushMessageDto<'a> {
    fn from(message: &'a PushMessage) -> Self {
        Self {
            to: &message.target,
            sound: "default",
            title: &message.title,
            body: &message.body,
            data: &message.data,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExpoPushResponseDto {
    data: Vec<ExpoTicketDto>,
}

#[derive(Debug, Deserialize)]
struct ExpoTicketDto {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

impl ExpoTicketDto {
    fn into_outcome(self) -> PushOutcome {
        if self.status == "ok" {
            PushOutcome::Accepted
        } else {
            if let Some(message) = &self.message {
                warn!(%message, "push ticket rejected");
            }
            PushOutcome::Rejected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serialises_in_expo_shape() {
        let message = PushMessage::new_shift_alert("ExponentPushToken[x]".to_owned(), 7, "Cover");
        let dto = ExpoPushMessageDto::from(&message);
        let json = serde_json::to_value(&dto).expect("serialises");
        assert_eq!(json["to"], "ExponentPushToken[x]");
        assert_eq!(json["sound"], "default");
        assert_eq!(json["data"]["shiftId"], 7);
        assert_eq!(json["data"]["screen"], "Home");
    }

    #[test]
    fn tickets_decode_into_outcomes() {
        let body = br#"{"data":[{"status":"ok"},{"status":"error","message":"DeviceNotRegistered"}]}"#;
        let decoded: ExpoPushResponseDto = serde_json::from_slice(body).expect("decodes");
        let outcomes: Vec<PushOutcome> = decoded
            .data
            .into_iter()
            .map(ExpoTicketDto::into_outcome)
            .collect();
        assert_eq!(outcomes, vec![PushOutcome::Accepted, PushOutcome::Rejected]);
    }

    #[test]
    fn server_errors_map_to_transport_failures() {
        let error = map_status_error(StatusCode::BAD_GATEWAY, b"upstream down");
        assert!(matches!(error, PushTransportError::Transport { .. }));

        let error = map_status_error(StatusCode::UNPROCESSABLE_ENTITY, b"bad token");
        assert!(matches!(error, PushTransportError::Rejected { .. }));
    }
}
