use std::sync::Arc;

use sentinel_core::message::{SmsAlertRequest, SmsAlertResponse};

use crate::http::{ApiClient, ApiError};

const BASE_PATH: &str = "/api/messages";

pub struct MessageService {
    http: Arc<ApiClient>,
}

impl MessageService {
    pub fn new(http: Arc<ApiClient>) -> Self {
        Self { http }
    }

    /// Send an SMS alert through the backend's notification topic.
    ///
    /// An answer without a topic message id means nothing was sent.
    pub async fn send_sms_alert(
        &self,
        message: &str,
        phone_number: &str,
    ) -> Result<SmsAlertResponse, ApiError> {
        let payload = SmsAlertRequest {
            message: message.to_string(),
            phone_number: phone_number.to_string(),
        };
        let resp: Option<SmsAlertResponse> = self
            .http
            .post(&format!("{BASE_PATH}/sns/alert"), &payload, false)
            .await?;

        match resp {
            Some(r) if !r.topic_message_id.is_empty() => Ok(r),
            _ => Err(ApiError::EmptyResponse("topic message id")),
        }
    }
}
