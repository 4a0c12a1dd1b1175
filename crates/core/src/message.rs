//! SMS alert records for `POST /api/messages/sns/alert`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct SmsAlertRequest {
    pub message: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SmsAlertResponse {
    #[serde(default)]
    pub topic_message_id: String,
    #[serde(default)]
    pub sms_message_id: String,
}
