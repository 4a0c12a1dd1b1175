//! Commands for the stream server's `POST /control/camera` endpoint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraAction {
    Start,
    Stop,
    EnableInference,
    DisableInference,
}

impl CameraAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::EnableInference => "enable_inference",
            Self::DisableInference => "disable_inference",
        }
    }
}

impl fmt::Display for CameraAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CameraAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "enable_inference" => Ok(Self::EnableInference),
            "disable_inference" => Ok(Self::DisableInference),
            other => Err(CoreError::Validation(format!("unknown camera action '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CameraControlRequest {
    pub camera_id: String,
    pub action: CameraAction,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CameraControlResponse {
    pub status: String,
    pub camera_id: String,
    /// Echo of the action; the server may answer with values outside
    /// [`CameraAction`], so this stays a string.
    pub action_processed: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_serializes_snake_case() {
        let req = CameraControlRequest {
            camera_id: "7".into(),
            action: CameraAction::EnableInference,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"camera_id":"7","action":"enable_inference"}"#);
    }

    #[test]
    fn parse_rejects_unknown_action() {
        assert_eq!("stop".parse::<CameraAction>().unwrap(), CameraAction::Stop);
        assert!("reboot".parse::<CameraAction>().is_err());
    }
}
