//! Data models for the anti-captcha task protocol.

use crate::error::AntiCaptchaError;
use crate::task::TaskDescriptor;
use serde::{Deserialize, Serialize};

/// Supported captcha variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptchaVariant {
    /// reCAPTCHA v2 checkbox/invisible
    RecaptchaV2,
    /// reCAPTCHA v3 score-based
    RecaptchaV3,
    /// GeeTest v3
    GeeTest,
    /// Image-to-text
    Image,
}

impl CaptchaVariant {
    /// Returns the task type tag used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptchaVariant::RecaptchaV2 => "NoCaptchaTaskProxyless",
            CaptchaVariant::RecaptchaV3 => "RecaptchaV3TaskProxyless",
            CaptchaVariant::GeeTest => "GeeTestTaskProxyless",
            CaptchaVariant::Image => "ImageToTextTask",
        }
    }
}

impl std::fmt::Display for CaptchaVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifier assigned by the service when a task is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Body of `POST /createTask`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest<'a> {
    pub client_key: &'a str,
    pub task: &'a TaskDescriptor,
}

/// Body of `POST /getTaskResult`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResultRequest<'a> {
    pub client_key: &'a str,
    pub task_id: TaskId,
}

/// Error fields carried by every response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStatus {
    /// Missing or null means success
    #[serde(default, deserialize_with = "deserialize_lenient_error_id")]
    pub error_id: i64,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ApiStatus {
    pub fn is_error(&self) -> bool {
        self.error_id != 0
    }

    /// Converts the reported failure into an error value.
    pub fn to_error(&self) -> AntiCaptchaError {
        AntiCaptchaError::Api {
            error_id: self.error_id,
            code: self
                .error_code
                .clone()
                .unwrap_or_else(|| "ERROR_UNKNOWN".into()),
            description: self
                .error_description
                .clone()
                .unwrap_or_else(|| "no description".into()),
        }
    }
}

/// Helper to deserialize an error id that may be null, a string or a float
fn deserialize_lenient_error_id<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct ErrorIdVisitor;

    impl<'de> Visitor<'de> for ErrorIdVisitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("an integer, a numeric string, or null")
        }

        fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(0)
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(0)
        }

        fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(i64::try_from(v).unwrap_or(i64::MAX))
        }

        fn visit_f64<E>(self, v: f64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.fract() == 0.0 && v.is_finite() {
                Ok(v as i64)
            } else {
                Err(E::invalid_value(de::Unexpected::Float(v), &self))
            }
        }

        fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            let v = v.trim();
            if v.is_empty() {
                return Ok(0);
            }
            v.parse()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    deserializer.deserialize_any(ErrorIdVisitor)
}

/// Response from `/createTask`.
///
/// `task_id` stays untyped so that an irregular identifier can be told
/// apart from a missing one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskResponse {
    #[serde(flatten)]
    pub api: ApiStatus,
    #[serde(default)]
    pub task_id: Option<serde_json::Value>,
}

/// Loosely typed response from `/getTaskResult`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResultResponse {
    #[serde(flatten)]
    pub api: ApiStatus,
    /// Left untyped; only the string `"ready"` finishes a task.
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    #[serde(default)]
    pub solution: Option<serde_json::Value>,
}

impl TaskResultResponse {
    /// Classifies the report.
    pub fn status(&self) -> TaskStatus {
        if self.api.is_error() {
            return TaskStatus::Error;
        }
        match self.status.as_ref().and_then(serde_json::Value::as_str) {
            Some("ready") => TaskStatus::Ready,
            _ => TaskStatus::Processing,
        }
    }
}

/// State of a task at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Not yet ready
    Processing,
    /// Solution available
    Ready,
    /// Service reported a failure for this task
    Error,
}

/// Holds the solution variables of a GeeTest solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeeTestSolution {
    pub challenge: String,
    pub validate: String,
    pub seccode: String,
}

/// Typed solution of a finished task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Solution {
    /// reCAPTCHA v2 or v3 response token
    RecaptchaToken { token: String },
    /// GeeTest validation triple
    GeeTest(GeeTestSolution),
    /// Recognised image text
    ImageText { text: String },
}
