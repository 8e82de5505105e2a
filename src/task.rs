//! Task descriptors sent to `/createTask`.
//!
//! Each captcha variant maps to a fixed task type tag and field set. The
//! constructors validate their inputs; serialising a descriptor yields the
//! wire-level `task` object.

use crate::error::{AntiCaptchaError, Result};
use crate::models::CaptchaVariant;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Wire-level description of one captcha task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TaskDescriptor {
    #[serde(rename = "NoCaptchaTaskProxyless", rename_all = "camelCase")]
    RecaptchaV2 {
        #[serde(rename = "websiteURL")]
        website_url: String,
        website_key: String,
    },

    #[serde(rename = "RecaptchaV3TaskProxyless", rename_all = "camelCase")]
    RecaptchaV3 {
        #[serde(rename = "websiteURL")]
        website_url: String,
        website_key: String,
        min_score: f64,
        page_action: String,
    },

    #[serde(rename = "GeeTestTaskProxyless", rename_all = "camelCase")]
    GeeTest {
        #[serde(rename = "websiteURL")]
        website_url: String,
        gt: String,
        challenge: String,
        geetest_api_server_subdomain: String,
    },

    /// `body` holds the base64-encoded image.
    #[serde(rename = "ImageToTextTask")]
    Image { body: String },
}

fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AntiCaptchaError::InvalidInput(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}

impl TaskDescriptor {
    /// reCAPTCHA v2 task for a page and its site key.
    pub fn recaptcha_v2(website_url: impl Into<String>, website_key: impl Into<String>) -> Result<Self> {
        let website_url = website_url.into();
        let website_key = website_key.into();
        required("websiteURL", &website_url)?;
        required("websiteKey", &website_key)?;

        Ok(TaskDescriptor::RecaptchaV2 {
            website_url,
            website_key,
        })
    }

    /// reCAPTCHA v3 task. `min_score` must lie in `(0, 1]`.
    pub fn recaptcha_v3(
        website_url: impl Into<String>,
        website_key: impl Into<String>,
        min_score: f64,
        page_action: impl Into<String>,
    ) -> Result<Self> {
        let website_url = website_url.into();
        let website_key = website_key.into();
        let page_action = page_action.into();
        required("websiteURL", &website_url)?;
        required("websiteKey", &website_key)?;
        required("pageAction", &page_action)?;
        if !(min_score > 0.0 && min_score <= 1.0) {
            return Err(AntiCaptchaError::InvalidInput(format!(
                "minScore must be in (0, 1], got {}",
                min_score
            )));
        }

        Ok(TaskDescriptor::RecaptchaV3 {
            website_url,
            website_key,
            min_score,
            page_action,
        })
    }

    /// GeeTest task. The API server subdomain may be empty when the site
    /// uses the default GeeTest host.
    pub fn geetest(
        website_url: impl Into<String>,
        gt: impl Into<String>,
        challenge: impl Into<String>,
        api_server_subdomain: impl Into<String>,
    ) -> Result<Self> {
        let website_url = website_url.into();
        let gt = gt.into();
        let challenge = challenge.into();
        required("websiteURL", &website_url)?;
        required("gt", &gt)?;
        required("challenge", &challenge)?;

        Ok(TaskDescriptor::GeeTest {
            website_url,
            gt,
            challenge,
            geetest_api_server_subdomain: api_server_subdomain.into(),
        })
    }

    /// Image-to-text task from an already base64-encoded image.
    pub fn image(base64_image: impl Into<String>) -> Result<Self> {
        let body = base64_image.into();
        required("body", &body)?;
        Ok(TaskDescriptor::Image { body })
    }

    /// Image-to-text task from raw image bytes.
    pub fn image_bytes(image: &[u8]) -> Result<Self> {
        if image.is_empty() {
            return Err(AntiCaptchaError::InvalidInput("image must not be empty".into()));
        }
        Ok(TaskDescriptor::Image {
            body: STANDARD.encode(image),
        })
    }

    /// The captcha variant this task solves.
    pub fn variant(&self) -> CaptchaVariant {
        match self {
            TaskDescriptor::RecaptchaV2 { .. } => CaptchaVariant::RecaptchaV2,
            TaskDescriptor::RecaptchaV3 { .. } => CaptchaVariant::RecaptchaV3,
            TaskDescriptor::GeeTest { .. } => CaptchaVariant::GeeTest,
            TaskDescriptor::Image { .. } => CaptchaVariant::Image,
        }
    }
}
