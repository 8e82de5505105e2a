//! Typed decoding of finished task results.

use crate::error::{AntiCaptchaError, Result};
use crate::models::{CaptchaVariant, GeeTestSolution, Solution, TaskResultResponse};
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Deserialize)]
struct RecaptchaPayload {
    #[serde(rename = "gRecaptchaResponse")]
    g_recaptcha_response: String,
}

#[derive(Deserialize)]
struct ImagePayload {
    text: String,
}

fn payload<P: DeserializeOwned>(variant: CaptchaVariant, solution: &serde_json::Value) -> Result<P> {
    P::deserialize(solution).map_err(|e| AntiCaptchaError::MalformedResult {
        variant,
        message: e.to_string(),
    })
}

/// Extract the solution of a `ready` response for `variant`.
pub fn decode(variant: CaptchaVariant, response: &TaskResultResponse) -> Result<Solution> {
    let solution = response
        .solution
        .as_ref()
        .ok_or_else(|| AntiCaptchaError::MalformedResult {
            variant,
            message: "missing solution".into(),
        })?;

    match variant {
        CaptchaVariant::RecaptchaV2 | CaptchaVariant::RecaptchaV3 => {
            let p: RecaptchaPayload = payload(variant, solution)?;
            Ok(Solution::RecaptchaToken {
                token: p.g_recaptcha_response,
            })
        }
        CaptchaVariant::GeeTest => Ok(Solution::GeeTest(payload::<GeeTestSolution>(
            variant, solution,
        )?)),
        CaptchaVariant::Image => {
            let p: ImagePayload = payload(variant, solution)?;
            Ok(Solution::ImageText { text: p.text })
        }
    }
}
