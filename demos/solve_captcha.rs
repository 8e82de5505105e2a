//! Example: Solving a reCAPTCHA v2 and an image captcha.
//!
//! Run with: ANTICAPTCHA_API_KEY=... cargo run --example solve_captcha [image.png]

use anticaptcha::AntiCaptcha;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for debug output (optional)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let client = AntiCaptcha::from_env()?;

    // Google's public reCAPTCHA v2 demo page
    println!("\n=== Solving reCAPTCHA v2 ===");
    match client
        .send_recaptcha_v2(
            "https://www.google.com/recaptcha/api2/demo",
            "6Le-wvkSAAAAAPBMRTvw0Q4Muexq9bi0DJwx_mJ-",
            Duration::from_secs(180),
        )
        .await
    {
        Ok(token) => println!("Success!\n  token: {}...", &token[..50.min(token.len())]),
        Err(e) => println!("Failed: {}", e),
    }

    if let Some(path) = std::env::args().nth(1) {
        println!("\n=== Solving image captcha {} ===", path);
        let image = std::fs::read(&path)?;
        match client
            .send_image_bytes(&image, Duration::from_secs(60))
            .await
        {
            Ok(text) => println!("Success!\n  text: {}", text),
            Err(e) if e.is_timeout() => println!("Gave up waiting: {}", e),
            Err(e) => println!("Failed: {}", e),
        }
    }

    Ok(())
}
