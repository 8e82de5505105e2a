//! # anti-captcha
//!
//! An async Rust client for the [anti-captcha](https://anti-captcha.com) task queue.
//!
//! ## Features
//!
//! - **Multiple Captcha Types**: reCAPTCHA v2, reCAPTCHA v3, GeeTest and image-to-text.
//! - **Typed Results**: Solutions are validated and decoded per variant; a malformed
//!   payload is an error, never a panic.
//! - **Deadlines and Cancellation**: Every call takes a timeout (or an explicit
//!   [`Timeout::Never`]) and can be aborted with a `CancellationToken`.
//! - **Proxy Support**: HTTP and SOCKS5 proxies for reaching the API.
//! - **Async/Await**: Built on Tokio; one client can run many solves concurrently.
//!
//! ## Quick Start
//!
//! ```ignore
//! use anticaptcha::AntiCaptcha;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = AntiCaptcha::new("your_client_key")?;
//!
//!     let token = client
//!         .send_recaptcha_v2("https://example.com/login", "6Le-site-key", Duration::from_secs(120))
//!         .await?;
//!     println!("g-recaptcha-response: {}", token);
//!
//!     let solution = client
//!         .send_geetest("https://example.com", "gt", "challenge", "", Duration::from_secs(120))
//!         .await?;
//!     println!("seccode: {}", solution.seccode);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Polling
//!
//! After a task is created the client waits 10 seconds, then asks for the result
//! every 2 seconds. Both intervals can be changed on the builder:
//!
//! ```ignore
//! let client = AntiCaptcha::builder("your_client_key")
//!     .initial_delay(Duration::from_secs(5))
//!     .poll_interval(Duration::from_secs(1))
//!     .proxy("socks5://127.0.0.1:1080")
//!     .build()?;
//! ```

#![allow(missing_docs)]

pub mod client;
pub mod decode;
pub mod error;
#[cfg(feature = "ffi")]
pub mod ffi;
pub mod gateway;
pub mod models;
pub mod poller;
pub mod task;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use client::{AntiCaptcha, AntiCaptchaBuilder};
pub use error::{AntiCaptchaError, Result};
pub use models::{CaptchaVariant, GeeTestSolution, Solution, TaskId, TaskStatus};
pub use poller::{PollConfig, Timeout};
pub use task::TaskDescriptor;
pub use tokio_util::sync::CancellationToken;
