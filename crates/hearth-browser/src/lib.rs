//! Hearth Browser - resilient automated session driving.
//!
//! This crate provides the session-step model and driver used by every
//! enrichment worker: ordered flows of navigate/locate/type/click/wait
//! actions with selector-fallback resolution, bounded per-step timeouts,
//! and best-effort consent-banner dismissal. The browser itself sits behind
//! the [`SessionSurface`] capability trait; production code uses the
//! chromiumoxide-backed [`engine::BrowserEngine`], tests use
//! [`testing::FakeSurface`].
//!
//! # Example
//!
//! ```rust,ignore
//! use hearth_browser::{BrowserEngine, SelectorChain, SessionDriver, SessionStep};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let engine = BrowserEngine::launch(&config).await?;
//! let session = Arc::new(engine.new_session().await?);
//! let driver = SessionDriver::new(session, Duration::from_secs(30));
//! driver
//!     .run(&[
//!         SessionStep::Navigate { url: "https://portal.example.com".into() },
//!         SessionStep::DismissConsent,
//!         SessionStep::Type {
//!             target: SelectorChain::new(["input[placeholder*='address' i]", "input[type='text']"]),
//!             text: "123 Main St".into(),
//!         },
//!     ])
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod consent;
pub mod engine;
pub mod error;
pub mod session;
pub mod surface;
pub mod testing;

pub use consent::{dismiss_consent, ConsentRules};
pub use engine::{BrowserEngine, ChromiumSession};
pub use error::{BrowserError, Result};
pub use session::{SelectorChain, SessionDriver, SessionStep};
pub use surface::SessionSurface;
