//! Pilotar: fail-fast workflow validation for browser-driven portals
//!
//! Pilotar (Spanish: "to pilot") runs declarative UI workflows against a
//! browser session: every step resolves its target with a bounded polling
//! wait, performs a native interaction with an optional scripted fallback,
//! and then waits on an explicit post-condition. The first step that cannot
//! complete aborts the run with the step index, the phase, and a typed
//! reason, so a latency problem (timeout) is never confused with wrong
//! application state (assertion mismatch).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      PILOTAR Architecture                        │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌───────────┐   ┌─────────────┐   ┌───────────┐  │
//! │  │ Workflow │──►│ Locator   │──►│ Interaction │──►│ Post-     │  │
//! │  │ (steps)  │   │ + Wait    │   │ + fallback  │   │ condition │  │
//! │  └──────────┘   └───────────┘   └─────────────┘   └───────────┘  │
//! │        every call through one exclusively owned Session          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use pilotar::{flows, Credentials, MockPage, RunReport, Session, WaitOptions};
//!
//! let credentials = Credentials::new(
//!     "https://portal.test/login",
//!     "qa@example.com",
//!     "hunter2",
//!     "first pet",
//! );
//! let mut session = Session::new(MockPage::new());
//! session.navigate(&credentials.endpoint)?;
//!
//! let login = flows::authentication(&credentials)
//!     .with_waits(WaitOptions::new().with_timeout_ms(50).with_poll_interval_ms(5));
//! let report = RunReport::capture(&login, session);
//!
//! // Nothing is staged on the empty page, so the identity field never
//! // appears and the run fails fast at step 0.
//! assert!(!report.passed);
//! # Ok::<(), pilotar::PilotarError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown
)]
mod config;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown
)]
mod driver;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown
)]
mod flow;

#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown
)]
pub mod flows;

#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown
)]
mod interaction;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown
)]
mod locator;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown
)]
mod report;
mod result;
#[allow(clippy::missing_const_for_fn, clippy::doc_markdown)]
mod selector;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn
)]
mod session;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown
)]
mod step;
#[allow(clippy::missing_errors_doc, clippy::doc_markdown)]
mod wait;

pub use config::Credentials;
pub use driver::{ElementHandle, MockElement, MockPage, PageDriver, PageEffect, PageSnapshot};
pub use flow::{StepPhase, Workflow, WorkflowResult};
pub use flows::{authentication, claim_intake, insured_search, SearchQuery};
pub use interaction::{Action, Fallback, Interaction, ReadTarget};
pub use locator::Locator;
pub use report::{FailureReport, RunReport, StepReport};
pub use result::{PilotarError, PilotarResult};
pub use selector::{Readiness, Selector};
pub use session::Session;
pub use step::{LocationMatch, PostCheck, PostCondition, Step};
pub use wait::{Wait, WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};

/// Convenience re-exports for workflow authors
pub mod prelude {
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::flow::*;
    pub use super::flows::*;
    pub use super::interaction::*;
    pub use super::locator::*;
    pub use super::report::*;
    pub use super::result::*;
    pub use super::selector::*;
    pub use super::session::*;
    pub use super::step::*;
    pub use super::wait::*;
}
