//! Layered element interaction.
//!
//! The primary path is always the native driver event. When the primary is
//! not viable (the element is obscured or the native event is intercepted)
//! and the interaction declares a fallback, the same semantic event is
//! dispatched through `execute_script` exactly once. Two failures surface as
//! one [`PilotarError::Interaction`] carrying both messages. Faults never
//! engage the fallback.

use crate::driver::{ElementHandle, PageDriver};
use crate::result::{PilotarError, PilotarResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Script dispatching a click on `arguments[0]`
pub const SCRIPT_CLICK: &str = "arguments[0].click();";

/// Script scrolling `arguments[0]` into view
pub const SCRIPT_SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView(true);";

/// Scripted dispatch mode for a fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fallback {
    /// Dispatch the same semantic event through a script
    Scripted,
    /// Scroll the element into view first, then dispatch through a script
    ScrollThenScripted,
}

/// What a read action observes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadTarget {
    /// The element's visible text
    Text,
    /// A named attribute
    Attribute(String),
}

/// Primary action performed against a located element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Native click
    Click,
    /// Replace the element's content with the given text
    Fill(String),
    /// Read from the element
    Read(ReadTarget),
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Fill(_) => "fill",
            Self::Read(_) => "read",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An action plus its optional scripted fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    action: Action,
    fallback: Option<Fallback>,
}

impl Interaction {
    /// Native click, no fallback
    #[must_use]
    pub fn click() -> Self {
        Self {
            action: Action::Click,
            fallback: None,
        }
    }

    /// Replace the element's content, no fallback
    #[must_use]
    pub fn fill(text: impl Into<String>) -> Self {
        Self {
            action: Action::Fill(text.into()),
            fallback: None,
        }
    }

    /// Read the element's visible text
    #[must_use]
    pub fn read_text() -> Self {
        Self {
            action: Action::Read(ReadTarget::Text),
            fallback: None,
        }
    }

    /// Read a named attribute
    #[must_use]
    pub fn read_attribute(name: impl Into<String>) -> Self {
        Self {
            action: Action::Read(ReadTarget::Attribute(name.into())),
            fallback: None,
        }
    }

    /// Declare a scripted fallback. Reads have no scripted equivalent and
    /// ignore it.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// The primary action
    #[must_use]
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// The declared fallback, if any
    #[must_use]
    pub fn fallback(&self) -> Option<Fallback> {
        self.fallback
    }

    /// Perform against the handle. Read actions yield the observed string;
    /// click and fill yield `None`.
    pub fn perform<D: PageDriver>(
        &self,
        driver: &mut D,
        handle: &ElementHandle,
    ) -> PilotarResult<Option<String>> {
        match self.primary(driver, handle) {
            Ok(observed) => Ok(observed),
            Err(e) if e.is_fault() => Err(e),
            Err(primary_err) => {
                let script = self.fallback.and_then(|fb| self.fallback_script(fb));
                match script {
                    None => Err(primary_err),
                    Some((scroll_first, script)) => {
                        debug!(
                            action = %self.action,
                            element = %handle,
                            error = %primary_err,
                            "primary interaction not viable, dispatching scripted fallback"
                        );
                        match self.dispatch(driver, handle, scroll_first, &script) {
                            Ok(()) => Ok(None),
                            Err(e) if e.is_fault() => Err(e),
                            Err(fallback_err) => Err(PilotarError::Interaction {
                                action: self.action.name().to_string(),
                                selector: handle.located_by.clone(),
                                message: format!(
                                    "primary failed ({primary_err}); scripted fallback failed ({fallback_err})"
                                ),
                            }),
                        }
                    }
                }
            }
        }
    }

    fn primary<D: PageDriver>(
        &self,
        driver: &mut D,
        handle: &ElementHandle,
    ) -> PilotarResult<Option<String>> {
        match &self.action {
            Action::Click => driver.click(handle).map(|()| None),
            Action::Fill(text) => driver.fill(handle, text).map(|()| None),
            Action::Read(ReadTarget::Text) => driver.read_text(handle).map(Some),
            Action::Read(ReadTarget::Attribute(name)) => driver
                .read_attribute(handle, name)
                .map(|v| Some(v.unwrap_or_default())),
        }
    }

    fn fallback_script(&self, fallback: Fallback) -> Option<(bool, String)> {
        let script = match &self.action {
            Action::Click => SCRIPT_CLICK.to_string(),
            Action::Fill(text) => format!(
                "arguments[0].value = {}; arguments[0].dispatchEvent(new Event('input', {{ bubbles: true }}));",
                js_string_literal(text)
            ),
            Action::Read(_) => return None,
        };
        Some((matches!(fallback, Fallback::ScrollThenScripted), script))
    }

    fn dispatch<D: PageDriver>(
        &self,
        driver: &mut D,
        handle: &ElementHandle,
        scroll_first: bool,
        script: &str,
    ) -> PilotarResult<()> {
        if scroll_first {
            driver.execute_script(SCRIPT_SCROLL_INTO_VIEW, Some(handle))?;
        }
        driver.execute_script(script, Some(handle))?;
        Ok(())
    }
}

fn js_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
