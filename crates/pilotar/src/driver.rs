//! Browser-control boundary.
//!
//! The engine never talks to a browser directly; it drives a [`PageDriver`],
//! the synchronous trait an adapter implements on top of whatever remote
//! protocol it speaks. Every method takes `&mut self`: waits against one
//! driver are serialized by construction, never concurrent.
//!
//! [`MockPage`] is an in-memory scripted implementation used by this crate's
//! tests and available to downstream users for theirs. It records every call
//! and can stage elements that appear, become visible, or become enabled only
//! after a number of probes, which is how asynchronously updating pages are
//! simulated without a browser.

use crate::result::{PilotarError, PilotarResult};
use crate::selector::Selector;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::SystemTime;
use uuid::Uuid;

/// Concrete reference to an element resolved on the live page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-assigned opaque id
    pub id: String,
    /// Tag name of the element
    pub tag_name: String,
    /// Description of the selector that resolved this handle
    pub located_by: String,
}

impl ElementHandle {
    /// Create a new handle
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        tag_name: impl Into<String>,
        located_by: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            located_by: located_by.into(),
        }
    }
}

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{} {}>", self.tag_name, self.located_by)
    }
}

/// Page state captured for failure diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Location at capture time
    pub url: String,
    /// Page source at capture time
    pub source: String,
    /// Capture timestamp
    pub captured_at: SystemTime,
}

/// Synchronous browser-control operations the engine depends on.
///
/// `find` distinguishes "nothing matches" (`Ok(None)`) from a broken driver
/// (`Err`). Interaction-level refusals (intercepted click, stale handle)
/// surface as [`PilotarError::Interaction`]; a lost connection or protocol
/// breakdown surfaces as [`PilotarError::Fault`] and aborts the run.
pub trait PageDriver {
    /// Navigate to a URL
    fn navigate(&mut self, url: &str) -> PilotarResult<()>;

    /// Resolve a selector to a handle, or `None` when nothing matches
    fn find(&mut self, selector: &Selector) -> PilotarResult<Option<ElementHandle>>;

    /// Whether the element is rendered and displayed
    fn is_displayed(&mut self, element: &ElementHandle) -> PilotarResult<bool>;

    /// Whether the element accepts input
    fn is_enabled(&mut self, element: &ElementHandle) -> PilotarResult<bool>;

    /// Native click
    fn click(&mut self, element: &ElementHandle) -> PilotarResult<()>;

    /// Replace the element's content with `text`
    fn fill(&mut self, element: &ElementHandle, text: &str) -> PilotarResult<()>;

    /// Read the element's visible text
    fn read_text(&mut self, element: &ElementHandle) -> PilotarResult<String>;

    /// Read an attribute, `None` when the attribute is absent
    fn read_attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> PilotarResult<Option<String>>;

    /// Execute a script, optionally passing an element as `arguments[0]`
    fn execute_script(
        &mut self,
        script: &str,
        target: Option<&ElementHandle>,
    ) -> PilotarResult<Value>;

    /// Current navigated location
    fn current_url(&mut self) -> PilotarResult<String>;

    /// Capture the page for diagnostics
    fn snapshot(&mut self) -> PilotarResult<PageSnapshot>;

    /// Release the underlying browser connection
    fn close(&mut self) -> PilotarResult<()>;
}

// ============================================================================
// MOCK PAGE
// ============================================================================

/// Scripted state change applied when an element is clicked
#[derive(Debug, Clone)]
pub enum PageEffect {
    /// Change the current location, visible after `after_polls` url reads
    SetUrl {
        /// New location
        url: String,
        /// Url reads before the change is observable (0 = immediate)
        after_polls: u32,
    },
    /// Set the `value` attribute of another element, visible after
    /// `after_reads` attribute reads (0 = immediate)
    SetValue {
        /// Target element query (see [`Selector::to_query`])
        query: String,
        /// Value to set
        value: String,
        /// Attribute reads before the value is observable
        after_reads: u32,
    },
    /// Replace the visible text of another element
    SetText {
        /// Target element query
        query: String,
        /// New text
        text: String,
    },
    /// Make another element report enabled
    Enable {
        /// Target element query
        query: String,
    },
    /// Make another element report displayed
    Show {
        /// Target element query
        query: String,
    },
}

/// A staged element inside a [`MockPage`]
#[derive(Debug, Clone)]
pub struct MockElement {
    id: String,
    tag_name: String,
    text: String,
    attributes: HashMap<String, String>,
    displayed: bool,
    enabled: bool,
    native_click_viable: bool,
    appears_after: u32,
    displayed_after: u32,
    enabled_after: u32,
    value_after_reads: Option<(String, u32)>,
    on_click: Vec<PageEffect>,
}

impl MockElement {
    /// Create a staged element with the given tag, displayed and enabled
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            id: format!("el-{}", Uuid::new_v4()),
            tag_name: tag_name.into(),
            text: String::new(),
            attributes: HashMap::new(),
            displayed: true,
            enabled: true,
            native_click_viable: true,
            appears_after: 0,
            displayed_after: 0,
            enabled_after: 0,
            value_after_reads: None,
            on_click: Vec::new(),
        }
    }

    /// Set the visible text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Report not displayed
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Report not enabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Refuse native clicks with an intercepted-click error; scripted
    /// dispatch still succeeds
    #[must_use]
    pub fn intercepted(mut self) -> Self {
        self.native_click_viable = false;
        self
    }

    /// Stay unresolved for the first `n` find calls
    #[must_use]
    pub fn appears_after(mut self, n: u32) -> Self {
        self.appears_after = n;
        self
    }

    /// Report not displayed for the first `n` visibility checks
    #[must_use]
    pub fn displayed_after(mut self, n: u32) -> Self {
        self.displayed_after = n;
        self
    }

    /// Report not enabled for the first `n` enablement checks
    #[must_use]
    pub fn enabled_after(mut self, n: u32) -> Self {
        self.enabled_after = n;
        self
    }

    /// Expose a `value` attribute only after `n` attribute reads
    #[must_use]
    pub fn value_after_reads(mut self, value: impl Into<String>, n: u32) -> Self {
        self.value_after_reads = Some((value.into(), n));
        self
    }

    /// Stage a state change applied when this element is clicked
    #[must_use]
    pub fn on_click(mut self, effect: PageEffect) -> Self {
        self.on_click.push(effect);
        self
    }

    fn handle(&self, located_by: &str) -> ElementHandle {
        ElementHandle::new(self.id.clone(), self.tag_name.clone(), located_by)
    }
}

/// In-memory scripted page for tests.
///
/// Elements are keyed by their selector query. Every driver call is recorded
/// in the call history, queryable via [`MockPage::was_called`].
#[derive(Debug, Default)]
pub struct MockPage {
    url: String,
    pending_url: Option<(String, u32)>,
    source: String,
    elements: HashMap<String, MockElement>,
    script_results: HashMap<String, Value>,
    find_counts: HashMap<String, u32>,
    call_history: Vec<String>,
    severed: bool,
    closed: bool,
}

impl MockPage {
    /// Create an empty page at `about:blank`
    #[must_use]
    pub fn new() -> Self {
        Self {
            url: "about:blank".to_string(),
            source: "<html><body></body></html>".to_string(),
            ..Self::default()
        }
    }

    /// Stage an element under the given selector
    #[must_use]
    pub fn with_element(mut self, selector: &Selector, element: MockElement) -> Self {
        self.elements.insert(selector.to_query(), element);
        self
    }

    /// Stage a canned result for a script
    #[must_use]
    pub fn with_script_result(mut self, script: impl Into<String>, result: Value) -> Self {
        self.script_results.insert(script.into(), result);
        self
    }

    /// Set the page source returned in snapshots
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Simulate a lost browser connection: every subsequent call faults
    pub fn sever_connection(&mut self) {
        self.severed = true;
    }

    /// Whether a call starting with `method` was recorded
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }

    /// Number of recorded calls starting with `prefix`
    #[must_use]
    pub fn calls_matching(&self, prefix: &str) -> usize {
        self.call_history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Full call history
    #[must_use]
    pub fn call_history(&self) -> &[String] {
        &self.call_history
    }

    /// Whether `close` was invoked
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn record(&mut self, call: String) {
        self.call_history.push(call);
    }

    fn guard(&self) -> PilotarResult<()> {
        if self.severed {
            return Err(PilotarError::Fault {
                message: "browser connection lost".to_string(),
            });
        }
        Ok(())
    }

    fn query_of(&self, element: &ElementHandle) -> PilotarResult<String> {
        self.elements
            .iter()
            .find(|(_, el)| el.id == element.id)
            .map(|(query, _)| query.clone())
            .ok_or_else(|| PilotarError::Fault {
                message: format!("unknown element handle: {}", element.id),
            })
    }

    fn apply_effect(&mut self, effect: &PageEffect) {
        match effect {
            PageEffect::SetUrl { url, after_polls } => {
                if *after_polls == 0 {
                    self.url = url.clone();
                } else {
                    self.pending_url = Some((url.clone(), *after_polls));
                }
            }
            PageEffect::SetValue {
                query,
                value,
                after_reads,
            } => {
                if let Some(el) = self.elements.get_mut(query) {
                    if *after_reads == 0 {
                        el.attributes.insert("value".to_string(), value.clone());
                    } else {
                        el.value_after_reads = Some((value.clone(), *after_reads));
                    }
                }
            }
            PageEffect::SetText { query, text } => {
                if let Some(el) = self.elements.get_mut(query) {
                    el.text = text.clone();
                }
            }
            PageEffect::Enable { query } => {
                if let Some(el) = self.elements.get_mut(query) {
                    el.enabled = true;
                    el.enabled_after = 0;
                }
            }
            PageEffect::Show { query } => {
                if let Some(el) = self.elements.get_mut(query) {
                    el.displayed = true;
                    el.displayed_after = 0;
                }
            }
        }
    }

    fn dispatch_click(&mut self, element: &ElementHandle) -> PilotarResult<()> {
        let query = self.query_of(element)?;
        let effects = self
            .elements
            .get(&query)
            .map(|el| el.on_click.clone())
            .unwrap_or_default();
        for effect in &effects {
            self.apply_effect(effect);
        }
        Ok(())
    }
}

impl PageDriver for MockPage {
    fn navigate(&mut self, url: &str) -> PilotarResult<()> {
        self.guard()?;
        self.record(format!("navigate:{url}"));
        self.url = url.to_string();
        self.pending_url = None;
        Ok(())
    }

    fn find(&mut self, selector: &Selector) -> PilotarResult<Option<ElementHandle>> {
        self.guard()?;
        let query = selector.to_query();
        self.record(format!("find:{query}"));
        let seen = self.find_counts.entry(query.clone()).or_insert(0);
        *seen += 1;
        let seen = *seen;
        match self.elements.get(&query) {
            Some(el) if seen > el.appears_after => Ok(Some(el.handle(&selector.to_string()))),
            _ => Ok(None),
        }
    }

    fn is_displayed(&mut self, element: &ElementHandle) -> PilotarResult<bool> {
        self.guard()?;
        self.record(format!("is_displayed:{}", element.id));
        let query = self.query_of(element)?;
        let el = self.elements.get_mut(&query).ok_or_else(|| PilotarError::Fault {
            message: format!("unknown element handle: {}", element.id),
        })?;
        if el.displayed_after > 0 {
            el.displayed_after -= 1;
            return Ok(false);
        }
        Ok(el.displayed)
    }

    fn is_enabled(&mut self, element: &ElementHandle) -> PilotarResult<bool> {
        self.guard()?;
        self.record(format!("is_enabled:{}", element.id));
        let query = self.query_of(element)?;
        let el = self.elements.get_mut(&query).ok_or_else(|| PilotarError::Fault {
            message: format!("unknown element handle: {}", element.id),
        })?;
        if el.enabled_after > 0 {
            el.enabled_after -= 1;
            return Ok(false);
        }
        Ok(el.enabled)
    }

    fn click(&mut self, element: &ElementHandle) -> PilotarResult<()> {
        self.guard()?;
        self.record(format!("click:{}", element.id));
        let query = self.query_of(element)?;
        let el = &self.elements[&query];
        if !el.native_click_viable {
            return Err(PilotarError::Interaction {
                action: "click".to_string(),
                selector: element.located_by.clone(),
                message: "element click intercepted".to_string(),
            });
        }
        if !el.displayed || !el.enabled {
            return Err(PilotarError::Interaction {
                action: "click".to_string(),
                selector: element.located_by.clone(),
                message: "element not interactable".to_string(),
            });
        }
        self.dispatch_click(element)
    }

    fn fill(&mut self, element: &ElementHandle, text: &str) -> PilotarResult<()> {
        self.guard()?;
        self.record(format!("fill:{}:{text}", element.id));
        let query = self.query_of(element)?;
        let el = self.elements.get_mut(&query).ok_or_else(|| PilotarError::Fault {
            message: format!("unknown element handle: {}", element.id),
        })?;
        if !el.displayed {
            return Err(PilotarError::Interaction {
                action: "fill".to_string(),
                selector: element.located_by.clone(),
                message: "element not interactable".to_string(),
            });
        }
        el.attributes.insert("value".to_string(), text.to_string());
        Ok(())
    }

    fn read_text(&mut self, element: &ElementHandle) -> PilotarResult<String> {
        self.guard()?;
        self.record(format!("read_text:{}", element.id));
        let query = self.query_of(element)?;
        Ok(self.elements[&query].text.clone())
    }

    fn read_attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> PilotarResult<Option<String>> {
        self.guard()?;
        self.record(format!("read_attribute:{}:{name}", element.id));
        let query = self.query_of(element)?;
        let el = self.elements.get_mut(&query).ok_or_else(|| PilotarError::Fault {
            message: format!("unknown element handle: {}", element.id),
        })?;
        if name == "value" {
            if let Some((value, remaining)) = el.value_after_reads.take() {
                if remaining > 0 {
                    el.value_after_reads = Some((value, remaining - 1));
                } else {
                    el.attributes.insert("value".to_string(), value);
                }
            }
        }
        Ok(el.attributes.get(name).cloned())
    }

    fn execute_script(
        &mut self,
        script: &str,
        target: Option<&ElementHandle>,
    ) -> PilotarResult<Value> {
        self.guard()?;
        match target {
            Some(el) => self.record(format!("execute_script:{script}:{}", el.id)),
            None => self.record(format!("execute_script:{script}")),
        }
        if script.contains(".click()") {
            if let Some(el) = target {
                self.dispatch_click(el)?;
                return Ok(Value::Null);
            }
        }
        Ok(self.script_results.get(script).cloned().unwrap_or(Value::Null))
    }

    fn current_url(&mut self) -> PilotarResult<String> {
        self.guard()?;
        self.record("current_url".to_string());
        if let Some((url, remaining)) = self.pending_url.take() {
            if remaining > 0 {
                self.pending_url = Some((url, remaining - 1));
            } else {
                self.url = url;
            }
        }
        Ok(self.url.clone())
    }

    fn snapshot(&mut self) -> PilotarResult<PageSnapshot> {
        self.guard()?;
        self.record("snapshot".to_string());
        Ok(PageSnapshot {
            url: self.url.clone(),
            source: self.source.clone(),
            captured_at: SystemTime::now(),
        })
    }

    fn close(&mut self) -> PilotarResult<()> {
        self.record("close".to_string());
        self.closed = true;
        Ok(())
    }
}
