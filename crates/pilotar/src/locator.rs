//! Element location with readiness gating.
//!
//! A [`Locator`] pairs a [`Selector`] with the [`Readiness`] the element must
//! reach and the wait budget for getting there. Resolution polls: find the
//! element, then check readiness, until both hold or the budget elapses.
//!
//! Failure is split by what was observed: if no handle ever resolved the
//! error is [`PilotarError::ElementNotFound`]; if a handle appeared but never
//! reached the requested readiness it is [`PilotarError::Timeout`] naming the
//! readiness. The requested readiness is never downgraded.

use crate::driver::{ElementHandle, PageDriver};
use crate::result::{PilotarError, PilotarResult};
use crate::selector::{Readiness, Selector};
use crate::wait::{Wait, WaitOptions};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Selector, readiness requirement, and wait budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    selector: Selector,
    readiness: Readiness,
    wait: WaitOptions,
}

impl Locator {
    /// Locator requiring the element to be present
    #[must_use]
    pub fn present(selector: Selector) -> Self {
        Self {
            selector,
            readiness: Readiness::Present,
            wait: WaitOptions::new(),
        }
    }

    /// Locator requiring the element to be displayed
    #[must_use]
    pub fn visible(selector: Selector) -> Self {
        Self::present(selector).with_readiness(Readiness::Visible)
    }

    /// Locator requiring the element to be displayed and enabled
    #[must_use]
    pub fn clickable(selector: Selector) -> Self {
        Self::present(selector).with_readiness(Readiness::Clickable)
    }

    /// Set the readiness requirement
    #[must_use]
    pub fn with_readiness(mut self, readiness: Readiness) -> Self {
        self.readiness = readiness;
        self
    }

    /// Set the wait budget
    #[must_use]
    pub fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Set just the timeout, keeping the poll interval
    #[must_use]
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.wait = self.wait.with_timeout_ms(ms);
        self
    }

    /// The selector
    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// The readiness requirement
    #[must_use]
    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// The wait budget
    #[must_use]
    pub fn wait(&self) -> WaitOptions {
        self.wait
    }

    /// Resolve into a handle satisfying the readiness requirement
    pub fn resolve<D: PageDriver>(&self, driver: &mut D) -> PilotarResult<ElementHandle> {
        let description = format!("element {} to be {}", self.selector, self.readiness);
        debug!(selector = %self.selector, readiness = %self.readiness, "locating");

        let mut seen = false;
        let result = Wait::with_options(self.wait).until(&description, || {
            let handle = match driver.find(&self.selector)? {
                Some(h) => h,
                None => return Ok(None),
            };
            seen = true;
            if self.satisfied(driver, &handle)? {
                Ok(Some(handle))
            } else {
                Ok(None)
            }
        });

        match result {
            Err(PilotarError::Timeout { .. }) if !seen => Err(PilotarError::ElementNotFound {
                selector: self.selector.to_string(),
                ms: self.wait.timeout_ms,
            }),
            other => other,
        }
    }

    fn satisfied<D: PageDriver>(
        &self,
        driver: &mut D,
        handle: &ElementHandle,
    ) -> PilotarResult<bool> {
        match self.readiness {
            Readiness::Present => Ok(true),
            Readiness::Visible => driver.is_displayed(handle),
            Readiness::Clickable => {
                Ok(driver.is_displayed(handle)? && driver.is_enabled(handle)?)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockElement, MockPage};

    fn fast_wait() -> WaitOptions {
        WaitOptions::new().with_timeout_ms(200).with_poll_interval_ms(5)
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_present_element_resolves_immediately() {
            let sel = Selector::name("Email");
            let mut page = MockPage::new().with_element(&sel, MockElement::new("input"));
            let handle = Locator::visible(sel).with_wait(fast_wait()).resolve(&mut page).unwrap();
            assert_eq!(handle.tag_name, "input");
            assert_eq!(page.calls_matching("find:"), 1);
        }

        #[test]
        fn test_late_element_resolves_after_polls() {
            let sel = Selector::css(".choices__item");
            let mut page =
                MockPage::new().with_element(&sel, MockElement::new("div").appears_after(2));
            let handle = Locator::clickable(sel).with_wait(fast_wait()).resolve(&mut page);
            assert!(handle.is_ok());
            assert_eq!(page.calls_matching("find:"), 3);
        }

        #[test]
        fn test_clickable_waits_for_enabled() {
            let sel = Selector::css("button[name='data[search]']");
            let mut page =
                MockPage::new().with_element(&sel, MockElement::new("button").enabled_after(3));
            let handle = Locator::clickable(sel).with_wait(fast_wait()).resolve(&mut page);
            assert!(handle.is_ok());
            assert_eq!(page.calls_matching("is_enabled:"), 4);
        }

        #[test]
        fn test_never_found_yields_element_not_found() {
            let mut page = MockPage::new();
            let err = Locator::present(Selector::id("ghost"))
                .with_wait(fast_wait().with_timeout_ms(30))
                .resolve(&mut page)
                .unwrap_err();
            match err {
                PilotarError::ElementNotFound { selector, ms } => {
                    assert_eq!(selector, "id=ghost");
                    assert_eq!(ms, 30);
                }
                other => panic!("expected ElementNotFound, got {other}"),
            }
        }

        #[test]
        fn test_found_but_never_visible_yields_timeout() {
            let sel = Selector::id("banner");
            let mut page = MockPage::new().with_element(&sel, MockElement::new("div").hidden());
            let err = Locator::visible(sel)
                .with_wait(fast_wait().with_timeout_ms(30))
                .resolve(&mut page)
                .unwrap_err();
            match err {
                PilotarError::Timeout { condition, .. } => {
                    assert!(condition.contains("id=banner"));
                    assert!(condition.contains("visible"));
                }
                other => panic!("expected Timeout, got {other}"),
            }
        }

        #[test]
        fn test_fault_aborts_resolution() {
            let mut page = MockPage::new();
            page.sever_connection();
            let err = Locator::present(Selector::id("anything"))
                .with_wait(fast_wait())
                .resolve(&mut page)
                .unwrap_err();
            assert!(err.is_fault());
        }
    }

    mod readiness_ordering_tests {
        use super::*;
        use proptest::prelude::*;

        fn readiness_strategy() -> impl Strategy<Value = Readiness> {
            prop_oneof![
                Just(Readiness::Present),
                Just(Readiness::Visible),
                Just(Readiness::Clickable),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(24))]

            #[test]
            fn prop_resolution_respects_readiness(
                displayed in any::<bool>(),
                enabled in any::<bool>(),
                readiness in readiness_strategy()
            ) {
                let sel = Selector::id("target");
                let mut element = MockElement::new("input");
                if !displayed {
                    element = element.hidden();
                }
                if !enabled {
                    element = element.disabled();
                }
                let mut page = MockPage::new().with_element(&sel, element);

                let result = Locator::present(sel)
                    .with_readiness(readiness)
                    .with_wait(WaitOptions::new().with_timeout_ms(10).with_poll_interval_ms(2))
                    .resolve(&mut page);

                let expected = match readiness {
                    Readiness::Present => true,
                    Readiness::Visible => displayed,
                    Readiness::Clickable => displayed && enabled,
                };
                prop_assert_eq!(result.is_ok(), expected);
            }
        }
    }
}
