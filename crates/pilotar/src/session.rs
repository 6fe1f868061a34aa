//! Run-scoped ownership of a browser connection.
//!
//! A [`Session`] exclusively owns one driver for the duration of one workflow
//! run. The connection is released on every exit path: explicitly through
//! [`Session::close`], or by `Drop` as a best-effort fallback when the run
//! unwinds or is abandoned after a timeout.

use crate::driver::{PageDriver, PageSnapshot};
use crate::result::{PilotarError, PilotarResult};
use tracing::warn;

/// Exclusive owner of one browser connection for one workflow run
pub struct Session<D: PageDriver> {
    driver: D,
    closed: bool,
}

impl<D: PageDriver> Session<D> {
    /// Take ownership of a driver
    #[must_use]
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            closed: false,
        }
    }

    /// Navigate to a URL.
    ///
    /// Non-fault driver errors come back as [`PilotarError::Navigation`]
    /// naming the URL; faults pass through untouched.
    pub fn navigate(&mut self, url: &str) -> PilotarResult<()> {
        self.driver.navigate(url).map_err(|e| {
            if e.is_fault() {
                e
            } else {
                PilotarError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    /// Current navigated location
    pub fn current_url(&mut self) -> PilotarResult<String> {
        self.driver.current_url()
    }

    /// Capture the page for diagnostics
    pub fn snapshot(&mut self) -> PilotarResult<PageSnapshot> {
        self.driver.snapshot()
    }

    /// Mutable access to the underlying driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Release the connection explicitly, consuming the session
    pub fn close(mut self) -> PilotarResult<()> {
        self.closed = true;
        self.driver.close()
    }
}

impl<D: PageDriver> Drop for Session<D> {
    fn drop(&mut self) {
        if !self.closed {
            // Best effort teardown - ignore errors during drop
            if let Err(e) = self.driver.close() {
                warn!(error = %e, "session teardown failed");
            }
        }
    }
}

impl<D: PageDriver> std::fmt::Debug for Session<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{ElementHandle, MockPage};
    use crate::result::PilotarError;
    use crate::selector::Selector;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::SystemTime;

    /// Driver that records whether close was called, optionally failing
    /// close or navigate.
    struct FlagDriver {
        closed: Arc<AtomicBool>,
        fail_close: bool,
        fail_navigate: bool,
    }

    impl PageDriver for FlagDriver {
        fn navigate(&mut self, _url: &str) -> PilotarResult<()> {
            if self.fail_navigate {
                return Err(PilotarError::Timeout {
                    condition: "page load".to_string(),
                    ms: 30_000,
                });
            }
            Ok(())
        }
        fn find(&mut self, _selector: &Selector) -> PilotarResult<Option<ElementHandle>> {
            Ok(None)
        }
        fn is_displayed(&mut self, _element: &ElementHandle) -> PilotarResult<bool> {
            Ok(false)
        }
        fn is_enabled(&mut self, _element: &ElementHandle) -> PilotarResult<bool> {
            Ok(false)
        }
        fn click(&mut self, _element: &ElementHandle) -> PilotarResult<()> {
            Ok(())
        }
        fn fill(&mut self, _element: &ElementHandle, _text: &str) -> PilotarResult<()> {
            Ok(())
        }
        fn read_text(&mut self, _element: &ElementHandle) -> PilotarResult<String> {
            Ok(String::new())
        }
        fn read_attribute(
            &mut self,
            _element: &ElementHandle,
            _name: &str,
        ) -> PilotarResult<Option<String>> {
            Ok(None)
        }
        fn execute_script(
            &mut self,
            _script: &str,
            _target: Option<&ElementHandle>,
        ) -> PilotarResult<Value> {
            Ok(Value::Null)
        }
        fn current_url(&mut self) -> PilotarResult<String> {
            Ok("about:blank".to_string())
        }
        fn snapshot(&mut self) -> PilotarResult<PageSnapshot> {
            Ok(PageSnapshot {
                url: "about:blank".to_string(),
                source: String::new(),
                captured_at: SystemTime::now(),
            })
        }
        fn close(&mut self) -> PilotarResult<()> {
            self.closed.store(true, Ordering::SeqCst);
            if self.fail_close {
                return Err(PilotarError::Fault {
                    message: "close refused".to_string(),
                });
            }
            Ok(())
        }
    }

    mod teardown_tests {
        use super::*;

        #[test]
        fn test_drop_closes_the_driver() {
            let closed = Arc::new(AtomicBool::new(false));
            {
                let _session = Session::new(FlagDriver {
                    closed: Arc::clone(&closed),
                    fail_close: false,
                    fail_navigate: false,
                });
            }
            assert!(closed.load(Ordering::SeqCst));
        }

        #[test]
        fn test_explicit_close_releases_once() {
            let closed = Arc::new(AtomicBool::new(false));
            let session = Session::new(FlagDriver {
                closed: Arc::clone(&closed),
                fail_close: false,
                fail_navigate: false,
            });
            session.close().unwrap();
            assert!(closed.load(Ordering::SeqCst));
        }

        #[test]
        fn test_drop_swallows_close_failure() {
            let closed = Arc::new(AtomicBool::new(false));
            {
                let _session = Session::new(FlagDriver {
                    closed: Arc::clone(&closed),
                    fail_close: true,
                    fail_navigate: false,
                });
            }
            // close was attempted and its failure absorbed
            assert!(closed.load(Ordering::SeqCst));
        }
    }

    mod delegation_tests {
        use super::*;

        #[test]
        fn test_navigate_and_current_url_delegate() {
            let mut session = Session::new(MockPage::new());
            session.navigate("https://portal.test/login").unwrap();
            assert_eq!(session.current_url().unwrap(), "https://portal.test/login");
            assert!(session.driver_mut().was_called("navigate:https://portal.test/login"));
        }

        #[test]
        fn test_snapshot_captures_current_state() {
            let mut session = Session::new(MockPage::new().with_source("<html>x</html>"));
            session.navigate("https://portal.test/claims").unwrap();
            let snap = session.snapshot().unwrap();
            assert_eq!(snap.url, "https://portal.test/claims");
            assert_eq!(snap.source, "<html>x</html>");
        }
    }

    mod navigation_tests {
        use super::*;

        #[test]
        fn test_navigate_failure_names_the_url() {
            let mut session = Session::new(FlagDriver {
                closed: Arc::new(AtomicBool::new(false)),
                fail_close: false,
                fail_navigate: true,
            });
            let err = session.navigate("https://portal.test/login").unwrap_err();
            match err {
                PilotarError::Navigation { url, message } => {
                    assert_eq!(url, "https://portal.test/login");
                    assert!(message.contains("page load"));
                }
                other => panic!("expected Navigation, got {other}"),
            }
        }

        #[test]
        fn test_navigate_fault_passes_through() {
            let mut session = Session::new(MockPage::new());
            session.driver_mut().sever_connection();
            let err = session.navigate("https://portal.test/login").unwrap_err();
            assert!(err.is_fault());
        }
    }
}
