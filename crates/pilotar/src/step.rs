//! Declarative workflow steps and post-conditions.
//!
//! A [`Step`] is the unit the sequencer executes: a target [`Locator`], an
//! [`Interaction`], and optionally a [`PostCondition`] that must hold before
//! the step counts as complete. Steps are plain data; building a workflow is
//! assembling a list of them.

use crate::interaction::{Interaction, ReadTarget};
use crate::locator::Locator;
use crate::selector::Selector;
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};

/// Pattern over the current location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationMatch {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Matches(String),
}

impl LocationMatch {
    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern),
            Self::Contains(pattern) => url.contains(pattern),
            Self::Matches(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(url))
                .unwrap_or(false),
        }
    }

    /// Description used in wait conditions and failure messages
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Exact(p) => format!("location equals '{p}'"),
            Self::Prefix(p) => format!("location starts with '{p}'"),
            Self::Contains(p) => format!("location contains '{p}'"),
            Self::Matches(p) => format!("location matches /{p}/"),
        }
    }
}

/// What a post-condition verifies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostCheck {
    /// The current location matches the pattern
    Location(LocationMatch),
    /// A value read from an element equals an expected literal
    ValueEquals {
        /// Element to read from
        selector: Selector,
        /// What to read
        read: ReadTarget,
        /// Expected literal
        expected: String,
        /// Compare trimmed and case-insensitively
        normalized: bool,
    },
}

impl PostCheck {
    /// Description used in wait conditions and failure messages
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Location(pattern) => pattern.describe(),
            Self::ValueEquals {
                selector,
                read,
                expected,
                ..
            } => match read {
                ReadTarget::Text => format!("text of {selector} equals '{expected}'"),
                ReadTarget::Attribute(name) => {
                    format!("attribute '{name}' of {selector} equals '{expected}'")
                }
            },
        }
    }
}

/// Post-condition plus its wait budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCondition {
    check: PostCheck,
    wait: WaitOptions,
}

impl PostCondition {
    /// Wait until the current location matches the pattern
    #[must_use]
    pub fn location(pattern: LocationMatch) -> Self {
        Self {
            check: PostCheck::Location(pattern),
            wait: WaitOptions::new(),
        }
    }

    /// Wait until a value read from an element equals the expected literal
    #[must_use]
    pub fn value_equals(
        selector: Selector,
        read: ReadTarget,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            check: PostCheck::ValueEquals {
                selector,
                read,
                expected: expected.into(),
                normalized: false,
            },
            wait: WaitOptions::new(),
        }
    }

    /// Compare the value trimmed and case-insensitively
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if let PostCheck::ValueEquals { normalized, .. } = &mut self.check {
            *normalized = true;
        }
        self
    }

    /// Set the wait budget
    #[must_use]
    pub fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// The check performed
    #[must_use]
    pub fn check(&self) -> &PostCheck {
        &self.check
    }

    /// The wait budget
    #[must_use]
    pub fn wait(&self) -> WaitOptions {
        self.wait
    }

    /// Whether `observed` satisfies a value-equals check. Always false for
    /// location checks.
    #[must_use]
    pub fn value_matches(&self, observed: &str) -> bool {
        match &self.check {
            PostCheck::ValueEquals {
                expected,
                normalized,
                ..
            } => {
                if *normalized {
                    normalize(observed) == normalize(expected)
                } else {
                    observed == expected
                }
            }
            PostCheck::Location(_) => false,
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_uppercase()
}

/// Ordered unit of work in a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    name: String,
    target: Locator,
    interaction: Interaction,
    post: Option<PostCondition>,
}

impl Step {
    /// Create a step
    #[must_use]
    pub fn new(name: impl Into<String>, target: Locator, interaction: Interaction) -> Self {
        Self {
            name: name.into(),
            target,
            interaction,
            post: None,
        }
    }

    /// Declare a post-condition the step must satisfy
    #[must_use]
    pub fn with_post(mut self, post: PostCondition) -> Self {
        self.post = Some(post);
        self
    }

    /// Apply one wait budget to the locator and any post-condition
    #[must_use]
    pub fn with_waits(mut self, options: WaitOptions) -> Self {
        self.target = self.target.with_wait(options);
        self.post = self.post.map(|p| p.with_wait(options));
        self
    }

    /// Step name used in logs and reports
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The target locator
    #[must_use]
    pub fn target(&self) -> &Locator {
        &self.target
    }

    /// The interaction performed once the target resolves
    #[must_use]
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// The declared post-condition, if any
    #[must_use]
    pub fn post(&self) -> Option<&PostCondition> {
        self.post.as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod location_match_tests {
        use super::*;

        #[test]
        fn test_exact() {
            let m = LocationMatch::Exact("https://portal.test/dashboard".to_string());
            assert!(m.matches("https://portal.test/dashboard"));
            assert!(!m.matches("https://portal.test/dashboard/claims"));
        }

        #[test]
        fn test_prefix() {
            let m = LocationMatch::Prefix("https://portal.test/".to_string());
            assert!(m.matches("https://portal.test/login"));
            assert!(!m.matches("https://other.test/"));
        }

        #[test]
        fn test_contains() {
            let m = LocationMatch::Contains("dashboard".to_string());
            assert!(m.matches("https://portal.test/app/dashboard?tab=1"));
            assert!(!m.matches("https://portal.test/login"));
        }

        #[test]
        fn test_regex() {
            let m = LocationMatch::Matches(r"/claims/\d+$".to_string());
            assert!(m.matches("https://portal.test/claims/42"));
            assert!(!m.matches("https://portal.test/claims/new"));
        }

        #[test]
        fn test_invalid_regex_never_matches() {
            let m = LocationMatch::Matches("[unclosed".to_string());
            assert!(!m.matches("anything"));
        }

        #[test]
        fn test_describe() {
            assert_eq!(
                LocationMatch::Contains("gl-insured".to_string()).describe(),
                "location contains 'gl-insured'"
            );
        }
    }

    mod post_condition_tests {
        use super::*;

        #[test]
        fn test_value_matches_exact() {
            let post = PostCondition::value_equals(
                Selector::id("ea17wjm-exactPolName"),
                ReadTarget::Attribute("value".to_string()),
                "PAINT & DECOR FINISHES",
            );
            assert!(post.value_matches("PAINT & DECOR FINISHES"));
            assert!(!post.value_matches("paint & decor finishes"));
            assert!(!post.value_matches("PAINT"));
        }

        #[test]
        fn test_value_matches_normalized() {
            let post = PostCondition::value_equals(
                Selector::css(".choices__item--selectable span"),
                ReadTarget::Text,
                "CALIFORNIA",
            )
            .normalized();
            assert!(post.value_matches("  California "));
            assert!(post.value_matches("CALIFORNIA"));
            assert!(!post.value_matches("OREGON"));
        }

        #[test]
        fn test_location_check_never_value_matches() {
            let post = PostCondition::location(LocationMatch::Contains("dashboard".to_string()));
            assert!(!post.value_matches("dashboard"));
        }

        #[test]
        fn test_describe_names_the_read() {
            let post = PostCondition::value_equals(
                Selector::id("result"),
                ReadTarget::Attribute("value".to_string()),
                "42",
            );
            assert_eq!(post.check().describe(), "attribute 'value' of id=result equals '42'");
        }
    }

    mod step_tests {
        use super::*;

        #[test]
        fn test_builder_assembles_fields() {
            let step = Step::new(
                "submit credentials",
                Locator::clickable(Selector::css("input[type='submit']")),
                Interaction::click(),
            )
            .with_post(PostCondition::location(LocationMatch::Contains(
                "dashboard".to_string(),
            )));

            assert_eq!(step.name(), "submit credentials");
            assert_eq!(step.target().selector(), &Selector::css("input[type='submit']"));
            assert!(step.post().is_some());
        }

        #[test]
        fn test_with_waits_covers_locator_and_post_condition() {
            let options = WaitOptions::new().with_timeout_ms(15_000).with_poll_interval_ms(100);
            let step = Step::new(
                "confirm challenge",
                Locator::clickable(Selector::css("input[type='submit']")),
                Interaction::click(),
            )
            .with_post(PostCondition::location(LocationMatch::Contains(
                "dashboard".to_string(),
            )))
            .with_waits(options);

            assert_eq!(step.target().wait(), options);
            assert_eq!(step.post().unwrap().wait(), options);
        }
    }
}
