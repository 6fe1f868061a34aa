//! Element selectors and readiness requirements.
//!
//! A [`Selector`] is a semantic reference to a page element; a [`Readiness`]
//! is the observable state the element must reach before the engine will
//! hand it to an interaction. Readiness levels form a strict ladder:
//! `Clickable` implies `Visible` implies `Present`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic reference to a page element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// Match by `name` attribute
    Name(String),
    /// Match by element id
    Id(String),
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
}

impl Selector {
    /// Create a selector matching the `name` attribute
    #[must_use]
    pub fn name(value: impl Into<String>) -> Self {
        Self::Name(value.into())
    }

    /// Create a selector matching the element id
    #[must_use]
    pub fn id(value: impl Into<String>) -> Self {
        Self::Id(value.into())
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath(expression.into())
    }

    /// Convert to a query string for the browser-control boundary
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Name(s) => format!("[name='{s}']"),
            Self::Id(s) => format!("#{s}"),
            Self::Css(s) => s.clone(),
            Self::XPath(s) => format!("xpath={s}"),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(s) => write!(f, "name={s}"),
            Self::Id(s) => write!(f, "id={s}"),
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
        }
    }
}

/// Observable state an element must reach before interaction.
///
/// The derived ordering is the readiness ladder: a handle that satisfies a
/// level also satisfies every lower level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Readiness {
    /// Attached to the page
    #[default]
    Present,
    /// Attached and displayed
    Visible,
    /// Displayed and accepting input
    Clickable,
}

impl Readiness {
    /// Whether satisfying `self` also satisfies `weaker`
    #[must_use]
    pub fn implies(self, weaker: Self) -> bool {
        self >= weaker
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Present => "present",
            Self::Visible => "visible",
            Self::Clickable => "clickable",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_constructors_produce_expected_variants() {
            assert_eq!(Selector::name("Email"), Selector::Name("Email".to_string()));
            assert_eq!(Selector::id("search-btn"), Selector::Id("search-btn".to_string()));
            assert_eq!(
                Selector::css("input[type='submit']"),
                Selector::Css("input[type='submit']".to_string())
            );
            assert_eq!(
                Selector::xpath("//a[text()='Next']"),
                Selector::XPath("//a[text()='Next']".to_string())
            );
        }

        #[test]
        fn test_to_query_formats() {
            assert_eq!(Selector::name("answer").to_query(), "[name='answer']");
            assert_eq!(Selector::id("create-new-claim-btn").to_query(), "#create-new-claim-btn");
            assert_eq!(Selector::css(".choices").to_query(), ".choices");
            assert_eq!(Selector::xpath("//div").to_query(), "xpath=//div");
        }

        #[test]
        fn test_display_names_the_kind() {
            assert_eq!(Selector::name("Email").to_string(), "name=Email");
            assert_eq!(Selector::id("x").to_string(), "id=x");
            assert_eq!(Selector::css("#y").to_string(), "css=#y");
            assert_eq!(Selector::xpath("//z").to_string(), "xpath=//z");
        }

        #[test]
        fn test_serde_round_trip() {
            let sel = Selector::css("button[name='data[search]']");
            let json = serde_json::to_string(&sel).unwrap();
            let back: Selector = serde_json::from_str(&json).unwrap();
            assert_eq!(back, sel);
        }
    }

    mod readiness_tests {
        use super::*;

        #[test]
        fn test_ladder_ordering() {
            assert!(Readiness::Present < Readiness::Visible);
            assert!(Readiness::Visible < Readiness::Clickable);
        }

        #[test]
        fn test_clickable_implies_every_level() {
            assert!(Readiness::Clickable.implies(Readiness::Clickable));
            assert!(Readiness::Clickable.implies(Readiness::Visible));
            assert!(Readiness::Clickable.implies(Readiness::Present));
        }

        #[test]
        fn test_present_does_not_imply_visible() {
            assert!(!Readiness::Present.implies(Readiness::Visible));
            assert!(!Readiness::Visible.implies(Readiness::Clickable));
            assert!(Readiness::Present.implies(Readiness::Present));
        }

        #[test]
        fn test_display() {
            assert_eq!(Readiness::Present.to_string(), "present");
            assert_eq!(Readiness::Visible.to_string(), "visible");
            assert_eq!(Readiness::Clickable.to_string(), "clickable");
        }
    }
}
