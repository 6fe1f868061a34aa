//! Modeled portal workflows.
//!
//! Declarative step lists for the insurance portal under validation: login
//! with a security challenge, navigation into claim intake, and the
//! dynamic insured search. Each builder returns a plain [`Workflow`]; run it
//! with [`Workflow::run`] or [`crate::report::RunReport::capture`] after
//! navigating the session to the portal endpoint.
//!
//! Selectors are fixed properties of the portal markup and live here, next
//! to the steps that use them. Credentials and search data come in as
//! parameters so the same step lists run against any environment.

use crate::config::Credentials;
use crate::flow::Workflow;
use crate::interaction::{Fallback, Interaction, ReadTarget};
use crate::locator::Locator;
use crate::selector::Selector;
use crate::step::{LocationMatch, PostCondition, Step};
use serde::{Deserialize, Serialize};

/// Data driving one insured search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// State option text as rendered in the dropdown
    pub state_option: String,
    /// License number typed into the lookup field
    pub license_number: String,
    /// Insured name the result field must settle on
    pub expected_insured: String,
}

impl SearchQuery {
    /// Assemble a query
    #[must_use]
    pub fn new(
        state_option: impl Into<String>,
        license_number: impl Into<String>,
        expected_insured: impl Into<String>,
    ) -> Self {
        Self {
            state_option: state_option.into(),
            license_number: license_number.into(),
            expected_insured: expected_insured.into(),
        }
    }
}

/// The reference fixture: a California artisan contractor whose policy is
/// on file in every seeded environment.
impl Default for SearchQuery {
    fn default() -> Self {
        Self::new("CALIFORNIA", "1082094", "PAINT & DECOR FINISHES")
    }
}

/// Login with a security challenge.
///
/// Fills identity and secret, submits, answers the challenge, then confirms.
/// The confirm button sometimes sits under a consent banner, so that click
/// carries a scripted fallback. The flow is complete once the location
/// contains `dashboard`.
#[must_use]
pub fn authentication(credentials: &Credentials) -> Workflow {
    Workflow::new("authentication")
        .step(Step::new(
            "enter identity",
            Locator::present(Selector::name("Email")),
            Interaction::fill(credentials.identity.clone()),
        ))
        .step(Step::new(
            "enter secret",
            Locator::present(Selector::name("Password")),
            Interaction::fill(credentials.secret.clone()),
        ))
        .step(Step::new(
            "submit credentials",
            Locator::present(Selector::css("input[type='submit']")),
            Interaction::click(),
        ))
        .step(Step::new(
            "answer challenge",
            Locator::present(Selector::name("answer")),
            Interaction::fill(credentials.challenge_answer.clone()),
        ))
        .step(
            Step::new(
                "confirm challenge",
                Locator::clickable(Selector::css("input[type='submit']")),
                Interaction::click().with_fallback(Fallback::Scripted),
            )
            .with_post(PostCondition::location(LocationMatch::Contains(
                "dashboard".to_string(),
            ))),
        )
}

/// Navigate from the dashboard into general-liability claim intake.
///
/// The line-of-business link renders under an overlay while the page
/// settles, so its click carries a scripted fallback.
#[must_use]
pub fn claim_intake() -> Workflow {
    Workflow::new("claim intake")
        .step(Step::new(
            "start new claim",
            Locator::clickable(Selector::id("create-new-claim-btn")),
            Interaction::click(),
        ))
        .step(
            Step::new(
                "open general liability line",
                Locator::present(Selector::xpath(
                    "//a[normalize-space(text())='General Liability']",
                )),
                Interaction::click().with_fallback(Fallback::Scripted),
            )
            .with_post(PostCondition::location(LocationMatch::Contains(
                "gl-insured".to_string(),
            ))),
        )
        .step(Step::new(
            "choose licensed account",
            Locator::clickable(Selector::css(
                "input[type='radio'][name='data[licQuestion][e5yott]'][value='46532']",
            )),
            Interaction::click(),
        ))
}

/// Search for an insured and verify the match.
///
/// Opens the state dropdown, picks the option by its rendered text (the
/// list populates asynchronously), verifies the selected label, types the
/// license number, and clicks search once the button enables. The final
/// step polls the result field until it settles on the expected insured:
/// a field that never populates times out, a field that settles on a
/// different name is an assertion mismatch.
#[must_use]
pub fn insured_search(query: &SearchQuery) -> Workflow {
    let option_xpath = format!(
        "//div[contains(@class,'choices__item') and text()='{}']",
        query.state_option
    );
    Workflow::new("insured search")
        .step(Step::new(
            "open state dropdown",
            Locator::clickable(Selector::css(".choices[data-type='select-one']")),
            Interaction::click(),
        ))
        .step(Step::new(
            "choose state option",
            Locator::clickable(Selector::xpath(option_xpath)),
            Interaction::click(),
        ))
        .step(
            Step::new(
                "verify selected state",
                Locator::visible(Selector::css(
                    ".choices__list--single .choices__item--selectable span",
                )),
                Interaction::read_text(),
            )
            .with_post(
                PostCondition::value_equals(
                    Selector::css(".choices__list--single .choices__item--selectable span"),
                    ReadTarget::Text,
                    query.state_option.clone(),
                )
                .normalized(),
            ),
        )
        .step(Step::new(
            "enter license number",
            Locator::visible(Selector::id("e3oimpa-licNum")),
            Interaction::fill(query.license_number.clone()),
        ))
        .step(
            Step::new(
                "run search",
                Locator::clickable(Selector::css("button[name='data[search]']")),
                Interaction::click(),
            )
            .with_post(PostCondition::value_equals(
                Selector::id("ea17wjm-exactPolName"),
                ReadTarget::Attribute("value".to_string()),
                query.expected_insured.clone(),
            )),
        )
}
