//! Step keywords and the "And" display rule.

use std::fmt;
use std::str::FromStr;

/// Keyword shown to listeners for a step.
///
/// `And` only ever appears as a display keyword: a step whose type repeats
/// the previous step's type is reported as `And`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKeyword {
    /// Setup preconditions for a scenario.
    Given,
    /// Perform the action under test.
    When,
    /// Assert the expected outcome.
    Then,
    /// Repeats the previous keyword.
    And,
}

impl StepKeyword {
    /// Return the keyword as a string slice.
    ///
    /// # Examples
    ///
    /// ```
    /// use inline_gherkin::StepKeyword;
    ///
    /// assert_eq!(StepKeyword::Then.as_str(), "Then");
    /// ```
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
            Self::And => "And",
        }
    }

    /// Returns `And` when `self` repeats `previous`, otherwise `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use inline_gherkin::StepKeyword;
    ///
    /// let then = StepKeyword::Then;
    /// assert_eq!(then.display_for(None), StepKeyword::Then);
    /// assert_eq!(then.display_for(Some(StepKeyword::When)), StepKeyword::Then);
    /// assert_eq!(then.display_for(Some(StepKeyword::Then)), StepKeyword::And);
    /// ```
    #[must_use]
    pub fn display_for(self, previous: Option<Self>) -> Self {
        if self != Self::And && previous == Some(self) {
            Self::And
        } else {
            self
        }
    }
}

impl fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a keyword fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid step keyword: {0}")]
pub struct StepKeywordParseError(pub String);

impl FromStr for StepKeyword {
    type Err = StepKeywordParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        [Self::Given, Self::When, Self::Then, Self::And]
            .into_iter()
            .find(|keyword| trimmed.eq_ignore_ascii_case(keyword.as_str()))
            .ok_or_else(|| StepKeywordParseError(trimmed.to_owned()))
    }
}

/// The literal type of an executed step.
///
/// Unlike [`StepKeyword`] it has no `And` variant, so a step can never be
/// executed as a bare conjunction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepType {
    /// A precondition step.
    Given,
    /// An action step.
    When,
    /// An assertion step.
    Then,
}

impl StepType {
    /// Return the type as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        StepKeyword::from_type(*self).as_str()
    }
}

impl StepKeyword {
    const fn from_type(step_type: StepType) -> Self {
        match step_type {
            StepType::Given => Self::Given,
            StepType::When => Self::When,
            StepType::Then => Self::Then,
        }
    }
}

impl From<StepType> for StepKeyword {
    fn from(step_type: StepType) -> Self {
        Self::from_type(step_type)
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepType {
    type Err = StepKeywordParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.parse::<StepKeyword>()? {
            StepKeyword::Given => Ok(Self::Given),
            StepKeyword::When => Ok(Self::When),
            StepKeyword::Then => Ok(Self::Then),
            StepKeyword::And => Err(StepKeywordParseError(value.trim().to_owned())),
        }
    }
}
