//! Story and scenario identity.

use std::fmt;

/// Identifies a story: its simple name and namespace path.
///
/// The name doubles as the stem of the story's report files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoryId {
    name: String,
    path: String,
}

impl StoryId {
    /// Creates an identifier from explicit parts.
    ///
    /// Path separators and `:` in `name` are replaced with `_`, so report
    /// files named after the story stay inside the report directory.
    ///
    /// ```
    /// use inline_gherkin::StoryId;
    ///
    /// let id = StoryId::new("../shop/Story", "shop/Story");
    /// assert_eq!(id.name(), ".._shop_Story");
    /// assert_eq!(id.path(), "shop/Story");
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into().replace(is_unsafe_in_file_name, "_"),
            path: path.into(),
        }
    }

    /// Derives the identifier from a Rust type.
    ///
    /// Generic arguments are dropped and `::` separators become `/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use inline_gherkin::StoryId;
    ///
    /// struct CheckoutStory;
    ///
    /// let id = StoryId::from_type::<CheckoutStory>();
    /// assert_eq!(id.name(), "CheckoutStory");
    /// assert!(id.path().ends_with("/CheckoutStory"));
    /// ```
    #[must_use]
    pub fn from_type<T: ?Sized>() -> Self {
        let full = std::any::type_name::<T>();
        let base = full.split('<').next().unwrap_or(full);
        let name = base.rsplit("::").next().unwrap_or(base);
        Self::new(name, base.replace("::", "/"))
    }

    /// Returns the simple name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the namespace path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn is_unsafe_in_file_name(c: char) -> bool {
    matches!(c, '/' | '\\' | ':')
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// The "in order to / as a / I want to" statement of a story.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Narrative {
    /// The benefit the story delivers.
    pub in_order_to: String,
    /// The role asking for it.
    pub as_a: String,
    /// The capability wanted.
    pub i_want_to: String,
}

impl Narrative {
    /// Builds a narrative from its three clauses.
    #[must_use]
    pub fn new(
        in_order_to: impl Into<String>,
        as_a: impl Into<String>,
        i_want_to: impl Into<String>,
    ) -> Self {
        Self {
            in_order_to: in_order_to.into(),
            as_a: as_a.into(),
            i_want_to: i_want_to.into(),
        }
    }
}

/// Turns a function name into a scenario title.
///
/// Module paths and closure markers are dropped, underscores become spaces
/// and camel-case humps are split.
///
/// # Examples
///
/// ```
/// use inline_gherkin::scenario_title_from_fn;
///
/// assert_eq!(
///     scenario_title_from_fn("some_succeeding_scenario"),
///     "some succeeding scenario"
/// );
/// assert_eq!(scenario_title_from_fn("stories::loginFails"), "login fails");
/// ```
#[must_use]
pub fn scenario_title_from_fn(function: &str) -> String {
    let name = function
        .rsplit("::")
        .find(|segment| !segment.starts_with('{'))
        .unwrap_or(function);
    let mut title = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch == '_' {
            if !title.ends_with(' ') && !title.is_empty() {
                title.push(' ');
            }
        } else if ch.is_uppercase() && !title.is_empty() && !title.ends_with(' ') {
            title.push(' ');
            title.extend(ch.to_lowercase());
        } else {
            title.extend(ch.to_lowercase());
        }
    }
    title.trim_end().to_owned()
}

/// Expands to the title derived from the enclosing function's name.
///
/// # Examples
///
/// ```
/// fn user_can_log_out() -> String {
///     inline_gherkin::scenario_title!()
/// }
///
/// assert_eq!(user_can_log_out(), "user can log out");
/// ```
#[macro_export]
macro_rules! scenario_title {
    () => {{
        fn marker() {}
        fn name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = name_of(marker);
        $crate::scenario_title_from_fn(name.strip_suffix("::marker").unwrap_or(name))
    }};
}
