//! Free-text tag field.
//!
//! Editors type tags into a single text input: *separate tags with spaces,
//! put quotes around multi-word tags*. When the input contains a comma outside
//! of quotes, commas delimit tags instead and spaces are kept inside names.
//!
//! ```
//! use videostream_model::models::Tags;
//!
//! let tags: Tags = r#"rust "live coding" talk"#.parse().unwrap();
//! assert_eq!(tags.iter().collect::<Vec<_>>(), ["live coding", "rust", "talk"]);
//! assert_eq!(tags.to_string(), r#""live coding" rust talk"#);
//!
//! let tags: Tags = "live coding, rust".parse().unwrap();
//! assert_eq!(tags.len(), 2);
//! ```

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

/// A sorted, de-duplicated set of tag names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(BTreeSet<String>);
impl Tags {
    /// Maximum length of the rendered tag field.
    pub const MAX_LEN: usize = 255;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, tag: impl AsRef<str>) -> bool {
        self.0.contains(tag.as_ref())
    }

    /// Builds a tag set from already-split names (e.g. read back from the
    /// store), trimming and dropping empty names and quote characters.
    pub fn from_names(names: impl IntoIterator<Item = impl AsRef<str>>) -> Result<Self, Error> {
        let tags = Self(names.into_iter().filter_map(|name| clean(name.as_ref())).collect());
        let rendered = tags.to_string();
        if rendered.chars().count() > Self::MAX_LEN {
            exn::bail!(ErrorKind::InvalidTags(format!("more than {} characters", Self::MAX_LEN)));
        }
        Ok(tags)
    }

    fn parse(input: &str) -> Vec<String> {
        let mut quoted = Vec::new();
        let mut rest = String::new();
        let mut current = String::new();
        let mut in_quotes = false;
        for c in input.chars() {
            match (c, in_quotes) {
                ('"', false) => {
                    in_quotes = true;
                    // A quote also ends whatever bare word came before it.
                    rest.push(' ');
                },
                ('"', true) => {
                    in_quotes = false;
                    quoted.push(std::mem::take(&mut current));
                },
                (c, true) => current.push(c),
                (c, false) => rest.push(c),
            }
        }
        // Unterminated quote: treat its contents as bare text.
        if in_quotes {
            rest.push(' ');
            rest.push_str(&current);
        }
        let bare: Vec<String> = match rest.contains(',') {
            true => rest.split(',').map(str::to_string).collect(),
            false => rest.split_whitespace().map(str::to_string).collect(),
        };
        quoted.into_iter().chain(bare).collect()
    }
}
impl FromStr for Tags {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_names(Self::parse(s))
    }
}
impl Display for Tags {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut first = true;
        for tag in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            match tag.contains([' ', ',']) {
                true => write!(f, "\"{tag}\"")?,
                false => f.write_str(tag)?,
            }
        }
        Ok(())
    }
}

fn clean(name: &str) -> Option<String> {
    let name: String = name.chars().filter(|c| *c != '"').collect();
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn names(tags: &Tags) -> Vec<&str> {
        tags.iter().collect()
    }

    #[rstest]
    #[case("", vec![])]
    #[case("   ", vec![])]
    #[case("rust", vec!["rust"])]
    #[case("rust  talk rust", vec!["rust", "talk"])]
    #[case(r#""live coding" rust"#, vec!["live coding", "rust"])]
    #[case(r#"rust"live coding""#, vec!["live coding", "rust"])]
    #[case("live coding, rust", vec!["live coding", "rust"])]
    #[case("live coding,, rust,", vec!["live coding", "rust"])]
    #[case(r#""a, b" c"#, vec!["a, b", "c"])]
    #[case(r#"unterminated "quote here"#, vec!["here", "quote", "unterminated"])]
    fn test_parse(#[case] input: &str, #[case] expected: Vec<&str>) {
        let tags: Tags = input.parse().unwrap();
        assert_eq!(names(&tags), expected);
    }

    #[test]
    fn test_render_quotes_multi_word() {
        let tags = Tags::from_names(["rust", "live coding", "a,b"]).unwrap();
        assert_eq!(tags.to_string(), r#""a,b" "live coding" rust"#);
        // Rendering and parsing again is stable.
        let reparsed: Tags = tags.to_string().parse().unwrap();
        assert_eq!(reparsed, tags);
    }

    #[test]
    fn test_too_long() {
        let input = (0..100).map(|n| format!("tag{n}")).collect::<Vec<_>>().join(" ");
        let err = input.parse::<Tags>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidTags(_)));
    }
}
