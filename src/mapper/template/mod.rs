//! Mount path templates.
//!
//! A template such as `/some/#{a}/path/${b}/#{c}` is compiled into segment
//! groups, each a run of placeholders closed by a fixed literal. The last
//! group has no literal and is open towards the end of the URL:
//!
//! ```text
//! [some]            0 required, 0 optional, literal "some"
//! [#{a} path]       0 required, 1 optional, literal "path"
//! [${b} #{c}]       1 required, 1 optional, open tail
//! ```
//!
//! Matching, parameter extraction and URL building all walk these groups.

mod build;
mod extract;
mod matcher;
mod parser;

use std::fmt;

pub use build::{BuildError, BuiltPath};
pub use matcher::MatchResult;
pub use parser::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Literal(String),
    Required { name: String },
    Optional { name: String },
}

impl Part {
    pub fn placeholder_name(&self) -> Option<&str> {
        match self {
            Part::Literal(_) => None,
            Part::Required { name } | Part::Optional { name } => Some(name),
        }
    }

    fn classify(segment: &str) -> Part {
        let placeholder = |prefix: &str| {
            segment
                .strip_prefix(prefix)
                .and_then(|s| s.strip_suffix('}'))
                .map(str::to_owned)
        };

        if let Some(name) = placeholder("${") {
            Part::Required { name }
        } else if let Some(name) = placeholder("#{") {
            Part::Optional { name }
        } else {
            Part::Literal(segment.to_owned())
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Part::Literal(literal) => f.write_str(literal),
            Part::Required { name } => write!(f, "${{{name}}}"),
            Part::Optional { name } => write!(f, "#{{{name}}}"),
        }
    }
}

/// A run of placeholders closed by a fixed literal, or the open tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentGroup {
    fixed: Option<String>,
    required: usize,
    optional: usize,
    start: usize,
}

impl SegmentGroup {
    fn new(start: usize) -> Self {
        Self {
            fixed: None,
            required: 0,
            optional: 0,
            start,
        }
    }

    pub fn fixed(&self) -> Option<&str> {
        self.fixed.as_deref()
    }

    pub fn required(&self) -> usize {
        self.required
    }

    pub fn optional(&self) -> usize {
        self.optional
    }

    /// Index of the group's first part within the template.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn max_count(&self) -> usize {
        self.required + self.optional
    }

    pub fn fixed_width(&self) -> usize {
        usize::from(self.fixed.is_some())
    }
}

/// A compiled mount path. Immutable once compiled.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    parts: Vec<Part>,
    groups: Vec<SegmentGroup>,
}

impl PathTemplate {
    /// Compiles a mount path string such as `/blog/${year}/#{slug}`.
    pub fn compile(mount_path: &str) -> Result<Self, ParseError> {
        let parts = parser::Parser::new(mount_path.as_bytes()).parse()?;
        Ok(Self::from_parts(parts))
    }

    /// Compiles already split mount segments. Empty segments are skipped.
    ///
    /// Placeholder names follow the same rules as in [`compile`](Self::compile);
    /// error positions refer to the `/`-joined mount path.
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Result<Self, ParseError> {
        let mut parts: Vec<Part> = Vec::with_capacity(segments.len());
        let mut offset = 0;
        for segment in segments.iter().map(AsRef::as_ref) {
            if segment.is_empty() {
                continue;
            }
            let pos = offset + 1;
            offset += 1 + segment.len();

            let part = Part::classify(segment);
            if let Some(name) = part.placeholder_name() {
                parser::parameter_name(name.as_bytes(), pos + 2)?;
                if parts.iter().any(|p| p.placeholder_name() == Some(name)) {
                    return Err(ParseError::DuplicatePlaceholder {
                        name: name.to_owned(),
                    });
                }
            }
            parts.push(part);
        }
        Ok(Self::from_parts(parts))
    }

    /// The empty mount path `/`, matching every URL with zero segments.
    pub fn root() -> Self {
        Self::from_parts(Vec::new())
    }

    fn from_parts(parts: Vec<Part>) -> Self {
        let mut groups = Vec::new();
        let mut current = SegmentGroup::new(0);

        for (index, part) in parts.iter().enumerate() {
            match part {
                Part::Literal(literal) => {
                    current.fixed = Some(literal.clone());
                    groups.push(std::mem::replace(&mut current, SegmentGroup::new(index + 1)));
                }
                Part::Required { .. } => current.required += 1,
                Part::Optional { .. } => current.optional += 1,
            }
        }
        groups.push(current);

        Self { parts, groups }
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn groups(&self) -> &[SegmentGroup] {
        &self.groups
    }

    /// Number of literal and placeholder segments in the mount path.
    pub fn raw_segment_count(&self) -> usize {
        self.parts.len()
    }

    pub fn literal_count(&self) -> usize {
        self.groups.iter().map(SegmentGroup::fixed_width).sum()
    }

    pub fn optional_count(&self) -> usize {
        self.groups.iter().map(SegmentGroup::optional).sum()
    }

    /// Score of a matching template: literal segments count twice and
    /// optional placeholders not at all, so `/a/b/${x}` beats `/a/#{y}/${x}`.
    pub fn specificity(&self) -> i32 {
        let score = self.raw_segment_count() - self.optional_count() + self.literal_count();
        i32::try_from(score).unwrap_or(i32::MAX)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parts.is_empty() {
            return f.write_str("/");
        }
        for part in &self.parts {
            write!(f, "/{part}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn group(fixed: Option<&str>, required: usize, optional: usize, start: usize) -> SegmentGroup {
        SegmentGroup {
            fixed: fixed.map(str::to_owned),
            required,
            optional,
            start,
        }
    }

    #[test]
    fn groups_are_closed_by_literals() {
        let template = PathTemplate::compile("/some/#{a}/path/${b}/#{c}").unwrap();

        assert_eq!(
            template.groups(),
            &[
                group(Some("some"), 0, 0, 0),
                group(Some("path"), 0, 1, 1),
                group(None, 1, 1, 3),
            ]
        );
        assert_eq!(template.raw_segment_count(), 5);
    }

    #[test]
    fn literal_at_end_leaves_empty_tail() {
        let template = PathTemplate::compile("/#{a}/fixed").unwrap();

        assert_eq!(
            template.groups(),
            &[group(Some("fixed"), 0, 1, 0), group(None, 0, 0, 2)]
        );
    }

    #[test]
    fn empty_mount_path_is_a_single_open_group() {
        let template = PathTemplate::compile("/").unwrap();
        assert_eq!(template.groups(), &[group(None, 0, 0, 0)]);
        assert_eq!(template.to_string(), "/");
    }

    #[test]
    fn from_segments_matches_compile() {
        let compiled = PathTemplate::compile("/mount/${id}/#{tab}").unwrap();
        let split = PathTemplate::from_segments(&["mount", "${id}", "#{tab}"]).unwrap();

        assert_eq!(compiled.parts(), split.parts());
        assert_eq!(compiled.groups(), split.groups());
    }

    #[test]
    fn from_segments_rejects_duplicates() {
        assert_eq!(
            PathTemplate::from_segments(&["${a}", "#{a}"]).unwrap_err(),
            ParseError::DuplicatePlaceholder {
                name: "a".to_owned()
            }
        );
    }

    #[test]
    fn from_segments_validates_names_like_compile() {
        let expected = ParseError::Expected {
            expected: "a placeholder name character",
            actual: b' ',
            pos: 5,
        };
        assert_eq!(PathTemplate::compile("/${ab c}").unwrap_err(), expected);
        assert_eq!(PathTemplate::from_segments(&["${ab c}"]).unwrap_err(), expected);

        assert_eq!(
            PathTemplate::from_segments(&["mount", "${}"]).unwrap_err(),
            ParseError::EmptyPlaceholderName { pos: 7 }
        );
        assert!(PathTemplate::from_segments(&["#{1abc}"]).is_err());
    }

    #[test]
    fn display_round_trips_the_mount_path() {
        let template = PathTemplate::compile("some/#{a}/path/${b}").unwrap();
        assert_eq!(template.to_string(), "/some/#{a}/path/${b}");
    }

    #[test]
    fn specificity_prefers_literals_over_optionals() {
        let literal = PathTemplate::compile("/a/b/${x}").unwrap();
        let optional = PathTemplate::compile("/a/#{y}/${x}").unwrap();

        assert_eq!(literal.specificity(), 5);
        assert_eq!(optional.specificity(), 3);
    }
}
