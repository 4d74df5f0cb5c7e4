use super::PathTemplate;

/// How many request segments each segment group consumed, literal included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    widths: Vec<usize>,
}

impl MatchResult {
    /// Widths aligned 1:1 with [`PathTemplate::groups`].
    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    /// Number of leading request segments owned by the template.
    pub fn total(&self) -> usize {
        self.widths.iter().sum()
    }
}

impl PathTemplate {
    /// Matches `segments` against the template.
    ///
    /// Groups are visited in template order. Required placeholders take one
    /// segment each; the group's literal is then searched right to left over
    /// the following `optional + 1` segments, so as many optional
    /// placeholders as possible are treated as present. A literal that cannot
    /// be found fails the whole match; earlier groups are never revisited.
    ///
    /// The open tail takes what is left, up to its maximum width, but must
    /// be able to fill all of its required placeholders.
    pub fn match_sizes(&self, segments: &[String], case_sensitive: bool) -> Option<MatchResult> {
        let (tail, anchored) = self.groups.split_last()?;

        let mut widths = Vec::with_capacity(self.groups.len());
        let mut cursor = 0;

        for group in anchored {
            let fixed = group.fixed()?;
            cursor += group.required();

            let window = (group.optional() + 1).min(segments.len().saturating_sub(cursor));
            let count = (0..window)
                .rev()
                .find(|&count| segments_match(fixed, &segments[cursor + count], case_sensitive))?;

            cursor += count + 1;
            widths.push(group.required() + count + 1);
        }

        let remaining = segments.len().checked_sub(cursor)?;
        if remaining < tail.required() {
            return None;
        }
        widths.push(tail.max_count().min(remaining));

        Some(MatchResult { widths })
    }

    /// Whether the request segments start with this template.
    pub fn matches(&self, segments: &[String], case_sensitive: bool) -> bool {
        self.match_sizes(segments, case_sensitive).is_some()
    }
}

fn segments_match(fixed: &str, segment: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        fixed == segment
    } else {
        fixed.eq_ignore_ascii_case(segment) || fixed.to_lowercase() == segment.to_lowercase()
    }
}
