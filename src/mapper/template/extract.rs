use crate::parameters::PageParameters;

use super::{MatchResult, Part, PathTemplate};

impl PathTemplate {
    /// Binds placeholder values from `segments` using the widths computed by
    /// [`match_sizes`](Self::match_sizes).
    ///
    /// Within a group, parts are bound in template order: required
    /// placeholders always, optional ones while the group still has matched
    /// optional width left. Every absent optional shifts all later request
    /// segments one position to the left, tracked in `skipped`.
    pub fn extract(&self, segments: &[String], matched: &MatchResult) -> PageParameters {
        let mut parameters = PageParameters::new();
        let mut skipped = 0;

        for (group, &width) in self.groups.iter().zip(matched.widths()) {
            let present = width.saturating_sub(group.fixed_width());
            let mut optional_left = present.saturating_sub(group.required());
            let mut position = group.start() - skipped;

            let placeholders = &self.parts[group.start()..group.start() + group.max_count()];
            for part in placeholders {
                let name = match part {
                    Part::Required { name } => name,
                    Part::Optional { name } if optional_left > 0 => {
                        optional_left -= 1;
                        name
                    }
                    _ => continue,
                };

                if let Some(value) = segments.get(position) {
                    parameters.add(name.clone(), value.clone());
                }
                position += 1;
            }

            skipped += group.max_count() - present.min(group.max_count());
        }

        parameters
    }
}
