use crate::parameters::PageParameters;

use super::{Part, PathTemplate};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("no value for required placeholder `{name}`")]
    MissingRequiredParameter { name: String },
}

/// Output of [`PathTemplate::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPath {
    /// Mount segments with placeholders substituted.
    pub segments: Vec<String>,
    /// Parameters not bound to a placeholder, left for the parameters
    /// encoder.
    pub remaining: PageParameters,
}

impl PathTemplate {
    /// Substitutes placeholders with values taken out of `parameters`.
    ///
    /// Absent or empty optional placeholders are dropped from the output so
    /// later segments close the gap, mirroring how
    /// [`extract`](Self::extract) shifts them back. A required placeholder
    /// without a non-empty value fails the whole build.
    pub fn build(&self, mut parameters: PageParameters) -> Result<BuiltPath, BuildError> {
        let mut segments = Vec::with_capacity(self.parts.len());

        for part in &self.parts {
            match part {
                Part::Literal(literal) => segments.push(literal.clone()),
                Part::Required { name } => {
                    let value = parameters
                        .remove(name)
                        .filter(|value| !value.is_empty())
                        .ok_or_else(|| BuildError::MissingRequiredParameter { name: name.clone() })?;
                    segments.push(value);
                }
                Part::Optional { name } => {
                    if let Some(value) = parameters.remove(name).filter(|value| !value.is_empty()) {
                        segments.push(value);
                    }
                }
            }
        }

        Ok(BuiltPath {
            segments,
            remaining: parameters,
        })
    }
}
