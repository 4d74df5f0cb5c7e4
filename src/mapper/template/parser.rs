//! Parse mount paths into [`Part`]s.
//!
//! ```text
//! path        : '/'* ( part ( '/'+ part )* )? '/'*
//! part        : required
//!             | optional
//!             | literal
//! required    : '$' '{' name '}'
//! optional    : '#' '{' name '}'
//! name        : ( ALPHA | '_' ) ( ALPHA | DIGIT | '_' | '-' | '.' )*
//! literal     : ( any byte except '/' )+
//! ```
//!
//! A segment is only a placeholder if it is wrapped entirely; `${a}b` or a
//! lone `${` are literals.

use super::Part;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParseError {
    #[error("encountered byte 0x{actual:x} at position {pos}, but expected {expected}")]
    Expected {
        expected: &'static str,
        actual: u8,
        pos: usize,
    },
    #[error("placeholder at position {pos} has an empty name")]
    EmptyPlaceholderName { pos: usize },
    #[error("placeholder `{name}` occurs more than once")]
    DuplicatePlaceholder { name: String },
}

type Result<T> = std::result::Result<T, ParseError>;

pub struct Parser<'b> {
    /// Mount path to parse.
    bytes: &'b [u8],
    /// current parse position.
    cursor: usize,
}

impl<'b> Parser<'b> {
    /// Create a new [`Parser`].
    pub fn new(bytes: &'b [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }

    /// Parse a mount path.
    pub fn parse(&mut self) -> Result<Vec<Part>> {
        let mut parts: Vec<Part> = Vec::new();

        loop {
            self.skip_while(|x| x == b'/');
            if self.peek().is_none() {
                break;
            }

            let start = self.cursor;
            let segment = self.segment();
            let part = self.part(segment, start)?;

            if let Some(name) = part.placeholder_name() {
                if parts.iter().any(|p| p.placeholder_name() == Some(name)) {
                    return Err(ParseError::DuplicatePlaceholder {
                        name: name.to_owned(),
                    });
                }
            }
            parts.push(part);
        }

        Ok(parts)
    }

    /// Classifies one segment starting at `pos`.
    fn part(&self, segment: &[u8], pos: usize) -> Result<Part> {
        match segment {
            [b'$', b'{', name @ .., b'}'] => Ok(Part::Required {
                name: parameter_name(name, pos + 2)?,
            }),
            [b'#', b'{', name @ .., b'}'] => Ok(Part::Optional {
                name: parameter_name(name, pos + 2)?,
            }),
            literal => Ok(Part::Literal(String::from_utf8_lossy(literal).into_owned())),
        }
    }

    /// Consumes bytes up to the next `/` or the end of input.
    fn segment(&mut self) -> &'b [u8] {
        let bytes = self.bytes;
        let start = self.cursor;
        self.skip_while(|x| x != b'/');
        &bytes[start..self.cursor]
    }

    fn skip_while<P>(&mut self, predicate: P)
    where
        P: Fn(u8) -> bool,
    {
        while self.peek().is_some_and(&predicate) {
            self.cursor += 1;
        }
    }

    /// Peeks at the next byte without consuming it or returns [`None`] if
    /// the end of input is reached.
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.cursor).copied()
    }
}

/// Validates a placeholder name whose first byte sits at `pos`.
pub(super) fn parameter_name(name: &[u8], pos: usize) -> Result<String> {
    let Some((&first, rest)) = name.split_first() else {
        return Err(ParseError::EmptyPlaceholderName { pos: pos - 2 });
    };

    if !(first.is_ascii_alphabetic() || first == b'_') {
        return Err(ParseError::Expected {
            expected: "a letter or '_'",
            actual: first,
            pos,
        });
    }

    if let Some(offset) = rest
        .iter()
        .position(|&x| !(x.is_ascii_alphanumeric() || matches!(x, b'_' | b'-' | b'.')))
    {
        return Err(ParseError::Expected {
            expected: "a placeholder name character",
            actual: rest[offset],
            pos: pos + 1 + offset,
        });
    }

    // only ASCII was accepted above
    Ok(name.iter().map(|&x| char::from(x)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(path: &str) -> Result<Vec<Part>> {
        Parser::new(path.as_bytes()).parse()
    }

    fn literal(s: &str) -> Part {
        Part::Literal(s.to_owned())
    }

    fn required(s: &str) -> Part {
        Part::Required { name: s.to_owned() }
    }

    fn optional(s: &str) -> Part {
        Part::Optional { name: s.to_owned() }
    }

    #[test]
    fn skip_while_skips_while_predicate_is_true() {
        let mut parser = Parser::new(b"///abc");
        parser.skip_while(|x| x == b'/');
        assert_eq!(parser.cursor, 3);
    }

    #[test]
    fn segment_does_not_consume_slash() {
        let mut parser = Parser::new(b"abc/def/");
        assert_eq!(parser.segment(), b"abc");
        assert_eq!(parser.cursor, 3);
    }

    #[test]
    fn parse_literal_mount_path() {
        assert_eq!(
            parse("/some/mount/path").unwrap(),
            vec![literal("some"), literal("mount"), literal("path")]
        );
    }

    #[test]
    fn leading_and_repeated_slashes_are_ignored() {
        assert_eq!(
            parse("some//mount/").unwrap(),
            vec![literal("some"), literal("mount")]
        );
        assert_eq!(parse("/").unwrap(), Vec::<Part>::new());
        assert_eq!(parse("").unwrap(), Vec::<Part>::new());
    }

    #[test]
    fn parse_placeholders() {
        assert_eq!(
            parse("/some/#{param1}/path/${param2}/#{param_3}").unwrap(),
            vec![
                literal("some"),
                optional("param1"),
                literal("path"),
                required("param2"),
                optional("param_3"),
            ]
        );
    }

    #[test]
    fn partially_wrapped_segments_are_literals() {
        assert_eq!(
            parse("/${a}b/${/x}").unwrap(),
            vec![literal("${a}b"), literal("${"), literal("x}")]
        );
    }

    #[test]
    fn empty_placeholder_name_is_rejected() {
        assert_eq!(
            parse("/mount/${}"),
            Err(ParseError::EmptyPlaceholderName { pos: 7 })
        );
    }

    #[test]
    fn invalid_placeholder_name_is_rejected() {
        assert_eq!(
            parse("/#{1abc}"),
            Err(ParseError::Expected {
                expected: "a letter or '_'",
                actual: b'1',
                pos: 3,
            })
        );
        assert_eq!(
            parse("/${ab c}"),
            Err(ParseError::Expected {
                expected: "a placeholder name character",
                actual: b' ',
                pos: 5,
            })
        );
    }

    #[test]
    fn duplicate_placeholder_is_rejected() {
        assert_eq!(
            parse("/${id}/x/#{id}"),
            Err(ParseError::DuplicatePlaceholder {
                name: "id".to_owned()
            })
        );
    }
}
