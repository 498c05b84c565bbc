//! Parsing for the minimap2 `cs` difference string
//!
//! The cs tag describes an alignment as a sequence of operations, each introduced by a sigil:
//!
//! ```text
//! :N      N exact matches
//! =ACGT   exact matches given as sequence (long form)
//! *ct     substitution, reference base 'c' replaced by query base 't'
//! +acg    insertion into the reference
//! -acg    deletion from the reference
//! ```
//!

use std::fmt;

pub const CS_TAG_PREFIX: &str = "cs:Z:";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CsOp {
    Match(u64),
    Substitution { ref_base: u8, query_base: u8 },
    Insertion(Vec<u8>),
    Deletion(Vec<u8>),
}

impl CsOp {
    /// Number of reference positions consumed by this operation
    pub fn ref_len(&self) -> u64 {
        match self {
            CsOp::Match(n) => *n,
            CsOp::Substitution { .. } => 1,
            CsOp::Insertion(_) => 0,
            CsOp::Deletion(seq) => seq.len() as u64,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum CsTagError {
    UnknownSigil { sigil: char, offset: usize },
    InvalidMatchLength { offset: usize },
    InvalidSubstitution { offset: usize },
    EmptyOperation { sigil: char, offset: usize },
}

impl fmt::Display for CsTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsTagError::UnknownSigil { sigil, offset } => {
                write!(f, "Unrecognized cs operation '{sigil}' at offset {offset}")
            }
            CsTagError::InvalidMatchLength { offset } => {
                write!(f, "Invalid exact match length at offset {offset}")
            }
            CsTagError::InvalidSubstitution { offset } => {
                write!(
                    f,
                    "Substitution at offset {offset} must be followed by exactly two bases"
                )
            }
            CsTagError::EmptyOperation { sigil, offset } => {
                write!(f, "Operation '{sigil}' at offset {offset} has no content")
            }
        }
    }
}

impl std::error::Error for CsTagError {}

/// Parse a cs tag string into its operations
///
/// The `cs:Z:` prefix is optional. Parsing is a single pass over the string, and any unexpected
/// character is an error rather than being skipped.
///
pub fn parse_cs_tag(tag: &str) -> Result<Vec<CsOp>, CsTagError> {
    let (body, base_offset) = match tag.strip_prefix(CS_TAG_PREFIX) {
        Some(x) => (x.as_bytes(), CS_TAG_PREFIX.len()),
        None => (tag.as_bytes(), 0),
    };

    // Length of the run of bytes starting at `start` that satisfy `pred`
    let run_len = |start: usize, pred: fn(&u8) -> bool| -> usize {
        body[start..].iter().take_while(|&x| pred(x)).count()
    };

    let mut ops = Vec::new();
    let mut i = 0;
    while i < body.len() {
        let sigil = body[i] as char;
        let offset = base_offset + i;
        let content_start = i + 1;
        match sigil {
            ':' => {
                let n = run_len(content_start, u8::is_ascii_digit);
                if n == 0 {
                    return Err(CsTagError::InvalidMatchLength { offset });
                }
                let digits = std::str::from_utf8(&body[content_start..content_start + n])
                    .map_err(|_| CsTagError::InvalidMatchLength { offset })?;
                let count = digits
                    .parse::<u64>()
                    .map_err(|_| CsTagError::InvalidMatchLength { offset })?;
                ops.push(CsOp::Match(count));
                i = content_start + n;
            }
            '*' => {
                let n = run_len(content_start, u8::is_ascii_alphabetic);
                if n != 2 {
                    return Err(CsTagError::InvalidSubstitution { offset });
                }
                ops.push(CsOp::Substitution {
                    ref_base: body[content_start],
                    query_base: body[content_start + 1],
                });
                i = content_start + n;
            }
            '=' | '+' | '-' => {
                let n = run_len(content_start, u8::is_ascii_alphabetic);
                if n == 0 {
                    return Err(CsTagError::EmptyOperation { sigil, offset });
                }
                let seq = body[content_start..content_start + n].to_vec();
                ops.push(match sigil {
                    '=' => CsOp::Match(n as u64),
                    '+' => CsOp::Insertion(seq),
                    _ => CsOp::Deletion(seq),
                });
                i = content_start + n;
            }
            _ => {
                return Err(CsTagError::UnknownSigil { sigil, offset });
            }
        }
    }
    Ok(ops)
}

/// A single base substitution found by walking a cs string
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Substitution {
    /// Reference position in the same coordinate space as the walk start position
    pub pos: i64,
    pub ref_base: u8,
    pub query_base: u8,
}

/// Walk the cs operations from reference position `ref_start` and report every substitution
///
/// Each substitution is reported at the running reference coordinate, before the coordinate is
/// advanced past it.
///
pub fn get_substitutions(ops: &[CsOp], ref_start: i64) -> Vec<Substitution> {
    let mut pos = ref_start;
    let mut substitutions = Vec::new();
    for op in ops {
        if let CsOp::Substitution {
            ref_base,
            query_base,
        } = op
        {
            substitutions.push(Substitution {
                pos,
                ref_base: *ref_base,
                query_base: *query_base,
            });
        }
        pos += op.ref_len() as i64;
    }
    substitutions
}
