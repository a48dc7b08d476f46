//! Signature validation using winnow.
//!
//! Byte-based, since every valid signature is ASCII.

use winnow::{
    combinator::{alt, delimited, repeat},
    error::InputError,
    token::{literal, one_of, take_while},
    ModalResult, Parser,
};

use super::{max_array_dimension, max_dictionary_depth, max_structure_depth, BASIC_TYPES};
use crate::{Error, Result};

type Input<'a> = &'a [u8];

/// Parse a basic type letter.
fn basic_type<'a>(input: &mut Input<'a>) -> ModalResult<(), InputError<Input<'a>>> {
    one_of(|c: u8| BASIC_TYPES.as_bytes().contains(&c))
        .void()
        .parse_next(input)
}

/// Parse a declared type name: starts with a letter or underscore, continues with alphanumeric
/// and underscores.
pub(super) fn type_name<'a>(input: &mut Input<'a>) -> ModalResult<(), InputError<Input<'a>>> {
    (
        one_of(|c: u8| c.is_ascii_alphabetic() || c == b'_'),
        take_while(0.., |c: u8| c.is_ascii_alphanumeric() || c == b'_'),
    )
        .void()
        .parse_next(input)
}

/// Parse a `[Name]` reference.
fn named_reference<'a>(input: &mut Input<'a>) -> ModalResult<(), InputError<Input<'a>>> {
    delimited(literal("["), type_name, literal("]"))
        .void()
        .parse_next(input)
}

/// Parse a dictionary entry: `{` basic-type complete-type `}`.
fn dict_entry<'a>(input: &mut Input<'a>) -> ModalResult<(), InputError<Input<'a>>> {
    delimited(literal("{"), (basic_type, complete_type), literal("}"))
        .void()
        .parse_next(input)
}

/// Parse an array: `a` followed by a dictionary entry or any complete type.
fn array_type<'a>(input: &mut Input<'a>) -> ModalResult<(), InputError<Input<'a>>> {
    literal("a").parse_next(input)?;
    alt((dict_entry, complete_type)).parse_next(input)
}

/// Parse a non-empty structure.
fn struct_type<'a>(input: &mut Input<'a>) -> ModalResult<(), InputError<Input<'a>>> {
    literal("(").parse_next(input)?;
    repeat::<_, _, (), _, _>(1.., complete_type).parse_next(input)?;
    literal(")").void().parse_next(input)
}

/// Parse any single complete type.
fn complete_type<'a>(input: &mut Input<'a>) -> ModalResult<(), InputError<Input<'a>>> {
    alt((
        basic_type,
        literal("v").void(),
        array_type,
        struct_type,
        named_reference,
    ))
    .parse_next(input)
}

/// Validate a signature: a sequence of zero or more complete types within the length and
/// nesting limits.
pub(super) fn validate(signature: &str) -> Result<()> {
    validate_with(signature, |input| {
        repeat::<_, _, (), _, _>(0.., complete_type).parse_next(input)
    })
}

/// Validate the base of a signature: a single complete type, or a bare dictionary entry as left
/// over once the array markers of a dictionary are stripped.
pub(super) fn validate_base(signature: &str) -> Result<()> {
    validate_with(signature, |input| alt((dict_entry, complete_type)).parse_next(input))
}

fn validate_with<F>(signature: &str, mut parser: F) -> Result<()>
where
    F: for<'a> FnMut(&mut Input<'a>) -> ModalResult<(), InputError<Input<'a>>>,
{
    let malformed = |offset, reason| Error::MalformedSignature {
        signature: signature.to_string(),
        offset,
        reason,
    };

    if signature.len() > super::MAX_LENGTH {
        return Err(malformed(super::MAX_LENGTH, "signature is too long"));
    }

    let bytes = signature.as_bytes();
    let mut input = bytes;
    let parsed = parser(&mut input);
    if parsed.is_err() || !input.is_empty() {
        return Err(malformed(bytes.len() - input.len(), "unexpected character"));
    }

    if max_array_dimension(signature) > super::MAX_DEPTH {
        return Err(malformed(0, "too many array dimensions"));
    }
    if max_structure_depth(signature) > super::MAX_DEPTH {
        return Err(malformed(0, "structures nested too deeply"));
    }
    if max_dictionary_depth(signature) > super::MAX_DEPTH {
        return Err(malformed(0, "dictionaries nested too deeply"));
    }

    Ok(())
}
