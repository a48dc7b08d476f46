//! Method and signal arguments.

use core::{fmt, ops::Deref, str::FromStr};

use serde::Serialize;

use super::TypedMember;
use crate::Signature;

/// The direction of an argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Passed by the caller.
    #[default]
    In,
    /// Returned to the caller, or emitted by a signal.
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::In => "in",
            Direction::Out => "out",
        })
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            _ => Err(()),
        }
    }
}

/// An argument of a method or signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Arg {
    #[serde(flatten)]
    member: TypedMember,
    direction: Direction,
    /// The signatures a variant argument is documented to carry.
    #[serde(skip_serializing_if = "Option::is_none")]
    variant_type: Option<Signature>,
}

impl Arg {
    /// Creates a new argument.
    pub fn new(name: impl Into<String>, signature: Signature, direction: Direction) -> Self {
        Self {
            member: TypedMember::new(name, signature),
            direction,
            variant_type: None,
        }
    }

    /// Sets the documented variant type.
    pub fn with_variant_type(mut self, variant_type: Signature) -> Self {
        self.variant_type = Some(variant_type);
        self
    }

    /// The typed member behind this argument.
    pub fn member(&self) -> &TypedMember {
        &self.member
    }

    pub(crate) fn member_mut(&mut self) -> &mut TypedMember {
        &mut self.member
    }

    /// Returns the direction of the argument.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the documented variant type, if any.
    pub fn variant_type(&self) -> Option<&Signature> {
        self.variant_type.as_ref()
    }
}

impl Deref for Arg {
    type Target = TypedMember;

    fn deref(&self) -> &TypedMember {
        &self.member
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.member)
    }
}

/// Concatenated signature of the arguments going in `direction`.
pub(super) fn signature_of(args: &[Arg], direction: Direction) -> Signature {
    let signature = args
        .iter()
        .filter(|arg| arg.direction == direction)
        .map(|arg| arg.signature().as_str())
        .collect();

    Signature::from_parts(signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg_creation() {
        let arg = Arg::new("myArg", Signature::new("(bid)").unwrap(), Direction::In);
        assert_eq!(arg.name(), "myArg");
        assert_eq!(arg.signature(), "(bid)");
        assert_eq!(arg.direction(), Direction::In);
        assert!(arg.variant_type().is_none());
        assert!(arg.signature().is_structure());

        let arg = arg.with_variant_type(Signature::new("s").unwrap());
        assert_eq!(arg.variant_type().unwrap(), "s");
    }

    #[test]
    fn direction_parsing() {
        assert_eq!("in".parse::<Direction>(), Ok(Direction::In));
        assert_eq!("out".parse::<Direction>(), Ok(Direction::Out));
        assert_eq!("sideways".parse::<Direction>(), Err(()));
        assert_eq!(Direction::default(), Direction::In);
    }

    #[test]
    fn directional_signature() {
        let args = [
            Arg::new("a", Signature::new("i").unwrap(), Direction::In),
            Arg::new("b", Signature::new("a{sv}").unwrap(), Direction::Out),
            Arg::new("c", Signature::new("(ii)").unwrap(), Direction::In),
        ];
        assert_eq!(signature_of(&args, Direction::In), "i(ii)");
        assert_eq!(signature_of(&args, Direction::Out), "a{sv}");
    }

    #[test]
    fn arg_serialization() {
        let arg = Arg::new("value", Signature::new("v").unwrap(), Direction::Out)
            .with_variant_type(Signature::new("s").unwrap());
        assert_eq!(
            serde_json::to_string(&arg).unwrap(),
            r#"{"name":"value","signature":"v","direction":"out","variant_type":"s"}"#
        );
    }
}
