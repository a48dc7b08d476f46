//! Method definitions.

use core::fmt;

use serde::Serialize;

use super::{arg, Arg, Direction};
use crate::Signature;

/// A method of an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Method {
    /// The name of the method.
    name: String,
    /// The arguments, in declaration order.
    args: Vec<Arg>,
    /// Whether the caller expects no reply.
    no_reply: bool,
    /// Whether calls must be made over a secure session.
    is_secure: bool,
}

impl Method {
    /// Creates a new method with the given name and arguments.
    pub fn new(name: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            name: name.into(),
            args,
            no_reply: false,
            is_secure: false,
        }
    }

    /// Marks the method as not expecting a reply.
    pub fn set_no_reply(&mut self, no_reply: bool) {
        self.no_reply = no_reply;
    }

    /// Marks the method as requiring a secure session.
    pub fn set_secure(&mut self, is_secure: bool) {
        self.is_secure = is_secure;
    }

    /// Returns the name of the method.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the arguments.
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub(crate) fn args_mut(&mut self) -> &mut [Arg] {
        &mut self.args
    }

    /// Returns the argument with the given name.
    pub fn arg(&self, name: &str) -> Option<&Arg> {
        self.args.iter().find(|arg| arg.name() == name)
    }

    /// Returns an iterator over the input arguments.
    pub fn inputs(&self) -> impl Iterator<Item = &Arg> {
        self.args
            .iter()
            .filter(|arg| arg.direction() == Direction::In)
    }

    /// Returns an iterator over the output arguments.
    pub fn outputs(&self) -> impl Iterator<Item = &Arg> {
        self.args
            .iter()
            .filter(|arg| arg.direction() == Direction::Out)
    }

    /// The concatenated signature of the arguments going in `direction`, as marshalled.
    pub fn signature(&self, direction: Direction) -> Signature {
        arg::signature_of(&self.args, direction)
    }

    /// Whether the caller expects no reply.
    pub fn no_reply(&self) -> bool {
        self.no_reply
    }

    /// Whether calls must be made over a secure session.
    pub fn is_secure(&self) -> bool {
        self.is_secure
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method {}(", self.name)?;
        let mut first = true;
        for arg in self.inputs() {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{arg}")?;
        }
        write!(f, ")")?;

        if self.outputs().next().is_some() {
            write!(f, " -> (")?;
            let mut first = true;
            for arg in self.outputs() {
                if !first {
                    write!(f, ", ")?;
                }
                first = false;
                write!(f, "{arg}")?;
            }
            write!(f, ")")?;
        }

        Ok(())
    }
}
