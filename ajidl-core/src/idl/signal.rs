//! Signal definitions.

use core::fmt;

use serde::Serialize;

use super::{arg, Arg, Direction};
use crate::Signature;

/// A signal of an interface. All of its arguments go out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signal {
    name: String,
    args: Vec<Arg>,
    is_secure: bool,
}

impl Signal {
    /// Creates a new signal with the given name and arguments.
    pub fn new(name: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            name: name.into(),
            args,
            is_secure: false,
        }
    }

    /// Marks the signal as requiring a secure session.
    pub fn set_secure(&mut self, is_secure: bool) {
        self.is_secure = is_secure;
    }

    /// Returns the name of the signal.
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

    /// The concatenated signature of the arguments, as marshalled.
    pub fn signature(&self) -> Signature {
        arg::signature_of(&self.args, Direction::Out)
    }

    /// Whether the signal must be sent over a secure session.
    pub fn is_secure(&self) -> bool {
        self.is_secure
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "signal {}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}
