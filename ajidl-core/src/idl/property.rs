//! Property definitions.

use core::{fmt, str::FromStr};

use serde::Serialize;

use super::TypedMember;
use crate::Signature;

/// How a property may be accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    /// Read only.
    Read,
    /// Write only.
    Write,
    /// Read and write.
    ReadWrite,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Access::Read => "read",
            Access::Write => "write",
            Access::ReadWrite => "readwrite",
        })
    }
}

impl FromStr for Access {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "read" => Ok(Access::Read),
            "write" => Ok(Access::Write),
            "readwrite" => Ok(Access::ReadWrite),
            _ => Err(()),
        }
    }
}

/// A property of an interface.
///
/// The value is a typed member carrying the property's own name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    #[serde(flatten)]
    value: TypedMember,
    access: Access,
    is_secure: bool,
}

impl Property {
    /// Creates a new property.
    pub fn new(name: impl Into<String>, signature: Signature, access: Access) -> Self {
        Self {
            value: TypedMember::new(name, signature),
            access,
            is_secure: false,
        }
    }

    /// Marks the property as requiring a secure session.
    pub fn set_secure(&mut self, is_secure: bool) {
        self.is_secure = is_secure;
    }

    /// Returns the name of the property.
    pub fn name(&self) -> &str {
        self.value.name()
    }

    /// The value of the property.
    pub fn value(&self) -> &TypedMember {
        &self.value
    }

    pub(crate) fn value_mut(&mut self) -> &mut TypedMember {
        &mut self.value
    }

    /// Returns the access of the property.
    pub fn access(&self) -> Access {
        self.access
    }

    /// Whether the property can be read.
    pub fn is_readable(&self) -> bool {
        matches!(self.access, Access::Read | Access::ReadWrite)
    }

    /// Whether the property can be written.
    pub fn is_writable(&self) -> bool {
        matches!(self.access, Access::Write | Access::ReadWrite)
    }

    /// Whether the property must be accessed over a secure session.
    pub fn is_secure(&self) -> bool {
        self.is_secure
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "property {} {}", self.value, self.access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_access() {
        let sig = Signature::new("a{sv}").unwrap();
        let read = Property::new("Settings", sig.clone(), Access::Read);
        assert!(read.is_readable());
        assert!(!read.is_writable());

        let write = Property::new("Settings", sig.clone(), Access::Write);
        assert!(!write.is_readable());
        assert!(write.is_writable());

        let both = Property::new("Settings", sig, "readwrite".parse().unwrap());
        assert!(both.is_readable());
        assert!(both.is_writable());
        assert_eq!(both.to_string(), "property Settings: a{sv} readwrite");
        assert!("readonly".parse::<Access>().is_err());
    }
}
