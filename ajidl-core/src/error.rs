use crate::idl::MemberKind;

/// The Error type for the ajidl-core crate.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// A signature that does not follow the signature grammar.
    MalformedSignature {
        /// The offending signature.
        signature: String,
        /// Byte offset at which the signature stopped making sense.
        offset: usize,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// Two distinct declared types ended up with the same name.
    DuplicateDeclaredName {
        /// The interface being resolved.
        interface: String,
        /// The name declared twice.
        name: String,
        /// The anonymous container whose materialized type clashed, if any.
        signature: Option<String>,
    },
    /// A declared type name that cannot be used in a `[Name]` reference.
    InvalidTypeName {
        /// The interface declaring the type.
        interface: String,
        /// The rejected name.
        name: String,
    },
    /// A dictionary whose key is not a basic type.
    InconsistentKeyType {
        /// The interface declaring the dictionary.
        interface: String,
        /// The name of the dictionary.
        dict: String,
        /// The key signature.
        key: String,
    },
    /// A `[Name]` reference to a type the interface does not declare.
    UnknownNamedType {
        /// The interface the reference was looked up in.
        interface: String,
        /// The argument or field holding the reference.
        member: String,
        /// The referenced name.
        name: String,
    },
    /// A declared type that contains itself.
    RecursiveNamedType {
        /// The interface declaring the type.
        interface: String,
        /// The type that refers back to itself.
        name: String,
    },
    /// Two interface members, arguments or fields with the same name.
    DuplicateMember {
        /// The interface, method, signal or struct the name is duplicated in.
        scope: String,
        /// What kind of member it is.
        kind: MemberKind,
        /// The duplicated name.
        name: String,
    },
    /// An interface name that is not at least two dot-separated elements.
    InvalidName(String),
    /// The XML document could not be parsed.
    #[cfg(feature = "xml")]
    Xml(roxmltree::Error),
    /// The XML document does not describe valid interfaces.
    #[cfg(feature = "xml")]
    InvalidXml {
        /// What is wrong.
        message: String,
        /// 1-based line of the offending element.
        line: u32,
        /// 1-based column of the offending element.
        column: u32,
    },
}

/// The Result type for the ajidl-core crate.
pub type Result<T> = core::result::Result<T, Error>;

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            #[cfg(feature = "xml")]
            Error::Xml(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "xml")]
impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::Xml(e)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::MalformedSignature {
                signature,
                offset,
                reason,
            } => write!(
                f,
                "Malformed signature '{signature}' at offset {offset}: {reason}"
            ),
            Error::DuplicateDeclaredName {
                interface,
                name,
                signature,
            } => {
                write!(
                    f,
                    "Duplicate declared type name '{name}' in interface '{interface}'"
                )?;
                if let Some(signature) = signature {
                    write!(f, ", materialized for '{signature}'")?;
                }

                Ok(())
            }
            Error::InvalidTypeName { interface, name } => write!(
                f,
                "Invalid type name '{name}' in interface '{interface}'"
            ),
            Error::InconsistentKeyType {
                interface,
                dict,
                key,
            } => write!(
                f,
                "Dict '{dict}' in interface '{interface}' must have a basic type as key, not '{key}'"
            ),
            Error::UnknownNamedType {
                interface,
                member,
                name,
            } => write!(
                f,
                "Member '{member}' of interface '{interface}' refers to undeclared type '{name}'"
            ),
            Error::RecursiveNamedType { interface, name } => write!(
                f,
                "Type '{name}' in interface '{interface}' contains itself"
            ),
            Error::DuplicateMember { scope, kind, name } => {
                write!(f, "Duplicate {kind} name '{name}' in '{scope}'")
            }
            Error::InvalidName(name) => write!(f, "Invalid interface name '{name}'"),
            #[cfg(feature = "xml")]
            Error::Xml(e) => write!(f, "XML error: {e}"),
            #[cfg(feature = "xml")]
            Error::InvalidXml {
                message,
                line,
                column,
            } => write!(f, "{message} (line {line}, column {column})"),
        }
    }
}
