//! The interface model: typed members, the members of an interface, declared types and the
//! resolution of anonymous structures and dictionaries into declared types.

#![deny(missing_docs)]

mod member;
pub use member::{Field, MemberKind, TypeView, TypedMember};

mod arg;
pub use arg::{Arg, Direction};

mod method;
pub use method::Method;

mod signal;
pub use signal::Signal;

mod property;
pub use property::{Access, Property};

mod struct_def;
pub use struct_def::StructDef;

mod dict_def;
pub use dict_def::DictDef;

mod declared;
pub use declared::{DeclaredTypes, NamedType, NamedTypes};

pub mod container;
pub use container::Container;

mod resolve;

mod interface;
pub use interface::Interface;
