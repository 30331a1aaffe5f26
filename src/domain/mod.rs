//! Domain-level rules that do not depend on the transport or the store.

pub mod policy;
