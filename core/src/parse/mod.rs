pub mod context;
pub mod headers;
pub mod members;

pub use headers::collect_header;
pub use members::{parse_members, ParsedMembers};

#[cfg(test)]
mod members_test;
