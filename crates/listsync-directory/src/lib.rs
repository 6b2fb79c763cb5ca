//! # listsync-directory
//!
//! Access to the remote mailing-list directory.
//!
//! - [`api::DirectoryApi`]: page-level operations every backend implements
//! - [`groupsio::GroupsIoClient`]: the Groups.io backend (cookie session +
//!   csrf token, established once per run)
//! - [`paging`]: cursor-driven listing of subgroups and members on top of any
//!   [`DirectoryApi`]
//! - [`mock::ScriptedDirectory`]: in-memory backend for tests
//!
//! Every call returns `Result<_, DirectoryError>`; the service's
//! `{"object": "error", "type": ...}` envelope decodes to
//! [`DirectoryError::Api`].

#![deny(unsafe_code)]

pub mod api;
pub mod errors;
pub mod groupsio;
pub mod mock;
pub mod paging;
pub mod types;

pub use api::DirectoryApi;
pub use errors::DirectoryError;
pub use groupsio::GroupsIoClient;
pub use mock::{Call, ScriptedDirectory};
pub use paging::{SubgroupCatalog, list_members, list_subgroups};
pub use types::{MemberEntry, Page, SubgroupEntry};
