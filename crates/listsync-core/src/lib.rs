//! # listsync-core
//!
//! Domain types shared by every listsync crate:
//!
//! - [`roster`]: loading the declarative YAML roster file
//! - [`normalize`]: turning raw member records into a [`CanonicalRoster`]
//! - [`membership`]: classifying remote members and planning add/remove sets
//! - [`names`]: remote subgroup addressing (`group+child+suffix`)

#![deny(unsafe_code)]

pub mod errors;
pub mod membership;
pub mod names;
pub mod normalize;
pub mod roster;

pub use errors::RosterError;
pub use membership::{MemberSets, MembershipPlan, ModStatus, format_member_entry};
pub use normalize::{CanonicalRoster, extract_email, normalize_members};
pub use roster::{MemberRecord, RosterFile, load_roster, parse_roster};
