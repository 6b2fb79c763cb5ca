//! The directory backend seam.

use async_trait::async_trait;

use crate::errors::DirectoryError;
use crate::types::{MemberEntry, Page, SubgroupEntry};

/// Page-level operations against a mailing-list directory.
///
/// Cursors are opaque: `None` requests the first page. Implementations make
/// exactly one request per call and never retry.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    /// One page of the subgroups of `group`.
    async fn subgroups_page(
        &self,
        group: &str,
        cursor: Option<&str>,
    ) -> Result<Page<SubgroupEntry>, DirectoryError>;

    /// One page of the members of `list`.
    async fn members_page(
        &self,
        list: &str,
        cursor: Option<&str>,
    ) -> Result<Page<MemberEntry>, DirectoryError>;

    /// Directly subscribe one member to `list` within `group`.
    ///
    /// `entry` is either a bare address or `Name <address>`.
    async fn direct_add(&self, group: &str, list: &str, entry: &str) -> Result<(), DirectoryError>;

    /// Remove `emails` from `list` in one request. Callers never pass an
    /// empty slice.
    async fn bulk_remove(&self, list: &str, emails: &[String]) -> Result<(), DirectoryError>;
}
