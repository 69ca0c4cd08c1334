//! Tag-invalidated memo cache for service reads.
//!
//! Services wrap each read in [`MemoCache::get_or_compute`] with a
//! [`CacheKey`] naming the read and its arguments plus the [`CacheTag`]s it
//! depends on. Mutations call [`MemoCache::revalidate`] with the tags they
//! touched, usually built through a [`TagSelector`].
//!
//! # Example
//!
//! ```ignore
//! let teams = cache
//!     .get_or_compute(
//!         CacheKey::new("getUserTeams").arg(user_id).arg(organization_id),
//!         &[TagScope::Team.by_user_id(user_id), TagScope::Team.by_organization_id(organization_id)],
//!         || storage.team_list_by_organization(organization_id, TeamMemberFilter::MemberOf(user_id)),
//!     )
//!     .await?;
//!
//! // after a write
//! cache
//!     .revalidate_selector(TagScope::Team, &TagSelector::new().with_id(team_id))
//!     .await;
//! ```

pub mod memo;
pub mod tags;
pub mod traits;
pub mod watermark;

pub use memo::{CacheConfig, MemoCache};
pub use tags::{CacheKey, CacheTag, TagDimension, TagScope, TagSelector};
pub use traits::{CacheStats, Memoizable};
pub use watermark::{TagWatermarks, Watermark, WatermarkSnapshot};
