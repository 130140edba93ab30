//! In-memory caches fronting the repositories.

pub mod member_directory;

pub use member_directory::MemberDirectoryCache;
