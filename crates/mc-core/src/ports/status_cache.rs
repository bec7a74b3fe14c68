//! Connect status cache port
//!
//! Best-effort mirror of the last connected status, used only to seed the
//! in-memory value before the authoritative fetch resolves.

use async_trait::async_trait;

use crate::connect::ConnectStatus;

#[async_trait]
pub trait StatusCachePort: Send + Sync {
    /// Cached status, or `None` when absent or unreadable.
    async fn read(&self) -> Option<ConnectStatus>;

    /// Store `status` when it has a connected account, otherwise drop the entry.
    async fn write(&self, status: Option<&ConnectStatus>) -> anyhow::Result<()>;

    async fn clear(&self) -> anyhow::Result<()>;
}
