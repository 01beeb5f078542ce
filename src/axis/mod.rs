pub mod movement_parameters;
pub mod signal;
pub mod state;

use movement_parameters::MoveParams;

/// One motor axis as seen by the coordinator.
///
/// `check_flag` is already normalized by the implementation: `true` means
/// the controller's digital input reads clear. See [`signal`] for how the
/// coordinator interprets that per axis.
#[async_trait::async_trait]
pub trait Axis: Send + Sync {
    fn name(&self) -> &str;

    /// Start a relative move and return once the controller accepted it.
    async fn move_relative(&self, params: MoveParams) -> anyhow::Result<()>;

    /// Stop any motion. Calling it on a stopped axis is a no-op.
    async fn halt(&self) -> anyhow::Result<()>;

    async fn check_reached(&self) -> anyhow::Result<bool>;
    async fn check_flag(&self) -> anyhow::Result<bool>;

    async fn initialize(&self) -> anyhow::Result<()> {
        self.halt().await
    }
}
