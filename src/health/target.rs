//! The supervision contract.
//!
//! A target bundles the two capabilities the health loop needs: a probe
//! reporting liveness and a recovery action repairing the resource. The loop
//! never sees the resource type behind them.

use tokio_util::sync::CancellationToken;

/// Something the health loop can supervise.
///
/// Both methods are blocking and run on tokio's blocking pool, one call at a
/// time per tick. A panic in either is caught by the loop.
pub trait HealthTarget: Send + Sync + 'static {
    /// Report whether the resource is usable right now.
    fn probe(&self) -> bool;

    /// Repair or replace the resource after a failed probe.
    ///
    /// Returns false when the repair did not take; the loop retries on the
    /// next failing tick.
    fn recover(&self, cancel: &CancellationToken) -> bool;
}

/// A target built from a pair of closures.
pub struct FnTarget<P, R> {
    probe: P,
    recover: R,
}

/// Build a target from a probe closure and a recovery closure.
pub fn from_fns<P, R>(probe: P, recover: R) -> FnTarget<P, R>
where
    P: Fn() -> bool + Send + Sync + 'static,
    R: Fn(&CancellationToken) -> bool + Send + Sync + 'static,
{
    FnTarget { probe, recover }
}

impl<P, R> HealthTarget for FnTarget<P, R>
where
    P: Fn() -> bool + Send + Sync + 'static,
    R: Fn(&CancellationToken) -> bool + Send + Sync + 'static,
{
    fn probe(&self) -> bool {
        (self.probe)()
    }

    fn recover(&self, cancel: &CancellationToken) -> bool {
        (self.recover)(cancel)
    }
}
