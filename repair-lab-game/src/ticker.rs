//! Periodic heartbeat for the focus countdown and the combo window.
//!
//! Cancellation is cooperative: flip the watch channel to `true` (or drop the
//! sender) and the loop returns after the current tick.
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Call `on_tick` once per `period` until shutdown is signalled. Returns the
/// number of ticks delivered. The interval's immediate first tick is skipped.
pub async fn run<F: FnMut()>(
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut on_tick: F,
) -> u64 {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    let mut ticks = 0_u64;
    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = ticker.tick() => {
                on_tick();
                ticks += 1;
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    log::debug!("ticker stopped after {ticks} ticks");
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn ticks_until_shutdown() {
        let (tx, rx) = watch::channel(false);
        let seen = Cell::new(0_u32);
        let (ticks, ()) = tokio::join!(
            run(TICK_PERIOD, rx, || seen.set(seen.get() + 1)),
            async {
                sleep(Duration::from_millis(5_500)).await;
                tx.send(true).unwrap();
            }
        );
        assert_eq!(ticks, 5);
        assert_eq!(seen.get(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_sender_stops_loop() {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        let ticks = run(TICK_PERIOD, rx, || {}).await;
        assert!(ticks <= 1);
    }
}
