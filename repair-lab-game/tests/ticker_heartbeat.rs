use chrono::NaiveDate;
use repair_lab_game::ticker::{self, TICK_PERIOD};
use repair_lab_game::{Clock, FocusPhase, LabEngine, ManualClock, MemoryStorage, SessionConfig};
use std::cell::RefCell;
use std::time::Duration;
use tokio::sync::watch;

#[tokio::test(start_paused = true)]
async fn heartbeat_drives_focus_to_completion() {
    let storage = MemoryStorage::default();
    let engine = LabEngine::new(
        storage,
        SessionConfig {
            focus_minutes: 1,
            seed: Some(21),
            ..SessionConfig::default_config()
        },
    );
    let clock = ManualClock::at_noon(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
    let session = RefCell::new(engine.create_session_with_clock(&clock));
    session.borrow_mut().start_focus();

    let (tx, rx) = watch::channel(false);
    let (ticks, ()) = tokio::join!(
        ticker::run(TICK_PERIOD, rx, || {
            clock.advance_secs(1);
            session.borrow_mut().tick(&clock.now());
        }),
        async {
            tokio::time::sleep(Duration::from_millis(60_500)).await;
            tx.send(true).unwrap();
        }
    );

    assert_eq!(ticks, 60);
    let session = session.into_inner();
    assert_eq!(session.focus().phase(), FocusPhase::Completed);
    assert_eq!(session.state().focus_completed, 1);
}
