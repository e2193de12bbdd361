//! Named logic scenarios. Each check drives a seeded in-memory lab and fails
//! with a description of the first expectation that did not hold.
use anyhow::{Context, Result, ensure};
use chrono::NaiveDate;
use repair_lab_game::session::RequestKind;
use repair_lab_game::{
    Clock, ContentService, FocusPhase, LabEngine, ManualClock, MemoryStorage, PlanQuery,
    PlayerState, ProgressionEvent, RngBundle, SessionConfig, synthesize_forecast,
    synthesize_insight,
};

pub type ScenarioCheck = fn(u64) -> Result<()>;

#[derive(Debug, Clone, Copy)]
pub struct TestScenario {
    pub name: &'static str,
    pub description: &'static str,
    pub check: ScenarioCheck,
}

const SCENARIOS: [TestScenario; 10] = [
    TestScenario {
        name: "smoke",
        description: "Generate a plan, complete it, and persist the result",
        check: smoke,
    },
    TestScenario {
        name: "plan-bounds",
        description: "Plans stay within confidence/intensity/eta/energy bounds",
        check: plan_bounds,
    },
    TestScenario {
        name: "combo-ramp",
        description: "Rapid fixes ramp the multiplier to the x5.0 cap with godmode bonuses",
        check: combo_ramp,
    },
    TestScenario {
        name: "combo-expiry",
        description: "A lapsed combo drops back to x1.0 on the next tick",
        check: combo_expiry,
    },
    TestScenario {
        name: "streak-days",
        description: "Consecutive days extend the streak, gaps restart it",
        check: streak_days,
    },
    TestScenario {
        name: "focus-timer",
        description: "A one-minute focus session pays out exactly once",
        check: focus_timer,
    },
    TestScenario {
        name: "chaos-mode",
        description: "Chaos rerolls stay in range and never exceed the multiplier cap",
        check: chaos_mode,
    },
    TestScenario {
        name: "intel-feed",
        description: "Insight rankings and forecast walks respect their bounds",
        check: intel_feed,
    },
    TestScenario {
        name: "persistence-roundtrip",
        description: "Saved snapshots reload bit-identically",
        check: persistence_roundtrip,
    },
    TestScenario {
        name: "stale-reset",
        description: "Responses issued before a reset are discarded",
        check: stale_reset,
    },
];

pub fn list_scenarios() -> impl Iterator<Item = (&'static str, &'static str)> {
    SCENARIOS
        .iter()
        .map(|scenario| (scenario.name, scenario.description))
}

pub fn scenario_names() -> Vec<String> {
    SCENARIOS
        .iter()
        .map(|scenario| scenario.name.to_string())
        .collect()
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    SCENARIOS
        .iter()
        .find(|scenario| scenario.name.eq_ignore_ascii_case(name))
        .copied()
}

fn seeded_engine(storage: MemoryStorage, seed: u64) -> LabEngine<MemoryStorage> {
    LabEngine::new(
        storage,
        SessionConfig {
            seed: Some(seed),
            ..SessionConfig::default_config()
        },
    )
}

fn lab_clock() -> Result<ManualClock> {
    let day = NaiveDate::from_ymd_opt(2026, 3, 2).context("invalid scenario start date")?;
    Ok(ManualClock::at_noon(day))
}

fn count_events(events: &[ProgressionEvent], matches: fn(&ProgressionEvent) -> bool) -> usize {
    events.iter().filter(|event| matches(event)).count()
}

fn smoke(seed: u64) -> Result<()> {
    let storage = MemoryStorage::default();
    let engine = seeded_engine(storage, seed);
    let clock = lab_clock()?;
    let mut session = engine.create_session_with_clock(&clock);

    ensure!(session.request_plan(), "plan request was not applied");
    ensure!(
        session.complete_fix(&clock.now()),
        "fix completion was a no-op"
    );
    let events = session.drain_events();
    ensure!(
        count_events(&events, |e| matches!(e, ProgressionEvent::FixApplied { .. })) == 1,
        "expected exactly one FixApplied event, got {events:?}"
    );
    ensure!(session.state().score > 0, "score did not increase");
    ensure!(session.state().fixes_count == 1, "fix was not counted");

    let saved = engine.load_state()?.context("nothing was persisted")?;
    ensure!(&saved == session.state(), "snapshot diverged from live state");
    Ok(())
}

fn plan_bounds(seed: u64) -> Result<()> {
    let engine = seeded_engine(MemoryStorage::default(), seed);
    let content = engine.content_with_clock(ManualClock::new(0));
    let weathers = ["sunny", "cloudy", "rainy", "stormy", "foggy"];
    for (index, weather) in (0..500_u32).zip(weathers.iter().cycle()) {
        let intensity = f64::from(index % 14) - 2.0;
        let plan = content.fix_plan(&PlanQuery::new(intensity, weather))?;
        ensure!(
            (40..=99).contains(&plan.confidence),
            "confidence {} out of range",
            plan.confidence
        );
        ensure!(
            (1..=10).contains(&plan.intensity),
            "intensity {} out of range",
            plan.intensity
        );
        ensure!(plan.eta_minutes >= 10, "eta {} too short", plan.eta_minutes);
        ensure!(
            plan.energy_gain >= 5,
            "energy gain {} too small",
            plan.energy_gain
        );
        ensure!(
            (1..=3).contains(&plan.actions.len()),
            "plan {} has {} actions",
            plan.id,
            plan.actions.len()
        );
    }
    Ok(())
}

fn combo_ramp(seed: u64) -> Result<()> {
    let engine = seeded_engine(MemoryStorage::default(), seed);
    let clock = lab_clock()?;
    let mut session = engine.create_session_with_clock(&clock);
    for _ in 0..12 {
        session.request_plan();
        session.complete_fix(&clock.now());
        clock.advance_secs(30);
    }
    let events = session.drain_events();
    let state = session.state();
    ensure!(state.combo_chain == 12, "chain is {}", state.combo_chain);
    ensure!(
        (state.combo_multiplier - 5.0).abs() < f64::EPSILON,
        "multiplier is x{}",
        state.combo_multiplier
    );
    let godmodes = count_events(&events, |e| {
        matches!(e, ProgressionEvent::GodmodeActivated { .. })
    });
    ensure!(godmodes == 8, "expected 8 godmode bonuses, saw {godmodes}");
    Ok(())
}

fn combo_expiry(seed: u64) -> Result<()> {
    let engine = seeded_engine(MemoryStorage::default(), seed);
    let clock = lab_clock()?;
    let mut session = engine.create_session_with_clock(&clock);
    for _ in 0..2 {
        session.request_plan();
        session.complete_fix(&clock.now());
        clock.advance_secs(5);
    }
    session.drain_events();

    clock.advance_secs(84);
    session.tick(&clock.now());
    ensure!(
        session.state().combo_chain == 2,
        "combo dropped inside the window"
    );

    clock.advance_secs(2);
    ensure!(session.tick(&clock.now()), "tick after the window was a no-op");
    let events = session.drain_events();
    ensure!(
        events == vec![ProgressionEvent::ComboDropped { combo_chain: 2 }],
        "unexpected events {events:?}"
    );
    ensure!(
        (session.state().combo_multiplier - 1.0).abs() < f64::EPSILON,
        "multiplier not reset"
    );
    Ok(())
}

fn streak_days(seed: u64) -> Result<()> {
    let engine = seeded_engine(MemoryStorage::default(), seed);
    let clock = lab_clock()?;
    let mut session = engine.create_session_with_clock(&clock);
    let mut streaks = Vec::new();
    for gap in [0, 1, 1, 2] {
        clock.advance_days(gap);
        session.request_plan();
        session.complete_fix(&clock.now());
        streaks.push(session.state().streak);
    }
    ensure!(streaks == vec![1, 2, 3, 1], "streak sequence {streaks:?}");
    Ok(())
}

fn focus_timer(seed: u64) -> Result<()> {
    let engine = seeded_engine(MemoryStorage::default(), seed);
    let clock = lab_clock()?;
    let mut session = engine.create_session_with_clock(&clock);
    session.set_focus_minutes(1)?;
    session.start_focus();
    for _ in 0..60 {
        clock.advance_secs(1);
        session.tick(&clock.now());
    }
    ensure!(
        session.focus().phase() == FocusPhase::Completed,
        "focus phase is {:?}",
        session.focus().phase()
    );
    for _ in 0..5 {
        clock.advance_secs(1);
        session.tick(&clock.now());
    }
    let events = session.drain_events();
    let completions = count_events(&events, |e| {
        matches!(e, ProgressionEvent::FocusCompleted { .. })
    });
    ensure!(completions == 1, "focus paid out {completions} times");
    ensure!(session.state().focus_completed == 1, "focus not counted");
    ensure!(session.state().score == 30, "score is {}", session.state().score);
    Ok(())
}

fn chaos_mode(seed: u64) -> Result<()> {
    let engine = seeded_engine(MemoryStorage::default(), seed);
    let mut session = engine.create_session_with_clock(ManualClock::new(0));
    for _ in 0..20 {
        ensure!(session.chaos_mode(), "chaos mode was a no-op");
        ensure!(
            (1..=10).contains(&session.intensity()),
            "chaos intensity {}",
            session.intensity()
        );
        ensure!(
            session.state().combo_multiplier <= 5.0,
            "multiplier x{} above cap",
            session.state().combo_multiplier
        );
    }
    ensure!(
        session.state().combo_chain == 0,
        "chaos mode touched the chain"
    );
    Ok(())
}

fn intel_feed(seed: u64) -> Result<()> {
    let bundle = RngBundle::from_user_seed(seed);
    for _ in 0..50 {
        let insight = synthesize_insight(&mut *bundle.insight());
        let strongest = insight.weather_impact.get(insight.strongest_weather);
        let weakest = insight.weather_impact.get(insight.weakest_weather);
        ensure!(strongest >= weakest, "rankings inverted in {insight:?}");
        ensure!(
            (4..=7).contains(&insight.intensity_sweet_spot),
            "sweet spot {}",
            insight.intensity_sweet_spot
        );
    }
    for days in 0..=20 {
        let report = synthesize_forecast(&mut *bundle.forecast(), days);
        ensure!(
            (3..=14).contains(&report.days),
            "forecast horizon {}",
            report.days
        );
        for point in &report.trend {
            ensure!(
                (25..=100).contains(&point.energy),
                "day {} energy {}",
                point.day,
                point.energy
            );
            ensure!(
                (35..=98).contains(&point.confidence),
                "day {} confidence {}",
                point.day,
                point.confidence
            );
        }
    }
    Ok(())
}

fn persistence_roundtrip(seed: u64) -> Result<()> {
    let storage = MemoryStorage::default();
    let engine = seeded_engine(storage.clone(), seed);
    let clock = lab_clock()?;
    let mut session = engine.create_session_with_clock(&clock);
    for _ in 0..3 {
        session.request_plan();
        session.complete_fix(&clock.now());
        clock.advance_secs(40);
    }
    session.request_challenge();
    session.accept_challenge();
    session.chaos_mode();

    let raw = storage.raw().context("no snapshot was written")?;
    let restored = PlayerState::from_snapshot(&raw)?;
    ensure!(&restored == session.state(), "restored state differs");
    ensure!(
        restored.to_snapshot()? == raw,
        "re-serialized snapshot differs"
    );

    let reopened = engine.create_session_with_clock(&clock);
    ensure!(
        reopened.state() == session.state(),
        "reopened session differs"
    );
    Ok(())
}

fn stale_reset(seed: u64) -> Result<()> {
    let storage = MemoryStorage::default();
    let engine = seeded_engine(storage.clone(), seed);
    let clock = lab_clock()?;
    let mut session = engine.create_session_with_clock(&clock);
    session.request_plan();
    session.complete_fix(&clock.now());

    let ticket = session.ticket(RequestKind::Plan);
    let late = session.content().fix_plan(&session.plan_query());
    session.reset();
    ensure!(
        !session.deliver_plan(ticket, late),
        "stale plan was applied"
    );
    ensure!(session.pending_plan().is_none(), "stale plan is pending");
    ensure!(storage.raw().is_none(), "reset left a snapshot behind");
    ensure!(
        session.state() == &PlayerState::default(),
        "state not cleared"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scenario_passes_for_a_fixed_seed() {
        for scenario in SCENARIOS {
            (scenario.check)(1337).unwrap_or_else(|err| panic!("{}: {err}", scenario.name));
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(get_scenario("SMOKE").map(|s| s.name), Some("smoke"));
        assert!(get_scenario("missing").is_none());
        assert_eq!(scenario_names().len(), list_scenarios().count());
    }
}
