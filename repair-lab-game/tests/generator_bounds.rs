use regex::Regex;
use repair_lab_game::catalog::{MOOD_ACTION_COUNT, MoodCatalog, WeatherKind};
use repair_lab_game::content::{ContentService, ForecastQuery, LocalContent, PlanQuery};
use repair_lab_game::forecast::synthesize_forecast;
use repair_lab_game::insight::synthesize_insight;
use repair_lab_game::plan::{PlanContext, synthesize_plan};
use repair_lab_game::sampler::weighted_pick_pair;
use repair_lab_game::{ManualClock, RngBundle};
use std::collections::{HashMap, HashSet};

#[test]
fn ten_thousand_plans_stay_in_bounds() {
    let bundle = RngBundle::from_user_seed(0xFEED);
    let catalog = MoodCatalog::default_catalog();
    let weathers = ["sunny", "cloudy", "rainy", "stormy", "foggy", "SUNNY"];
    for index in 0..10_000_u64 {
        let intensity = f64::from(u32::try_from(index % 14).unwrap()) - 2.0;
        let weather = weathers[usize::try_from(index).unwrap() % weathers.len()];
        let ctx = PlanContext {
            persona: "Katinka",
            issued_at_ms: 1_000,
            sequence: index,
        };
        let plan = synthesize_plan(&mut *bundle.plan(), catalog, intensity, weather, &ctx);

        assert!((40..=99).contains(&plan.confidence), "{plan:?}");
        assert!((1..=10).contains(&plan.intensity), "{plan:?}");
        assert!(plan.eta_minutes >= 10, "{plan:?}");
        assert!(plan.energy_gain >= 5, "{plan:?}");
        assert!((1..=3).contains(&plan.actions.len()), "{plan:?}");

        let mood = catalog
            .iter()
            .find(|mood| mood.label == plan.mood)
            .expect("plan mood comes from the catalog");
        let unique: HashSet<&String> = plan.actions.iter().collect();
        assert_eq!(unique.len(), plan.actions.len());
        assert!(plan.actions.iter().all(|action| mood.actions.contains(action)));
        assert_eq!(mood.actions.len(), MOOD_ACTION_COUNT);
    }
}

#[test]
fn plan_ids_and_summaries_have_expected_shape() {
    let clock = ManualClock::new(1_765_000_000_000);
    let content = LocalContent::new(RngBundle::from_user_seed(8), &clock);
    let id_shape = Regex::new(r"^fix-1765000000000-[1-9][0-9]{2}-\d+$").unwrap();
    let summary_shape =
        Regex::new(r"^Katinka is [a-z ]+ today\. Estimated recovery in \d+ minutes\.$").unwrap();
    let mut ids = HashSet::new();
    for _ in 0..2_000 {
        let plan = content.fix_plan(&PlanQuery::default()).unwrap();
        assert!(id_shape.is_match(&plan.id), "{}", plan.id);
        assert!(summary_shape.is_match(&plan.summary), "{}", plan.summary);
        assert!(ids.insert(plan.id));
    }
}

#[test]
fn weighted_sampler_matches_relative_weights() {
    let bundle = RngBundle::from_user_seed(42);
    let pairs = [("A", 1.0), ("B", 3.0)];
    let mut hits = 0_u32;
    let draws = 100_000_u32;
    for _ in 0..draws {
        if weighted_pick_pair(&mut *bundle.session(), &pairs) == Some(&"B") {
            hits += 1;
        }
    }
    let share = f64::from(hits) / f64::from(draws);
    assert!((share - 0.75).abs() < 0.01, "share {share}");
}

#[test]
fn mood_frequencies_follow_catalog_weights() {
    let bundle = RngBundle::from_user_seed(9);
    let catalog = MoodCatalog::default_catalog();
    let total: f64 = catalog.iter().map(|mood| mood.weight).sum();
    let mut counts: HashMap<&str, u32> = HashMap::new();
    let draws = 60_000_u32;
    for _ in 0..draws {
        let mood = repair_lab_game::weighted_pick(&mut *bundle.plan(), catalog.as_slice(), |m| m.weight)
            .unwrap();
        *counts.entry(mood.key.as_str()).or_default() += 1;
    }
    for mood in catalog {
        let expected = mood.weight / total;
        let actual = f64::from(counts[mood.key.as_str()]) / f64::from(draws);
        assert!((expected - actual).abs() < 0.015, "{}: {actual} vs {expected}", mood.key);
    }
}

#[test]
fn forecast_walk_respects_bounds_for_every_horizon() {
    let bundle = RngBundle::from_user_seed(3);
    for days in 0..=20 {
        for _ in 0..200 {
            let report = synthesize_forecast(&mut *bundle.forecast(), days);
            let expected_days = days.clamp(3, 14);
            assert_eq!(report.days, expected_days);
            assert_eq!(report.trend.len(), expected_days as usize);
            for (index, point) in report.trend.iter().enumerate() {
                assert_eq!(point.day as usize, index + 1);
                assert!((25..=100).contains(&point.energy));
                assert!((35..=98).contains(&point.confidence));
            }
            let min = report.trend.iter().map(|p| p.energy).min().unwrap();
            let max = report.trend.iter().map(|p| p.energy).max().unwrap();
            assert!((min..=max).contains(&report.average_energy));
        }
    }
}

#[test]
fn forecast_query_drives_local_content() {
    let clock = ManualClock::new(0);
    let content = LocalContent::new(RngBundle::from_user_seed(1), &clock);
    let report = content
        .forecast(&ForecastQuery::from_params(Some("30")))
        .unwrap();
    assert_eq!(report.days, 14);
}

#[test]
fn insight_rankings_agree_with_impacts() {
    let bundle = RngBundle::from_user_seed(77);
    let window = Regex::new(r"^(0[89]|1[01]):00-(1[4-8]):00$").unwrap();
    for _ in 0..2_000 {
        let insight = synthesize_insight(&mut *bundle.insight());
        let impacts = insight.weather_impact;
        let strongest = impacts.get(insight.strongest_weather);
        let weakest = impacts.get(insight.weakest_weather);
        for weather in WeatherKind::ALL {
            assert!(impacts.get(weather) <= strongest);
            assert!(impacts.get(weather) >= weakest);
        }
        assert!((4..=7).contains(&insight.intensity_sweet_spot));
        assert!(window.is_match(&insight.best_window), "{}", insight.best_window);
    }
}
