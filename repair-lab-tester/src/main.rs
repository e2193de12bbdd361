mod common;
mod logic;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use common::scenario::{get_scenario, list_scenarios, scenario_names};
use common::{FileStorage, split_csv};
use logic::{LogicTester, ScenarioResult, resolve_seed_inputs};
use repair_lab_game::ticker::{self, TICK_PERIOD};
use repair_lab_game::{
    Clock, ContentService, ForecastQuery, LabEngine, LabSession, MemoryStorage, PlanQuery,
    ProgressionEvent, SessionConfig, StateStorage, SystemClock, WeatherKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TestMode {
    /// Seeded logic scenarios against an in-memory lab
    Logic,
    /// Print generated payloads as JSON
    Emit,
    /// Run actions against a file-backed session
    Session,
    /// Tick a file-backed session in real time
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SessionAction {
    /// Print the current standing
    Status,
    /// Generate a plan and complete it
    Fix,
    /// Pull a challenge and accept it
    Challenge,
    /// Run a full focus session at accelerated speed
    Focus,
    /// Reroll intensity/weather and boost the multiplier
    Chaos,
    /// Refresh insight and forecast
    Intel,
    /// Clear all progress
    Reset,
}

#[derive(Debug, Parser)]
#[command(name = "repair-lab-tester", version = "0.1.0")]
#[command(about = "Automated QA harness for the Repair Lab recovery engine")]
struct Args {
    /// Mode: logic scenarios, payload emission, file-backed session, or live ticking
    #[arg(long, value_enum, default_value_t = TestMode::Logic)]
    mode: TestMode,

    /// Scenarios to run (comma-separated, `all` for every scenario)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated, decimal or 0x-hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Session config JSON (persona, focus minutes, forecast days, defaults, seed)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Payloads to emit (comma-separated: fix,challenge,insight,forecast,health)
    #[arg(long, default_value = "fix,challenge,insight,forecast,health")]
    emit: String,

    /// Raw intensity parameter for plans (normalized like a query string)
    #[arg(long)]
    intensity: Option<String>,

    /// Raw weather parameter for plans
    #[arg(long)]
    weather: Option<String>,

    /// Raw forecast horizon parameter
    #[arg(long)]
    days: Option<String>,

    /// Snapshot file for session and live modes
    #[arg(long, default_value = "target/repair-lab/state.json")]
    state_file: PathBuf,

    /// Session actions to run in order (comma-separated)
    #[arg(long, default_value = "status")]
    actions: String,

    /// Seconds to keep a live session ticking
    #[arg(long, default_value_t = 10)]
    live_secs: u64,

    /// Focus length override in minutes
    #[arg(long)]
    focus_minutes: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let config = load_config(args.config.as_deref())?;
    let passed = match args.mode {
        TestMode::Logic => run_logic_mode(&args)?,
        TestMode::Emit => {
            emit_payloads(&args, &config)?;
            true
        }
        TestMode::Session => {
            run_session_actions(&args, config)?;
            true
        }
        TestMode::Live => {
            run_live_session(&args, config).await?;
            true
        }
    };

    if !passed {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🧪 Repair Lab Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default_config());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    SessionConfig::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for name in scenario_names() {
            if !scenarios.contains(&name) {
                scenarios.push(name);
            }
        }
    }
    scenarios
}

fn run_logic_mode(args: &Args) -> Result<bool> {
    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios);
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let results = run_logic_scenarios(args, &scenarios, &seeds);
    write_reports(args, &results, start_time)?;
    Ok(results.iter().all(|r| r.passed))
}

fn run_logic_scenarios(args: &Args, scenarios: &[String], seeds: &[u64]) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let logic_tester = LogicTester::new(args.verbose);
    let mut results = Vec::new();

    for scenario_name in scenarios {
        if let Some(scenario) = get_scenario(scenario_name) {
            results.extend(logic_tester.run_scenario(&scenario, seeds, args.iterations));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }

    results
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results)?,
        "markdown" => logic::reports::generate_markdown_report(&mut output_target, results)?,
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No logic scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
        }
    }

    if args.report != "json" {
        let duration = start_time.elapsed();
        writeln!(&mut output_target)?;
        writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
    }
    output_target.flush_inner()?;
    Ok(())
}

fn plan_query(args: &Args, config: &SessionConfig) -> PlanQuery {
    let intensity = args
        .intensity
        .clone()
        .unwrap_or_else(|| config.default_intensity.to_string());
    let weather = args
        .weather
        .clone()
        .unwrap_or_else(|| config.default_weather.key().to_string());
    PlanQuery::from_params(Some(&intensity), Some(&weather))
}

fn forecast_query(args: &Args, config: &SessionConfig) -> ForecastQuery {
    let days = args
        .days
        .clone()
        .unwrap_or_else(|| config.forecast_days.to_string());
    ForecastQuery::from_params(Some(&days))
}

fn emit_payloads(args: &Args, config: &SessionConfig) -> Result<()> {
    let engine = LabEngine::new(MemoryStorage::default(), config.clone());
    let content = engine.content_with_clock(SystemClock);
    let plan_query = plan_query(args, config);
    let forecast_query = forecast_query(args, config);

    let mut payload = serde_json::Map::new();
    for kind in split_csv(&args.emit) {
        let value = match kind.as_str() {
            "fix" => serde_json::to_value(content.fix_plan(&plan_query)?)?,
            "challenge" => serde_json::to_value(content.challenge()?)?,
            "insight" => serde_json::to_value(content.insight()?)?,
            "forecast" => serde_json::to_value(content.forecast(&forecast_query)?)?,
            "health" => serde_json::to_value(content.health()?)?,
            other => bail!("Unknown payload kind: {other}"),
        };
        payload.insert(kind, value);
    }

    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(
        &mut output_target,
        "{}",
        serde_json::to_string_pretty(&payload)?
    )?;
    output_target.flush_inner()?;
    Ok(())
}

fn parse_actions(raw: &str) -> Result<Vec<SessionAction>> {
    split_csv(raw)
        .iter()
        .map(|token| {
            SessionAction::from_str(token, true)
                .map_err(|_| anyhow::anyhow!("Unknown session action: {token}"))
        })
        .collect()
}

fn print_events(events: &[ProgressionEvent]) {
    for event in events {
        let title = event.title();
        let line = match event {
            ProgressionEvent::GodmodeActivated { .. } | ProgressionEvent::AchievementUnlocked { .. } => {
                title.bright_magenta().bold()
            }
            ProgressionEvent::ComboDropped { .. } | ProgressionEvent::ProgressReset => title.yellow(),
            _ => title.green(),
        };
        println!("  {line} {}", event.subtitle().dimmed());
    }
}

fn report_session_messages<C: ContentService, S: StateStorage>(session: &mut LabSession<C, S>) {
    print_events(&session.drain_events());
    if let Some(message) = session.error() {
        eprintln!("⚠️  {}", message.yellow());
    }
    if let Some(warning) = session.take_warning() {
        eprintln!("⚠️  Progress not saved: {warning}");
    }
}

fn run_focus_to_completion<C: ContentService, S: StateStorage>(
    session: &mut LabSession<C, S>,
    clock: &impl Clock,
) {
    session.start_focus();
    let ticks = session.focus().remaining_secs();
    for _ in 0..ticks {
        session.tick(&clock.now());
    }
}

fn apply_session_action<C: ContentService, S: StateStorage>(
    session: &mut LabSession<C, S>,
    action: SessionAction,
    clock: &impl Clock,
    persona: &str,
) {
    match action {
        SessionAction::Status => {
            let standing = session.standing(&clock.now());
            println!(
                "  {} • {} • {}",
                standing.badge.bright_white().bold(),
                standing.energy_status.label(),
                standing.mood_line
            );
            if standing.combo_hot {
                println!(
                    "  🔥 x{:.1} combo, {}s left",
                    session.state().combo_multiplier,
                    standing.combo_seconds_left
                );
            }
        }
        SessionAction::Fix => {
            if session.request_plan()
                && let Some(plan) = session.pending_plan()
            {
                println!("  🛠  {} ({} min)", plan.summary, plan.eta_minutes);
                for step in &plan.actions {
                    println!("     • {step}");
                }
            }
            session.complete_fix(&clock.now());
        }
        SessionAction::Challenge => {
            if session.request_challenge()
                && let Some(challenge) = session.challenge()
            {
                println!(
                    "  🎯 {} (+{}, {}h)",
                    challenge.challenge, challenge.reward, challenge.deadline_hours
                );
            }
            session.accept_challenge();
        }
        SessionAction::Focus => {
            println!("  ⏱  {persona} focus for {}", session.focus().clock_label());
            run_focus_to_completion(session, clock);
        }
        SessionAction::Chaos => {
            session.chaos_mode();
        }
        SessionAction::Intel => {
            if session.refresh_intel()
                && let (Some(insight), Some(forecast)) = (session.insight(), session.forecast())
            {
                println!(
                    "  📡 best window {} • strongest {} • weakest {} • sweet spot {}",
                    insight.best_window,
                    insight.strongest_weather,
                    insight.weakest_weather,
                    insight.intensity_sweet_spot
                );
                println!(
                    "  📈 {}-day average energy {} • {}",
                    forecast.days, forecast.average_energy, forecast.recommendation
                );
            }
        }
        SessionAction::Reset => session.reset(),
    }
}

fn run_session_actions(args: &Args, mut config: SessionConfig) -> Result<()> {
    if let Some(minutes) = args.focus_minutes {
        config.focus_minutes = minutes;
        config.validate()?;
    }
    let actions = parse_actions(&args.actions)?;
    let storage = FileStorage::new(&args.state_file);
    println!(
        "{} {}",
        "📂 Session".bright_blue().bold(),
        storage.path().display()
    );
    let engine = LabEngine::new(storage, config);
    let clock = SystemClock;
    let mut session = engine.create_session_with_clock(clock);
    let persona = engine.config().persona.clone();

    let query = plan_query(args, engine.config());
    session.set_intensity(f64::from(query.intensity));
    if let Some(weather) = WeatherKind::from_key(&query.weather) {
        session.set_weather(weather);
    }

    report_session_messages(&mut session);
    for action in actions {
        println!("{} {action:?}", "▶".blue());
        apply_session_action(&mut session, action, &clock, &persona);
        report_session_messages(&mut session);
    }

    let summary = serde_json::json!({
        "state": session.state(),
        "standing": session.standing(&clock.now()),
        "achievements": session.engine().achievements(),
    });
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(
        &mut output_target,
        "{}",
        serde_json::to_string_pretty(&summary)?
    )?;
    output_target.flush_inner()?;
    Ok(())
}

async fn run_live_session(args: &Args, mut config: SessionConfig) -> Result<()> {
    if let Some(minutes) = args.focus_minutes {
        config.focus_minutes = minutes;
        config.validate()?;
    }
    let engine = LabEngine::new(FileStorage::new(&args.state_file), config);
    let clock = SystemClock;
    let mut session = engine.create_session_with_clock(clock);
    session.start_focus();

    println!(
        "{} {} for up to {}s (Ctrl+C to stop)",
        "⏱  Live focus".bright_blue().bold(),
        session.focus().clock_label(),
        args.live_secs
    );
    report_session_messages(&mut session);

    let verbose = args.verbose;
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let (ticks, ()) = tokio::join!(
        ticker::run(TICK_PERIOD, shutdown_rx, || {
            session.tick(&clock.now());
            if verbose {
                println!("  {}", session.focus().clock_label().dimmed());
            }
            report_session_messages(&mut session);
        }),
        async {
            tokio::select! {
                () = tokio::time::sleep(Duration::from_secs(args.live_secs)) => {}
                _ = tokio::signal::ctrl_c() => {}
            }
            log::debug!("live session shutting down");
            let _ = shutdown_tx.send(true);
        }
    );

    log::info!("live session stopped after {ticks} ticks");
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(
        &mut output_target,
        "Stopped after {ticks} ticks • focus {} ({:?}) • score {}",
        session.focus().clock_label(),
        session.focus().phase(),
        session.state().score
    )?;
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
