//! Command-line interface.
//!
//! Every command resolves configuration first and, in JSON mode, wraps its
//! result in an envelope carrying the schema version and the config
//! snapshot so outputs are traceable to the settings that produced them.

use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use wx_common::{Error, GeoCohort, Result, FEATURE_NAMES, SCHEMA_VERSION};
use wx_config::{
    list_presets, resolve_config, Config, ConfigPaths, ConfigSnapshot, PresetName, MAX_SPAN_DAYS,
};
use wx_math::SeededStream;

use crate::audit::AuditLog;
use crate::brands::find_brand;
use crate::decision::{compute_safety, stage_plan};
use crate::exit_codes::ExitCode;
use crate::features::{build_feature_vector_with, FeatureInput, Scenario, WeatherObservation};
use crate::forecast::generate_forecast;
use crate::geo::{cells_for_metro, derive_states, find_metro, find_state, metros_for_state, GeoPoint};
use crate::logging::LogFormat;
use crate::recommend::{automate, recommend, RecommendRequest};
use crate::regime::{detect_regime, similar_event_count};
use crate::scoring::{CohortRegistry, ScoreInput, ScoringEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Human,
}

#[derive(Parser, Debug)]
#[command(
    name = "wx-core",
    version,
    about = "Weather-driven category scoring and budget staging"
)]
pub struct Cli {
    /// Configuration file (overrides WX_CONFIG and the user config)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Built-in preset used when no config file is found
    #[arg(long, global = true)]
    pub preset: Option<PresetName>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Human)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List derived states
    States,
    /// List metros of a state
    Metros {
        /// Two-letter state code
        state: String,
    },
    /// List cells of a metro
    Cells {
        /// Metro id, e.g. NY-M2
        metro: String,
    },
    /// Simulate a daily forecast
    Forecast {
        #[command(flatten)]
        geo: GeoArgs,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Build the feature vector for one observation
    Features {
        #[command(flatten)]
        weather: WeatherArgs,
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Observation date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Score one brand category
    Score(ScoreArgs),
    /// Recommend budget changes for a brand
    Recommend(RecommendArgs),
    /// Stage a budget multiplier over several days
    Stage {
        /// Target multiplier
        target: f64,
        #[arg(long)]
        start: Option<f64>,
        #[arg(long)]
        horizon: Option<usize>,
        #[arg(long)]
        max_daily: Option<f64>,
    },
    /// Evaluate the forecast safety gate
    Safety {
        #[command(flatten)]
        geo: GeoArgs,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Classify a weather regime
    Regime {
        #[command(flatten)]
        weather: WeatherArgs,
        /// Climate name for analog counts
        #[arg(long, default_value = "humid_continental")]
        climate: String,
    },
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the resolved configuration
    Show,
    /// Validate a configuration file (default: the resolved configuration)
    Validate {
        file: Option<PathBuf>,
    },
    /// Print the configuration JSON Schema
    Schema,
    /// List built-in presets
    Presets,
}

#[derive(Args, Debug, Clone)]
pub struct GeoArgs {
    /// Two-letter state code
    #[arg(long)]
    pub state: String,
    /// Metro id within the state
    #[arg(long)]
    pub metro: Option<String>,
    /// Cell id within the metro
    #[arg(long, requires = "metro")]
    pub cell: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct WindowArgs {
    /// First forecast day (default: today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long, default_value_t = 7)]
    pub days: usize,
}

#[derive(Args, Debug, Clone, Default)]
pub struct WeatherArgs {
    /// Temperature (°F)
    #[arg(long, allow_negative_numbers = true)]
    pub temp: Option<f64>,
    /// Relative humidity (%)
    #[arg(long)]
    pub rh: Option<f64>,
    /// Precipitation (in)
    #[arg(long)]
    pub precip: Option<f64>,
}

impl WeatherArgs {
    fn observation(&self) -> WeatherObservation {
        WeatherObservation {
            temp_f: self.temp,
            rh_pct: self.rh,
            precip_in: self.precip,
        }
    }

    fn is_empty(&self) -> bool {
        self.temp.is_none() && self.rh.is_none() && self.precip.is_none()
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ScenarioArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub temp_adj: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub precip_adj: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub promo_adj: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub campaign_adj: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub ad_spend_adj: Option<f64>,
}

impl ScenarioArgs {
    fn scenario(&self) -> Option<Scenario> {
        let any = [
            self.temp_adj,
            self.precip_adj,
            self.promo_adj,
            self.campaign_adj,
            self.ad_spend_adj,
        ]
        .iter()
        .any(Option::is_some);
        any.then(|| Scenario {
            temp_adj: self.temp_adj.unwrap_or(0.0),
            precip_adj: self.precip_adj.unwrap_or(0.0),
            promo_adj: self.promo_adj.unwrap_or(0.0),
            campaign_adj: self.campaign_adj.unwrap_or(0.0),
            ad_spend_adj: self.ad_spend_adj.unwrap_or(0.0),
        })
    }
}

#[derive(Args, Debug, Clone)]
pub struct RegistryArgs {
    /// Cohort registry snapshot to load and save
    #[arg(long, value_name = "FILE")]
    pub registry: Option<PathBuf>,
    /// Fold a reward into the scored cohort(s)
    #[arg(long)]
    pub update: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[arg(long)]
    pub brand: String,
    #[arg(long)]
    pub category: String,
    #[command(flatten)]
    pub weather: WeatherArgs,
    #[command(flatten)]
    pub scenario: ScenarioArgs,
    /// Narrow the cohort to a state
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long, requires = "state")]
    pub metro: Option<String>,
    #[arg(long, requires = "metro")]
    pub cell: Option<String>,
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Observed reward for --update (default: proxy reward)
    #[arg(long, requires = "update", allow_negative_numbers = true)]
    pub reward: Option<f64>,
    #[command(flatten)]
    pub registry: RegistryArgs,
}

#[derive(Args, Debug, Clone)]
pub struct RecommendArgs {
    #[arg(long)]
    pub brand: String,
    #[command(flatten)]
    pub geo: GeoArgs,
    // Overrides the simulated first day.
    #[command(flatten)]
    pub weather: WeatherArgs,
    #[command(flatten)]
    pub scenario: ScenarioArgs,
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Auto-apply high-confidence recommendations unless the safety gate halts
    #[arg(long)]
    pub automate: bool,
    #[command(flatten)]
    pub registry: RegistryArgs,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    generated_at: DateTime<Utc>,
    config: &'a ConfigSnapshot,
    data: &'a T,
}

struct Context {
    config: Config,
    snapshot: ConfigSnapshot,
    format: OutputFormat,
}

impl Context {
    fn emit<T: Serialize>(&self, data: &T, human: impl FnOnce(&T)) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let env = Envelope {
                    schema_version: SCHEMA_VERSION,
                    generated_at: Utc::now(),
                    config: &self.snapshot,
                    data,
                };
                println!("{}", serde_json::to_string_pretty(&env)?);
            }
            OutputFormat::Human => human(data),
        }
        Ok(())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Point and cohort for the most specific geography given.
fn resolve_geo(state: &str, metro: Option<&str>, cell: Option<&str>) -> Result<(GeoPoint, GeoCohort)> {
    let state = find_state(state).ok_or_else(|| Error::UnknownState(state.to_string()))?;
    let Some(metro_id) = metro else {
        return Ok((state.point(), GeoCohort::state(&state.code)));
    };
    let metro = metros_for_state(&state)
        .into_iter()
        .find(|m| m.id.eq_ignore_ascii_case(metro_id))
        .ok_or_else(|| Error::UnknownMetro(metro_id.to_string()))?;
    let Some(cell_id) = cell else {
        return Ok((
            metro.point(&state),
            GeoCohort::new(&state.code, Some(&metro.id), None),
        ));
    };
    let cell = cells_for_metro(&metro)
        .into_iter()
        .find(|c| c.id.eq_ignore_ascii_case(cell_id))
        .ok_or_else(|| Error::InvalidInput(format!("unknown cell id: {cell_id}")))?;
    Ok((
        cell.point(&state),
        GeoCohort::new(&state.code, Some(&metro.id), Some(&cell.id)),
    ))
}

fn open_engine(config: &Config, registry: Option<&Path>) -> Result<ScoringEngine> {
    match registry.filter(|p| p.exists()) {
        Some(path) => {
            let registry = CohortRegistry::load(path, &config.registry)?;
            debug!(path = %path.display(), cohorts = registry.len(), "registry loaded");
            ScoringEngine::with_registry(config, registry)
        }
        None => Ok(ScoringEngine::new(config)),
    }
}

fn save_engine(engine: &ScoringEngine, registry: Option<&Path>) -> Result<()> {
    if let Some(path) = registry {
        engine.registry().save(path)?;
    }
    Ok(())
}

/// Run a parsed command line.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    // Schema printing must work even when the resolved config is broken.
    if let Commands::Config(ConfigCommands::Schema) = &cli.command {
        println!("{}", serde_json::to_string_pretty(&Config::json_schema())?);
        return Ok(ExitCode::Clean);
    }
    if let Commands::Config(ConfigCommands::Validate { file: Some(file) }) = &cli.command {
        return run_validate_file(file, cli.format);
    }

    let resolved = resolve_config(&ConfigPaths::discover(cli.config.clone(), cli.preset))?;
    let ctx = Context {
        config: resolved.config,
        snapshot: resolved.snapshot,
        format: cli.format,
    };

    match &cli.command {
        Commands::States => run_states(&ctx),
        Commands::Metros { state } => run_metros(&ctx, state),
        Commands::Cells { metro } => run_cells(&ctx, metro),
        Commands::Forecast { geo, window } => run_forecast(&ctx, geo, window),
        Commands::Features {
            weather,
            scenario,
            date,
        } => run_features(&ctx, weather, scenario, date.unwrap_or_else(today)),
        Commands::Score(args) => run_score(&ctx, args),
        Commands::Recommend(args) => run_recommend(&ctx, args),
        Commands::Stage {
            target,
            start,
            horizon,
            max_daily,
        } => run_stage(&ctx, *target, *start, *horizon, *max_daily),
        Commands::Safety { geo, window } => run_safety(&ctx, geo, window),
        Commands::Regime { weather, climate } => run_regime(&ctx, weather, climate),
        Commands::Config(cmd) => run_config(&ctx, cmd),
    }
}

fn run_states(ctx: &Context) -> Result<ExitCode> {
    let states = derive_states();
    ctx.emit(&states, |states| {
        for s in states {
            println!(
                "{:<3} {:<22} {:>8.3} {:>9.3}  {:<10} {}{}",
                s.code,
                s.name,
                s.lat,
                s.lng,
                s.region,
                s.climate,
                if s.coastal { " (coastal)" } else { "" }
            );
        }
    })?;
    Ok(ExitCode::Clean)
}

fn run_metros(ctx: &Context, code: &str) -> Result<ExitCode> {
    let state = find_state(code).ok_or_else(|| Error::UnknownState(code.to_string()))?;
    let metros = metros_for_state(&state);
    ctx.emit(&metros, |metros| {
        for m in metros {
            println!("{:<7} {:<32} {:>8.3} {:>9.3} {:?}", m.id, m.name, m.lat, m.lng, m.tags);
        }
    })?;
    Ok(ExitCode::Clean)
}

fn run_cells(ctx: &Context, metro_id: &str) -> Result<ExitCode> {
    let (_, metro) =
        find_metro(metro_id).ok_or_else(|| Error::UnknownMetro(metro_id.to_string()))?;
    let cells = cells_for_metro(&metro);
    ctx.emit(&cells, |cells| {
        for c in cells {
            println!("{:<10} {:>8.3} {:>9.3} {:?}", c.id, c.lat, c.lng, c.tags);
        }
    })?;
    Ok(ExitCode::Clean)
}

/// Reject day counts past [`MAX_SPAN_DAYS`].
fn check_span(flag: &str, days: usize) -> Result<usize> {
    if days > MAX_SPAN_DAYS {
        return Err(Error::InvalidInput(format!(
            "{flag} must be at most {MAX_SPAN_DAYS}, got {days}"
        )));
    }
    Ok(days)
}

fn run_forecast(ctx: &Context, geo: &GeoArgs, window: &WindowArgs) -> Result<ExitCode> {
    let span = check_span("--days", window.days)?;
    let (point, cohort) = resolve_geo(&geo.state, geo.metro.as_deref(), geo.cell.as_deref())?;
    let days = generate_forecast(&point, window.date.unwrap_or_else(today), span);
    let data = json!({ "geo": cohort, "point": point, "days": days });
    ctx.emit(&data, |_| {
        println!("# Forecast {cohort}");
        for d in &days {
            println!(
                "{}  {:>5.1}°F  {:>4.0}% RH  {:>4.2} in  gust {:>4.1} mph  {}",
                d.date, d.temp_f, d.rh_pct, d.precip_in, d.gust_mph, d.condition
            );
        }
    })?;
    Ok(ExitCode::Clean)
}

fn run_features(
    ctx: &Context,
    weather: &WeatherArgs,
    scenario: &ScenarioArgs,
    date: NaiveDate,
) -> Result<ExitCode> {
    let mut input = FeatureInput::new(weather.observation(), date);
    input.scenario = scenario.scenario();
    input.spend_today = ctx.config.scoring.default_spend_today;
    input.spend_7d = ctx.config.scoring.default_spend_7d;
    let built = build_feature_vector_with(&input, ctx.config.scoring.min_history);
    let x = built.vector.to_array();
    let named: BTreeMap<&str, f64> = FEATURE_NAMES.iter().copied().zip(x).collect();
    let data = json!({
        "names": FEATURE_NAMES,
        "x": x,
        "features": named,
        "fallbacks": built.fallbacks,
    });
    ctx.emit(&data, |_| {
        for (name, v) in FEATURE_NAMES.iter().zip(x) {
            println!("{name:<18} {v:>10.4}");
        }
        for reason in &built.fallbacks {
            println!("fallback: {reason}");
        }
    })?;
    Ok(ExitCode::Clean)
}

fn run_score(ctx: &Context, args: &ScoreArgs) -> Result<ExitCode> {
    let brand = find_brand(&args.brand)?;
    let geo = match &args.state {
        Some(state) => Some(resolve_geo(state, args.metro.as_deref(), args.cell.as_deref())?.1),
        None => None,
    };
    let mut input = ScoreInput::new(
        brand.brand_key(),
        brand.location,
        args.category.clone(),
        args.weather.observation(),
        args.date.unwrap_or_else(today),
    );
    input.scenario = args.scenario.scenario();
    input.geo = geo;

    let registry = args.registry.registry.as_deref();
    let mut engine = open_engine(&ctx.config, registry)?;
    let prediction = engine.score_category(&input)?;
    let update = if args.registry.update {
        Some(engine.update_category(&input, args.reward)?)
    } else {
        None
    };
    save_engine(&engine, registry)?;

    let data = json!({ "prediction": prediction, "update": update });
    ctx.emit(&data, |_| {
        println!("cohort      {}", prediction.cohort);
        println!("mean        {:.4}", prediction.mean);
        println!("ucb         {:.4}", prediction.ucb);
        println!("confidence  {:.2}", prediction.confidence);
        println!("prior pool  {}", prediction.prior_pool);
        if let Some(u) = &update {
            println!("updated     reward {:.4} ({} observations)", u.reward, u.updates);
        }
    })?;
    Ok(ExitCode::Clean)
}

fn run_recommend(ctx: &Context, args: &RecommendArgs) -> Result<ExitCode> {
    let brand = find_brand(&args.brand)?;
    let (point, geo) = resolve_geo(
        &args.geo.state,
        args.geo.metro.as_deref(),
        args.geo.cell.as_deref(),
    )?;
    let date = args.date.unwrap_or_else(today);
    let forecast = generate_forecast(&point, date, ctx.config.safety.min_days.max(3));
    let safety = compute_safety(&forecast, &ctx.config.safety);

    let mut weather = forecast
        .first()
        .map(WeatherObservation::from)
        .unwrap_or_default();
    if !args.weather.is_empty() {
        let o = args.weather.observation();
        weather.temp_f = o.temp_f.or(weather.temp_f);
        weather.rh_pct = o.rh_pct.or(weather.rh_pct);
        weather.precip_in = o.precip_in.or(weather.precip_in);
    }

    let request = RecommendRequest {
        weather,
        scenario: args.scenario.scenario(),
        date,
        geo: Some(geo.clone()),
    };
    let registry = args.registry.registry.as_deref();
    let mut engine = open_engine(&ctx.config, registry)?;
    let recommendations = recommend(&mut engine, &ctx.config, brand, &request)?;

    if args.registry.update {
        for rec in &recommendations {
            let mut input = ScoreInput::new(
                brand.brand_key(),
                brand.location,
                rec.category.clone(),
                weather,
                date,
            );
            input.scenario = request.scenario;
            input.geo = Some(geo.clone());
            engine.update_category(&input, None)?;
        }
    }
    save_engine(&engine, registry)?;

    let mut audit = AuditLog::new(ctx.config.recommend.audit_capacity);
    let applied = if args.automate {
        automate(&recommendations, &ctx.config.recommend, &safety, &mut audit)
    } else {
        0
    };

    let data = json!({
        "brand": brand.name,
        "geo": geo,
        "weather": weather,
        "safety": safety,
        "recommendations": recommendations,
        "automation": {
            "enabled": args.automate,
            "applied": applied,
            "audit": audit.recent(10),
        },
    });
    ctx.emit(&data, |_| {
        println!("# {} @ {} ({})", brand.name, geo, date);
        println!("safety: {} damping {:.2}", safety.status, safety.damping);
        for r in &recommendations {
            println!(
                "{:<10} x{:.2}  conf {:.2}  lift {}  {}",
                r.category, r.budget_multiplier, r.confidence, r.expected_lift, r.action
            );
            println!("           {}", r.reasoning);
        }
        if args.automate {
            println!("auto-applied: {applied}");
        }
    })?;
    Ok(ExitCode::Clean)
}

fn run_stage(
    ctx: &Context,
    target: f64,
    start: Option<f64>,
    horizon: Option<usize>,
    max_daily: Option<f64>,
) -> Result<ExitCode> {
    if !target.is_finite() {
        return Err(Error::InvalidInput(format!("target must be finite, got {target}")));
    }
    let mut policy = ctx.config.staging.clone();
    policy.start = start.unwrap_or(policy.start);
    if let Some(h) = horizon {
        policy.horizon = check_span("--horizon", h)?;
    }
    policy.max_daily = max_daily.unwrap_or(policy.max_daily);
    let plan = stage_plan(target, &policy);
    ctx.emit(&plan, |plan| {
        println!("{}", plan.narrative);
        for (i, s) in plan.steps.iter().enumerate() {
            println!("day {}  x{:.2}", i + 1, s);
        }
    })?;
    Ok(ExitCode::Clean)
}

fn run_safety(ctx: &Context, geo: &GeoArgs, window: &WindowArgs) -> Result<ExitCode> {
    let span = check_span("--days", window.days)?;
    let (point, cohort) = resolve_geo(&geo.state, geo.metro.as_deref(), geo.cell.as_deref())?;
    let days = generate_forecast(&point, window.date.unwrap_or_else(today), span);
    let safety = compute_safety(&days, &ctx.config.safety);
    let data = json!({ "geo": cohort, "safety": safety });
    ctx.emit(&data, |_| {
        println!("{}  damping {:.2}  {:?}", safety.status, safety.damping, safety.reasons);
    })?;
    Ok(if safety.is_halted() {
        ExitCode::SafetyHalt
    } else {
        ExitCode::Clean
    })
}

fn run_regime(ctx: &Context, weather: &WeatherArgs, climate: &str) -> Result<ExitCode> {
    let obs = weather.observation();
    let (t, rh, p) = (
        obs.temp_f.unwrap_or(crate::features::DEFAULT_TEMP_F),
        obs.rh_pct.unwrap_or(crate::features::DEFAULT_RH_PCT),
        obs.precip_in.unwrap_or(crate::features::DEFAULT_PRECIP_IN),
    );
    let regime = detect_regime(t, rh, p);
    let mut rnd = SeededStream::from_key(&format!("regime:{regime}:{climate}:{t}:{rh}:{p}"));
    let analogs = similar_event_count(regime, climate, &mut rnd);
    let data = json!({
        "regime": regime,
        "embedding": regime.embedding(),
        "similar_event_count": analogs,
    });
    ctx.emit(&data, |_| {
        println!("{regime} ({analogs} similar events)");
    })?;
    Ok(ExitCode::Clean)
}

fn run_config(ctx: &Context, cmd: &ConfigCommands) -> Result<ExitCode> {
    match cmd {
        ConfigCommands::Show => {
            ctx.emit(&ctx.config, |config| {
                println!("# source: {:?}", ctx.snapshot.source);
                println!("# sha256: {}", ctx.snapshot.sha256);
                if let Ok(json) = serde_json::to_string_pretty(config) {
                    println!("{json}");
                }
            })?;
        }
        ConfigCommands::Validate { .. } => {
            let data = json!({ "valid": true });
            ctx.emit(&data, |_| println!("configuration is valid"))?;
        }
        ConfigCommands::Presets => {
            let presets = list_presets();
            ctx.emit(&presets, |presets| {
                for p in presets {
                    println!("{:<13} {}", p.name.as_str(), p.description);
                }
            })?;
        }
        ConfigCommands::Schema => {
            println!("{}", serde_json::to_string_pretty(&Config::json_schema())?);
        }
    }
    Ok(ExitCode::Clean)
}

fn run_validate_file(file: &Path, format: OutputFormat) -> Result<ExitCode> {
    let config = Config::from_file(file)?;
    match format {
        OutputFormat::Json => {
            let out = json!({
                "valid": true,
                "path": file,
                "schema_version": config.schema_version,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Human => println!("{}: valid", file.display()),
    }
    Ok(ExitCode::Clean)
}

/// Report an error on stderr in the selected format.
pub fn report_error(err: &Error, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = json!({ "error": { "code": err.code(), "message": err.to_string() } });
            eprintln!("{out}");
        }
        OutputFormat::Human => eprintln!("error: {err}"),
    }
}
