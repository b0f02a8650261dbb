use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use ps_catalog::{CatalogLayout, Frequency, MemoryStore, PumpRecord, load_rows_json};
use ps_core::{DisplayUnits, FlowUnit, HeadUnit, OutletUnit};
use ps_select::{
    ManualFlow, ManualHead, OutletFilter, Requirement, RequirementInput, ResultSet,
    ScenarioInputs, ScenarioKind, SearchCriteria, SearchSession, Selector, known_phase,
    operating_point,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod error;

use error::{CliError, CliResult};

#[derive(Parser)]
#[command(name = "pumpsel")]
#[command(about = "Pump selection against a catalog export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog for pumps matching a requirement
    Search {
        #[command(flatten)]
        source: CatalogArgs,
        /// YAML criteria file; flags below override its values
        #[arg(long)]
        criteria: Option<PathBuf>,
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        requirement: RequirementArgs,
        #[command(flatten)]
        display: DisplayArgs,
        /// Print the result set as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print performance curves for one or more models
    Curve {
        #[command(flatten)]
        source: CatalogArgs,
        /// Model numbers, in comparison order
        #[arg(required = true)]
        models: Vec<String>,
        /// Operating point flow (display units)
        #[arg(long)]
        flow: Option<f64>,
        /// Operating point head (display units)
        #[arg(long)]
        head: Option<f64>,
        #[command(flatten)]
        display: DisplayArgs,
        /// Write CSV to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the requirement derived from an application scenario
    Derive {
        /// Category used to pick the scenario (e.g. Booster)
        #[arg(long)]
        category: Option<String>,
        #[command(flatten)]
        requirement: RequirementArgs,
        #[command(flatten)]
        display: DisplayArgs,
    },
}

#[derive(Args)]
struct CatalogArgs {
    /// JSON array of pump rows
    #[arg(long)]
    catalog: PathBuf,
    /// JSON array of curve rows
    #[arg(long)]
    curves: Option<PathBuf>,
    /// YAML catalog layout
    #[arg(long)]
    layout: Option<PathBuf>,
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long)]
    category: Option<String>,
    /// 50 or 60
    #[arg(long)]
    frequency: Option<u32>,
    /// 1 or 3
    #[arg(long)]
    phase: Option<u32>,
    /// Exact horsepower text, e.g. "1 1/2"
    #[arg(long)]
    hp: Option<String>,
    /// Case-insensitive model number prefix
    #[arg(long)]
    prefix: Option<String>,
    #[arg(long)]
    outlet: Option<f64>,
    #[arg(long, default_value = "mm")]
    outlet_unit: OutletUnit,
    /// Percentage of ranked results to keep (5-100)
    #[arg(long)]
    percent: Option<u8>,
}

#[derive(Args)]
struct RequirementArgs {
    /// Manual flow, in --flow-unit
    #[arg(long)]
    flow: Option<f64>,
    #[arg(long, default_value = "L/min")]
    flow_unit: FlowUnit,
    /// Manual head, in --head-unit
    #[arg(long)]
    head: Option<f64>,
    #[arg(long, default_value = "m")]
    head_unit: HeadUnit,
    #[arg(long)]
    floors: Option<u32>,
    #[arg(long)]
    faucets: Option<u32>,
    /// Pond length, width and height in meters
    #[arg(long, num_args = 3, value_names = ["L", "W", "H"])]
    pond: Option<Vec<f64>>,
    /// Hours to drain the pond
    #[arg(long)]
    drain_time: Option<f64>,
    /// Underground depth in meters
    #[arg(long)]
    depth: Option<f64>,
}

#[derive(Args)]
struct DisplayArgs {
    #[arg(long, default_value = "L/min")]
    show_flow: FlowUnit,
    #[arg(long, default_value = "m")]
    show_head: HeadUnit,
}

impl DisplayArgs {
    fn units(&self) -> DisplayUnits {
        DisplayUnits::new(self.show_flow, self.show_head)
    }
}

impl RequirementArgs {
    fn input(&self) -> RequirementInput {
        let has_scenario = self.floors.is_some()
            || self.faucets.is_some()
            || self.pond.is_some()
            || self.depth.is_some();
        let scenario = has_scenario.then(|| {
            let mut s = ScenarioInputs {
                floors: self.floors.unwrap_or(0),
                faucets: self.faucets.unwrap_or(0),
                underground_depth_m: self.depth.unwrap_or(0.0),
                ..ScenarioInputs::default()
            };
            if let Some([l, w, h]) = self.pond.as_deref() {
                s.pond_length_m = *l;
                s.pond_width_m = *w;
                s.pond_height_m = *h;
            }
            if let Some(t) = self.drain_time {
                s.drain_time_h = t;
            }
            s
        });

        RequirementInput {
            flow: self.flow.map(|value| ManualFlow {
                value,
                unit: self.flow_unit,
            }),
            head: self.head.map(|value| ManualHead {
                value,
                unit: self.head_unit,
            }),
            scenario,
        }
    }

    fn is_empty(&self) -> bool {
        let input = self.input();
        input.flow.is_none() && input.head.is_none() && input.scenario.is_none()
    }
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            source,
            criteria,
            filters,
            requirement,
            display,
            json,
        } => cmd_search(&source, criteria.as_deref(), &filters, &requirement, &display, json).await,
        Commands::Curve {
            source,
            models,
            flow,
            head,
            display,
            output,
        } => cmd_curve(&source, &models, flow.zip(head), &display, output.as_deref()).await,
        Commands::Derive {
            category,
            requirement,
            display,
        } => {
            cmd_derive(category.as_deref(), &requirement, &display);
            Ok(())
        }
    }
}

fn open_selector(source: &CatalogArgs) -> CliResult<Selector<MemoryStore>> {
    let layout = match &source.layout {
        Some(path) => ps_catalog::layout::load_yaml(path)?,
        None => CatalogLayout::default(),
    };
    layout.validate()?;

    let pumps = load_rows_json(&source.catalog)?;
    debug!(rows = pumps.len(), path = %source.catalog.display(), "catalog loaded");
    let mut store = MemoryStore::new().with_relation(layout.search_relation(), pumps);
    if let Some(path) = &source.curves {
        let curves = load_rows_json(path)?;
        debug!(rows = curves.len(), path = %path.display(), "curves loaded");
        store = store.with_relation(layout.curve_relation.clone(), curves);
    }
    Ok(Selector::new(store, layout))
}

fn load_criteria(path: Option<&Path>) -> CliResult<SearchCriteria> {
    let Some(path) = path else {
        return Ok(SearchCriteria::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| CliError::CriteriaRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&text).map_err(|source| CliError::CriteriaParse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_filter_flags(mut criteria: SearchCriteria, flags: &FilterArgs) -> CliResult<SearchCriteria> {
    if let Some(category) = &flags.category {
        criteria.category = Some(category.clone());
    }
    if let Some(hz) = flags.frequency {
        criteria.frequency = Some(Frequency::from_hz(f64::from(hz)).ok_or(CliError::Unsupported {
            what: "frequency",
            value: hz.to_string(),
        })?);
    }
    if let Some(n) = flags.phase {
        criteria.phase = known_phase(n);
    }
    if let Some(hp) = &flags.hp {
        criteria.horsepower = Some(hp.clone());
    }
    if let Some(prefix) = &flags.prefix {
        criteria.model_prefix = Some(prefix.clone());
    }
    if let Some(size) = flags.outlet {
        criteria.outlet = Some(OutletFilter {
            size,
            unit: flags.outlet_unit,
            tolerance_pct: ps_select::DEFAULT_OUTLET_TOLERANCE_PCT,
        });
    }
    if let Some(percent) = flags.percent {
        criteria.result_percent = percent;
    }
    Ok(criteria)
}

fn search_criteria(
    criteria_path: Option<&Path>,
    filters: &FilterArgs,
    requirement: &RequirementArgs,
) -> CliResult<SearchCriteria> {
    let mut criteria = apply_filter_flags(load_criteria(criteria_path)?, filters)?;
    if !requirement.is_empty() {
        let resolved = requirement.input().resolve(criteria.scenario_kind());
        criteria = criteria.with_requirement(&resolved);
    }
    Ok(criteria)
}

async fn run_search(source: &CatalogArgs, criteria: &SearchCriteria) -> CliResult<ResultSet> {
    let selector = open_selector(source)?;

    let session = SearchSession::new();
    let ticket = session.begin();
    session.commit(ticket, selector.search(criteria).await);
    let snapshot = session.snapshot();

    match (snapshot.result, snapshot.error) {
        (Some(result), None) => Ok(result),
        (_, error) => Err(CliError::SearchFailed(
            error.unwrap_or_else(|| "no result committed".to_string()),
        )),
    }
}

async fn cmd_search(
    source: &CatalogArgs,
    criteria_path: Option<&Path>,
    filters: &FilterArgs,
    requirement: &RequirementArgs,
    display: &DisplayArgs,
    json: bool,
) -> CliResult<()> {
    let criteria = search_criteria(criteria_path, filters, requirement)?;
    let result = run_search(source, &criteria).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let units = display.units();
    println!(
        "{} pump(s) matched (retrieved {})",
        result.len(),
        result.retrieved_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(point) = operating_point(criteria.required_flow_lpm, criteria.required_head_m, units) {
        println!(
            "Requirement: {:.2} {} at {:.2} {}",
            point.flow,
            units.flow.token(),
            point.head,
            units.head.token()
        );
    }
    for record in &result.records {
        print_record(record, units);
    }
    Ok(())
}

fn print_record(record: &PumpRecord, units: DisplayUnits) {
    let flow = |v: Option<f64>| cell(v.map(|v| units.flow.from_lpm(v)));
    let head = |v: Option<f64>| cell(v.map(|v| units.head.from_m(v)));

    let power = match record.horsepower_rating() {
        Some(r) => format!("{} HP ({:.2} kW / {} W)", r.hp, r.kilowatts(), r.watts()),
        None => "-".to_string(),
    };
    println!(
        "  {:<20} {:>8} {} @ {:>7} {}  max {} / {}  {}  [{}]",
        record.model_id,
        flow(record.rated_flow_lpm),
        units.flow.token(),
        head(record.rated_head_m),
        units.head.token(),
        flow(record.max_flow_lpm),
        head(record.max_head_m),
        power,
        record.category_label(),
    );
}

fn cell(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

async fn cmd_curve(
    source: &CatalogArgs,
    models: &[String],
    point: Option<(f64, f64)>,
    display: &DisplayArgs,
    output: Option<&Path>,
) -> CliResult<()> {
    let selector = open_selector(source)?;
    let units = display.units();
    let series = selector.comparison(models, units).await?;

    let mut csv = format!("model,flow_{},head_{}\n", units.flow.token(), units.head.token());
    for s in &series {
        if s.points.is_empty() {
            eprintln!("No curve data for {}", s.model_id);
        }
        for p in &s.points {
            csv.push_str(&format!("{},{},{}\n", s.model_id, p.flow, p.head));
        }
    }
    if let Some((flow, head)) = point {
        let op = operating_point(units.flow.to_lpm(flow), units.head.to_m(head), units);
        if let Some(op) = op {
            csv.push_str(&format!("operating point,{},{}\n", op.flow, op.head));
        }
    }

    if let Some(path) = output {
        std::fs::write(path, &csv).map_err(|source| CliError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        println!("✓ Exported {} series to {}", series.len(), path.display());
    } else {
        print!("{csv}");
    }
    Ok(())
}

fn cmd_derive(category: Option<&str>, args: &RequirementArgs, display: &DisplayArgs) {
    let kind = ScenarioKind::for_category(category);
    let Requirement {
        flow_lpm,
        head_m,
        flow_source,
        head_source,
    } = args.input().resolve(kind);
    let units = display.units();

    println!("Scenario: {kind:?}");
    println!(
        "  Flow: {:.2} {} ({flow_source:?})",
        units.flow.from_lpm(flow_lpm),
        units.flow.token()
    );
    println!(
        "  Head: {:.2} {} ({head_source:?})",
        units.head.from_m(head_m),
        units.head.token()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pond_flags_build_a_scenario() {
        let cli = Cli::try_parse_from([
            "pumpsel", "derive", "--pond", "2", "1", "1.5", "--drain-time", "1",
        ])
        .unwrap();
        let Commands::Derive { requirement, .. } = cli.command else {
            panic!("expected derive");
        };
        let resolved = requirement.input().resolve(ScenarioKind::Drainage);
        // 3000 L over 60 min
        assert!((resolved.flow_lpm - 50.0).abs() < 1e-9);
        assert_eq!(resolved.head_m, 1.5);
    }

    #[test]
    fn manual_units_parse() {
        let cli = Cli::try_parse_from([
            "pumpsel", "search", "--catalog", "pumps.json", "--flow", "2", "--flow-unit", "L/sec",
            "--frequency", "60",
        ])
        .unwrap();
        let Commands::Search { requirement, filters, .. } = cli.command else {
            panic!("expected search");
        };
        assert!(!requirement.is_empty());
        assert_eq!(requirement.input().resolve(ScenarioKind::Booster).flow_lpm, 120.0);
        let criteria = apply_filter_flags(SearchCriteria::default(), &filters).unwrap();
        assert_eq!(criteria.frequency, Some(Frequency::Hz60));
    }

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("pumpsel-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn parse_search(args: &[&str]) -> (CatalogArgs, Option<PathBuf>, FilterArgs, RequirementArgs) {
        let argv = ["pumpsel", "search"].iter().chain(args).copied();
        let Commands::Search {
            source,
            criteria,
            filters,
            requirement,
            ..
        } = Cli::try_parse_from(argv).unwrap().command
        else {
            panic!("expected search");
        };
        (source, criteria, filters, requirement)
    }

    #[tokio::test]
    async fn invalid_percent_fails_the_command() {
        let catalog = scratch_file("empty-catalog.json", "[]");
        let catalog = catalog.to_str().unwrap();
        let (source, path, filters, requirement) =
            parse_search(&["--catalog", catalog, "--percent", "3"]);

        let criteria = search_criteria(path.as_deref(), &filters, &requirement).unwrap();
        let err = run_search(&source, &criteria).await.unwrap_err();
        assert!(matches!(err, CliError::SearchFailed(_)));
        assert!(err.to_string().contains("result_percent"));
    }

    #[test]
    fn unsupported_phase_flag_is_dropped() {
        let (_, path, filters, requirement) =
            parse_search(&["--catalog", "pumps.json", "--phase", "2", "--frequency", "50"]);
        let criteria = search_criteria(path.as_deref(), &filters, &requirement).unwrap();
        assert_eq!(criteria.phase, None);
        assert_eq!(criteria.frequency, Some(Frequency::Hz50));
    }

    #[test]
    fn flow_flag_keeps_head_from_criteria_file() {
        let yaml = scratch_file("criteria.yaml", "required_flow_lpm: 50\nrequired_head_m: 20\n");
        let yaml = yaml.to_str().unwrap();
        let (_, path, filters, requirement) =
            parse_search(&["--catalog", "pumps.json", "--criteria", yaml, "--flow", "100"]);

        let criteria = search_criteria(path.as_deref(), &filters, &requirement).unwrap();
        assert_eq!(criteria.required_flow_lpm, 100.0);
        assert_eq!(criteria.required_head_m, 20.0);
    }
}
