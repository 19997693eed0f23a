use linkscape::analysis::{
    Advisory, CentralityKind, Selection, centrality, community, metrics, select,
};
use linkscape::graph::{CancelToken, Graph};
use linkscape::layout::{InitialPlacement, LayoutEngine, PhysicsConfig, SolverKind};
use linkscape::{Session, SessionConfig};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Invalid(String),
    Io(std::io::Error),
    Linkscape(linkscape::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Invalid(msg) => write!(f, "{msg}\n\n{}", usage()),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Linkscape(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<linkscape::Error> for CliError {
    fn from(value: linkscape::Error) -> Self {
        Self::Linkscape(value)
    }
}

impl From<linkscape::graph::FormatError> for CliError {
    fn from(value: linkscape::graph::FormatError) -> Self {
        Self::Linkscape(value.into())
    }
}

impl From<linkscape::analysis::Error> for CliError {
    fn from(value: linkscape::analysis::Error) -> Self {
        Self::Linkscape(value.into())
    }
}

impl From<linkscape::layout::Error> for CliError {
    fn from(value: linkscape::layout::Error) -> Self {
        Self::Linkscape(value.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Summary,
    Metrics,
    Centrality,
    Communities,
    Layout,
    Select,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    top: Option<usize>,
    config: Option<String>,
    selection: Option<Selection>,
    kind: Option<CentralityKind>,
    solver: Option<SolverKind>,
    params: Vec<(String, f64)>,
    max_iterations: Option<usize>,
    seed: Option<u64>,
}

fn usage() -> &'static str {
    "linkscape\n\
\n\
USAGE:\n\
  linkscape [summary] [options] [<path>|-]\n\
  linkscape metrics [options] [<path>|-]\n\
  linkscape centrality [--kind degree|closeness|betweenness|eigenvector] [--top <n>] [options] [<path>|-]\n\
  linkscape communities [--seed <n>] [options] [<path>|-]\n\
  linkscape layout [--solver <name>] [--param <name>=<value>]... [--max-iterations <n>] [--seed <n>] [options] [<path>|-]\n\
  linkscape select [options] [<path>|-]\n\
\n\
OPTIONS:\n\
  --select <selection>   full | largest | top:<k> | keywords:<a,b,..> | neighborhood:<seed>[:<radius>] | community:<index>\n\
  --config <path>        session config (JSON or YAML); flags override it\n\
  --pretty               pretty-print the JSON output\n\
  --top <n>              keep only the <n> best-ranked nodes\n\
\n\
NOTES:\n\
  - Input is a node-link JSON graph. If <path> is omitted or '-', it is read from stdin.\n\
  - Solvers: repulsion, barnes_hut, force_atlas2, hierarchical_repulsion.\n\
  - --seed seeds label propagation and switches the layout to seeded random placement.\n\
  - Set LINKSCAPE_LOG (e.g. LINKSCAPE_LOG=debug) to log to stderr.\n\
"
}

fn parse_selection(raw: &str) -> Option<Selection> {
    let (head, rest) = match raw.split_once(':') {
        Some((head, rest)) => (head, Some(rest)),
        None => (raw, None),
    };
    let selection = match (head.trim().to_ascii_lowercase().as_str(), rest) {
        ("full", None) => Selection::Full,
        ("largest" | "largest_component", None) => Selection::LargestComponent,
        ("top" | "top_by_degree", Some(k)) => Selection::TopByDegree {
            k: k.trim().parse().ok()?,
        },
        ("keywords", Some(list)) => Selection::Keywords {
            keywords: list.split(',').map(str::to_string).collect(),
        },
        ("neighborhood", Some(rest)) => {
            let (seed, radius) = match rest.rsplit_once(':') {
                Some((seed, radius)) => (seed, radius.trim().parse().ok()?),
                None => (rest, 1),
            };
            Selection::Neighborhood {
                seed: seed.to_string(),
                radius,
            }
        }
        ("community", Some(index)) => Selection::Community {
            index: index.trim().parse().ok()?,
            options: Default::default(),
        },
        _ => return None,
    };
    Some(selection)
}

fn parse_param(raw: &str) -> Option<(String, f64)> {
    let (name, value) = raw.split_once('=')?;
    let value = value.trim().parse::<f64>().ok()?;
    Some((name.trim().to_string(), value))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "summary" => args.command = Command::Summary,
            "metrics" => args.command = Command::Metrics,
            "centrality" => args.command = Command::Centrality,
            "communities" => args.command = Command::Communities,
            "layout" => args.command = Command::Layout,
            "select" => args.command = Command::Select,
            "--pretty" => args.pretty = true,
            "--select" => {
                let Some(raw) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.selection = Some(
                    parse_selection(raw)
                        .ok_or_else(|| CliError::Invalid(format!("invalid selection `{raw}`")))?,
                );
            }
            "--kind" => {
                let Some(raw) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.kind = Some(CentralityKind::from_str(raw).map_err(CliError::Invalid)?);
            }
            "--solver" => {
                let Some(raw) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.solver = Some(
                    SolverKind::from_str(raw).map_err(|err| CliError::Invalid(err.to_string()))?,
                );
            }
            "--param" => {
                let Some(raw) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let param = parse_param(raw).ok_or_else(|| {
                    CliError::Invalid(format!("expected --param <name>=<number>, got `{raw}`"))
                })?;
                args.params.push(param);
            }
            "--max-iterations" => {
                let Some(raw) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.max_iterations = Some(raw.parse().map_err(|_| CliError::Usage(usage()))?);
            }
            "--seed" => {
                let Some(raw) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.seed = Some(raw.parse().map_err(|_| CliError::Usage(usage()))?);
            }
            "--top" => {
                let Some(raw) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.top = Some(raw.parse().map_err(|_| CliError::Usage(usage()))?);
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<Vec<u8>, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read(path)?),
    }
}

fn load_config(path: &str) -> Result<SessionConfig, CliError> {
    let text = std::fs::read_to_string(path)?;
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let config = match ext.as_deref() {
        Some("json") => SessionConfig::from_json(&text)?,
        Some("yaml" | "yml") => SessionConfig::from_yaml(&text)?,
        _ => SessionConfig::parse(&text)?,
    };
    Ok(config)
}

/// The config file (if any) with command-line flags applied on top.
fn build_config(args: &Args) -> Result<SessionConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => SessionConfig::default(),
    };

    if let Some(selection) = &args.selection {
        config.selection = selection.clone();
    }
    if let Some(kind) = args.kind {
        config.centrality = kind;
    }
    match args.solver {
        Some(solver) if solver != config.physics.kind() => {
            config.physics = PhysicsConfig::defaults(solver);
        }
        _ => {}
    }
    for (name, value) in &args.params {
        config.physics.set(name, *value)?;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.simulation.max_iterations = max_iterations;
    }
    if let Some(seed) = args.seed {
        config.communities.seed = seed;
        config.simulation.initial_placement = InitialPlacement::Random { seed };
    }

    config.validate()?;
    Ok(config)
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

#[derive(Serialize)]
struct SelectOut<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    advisory: Option<&'a Advisory>,
    graph: serde_json::Value,
}

fn selected(base: &Graph, config: &SessionConfig) -> Graph {
    let selected = select::select(base, &config.selection);
    if let Some(advisory) = &selected.advisory {
        tracing::warn!(?advisory, "selection produced an empty subgraph");
    }
    selected.graph
}

fn run(args: Args) -> Result<(), CliError> {
    let config = build_config(&args)?;
    let bytes = read_input(args.input.as_deref())?;
    let cancel = CancelToken::new();

    match args.command {
        Command::Summary => {
            let session = Session::open(&bytes)?;
            let mut snapshot = session.run(&config)?;
            if let (Some(top), Some(ranking)) = (args.top, snapshot.centrality.as_mut()) {
                ranking.scores.truncate(top);
            }
            write_json(&snapshot, args.pretty)
        }
        Command::Metrics => {
            let base = linkscape::graph::load(&bytes)?;
            let graph = selected(&base, &config);
            write_json(&metrics::summarize(&graph), args.pretty)
        }
        Command::Centrality => {
            let base = linkscape::graph::load(&bytes)?;
            let graph = selected(&base, &config);
            let mut ranking = centrality::rank_with(
                &graph,
                config.centrality,
                &config.centrality_options,
                &cancel,
            )?;
            if let Some(top) = args.top {
                ranking.scores.truncate(top);
            }
            write_json(&ranking, args.pretty)
        }
        Command::Communities => {
            let base = linkscape::graph::load(&bytes)?;
            let graph = selected(&base, &config);
            let partition =
                community::label_propagation_with_cancel(&graph, &config.communities, &cancel)?;
            write_json(&partition, args.pretty)
        }
        Command::Layout => {
            let base = linkscape::graph::load(&bytes)?;
            let graph = selected(&base, &config);
            let state = LayoutEngine::try_new(config.physics, config.simulation)?
                .run_with_cancel(&graph, &cancel);
            write_json(&state, args.pretty)
        }
        Command::Select => {
            let base = linkscape::graph::load(&bytes)?;
            let selected = select::select(&base, &config.selection);
            let out = SelectOut {
                advisory: selected.advisory.as_ref(),
                graph: linkscape::graph::dump(&selected.graph),
            };
            write_json(&out, args.pretty)
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("LINKSCAPE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    init_logging();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(err @ (CliError::Usage(_) | CliError::Invalid(_))) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("linkscape")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn selections_parse() {
        assert_eq!(parse_selection("full"), Some(Selection::Full));
        assert_eq!(parse_selection("largest"), Some(Selection::LargestComponent));
        assert_eq!(
            parse_selection("top:5"),
            Some(Selection::TopByDegree { k: 5 })
        );
        assert_eq!(
            parse_selection("neighborhood:Rust:2"),
            Some(Selection::Neighborhood {
                seed: "Rust".to_string(),
                radius: 2
            })
        );
        assert_eq!(
            parse_selection("neighborhood:Rust"),
            Some(Selection::Neighborhood {
                seed: "Rust".to_string(),
                radius: 1
            })
        );
        assert_eq!(parse_selection("top:many"), None);
        assert_eq!(parse_selection("everything"), None);
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse_args(&argv(&[
            "layout",
            "--solver",
            "forceAtlas2Based",
            "--param",
            "damping=0.6",
            "--max-iterations",
            "20",
            "graph.json",
        ]))
        .expect("valid args");
        assert_eq!(args.command, Command::Layout);
        assert_eq!(args.input.as_deref(), Some("graph.json"));

        let config = build_config(&args).expect("valid config");
        assert_eq!(config.physics.kind(), SolverKind::ForceAtlas2);
        assert_eq!(config.physics.get("damping"), Some(0.6));
        assert_eq!(config.simulation.max_iterations, 20);
    }

    #[test]
    fn bad_values_are_usage_errors() {
        assert!(matches!(
            parse_args(&argv(&["--kind", "pagerank"])),
            Err(CliError::Invalid(_))
        ));
        assert!(matches!(
            parse_args(&argv(&["--param", "damping"])),
            Err(CliError::Invalid(_))
        ));
        assert!(matches!(
            parse_args(&argv(&["--top"])),
            Err(CliError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&argv(&["a.json", "b.json"])),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn unknown_parameter_fails_config() {
        let args = parse_args(&argv(&["--solver", "repulsion", "--param", "theta=0.3"]))
            .expect("valid args");
        assert!(matches!(build_config(&args), Err(CliError::Linkscape(_))));
    }
}
