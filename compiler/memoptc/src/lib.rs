//! memopt command-line driver.
//!
//! Loads a bincode-encoded graph, runs [`MemoryOptimizePass`] for one
//! session and renders the resulting plan as text.
//!
//! # Debugging
//!
//! - `RUST_LOG=memopt_plan=debug`: every cluster as it is planned.
//! - `RUST_LOG=memopt_ir=trace`: graph validation and traversal order.
//! - `MEMOPT_SORT=dfs`: default traversal order when `--sort` is absent.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Once;

use memopt_ir::{Graph, GraphError, Node, ParseSortKindError};
use memopt_plan::{
    Argument, MemoryOptimConfig, MemoryOptimizePass, PassResultStore, PlanError, ReusePlan,
    SessionId,
};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times. Does nothing
/// unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

/// Errors surfaced to the command line.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("cannot access `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot decode graph `{}`: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: bincode::Error,
    },
    #[error("cannot encode graph `{}`: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: bincode::Error,
    },
    #[error("invalid graph: {0}")]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    SortKind(#[from] ParseSortKindError),
}

/// Options for `memopt plan`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanOptions {
    pub graph_path: PathBuf,
    pub config: MemoryOptimConfig,
    pub session: SessionId,
}

impl PlanOptions {
    /// Parse the arguments following `plan`.
    ///
    /// Flags: `--sort=<ts|dfs>`, `--session=<id>`, `--disable`. The first
    /// non-flag argument is the graph path.
    pub fn parse(args: &[String]) -> Result<Self, CliError> {
        let mut config = MemoryOptimConfig::from_env();
        let mut session = SessionId::new(0);
        let mut graph_path = None;

        for arg in args {
            if let Some(kind) = arg.strip_prefix("--sort=") {
                config = config.with_sort_kind(kind.parse()?);
            } else if let Some(raw) = arg.strip_prefix("--session=") {
                let id = raw
                    .parse::<u64>()
                    .map_err(|_| CliError::Usage(format!("invalid session id `{raw}`")))?;
                session = SessionId::new(id);
            } else if arg == "--disable" {
                config = config.disabled();
            } else if arg.starts_with('-') {
                return Err(CliError::Usage(format!("unknown option `{arg}`")));
            } else if graph_path.is_none() {
                graph_path = Some(PathBuf::from(arg));
            } else {
                return Err(CliError::Usage(format!("unexpected argument `{arg}`")));
            }
        }

        let Some(graph_path) = graph_path else {
            return Err(CliError::Usage("missing graph file".to_string()));
        };
        Ok(PlanOptions {
            graph_path,
            config,
            session,
        })
    }
}

/// Read a bincode-encoded node list and validate it into a [`Graph`].
pub fn load_graph(path: &Path) -> Result<Graph, CliError> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let nodes: Vec<Node> =
        bincode::deserialize_from(BufReader::new(file)).map_err(|source| CliError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
    let graph = Graph::from_nodes(nodes)?;
    tracing::debug!(
        path = %path.display(),
        ops = graph.op_count(),
        values = graph.value_count(),
        "graph loaded"
    );
    Ok(graph)
}

/// Write `graph` as a bincode-encoded node list.
pub fn save_graph(path: &Path, graph: Graph) -> Result<(), CliError> {
    let file = File::create(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    bincode::serialize_into(BufWriter::new(file), &graph.into_nodes()).map_err(|source| {
        CliError::Encode {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Render a plan: one block per cluster (largest first), then totals.
pub fn render_plan(plan: &ReusePlan) -> String {
    let mut clusters: Vec<(&str, u64)> = plan
        .cluster_size
        .iter()
        .map(|(anchor, &size)| (anchor.as_str(), size))
        .collect();
    clusters.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut out = String::new();
    for (anchor, size) in &clusters {
        let members: Vec<&str> = plan.members(anchor).collect();
        let _ = writeln!(out, "cluster {anchor} ({size} bytes): {}", members.join(", "));
    }
    let _ = writeln!(
        out,
        "{} values in {} clusters, {} bytes allocated",
        plan.node2cluster.len(),
        plan.cluster_count(),
        plan.planned_bytes()
    );
    out
}

/// Run `memopt plan` and return the text to print.
pub fn run_plan(options: &PlanOptions) -> Result<String, CliError> {
    let graph = load_graph(&options.graph_path)?;
    let store = PassResultStore::new();
    let argument = Argument {
        graph: &graph,
        config: options.config,
        session: options.session,
    };

    match MemoryOptimizePass.run(&argument, &store)? {
        Some(plan) => Ok(render_plan(&plan)),
        None => Ok("memory optimization disabled; no plan produced\n".to_string()),
    }
}
