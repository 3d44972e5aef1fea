//! Shapehouse CLI: command-line interface for a local Shapehouse data directory

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use shapehouse::rdf::{Graph, GraphCodec, NTriplesCodec, NamespaceManager, TurtleCodec};
use shapehouse::store::WriteOutcome;
use shapehouse::{parse_criteria, Config, QueryParams, Shapehouse, StoreError, WriteMode};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shapehouse", version, about = "Shapehouse RDF store CLI")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "SHAPEHOUSE_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory (overrides the configuration)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// RDF output syntax
    #[arg(long, default_value = "turtle", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Turtle,
    NTriples,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage warehouses
    Warehouse {
        #[command(subcommand)]
        action: WarehouseAction,
    },
    /// Manage shape graphs
    Shapes {
        #[command(subcommand)]
        action: ShapesAction,
    },
    /// Manage data graphs
    Graph {
        #[command(subcommand)]
        action: GraphAction,
    },
    /// Manage single resources
    Resource {
        #[command(subcommand)]
        action: ResourceAction,
    },
    /// Run an OSLC query over data graphs
    Search {
        warehouse: String,
        /// Restrict to these stores (default: all)
        #[arg(long = "store")]
        stores: Vec<String>,
        /// Resource type IRI
        #[arg(long = "type")]
        resource_type: Option<String>,
        #[arg(long)]
        prefix: Option<String>,
        #[arg(long)]
        select: Option<String>,
        #[arg(long = "where")]
        where_clause: Option<String>,
        #[arg(long)]
        order_by: Option<String>,
        /// Print the generated SPARQL instead of the result graph
        #[arg(long)]
        explain: bool,
    },
    /// Print a service provider catalog (master catalog when no warehouse is given)
    Catalog { warehouse: Option<String> },
}

#[derive(Subcommand)]
enum WarehouseAction {
    Create { name: String },
    List,
    Remove { name: String },
}

#[derive(Subcommand)]
enum ShapesAction {
    /// Replace a store's shape graph from a Turtle file ("-" for stdin)
    Load {
        warehouse: String,
        store: String,
        file: PathBuf,
    },
    /// Print a store's shape graph
    Get { warehouse: String, store: String },
}

#[derive(Subcommand)]
enum GraphAction {
    /// Write a data graph from a Turtle file ("-" for stdin)
    Put {
        warehouse: String,
        store: String,
        file: PathBuf,
        /// Add resources not already stored instead of replacing the graph
        #[arg(long)]
        add: bool,
    },
    /// List store names, optionally matching a regular expression
    List {
        warehouse: String,
        #[arg(long)]
        pattern: Option<String>,
    },
    /// Print a data graph, optionally filtered
    Get {
        warehouse: String,
        store: String,
        #[arg(long = "where")]
        where_clause: Option<String>,
        #[arg(long)]
        select: Option<String>,
    },
    /// Remove a data graph and its shapes
    Remove { warehouse: String, store: String },
}

#[derive(Subcommand)]
enum ResourceAction {
    /// Print one resource
    Get {
        warehouse: String,
        store: String,
        iri: String,
    },
    /// Replace one resource from a Turtle file ("-" for stdin)
    Put {
        warehouse: String,
        store: String,
        iri: String,
        file: PathBuf,
    },
    /// Remove one resource and references to it
    Remove {
        warehouse: String,
        store: String,
        iri: String,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        if let Some(report) = e.downcast_ref::<StoreError>().and_then(StoreError::violations) {
            for violation in &report.violations {
                eprintln!("  {}", violation.message);
            }
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir;
    }
    init_logging(&config.log_level);
    debug!("Configuration: {:?}", config);

    let house = Shapehouse::open(config).context("opening data directory")?;
    let manager = house.manager();
    let format = cli.format;

    match cli.command {
        Commands::Warehouse { action } => match action {
            WarehouseAction::Create { name } => {
                manager.create_warehouse(&name)?;
                println!("Created warehouse '{}'", name);
            }
            WarehouseAction::List => {
                let mut table = Table::new();
                table.set_content_arrangement(ContentArrangement::Dynamic);
                table.set_header(vec!["Warehouse", "Stores"]);
                let names = manager.list_warehouses();
                for name in &names {
                    let stores = manager.list_graphs(name, None)?;
                    table.add_row(vec![name.clone(), stores.join(", ")]);
                }
                println!("{}", table);
                println!("{} warehouse(s)", names.len());
            }
            WarehouseAction::Remove { name } => {
                manager.remove_warehouse(&name)?;
                println!("Removed warehouse '{}'", name);
            }
        },
        Commands::Shapes { action } => match action {
            ShapesAction::Load { warehouse, store, file } => {
                let shapes = TurtleCodec.parse(&read_input(&file)?, None)?;
                let count = manager.replace_shape_graph(&warehouse, &store, &shapes)?;
                println!("Loaded {} shape(s) into '{}'", count, store);
            }
            ShapesAction::Get { warehouse, store } => {
                print_graph(&manager.get_shape_graph(&warehouse, &store)?, format)?;
            }
        },
        Commands::Graph { action } => match action {
            GraphAction::Put {
                warehouse,
                store,
                file,
                add,
            } => {
                let graph = TurtleCodec.parse(&read_input(&file)?, None)?;
                let mode = if add {
                    WriteMode::AddIfDisjoint
                } else {
                    WriteMode::Replace
                };
                let outcome = manager.write_graph(&warehouse, &store, &graph, mode)?;
                report_outcome(&outcome, format)?;
            }
            GraphAction::List { warehouse, pattern } => {
                let stores = manager.list_graphs(&warehouse, pattern.as_deref())?;
                let mut table = Table::new();
                table.set_header(vec!["Store"]);
                for store in &stores {
                    table.add_row(vec![store.clone()]);
                }
                println!("{}", table);
                println!("{} store(s)", stores.len());
            }
            GraphAction::Get {
                warehouse,
                store,
                where_clause,
                select,
            } => {
                let graph = manager.filter_graph(
                    &warehouse,
                    &store,
                    where_clause.as_deref(),
                    select.as_deref(),
                )?;
                print_graph(&graph, format)?;
            }
            GraphAction::Remove { warehouse, store } => {
                manager.remove_graph(&warehouse, &store)?;
                println!("Removed store '{}'", store);
            }
        },
        Commands::Resource { action } => match action {
            ResourceAction::Get { warehouse, store, iri } => {
                print_graph(&manager.get_resource(&warehouse, &store, &iri)?, format)?;
            }
            ResourceAction::Put {
                warehouse,
                store,
                iri,
                file,
            } => {
                let description = TurtleCodec.parse(&read_input(&file)?, Some(&iri))?;
                manager.write_resource(&warehouse, &store, &iri, &description)?;
                println!("Updated <{}>", iri);
            }
            ResourceAction::Remove { warehouse, store, iri } => {
                manager.remove_resource(&warehouse, &store, &iri)?;
                println!("Removed <{}>", iri);
            }
        },
        Commands::Search {
            warehouse,
            stores,
            resource_type,
            prefix,
            select,
            where_clause,
            order_by,
            explain,
        } => {
            let params = QueryParams {
                prefix,
                select,
                where_clause,
                order_by,
            };
            let mut criteria = parse_criteria(&params)?;
            if let Some(resource_type) = resource_type {
                criteria = criteria.with_type(resource_type);
            }
            let stores: Vec<&str> = stores.iter().map(String::as_str).collect();
            let base = format!("{}/oslc/{}/query", house.config().base_uri, warehouse);
            let response = manager.search(&warehouse, &criteria, &stores, &base)?;
            if explain {
                println!("{}", response.sparql);
            } else {
                print_graph(&response.graph, format)?;
                eprintln!("{} result(s)", response.total);
            }
        }
        Commands::Catalog { warehouse } => {
            let document = house.catalog().catalog(warehouse.as_deref().unwrap_or(""))?;
            print_graph(document.graph(), format)?;
        }
    }
    Ok(())
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn print_graph(graph: &Graph, format: OutputFormat) -> Result<()> {
    let namespaces = NamespaceManager::new();
    let bytes = match format {
        OutputFormat::Turtle => TurtleCodec.serialize(graph, &namespaces)?,
        OutputFormat::NTriples => NTriplesCodec.serialize(graph, &namespaces)?,
    };
    print!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}

fn report_outcome(outcome: &WriteOutcome, format: OutputFormat) -> Result<()> {
    match outcome {
        WriteOutcome::Replaced { created, triples } => {
            let verb = if *created { "Created" } else { "Replaced" };
            println!("{} graph with {} triple(s)", verb, triples);
        }
        WriteOutcome::Added { added, triples, .. } => {
            println!("Added {} resource(s), {} triple(s)", added, triples);
        }
        WriteOutcome::Unchanged { .. } => {
            println!("Nothing added");
        }
    }
    let skipped = outcome.skipped();
    if !skipped.is_empty() {
        println!("{} resource(s) already present:", skipped.len());
        print_graph(&shapehouse::StoreManager::disjoint_report(skipped), format)?;
    }
    if matches!(outcome, WriteOutcome::Unchanged { skipped } if !skipped.is_empty()) {
        bail!("all submitted resources already exist");
    }
    Ok(())
}
