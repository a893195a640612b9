use std::path::Path;

use anyhow::Result;
use clap::Parser;

mod community;
mod config;
mod data;
mod error;
mod graph;
mod metrics;
mod report;
mod viz;

use config::Config;
use error::GraphError;

#[derive(Parser, Debug)]
#[clap(
    name = "graph-community-analyzer",
    about = "Graph metrics and community detection for network datasets"
)]
struct Cli {
    /// Path to the input graph (edge list, or GML when the extension is .gml)
    #[clap(long)]
    input: String,

    /// Optional JSON file mapping node ids to attribute payloads
    #[clap(long)]
    metadata: Option<String>,

    /// Attribute key under which metadata payloads are stored
    #[clap(long, default_value = "genres")]
    metadata_key: String,

    /// Output directory for results
    #[clap(long, default_value = "analysis_results")]
    output_dir: String,

    /// Maximum number of community-detection levels
    #[clap(long, default_value = "5")]
    levels: usize,

    /// Skip visualization data files
    #[clap(long)]
    skip_viz: bool,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let config = Config::new(args.levels, args.metadata_key, args.threads);

    // Set number of threads
    let num_threads = if config.threads > 0 {
        config.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    log::info!("Starting graph analysis");
    log::info!("Input: {}", args.input);
    log::info!("Output: {}", args.output_dir);

    // Create output directory
    std::fs::create_dir_all(&args.output_dir)?;

    // 1. Load the graph
    let mut graph = data::load_graph(Path::new(&args.input))?;

    log::info!(
        "Loaded graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    // 2. Attach node metadata if supplied
    if let Some(metadata_path) = &args.metadata {
        let metadata = data::metadata::load(Path::new(metadata_path))?;
        data::metadata::apply(&mut graph, &metadata, &config.metadata_key)?;
    }

    // 3. Headline metrics
    log::info!("Density: {:.6}", metrics::density(&graph));
    log::info!(
        "Clustering coefficient: {:.6}",
        metrics::clustering_coefficient(&graph)
    );
    match metrics::average_path_length(&graph) {
        Ok(value) => log::info!("Average path length: {:.6}", value),
        Err(GraphError::DisconnectedSingleton) => {
            log::warn!("Average path length undefined for this graph")
        }
        Err(err) => return Err(err.into()),
    }

    // 4. Community detection
    let partitions = community::detect_communities(&graph, config.community_levels)?;

    log::info!(
        "Found {} community levels, finest has {} communities",
        partitions.len(),
        partitions.last().map_or(0, |p| p.len())
    );

    // 5. Save results
    report::save_results(&graph, &partitions, &args.output_dir)?;

    // 6. Generate visualization data if requested
    if !args.skip_viz {
        viz::generate_visualizations(&graph, &partitions, &args.output_dir)?;
    }

    log::info!("Analysis complete. Results saved to {}", args.output_dir);

    Ok(())
}
