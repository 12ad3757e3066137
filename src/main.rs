use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use imptree::export::{self, ExportFormat};
use imptree::filter::PackageFilter;
use imptree::graph::{GraphBuilder, ImportTree};
use imptree::loader::{GoListLoader, LoadConfig};
use imptree::module;
use imptree::ui::{run_app, App};

#[derive(Parser)]
#[command(name = "imptree")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(about = "Doubly-linked import trees for Go packages", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the import tree of a package and print it
    Tree {
        /// Package pattern, e.g. ./cmd/server
        pattern: String,

        #[command(flatten)]
        build: BuildArgs,

        /// Output format: tree, json, markdown, dot
        #[arg(short, long, default_value = "tree", env = "IMPTREE_FORMAT")]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Remove a package (and what only it imports) before printing
        #[arg(long, value_name = "PACKAGE")]
        prune: Vec<String>,
    },
    /// Browse the import tree of a package interactively
    Browse {
        /// Package pattern, e.g. ./cmd/server
        pattern: String,

        #[command(flatten)]
        build: BuildArgs,
    },
    /// Show how a package is reached from the root package
    Why {
        /// Package pattern, e.g. ./cmd/server
        pattern: String,

        /// Import path of the package to explain
        package: String,

        #[command(flatten)]
        build: BuildArgs,
    },
    /// List the executable packages of the enclosing module
    Mains {
        /// Directory inside the module (defaults to the working directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Show version information
    Version,
}

#[derive(Args)]
struct BuildArgs {
    /// Directory to run the package load in
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Only include packages under this import path prefix
    /// (defaults to the enclosing module)
    #[arg(short, long, value_name = "PREFIX")]
    prefix: Vec<String>,

    /// Include standard-library packages
    #[arg(long)]
    std: bool,

    /// Exclude a package, or a subtree with a trailing /...
    #[arg(short = 'x', long, value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Build tags passed to the package load
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,

    /// The go executable
    #[arg(long, default_value = "go", env = "IMPTREE_GO")]
    go: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Tree {
            pattern,
            build,
            format,
            output,
            prune,
        }) => {
            let mut tree = build_tree(&pattern, &build)?;
            prune_packages(&mut tree, &prune)?;
            write_tree(&tree, format, output.as_deref())
        }
        Some(Commands::Browse { pattern, build }) => {
            let tree = build_tree(&pattern, &build)?;
            browse(tree)
        }
        Some(Commands::Why {
            pattern,
            package,
            build,
        }) => {
            let tree = build_tree(&pattern, &build)?;
            explain(&tree, &package)
        }
        Some(Commands::Mains { dir }) => list_mains(dir.as_deref()),
        Some(Commands::Version) => {
            println!("imptree v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => {
            println!("imptree - Import trees for Go packages");
            println!("Run 'imptree tree <PATTERN>' to print an import tree");
            println!("Run 'imptree --help' for more information");
            Ok(())
        }
    }
}

/// Logs go to stderr so they never mix with exported output.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn package_filter(args: &BuildArgs) -> PackageFilter {
    let mut filter = PackageFilter::new().include_std(args.std);

    if args.prefix.is_empty() {
        let module_name =
            module::root_path_from(&args.dir).and_then(|root| module::name_from(&root));
        match module_name {
            Ok(name) => {
                tracing::debug!(module = %name, "defaulting prefix to enclosing module");
                filter = filter.prefix(name);
            }
            Err(e) => tracing::warn!("no module prefix, including all packages: {e}"),
        }
    }
    for prefix in &args.prefix {
        filter = filter.prefix(prefix.as_str());
    }
    for pattern in &args.exclude {
        filter = filter.exclude(pattern.as_str());
    }
    filter
}

fn build_tree(pattern: &str, args: &BuildArgs) -> Result<ImportTree> {
    let config = LoadConfig::new()
        .dir(args.dir.clone())
        .go_binary(args.go.clone())
        .tags(args.tags.iter().map(String::as_str));
    let filter = package_filter(args);

    GraphBuilder::with_config(GoListLoader::new(), config)
        .build(pattern, |unit| filter.matches(unit))
        .with_context(|| format!("Failed to build import tree for {pattern}"))
}

fn prune_packages(tree: &mut ImportTree, packages: &[String]) -> Result<()> {
    for package in packages {
        let Some(id) = tree.find(package) else {
            tracing::warn!(package = %package, "not in the import tree, nothing to prune");
            continue;
        };
        if id == tree.root() {
            bail!("Cannot prune the root package {package}");
        }
        tree.remove_node_recursively(id);
        tracing::debug!(
            package = %package,
            attached = tree.node_count(),
            detached = tree.arena_len() - tree.node_count(),
            "pruned"
        );
    }
    Ok(())
}

fn write_tree(tree: &ImportTree, format: ExportFormat, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            export::export(format, tree, &mut writer)
                .and_then(|()| writer.flush())
                .with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            export::export(format, tree, &mut stdout).context("Failed to write to stdout")
        }
    }
}

fn browse(tree: ImportTree) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(tree);
    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result.context("Terminal UI failed")?;

    if !app.pruned.is_empty() {
        println!("Pruned {} package(s):", app.pruned.len());
        for package in &app.pruned {
            println!("  {package}");
        }
    }
    Ok(())
}

fn explain(tree: &ImportTree, package: &str) -> Result<()> {
    let Some(id) = tree.find(package) else {
        bail!("{package} is not imported by {}", tree.root_node().identifier());
    };

    let chain: Vec<&str> = tree
        .import_chain(id)
        .into_iter()
        .filter_map(|step| tree.identifier(step))
        .collect();
    if chain.is_empty() {
        bail!("no first-importer chain from the root reaches {package}");
    }
    for (depth, step) in chain.iter().enumerate() {
        println!("{}{step}", "  ".repeat(depth));
    }

    if let Some(shortest) = tree.depth_of(id) {
        if shortest + 1 < chain.len() {
            println!("(shortest import path has {shortest} steps)");
        }
    }
    let importers = tree.parents_of(id).len();
    if importers > 1 {
        println!("(imported by {importers} packages)");
    }
    Ok(())
}

fn list_mains(dir: Option<&Path>) -> Result<()> {
    let root = match dir {
        Some(dir) => module::root_path_from(dir),
        None => module::root_path_from_working_dir(),
    }
    .context("Not inside a Go module")?;
    let name = module::name_from(&root)
        .with_context(|| format!("Failed to read module name in {}", root.display()))?;

    let mains = module::find_main_packages(&root, &name).context("Failed to scan module")?;
    if mains.is_empty() {
        println!("No main packages in {name}");
        return Ok(());
    }

    for main in mains {
        println!("{}", main.import_path);
    }
    Ok(())
}
