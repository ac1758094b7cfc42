//! gfmdoc CLI - render documentation page trees to GitHub-flavored Markdown

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use gfmdoc::{
    load_tree, FileSystemWriter, GfmDoc, MemoryWriter, OutputWriter, RenderOptions, RenderReport,
    RowFilter,
};

#[derive(Parser)]
#[command(name = "gfmdoc")]
#[command(version)]
#[command(about = "Render documentation page trees to GitHub-flavored Markdown", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every page of a tree into a directory
    Render {
        /// Page tree as JSON
        #[arg(value_name = "TREE")]
        tree: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "docs")]
        output: PathBuf,

        #[command(flatten)]
        options: RenderArgs,

        /// Render pages one at a time
        #[arg(long)]
        sequential: bool,

        /// Render without writing; list the files that would be produced
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the Markdown of a single page
    Page {
        /// Page tree as JSON
        #[arg(value_name = "TREE")]
        tree: PathBuf,

        /// Page name
        #[arg(value_name = "NAME")]
        name: String,

        #[command(flatten)]
        options: RenderArgs,
    },

    /// List the output path of every page
    Paths {
        /// Page tree as JSON
        #[arg(value_name = "TREE")]
        tree: PathBuf,

        /// Prefix removed from every path
        #[arg(long, env = "GFMDOC_STRIP_PREFIX")]
        strip_prefix: Option<String>,

        /// File name of pages that have children
        #[arg(long, default_value = "README")]
        index_name: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Clone)]
struct RenderArgs {
    /// Prefix removed from every path (e.g. "libui/")
    #[arg(long, env = "GFMDOC_STRIP_PREFIX")]
    strip_prefix: Option<String>,

    /// File name of pages that have children
    #[arg(long, default_value = "README")]
    index_name: String,

    /// Language tag on fenced code blocks
    #[arg(long, default_value = gfmdoc::render::DEFAULT_CODE_LANGUAGE)]
    code_language: String,

    /// Drop table rows whose first reference is this name (e.g. "kotlin.Any")
    #[arg(long, value_name = "REF")]
    skip_row_ref: Option<String>,

    /// Do not tag platform-dependent text with its source sets
    #[arg(long)]
    no_platform_tags: bool,

    /// Do not caption divergent groups
    #[arg(long)]
    no_labels: bool,

    /// Do not emit anchors in table cells
    #[arg(long)]
    no_anchors: bool,

    /// Do not emit breadcrumbs
    #[arg(long)]
    no_breadcrumbs: bool,

    /// Escape Markdown punctuation in plain text
    #[arg(long)]
    escape: bool,
}

impl RenderArgs {
    fn render_options(&self) -> RenderOptions {
        let mut options = RenderOptions::new()
            .with_code_language(&self.code_language)
            .with_platform_tags(!self.no_platform_tags)
            .with_divergent_labels(!self.no_labels)
            .with_cell_anchors(!self.no_anchors)
            .with_breadcrumbs(!self.no_breadcrumbs)
            .with_escaping(self.escape);
        if let Some(reference) = &self.skip_row_ref {
            options = options.with_row_filter(RowFilter::sole_reference(reference));
        }
        options
    }

    fn builder(&self) -> GfmDoc {
        let mut doc = GfmDoc::new()
            .with_index_name(&self.index_name)
            .with_render_options(self.render_options());
        if let Some(prefix) = &self.strip_prefix {
            doc = doc.with_strip_prefix(prefix);
        }
        doc
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            tree,
            output,
            options,
            sequential,
            dry_run,
        } => cmd_render(&tree, &output, &options, sequential, dry_run),
        Commands::Page {
            tree,
            name,
            options,
        } => cmd_page(&tree, &name, &options),
        Commands::Paths {
            tree,
            strip_prefix,
            index_name,
            json,
        } => cmd_paths(&tree, strip_prefix.as_deref(), &index_name, json),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_render(
    tree_path: &Path,
    output_dir: &Path,
    options: &RenderArgs,
    sequential: bool,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Loading page tree...");
    let tree = load_tree(tree_path)?;
    log::debug!("Loaded {} pages from {}", tree.len(), tree_path.display());

    let mut doc = options.builder();
    if sequential {
        doc = doc.sequential();
    }

    pb.set_message(format!("Rendering {} pages...", tree.len()));
    let memory = MemoryWriter::new();
    let disk = FileSystemWriter::new(output_dir);
    let output: &dyn OutputWriter = if dry_run { &memory } else { &disk };
    let report = doc.render_to(&tree, output);
    pb.finish_with_message("Done!");

    print_report(&report, output_dir, dry_run);

    if report.is_success() {
        Ok(())
    } else {
        Err(format!("{} pages failed", report.failures.len()).into())
    }
}

fn print_report(report: &RenderReport, output_dir: &Path, dry_run: bool) {
    let heading = if dry_run {
        "Would write:"
    } else {
        "Output files:"
    };
    println!("\n{} {}", heading.green().bold(), output_dir.display());
    let mut entries: Vec<&String> = report.written.iter().chain(&report.copied).collect();
    entries.sort();
    for (i, path) in entries.iter().enumerate() {
        let branch = if i + 1 == entries.len() { "└─" } else { "├─" };
        println!("  {} {}", branch.dimmed(), path);
    }

    println!(
        "\n{} {} written, {} copied, {} skipped",
        "Summary:".cyan().bold(),
        report.written.len(),
        report.copied.len(),
        report.skipped
    );
    for failure in &report.failures {
        println!(
            "  {} {}: {}",
            "failed".red(),
            failure.page.yellow(),
            failure.error
        );
    }
}

fn cmd_page(
    tree_path: &Path,
    name: &str,
    options: &RenderArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let tree = load_tree(tree_path)?;
    let markdown = options.builder().render_page(&tree, name)?;
    println!("{}", markdown);
    Ok(())
}

fn cmd_paths(
    tree_path: &Path,
    strip_prefix: Option<&str>,
    index_name: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let tree = load_tree(tree_path)?;
    let mut doc = GfmDoc::new().with_index_name(index_name);
    if let Some(prefix) = strip_prefix {
        doc = doc.with_strip_prefix(prefix);
    }
    let paths = doc.paths(&tree);

    if json {
        let map: serde_json::Map<String, serde_json::Value> = paths
            .into_iter()
            .map(|(name, path)| (name, serde_json::Value::String(path)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        for (name, path) in paths {
            println!("{} {}", name.cyan(), path);
        }
    }
    Ok(())
}
