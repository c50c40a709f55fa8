//! # Iconify-dl CLI
//!
//! Interactive command-line interface for the iconify-dl library.
//! Browse the Iconify catalog, pick icons and save them as SVG files.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use iconify_dl::{
    create_http_client, CatalogClient, CatalogConfig, Error, Pipeline, RenderParams, Renderer,
    Selection,
};
use log::{debug, error, LevelFilter};

mod cli;

use cli::progress::{ctrl_c_press, interrupt_after_cancel, ProgressState};
use cli::{select, CollectionArg, ProgressReporter};

/// Exit status after an abort from the keyboard
const EXIT_INTERRUPTED: i32 = 130;

/// Command-line interface for iconify-dl
#[derive(Parser)]
#[command(name = "iconify-dl")]
#[command(about = "Interactive Iconify icon downloader")]
#[command(long_about = "Browse Iconify icon collections and download icons as SVG files:
  iconify-dl ./icons                               # Pick collections and icons interactively
  iconify-dl ./icons -c mdi                        # Pick icons from Material Design Icons
  iconify-dl ./icons -c mdi:account,home --yes     # Download two icons without prompts
  iconify-dl ./icons -c mdi:home --color '#ff0000' # Replace currentColor with red

Files are written to <PATH>/<collection>/<icon>.svg, overwriting existing files.
Ctrl+C closes the progress display; downloads keep running until done.
Press Ctrl+C again to abort the run (exit status 130).")]
#[command(version = env!("ICONIFY_DL_VERSION"))]
struct Cli {
    /// Directory receiving one sub-directory per collection
    path: PathBuf,

    /// Collection to download from, optionally with icon names: "mdi" or "mdi:account,home"
    #[arg(short, long = "collection", value_name = "ID[:ICONS]")]
    collections: Vec<CollectionArg>,

    /// Target width of every icon (default: 1em)
    #[arg(long)]
    width: Option<String>,

    /// Target height of every icon (default: 1em)
    #[arg(long)]
    height: Option<String>,

    /// Replacement for currentColor in icon bodies
    #[arg(long)]
    color: Option<String>,

    /// Skip the confirmation and render option prompts
    #[arg(short, long)]
    yes: bool,

    /// Iconify API base URL
    #[arg(long, default_value = "https://api.iconify.design")]
    api_url: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Hide the progress display
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn has_render_flags(&self) -> bool {
        self.width.is_some() || self.height.is_some() || self.color.is_some()
    }

    fn render_params_from_flags(&self) -> RenderParams {
        RenderParams::from_input(
            self.width.as_deref().unwrap_or_default(),
            self.height.as_deref().unwrap_or_default(),
            self.color.as_deref().unwrap_or_default(),
        )
    }
}

/// Make the output directory absolute against the current directory
fn resolve_base_path(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    Ok(cwd.join(path))
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let mut logger = env_logger::Builder::from_default_env();
    logger.target(env_logger::Target::Stderr);
    if cli.verbose {
        logger.filter_module("iconify_dl", LevelFilter::Debug);
    }
    logger.init();

    if cli.verbose {
        eprintln!("🎨 Iconify-dl v{} starting...", env!("ICONIFY_DL_VERSION"));
    }

    let base_path = resolve_base_path(&cli.path)?;

    // Shared for the whole run
    let catalog = CatalogClient::new(create_http_client()?, CatalogConfig::with_base_url(&cli.api_url));
    let renderer = Renderer::new()?;

    let selection = build_selection(&cli, &catalog).await?;
    let icon_count = selection.total_icons();
    if icon_count == 0 {
        return Err(Error::InvalidInput("No icons selected".to_string()).into());
    }

    if !cli.yes && !select::confirm_download(icon_count)? {
        return Ok(());
    }

    let params = if cli.yes || cli.has_render_flags() {
        cli.render_params_from_flags()
    } else {
        select::prompt_render_params()?
    };

    eprintln!("📁 Saving to: {}", base_path.display());

    let (events, receiver) = tokio::sync::mpsc::unbounded_channel();
    let (cancel_display, cancel) = tokio::sync::oneshot::channel();
    let reporter = ProgressReporter::start(icon_count as u64, receiver, cli.quiet, cancel);

    // Quiet runs keep the default SIGINT behaviour
    let quiet = cli.quiet;
    let interrupted = async move {
        if quiet {
            std::future::pending::<()>().await;
        } else {
            interrupt_after_cancel(ctrl_c_press, cancel_display).await;
        }
    };

    let pipeline = Pipeline::new(&catalog, &renderer, params, &base_path);
    let start_time = Instant::now();
    let result = tokio::select! {
        result = pipeline.run(&selection, &events) => result,
        _ = interrupted => {
            eprintln!("\n⚠️  Interrupted");
            std::process::exit(EXIT_INTERRUPTED);
        }
    };
    drop(events);

    // The display must be gone before anything else is printed
    let stopped = reporter.stop().await;
    let (written, state) = finish_run(result, stopped)?;
    debug!(
        "Display showed {} of {} icons ({:.0}%)",
        state.completed(),
        state.total(),
        state.fraction() * 100.0
    );

    println!("\n{written} icons downloaded! Took: {:.2?}", start_time.elapsed());

    Ok(())
}

/// Combine the pipeline and display outcomes, pipeline failure first
fn finish_run(
    result: iconify_dl::Result<usize>,
    stopped: anyhow::Result<ProgressState>,
) -> anyhow::Result<(usize, ProgressState)> {
    let written = match (result, &stopped) {
        (Err(e), Err(display)) => {
            debug!("Progress display also failed: {display:#}");
            return Err(e.into());
        }
        (result, _) => result?,
    };

    Ok((written, stopped?))
}

/// Gather the selection from arguments or menus
async fn build_selection(cli: &Cli, catalog: &CatalogClient) -> anyhow::Result<Selection> {
    let collections = catalog
        .list_collections()
        .await
        .with_context(|| format!("cannot list collections from {}", catalog.base_url()))?;

    let mut selection = Selection::new();

    if cli.collections.is_empty() {
        for collection in select::choose_collections(&collections)? {
            let icons = catalog.list_icon_ids(&collection.id).await?;
            selection.insert(collection.id.as_str(), select::choose_icons(collection, &icons)?);
        }
        return Ok(selection);
    }

    let chosen = select::resolve_collections(&cli.collections, &collections)?;
    for (arg, collection) in cli.collections.iter().zip(chosen) {
        match &arg.icons {
            Some(icons) => selection.insert(collection.id.as_str(), icons.iter().cloned()),
            None => {
                let icons = catalog.list_icon_ids(&collection.id).await?;
                selection.insert(collection.id.as_str(), select::choose_icons(collection, &icons)?);
            }
        }
    }

    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_collection_args() {
        let cli = Cli::try_parse_from([
            "iconify-dl",
            "./out",
            "-c",
            "mdi:account,home",
            "--collection",
            "lucide",
            "--yes",
        ])
        .unwrap();

        assert_eq!(cli.path, PathBuf::from("./out"));
        assert_eq!(cli.collections.len(), 2);
        assert_eq!(cli.collections[0].icons.as_ref().map(Vec::len), Some(2));
        assert_eq!(cli.collections[1].icons, None);
        assert!(cli.yes);
        assert_eq!(cli.api_url, "https://api.iconify.design");
    }

    #[test]
    fn test_cli_requires_path() {
        assert!(Cli::try_parse_from(["iconify-dl"]).is_err());
    }

    #[test]
    fn test_render_params_from_flags() {
        let cli = Cli::try_parse_from(["iconify-dl", "out", "--width", "32", "--color", "red"]).unwrap();

        assert!(cli.has_render_flags());
        assert_eq!(
            cli.render_params_from_flags(),
            RenderParams {
                width: Some("32".to_string()),
                height: None,
                color: Some("red".to_string()),
            }
        );
    }

    #[test]
    fn test_resolve_base_path_relative() {
        let resolved = resolve_base_path(Path::new("icons")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("icons"));
    }

    #[test]
    fn test_resolve_base_path_absolute() {
        let resolved = resolve_base_path(Path::new("/tmp/out")).unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_finish_run_reports_pipeline_error_first() {
        let result = Err(Error::TransportError("catalog went away".to_string()));
        let stopped = Err(anyhow::anyhow!("progress display task failed"));

        let error = finish_run(result, stopped).unwrap_err();
        assert!(error.to_string().contains("catalog went away"));
    }

    #[test]
    fn test_finish_run_reports_display_error() {
        let stopped = Err(anyhow::anyhow!("progress display task failed"));

        let error = finish_run(Ok(3), stopped).unwrap_err();
        assert!(error.to_string().contains("progress display task failed"));
    }

    #[test]
    fn test_finish_run_success() {
        let (written, state) = finish_run(Ok(2), Ok(ProgressState::new(2))).unwrap();
        assert_eq!(written, 2);
        assert_eq!(state.total(), 2);
    }

    #[test]
    fn test_help_mentions_second_interrupt() {
        use clap::CommandFactory;

        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("Press Ctrl+C again to abort"));
    }
}
