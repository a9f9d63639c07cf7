//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::debug;

use slidegen_pptx::{
    DirectoryTarget, ExportConfig, ExportError, ExportReport, Exporter, PackageSummary, Slide,
    ThemeId,
};

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "slidegen")]
#[command(author, version, about = "Themed slide decks to PowerPoint", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a deck snapshot (JSON) to a PPTX file
    Export {
        /// Input deck file
        input: PathBuf,

        /// Theme identifier (overrides the deck file)
        #[arg(short, long)]
        theme: Option<String>,

        /// Presentation title (overrides the deck file)
        #[arg(long)]
        title: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Export configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the available themes
    Themes {
        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show what a PPTX file contains
    Inspect {
        /// Input PPTX file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Deck snapshot as saved by the editor
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckFile {
    /// Presentation title
    #[serde(default)]
    pub title: String,

    /// Selected theme identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<String>,

    /// Slides in presentation order
    #[serde(default)]
    pub slides: Vec<Slide>,
}

impl DeckFile {
    /// Load a deck snapshot from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read deck file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse deck file: {}", path.display()))
    }
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            input,
            theme,
            title,
            output,
            config,
        } => {
            export_command(
                &input,
                theme.as_deref(),
                title.as_deref(),
                &output,
                config.as_deref(),
            )?;
        }
        Commands::Themes { format } => {
            themes_command(format)?;
        }
        Commands::Inspect { input, format } => {
            inspect_command(&input, format)?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` refines the default `info` level
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute the export command.
///
/// Returns `None` when the deck has no slides; nothing is written then.
pub fn export_command(
    input: &Path,
    theme: Option<&str>,
    title: Option<&str>,
    output_dir: &Path,
    config: Option<&Path>,
) -> Result<Option<ExportReport>> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let deck = DeckFile::from_file(input)?;

    let config = match config {
        Some(path) => ExportConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => ExportConfig::default(),
    };

    // An absent theme falls back to the default; a wrong one is an error
    let theme = theme
        .map(str::to_string)
        .or_else(|| deck.theme_id.clone())
        .unwrap_or_else(|| ThemeId::default().as_str().to_string());
    let title = title.unwrap_or(deck.title.as_str());

    debug!(slides = deck.slides.len(), theme = %theme, "Deck loaded");

    println!("slidegen v{}", env!("CARGO_PKG_VERSION"));
    println!("Exporting: {}", input.display());

    let mut target = DirectoryTarget::new(output_dir);
    let report = Exporter::new(config)
        .export(&deck.slides, &theme, title, &mut target)
        .map_err(describe_failure)?;

    let Some(report) = report else {
        println!("  Nothing to export: the deck has no slides");
        return Ok(None);
    };

    println!("  Theme: {}", theme);
    println!("  Created: {}", target.path_for(&report.filename).display());
    println!("  {} slide(s), {} bytes", report.slide_count, report.size);

    for asset_error in &report.asset_errors {
        println!("  Warning: {}", asset_error);
    }

    println!();
    println!("Export complete!");

    Ok(Some(report))
}

/// Fatal export errors carry their code and failing stage
fn describe_failure(err: ExportError) -> anyhow::Error {
    let context = format!("Export failed during {} [{}]", err.stage(), err.code());
    anyhow::Error::new(err).context(context)
}

#[derive(Serialize)]
struct ThemeRow {
    id: &'static str,
    name: String,
    header: &'static str,
    text: &'static str,
    bg: &'static str,
    accent: &'static str,
}

/// Execute the themes command
pub fn themes_command(format: OutputFormat) -> Result<()> {
    let rows: Vec<ThemeRow> = ThemeId::ALL
        .iter()
        .map(|id| {
            let theme = id.theme();
            ThemeRow {
                id: id.as_str(),
                name: theme.display_name(),
                header: theme.header,
                text: theme.text,
                bg: theme.bg,
                accent: theme.accent,
            }
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&rows).context("Failed to serialize themes to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for row in &rows {
                println!(
                    "{:<16} {:<16} header #{}  text #{}  bg #{}  accent #{}",
                    row.id, row.name, row.header, row.text, row.bg, row.accent
                );
            }
        }
    }

    Ok(())
}

/// Execute the inspect command
pub fn inspect_command(input: &Path, format: OutputFormat) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let summary = PackageSummary::from_file(input)
        .with_context(|| format!("Failed to read presentation: {}", input.display()))?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)
                .context("Failed to serialize summary to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => print!("{}", render_summary(&summary)),
    }

    Ok(())
}

fn render_summary(summary: &PackageSummary) -> String {
    let mut out = String::new();
    let color = |c: &Option<String>| {
        c.as_deref()
            .map(|c| format!("#{}", c))
            .unwrap_or_else(|| "-".to_string())
    };

    out.push_str(&format!("Title: {}\n", summary.title));
    out.push_str(&format!(
        "Slides: {}  Media: {}  Header: {}  Background: {}\n",
        summary.slide_count(),
        summary.media.len(),
        color(&summary.header_color),
        color(&summary.background_color)
    ));

    for (i, slide) in summary.slides.iter().enumerate() {
        out.push('\n');
        out.push_str(&format!(
            "[{}] {} ({}, {})\n",
            i + 1,
            if slide.title.is_empty() { "(untitled)" } else { slide.title.as_str() },
            slide.layout,
            slide.transition
        ));
        for bullet in &slide.bullets {
            out.push_str(&format!("    \u{2022} {}\n", bullet));
        }
        for picture in &slide.pictures {
            out.push_str(&format!(
                "    picture {}x{} EMU at ({}, {})\n",
                picture.cx, picture.cy, picture.x, picture.y
            ));
        }
        if slide.background_image {
            out.push_str("    background picture\n");
        }
        if !slide.notes.is_empty() {
            out.push_str(&format!("    notes: {}\n", slide.notes.replace('\n', " / ")));
        }
    }

    out
}
