//! slidegen CLI - Command-line interface library
//!
//! This library provides the CLI functionality for slidegen:
//! - Export: Write a deck snapshot (JSON) to a PPTX file
//! - Themes: List the available colour themes
//! - Inspect: Summarize the slides of a PPTX file
//!
//! # Library Usage
//!
//! ```ignore
//! use slidegen_cli::{export_command, OutputFormat};
//!
//! // Run the full CLI
//! run_cli();
//!
//! // Or use individual commands programmatically
//! export_command(&input, Some("WARM_ORANGE"), None, &output_dir, None)?;
//! inspect_command(&pptx, OutputFormat::Json)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Export a deck to ./out/Q3_Review.pptx
//! slidegen export deck.json --title "Q3 Review" --output out
//!
//! # List themes
//! slidegen themes
//!
//! # Inspect the result
//! slidegen inspect out/Q3_Review.pptx --format json
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{export_command, inspect_command, themes_command};
pub use app::{run_cli, DeckFile, OutputFormat};
