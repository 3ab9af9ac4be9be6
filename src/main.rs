//! # Laurel CLI
//!
//! Command-line interface for batch certificate generation.
//!
//! ## Usage
//!
//! ```bash
//! # Render every row and package the PNGs into a ZIP
//! laurel generate --template cert.png --fields fields.json --data rows.json
//!
//! # Name output files after a specific column
//! laurel generate --template cert.png --fields fields.json --data rows.json \
//!     --filename-column "Full Name"
//!
//! # Render just the first row for inspection
//! laurel preview --template cert.png --fields fields.json --data rows.json \
//!     --output preview.png
//!
//! # List available font families
//! laurel fonts
//! ```
//!
//! `fields.json` is an array of field mappings in the editor's wire
//! format; `rows.json` is an array of column → value objects.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use laurel::{
    LaurelError, archive,
    batch::BatchRunner,
    field::{FieldMapping, Row},
    font::FontLibrary,
};

/// Laurel - batch certificate generator
#[derive(Parser, Debug)]
#[command(name = "laurel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render every data row and package the results into a ZIP
    Generate {
        /// Template image (PNG or JPEG)
        #[arg(long)]
        template: PathBuf,

        /// Field mappings JSON file
        #[arg(long)]
        fields: PathBuf,

        /// Data rows JSON file
        #[arg(long)]
        data: PathBuf,

        /// Column whose value names each output file
        #[arg(long, default_value = "Name")]
        filename_column: String,

        /// Output directory for the batch and the archive
        #[arg(long, default_value = "generated")]
        out: PathBuf,

        /// Directory for custom fonts and the download cache
        #[arg(long, default_value = "fonts")]
        fonts_dir: PathBuf,

        /// Rows rendered concurrently per chunk
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Keep the loose per-row PNGs after archiving
        #[arg(long)]
        keep: bool,
    },

    /// List the font families available for field mappings
    Fonts {
        /// Directory for custom fonts and the download cache
        #[arg(long, default_value = "fonts")]
        fonts_dir: PathBuf,
    },

    /// Render only the first data row to a single PNG
    Preview {
        /// Template image (PNG or JPEG)
        #[arg(long)]
        template: PathBuf,

        /// Field mappings JSON file
        #[arg(long)]
        fields: PathBuf,

        /// Data rows JSON file
        #[arg(long)]
        data: PathBuf,

        /// Where to write the preview PNG
        #[arg(long, default_value = "preview.png")]
        output: PathBuf,

        /// Directory for custom fonts and the download cache
        #[arg(long, default_value = "fonts")]
        fonts_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), LaurelError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            template,
            fields,
            data,
            filename_column,
            out,
            fonts_dir,
            chunk_size,
            keep,
        } => {
            let fields = load_fields(&fields)?;
            let rows = load_rows(&data)?;

            let library = Arc::new(FontLibrary::new(fonts_dir));
            let mut runner = BatchRunner::new(library, &out);
            if let Some(chunk_size) = chunk_size {
                runner = runner.with_chunk_size(chunk_size);
            }

            let paths = runner
                .run(&template, &fields, &rows, &filename_column)
                .await?;
            let archive_path = archive::package_to_archive(&paths, &out).await?;
            if !keep {
                archive::cleanup_batch(&paths).await;
            }

            println!("Generated {} certificate(s)", paths.len());
            println!("Archive: {}", archive_path.display());
        }

        Commands::Fonts { fonts_dir } => {
            let library = FontLibrary::new(&fonts_dir);

            println!("Downloadable families:");
            for family in library.catalog().downloadable_families() {
                println!("  {family}");
            }

            println!("Custom fonts in {}:", fonts_dir.display());
            for family in list_custom_fonts(&fonts_dir) {
                println!("  {family}");
            }
        }

        Commands::Preview {
            template,
            fields,
            data,
            output,
            fonts_dir,
        } => {
            let fields = load_fields(&fields)?;
            let rows = load_rows(&data)?;
            let first_row = rows
                .first()
                .ok_or_else(|| LaurelError::Data("no data rows provided".to_string()))?;

            let library = Arc::new(FontLibrary::new(fonts_dir));
            let runner = BatchRunner::new(library, ".");
            let png = runner.preview(&template, &fields, first_row).await?;

            tokio::fs::write(&output, png).await?;
            println!("Preview: {}", output.display());
        }
    }

    Ok(())
}

/// Family names of the .ttf/.otf files in the fonts directory, skipping
/// the download cache's `google_*` entries. Missing directory means no
/// custom fonts.
fn list_custom_fonts(fonts_dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(fonts_dir) else {
        return Vec::new();
    };
    let mut families: Vec<String> = entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let ext = path.extension()?.to_str()?;
            if !ext.eq_ignore_ascii_case("ttf") && !ext.eq_ignore_ascii_case("otf") {
                return None;
            }
            let stem = path.file_stem()?.to_str()?;
            if stem.starts_with("google_") {
                return None;
            }
            Some(stem.to_string())
        })
        .collect();
    families.sort();
    families
}

fn load_fields(path: &Path) -> Result<Vec<FieldMapping>, LaurelError> {
    let raw = std::fs::read_to_string(path)?;
    let fields: Vec<FieldMapping> = serde_json::from_str(&raw).map_err(|e| {
        LaurelError::InvalidField(format!("failed to parse {}: {e}", path.display()))
    })?;
    if fields.is_empty() {
        return Err(LaurelError::InvalidField(
            "at least one field mapping is required".to_string(),
        ));
    }
    Ok(fields)
}

fn load_rows(path: &Path) -> Result<Vec<Row>, LaurelError> {
    let raw = std::fs::read_to_string(path)?;
    let rows: Vec<Row> = serde_json::from_str(&raw)
        .map_err(|e| LaurelError::Data(format!("failed to parse {}: {e}", path.display())))?;
    if rows.is_empty() {
        return Err(LaurelError::Data("no data rows provided".to_string()));
    }
    Ok(rows)
}
