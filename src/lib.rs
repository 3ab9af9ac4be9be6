//! # Laurel - Batch Certificate Generator
//!
//! Laurel renders a template image plus spreadsheet rows into one PNG
//! certificate per row, then packages the batch into a ZIP archive. It
//! provides:
//!
//! - **Font resolution**: custom fonts, a curated downloadable catalog,
//!   native system fonts, and alias substitution — never fails
//! - **Text layout**: single-line placement with auto-shrink-to-fit
//! - **Compositing**: template background plus mapped text fields
//! - **Batch orchestration**: bounded-concurrency chunked rendering
//! - **Archiving**: streaming ZIP assembly with flat memory use
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use laurel::{
//!     archive,
//!     batch::BatchRunner,
//!     field::{Align, FieldMapping, Row},
//!     font::FontLibrary,
//! };
//!
//! # async fn example() -> Result<(), laurel::error::LaurelError> {
//! let library = Arc::new(FontLibrary::new("fonts"));
//! let runner = BatchRunner::new(library, "generated");
//!
//! let fields = vec![FieldMapping {
//!     id: "name".into(),
//!     column: "Name".into(),
//!     x: 300.0,
//!     y: 420.0,
//!     font_family: "Great Vibes".into(),
//!     font_size: 48.0,
//!     color: "#1a1a2e".into(),
//!     align: Align::Center,
//!     max_width: 600.0,
//! }];
//!
//! let mut row = Row::new();
//! row.insert("Name".into(), "Alice Example".into());
//!
//! let paths = runner
//!     .run("template.png".as_ref(), &fields, &[row], "Name")
//!     .await?;
//! let zip = archive::package_to_archive(&paths, "generated".as_ref()).await?;
//! archive::cleanup_batch(&paths).await;
//! println!("archive at {}", zip.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`field`] | Field mappings and row data |
//! | [`font`] | Font resolution and registration |
//! | [`render`] | Text drawing and certificate compositing |
//! | [`batch`] | Chunked batch orchestration and preview |
//! | [`archive`] | Streaming ZIP packaging |
//! | [`error`] | Error types |
//!
//! Spreadsheet parsing, upload validation, and HTTP serving are the
//! caller's concern; laurel is invoked as an in-process library.

pub mod archive;
pub mod batch;
pub mod error;
pub mod field;
pub mod font;
pub mod render;

// Re-exports for convenience
pub use batch::BatchRunner;
pub use error::LaurelError;
pub use field::{Align, FieldMapping, Row};
pub use font::FontLibrary;
