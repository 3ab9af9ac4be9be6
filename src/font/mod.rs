//! Font resolution and registration.
//!
//! Certificates reference fonts by the family name the user picked in a
//! browser ("Arial", "Great Vibes", a custom upload…). The server has
//! none of those installed, so [`FontLibrary::resolve`] maps every
//! requested family onto a face we can actually rasterize, using a
//! layered fallback chain:
//!
//! 1. custom font file in the fonts directory (exact family match)
//! 2. curated downloadable catalog (fetched once, cached on disk)
//! 3. natively installed system fonts (DejaVu and friends)
//! 4. alias substitution ("Arial" → "Open Sans") back into step 2
//! 5. the universal fallback family
//! 6. the native last resort, with no registration step
//!
//! Resolution never fails: the caller always gets *some* family name
//! back. It is invoked once per distinct family per batch (see
//! [`FontLibrary::pre_resolve`]), not per render, so download and disk
//! I/O stay out of the hot rendering path.

mod catalog;

pub use catalog::{FontCatalog, LAST_RESORT, UNIVERSAL_FALLBACK};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use ab_glyph::FontArc;

use crate::error::LaurelError;
use crate::field::FieldMapping;

/// One entry of the pre-resolution pass: the family actually registered
/// for a requested family, plus its loaded face.
#[derive(Clone)]
pub struct ResolvedFont {
    /// Family name that was registered (may differ from the requested
    /// one, e.g. "Arial" → "Open Sans").
    pub family: String,
    pub face: FontArc,
}

/// Requested family → resolved font, produced once per batch by
/// [`FontLibrary::pre_resolve`] and threaded read-only into rendering.
#[derive(Default, Clone)]
pub struct ResolvedFonts {
    map: HashMap<String, ResolvedFont>,
}

impl ResolvedFonts {
    pub fn get(&self, requested: &str) -> Option<&ResolvedFont> {
        self.map.get(requested)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[derive(Default)]
struct Registry {
    /// Lowercased family name → loaded face.
    faces: HashMap<String, FontArc>,
    /// Requested family → resolved family, so repeat resolutions skip
    /// all I/O. Entries live for the library's lifetime; the catalog is
    /// small and finite, so nothing is ever evicted.
    resolved: HashMap<String, String>,
}

/// Process-wide font registry and resolver.
///
/// Owns the on-disk font cache directory (custom uploads land there
/// too), the HTTP client used for catalog downloads, and the in-memory
/// registry of loaded faces. Construct one per process and share it;
/// tests construct a fresh one with [`FontCatalog::closed`] to stay off
/// the network.
pub struct FontLibrary {
    fonts_dir: PathBuf,
    catalog: FontCatalog,
    http: reqwest::Client,
    registry: RwLock<Registry>,
}

impl FontLibrary {
    /// Library with the production catalog, caching fonts in `fonts_dir`.
    pub fn new(fonts_dir: impl Into<PathBuf>) -> Self {
        Self::with_catalog(fonts_dir, FontCatalog::default())
    }

    /// Library with an explicit catalog (tests use [`FontCatalog::closed`]).
    pub fn with_catalog(fonts_dir: impl Into<PathBuf>, catalog: FontCatalog) -> Self {
        let fonts_dir = fonts_dir.into();
        let http = reqwest::Client::builder()
            .user_agent("laurel/0.1")
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            fonts_dir,
            catalog,
            http,
            registry: RwLock::new(Registry::default()),
        }
    }

    pub fn catalog(&self) -> &FontCatalog {
        &self.catalog
    }

    /// Resolve a requested family to a registered, renderable family.
    ///
    /// Never fails; the result is cached so the fallback chain (and any
    /// network or disk I/O in it) runs at most once per family.
    pub async fn resolve(&self, requested: &str) -> String {
        {
            let registry = self.registry.read().expect("font registry poisoned");
            if let Some(hit) = registry.resolved.get(requested) {
                return hit.clone();
            }
        }

        let resolved = self.resolve_uncached(requested).await;

        let mut registry = self.registry.write().expect("font registry poisoned");
        registry
            .resolved
            .insert(requested.to_string(), resolved.clone());
        resolved
    }

    async fn resolve_uncached(&self, requested: &str) -> String {
        // 1. Custom font file in the fonts directory
        if let Some(path) = self.find_custom_font(requested).await {
            match self.register_from_path(requested, &path).await {
                Ok(()) => return requested.to_string(),
                Err(e) => eprintln!("[font] Failed to load custom font {path:?}: {e}"),
            }
        }

        // 2. Curated catalog: download once, register
        if self.catalog.download_url(requested).is_some()
            && self.ensure_catalog_font(requested).await
        {
            return requested.to_string();
        }

        // 3. Already registered, or available natively on this system
        if self.is_registered(requested) {
            return requested.to_string();
        }
        if let Some(path) = self.catalog.native_path(requested) {
            let path = path.to_string();
            match self.register_from_path(requested, Path::new(&path)).await {
                Ok(()) => return requested.to_string(),
                Err(e) => eprintln!("[font] Failed to load native font {path}: {e}"),
            }
        }

        // 4. Known system alias → downloadable substitute
        if let Some(substitute) = self.catalog.alias_substitute(requested) {
            let substitute = substitute.to_string();
            println!(
                "[font] \"{requested}\" not available on this server, substituting \"{substitute}\""
            );
            if self.ensure_catalog_font(&substitute).await {
                return substitute;
            }
        }

        // 5. Universal fallback
        let fallback = self.catalog.universal_fallback.clone();
        if fallback != requested && self.ensure_catalog_font(&fallback).await {
            println!("[font] Using {fallback} as fallback for \"{requested}\"");
            return fallback;
        }

        // 6. Last resort: a native family assumed present everywhere.
        // Returned even if registration fails; rendering then skips the
        // field rather than erroring.
        let last = self.catalog.last_resort.clone();
        eprintln!("[font] All font fallbacks failed for \"{requested}\", using {last}");
        if !self.is_registered(&last)
            && let Some(path) = self.catalog.native_path(&last)
        {
            let path = path.to_string();
            if let Err(e) = self.register_from_path(&last, Path::new(&path)).await {
                eprintln!("[font] Failed to load {last}: {e}");
            }
        }
        last
    }

    /// Resolve every distinct family in `fields`, once each.
    ///
    /// The returned mapping is the only font state rendering ever sees;
    /// it holds cloned face handles, so renders never touch the
    /// library's locks.
    pub async fn pre_resolve(&self, fields: &[FieldMapping]) -> ResolvedFonts {
        let mut families: Vec<&str> = Vec::new();
        for field in fields {
            if !families.contains(&field.font_family.as_str()) {
                families.push(&field.font_family);
            }
        }

        let mut map = HashMap::new();
        for family in families {
            let resolved = self.resolve(family).await;
            if let Some(face) = self.face(&resolved) {
                map.insert(
                    family.to_string(),
                    ResolvedFont {
                        family: resolved,
                        face,
                    },
                );
            }
        }
        ResolvedFonts { map }
    }

    /// Loaded face for a family, if registered.
    pub fn face(&self, family: &str) -> Option<FontArc> {
        let registry = self.registry.read().expect("font registry poisoned");
        registry.faces.get(&family.to_lowercase()).cloned()
    }

    fn is_registered(&self, family: &str) -> bool {
        let registry = self.registry.read().expect("font registry poisoned");
        registry.faces.contains_key(&family.to_lowercase())
    }

    fn register(&self, family: &str, bytes: Vec<u8>) -> Result<(), LaurelError> {
        let face = FontArc::try_from_vec(bytes)
            .map_err(|e| LaurelError::Font(format!("invalid font data for {family}: {e}")))?;
        let mut registry = self.registry.write().expect("font registry poisoned");
        registry.faces.insert(family.to_lowercase(), face);
        Ok(())
    }

    async fn register_from_path(&self, family: &str, path: &Path) -> Result<(), LaurelError> {
        let bytes = tokio::fs::read(path).await?;
        self.register(family, bytes)
    }

    /// Scan the fonts directory for a file whose stem matches the
    /// requested family (case-insensitive). Missing directory is not an
    /// error, just no custom fonts.
    async fn find_custom_font(&self, family: &str) -> Option<PathBuf> {
        let mut entries = tokio::fs::read_dir(&self.fonts_dir).await.ok()?;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let is_font = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
            if !is_font {
                continue;
            }
            let matches = path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s.eq_ignore_ascii_case(family));
            if matches {
                return Some(path);
            }
        }
        None
    }

    /// Make a catalog family renderable: download its TTF to the cache
    /// directory if not already there, then register it. Returns false
    /// (after logging) on any failure so resolution can fall through.
    async fn ensure_catalog_font(&self, family: &str) -> bool {
        if self.is_registered(family) {
            return true;
        }
        let Some(url) = self.catalog.download_url(family) else {
            return false;
        };
        let url = url.to_string();

        let cache_path = self.fonts_dir.join(format!("google_{}.ttf", safe_stem(family)));
        let bytes = if cache_path.is_file() {
            match tokio::fs::read(&cache_path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    eprintln!("[font] Failed to read cached font {cache_path:?}: {e}");
                    return false;
                }
            }
        } else {
            println!("[font] Downloading font: {family}");
            let bytes = match self.download(&url).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    eprintln!("[font] Failed to download {family}: {e}");
                    return false;
                }
            };
            if let Err(e) = tokio::fs::create_dir_all(&self.fonts_dir).await {
                eprintln!("[font] Failed to create fonts dir: {e}");
                return false;
            }
            if let Err(e) = tokio::fs::write(&cache_path, &bytes).await {
                eprintln!("[font] Failed to cache font {cache_path:?}: {e}");
                return false;
            }
            bytes
        };

        match self.register(family, bytes) {
            Ok(()) => true,
            Err(e) => {
                eprintln!("[font] {e}");
                false
            }
        }
    }

    /// Fetch a font file, following redirects and accumulating the full
    /// body before returning.
    async fn download(&self, url: &str) -> Result<Vec<u8>, LaurelError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LaurelError::Font(format!("failed to download {url}: {e}")))?;
        if !response.status().is_success() {
            return Err(LaurelError::Font(format!(
                "failed to download {url}: HTTP {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| LaurelError::Font(format!("failed to read font data: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// Filesystem-safe cache file stem for a family name.
fn safe_stem(family: &str) -> String {
    family
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
