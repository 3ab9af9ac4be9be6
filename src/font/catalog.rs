//! Font catalog: curated downloadable families, system-font aliases,
//! and native font file locations.
//!
//! The catalog is plain data. [`FontLibrary`](super::FontLibrary) owns
//! one and consults it during resolution; tests inject a closed catalog
//! so resolution never touches the network.

/// Curated web fonts with direct TTF download URLs (fonts.gstatic.com).
const DOWNLOADABLE_FONTS: &[(&str, &str)] = &[
    ("Roboto", "https://fonts.gstatic.com/s/roboto/v47/KFOMCnqEu92Fr1ME7kSn66aGLdTylUAMQXC89YmC2DPNWubEbGmT.ttf"),
    ("Open Sans", "https://fonts.gstatic.com/s/opensans/v40/memSYaGs126MiZpBA-UvWbX2vVnXBbObj2OVZyOOSr4dVJWUgsjZ0B4gaVc.ttf"),
    ("Lato", "https://fonts.gstatic.com/s/lato/v24/S6uyw4BMUTPHvxk.ttf"),
    ("Montserrat", "https://fonts.gstatic.com/s/montserrat/v29/JTUHjIg1_i6t8kCHKm4532VJOt5-QNFgpCtr6Hw5aXo.ttf"),
    ("Poppins", "https://fonts.gstatic.com/s/poppins/v21/pxiEyp8kv8JHgFVrFJA.ttf"),
    ("Playfair Display", "https://fonts.gstatic.com/s/playfairdisplay/v37/nuFvD-vYSZviVYUb_rj3ij__anPXJzDwcbmjWBN2PKdFvXDXbtM.ttf"),
    ("Dancing Script", "https://fonts.gstatic.com/s/dancingscript/v25/If2cXTr6YS-zF4S-kcSWSVi_sxjsohD9F50Ruu7BMSo3Sup6hNX6plRP.ttf"),
    ("Great Vibes", "https://fonts.gstatic.com/s/greatvibes/v19/RWmMoKWR9v4ksMfaWd_JN-XCg6UKDXlq.ttf"),
    ("Pacifico", "https://fonts.gstatic.com/s/pacifico/v22/FwZY7-Qmy14u9lezJ-6H6MmBp0u-.ttf"),
    ("Oswald", "https://fonts.gstatic.com/s/oswald/v53/TK3_WkUHHAIjg75cFRf3bXL8LICs1_FvsUZiYA.ttf"),
    ("Raleway", "https://fonts.gstatic.com/s/raleway/v34/1Ptxg8zYS_SKggPN4iEgvnHyvveLxVvaorCIPrE.ttf"),
    ("Merriweather", "https://fonts.gstatic.com/s/merriweather/v30/u-440qyriQus4w_Ih0T3LyhZwEiGA_6A.ttf"),
    ("Nunito", "https://fonts.gstatic.com/s/nunito/v26/XRXI3I6Li01BKofiOc5wtlZ2di8HDLshdTQ3j77e.ttf"),
    ("Ubuntu", "https://fonts.gstatic.com/s/ubuntu/v20/4iCs6KVjbNBYlgo6eA.ttf"),
];

/// Common client-side font names that servers rarely have, mapped to a
/// downloadable equivalent so text always renders with something close.
const SYSTEM_FONT_ALIASES: &[(&str, &str)] = &[
    ("Arial", "Open Sans"),
    ("Arial Black", "Oswald"),
    ("Helvetica", "Open Sans"),
    ("sans-serif", "Open Sans"),
    ("Times New Roman", "Merriweather"),
    ("Times", "Merriweather"),
    ("Georgia", "Merriweather"),
    ("serif", "Merriweather"),
    ("Courier New", "Ubuntu"),
    ("Courier", "Ubuntu"),
    ("monospace", "Ubuntu"),
    ("Verdana", "Open Sans"),
    ("Tahoma", "Open Sans"),
    ("Impact", "Oswald"),
    ("Trebuchet MS", "Raleway"),
    ("Palatino", "Merriweather"),
];

/// Font families shipped with mainstream Linux server images, with the
/// file locations they are found at across distros.
const NATIVE_FONTS: &[(&str, &[&str])] = &[
    (
        "DejaVu Sans",
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
        ],
    ),
    (
        "DejaVu Serif",
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
            "/usr/share/fonts/dejavu/DejaVuSerif.ttf",
            "/usr/share/fonts/TTF/DejaVuSerif.ttf",
        ],
    ),
    (
        "DejaVu Sans Mono",
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
            "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
            "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
        ],
    ),
    (
        "FreeSans",
        &[
            "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
            "/usr/share/fonts/gnu-free/FreeSans.ttf",
        ],
    ),
    (
        "FreeSerif",
        &[
            "/usr/share/fonts/truetype/freefont/FreeSerif.ttf",
            "/usr/share/fonts/gnu-free/FreeSerif.ttf",
        ],
    ),
    (
        "Liberation Sans",
        &[
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
        ],
    ),
];

/// The neutral sans-serif tried when every family-specific step failed.
pub const UNIVERSAL_FALLBACK: &str = "Open Sans";

/// Native family returned when even the universal fallback cannot be
/// fetched. Present on every Linux image we deploy to.
pub const LAST_RESORT: &str = "DejaVu Sans";

/// Lookup tables consulted during font resolution.
///
/// [`FontCatalog::default`] is the production catalog;
/// [`FontCatalog::closed`] has no downloadable families (and therefore
/// no network use), which is what tests want.
#[derive(Debug, Clone)]
pub struct FontCatalog {
    downloads: Vec<(String, String)>,
    aliases: Vec<(String, String)>,
    native: Vec<(String, Vec<String>)>,
    pub universal_fallback: String,
    pub last_resort: String,
}

impl Default for FontCatalog {
    fn default() -> Self {
        Self {
            downloads: DOWNLOADABLE_FONTS
                .iter()
                .map(|(f, u)| (f.to_string(), u.to_string()))
                .collect(),
            aliases: SYSTEM_FONT_ALIASES
                .iter()
                .map(|(f, s)| (f.to_string(), s.to_string()))
                .collect(),
            native: native_table(),
            universal_fallback: UNIVERSAL_FALLBACK.to_string(),
            last_resort: LAST_RESORT.to_string(),
        }
    }
}

fn native_table() -> Vec<(String, Vec<String>)> {
    NATIVE_FONTS
        .iter()
        .map(|(f, paths)| {
            (
                f.to_string(),
                paths.iter().map(|p| p.to_string()).collect(),
            )
        })
        .collect()
}

impl FontCatalog {
    /// A catalog with no downloadable families and no aliases.
    /// Resolution can still use custom and native fonts.
    pub fn closed() -> Self {
        Self {
            downloads: Vec::new(),
            aliases: Vec::new(),
            native: native_table(),
            universal_fallback: UNIVERSAL_FALLBACK.to_string(),
            last_resort: LAST_RESORT.to_string(),
        }
    }

    /// Add a downloadable family. Used to build small closed catalogs
    /// backed by pre-seeded cache files instead of the live table.
    pub fn with_download(mut self, family: &str, url: &str) -> Self {
        self.downloads.push((family.to_string(), url.to_string()));
        self
    }

    /// Add an alias substitution on top of the current tables.
    pub fn with_alias(mut self, family: &str, substitute: &str) -> Self {
        self.aliases.push((family.to_string(), substitute.to_string()));
        self
    }

    /// Download URL for a curated family, if it is one.
    pub fn download_url(&self, family: &str) -> Option<&str> {
        self.downloads
            .iter()
            .find(|(f, _)| f == family)
            .map(|(_, url)| url.as_str())
    }

    /// Substitute family for a known system/generic alias.
    pub fn alias_substitute(&self, family: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|(f, _)| f.eq_ignore_ascii_case(family))
            .map(|(_, sub)| sub.as_str())
    }

    /// First existing font file for a native family, if any.
    pub fn native_path(&self, family: &str) -> Option<&str> {
        self.native
            .iter()
            .find(|(f, _)| f.eq_ignore_ascii_case(family))
            .and_then(|(_, paths)| {
                paths
                    .iter()
                    .find(|p| std::path::Path::new(p.as_str()).is_file())
            })
            .map(|p| p.as_str())
    }

    /// All curated family names, for listing in UIs.
    pub fn downloadable_families(&self) -> impl Iterator<Item = &str> {
        self.downloads.iter().map(|(f, _)| f.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_table() {
        let catalog = FontCatalog::default();
        assert_eq!(catalog.alias_substitute("Arial"), Some("Open Sans"));
        assert_eq!(catalog.alias_substitute("arial"), Some("Open Sans"));
        assert_eq!(
            catalog.alias_substitute("Times New Roman"),
            Some("Merriweather")
        );
        assert_eq!(catalog.alias_substitute("Open Sans"), None);
    }

    #[test]
    fn test_download_urls_present_for_substitutes() {
        // Every alias target must itself be downloadable, or step 4 of
        // resolution would dead-end.
        let catalog = FontCatalog::default();
        for (_, sub) in SYSTEM_FONT_ALIASES {
            assert!(
                catalog.download_url(sub).is_some(),
                "alias target {sub} missing from download table"
            );
        }
        assert!(catalog.download_url(&catalog.universal_fallback).is_some());
    }

    #[test]
    fn test_closed_catalog_has_no_downloads() {
        let catalog = FontCatalog::closed();
        assert_eq!(catalog.downloadable_families().count(), 0);
        assert_eq!(catalog.alias_substitute("Arial"), None);
    }
}
