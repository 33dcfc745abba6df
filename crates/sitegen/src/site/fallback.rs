//! Pre-authored bundles used when generation is exhausted.
//!
//! A template directory holds one subdirectory per category:
//!
//! ```text
//! templates/
//! ├── basic/          index.html  style.css  script.js
//! └── landing-page/   index.html  style.css  script.js
//! ```
//!
//! The catalog is loaded once and then only read. The `basic` entry always
//! exists: if the directory does not provide one, the built-in bundle is
//! used, so [`FallbackCatalog::get`] cannot fail.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::Datelike;
use tracing::{debug, info, warn};

use super::ArtifactBundle;
use crate::error::CatalogError;

/// Key of the terminal entry returned for unknown categories.
pub const DEFAULT_CATEGORY: &str = "basic";

pub const HTML_FILE: &str = "index.html";
pub const CSS_FILE: &str = "style.css";
pub const JS_FILE: &str = "script.js";

/// Read-only set of fallback bundles keyed by category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackCatalog {
    default: ArtifactBundle,
    entries: BTreeMap<String, ArtifactBundle>,
}

impl Default for FallbackCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FallbackCatalog {
    /// A catalog holding only the built-in `basic` bundle.
    pub fn builtin() -> Self {
        Self {
            default: builtin_bundle(),
            entries: BTreeMap::new(),
        }
    }

    /// Load every category under `dir`.
    ///
    /// Never fails. A missing or unreadable directory, or an entry with a
    /// missing, unreadable or empty file, is logged and skipped.
    pub fn load(dir: &Path) -> Self {
        let mut entries = BTreeMap::new();

        match fs::read_dir(dir) {
            Err(e) => warn!("Could not load fallback templates from {}: {e}", dir.display()),
            Ok(read_dir) => {
                let mut dirs: Vec<_> = read_dir
                    .filter_map(|entry| match entry {
                        Ok(entry) => Some(entry.path()),
                        Err(e) => {
                            warn!("Could not read entry in {}: {e}", dir.display());
                            None
                        }
                    })
                    .filter(|path| path.is_dir())
                    .collect();
                dirs.sort();

                for path in dirs {
                    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                        warn!("Skipping template with non-UTF-8 name: {}", path.display());
                        continue;
                    };
                    match load_entry(&path) {
                        Ok(bundle) => {
                            debug!("Loaded fallback template '{name}'");
                            entries.insert(name.to_string(), bundle);
                        }
                        Err(e) => warn!("Could not load template from {name}: {e}"),
                    }
                }
            }
        }

        let default = entries.remove(DEFAULT_CATEGORY).unwrap_or_else(|| {
            debug!("No '{DEFAULT_CATEGORY}' template on disk; using built-in bundle");
            builtin_bundle()
        });
        info!(
            "Fallback catalog ready: {} categor{} from {}",
            entries.len() + 1,
            if entries.is_empty() { "y" } else { "ies" },
            dir.display()
        );
        Self { default, entries }
    }

    /// Build a catalog from in-memory entries.
    ///
    /// Fails when there is no `basic` entry or an entry has an empty part.
    pub fn from_entries<I, K>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (K, ArtifactBundle)>,
        K: Into<String>,
    {
        let mut entries: BTreeMap<String, ArtifactBundle> =
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        if let Some((name, _)) = entries.iter().find(|(_, b)| !b.is_complete()) {
            return Err(CatalogError::IncompleteEntry(name.clone()));
        }
        let default = entries
            .remove(DEFAULT_CATEGORY)
            .ok_or(CatalogError::MissingDefault(DEFAULT_CATEGORY))?;
        Ok(Self { default, entries })
    }

    /// The entry for `category`, or the `basic` entry.
    pub fn get(&self, category: Option<&str>) -> &ArtifactBundle {
        category
            .and_then(|c| self.entries.get(c))
            .unwrap_or(&self.default)
    }

    /// The key [`get`](Self::get) resolves `category` to.
    pub fn resolve<'a>(&'a self, category: Option<&'a str>) -> &'a str {
        match category {
            Some(c) if self.entries.contains_key(c) => c,
            _ => DEFAULT_CATEGORY,
        }
    }

    pub fn contains(&self, category: &str) -> bool {
        category == DEFAULT_CATEGORY || self.entries.contains_key(category)
    }

    /// All keys, `basic` first.
    pub fn categories(&self) -> Vec<&str> {
        std::iter::once(DEFAULT_CATEGORY)
            .chain(self.entries.keys().map(String::as_str))
            .collect()
    }

    /// Number of categories, including `basic`.
    pub fn len(&self) -> usize {
        self.entries.len() + 1
    }

    /// Always false; `basic` is always present.
    pub fn is_empty(&self) -> bool {
        false
    }
}

fn load_entry(dir: &Path) -> Result<ArtifactBundle, String> {
    let read = |file: &str| -> Result<String, String> {
        let text = fs::read_to_string(dir.join(file)).map_err(|e| format!("{file}: {e}"))?;
        if text.trim().is_empty() {
            return Err(format!("{file} is empty"));
        }
        Ok(text)
    };
    Ok(ArtifactBundle {
        html: read(HTML_FILE)?,
        css: read(CSS_FILE)?,
        js: read(JS_FILE)?,
    })
}

fn builtin_bundle() -> ArtifactBundle {
    let year = chrono::Utc::now().year();
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Generated Site</title>
  <link rel="stylesheet" href="style.css">
</head>
<body>
  <header>
    <h1>Welcome to Our Site</h1>
  </header>
  <main>
    <section>
      <h2>Main Content</h2>
      <p>This is a generated website.</p>
    </section>
  </main>
  <footer>
    <p>&copy; {year} Generated Site</p>
  </footer>
  <script src="script.js"></script>
</body>
</html>"#
    );
    let css = r#"* {
  margin: 0;
  padding: 0;
  box-sizing: border-box;
}

body {
  font-family: Arial, sans-serif;
  line-height: 1.6;
  color: #333;
  max-width: 1200px;
  margin: 0 auto;
  padding: 20px;
}

header {
  background: #f4f4f4;
  padding: 20px;
  text-align: center;
  margin-bottom: 20px;
}

main {
  padding: 20px;
}

footer {
  background: #f4f4f4;
  padding: 20px;
  text-align: center;
  margin-top: 20px;
}"#;
    let js = r#"document.addEventListener('DOMContentLoaded', function() {
  console.log('Website loaded successfully!');
});"#;
    ArtifactBundle::new(html, css, js)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_template(root: &Path, name: &str, html: &str, css: &str, js: &str) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(HTML_FILE), html).unwrap();
        fs::write(dir.join(CSS_FILE), css).unwrap();
        fs::write(dir.join(JS_FILE), js).unwrap();
        dir
    }

    #[test]
    fn builtin_is_complete_and_current() {
        let catalog = FallbackCatalog::builtin();
        let basic = catalog.get(None);
        assert!(basic.is_complete());
        let year = chrono::Utc::now().year().to_string();
        assert!(basic.html.contains(&year));
        assert_eq!(catalog.categories(), vec!["basic"]);
    }

    #[test]
    fn unknown_category_gets_basic() {
        let catalog = FallbackCatalog::builtin();
        let bundle = catalog.get(Some("nonexistent-category"));
        assert_eq!(bundle, catalog.get(None));
        assert!(bundle.is_complete());
        assert_eq!(catalog.resolve(Some("nonexistent-category")), "basic");
    }

    #[test]
    fn missing_directory_falls_back_to_builtin() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = FallbackCatalog::load(&tmp.path().join("does-not-exist"));
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get(Some("blog")).is_complete());
    }

    #[test]
    fn loads_each_subdirectory_as_a_category() {
        let tmp = tempfile::tempdir().unwrap();
        write_template(tmp.path(), "blog", "<p>blog</p>", "p{}", "blog()");
        write_template(tmp.path(), "portfolio", "<p>me</p>", "p{}", "me()");
        fs::write(tmp.path().join("README.md"), "not a template").unwrap();

        let catalog = FallbackCatalog::load(tmp.path());
        assert_eq!(catalog.categories(), vec!["basic", "blog", "portfolio"]);
        assert_eq!(catalog.get(Some("blog")).html, "<p>blog</p>");
        assert_eq!(catalog.resolve(Some("portfolio")), "portfolio");
    }

    #[test]
    fn bad_entry_does_not_abort_loading() {
        let tmp = tempfile::tempdir().unwrap();
        write_template(tmp.path(), "blog", "<p>blog</p>", "p{}", "blog()");
        let broken = write_template(tmp.path(), "broken", "<p>x</p>", "p{}", "x()");
        fs::remove_file(broken.join(CSS_FILE)).unwrap();
        write_template(tmp.path(), "hollow", "<p>x</p>", "   ", "x()");

        let catalog = FallbackCatalog::load(tmp.path());
        assert!(catalog.contains("blog"));
        assert!(!catalog.contains("broken"));
        assert!(!catalog.contains("hollow"));
        assert_eq!(catalog.get(Some("broken")), catalog.get(None));
    }

    #[test]
    fn on_disk_basic_replaces_builtin() {
        let tmp = tempfile::tempdir().unwrap();
        write_template(tmp.path(), "basic", "<p>custom</p>", "p{}", "custom()");
        let catalog = FallbackCatalog::load(tmp.path());
        assert_eq!(catalog.get(Some("anything")).html, "<p>custom</p>");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn from_entries_requires_basic() {
        let bundle = ArtifactBundle::new("<p>a</p>", "p{}", "a()");
        let err = FallbackCatalog::from_entries([("blog", bundle.clone())]).unwrap_err();
        assert_eq!(err, CatalogError::MissingDefault("basic"));

        let catalog =
            FallbackCatalog::from_entries([("basic", bundle.clone()), ("blog", bundle)]).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn from_entries_rejects_incomplete_bundles() {
        let err = FallbackCatalog::from_entries([
            ("basic", ArtifactBundle::new("<p>a</p>", "p{}", "a()")),
            ("blog", ArtifactBundle::new("<p>a</p>", "", "a()")),
        ])
        .unwrap_err();
        assert_eq!(err, CatalogError::IncompleteEntry("blog".into()));
    }
}
