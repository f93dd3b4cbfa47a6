//! File-backed fortune library: a directory of corpus files, each parsed
//! into its own store, with filename filtering and pooled random draws

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use rand::Rng;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::corpus::Fortune;
use crate::error::{LibraryError, StoreError};
use crate::store::{FortuneStore, Metric, MetricQuery};

/// Selects which library files participate in a query, by file name
/// (relative to the library directory).
#[derive(Debug, Clone)]
pub enum FileFilter {
    /// Every file
    Any,
    /// Files whose name starts with one of the given prefixes
    Prefixes(Vec<String>),
    /// Files whose name matches the pattern
    Pattern(Regex),
}

impl FileFilter {
    /// Build a filter from optional prefix and pattern settings.
    ///
    /// Prefixes are `;`-separated. When both settings are present the
    /// prefixes win and the conflict is logged, matching the host plugin
    /// behavior this replaces.
    pub fn from_settings(prefixes: Option<&str>, pattern: Option<&str>) -> Result<Self, LibraryError> {
        if prefixes.is_some() && pattern.is_some() {
            warn!("both prefixes and a pattern are set; arbitrarily selecting prefixes");
        }
        if let Some(prefixes) = prefixes {
            let prefixes: Vec<String> = prefixes
                .split(';')
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            return Ok(Self::Prefixes(prefixes));
        }
        if let Some(pattern) = pattern {
            return Ok(Self::Pattern(Regex::new(pattern)?));
        }
        Ok(Self::Any)
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Prefixes(prefixes) => prefixes.iter().any(|p| name.starts_with(p.as_str())),
            Self::Pattern(re) => re.is_match(name),
        }
    }
}

/// Per-file state: the parsed store plus the time it was parsed, used to
/// skip unchanged files on refresh. The file name key is kept for
/// diagnostics and filtering only; the store owns the fortune text.
struct FileRecord {
    parsed_at: SystemTime,
    store: FortuneStore,
}

/// A directory of fortune files, each held as an indexed store.
///
/// Files are keyed by their path relative to the library directory, in
/// lexical order, which fixes the pooled ordinal numbering across files.
pub struct FortuneLibrary {
    dir: PathBuf,
    files: BTreeMap<String, FileRecord>,
}

impl FortuneLibrary {
    /// Scan `dir` recursively and parse every readable fortune file.
    /// Unreadable or empty files are skipped with a warning rather than
    /// failing the whole library.
    pub fn load(dir: impl Into<PathBuf>) -> Result<Self, LibraryError> {
        let dir = dir.into();
        let mut library = Self {
            dir,
            files: BTreeMap::new(),
        };
        library.refresh()?;
        info!(
            files = library.file_count(),
            fortunes = library.fortune_count(),
            total_chars = library.total_len(),
            "loaded fortune library"
        );
        Ok(library)
    }

    /// Re-scan the directory: parse new files, re-parse files modified since
    /// their last parse, and drop records for files that no longer exist.
    pub fn refresh(&mut self) -> Result<(), LibraryError> {
        // Probe the root eagerly; the walker below swallows per-entry errors
        let _ = fs::read_dir(&self.dir).map_err(|source| LibraryError::DirUnreadable {
            path: self.dir.clone(),
            source,
        })?;

        let mut seen = Vec::new();
        for entry in walkdir::WalkDir::new(&self.dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
        {
            let path = entry.path();
            if is_hidden(path) {
                continue;
            }
            let name = relative_name(&self.dir, path);
            seen.push(name.clone());
            self.refresh_file(name, path);
        }

        self.files.retain(|name, _| seen.contains(name));
        Ok(())
    }

    fn refresh_file(&mut self, name: String, path: &Path) {
        let modified = fs::metadata(path).and_then(|m| m.modified()).ok();
        if let (Some(record), Some(modified)) = (self.files.get(&name), modified) {
            if record.parsed_at >= modified {
                debug!(file = %name, "skipping refresh of unchanged file");
                return;
            }
        }

        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(file = %name, error = %err, "skipping unreadable fortune file");
                return;
            }
        };
        let store = match FortuneStore::from_blob(&raw) {
            Ok(store) => store,
            Err(err) => {
                warn!(file = %name, error = %err, "skipping unparseable fortune file");
                return;
            }
        };

        debug!(file = %name, fortunes = store.len(), "parsed fortune file");
        self.files.insert(
            name,
            FileRecord {
                parsed_at: SystemTime::now(),
                store,
            },
        );
    }

    /// Number of files currently held.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Total fortunes across all files.
    pub fn fortune_count(&self) -> usize {
        self.files.values().map(|r| r.store.len()).sum()
    }

    /// Summed character count of every fortune, a load-time diagnostic.
    pub fn total_len(&self) -> usize {
        self.files
            .values()
            .flat_map(|r| r.store.iter())
            .map(Fortune::length)
            .sum()
    }

    /// File names in lexical order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// The store for a single file, if present.
    pub fn store(&self, name: &str) -> Option<&FortuneStore> {
        self.files.get(name).map(|r| &r.store)
    }

    /// The fortune at pooled ordinal `index`, counting through files in
    /// lexical name order.
    pub fn get(&self, index: usize) -> Result<&Fortune, StoreError> {
        let mut start = 0;
        for record in self.files.values() {
            let len = record.store.len();
            if index < start + len {
                return record.store.get(index - start);
            }
            start += len;
        }
        Err(StoreError::IndexOutOfRange {
            index,
            size: start,
        })
    }

    /// Fortunes in files matching `filter`.
    pub fn count_matching(&self, filter: &FileFilter) -> usize {
        self.files
            .iter()
            .filter(|(name, _)| filter.matches(name))
            .map(|(_, record)| record.store.len())
            .sum()
    }

    /// A uniformly random fortune pooled over all files matching `filter`.
    pub fn random_matching(&self, filter: &FileFilter) -> Result<&Fortune, LibraryError> {
        self.random_matching_with(filter, &mut rand::rng())
    }

    /// As [`FortuneLibrary::random_matching`], drawing from a caller-supplied
    /// generator.
    pub fn random_matching_with<R: Rng + ?Sized>(
        &self,
        filter: &FileFilter,
        rng: &mut R,
    ) -> Result<&Fortune, LibraryError> {
        let total = self.count_matching(filter);
        if total == 0 {
            return Err(LibraryError::NoMatchingFortunes);
        }

        let pick = rng.random_range(0..total);
        debug!(pick, total, "selected pooled fortune");

        let mut start = 0;
        for (name, record) in &self.files {
            if !filter.matches(name) {
                continue;
            }
            let len = record.store.len();
            if pick < start + len {
                return Ok(record.store.get(pick - start)?);
            }
            start += len;
        }
        Err(LibraryError::NoMatchingFortunes)
    }

    /// Fortunes from every file satisfying `query` against `metric`,
    /// ascending by metric value with ties in pooled ordinal order.
    pub fn query_by_metric(&self, metric: Metric, query: MetricQuery) -> Result<Vec<&Fortune>, StoreError> {
        if self.fortune_count() == 0 {
            return Err(StoreError::EmptyCorpus);
        }

        let mut matched: Vec<&Fortune> = Vec::new();
        for record in self.files.values() {
            match record.store.query_by_metric(metric, query) {
                Ok(fortunes) => matched.extend(fortunes),
                Err(StoreError::EmptyCorpus) => continue,
                Err(err) => return Err(err),
            }
        }
        // Per-store results are already tie-broken by insertion order, and
        // files are visited in pooled order, so a stable sort on the metric
        // alone preserves the pooled tie order.
        matched.sort_by_key(|f| metric.value_of(f));
        Ok(matched)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

fn relative_name(dir: &Path, path: &Path) -> String {
    path.strip_prefix(dir)
        .unwrap_or(path)
        .to_string_lossy()
        .replace(std::path::MAIN_SEPARATOR, "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::fs;
    use tempfile::TempDir;

    fn write_fixture(dir: &Path) {
        fs::write(dir.join("animals.txt"), "cat\n%%\ndog\n%%\nowl\n").unwrap();
        fs::write(dir.join("proverbs.txt"), "haste makes waste\n").unwrap();
    }

    #[test]
    fn test_load_counts_files_and_fortunes() {
        let temp = TempDir::new().unwrap();
        write_fixture(temp.path());

        let library = FortuneLibrary::load(temp.path()).unwrap();

        assert_eq!(library.file_count(), 2);
        assert_eq!(library.fortune_count(), 4);
        assert_eq!(library.total_len(), 3 + 3 + 3 + 17);
    }

    #[test]
    fn test_load_missing_dir_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        assert!(matches!(
            FortuneLibrary::load(&missing),
            Err(LibraryError::DirUnreadable { .. })
        ));
    }

    #[test]
    fn test_pooled_get_follows_name_order() {
        let temp = TempDir::new().unwrap();
        write_fixture(temp.path());
        let library = FortuneLibrary::load(temp.path()).unwrap();

        // animals.txt sorts before proverbs.txt
        assert_eq!(library.get(0).unwrap().text(), "cat");
        assert_eq!(library.get(2).unwrap().text(), "owl");
        assert_eq!(library.get(3).unwrap().text(), "haste makes waste");
        assert!(matches!(
            library.get(4),
            Err(StoreError::IndexOutOfRange { index: 4, size: 4 })
        ));
    }

    #[test]
    fn test_prefix_filter_restricts_pool() {
        let temp = TempDir::new().unwrap();
        write_fixture(temp.path());
        let library = FortuneLibrary::load(temp.path()).unwrap();

        let filter = FileFilter::from_settings(Some("animals"), None).unwrap();
        assert_eq!(library.count_matching(&filter), 3);

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let fortune = library.random_matching_with(&filter, &mut rng).unwrap();
            assert!(["cat", "dog", "owl"].contains(&fortune.text()));
        }
    }

    #[test]
    fn test_pattern_filter() {
        let temp = TempDir::new().unwrap();
        write_fixture(temp.path());
        let library = FortuneLibrary::load(temp.path()).unwrap();

        let filter = FileFilter::from_settings(None, Some(r"^prov.*\.txt$")).unwrap();
        assert_eq!(library.count_matching(&filter), 1);

        let fortune = library.random_matching(&filter).unwrap();
        assert_eq!(fortune.text(), "haste makes waste");
    }

    #[test]
    fn test_prefixes_win_when_both_settings_present() {
        let filter = FileFilter::from_settings(Some("a;b"), Some("never")).unwrap();
        assert!(matches!(filter, FileFilter::Prefixes(ref p) if p.len() == 2));
    }

    #[test]
    fn test_invalid_pattern_fails() {
        assert!(matches!(
            FileFilter::from_settings(None, Some("(unclosed")),
            Err(LibraryError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_no_matching_fortunes() {
        let temp = TempDir::new().unwrap();
        write_fixture(temp.path());
        let library = FortuneLibrary::load(temp.path()).unwrap();

        let filter = FileFilter::from_settings(Some("zzz"), None).unwrap();
        assert!(matches!(
            library.random_matching(&filter),
            Err(LibraryError::NoMatchingFortunes)
        ));
    }

    #[test]
    fn test_refresh_picks_up_new_and_deleted_files() {
        let temp = TempDir::new().unwrap();
        write_fixture(temp.path());
        let mut library = FortuneLibrary::load(temp.path()).unwrap();
        assert_eq!(library.file_count(), 2);

        fs::write(temp.path().join("zen.txt"), "mu\n").unwrap();
        fs::remove_file(temp.path().join("proverbs.txt")).unwrap();
        library.refresh().unwrap();

        assert_eq!(library.file_count(), 2);
        assert!(library.store("zen.txt").is_some());
        assert!(library.store("proverbs.txt").is_none());
    }

    #[test]
    fn test_hidden_files_are_skipped() {
        let temp = TempDir::new().unwrap();
        write_fixture(temp.path());
        fs::write(temp.path().join(".secret"), "hidden\n").unwrap();

        let library = FortuneLibrary::load(temp.path()).unwrap();
        assert_eq!(library.file_count(), 2);
    }

    #[test]
    fn test_subdirectories_are_scanned() {
        let temp = TempDir::new().unwrap();
        write_fixture(temp.path());
        let sub = temp.path().join("extra");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("more.txt"), "deep\n").unwrap();

        let library = FortuneLibrary::load(temp.path()).unwrap();
        assert_eq!(library.file_count(), 3);
        assert!(library.store("extra/more.txt").is_some());
    }

    #[test]
    fn test_query_pools_across_files() {
        let temp = TempDir::new().unwrap();
        write_fixture(temp.path());
        let library = FortuneLibrary::load(temp.path()).unwrap();

        let short = library.query_by_metric(Metric::Length, MetricQuery::AtMost(3)).unwrap();
        let texts: Vec<&str> = short.iter().map(|f| f.text()).collect();
        assert_eq!(texts, vec!["cat", "dog", "owl"]);
    }
}
