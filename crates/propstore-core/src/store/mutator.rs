//! Writes and serialization
//!
//! Every `add_*` call updates memory and then saves the whole store. If the
//! save fails the in-memory change is undone, so memory keeps matching what
//! is on disk.

use std::fmt::Write as _;

use crate::error::{StoreError, StoreResult};
use crate::{log_debug, log_warn};
use super::config_store::ConfigStore;
use super::parser::CategoryMap;
use super::resolver::Reference;

/// What an `add_string` replaced, for rolling it back
struct Undo {
    created_category: bool,
    previous: Option<String>,
}

fn invalid(message: String) -> StoreError {
    StoreError::InvalidArgument(message)
}

fn has_line_break(s: &str) -> bool {
    s.contains(['\n', '\r'])
}

/// Reject names and values that would not read back as written
fn validate_entry(category: &str, key: &str, value: &str) -> StoreResult<()> {
    if category.is_empty() {
        return Err(invalid("category is empty".to_string()));
    }
    if has_line_break(category) {
        return Err(invalid(format!("category '{}' contains a line break", category.escape_debug())));
    }
    if key.is_empty() {
        return Err(invalid("key is empty".to_string()));
    }
    if key.trim() != key || key.contains('=') || has_line_break(key) {
        return Err(invalid(format!(
            "key '{}' must not contain '=', line breaks, or surrounding whitespace",
            key.escape_debug()
        )));
    }
    // `[k = v]` would read back as a category header
    if key.starts_with('[') {
        return Err(invalid(format!("key '{}' must not start with '['", key)));
    }
    if has_line_break(value) {
        return Err(invalid(format!("value for '{}' contains a line break", key)));
    }
    if Reference::parse(value.trim()).is_some() {
        return Err(invalid(format!(
            "value for '{}' would read back as a reference: '{}'",
            key, value
        )));
    }
    Ok(())
}

/// Render categories in the on-disk grammar
pub(crate) fn render(categories: &CategoryMap) -> String {
    let mut out = String::new();
    for (name, entries) in categories {
        let _ = writeln!(out, "[{}]", name);
        for (key, value) in entries {
            let _ = writeln!(out, "{} = {}", key, value);
        }
        out.push('\n');
    }
    out
}

impl ConfigStore {
    /// Set `key` in `category` to `value`, creating the category if needed,
    /// then save.
    ///
    /// Returns `Err(StoreError::InvalidArgument)` for names or values that
    /// would not survive a reload, and the save error (with the change rolled
    /// back) if writing fails.
    pub fn add_string(&self, category: &str, key: &str, value: &str) -> StoreResult<()> {
        validate_entry(category, key, value)?;

        let undo = {
            let mut categories = self.categories.write();
            let created_category = !categories.contains_key(category);
            let previous = categories
                .entry(category.to_string())
                .or_default()
                .insert(key.to_string(), value.to_string());
            Undo {
                created_category,
                previous,
            }
        };

        if let Err(e) = self.save() {
            log_warn!(
                self.options().logger(),
                "{}: save failed, reverting [{}].{}: {}",
                self.location(),
                category,
                key,
                e
            );
            self.rollback(category, key, undo);
            return Err(e);
        }
        Ok(())
    }

    /// Undo one `add_string`. Only `key` is touched: other keys may have been
    /// added to the same category and saved since.
    fn rollback(&self, category: &str, key: &str, undo: Undo) {
        let mut categories = self.categories.write();
        let Some(entries) = categories.get_mut(category) else {
            return;
        };
        match undo.previous {
            Some(previous) => {
                entries.insert(key.to_string(), previous);
            }
            None => {
                entries.remove(key);
            }
        }
        if undo.created_category && entries.is_empty() {
            categories.remove(category);
        }
    }

    pub fn add_int(&self, category: &str, key: &str, value: i32) -> StoreResult<()> {
        self.add_string(category, key, &value.to_string())
    }

    pub fn add_long(&self, category: &str, key: &str, value: i64) -> StoreResult<()> {
        self.add_string(category, key, &value.to_string())
    }

    /// Returns `Err(StoreError::InvalidArgument)` for NaN and infinities,
    /// which numeric accessors could not read back.
    pub fn add_float(&self, category: &str, key: &str, value: f32) -> StoreResult<()> {
        if !value.is_finite() {
            return Err(invalid(format!("value for '{}' is not finite", key)));
        }
        self.add_string(category, key, &value.to_string())
    }

    /// Returns `Err(StoreError::InvalidArgument)` for NaN and infinities,
    /// which numeric accessors could not read back.
    pub fn add_double(&self, category: &str, key: &str, value: f64) -> StoreResult<()> {
        if !value.is_finite() {
            return Err(invalid(format!("value for '{}' is not finite", key)));
        }
        self.add_string(category, key, &value.to_string())
    }

    pub fn add_bool(&self, category: &str, key: &str, value: bool) -> StoreResult<()> {
        self.add_string(category, key, &value.to_string())
    }

    pub fn add_byte(&self, category: &str, key: &str, value: i8) -> StoreResult<()> {
        self.add_string(category, key, &value.to_string())
    }

    /// Write the whole store to its source in one overwrite.
    ///
    /// Categories and keys come out sorted; comments and the original layout
    /// are not kept.
    pub fn save(&self) -> StoreResult<()> {
        let content = render(&self.categories.read());
        self.source().overwrite(&content)?;
        log_debug!(
            self.options().logger(),
            "{}: saved {} bytes",
            self.location(),
            content.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use std::sync::{mpsc, Arc};
    use parking_lot::Mutex;
    use tempfile::tempdir;
    use crate::logging::Logger;
    use crate::source::{LineSource, MemorySource, MemorySourceProvider, SourceProvider};
    use crate::store::StoreOptions;

    #[derive(Default)]
    struct RecordingLogger {
        warnings: Mutex<Vec<String>>,
    }

    impl Logger for RecordingLogger {
        fn debug(&self, _message: &str) {}
        fn info(&self, _message: &str) {}
        fn warn(&self, message: &str) {
            self.warnings.lock().push(message.to_string());
        }
        fn error(&self, _message: &str) {}
    }

    fn memory_store(content: &str) -> (ConfigStore, Arc<MemorySource>) {
        let provider = Arc::new(MemorySourceProvider::new());
        let source = provider.insert("app.properties", content);
        let store =
            ConfigStore::open_with("app.properties", StoreOptions::new().with_provider(provider))
                .unwrap();
        (store, source)
    }

    #[test]
    fn test_render_format() {
        let (store, _) = memory_store("[b]\ny = 2\nx = 1\n[a]\nz = 3\n");
        let rendered = render(&store.categories.read());
        assert_eq!(rendered, "[a]\nz = 3\n\n[b]\nx = 1\ny = 2\n\n");
    }

    #[test]
    fn test_add_then_get() {
        let (store, source) = memory_store("[a]\nx = 1\n");

        store.add_string("a", "x", "overwritten").unwrap();
        store.add_string("new", "key", "some value").unwrap();

        assert_eq!(store.get_string("a", "x").unwrap(), "overwritten");
        assert_eq!(store.get_string("new", "key").unwrap(), "some value");

        // Every add saves immediately
        let saved = source.content().unwrap();
        assert!(saved.contains("[new]\nkey = some value\n"));
        assert!(saved.contains("x = overwritten"));
    }

    #[test]
    fn test_typed_adds() {
        let (store, _) = memory_store("");

        store.add_int("t", "int", -12).unwrap();
        store.add_long("t", "long", 9_000_000_000).unwrap();
        store.add_float("t", "float", 0.5).unwrap();
        store.add_double("t", "double", 2.25).unwrap();
        store.add_bool("t", "bool", true).unwrap();
        store.add_byte("t", "byte", -8).unwrap();

        assert_eq!(store.get_int("t", "int").unwrap(), -12);
        assert_eq!(store.get_long("t", "long").unwrap(), 9_000_000_000);
        assert_eq!(store.get_float("t", "float").unwrap(), 0.5);
        assert_eq!(store.get_double("t", "double").unwrap(), 2.25);
        assert!(store.get_bool("t", "bool").unwrap());
        assert_eq!(store.get_byte("t", "byte").unwrap(), -8);
    }

    #[test]
    fn test_add_rejects_unreadable_input() {
        let (store, _) = memory_store("");
        for (category, key, value) in [
            ("", "k", "v"),
            ("a\nb", "k", "v"),
            ("a", "", "v"),
            ("a", "k=x", "v"),
            (" a", " k", "v"),
            ("a", "k", "two\nlines"),
            ("a", "[k", "v]"),
            ("a", "[k", "v"),
            ("a", "k", "{{other.a.k}}"),
            ("a", "k", " {{other.a}} "),
        ] {
            assert!(
                matches!(store.add_string(category, key, value), Err(StoreError::InvalidArgument(_))),
                "expected rejection for {:?}",
                (category, key, value)
            );
        }
        assert!(matches!(
            store.add_double("a", "k", f64::NAN),
            Err(StoreError::InvalidArgument(_))
        ));
        assert!(store.categories().is_empty());
    }

    #[test]
    fn test_failed_save_rolls_back() {
        let provider = Arc::new(MemorySourceProvider::new());
        let source = provider.insert("app.properties", "[a]\nx = 1\n");
        let logger = Arc::new(RecordingLogger::default());
        let store = ConfigStore::open_with(
            "app.properties",
            StoreOptions::new()
                .with_provider(provider)
                .with_logger(logger.clone()),
        )
        .unwrap();

        source.set_fail_writes(true);
        assert!(matches!(store.add_string("a", "x", "2"), Err(StoreError::Io { .. })));
        assert!(matches!(store.add_string("a", "y", "2"), Err(StoreError::Io { .. })));
        assert!(matches!(store.add_string("b", "z", "2"), Err(StoreError::Io { .. })));

        assert_eq!(store.get_string("a", "x").unwrap(), "1");
        assert!(!store.contains_key("a", "y").unwrap());
        assert!(!store.contains_category("b"));
        assert_eq!(source.content().unwrap(), "[a]\nx = 1\n");
        assert_eq!(logger.warnings.lock().len(), 3);
    }

    /// Holds its first overwrite until released, then fails it
    struct GatedSource {
        content: Mutex<String>,
        entered: Mutex<Option<mpsc::Sender<()>>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl LineSource for GatedSource {
        fn location(&self) -> &str {
            "gated.properties"
        }

        fn exists(&self) -> bool {
            true
        }

        fn read_lines(&self) -> StoreResult<Vec<String>> {
            Ok(self.content.lock().lines().map(str::to_string).collect())
        }

        fn overwrite(&self, content: &str) -> StoreResult<()> {
            let entered = self.entered.lock().take();
            if let Some(entered) = entered {
                entered.send(()).unwrap();
                self.release.lock().recv().unwrap();
                return Err(StoreError::io(
                    self.location(),
                    io::Error::new(io::ErrorKind::Other, "write refused"),
                ));
            }
            *self.content.lock() = content.to_string();
            Ok(())
        }

        fn append(&self, content: &str) -> StoreResult<()> {
            self.content.lock().push_str(content);
            Ok(())
        }
    }

    struct GatedProvider(Arc<GatedSource>);

    impl SourceProvider for GatedProvider {
        fn open(&self, _location: &str) -> StoreResult<Arc<dyn LineSource>> {
            let source: Arc<dyn LineSource> = self.0.clone();
            Ok(source)
        }
    }

    #[test]
    fn test_rollback_keeps_keys_saved_meanwhile() {
        use std::thread;

        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let source = Arc::new(GatedSource {
            content: Mutex::new(String::new()),
            entered: Mutex::new(Some(entered_tx)),
            release: Mutex::new(release_rx),
        });
        let store = Arc::new(
            ConfigStore::open_with(
                "gated.properties",
                StoreOptions::new().with_provider(Arc::new(GatedProvider(source.clone()))),
            )
            .unwrap(),
        );

        let first = {
            let store = Arc::clone(&store);
            thread::spawn(move || store.add_string("new", "k1", "a"))
        };

        // The first add is now blocked inside its save
        entered_rx.recv().unwrap();
        store.add_string("new", "k2", "b").unwrap();
        assert_eq!(source.content.lock().as_str(), "[new]\nk1 = a\nk2 = b\n\n");

        release_tx.send(()).unwrap();
        assert!(matches!(first.join().unwrap(), Err(StoreError::Io { .. })));

        assert_eq!(store.get_string("new", "k2").unwrap(), "b");
        assert!(!store.contains_key("new", "k1").unwrap());
    }

    #[test]
    fn test_rollback_drops_created_category_when_empty() {
        let (store, source) = memory_store("[a]\nx = 1\n");
        source.set_fail_writes(true);
        assert!(store.add_string("fresh", "k", "v").is_err());
        assert!(!store.contains_category("fresh"));
        assert_eq!(store.categories(), vec!["a".to_string()]);
    }

    #[test]
    fn test_concurrent_adds() {
        use std::thread;

        let (store, source) = memory_store("[shared]\nseed = 0\n");
        let store = Arc::new(store);
        let mut handles = vec![];

        for i in 0..10 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                let key = format!("key_{}", i);
                store.add_int("shared", &key, i).unwrap();
                assert_eq!(store.get_int("shared", &key).unwrap(), i);
                assert_eq!(store.get_int("shared", "seed").unwrap(), 0);
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.keys("shared").unwrap().len(), 11);

        // The last save saw every key
        store.save().unwrap();
        let saved = source.content().unwrap();
        assert!((0..10).all(|i| saved.contains(&format!("key_{} = {}\n", i, i))));
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.properties");
        fs::write(
            &path,
            "[Server]\nhost = example.org\n  port=40 + 2\n\n[Empty]\n[Paths]\nlog=/var/log/app.log\n",
        )
        .unwrap();

        let original = ConfigStore::open(&path).unwrap();
        original.save().unwrap();
        let reloaded = ConfigStore::open(&path).unwrap();
        assert_eq!(reloaded.snapshot().categories, original.snapshot().categories);

        reloaded.add_int("Server", "workers", 8).unwrap();
        let again = ConfigStore::open(&path).unwrap();
        assert_eq!(again.get_int("Server", "workers").unwrap(), 8);
        assert_eq!(again.get_int("Server", "port").unwrap(), 42);
        assert!(again.keys("Empty").unwrap().is_empty());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[Empty]\n\n[Paths]\nlog = /var/log/app.log\n\n[Server]\nhost = example.org\nport = 40 + 2\nworkers = 8\n\n"
        );
    }
}
