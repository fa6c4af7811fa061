use crate::config::{LoggingConfig, Section};
use std::{
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

const DEFAULT_SECTION: &str = "default";

// -------- level helpers --------

fn parse_level_filter(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// Returns true if target == prefix or target starts with "prefix::"
fn matches_target_prefix(target: &str, prefix: &str) -> bool {
    target == prefix
        || (target.starts_with(prefix) && target[prefix.len()..].starts_with("::"))
}

// -------- rotating writer for files --------

#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log file writer poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log file writer poisoned"))?
            .flush()
    }
}

/// A writer that may have nowhere to go; writes are then silently dropped.
struct RoutedWriter(Option<RotWriter>);

impl Write for RoutedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(w) => w.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Routes log records to a file by target prefix, falling back to the default file.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<RotWriter>,
    by_prefix: Vec<(String, RotWriter)>,
}

impl FileRouter {
    fn resolve_for(&self, target: &str) -> Option<RotWriter> {
        // Longest prefix wins so "emergency::infra" can override "emergency".
        self.by_prefix
            .iter()
            .filter(|(prefix, _)| matches_target_prefix(target, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, w)| w.clone())
            .or_else(|| self.default.clone())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = RoutedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriter(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriter(self.resolve_for(meta.target()))
    }
}

// -------- path resolution helpers --------

/// Resolve a log file path against `base_dir` (home_dir).
/// Absolute paths are kept as-is; relative paths are joined with `base_dir`.
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Create a size-rotated writer, ensuring the parent directory exists.
fn create_rotating_writer_at_path(
    log_path: &Path,
    max_bytes: usize,
    max_files: usize,
) -> std::io::Result<RotWriter> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(FileLimit::MaxFiles(max_files)),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

fn writer_for_section(name: &str, section: &Section, base_dir: &Path) -> Option<RotWriter> {
    if section.file.trim().is_empty() {
        return None;
    }

    let max_bytes = section.max_size_mb.unwrap_or(100) * 1024 * 1024;
    let max_files = section.max_backups.unwrap_or(3).max(1);
    let log_path = resolve_log_path(&section.file, base_dir);

    match create_rotating_writer_at_path(&log_path, max_bytes as usize, max_files) {
        Ok(writer) => Some(writer),
        Err(e) => {
            eprintln!(
                "Failed to init log file for '{}': {} ({})",
                name,
                log_path.to_string_lossy(),
                e
            );
            None
        }
    }
}

// -------- plan: what goes where at which level --------

struct LogPlan {
    console: Targets,
    file: Targets,
    router: FileRouter,
}

impl LogPlan {
    fn from_config(cfg: &LoggingConfig, base_dir: &Path) -> Self {
        let default_section = cfg.get(DEFAULT_SECTION);

        let mut console = Targets::new().with_default(
            default_section
                .map(|s| parse_level_filter(&s.console_level))
                .unwrap_or(LevelFilter::OFF),
        );

        let default_writer =
            default_section.and_then(|s| writer_for_section(DEFAULT_SECTION, s, base_dir));
        let default_file_level = match (default_section, &default_writer) {
            (Some(s), Some(_)) => parse_level_filter(&s.file_level),
            _ => LevelFilter::OFF,
        };
        let mut file = Targets::new().with_default(default_file_level);

        let mut router = FileRouter {
            default: default_writer,
            by_prefix: Vec::new(),
        };

        let mut named: Vec<(&String, &Section)> = cfg
            .iter()
            .filter(|(k, _)| k.as_str() != DEFAULT_SECTION)
            .collect();
        named.sort_by(|a, b| a.0.cmp(b.0));

        for (target, section) in named {
            console = console.with_target(target.clone(), parse_level_filter(&section.console_level));

            match writer_for_section(target, section, base_dir) {
                Some(writer) => {
                    file = file.with_target(target.clone(), parse_level_filter(&section.file_level));
                    router.by_prefix.push((target.clone(), writer));
                }
                // Subsystems without their own file stay out of the default file.
                None => file = file.with_target(target.clone(), LevelFilter::OFF),
            }
        }

        Self {
            console,
            file,
            router,
        }
    }
}

// -------- public init --------

/// Initialize logging from a configuration.
/// - `cfg`: LoggingConfig containing the logging sections
/// - `base_dir`: base directory used to resolve relative log file paths (usually server.home_dir)
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

    // Bridge `log` → `tracing` before installing the subscriber
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let plan = LogPlan::from_config(cfg, base_dir);
    let ansi = std::io::stdout().is_terminal();

    let console_layer = fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(plan.console);

    let file_layer = if plan.router.is_empty() {
        None
    } else {
        Some(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(plan.router)
                .with_filter(plan.file),
        )
    };

    let _ = Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

fn init_default_logging() {
    let _ = fmt()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

// =================== tests ===================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use tempfile::tempdir;

    fn section(console: &str, file: &str, file_level: &str) -> Section {
        Section {
            console_level: console.into(),
            file: file.into(),
            file_level: file_level.into(),
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(parse_level_filter("trace"), LevelFilter::TRACE);
        assert_eq!(parse_level_filter("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level_filter(" Info "), LevelFilter::INFO);
        assert_eq!(parse_level_filter("warn"), LevelFilter::WARN);
        assert_eq!(parse_level_filter("ERROR"), LevelFilter::ERROR);
        assert_eq!(parse_level_filter("off"), LevelFilter::OFF);
        assert_eq!(parse_level_filter("none"), LevelFilter::OFF);
        assert_eq!(parse_level_filter("bogus"), LevelFilter::INFO);
    }

    #[test]
    fn test_target_prefix_matching() {
        assert!(matches_target_prefix("emergency", "emergency"));
        assert!(matches_target_prefix("emergency::domain::service", "emergency"));
        assert!(!matches_target_prefix("emergency_tools", "emergency"));
        assert!(!matches_target_prefix("operators", "emergency"));
    }

    #[test]
    fn test_file_paths_resolved_against_home_dir() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_log_path("logs/test.log", tmp.path());
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("logs/test.log"));

        let abs = tmp.path().join("abs.log");
        assert_eq!(resolve_log_path(&abs.to_string_lossy(), Path::new("/ignored")), abs);
    }

    #[test]
    fn test_create_rotating_writer_creates_parent() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("nested/dir/app.log");

        let res = create_rotating_writer_at_path(&p, 128 * 1024, 2);
        assert!(res.is_ok(), "writer should be created");
        assert!(p.parent().unwrap().exists(), "parent dir must be created");
    }

    #[test]
    fn test_router_prefers_longest_prefix_then_default() {
        let tmp = tempdir().unwrap();
        let mut cfg = default_logging_config();
        cfg.insert("emergency".into(), section("info", "logs/emergency.log", "debug"));
        cfg.insert(
            "emergency::infra".into(),
            section("info", "logs/storage.log", "trace"),
        );
        cfg.insert("operators".into(), section("warn", "", "debug"));

        let plan = LogPlan::from_config(&cfg, tmp.path());

        assert!(plan.router.default.is_some());
        assert_eq!(plan.router.by_prefix.len(), 2);

        let storage = plan.router.resolve_for("emergency::infra::storage").unwrap();
        let storage_expected = &plan
            .router
            .by_prefix
            .iter()
            .find(|(p, _)| p == "emergency::infra")
            .unwrap()
            .1;
        assert!(Arc::ptr_eq(&storage.0, &storage_expected.0));

        let fallback = plan.router.resolve_for("api_ingress").unwrap();
        assert!(Arc::ptr_eq(
            &fallback.0,
            &plan.router.default.as_ref().unwrap().0
        ));
    }

    #[test]
    fn test_empty_file_everywhere_means_no_file_layer() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert(DEFAULT_SECTION.into(), section("info", "", "debug"));

        let plan = LogPlan::from_config(&cfg, tmp.path());
        assert!(plan.router.is_empty());
    }
}
