use chrono::{DateTime, Duration, Local};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{BackupLocation, Config};

use super::entry::{DirectoryEntry, ScanResult};
use super::options::ScanOptions;

/// Scan every configured location in order, one after another.
pub fn scan_all_locations(config: &Config, now: DateTime<Local>) -> Vec<ScanResult> {
    config
        .backup_locations
        .iter()
        .map(|location| {
            let options = ScanOptions::for_location(location, &config.monitoring);
            tracing::info!(
                location = %location.name,
                path = %location.path.display(),
                "Scanning location"
            );
            let result = scan_location(location, &options, now);
            tracing::info!(
                location = %location.name,
                directories = result.directories_found.len(),
                errors = result.errors.len(),
                truncated = result.truncated,
                "Scan complete"
            );
            result
        })
        .collect()
}

/// Scan one location with an explicit work stack of (path, depth) pairs.
///
/// Per-directory failures land in `ScanResult::errors`; the scan never
/// aborts for one bad subtree. `now` is injected so results are
/// deterministic under test.
pub fn scan_location(
    location: &BackupLocation,
    options: &ScanOptions,
    now: DateTime<Local>,
) -> ScanResult {
    let mut result = ScanResult::new(&location.name);
    let cutoff = now - Duration::days(options.days_back);

    if !location.path.is_dir() {
        result.errors.push(format!(
            "{}: not a directory or not accessible",
            location.path.display()
        ));
        return result;
    }

    // Resolved paths already visited; breaks symlink cycles.
    let mut visited: HashSet<PathBuf> = HashSet::new();

    // Children are pushed in reverse lexical order so pops come out lexical,
    // giving a deterministic depth-first entry order.
    let mut stack: Vec<(PathBuf, usize)> = vec![(location.path.clone(), 0)];

    while let Some((dir, depth)) = stack.pop() {
        if options.is_excluded(&dir) {
            tracing::debug!(path = %dir.display(), "Excluded subtree");
            continue;
        }

        let resolved = match dir.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                result.errors.push(format!("{}: {}", dir.display(), e));
                continue;
            }
        };
        if !visited.insert(resolved) {
            tracing::debug!(path = %dir.display(), "Already visited, skipping");
            continue;
        }

        if result.directories_found.len() >= options.max_dirs {
            tracing::warn!(
                location = %location.name,
                limit = options.max_dirs,
                "Reached maximum directory limit, truncating scan"
            );
            result.truncated = true;
            break;
        }

        match analyze_directory(&dir, cutoff, options) {
            Ok(analyzed) => {
                result.directories_found.push(analyzed.entry);
                result.errors.extend(analyzed.warnings);

                if result.directories_found.len() % 50 == 0 {
                    tracing::info!(
                        location = %location.name,
                        processed = result.directories_found.len(),
                        "Scan progress"
                    );
                }

                if depth < options.max_depth {
                    let mut subdirs = analyzed.subdirs;
                    subdirs.sort();
                    for child in subdirs.into_iter().rev() {
                        stack.push((child, depth + 1));
                    }
                }
            }
            Err(e) => result.errors.push(format!("{}: {}", dir.display(), e)),
        }
    }

    result
}

struct Analyzed {
    entry: DirectoryEntry,
    subdirs: Vec<PathBuf>,
    warnings: Vec<String>,
}

/// Collect immediate (non-recursive) stats for one directory.
fn analyze_directory(
    dir: &Path,
    cutoff: DateTime<Local>,
    options: &ScanOptions,
) -> std::io::Result<Analyzed> {
    let mut file_count = 0u64;
    let mut subdirectory_count = 0u64;
    let mut total_size = 0u64;
    let mut newest: Option<(DateTime<Local>, String)> = None;
    let mut subdirs = Vec::new();
    let mut warnings = Vec::new();

    for child in fs::read_dir(dir)? {
        let child = match child {
            Ok(c) => c,
            Err(e) => {
                warnings.push(format!("{}: {}", dir.display(), e));
                continue;
            }
        };
        let path = child.path();

        let file_type = match child.file_type() {
            Ok(t) => t,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if file_type.is_dir() {
            if options.is_excluded(&path) {
                continue;
            }
            subdirectory_count += 1;
            subdirs.push(path);
        } else if file_type.is_file() {
            if options.is_excluded(&path) {
                continue;
            }
            let metadata = match child.metadata() {
                Ok(m) => m,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Skipping unreadable file");
                    continue;
                }
            };
            file_count += 1;
            total_size += metadata.len();

            if let Ok(modified) = metadata.modified() {
                let mtime = DateTime::<Local>::from(modified);
                let name = child.file_name().to_string_lossy().into_owned();
                let replace = match &newest {
                    None => true,
                    Some((best, best_name)) => {
                        mtime > *best || (mtime == *best && name < *best_name)
                    }
                };
                if replace {
                    newest = Some((mtime, name));
                }
            }
        } else if file_type.is_symlink() {
            if options.is_excluded(&path) {
                continue;
            }
            // Directory symlinks are traversed; the visited set breaks
            // cycles. Anything else behind a symlink is ignored.
            match fs::metadata(&path) {
                Ok(m) if m.is_dir() => {
                    subdirectory_count += 1;
                    subdirs.push(path);
                }
                Ok(_) => {}
                Err(e) => warnings.push(format!("{}: {}", path.display(), e)),
            }
        }
    }

    // A directory with no files falls back to its own mtime
    let (last_modified, most_recent_file) = match newest {
        Some((ts, name)) => (ts, Some(name)),
        None => {
            let own = fs::metadata(dir)?.modified()?;
            (DateTime::<Local>::from(own), None)
        }
    };

    Ok(Analyzed {
        entry: DirectoryEntry {
            path: dir.to_path_buf(),
            last_modified,
            file_count,
            subdirectory_count,
            total_size,
            most_recent_file,
            recent_activity: last_modified >= cutoff,
        },
        subdirs,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn location_at(path: &Path) -> BackupLocation {
        BackupLocation {
            name: "test".to_string(),
            path: path.to_path_buf(),
            exclude_patterns: vec![],
            max_depth: None,
        }
    }

    fn create_test_location() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        File::create(root.join("full.tar.gz"))
            .unwrap()
            .write_all(&vec![b'x'; 500])
            .unwrap();
        File::create(root.join("incr.tar.gz"))
            .unwrap()
            .write_all(&vec![b'y'; 200])
            .unwrap();

        fs::create_dir(root.join("daily")).unwrap();
        File::create(root.join("daily/monday.tar"))
            .unwrap()
            .write_all(b"data")
            .unwrap();

        fs::create_dir_all(root.join("archive/2025")).unwrap();
        File::create(root.join("archive/2025/jan.tar"))
            .unwrap()
            .write_all(b"old")
            .unwrap();

        dir
    }

    #[test]
    fn scan_includes_root_and_subdirectories() {
        let dir = create_test_location();
        let options = ScanOptions::new();
        let result = scan_location(&location_at(dir.path()), &options, Local::now());

        assert!(result.errors.is_empty());
        assert!(!result.truncated);

        // Root entry is first, with its immediate file stats only
        let root = &result.directories_found[0];
        assert_eq!(root.path, dir.path());
        assert_eq!(root.file_count, 2);
        assert_eq!(root.subdirectory_count, 2);
        assert_eq!(root.total_size, 700);

        let paths: Vec<_> = result
            .directories_found
            .iter()
            .map(|e| e.path.clone())
            .collect();
        assert!(paths.contains(&dir.path().join("daily")));
        assert!(paths.contains(&dir.path().join("archive/2025")));
    }

    #[test]
    fn scan_order_is_lexical_depth_first() {
        let dir = create_test_location();
        let options = ScanOptions::new();
        let result = scan_location(&location_at(dir.path()), &options, Local::now());

        let names: Vec<String> = result
            .directories_found
            .iter()
            .map(|e| {
                e.path
                    .strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        assert_eq!(names, vec!["", "archive", "archive/2025", "daily"]);
    }

    #[test]
    fn max_dirs_truncates() {
        let dir = TempDir::new().unwrap();
        for i in 0..6 {
            fs::create_dir(dir.path().join(format!("set{}", i))).unwrap();
        }

        let options = ScanOptions::new().with_max_dirs(3);
        let result = scan_location(&location_at(dir.path()), &options, Local::now());

        assert_eq!(result.directories_found.len(), 3);
        assert!(result.truncated);
    }

    #[test]
    fn exact_fit_is_not_truncated() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("only")).unwrap();

        let options = ScanOptions::new().with_max_dirs(2);
        let result = scan_location(&location_at(dir.path()), &options, Local::now());

        assert_eq!(result.directories_found.len(), 2);
        assert!(!result.truncated);
    }

    #[test]
    fn excluded_subtree_is_pruned() {
        let dir = create_test_location();
        let excluded = dir.path().join("archive");

        let options = ScanOptions::new().with_exclude(vec![excluded.clone()]);
        let result = scan_location(&location_at(dir.path()), &options, Local::now());

        assert!(result
            .directories_found
            .iter()
            .all(|e| !e.path.starts_with(&excluded)));
        // The sibling survives
        assert!(result
            .directories_found
            .iter()
            .any(|e| e.path == dir.path().join("daily")));
    }

    #[test]
    fn max_depth_prunes_nested_directories() {
        let dir = create_test_location();

        // archive/2025 sits at depth 2
        let options = ScanOptions::new().with_max_depth(1);
        let result = scan_location(&location_at(dir.path()), &options, Local::now());

        let paths: Vec<_> = result
            .directories_found
            .iter()
            .map(|e| e.path.clone())
            .collect();
        assert!(paths.contains(&dir.path().join("archive")));
        assert!(!paths.contains(&dir.path().join("archive/2025")));
    }

    #[test]
    fn last_modified_is_max_over_file_mtimes() {
        use std::time::{Duration as StdDuration, SystemTime};

        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let base = SystemTime::now();
        let minute = StdDuration::from_secs(60);
        let day = StdDuration::from_secs(24 * 60 * 60);

        // Three files touched today (newest first), two a month old
        let stamps = [
            ("hourly.tar", base - minute),
            ("midday.tar", base - 2 * minute),
            ("morning.tar", base - 3 * minute),
            ("lastmonth-a.tar", base - 30 * day),
            ("lastmonth-b.tar", base - 31 * day),
        ];
        for (name, stamp) in &stamps {
            let path = root.join(name);
            File::create(&path).unwrap().write_all(b"data").unwrap();
            File::options()
                .write(true)
                .open(&path)
                .unwrap()
                .set_modified(*stamp)
                .unwrap();
        }

        // days_back = 7: the month-old files alone would be stale
        let options = ScanOptions::new();
        let result = scan_location(&location_at(root), &options, Local::now());

        let entry = &result.directories_found[0];
        assert_eq!(entry.file_count, 5);
        assert!(entry.recent_activity);
        assert_eq!(entry.most_recent_file.as_deref(), Some("hourly.tar"));

        // last_modified is the newest file's mtime, not the oldest's
        let newest = fs::metadata(root.join("hourly.tar"))
            .unwrap()
            .modified()
            .unwrap();
        assert_eq!(entry.last_modified, DateTime::<Local>::from(newest));
    }

    #[test]
    fn old_files_alone_are_stale() {
        use std::time::{Duration as StdDuration, SystemTime};

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stale.tar");
        File::create(&path).unwrap().write_all(b"data").unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(SystemTime::now() - StdDuration::from_secs(30 * 24 * 60 * 60))
            .unwrap();

        let options = ScanOptions::new();
        let result = scan_location(&location_at(dir.path()), &options, Local::now());

        let entry = &result.directories_found[0];
        assert!(!entry.recent_activity);
        assert_eq!(entry.most_recent_file.as_deref(), Some("stale.tar"));
    }

    #[test]
    fn excluded_children_not_counted_by_parent() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("keep")).unwrap();
        fs::create_dir(root.join("skip")).unwrap();
        File::create(root.join("kept.tar"))
            .unwrap()
            .write_all(&vec![b'x'; 100])
            .unwrap();
        File::create(root.join("skipped.tar"))
            .unwrap()
            .write_all(&vec![b'y'; 100])
            .unwrap();

        let options = ScanOptions::new()
            .with_exclude(vec![root.join("skip"), root.join("skipped.tar")]);
        let result = scan_location(&location_at(root), &options, Local::now());

        // Excluded files and subdirectories are both invisible to the parent
        let root_entry = &result.directories_found[0];
        assert_eq!(root_entry.subdirectory_count, 1);
        assert_eq!(root_entry.file_count, 1);
        assert_eq!(root_entry.total_size, 100);
        assert!(!result
            .directories_found
            .iter()
            .any(|e| e.path == root.join("skip")));
    }

    #[test]
    fn empty_directory_uses_own_mtime() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();

        let options = ScanOptions::new();
        let result = scan_location(&location_at(dir.path()), &options, Local::now());

        let empty = result
            .directories_found
            .iter()
            .find(|e| e.path == dir.path().join("empty"))
            .unwrap();
        assert_eq!(empty.file_count, 0);
        assert!(empty.most_recent_file.is_none());
        // Freshly created, so its own mtime is within the window
        assert!(empty.recent_activity);
    }

    #[test]
    fn recency_follows_injected_clock() {
        let dir = create_test_location();
        let options = ScanOptions::new();

        // Files were just written, so they are recent against the real clock
        let fresh = scan_location(&location_at(dir.path()), &options, Local::now());
        assert!(fresh.directories_found.iter().all(|e| e.recent_activity));

        // Against a clock 30 days ahead the same files are stale
        let later = Local::now() + Duration::days(30);
        let stale = scan_location(&location_at(dir.path()), &options, later);
        assert!(stale.directories_found.iter().all(|e| !e.recent_activity));
    }

    #[test]
    fn scan_is_idempotent_with_fixed_clock() {
        let dir = create_test_location();
        let options = ScanOptions::new();
        let now = Local::now();

        let first = scan_location(&location_at(dir.path()), &options, now);
        let second = scan_location(&location_at(dir.path()), &options, now);

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn missing_root_reports_error() {
        let location = location_at(Path::new("/nonexistent/backup/12345"));
        let result = scan_location(&location, &ScanOptions::new(), Local::now());

        assert!(result.directories_found.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("/nonexistent/backup/12345"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_loop_terminates() {
        use std::os::unix::fs::symlink;

        let dir = create_test_location();
        symlink(dir.path(), dir.path().join("daily/loop")).unwrap();

        let options = ScanOptions::new().with_max_depth(10).with_max_dirs(1000);
        let result = scan_location(&location_at(dir.path()), &options, Local::now());

        // Terminates without revisiting: every entry path is unique
        let mut paths: Vec<_> = result
            .directories_found
            .iter()
            .map(|e| e.path.canonicalize().unwrap())
            .collect();
        let before = paths.len();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), before);
        assert!(!result.truncated);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_recorded_and_siblings_scanned() {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let locked = dir.path().join("locked");
        let open = dir.path().join("open");
        fs::create_dir(&locked).unwrap();
        fs::create_dir(&open).unwrap();
        File::create(open.join("dump.tar")).unwrap();

        fs::set_permissions(&locked, Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Running with elevated privileges, permissions are not enforced
            fs::set_permissions(&locked, Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let options = ScanOptions::new();
        let result = scan_location(&location_at(dir.path()), &options, Local::now());

        fs::set_permissions(&locked, Permissions::from_mode(0o755)).unwrap();

        assert!(result
            .errors
            .iter()
            .any(|e| e.contains(&locked.display().to_string())));
        assert!(!result
            .directories_found
            .iter()
            .any(|e| e.path == locked));
        let open_entry = result
            .directories_found
            .iter()
            .find(|e| e.path == open)
            .unwrap();
        assert_eq!(open_entry.file_count, 1);
    }
}
