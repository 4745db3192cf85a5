//! Timestamped artifact names.
//!
//! Every name handed out by this process carries a distinct
//! `<epoch-millis>`: when two captures land in the same millisecond the
//! second one is bumped forward.

use std::sync::atomic::{AtomicI64, Ordering};

static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Wall-clock milliseconds, strictly increasing within the process.
pub fn unique_millis() -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    let mut last = LAST_MILLIS.load(Ordering::Relaxed);

    loop {
        let next = now.max(last + 1);
        match LAST_MILLIS.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(current) => last = current,
        }
    }
}

/// `<kind>_<epoch-millis>.<ext>`, e.g. `screenshot_1718000000000.png`.
pub fn artifact_file_name(kind: &str, extension: &str) -> String {
    format!("{}_{}.{}", kind, unique_millis(), extension)
}

/// `<epoch-millis>_<original-name>` for staged uploads.
pub fn staged_file_name(original_name: &str) -> String {
    format!("{}_{}", unique_millis(), original_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_millis_are_strictly_increasing() {
        let values: Vec<i64> = (0..1000).map(|_| unique_millis()).collect();
        assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_names_are_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    (0..200)
                        .map(|_| artifact_file_name("audio", "webm"))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for name in handle.join().unwrap() {
                assert!(seen.insert(name));
            }
        }
        assert_eq!(seen.len(), 800);
    }

    #[test]
    fn test_name_layouts() {
        let artifact = artifact_file_name("screenshot", "png");
        let millis = artifact
            .strip_prefix("screenshot_")
            .and_then(|rest| rest.strip_suffix(".png"))
            .unwrap();
        assert!(millis.parse::<i64>().is_ok());

        let staged = staged_file_name("notes.py");
        let (prefix, name) = staged.split_once('_').unwrap();
        assert!(prefix.parse::<i64>().is_ok());
        assert_eq!(name, "notes.py");
    }
}
