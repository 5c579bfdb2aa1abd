// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::PathBuf;

use miette::miette;

/// A file appender that never rolls over, at `path_str`.
///
/// Note that if you wrap this up in a non blocking writer, as shown below, it doesn't
/// work:
///
/// ```ignore
/// tracing_appender::non_blocking(try_create("foo")?);
/// ```
///
/// # Errors
///
/// Returns an error if `path_str` has no parent folder or no file name.
pub fn try_create(
    path_str: &str,
) -> miette::Result<tracing_appender::rolling::RollingFileAppender> {
    let path = PathBuf::from(&path_str);

    let parent = path.parent().ok_or_else(|| {
        miette!(
            "Can't access current folder {}. It might not exist, or don't have required permissions.",
            path.display()
        )
    })?;

    let file_stem = path.file_name().ok_or_else(|| {
        miette!(
            "Can't access file name {}. It might not exist, or don't have required permissions.",
            path.display()
        )
    })?;

    Ok(tracing_appender::rolling::never(parent, file_stem))
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_creates_file_in_folder() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("appender_test.log");
        let mut appender = try_create(file_path.to_str().unwrap()).unwrap();
        appender.write_all(b"hello\n").unwrap();
        appender.flush().unwrap();
        assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "hello\n");
    }

    #[test]
    fn test_rejects_path_without_file_name() {
        assert!(try_create("/").is_err());
    }
}
