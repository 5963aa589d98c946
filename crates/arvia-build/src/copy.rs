//! Recursive directory mirroring.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// I/O failure while mirroring a tree, tagged with the offending path.
#[derive(Debug, thiserror::Error)]
#[error("{}: {source}", path.display())]
pub struct CopyError {
    /// Path that could not be read, created or written.
    pub path: PathBuf,
    /// Underlying I/O error.
    #[source]
    pub source: io::Error,
}

impl CopyError {
    fn new(path: &Path, source: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Mirror `src` into `dst`.
///
/// Directories are created with the permission bits of their source
/// counterpart, files are copied byte-for-byte. Returns the number of files
/// copied.
///
/// If `dst` lies inside `src` it is skipped while walking, so building into
/// a subdirectory of the source tree does not recurse into its own output.
pub(crate) fn copy_dir(src: &Path, dst: &Path) -> Result<usize, CopyError> {
    fs::create_dir_all(dst).map_err(|e| CopyError::new(dst, e))?;
    let skip = dst.canonicalize().map_err(|e| CopyError::new(dst, e))?;

    let mut copied = 0;
    mirror(src, dst, &skip, &mut copied)?;
    Ok(copied)
}

fn mirror(src: &Path, dst: &Path, skip: &Path, copied: &mut usize) -> Result<(), CopyError> {
    let metadata = fs::metadata(src).map_err(|e| CopyError::new(src, e))?;
    fs::create_dir_all(dst).map_err(|e| CopyError::new(dst, e))?;

    let mut entries = fs::read_dir(src)
        .map_err(|e| CopyError::new(src, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CopyError::new(src, e))?;
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        let path = entry.path();
        let target = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| CopyError::new(&path, e))?;

        if file_type.is_dir() {
            if path.canonicalize().is_ok_and(|p| p == skip) {
                tracing::debug!(path = %path.display(), "Skipping output directory");
                continue;
            }
            mirror(&path, &target, skip, copied)?;
        } else {
            copy_file(&path, &target)?;
            *copied += 1;
        }
    }

    // Applied last so read-only source directories can still be filled.
    fs::set_permissions(dst, metadata.permissions()).map_err(|e| CopyError::new(dst, e))?;
    Ok(())
}

fn copy_file(src: &Path, dst: &Path) -> Result<(), CopyError> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| CopyError::new(parent, e))?;
    }
    fs::copy(src, dst).map_err(|e| CopyError::new(src, e))?;
    tracing::trace!(from = %src.display(), to = %dst.display(), "Copied file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_copy_dir_nested() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("blog/2024")).unwrap();
        fs::write(src.join("index.html"), "<p>home</p>").unwrap();
        fs::write(src.join("blog/2024/post.html"), "<p>post</p>").unwrap();

        let dst = temp.path().join("out");
        let copied = copy_dir(&src, &dst).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(dst.join("index.html")).unwrap(), "<p>home</p>");
        assert_eq!(
            fs::read_to_string(dst.join("blog/2024/post.html")).unwrap(),
            "<p>post</p>"
        );
    }

    #[test]
    fn test_copy_dir_keeps_empty_directories() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("empty")).unwrap();

        let dst = temp.path().join("out");
        assert_eq!(copy_dir(&src, &dst).unwrap(), 0);
        assert!(dst.join("empty").is_dir());
    }

    #[test]
    fn test_copy_dir_binary_content_verbatim() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        let bytes: Vec<u8> = (0..=255).collect();
        fs::write(src.join("logo.png"), &bytes).unwrap();

        let dst = temp.path().join("out");
        copy_dir(&src, &dst).unwrap();

        assert_eq!(fs::read(dst.join("logo.png")).unwrap(), bytes);
    }

    #[test]
    fn test_copy_dir_skips_output_inside_source() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().to_path_buf();
        fs::write(src.join("index.html"), "x").unwrap();

        let dst = src.join("dist");
        let copied = copy_dir(&src, &dst).unwrap();

        assert_eq!(copied, 1);
        assert!(dst.join("index.html").is_file());
        assert!(!dst.join("dist").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_dir_preserves_directory_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        let private = src.join("private");
        fs::create_dir_all(&private).unwrap();
        fs::write(private.join("a.txt"), "a").unwrap();
        fs::set_permissions(&private, fs::Permissions::from_mode(0o700)).unwrap();

        let dst = temp.path().join("out");
        copy_dir(&src, &dst).unwrap();

        let mode = fs::metadata(dst.join("private")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
        assert!(dst.join("private/a.txt").is_file());
    }

    #[test]
    fn test_copy_dir_missing_source() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("missing");

        let err = copy_dir(&src, &temp.path().join("out")).unwrap_err();
        assert_eq!(err.path, src);
        assert_eq!(err.source.kind(), io::ErrorKind::NotFound);
    }
}
