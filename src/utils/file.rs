use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Checks if a file exists at the given path
pub fn file_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

/// Read a text file, replacing invalid UTF-8 sequences instead of failing
pub fn read_lossy(path: impl AsRef<Path>) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}

/// `path` with `suffix` appended to its full file name (`a.yaml` -> `a.yaml.backup`)
pub fn append_to_file_name(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// `path` with `suffix` inserted before its extension (`a.yaml` -> `a_fixed.yaml`)
///
/// Paths without an extension get `.yaml` appended after the suffix.
pub fn insert_before_extension(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}.yaml", stem, suffix),
    };
    path.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_to_file_name() {
        assert_eq!(
            append_to_file_name(Path::new("conf/x509_no_fix.yaml"), ".backup"),
            PathBuf::from("conf/x509_no_fix.yaml.backup")
        );
    }

    #[test]
    fn test_insert_before_extension() {
        assert_eq!(
            insert_before_extension(Path::new("conf/clash.yml"), "_fixed"),
            PathBuf::from("conf/clash_fixed.yml")
        );
        assert_eq!(
            insert_before_extension(Path::new("profile"), "_fixed"),
            PathBuf::from("profile_fixed.yaml")
        );
    }
}
