use std::path::PathBuf;

pub type TempDir = PathBuf;
pub type TempFile = PathBuf;

/// Writes a fixture file (a template body, a word list, a cookies.txt,
/// a form description) under the system temp directory and returns the
/// directory together with the file path. Callers clean up with
/// `defer!`; names are prefixed per test so parallel runs do not race.
pub fn create_file(name: &str, content: &str) -> (TempDir, TempFile) {
    let dir = std::env::temp_dir();
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write fixture file");

    (dir, path)
}
