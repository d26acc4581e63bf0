//! Environment variables and `.env` loading.

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable names.
pub mod vars {
    /// Writer configuration file read by the CLI.
    pub const VELLUM_CONFIG: &str = "VELLUM_CONFIG";
    /// Writer selected by the CLI when `--writer` is absent.
    pub const VELLUM_WRITER: &str = "VELLUM_WRITER";
    /// Deployment name; selects an extra `.env.<name>` file.
    pub const VELLUM_ENV: &str = "VELLUM_ENV";
}

/// Load `.env` files from the working directory.
///
/// See [`load_dotenv_in`].
pub fn load_dotenv() -> Vec<PathBuf> {
    load_dotenv_in(Path::new("."))
}

/// Load `.env.local`, `.env.<VELLUM_ENV>` and `.env` from `dir`, returning
/// the files that were applied.
///
/// Variables already set are never replaced, so the process environment
/// beats every file and earlier files beat later ones.
pub fn load_dotenv_in(dir: &Path) -> Vec<PathBuf> {
    let mut names = vec![".env.local".to_string()];
    if let Ok(name) = env::var(vars::VELLUM_ENV) {
        names.push(format!(".env.{name}"));
    }
    names.push(".env".to_string());

    names
        .into_iter()
        .map(|name| dir.join(name))
        .filter(|path| dotenvy::from_path(path).is_ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_local_file_beats_env_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".env"),
            "VELLUM_TEST_DOTENV_SHARED=from_env\nVELLUM_TEST_DOTENV_BASE=base\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(".env.local"),
            "VELLUM_TEST_DOTENV_SHARED=from_local\n",
        )
        .unwrap();

        let loaded = load_dotenv_in(dir.path());
        assert_eq!(
            loaded,
            vec![dir.path().join(".env.local"), dir.path().join(".env")]
        );
        assert_eq!(env::var("VELLUM_TEST_DOTENV_SHARED").unwrap(), "from_local");
        assert_eq!(env::var("VELLUM_TEST_DOTENV_BASE").unwrap(), "base");
    }

    #[test]
    fn test_process_env_is_kept() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".env"), "VELLUM_TEST_DOTENV_KEPT=from_file\n").unwrap();
        env::set_var("VELLUM_TEST_DOTENV_KEPT", "from_process");

        load_dotenv_in(dir.path());
        assert_eq!(env::var("VELLUM_TEST_DOTENV_KEPT").unwrap(), "from_process");
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        assert!(load_dotenv_in(dir.path()).is_empty());
    }
}
