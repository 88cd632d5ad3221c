use std::path::{Path, PathBuf};

use crate::cli::{Cli, OutputFormat};
use crate::config::{Config, PROJECT_CONFIG_FILE};
use crate::error::Result;

pub struct AppContext {
    /// Directory holding `docsearch.toml`, or the working directory
    pub project_root: PathBuf,
    pub config: Config,
    pub output_format: OutputFormat,
    pub quiet: bool,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let project_root = Self::find_project_root()?;
        let config = Config::load(cli.config.as_deref(), &project_root)?;
        tracing::debug!(root = %project_root.display(), "resolved project root");

        Ok(Self {
            project_root,
            config,
            output_format: cli.output_format(),
            quiet: cli.quiet,
        })
    }

    /// Whether to draw spinners and other decoration.
    #[must_use]
    pub const fn interactive(&self) -> bool {
        !self.quiet && self.output_format.use_colors()
    }

    /// Resolve a config-relative path against the project root.
    #[must_use]
    pub fn project_path(&self, path: &Path) -> PathBuf {
        self.project_root.join(path)
    }

    fn find_project_root() -> Result<PathBuf> {
        if let Ok(root) = std::env::var("DOCSEARCH_ROOT") {
            return Ok(PathBuf::from(root));
        }
        let cwd = std::env::current_dir()?;
        Ok(find_upwards(&cwd, PROJECT_CONFIG_FILE).unwrap_or(cwd))
    }
}

/// Nearest ancestor of `start` (inclusive) containing a file called `name`.
fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(name).is_file() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}
