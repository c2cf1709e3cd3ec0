//! File system loader
//!
//! Reads a directory laid out as
//!
//! ```text
//! <root>/
//!   pipelines/
//!     deploy_app.yaml
//!   input_sets/
//!     deploy_app/
//!       qa_values.yaml
//!       qa_hotfix.yaml        # overlayInputSet
//! ```
//!
//! into an [`InMemoryRepository`] for one project scope. Input-set
//! directories are keyed by pipeline identifier.

use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};
use tokio::fs;

use runform_core::ProjectScope;

use crate::error::{RepositoryError, RepositoryResult};
use crate::memory::InMemoryRepository;

const PIPELINES_DIR: &str = "pipelines";
const INPUT_SETS_DIR: &str = "input_sets";

/// Loader for a directory of pipelines and saved input sets
#[derive(Debug, Clone)]
pub struct FileSystemRepository {
    /// Root path of the repository
    root_path: PathBuf,
    /// Scope every loaded pipeline is registered under
    scope: ProjectScope,
}

impl FileSystemRepository {
    /// Create a loader for `root_path`
    ///
    /// # Example
    /// ```no_run
    /// use runform_core::ProjectScope;
    /// use runform_repository::FileSystemRepository;
    ///
    /// let loader = FileSystemRepository::new("repository", ProjectScope::default()).unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(root_path: P, scope: ProjectScope) -> RepositoryResult<Self> {
        let path = root_path.as_ref();

        if !path.exists() {
            return Err(RepositoryError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let abs_path = path
            .absolutize()
            .map_err(|e| RepositoryError::Other(format!("Failed to absolutize path: {}", e)))?
            .to_path_buf();

        Ok(Self {
            root_path: abs_path,
            scope,
        })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Read every pipeline and input set into a fresh repository
    pub async fn load(&self) -> RepositoryResult<InMemoryRepository> {
        let repo = InMemoryRepository::new();
        self.load_into(&repo).await?;
        Ok(repo)
    }

    /// Read every pipeline and input set into `repo`
    pub async fn load_into(&self, repo: &InMemoryRepository) -> RepositoryResult<()> {
        let pipelines_path = self.root_path.join(PIPELINES_DIR);
        let mut loaded = 0usize;

        for path in yaml_files(&pipelines_path).await? {
            let content = fs::read_to_string(&path).await?;
            let identifier = repo
                .insert_pipeline_yaml(&self.scope, &content)
                .await
                .map_err(|e| with_path(e, &path))?;

            let input_sets_path = self.root_path.join(INPUT_SETS_DIR).join(&identifier);
            for input_set_path in yaml_files(&input_sets_path).await? {
                let content = fs::read_to_string(&input_set_path).await?;
                repo.insert_input_set_yaml(&self.scope, &identifier, &content)
                    .await
                    .map_err(|e| with_path(e, &input_set_path))?;
            }
            loaded += 1;
        }

        tracing::info!(
            root = %self.root_path.display(),
            pipelines = loaded,
            "loaded pipelines from file system"
        );
        Ok(())
    }
}

fn with_path(err: RepositoryError, path: &Path) -> RepositoryError {
    match err {
        RepositoryError::Parser(message) => {
            RepositoryError::Parser(format!("{}: {}", path.display(), message))
        }
        other => other,
    }
}

/// `*.yaml` / `*.yml` files directly under `dir`, sorted; empty when `dir` is absent
async fn yaml_files(dir: &Path) -> RepositoryResult<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        if path.is_file() && is_yaml {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
