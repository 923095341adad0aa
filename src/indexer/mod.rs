//! The index engine: traversal driver, symbol data management and lifecycle.

pub mod manager;
pub mod partition;
pub mod resolver;
pub mod symbol_data;
pub mod visitor;

pub use visitor::visit_program;

use crate::error::{LsifscopeError, Result};
use crate::paths;
use crate::semantics::SemanticOracle;
use crate::symbols::Symbols;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IndexerOptions {
    /// Absolute root of the indexed project.
    pub project_root: String,
    /// Suppress file contents on document vertices.
    #[serde(default)]
    pub no_contents: bool,
    #[serde(default)]
    pub root_dir: Option<String>,
    #[serde(default)]
    pub out_dir: Option<String>,
    /// Base for resolving relative `root_dir`/`out_dir` values.
    #[serde(default)]
    pub config_file: Option<String>,
    #[serde(default)]
    pub dependent_projects: Vec<DependentProject>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DependentProject {
    pub root_dir: String,
    pub out_dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectResult {
    pub root_dir: String,
    pub out_dir: String,
}

/// Resolved directory layout of the project under indexing.
pub(crate) struct ProjectPaths {
    project_root: String,
    root_dir: String,
    out_dir: String,
    dependent_out_dirs: Vec<String>,
}

impl ProjectPaths {
    pub fn resolve(options: &IndexerOptions, oracle: &dyn SemanticOracle) -> Result<Self> {
        if !options.project_root.starts_with('/') {
            return Err(LsifscopeError::Configuration(format!(
                "projectRoot must be absolute, got `{}`",
                options.project_root
            )));
        }
        let base = options
            .config_file
            .as_deref()
            .map(paths::dirname)
            .unwrap_or(options.project_root.as_str())
            .to_string();

        let root_dir = match &options.root_dir {
            Some(dir) => paths::resolve(&base, dir),
            None => {
                // Fall back to the longest common directory prefix of the
                // input files when the compiler options carry no root.
                let files: Vec<String> = oracle
                    .source_files()
                    .into_iter()
                    .map(|f| oracle.file_name(f))
                    .collect();
                paths::common_directory_prefix(&files)
                    .unwrap_or_else(|| options.project_root.clone())
            }
        };
        let out_dir = match &options.out_dir {
            Some(dir) => paths::resolve(&base, dir),
            None => root_dir.clone(),
        };
        let dependent_out_dirs = options
            .dependent_projects
            .iter()
            .map(|dep| paths::resolve(&base, &dep.out_dir))
            .collect();

        Ok(Self {
            project_root: options.project_root.clone(),
            root_dir,
            out_dir,
            dependent_out_dirs,
        })
    }

    /// Moniker path and external-library flag for one source file.
    pub fn moniker_path(&self, file: &str) -> (Option<String>, bool) {
        for dep_out in &self.dependent_out_dirs {
            if paths::is_under(dep_out, file) {
                return (paths::relative(&self.project_root, file), true);
            }
        }
        if paths::is_under(&self.root_dir, file) {
            let out_location = paths::to_out_location(file, &self.root_dir, &self.out_dir);
            return (paths::relative(&self.project_root, &out_location), false);
        }
        (None, false)
    }

    pub fn result(&self) -> ProjectResult {
        ProjectResult {
            root_dir: self.root_dir.clone(),
            out_dir: self.out_dir.clone(),
        }
    }
}

/// The semantic collaborators threaded through symbol-data creation.
pub(crate) struct SemanticContext<'a> {
    pub oracle: &'a dyn SemanticOracle,
    pub symbols: &'a mut Symbols,
    pub paths: &'a ProjectPaths,
}
