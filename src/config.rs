use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The name of the optional project file.
pub const PROJECT_FILE: &str = "xmldoc-site.yaml";

const DEFAULT_TEMPLATE_DIRECTORY: &str = "BaseTemplate";
const STATIC_SUBDIRECTORY: &str = "Clone";
const DEFAULT_OUTPUT_DIRECTORY: &str = "site";

/// The contents of a project file. Every field is optional; relative paths
/// are resolved against the directory holding the project file.
#[derive(Deserialize)]
struct Project {
    #[serde(default)]
    template_directory: Option<PathBuf>,

    #[serde(default)]
    default_template_directory: Option<PathBuf>,

    #[serde(default)]
    static_directory: Option<PathBuf>,

    #[serde(default)]
    output_directory: Option<PathBuf>,
}

/// Settings for one site build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Site-specific templates. A template found here replaces the default
    /// template of the same name.
    pub template_directory: Option<PathBuf>,

    /// The shared default templates.
    pub default_template_directory: PathBuf,

    /// Files copied into the output root after the pages are written.
    pub static_directory: PathBuf,

    /// The root of the generated site.
    pub output_directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let default_template_directory = PathBuf::from(DEFAULT_TEMPLATE_DIRECTORY);
        Config {
            template_directory: None,
            static_directory: default_template_directory.join(STATIC_SUBDIRECTORY),
            default_template_directory,
            output_directory: PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
        }
    }
}

/// Command-line values that take precedence over the project file.
#[derive(Default)]
pub struct Overrides {
    pub template_directory: Option<PathBuf>,
    pub default_template_directory: Option<PathBuf>,
    pub static_directory: Option<PathBuf>,
    pub output_directory: Option<PathBuf>,
}

impl Config {
    /// Looks for a project file in `dir` and then in each of its ancestors.
    pub fn find_project_file(dir: &Path) -> Option<PathBuf> {
        let path = dir.join(PROJECT_FILE);
        if path.is_file() {
            Some(path)
        } else {
            dir.parent().and_then(Config::find_project_file)
        }
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path)
            .map_err(|e| anyhow!("Opening project file `{}`: {}", path.display(), e))?;
        let project: Project = serde_yaml::from_reader(file)
            .map_err(|e| anyhow!("Loading configuration `{}`: {}", path.display(), e))?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;
        Ok(Config::from_project(project, project_root))
    }

    fn from_project(project: Project, project_root: &Path) -> Config {
        let default_template_directory = project_root.join(
            project
                .default_template_directory
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE_DIRECTORY)),
        );
        Config {
            template_directory: project.template_directory.map(|d| project_root.join(d)),
            static_directory: match project.static_directory {
                Some(dir) => project_root.join(dir),
                None => default_template_directory.join(STATIC_SUBDIRECTORY),
            },
            default_template_directory,
            output_directory: project_root.join(
                project
                    .output_directory
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIRECTORY)),
            ),
        }
    }

    /// Applies command-line values. Overriding the default template directory
    /// also moves the static directory along with it unless the static
    /// directory was given explicitly.
    pub fn with_overrides(mut self, overrides: Overrides) -> Config {
        if let Some(dir) = overrides.default_template_directory {
            if overrides.static_directory.is_none() {
                self.static_directory = dir.join(STATIC_SUBDIRECTORY);
            }
            self.default_template_directory = dir;
        }
        if let Some(dir) = overrides.template_directory {
            self.template_directory = Some(dir);
        }
        if let Some(dir) = overrides.static_directory {
            self.static_directory = dir;
        }
        if let Some(dir) = overrides.output_directory {
            self.output_directory = dir;
        }
        self
    }
}
