//! Run configuration: input/output directories and the persona/job pair.
//!
//! Nothing here reads process state on its own except the explicit
//! `from_process_env` / `detect` constructors meant for the binary edge.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_PERSONA: &str = "Research Analyst";
pub const DEFAULT_JOB: &str = "Extract key insights and methodologies from technical documents";

/// Optional config file looked up in the input directory.
pub const CONFIG_FILE_NAME: &str = "persona_config.json";

pub const PERSONA_ENV: &str = "PERSONA";
pub const JOB_ENV: &str = "JOB_TO_BE_DONE";

/// Directories used when running inside the container sandbox.
pub const SANDBOX_INPUT_DIR: &str = "/app/input";
pub const SANDBOX_OUTPUT_DIR: &str = "/app/output";

/// Input and output directories for a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Directories {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }

    /// Sandbox pair if `/app/input` exists, else relative `input` / `output`.
    pub fn detect() -> Self {
        Self::detect_from(Path::new(SANDBOX_INPUT_DIR), Path::new(SANDBOX_OUTPUT_DIR))
    }

    /// Prefer the given sandbox pair when its input directory exists.
    pub fn detect_from(sandbox_input: &Path, sandbox_output: &Path) -> Self {
        if sandbox_input.exists() {
            Self::new(sandbox_input, sandbox_output)
        } else {
            Self::new("input", "output")
        }
    }

    /// Path of the optional persona config file.
    pub fn config_file(&self) -> PathBuf {
        self.input.join(CONFIG_FILE_NAME)
    }
}

/// Resolved persona and job description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaConfig {
    pub persona: String,
    pub job: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            job: DEFAULT_JOB.to_string(),
        }
    }
}

/// Contents of `persona_config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersonaFile {
    #[serde(default)]
    pub persona: Option<String>,
    #[serde(default)]
    pub job_to_be_done: Option<String>,
}

impl PersonaFile {
    /// Load the config file; a missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let file = serde_json::from_str(&data)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(Some(file))
    }
}

/// Every place a persona or job may come from, in precedence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonaSources {
    pub file: Option<PersonaFile>,
    pub env_persona: Option<String>,
    pub env_job: Option<String>,
    /// Positional arguments: persona, then job
    pub args: Vec<String>,
}

impl PersonaSources {
    /// Gather sources from the config file in `dirs`, the process environment and `args`.
    ///
    /// An unreadable config file is logged and treated as absent.
    pub fn from_process_env(dirs: &Directories, args: Vec<String>) -> Self {
        let path = dirs.config_file();
        let file = match PersonaFile::load(&path) {
            Ok(Some(file)) => {
                log::info!("Loaded persona config from {}", path.display());
                Some(file)
            }
            Ok(None) => None,
            Err(e) => {
                log::error!("Error reading config file: {}", e);
                None
            }
        };

        Self {
            file,
            env_persona: std::env::var(PERSONA_ENV).ok(),
            env_job: std::env::var(JOB_ENV).ok(),
            args,
        }
    }

    pub fn with_file(mut self, file: PersonaFile) -> Self {
        self.file = Some(file);
        self
    }

    pub fn with_env(mut self, persona: Option<&str>, job: Option<&str>) -> Self {
        self.env_persona = persona.map(str::to_string);
        self.env_job = job.map(str::to_string);
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Resolve each field independently: file, environment, arguments, default.
    pub fn resolve(&self) -> PersonaConfig {
        let file = self.file.as_ref();

        let persona = first_non_empty([
            file.and_then(|f| f.persona.as_deref()),
            self.env_persona.as_deref(),
            self.args.first().map(String::as_str),
        ])
        .unwrap_or(DEFAULT_PERSONA);

        let job = first_non_empty([
            file.and_then(|f| f.job_to_be_done.as_deref()),
            self.env_job.as_deref(),
            self.args.get(1).map(String::as_str),
        ])
        .unwrap_or(DEFAULT_JOB);

        PersonaConfig {
            persona: persona.to_string(),
            job: job.to_string(),
        }
    }
}

fn first_non_empty<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<&'a str> {
    candidates.into_iter().flatten().find(|s| !s.is_empty())
}
