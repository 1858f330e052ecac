//! Environment-driven configuration
//!
//! The backend is picked from whichever provider key is present, in a
//! fixed priority order: `GROQ_API_KEY` first, then `OPENAI_API_KEY`.
//! A missing key is not an error; the crew still starts and the first
//! model call fails instead.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::llm::{
    LlmProvider, LlmResult, OpenAiCompatibleProvider, ProviderConfig, ProviderKind,
};

pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL_NAME: &str = "OPENAI_MODEL_NAME";
pub const SERPER_API_KEY: &str = "SERPER_API_KEY";
pub const CREW_SOURCE_DIR: &str = "CREW_SOURCE_DIR";
pub const CREW_VERBOSE: &str = "CREW_VERBOSE";

pub const GROQ_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_SOURCE_DIR: &str = "../src";

/// Which LLM backend the agents talk to
#[derive(Clone, PartialEq, Eq)]
pub enum LlmBackend {
    Groq { api_key: String, model: String },
    OpenAi { api_key: String, model: String },
    Unconfigured,
}

impl LlmBackend {
    pub fn model(&self) -> &str {
        match self {
            LlmBackend::Groq { model, .. } | LlmBackend::OpenAi { model, .. } => model,
            LlmBackend::Unconfigured => DEFAULT_OPENAI_MODEL,
        }
    }
}

// Keys stay out of logs
impl std::fmt::Debug for LlmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmBackend::Groq { model, .. } => write!(f, "Groq({})", model),
            LlmBackend::OpenAi { model, .. } => write!(f, "OpenAi({})", model),
            LlmBackend::Unconfigured => write!(f, "Unconfigured"),
        }
    }
}

/// Runtime settings for the crew
#[derive(Clone)]
pub struct Settings {
    pub backend: LlmBackend,
    pub serper_api_key: Option<String>,
    pub source_dir: PathBuf,
    pub verbose: bool,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("backend", &self.backend)
            .field("search_enabled", &self.search_enabled())
            .field("source_dir", &self.source_dir)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup
    ///
    /// Empty values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = if let Some(api_key) = get(GROQ_API_KEY) {
            LlmBackend::Groq {
                api_key,
                model: GROQ_MODEL.to_string(),
            }
        } else if let Some(api_key) = get(OPENAI_API_KEY) {
            LlmBackend::OpenAi {
                api_key,
                model: get(OPENAI_MODEL_NAME).unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            }
        } else {
            LlmBackend::Unconfigured
        };

        let verbose = get(CREW_VERBOSE)
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        Self {
            backend,
            serper_api_key: get(SERPER_API_KEY),
            source_dir: get(CREW_SOURCE_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIR)),
            verbose,
        }
    }

    /// Banner describing the selected backend
    pub fn announce(&self) -> &'static str {
        match self.backend {
            LlmBackend::Groq { .. } => "Using Groq API for Agents",
            LlmBackend::OpenAi { .. } => "Using OpenAI API for Agents",
            LlmBackend::Unconfigured => {
                "WARNING: No GROQ_API_KEY or OPENAI_API_KEY found in .env. Please set one."
            }
        }
    }

    pub fn search_enabled(&self) -> bool {
        self.serper_api_key.is_some()
    }

    /// Provider configuration for the selected backend
    ///
    /// An unconfigured backend falls back to OpenAI without a key, so
    /// setup succeeds and the first request reports the missing key.
    pub fn provider_config(&self) -> ProviderConfig {
        match &self.backend {
            LlmBackend::Groq { api_key, model } => {
                ProviderConfig::new(ProviderKind::Groq, Some(api_key.clone()), model.clone())
            }
            LlmBackend::OpenAi { api_key, model } => {
                ProviderConfig::new(ProviderKind::OpenAi, Some(api_key.clone()), model.clone())
            }
            LlmBackend::Unconfigured => {
                ProviderConfig::new(ProviderKind::OpenAi, None, DEFAULT_OPENAI_MODEL)
            }
        }
    }

    pub fn build_provider(&self) -> LlmResult<Arc<dyn LlmProvider>> {
        let provider = OpenAiCompatibleProvider::new(self.provider_config())?;
        Ok(Arc::new(provider))
    }
}

/// `.env` file beside `executable`, if there is one
pub fn env_file_beside(executable: &Path) -> Option<PathBuf> {
    let candidate = executable.parent()?.join(".env");
    candidate.is_file().then_some(candidate)
}

/// Load `.env` into the process environment
///
/// A file next to the executable wins; otherwise the working directory
/// and its parents are searched. Returns the file that was loaded.
pub fn load_dotenv() -> Option<PathBuf> {
    let beside = std::env::current_exe()
        .ok()
        .and_then(|exe| env_file_beside(&exe));

    match beside {
        Some(path) => dotenv::from_path(&path).ok().map(|_| path),
        None => dotenv::dotenv().ok(),
    }
}
