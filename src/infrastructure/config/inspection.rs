//! 적용 설정 진단(inspection) 뷰 모델.

use serde::Serialize;

use super::loader::LoadedConfig;
use super::utils::command_exists;
use crate::application::config::ReplConfig;

#[derive(Debug, Clone, Serialize)]
pub struct ConfigInspection {
    pub searched_paths: Vec<String>,
    pub loaded_paths: Vec<String>,
    pub repl: ReplConfig,
    pub effective: EffectiveSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveSettings {
    pub prompt: String,
    pub history_limit: usize,
    pub completion_rows: usize,
    pub shell_program: String,
    pub shell_args: Vec<String>,
    pub shell_available: bool,
}

impl ConfigInspection {
    pub(crate) fn from_loaded(loaded: LoadedConfig) -> Self {
        let shell = loaded.config.shell.command_spec();

        Self {
            searched_paths: loaded
                .searched_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            loaded_paths: loaded
                .loaded_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            repl: loaded.config.repl.clone(),
            effective: EffectiveSettings {
                prompt: loaded.config.prompt(),
                history_limit: loaded.config.history_limit(),
                completion_rows: loaded.config.completion_rows(),
                shell_available: command_exists(&shell.program),
                shell_program: shell.program,
                shell_args: shell.args,
            },
        }
    }
}
