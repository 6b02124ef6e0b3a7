//! Environment Configurator: the explicit environment handed to every child.
//!
//! Nothing is inherited from the runner's own environment. The map is built
//! once per invocation and passed to each spawn.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::{
    error::Error,
    executor::{LanguageExecutor, ToolchainContext},
    types::ExecutionSpec,
    Result,
};

/// Fixed search path; toolchain directories are appended per language
pub const BASE_SEARCH_PATH: &str = "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";

/// Variables a caller can never override
pub const PROTECTED_VARS: [&str; 3] = ["PATH", "HOME", "TMPDIR"];

/// Scratch subdirectories created under the working directory
pub const SCRATCH_DIRS: [&str; 2] = ["tmp", "outputs"];

pub(crate) fn search_path_for(executor: &dyn LanguageExecutor) -> String {
    let mut path = BASE_SEARCH_PATH.to_string();
    for extra in executor.search_paths() {
        path.push(':');
        path.push_str(extra);
    }
    path
}

#[derive(Debug, Clone)]
pub struct SandboxEnvironment {
    workdir: PathBuf,
    vars: BTreeMap<String, String>,
}

impl SandboxEnvironment {
    /// Compute the environment for `spec` without touching the filesystem.
    pub fn build(spec: &ExecutionSpec, executor: &dyn LanguageExecutor, workdir: &Path) -> Self {
        let tmp_dir = workdir.join("tmp");
        let ctx = ToolchainContext {
            workdir,
            tmp_dir: &tmp_dir,
            limits: spec.limits(),
        };

        let mut vars: BTreeMap<String, String> = executor.environment(&ctx).into_iter().collect();

        for (name, value) in spec.env() {
            if PROTECTED_VARS.contains(&name.as_str()) {
                warn!(variable = %name, "Ignoring caller override of protected variable");
                continue;
            }
            vars.insert(name.clone(), value.clone());
        }

        vars.insert("PATH".to_string(), search_path_for(executor));
        vars.insert("HOME".to_string(), workdir.to_string_lossy().into_owned());
        vars.insert("TMPDIR".to_string(), tmp_dir.to_string_lossy().into_owned());

        Self {
            workdir: workdir.to_path_buf(),
            vars,
        }
    }

    /// Build the environment and create the scratch directories it refers to.
    pub async fn prepare(
        spec: &ExecutionSpec,
        executor: &dyn LanguageExecutor,
        workdir: &Path,
    ) -> Result<Self> {
        let env = Self::build(spec, executor, workdir);
        env.create_scratch_dirs().await?;
        Ok(env)
    }

    async fn create_scratch_dirs(&self) -> Result<()> {
        for dir in SCRATCH_DIRS {
            let path = self.workdir.join(dir);
            fs::create_dir_all(&path).await.map_err(|e| {
                Error::infra(format!("Failed to create {} directory: {}", dir, e))
            })?;
        }
        debug!("Sandbox directories ready under {}", self.workdir.display());
        Ok(())
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.workdir.join("tmp")
    }

    pub fn outputs_dir(&self) -> PathBuf {
        self.workdir.join("outputs")
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn search_path(&self) -> &str {
        self.get("PATH").unwrap_or(BASE_SEARCH_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{languages::executor_for, spec::SpecLoader, types::Language};
    use tempfile::tempdir;

    fn spec(json: &str) -> ExecutionSpec {
        SpecLoader::new("/work").parse(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_base_variables() {
        let spec = spec(r#"{"language": "python", "code": "pass"}"#);
        let executor = executor_for(Language::Python);
        let env = SandboxEnvironment::build(&spec, executor.as_ref(), Path::new("/work"));

        assert_eq!(env.get("HOME"), Some("/work"));
        assert_eq!(env.get("TMPDIR"), Some("/work/tmp"));
        assert_eq!(env.search_path(), BASE_SEARCH_PATH);
        assert_eq!(env.get("PYTHONUNBUFFERED"), Some("1"));
    }

    #[test]
    fn test_caller_cannot_override_protected_vars() {
        let spec = spec(
            r#"{"language": "python", "code": "pass",
                "env": {"PATH": "/evil", "HOME": "/root", "GREETING": "hi"}}"#,
        );
        let executor = executor_for(Language::Python);
        let env = SandboxEnvironment::build(&spec, executor.as_ref(), Path::new("/work"));

        assert_eq!(env.search_path(), BASE_SEARCH_PATH);
        assert_eq!(env.get("HOME"), Some("/work"));
        assert_eq!(env.get("GREETING"), Some("hi"));
    }

    #[test]
    fn test_caller_may_override_toolchain_defaults() {
        let spec = spec(r#"{"language": "go", "code": "x", "env": {"GOGC": "100"}}"#);
        let executor = executor_for(Language::Go);
        let env = SandboxEnvironment::build(&spec, executor.as_ref(), Path::new("/work"));

        assert_eq!(env.get("GOGC"), Some("100"));
        assert_eq!(env.get("GOCACHE"), Some("/work/tmp/go-cache"));
        assert!(env.search_path().ends_with(":/usr/local/go/bin"));
    }

    #[test]
    fn test_host_environment_is_not_inherited() {
        std::env::set_var("CODE_EXEC_HOST_ONLY", "leak");
        let spec = spec(r#"{"language": "ruby", "code": "puts 1"}"#);
        let executor = executor_for(Language::Ruby);
        let env = SandboxEnvironment::build(&spec, executor.as_ref(), Path::new("/work"));

        assert!(env.get("CODE_EXEC_HOST_ONLY").is_none());
    }

    #[tokio::test]
    async fn test_prepare_creates_scratch_dirs() -> Result<()> {
        let dir = tempdir()?;
        let spec = spec(r#"{"language": "python", "code": "pass"}"#);
        let executor = executor_for(Language::Python);
        let env = SandboxEnvironment::prepare(&spec, executor.as_ref(), dir.path()).await?;

        assert!(env.tmp_dir().is_dir());
        assert!(env.outputs_dir().is_dir());
        Ok(())
    }

    #[tokio::test]
    async fn test_prepare_fails_on_unwritable_root() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let spec = spec(r#"{"language": "python", "code": "pass"}"#);
        let executor = executor_for(Language::Python);
        let err = SandboxEnvironment::prepare(&spec, executor.as_ref(), &blocker)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Infrastructure(_)));
    }
}
