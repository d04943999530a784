//! `docker compose` backed orchestrator.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::Orchestrator;

/// Runs workers through `docker compose -f <file>... up -d` / `down`.
///
/// Variables set through [`Orchestrator::set_var`] are added to the
/// inherited process environment of each compose invocation.
#[derive(Debug, Clone)]
pub struct ComposeOrchestrator {
    program: String,
    compose_files: Vec<PathBuf>,
    vars: BTreeMap<String, String>,
}

impl ComposeOrchestrator {
    pub fn new(compose_files: Vec<PathBuf>) -> Self {
        Self {
            program: "docker".to_string(),
            compose_files,
            vars: BTreeMap::new(),
        }
    }

    /// Use a different executable in place of `docker` (for testing).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Arguments for `<program> compose -f a -f b <command> <post_args>`.
    pub fn compose_args(&self, command: &str, post_args: &[&str]) -> Vec<String> {
        let mut args = vec!["compose".to_string()];
        for file in &self.compose_files {
            args.push("-f".to_string());
            args.push(file.display().to_string());
        }
        args.push(command.to_string());
        args.extend(post_args.iter().map(|a| a.to_string()));
        args
    }

    /// Run one compose command.
    ///
    /// Failing to spawn is an error. A non-zero exit is only logged: the
    /// availability gate notices workers that never came up.
    async fn run(&self, command: &str, post_args: &[&str]) -> Result<()> {
        let args = self.compose_args(command, post_args);
        debug!(program = %self.program, ?args, "running compose");

        let output = Command::new(&self.program)
            .args(&args)
            .envs(&self.vars)
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| {
                format!("Failed to execute '{}'. Is Docker installed?", self.program)
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            error!(
                command,
                code,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "error bringing {command} the compose files"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl Orchestrator for ComposeOrchestrator {
    fn set_var(&mut self, key: &str, value: String) {
        self.vars.insert(key.to_string(), value);
    }

    async fn start(&mut self) -> Result<()> {
        info!(pipelines = ?self.var(crate::PIPELINE_COUNT_KEY), "compose up");
        self.run("up", &["-d"]).await
    }

    async fn stop(&mut self) -> Result<()> {
        info!("compose down");
        self.run("down", &[]).await
    }
}
