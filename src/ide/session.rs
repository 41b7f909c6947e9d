//! Per-session solver settings and the solver command line they imply.
//!
//! The engine never runs the solver; an adapter takes the [`SolverCommand`]
//! and executes it however its host does.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Solver preferences for one editing session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Solver id passed as `--solver`; the driver's default when unset.
    pub solver: Option<SmolStr>,
    /// Driver executable.
    pub solver_program: String,
    /// Arguments placed before the model file.
    pub extra_args: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            solver: None,
            solver_program: "minizinc".to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl SessionConfig {
    pub fn with_solver(mut self, solver: impl Into<SmolStr>) -> Self {
        self.solver = Some(solver.into());
        self
    }

    /// Command line that solves `model` under this session's settings.
    pub fn command(&self, model: impl AsRef<Path>) -> SolverCommand {
        let mut args = Vec::new();
        if let Some(solver) = &self.solver {
            args.push("--solver".to_string());
            args.push(solver.to_string());
        }
        args.extend(self.extra_args.iter().cloned());
        SolverCommand {
            program: self.solver_program.clone(),
            args,
            model: model.as_ref().to_path_buf(),
            data: Vec::new(),
        }
    }
}

/// A solver invocation as an argument vector, ready for an adapter to spawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverCommand {
    pub program: String,
    pub args: Vec<String>,
    pub model: PathBuf,
    /// `.dzn` data files following the model.
    pub data: Vec<PathBuf>,
}

impl SolverCommand {
    pub fn with_data(mut self, data: impl AsRef<Path>) -> Self {
        self.data.push(data.as_ref().to_path_buf());
        self
    }

    /// Program followed by every argument, in order.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .chain(std::iter::once(&self.model).chain(&self.data).map(|p| p.display().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_uses_driver_default_solver() {
        let command = SessionConfig::default().command("model.mzn");
        assert_eq!(command.argv(), vec!["minizinc", "model.mzn"]);
    }

    #[test]
    fn test_explicit_solver_and_data() {
        let session = SessionConfig {
            extra_args: vec!["--all-solutions".to_string()],
            ..SessionConfig::default()
        }
        .with_solver("gecode");
        let command = session.command("queens.mzn").with_data("n8.dzn");

        assert_eq!(
            command.argv(),
            vec!["minizinc", "--solver", "gecode", "--all-solutions", "queens.mzn", "n8.dzn"]
        );
    }
}
