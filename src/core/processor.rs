use crate::config::ProcessorConfig;
use crate::types::{InsarError, InsarResult};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Subprocess seam for the processor and the raster tools.
///
/// A non-zero exit must come back as `InsarError::Subprocess` carrying the
/// tool's status; the caller decides what the process exit code becomes.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> InsarResult<()>;
}

/// Runs commands with `std::process`, inheriting stdout/stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> InsarResult<()> {
        log::debug!("Running in {}: {} {}", cwd.display(), program, args.join(" "));

        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .status()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    InsarError::Io(std::io::Error::new(e.kind(), format!("{} not found on PATH", program)))
                } else {
                    InsarError::Io(e)
                }
            })?;

        if status.success() {
            return Ok(());
        }

        // Killed by a signal: no status code, report a generic failure
        let code = status.code().unwrap_or(1);
        log::error!("{} exited with status {}", program, code);
        Err(InsarError::Subprocess {
            program: program.to_string(),
            code,
        })
    }
}

/// Invokes ISCE `topsApp.py` on a rendered configuration
pub struct TopsAppProcessor<'a> {
    runner: &'a dyn CommandRunner,
    config: ProcessorConfig,
    work_dir: PathBuf,
}

impl<'a> TopsAppProcessor<'a> {
    pub fn new<P: AsRef<Path>>(runner: &'a dyn CommandRunner, config: &ProcessorConfig, work_dir: P) -> Self {
        Self {
            runner,
            config: config.clone(),
            work_dir: work_dir.as_ref().to_path_buf(),
        }
    }

    pub fn arguments(&self, configuration_path: &Path) -> Vec<String> {
        vec![
            configuration_path.display().to_string(),
            format!("--end={}", self.config.end_step),
        ]
    }

    /// Process through geocoding. No retry: a partially processed run cannot
    /// be resumed safely.
    pub fn run(&self, configuration_path: &Path) -> InsarResult<()> {
        log::info!("Running {} on {}", self.config.topsapp, configuration_path.display());
        self.runner
            .run(&self.config.topsapp, &self.arguments(configuration_path), &self.work_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRunner;

    #[test]
    fn stops_after_geocoding() {
        let runner = MockRunner::new();
        let processor = TopsAppProcessor::new(&runner, &ProcessorConfig::default(), "/work");
        processor.run(Path::new("/work/topsApp.xml")).unwrap();

        let commands = runner.commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].program, "topsApp.py");
        assert_eq!(commands[0].args, vec!["/work/topsApp.xml", "--end=geocode"]);
        assert_eq!(commands[0].cwd, PathBuf::from("/work"));
    }

    #[test]
    fn failure_keeps_exit_status() {
        let runner = MockRunner::new();
        runner.fail_on("topsApp.py", 2);
        let processor = TopsAppProcessor::new(&runner, &ProcessorConfig::default(), "/work");

        let err = processor.run(Path::new("topsApp.xml")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let err = SystemRunner
            .run("sh", &["-c".to_string(), "exit 3".to_string()], dir.path())
            .unwrap_err();
        assert!(matches!(err, InsarError::Subprocess { code: 3, .. }));

        assert!(SystemRunner.run("true", &[], dir.path()).is_ok());
    }

    #[test]
    fn missing_program_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SystemRunner
            .run("definitely-not-a-real-tool-xyz", &[], dir.path())
            .unwrap_err();
        assert!(matches!(err, InsarError::Io(_)));
    }
}
