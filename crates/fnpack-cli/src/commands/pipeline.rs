use fnpack_build::artifacts::{self, ArtifactError, GeneratedArtifacts};
use fnpack_build::bundle::{self, BundleError};
use fnpack_build::{DockerfileGenerator, LauncherGenerator};
use fnpack_core::FnpackConfig;
use fnpack_exec::{CommandExecutor, DeployError, LoadError, ModuleLoader, NodeModuleLoader};
use std::path::{Path, PathBuf};

/// Result of a successful packaging run.
#[derive(Debug)]
pub(crate) struct PackageOutcome {
    pub bundle: PathBuf,
    pub step_id: String,
    pub runtime_version: String,
    /// Generated files that could not be removed after deploy.
    pub leftover: Vec<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum PipelineError {
    #[error(transparent)]
    Bundle(#[from] BundleError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Config(#[from] fnpack_core::Error),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Deploy(#[from] DeployError),
}

/// Run the full packaging pipeline: bundle → load → generate → deploy → cleanup.
///
/// Any failure aborts the remaining steps. Generated files are only removed
/// after a successful deploy.
pub(crate) async fn run<E: CommandExecutor>(
    executor: &E,
    project_dir: &Path,
    config: &FnpackConfig,
    entry: &Path,
    deploy_flags: &[String],
) -> Result<PackageOutcome, PipelineError> {
    // Bundle
    let bundle_path = bundle::bundle(executor, &config.bundle, project_dir, entry).await?;

    // Load configuration; the step count is checked before anything else is written
    let loader = NodeModuleLoader::new(executor, &config.runtime);
    let module = loader.load(&bundle_path).await?;
    let step_id = module.config.single_step_id()?.to_owned();
    tracing::info!(step = %step_id, "function configuration loaded");

    // Dockerfile
    let runtime_version = fnpack_exec::runtime_version(executor, &config.runtime).await;
    let dockerfile = DockerfileGenerator::new(
        &runtime_version,
        &config.bundle.output,
        &config.artifacts.launcher,
    )
    .with_base_image_suffix(&config.runtime.base_image_suffix)
    .render();
    let dockerfile_path =
        artifacts::write_text(project_dir, &config.artifacts.dockerfile, &dockerfile).await?;

    // Function configuration pointed at the container
    let container_config = module.config.into_container(&config.artifacts.dockerfile);
    for (id, step) in &container_config.steps {
        tracing::debug!(step = %id, runtime = step.runtime.type_tag(), path = %step.path, "step rewritten");
    }
    let config_path =
        artifacts::write_function_config(project_dir, &config.artifacts.config, &container_config)
            .await?;

    // Launcher
    let launcher =
        LauncherGenerator::new(&step_id, &config.bundle.module_specifier()).render();
    let launcher_path =
        artifacts::write_text(project_dir, &config.artifacts.launcher, &launcher).await?;

    let generated = GeneratedArtifacts {
        dockerfile: dockerfile_path,
        config: config_path,
        launcher: launcher_path,
    };

    // Deploy
    fnpack_exec::deploy(executor, &config.deploy, deploy_flags).await?;

    // Cleanup
    let leftover = artifacts::cleanup(&generated)
        .await
        .into_iter()
        .map(|failure| failure.path)
        .collect();

    Ok(PackageOutcome {
        bundle: bundle_path,
        step_id,
        runtime_version,
        leftover,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnpack_exec::ExecError;
    use mockall::mock;
    use std::time::Duration;
    use tempfile::TempDir;

    mock! {
        Executor {}

        impl CommandExecutor for Executor {
            async fn exec(
                &self,
                program: &str,
                args: &[String],
                timeout: Option<Duration>,
            ) -> Result<String, ExecError>;
            async fn exec_streaming(
                &self,
                program: &str,
                args: &[String],
                timeout: Option<Duration>,
            ) -> Result<(), ExecError>;
        }
    }

    const SINGLE_STEP: &str = r#"@@fnpack-report@@ {"ok":true,"config":{"name":"fn","steps":{"step":{"path":"https://placeholder.com","runtime":{"type":"http","url":"https://placeholder.com"}}}}}"#;
    const TWO_STEPS: &str = r#"@@fnpack-report@@ {"ok":true,"config":{"steps":{"a":{"path":"p","runtime":{"type":"http","url":"u"}},"b":{"path":"p","runtime":{"type":"http","url":"u"}}}}}"#;

    /// A project with an entry file and a bundle the mock bundler "produced".
    fn project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("fn.js"), "module.exports = {};").unwrap();
        std::fs::write(tmp.path().join("bundle.js"), "exports.default = {};").unwrap();
        tmp
    }

    fn executor(report: &'static str, deploy: Result<(), i32>) -> MockExecutor {
        let mut mock = MockExecutor::new();
        mock.expect_exec()
            .withf(|program, _, _| program == "npx")
            .returning(|_, _, _| Ok(String::new()));
        mock.expect_exec()
            .withf(|program, args, _| program == "node" && args.contains(&"-e".to_owned()))
            .returning(move |_, _, _| Ok(report.to_owned()));
        mock.expect_exec()
            .withf(|program, args, _| program == "node" && args.contains(&"-v".to_owned()))
            .returning(|_, _, _| Ok("v18.19.0\n".to_owned()));
        mock.expect_exec_streaming()
            .returning(move |program, args, _| match deploy {
                Ok(()) => Ok(()),
                Err(code) => Err(ExecError::CommandFailed {
                    program: program.to_owned(),
                    args: args.to_vec(),
                    code: Some(code),
                    stderr: String::new(),
                }),
            });
        mock
    }

    fn generated_files(dir: &Path) -> Vec<bool> {
        ["Dockerfile.inngest", "inngest.json", "run.js"]
            .iter()
            .map(|name| dir.join(name).exists())
            .collect()
    }

    #[tokio::test]
    async fn successful_run_deploys_and_cleans_up() {
        let tmp = project();
        let mock = executor(SINGLE_STEP, Ok(()));

        let outcome = run(
            &mock,
            tmp.path(),
            &FnpackConfig::default(),
            Path::new("fn.js"),
            &["--prod".to_owned()],
        )
        .await
        .unwrap();

        assert_eq!(outcome.step_id, "step");
        assert_eq!(outcome.runtime_version, "18.19.0");
        assert_eq!(outcome.bundle, tmp.path().join("bundle.js"));
        assert!(outcome.leftover.is_empty());
        assert_eq!(generated_files(tmp.path()), vec![false, false, false]);
        assert!(tmp.path().join("bundle.js").exists());
    }

    #[tokio::test]
    async fn multi_step_config_fails_before_writing_files() {
        let tmp = project();
        let mock = executor(TWO_STEPS, Ok(()));

        let err = run(
            &mock,
            tmp.path(),
            &FnpackConfig::default(),
            Path::new("fn.js"),
            &[],
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Config(fnpack_core::Error::UnsupportedStepFunctions { count: 2, .. })
        ));
        assert!(err.to_string().contains("step functions are not yet supported"));
        assert_eq!(generated_files(tmp.path()), vec![false, false, false]);
    }

    #[tokio::test]
    async fn deploy_failure_skips_cleanup() {
        let tmp = project();
        let mock = executor(SINGLE_STEP, Err(3));

        let err = run(
            &mock,
            tmp.path(),
            &FnpackConfig::default(),
            Path::new("fn.js"),
            &[],
        )
        .await
        .unwrap_err();

        match &err {
            PipelineError::Deploy(deploy) => assert_eq!(deploy.exit_code(), Some(3)),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(generated_files(tmp.path()), vec![true, true, true]);
    }

    #[tokio::test]
    async fn generated_files_point_at_container() {
        let tmp = project();
        // Deploy fails so the generated files stay on disk for inspection.
        let mock = executor(SINGLE_STEP, Err(1));

        let result = run(
            &mock,
            tmp.path(),
            &FnpackConfig::default(),
            Path::new("fn.js"),
            &[],
        )
        .await;
        assert!(matches!(result, Err(PipelineError::Deploy(_))));

        let dockerfile = std::fs::read_to_string(tmp.path().join("Dockerfile.inngest")).unwrap();
        assert!(dockerfile.starts_with("FROM node:18.19.0-buster-slim\n"));
        assert!(dockerfile.contains("COPY bundle.js run.js /opt/"));

        let config: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(tmp.path().join("inngest.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(config["steps"]["step"]["runtime"]["type"], "container");
        assert_eq!(
            config["steps"]["step"]["runtime"]["dockerfile"],
            "./Dockerfile.inngest"
        );
        assert_eq!(config["steps"]["step"]["path"], "file://.");
        assert_eq!(config["name"], "fn");

        let launcher = std::fs::read_to_string(tmp.path().join("run.js")).unwrap();
        assert!(launcher.contains("require(\"./bundle\")"));
        assert!(launcher.contains("const stepId = \"step\";"));
    }

    #[tokio::test]
    async fn version_fallback_lands_in_dockerfile() {
        let tmp = project();
        let mut mock = MockExecutor::new();
        mock.expect_exec()
            .withf(|program, _, _| program == "npx")
            .returning(|_, _, _| Ok(String::new()));
        mock.expect_exec()
            .withf(|program, args, _| program == "node" && args.contains(&"-e".to_owned()))
            .returning(|_, _, _| Ok(SINGLE_STEP.to_owned()));
        mock.expect_exec()
            .withf(|program, args, _| program == "node" && args.contains(&"-v".to_owned()))
            .returning(|program, _, _| {
                Err(ExecError::NotFound {
                    program: program.to_owned(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
                })
            });
        mock.expect_exec_streaming().returning(|_, _, _| {
            Err(ExecError::CommandFailed {
                program: "npx".to_owned(),
                args: vec![],
                code: Some(1),
                stderr: String::new(),
            })
        });

        let result = run(
            &mock,
            tmp.path(),
            &FnpackConfig::default(),
            Path::new("fn.js"),
            &[],
        )
        .await;
        assert!(matches!(result, Err(PipelineError::Deploy(_))));

        let dockerfile = std::fs::read_to_string(tmp.path().join("Dockerfile.inngest")).unwrap();
        assert!(dockerfile.starts_with("FROM node:16.16.0-buster-slim\n"));
    }
}
