#![deny(missing_docs)]

//! # Generate Command
//!
//! Loads the schema, builds the requested target and writes `generated.dart`.

use crate::config::ToolConfig;
use crate::error::CliResult;
use std::fs;
use std::path::PathBuf;
use thaum_core::{generate, GenerationTarget, Schema};
use tracing::info;

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Path to the schema document [default: generate.yaml].
    #[clap(long, env = "THAUM_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Which halves to emit: `server`, `frontend` or `thaum` [default: thaum].
    #[clap(long, env = "THAUM_TARGET")]
    pub target: Option<GenerationTarget>,

    /// Directory receiving the generated file [default: .].
    #[clap(long, env = "THAUM_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Tool configuration file [default: ./thaum.yaml when present].
    #[clap(long)]
    pub config: Option<PathBuf>,
}

/// Executes the generation.
///
/// # Arguments
///
/// * `args` - Command arguments.
///
/// Returns the path of the written file.
pub fn execute(args: &GenerateArgs) -> CliResult<PathBuf> {
    // 1. Settings
    let settings = ToolConfig::load(args.config.as_deref())?.resolve(ToolConfig {
        target: args.target,
        output_dir: args.output_dir.clone(),
        schema: args.schema.clone(),
    });

    // 2. Schema
    let schema = Schema::from_path(&settings.schema)?;

    // 3. Generate Code
    let file = generate(&schema, settings.target)?;

    // 4. Write File
    fs::create_dir_all(&settings.output_dir)?;
    let path = settings.output_dir.join(&file.file_name);
    fs::write(&path, &file.contents)?;

    info!(
        target = %settings.target,
        path = %path.display(),
        bytes = file.contents.len(),
        "wrote generated file"
    );
    println!("Generated {} code at {:?}", settings.target, path);

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use tempfile::tempdir;
    use thaum_core::AppError;

    const SCHEMA: &str = r#"
api_url: localhost:8080
classes:
  Point: { x: int, y: int }
endpoints:
  echo: { in: Point, out: Point }
"#;

    #[test]
    fn test_execute_writes_generated_file() {
        let dir = tempdir().unwrap();
        let schema_path = dir.path().join("generate.yaml");
        fs::write(&schema_path, SCHEMA).unwrap();
        let output_dir = dir.path().join("lib/src");

        let args = GenerateArgs {
            schema: Some(schema_path),
            target: Some(GenerationTarget::Server),
            output_dir: Some(output_dir.clone()),
            config: None,
        };
        let path = execute(&args).unwrap();

        assert_eq!(path, output_dir.join("generated.dart"));
        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.contains("abstract class APIHandler"));
        assert!(!contents.contains("class ApiSession"));
    }

    #[test]
    fn test_config_file_supplies_settings() {
        let dir = tempdir().unwrap();
        let schema_path = dir.path().join("api.yaml");
        fs::write(&schema_path, SCHEMA).unwrap();
        let config_path = dir.path().join("thaum.yaml");
        fs::write(
            &config_path,
            format!(
                "target: frontend\nschema: {}\noutput_dir: {}\n",
                schema_path.display(),
                dir.path().join("out").display()
            ),
        )
        .unwrap();

        let args = GenerateArgs {
            config: Some(config_path),
            ..GenerateArgs::default()
        };
        let path = execute(&args).unwrap();
        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.contains("class ApiSession"));
        assert!(!contents.contains("handleRequest"));
    }

    #[test]
    fn test_invalid_schema_writes_nothing() {
        let dir = tempdir().unwrap();
        let schema_path = dir.path().join("generate.yaml");
        fs::write(
            &schema_path,
            "api_url: localhost\nendpoints:\n  get: { in: Missing }\n",
        )
        .unwrap();
        let output_dir = dir.path().join("out");

        let args = GenerateArgs {
            schema: Some(schema_path),
            output_dir: Some(output_dir.clone()),
            ..GenerateArgs::default()
        };
        let err = execute(&args).unwrap_err();

        assert!(matches!(err, CliError::App(AppError::Type(_))));
        assert!(!output_dir.exists());
    }
}
