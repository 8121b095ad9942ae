#![deny(missing_docs)]

//! # Check Command
//!
//! Validates a schema without generating anything and reports what it declares.

use crate::config::ToolConfig;
use crate::error::CliResult;
use std::path::PathBuf;
use thaum_core::schema::AuthRequirement;
use thaum_core::Schema;

/// Arguments for the check command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Path to the schema document [default: generate.yaml].
    #[clap(long, env = "THAUM_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Tool configuration file [default: ./thaum.yaml when present].
    #[clap(long)]
    pub config: Option<PathBuf>,
}

/// Validates the schema and returns a printable summary.
///
/// # Arguments
///
/// * `args` - Command arguments.
pub fn execute(args: &CheckArgs) -> CliResult<String> {
    let settings = ToolConfig::load(args.config.as_deref())?.resolve(ToolConfig {
        schema: args.schema.clone(),
        ..ToolConfig::default()
    });
    let schema = Schema::from_path(&settings.schema)?;
    Ok(summarize(&settings.schema, &schema))
}

/// Symbol counts, the endpoint table and the exception code table.
pub fn summarize(path: &std::path::Path, schema: &Schema) -> String {
    let mut out = format!(
        "Schema OK: {}\nSymbols: {} ({} enums, {} classes)\n",
        path.display(),
        schema.symbols.len(),
        schema.enums.len(),
        schema.classes.len()
    );

    out.push_str("Endpoints:\n");
    for endpoint in schema.endpoints.values() {
        let auth = match &endpoint.auth {
            AuthRequirement::None => "none",
            AuthRequirement::Level(level) => level.as_str(),
            AuthRequirement::Custom => "custom",
        };
        out.push_str(&format!(
            "  /{} (in: {}, out: {}, auth: {})\n",
            endpoint.name,
            endpoint.input.as_deref().unwrap_or("-"),
            endpoint.output.as_deref().unwrap_or("-"),
            auth
        ));
    }

    out.push_str("Exception codes:\n");
    for (code, variant) in schema.exceptions.variants.iter().enumerate() {
        out.push_str(&format!("  {:>2} {}\n", code, variant.label));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_summary() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("generate.yaml");
        fs::write(
            &path,
            r#"
api_url: localhost
enums:
  Color: [Red]
classes:
  Point: { x: int }
exceptions: [Not found]
endpoints:
  echo: { in: Point, out: Point }
"#,
        )
        .unwrap();

        let summary = execute(&CheckArgs {
            schema: Some(path.clone()),
            config: None,
        })
        .unwrap();

        let expected = format!(
            "Schema OK: {}\nSymbols: 3 (1 enums, 1 classes)\nEndpoints:\n  /echo (in: Point, out: Point, auth: none)\nException codes:\n   0 Success\n   1 UnsupportedMethod\n   2 UnsupportedEndpoint\n   3 ObjectFormatError\n   4 InternalError\n   5 Unauthorized\n   6 NotFound\n",
            path.display()
        );
        assert_eq!(summary, expected);
    }

    #[test]
    fn test_summary_lists_auth_requirements() {
        let schema = Schema::from_yaml(
            r#"
api_url: localhost
auth: { levels: [Admin], in: String, out: String }
endpoints:
  wipe: { authLevel: Admin }
  rename: { in: String, authLevel: Custom }
"#,
        )
        .unwrap();

        let summary = summarize(std::path::Path::new("generate.yaml"), &schema);
        assert!(summary.contains("  /wipe (in: -, out: -, auth: Admin)\n"));
        assert!(summary.contains("  /rename (in: String, out: -, auth: custom)\n"));
        assert!(summary.contains("  /_authorize (in: String, out: String, auth: none)\n"));
    }
}
