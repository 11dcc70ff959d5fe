use std::{
    error::Error,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, ValueEnum};
use jsonguard::{Draft, JsonValue, PatternOptions, Retrieve, SchemaError, Url, ValidationResult};
use serde::{ser::SerializeMap, Serialize, Serializer};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `JSONGUARD_LOG=debug`.
const LOG_ENV: &str = "JSONGUARD_LOG";

#[derive(Parser)]
#[command(name = "jsonguard", version, about = "Validate JSON documents against a JSON Schema")]
struct Cli {
    /// JSON Schema file.
    schema: PathBuf,

    /// JSON instance file to validate; may be repeated.
    #[arg(short = 'i', long = "instance", value_name = "INSTANCE")]
    instances: Vec<PathBuf>,

    /// Draft to use instead of the one declared in `$schema`.
    #[arg(short, long, value_enum)]
    draft: Option<DraftArg>,

    #[arg(long, value_enum, default_value_t = Output::Text)]
    output: Output,

    /// Base URI of the schema; defaults to the schema file location.
    #[arg(long)]
    base_uri: Option<String>,

    /// Maximum number of backtracking steps for a single regex match.
    #[arg(long)]
    backtrack_limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DraftArg {
    #[value(name = "4")]
    Draft4,
    #[value(name = "6")]
    Draft6,
    #[value(name = "7")]
    Draft7,
}

impl From<DraftArg> for Draft {
    fn from(value: DraftArg) -> Self {
        match value {
            DraftArg::Draft4 => Draft::Draft4,
            DraftArg::Draft6 => Draft::Draft6,
            DraftArg::Draft7 => Draft::Draft7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Human-readable report.
    Text,
    /// One JSON object per instance.
    Json,
    /// No output; only the exit code.
    Flag,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: jsonguard::ParseError,
    },
    #[error("Invalid schema {}: {source}", path.display())]
    Schema { path: PathBuf, source: SchemaError },
    #[error("Can not build a file URI for {}", path.display())]
    FileUri { path: PathBuf },
    #[error(transparent)]
    Output(#[from] io::Error),
}

fn read_json(path: &Path) -> Result<JsonValue, CliError> {
    let contents = fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    jsonguard::parse(&contents).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn file_uri(path: &Path) -> Result<Url, CliError> {
    let absolute = fs::canonicalize(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Url::from_file_path(&absolute).map_err(|()| CliError::FileUri { path: absolute })
}

/// Loads `file://` references from disk.
struct FileRetriever;

impl Retrieve for FileRetriever {
    fn retrieve(&self, uri: &Url) -> Result<JsonValue, Box<dyn Error + Send + Sync>> {
        if uri.scheme() != "file" {
            return Err(format!("Unsupported URI scheme: {}", uri.scheme()).into());
        }
        let path = uri
            .to_file_path()
            .map_err(|()| format!("Not a local file: {uri}"))?;
        tracing::debug!(path = %path.display(), "Loading referenced schema");
        let contents = fs::read(&path)?;
        Ok(jsonguard::parse(&contents)?)
    }
}

struct JsonReport<'a, 'i> {
    instance: &'a Path,
    result: &'a ValidationResult<'i>,
}

impl Serialize for JsonReport<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("instance", &self.instance.display().to_string())?;
        map.serialize_entry("result", self.result)?;
        map.end()
    }
}

fn write_text(
    out: &mut impl Write,
    instance: &Path,
    result: &ValidationResult<'_>,
) -> io::Result<()> {
    if result.is_valid() {
        return writeln!(out, "{} - VALID", instance.display());
    }
    writeln!(out, "{} - INVALID. Errors:", instance.display())?;
    for (idx, error) in result.errors().iter().enumerate() {
        writeln!(
            out,
            "{}. {} (at '{}', schema '{}')",
            idx + 1,
            error,
            error.instance_path(),
            error.schema_path()
        )?;
    }
    Ok(())
}

/// Validate every instance, returning whether all of them are valid.
fn run(cli: &Cli, out: &mut impl Write) -> Result<bool, CliError> {
    let schema = read_json(&cli.schema)?;
    let base_uri = match &cli.base_uri {
        Some(base_uri) => base_uri.clone(),
        None => file_uri(&cli.schema)?.to_string(),
    };
    let mut options = jsonguard::options()
        .with_base_uri(base_uri)
        .with_retriever(FileRetriever);
    if let Some(draft) = cli.draft {
        options = options.with_draft(draft.into());
    }
    if let Some(limit) = cli.backtrack_limit {
        options = options.with_pattern_options(PatternOptions::fancy_regex().backtrack_limit(limit));
    }
    let validator = options.build(&schema).map_err(|source| CliError::Schema {
        path: cli.schema.clone(),
        source,
    })?;
    tracing::debug!(draft = ?validator.draft(), schema = %cli.schema.display(), "Schema compiled");
    if cli.instances.is_empty() && cli.output == Output::Text {
        writeln!(out, "Schema is valid")?;
    }

    let mut all_valid = true;
    for path in &cli.instances {
        let instance = read_json(path)?;
        let result = validator.validate(&instance);
        tracing::debug!(
            instance = %path.display(),
            errors = result.errors().len(),
            "Validated instance"
        );
        all_valid &= result.is_valid();
        match cli.output {
            Output::Text => write_text(out, path, &result)?,
            Output::Json => {
                let report = JsonReport {
                    instance: path,
                    result: &result,
                };
                serde_json::to_writer(&mut *out, &report).map_err(io::Error::from)?;
                writeln!(out)?;
            }
            Output::Flag => {}
        }
    }
    Ok(all_valid)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    let mut stdout = io::stdout().lock();
    match run(&cli, &mut stdout) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(error) => {
            let _ = stdout.flush();
            let _ = writeln!(io::stderr(), "Error: {error}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, DraftArg, Output};
    use clap::Parser;

    #[test]
    fn parses_arguments() {
        let cli = Cli::try_parse_from([
            "jsonguard",
            "schema.json",
            "-i",
            "a.json",
            "--instance",
            "b.json",
            "--draft",
            "4",
            "--output",
            "json",
            "--backtrack-limit",
            "100",
        ])
        .expect("Valid arguments");
        assert_eq!(cli.instances.len(), 2);
        assert_eq!(cli.draft, Some(DraftArg::Draft4));
        assert_eq!(cli.output, Output::Json);
        assert_eq!(cli.backtrack_limit, Some(100));
    }

    #[test]
    fn rejects_unknown_draft() {
        assert!(Cli::try_parse_from(["jsonguard", "schema.json", "--draft", "2020"]).is_err());
    }
}
