//! memoria - Survey-plan PDF to memoria descriptiva.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use memoria_core::{MemoriaConfig, MemoriaResult};
use memoria_pipeline::{create_pipeline, BatchRunner, Document, RunReport};
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "memoria",
    version,
    about = "Generate memorias descriptivas from survey-plan PDFs",
    after_help = "EXAMPLES:\n  \
                  memoria process plano_17.pdf\n  \
                  memoria process --concurrency 8 --output-root ./media planos/*.pdf\n  \
                  memoria extract plano_17.pdf > plano_17.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a memoria for each PDF
    Process(ProcessArgs),

    /// Print the extracted fields of one PDF as JSON
    Extract(ExtractArgs),
}

#[derive(Args)]
struct ProcessArgs {
    /// Survey-plan PDFs
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Root directory for outputs/memorias/
    #[arg(long)]
    output_root: Option<PathBuf>,

    /// Documents processed in parallel
    #[arg(long)]
    concurrency: Option<usize>,

    /// Upper bound in seconds on optical recognition of one document
    #[arg(long, value_name = "SECS")]
    ocr_timeout: Option<u64>,

    /// Run the extraction through the corrector before rendering
    #[arg(long)]
    correct: bool,

    /// Print the run reports as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExtractArgs {
    /// Survey-plan PDF
    file: PathBuf,

    /// Upper bound in seconds on optical recognition
    #[arg(long, value_name = "SECS")]
    ocr_timeout: Option<u64>,

    /// Run the extraction through the corrector
    #[arg(long)]
    correct: bool,
}

/// File given on the command line, else the per-user file, else defaults.
/// Environment variables apply on top.
fn load_config(path: Option<&Path>) -> MemoriaResult<MemoriaConfig> {
    let user_file = dirs::config_dir().map(|d| d.join("memoria").join("config.toml"));
    let config = match (path, user_file) {
        (Some(path), _) => MemoriaConfig::from_file(path)?,
        (None, Some(file)) if file.is_file() => {
            debug!(path = %file.display(), "using user configuration");
            MemoriaConfig::from_file(file)?
        }
        _ => MemoriaConfig::default(),
    };
    Ok(config.with_env_overrides())
}

fn print_summary(reports: &[RunReport]) {
    for report in reports {
        let detail = match (&report.output_path, &report.error) {
            (_, Some(error)) => error.clone(),
            (Some(path), None) => path.display().to_string(),
            (None, None) => String::new(),
        };
        println!("{}\t{}\t{}", report.document_id, report.state, detail);
    }
}

impl ProcessArgs {
    /// Command-line flags win over every other configuration source.
    fn apply(&self, config: &mut MemoriaConfig) {
        if let Some(root) = &self.output_root {
            config.output.root = root.clone();
        }
        if let Some(n) = self.concurrency {
            config.output.concurrency = n;
        }
        if let Some(secs) = self.ocr_timeout {
            config.acquisition.ocr_timeout_secs = Some(secs);
        }
    }
}

async fn process(mut config: MemoriaConfig, args: ProcessArgs) -> MemoriaResult<bool> {
    args.apply(&mut config);

    let pipeline = Arc::new(create_pipeline(&config, args.correct)?);
    let runner = BatchRunner::new(pipeline, config.output.concurrency);
    let documents = args.files.iter().map(Document::from_path).collect();
    let reports = runner.run(documents).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_summary(&reports);
    }
    Ok(reports.iter().all(|r| r.is_completed()))
}

async fn extract(mut config: MemoriaConfig, args: ExtractArgs) -> MemoriaResult<bool> {
    if let Some(secs) = args.ocr_timeout {
        config.acquisition.ocr_timeout_secs = Some(secs);
    }
    let pipeline = create_pipeline(&config, args.correct)?;
    let extraction = pipeline.extract(&Document::from_path(&args.file)).await?;
    println!("{}", serde_json::to_string_pretty(&extraction.result)?);
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing; stdout is reserved for results
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("memoria_pipeline=debug".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let succeeded = match cli.command {
        Commands::Process(args) => process(config, args).await,
        Commands::Extract(args) => extract(config, args).await,
    };

    match succeeded {
        Ok(true) => Ok(()),
        Ok(false) => {
            info!("one or more documents failed");
            std::process::exit(1);
        }
        Err(e) => {
            if let Some(suggestion) = e.suggestion() {
                eprintln!("error: {e}\nhint: {suggestion}");
            } else {
                eprintln!("error: {e}");
            }
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process_flags() {
        let cli = Cli::try_parse_from([
            "memoria",
            "process",
            "a.pdf",
            "b.pdf",
            "--output-root",
            "/srv/media",
            "--concurrency",
            "8",
            "--ocr-timeout",
            "90",
            "--correct",
            "--config",
            "memoria.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("memoria.toml")));
        let Commands::Process(args) = cli.command else {
            panic!("expected process");
        };
        assert_eq!(args.files, vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")]);
        assert!(args.correct);
        assert!(!args.json);

        let mut config = MemoriaConfig::default();
        args.apply(&mut config);
        assert_eq!(config.output.root, PathBuf::from("/srv/media"));
        assert_eq!(config.output.concurrency, 8);
        assert_eq!(config.acquisition.ocr_timeout_secs, Some(90));
    }

    #[test]
    fn test_process_requires_files() {
        assert!(Cli::try_parse_from(["memoria", "process"]).is_err());
        assert!(Cli::try_parse_from(["memoria"]).is_err());
    }

    #[test]
    fn test_parse_extract() {
        let cli = Cli::try_parse_from(["memoria", "--config", "c.yaml", "extract", "plano_17.pdf"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.yaml")));
        let Commands::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(args.file, PathBuf::from("plano_17.pdf"));
        assert_eq!(args.ocr_timeout, None);
        assert!(!args.correct);

        // Only one file per extract.
        assert!(Cli::try_parse_from(["memoria", "extract", "a.pdf", "b.pdf"]).is_err());
    }

    #[tokio::test]
    async fn test_process_writes_one_memoria_per_file() {
        let root = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "memoria",
            "process",
            "/nonexistent/plano_1.pdf",
            "/nonexistent/plano_2.pdf",
            "--output-root",
            root.path().to_str().unwrap(),
            "--concurrency",
            "2",
        ])
        .unwrap();
        let Commands::Process(args) = cli.command else {
            panic!("expected process");
        };

        assert!(process(MemoriaConfig::default(), args).await.unwrap());
        let written: Vec<String> = std::fs::read_dir(root.path().join("outputs/memorias"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".docx"))
            .collect();
        assert_eq!(written.len(), 2);
        assert!(written.iter().any(|n| n.starts_with("plano_1_")));
        assert!(written.iter().any(|n| n.starts_with("plano_2_")));
    }

    #[tokio::test]
    async fn test_extract_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let mut config = MemoriaConfig::default();
        config.output.root = root.path().to_path_buf();
        let args = ExtractArgs {
            file: PathBuf::from("/nonexistent/plano_3.pdf"),
            ocr_timeout: None,
            correct: false,
        };

        assert!(extract(config, args).await.unwrap());
        assert!(!root.path().join("outputs").exists());
    }
}
