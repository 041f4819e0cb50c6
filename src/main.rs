use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use struct_mapper::{
    BuiltinCatalog, ConfigError, GenerateOptions, GoStructParser, Pipeline, StructDescriptor, StructParser,
    TransformerCatalog, import_config,
};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "structmap")]
#[command(about = "structmap - Go struct mapping function generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse Go struct declarations and report diagnostics
    Parse {
        /// Path to a .go file
        #[arg(required_unless_present = "stdin")]
        file: Option<PathBuf>,

        /// Read from stdin
        #[arg(long)]
        stdin: bool,

        /// Print descriptors as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate Go mapping functions from project .json files
    Generate {
        /// Path to a project .json file or a directory of them
        #[arg(required_unless_present = "stdin")]
        file: Option<PathBuf>,

        /// Read a project from stdin and print the Go file
        #[arg(long)]
        stdin: bool,

        /// Go package name of the generated file
        #[arg(long, default_value = "main")]
        package: String,

        /// Print the generated unit as JSON (with --stdin)
        #[arg(long, requires = "stdin")]
        json: bool,
    },
    /// List the built-in transformer templates
    Templates {
        /// Print templates as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to read stdin: {0}")]
    Stdin(io::Error),
    #[error("{path}: {source}")]
    Config { path: PathBuf, source: ConfigError },
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} does not exist")]
    NotFound(PathBuf),
    #[error("no .json project files found in {0}")]
    Empty(PathBuf),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { file, stdin, json } => parse_command(file, stdin, json),
        Commands::Generate {
            file,
            stdin,
            package,
            json,
        } => {
            let options = GenerateOptions::default().with_package(package);
            if stdin {
                generate_stdin(&options, json)
            } else if let Some(path) = file {
                generate_path(&path, &options)
            } else {
                Err(CliError::NotFound(PathBuf::from("<input>")))
            }
        }
        Commands::Templates { json } => templates_command(json),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn read_stdin() -> Result<String, CliError> {
    let mut source = String::new();
    io::stdin().read_to_string(&mut source).map_err(CliError::Stdin)?;
    Ok(source)
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_command(file: Option<PathBuf>, stdin: bool, json: bool) -> Result<ExitCode, CliError> {
    let (source, filename) = match (stdin, file) {
        (true, _) => (read_stdin()?, "<stdin>".to_string()),
        (false, Some(path)) => (read_file(&path)?, path.display().to_string()),
        (false, None) => return Err(CliError::NotFound(PathBuf::from("<input>"))),
    };

    let parser = GoStructParser::new();
    let mut structs = parser.parse_many(&source);
    if structs.is_empty() {
        // Reports the missing declaration
        structs.push(parser.parse_one(&source));
    }
    debug!(count = structs.len(), "parsed input");

    if json {
        println!("{}", serde_json::to_string_pretty(&structs)?);
    } else {
        report_structs(&structs, &source, &filename);
    }

    if structs.iter().all(|s| s.is_valid) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn report_structs(structs: &[StructDescriptor], source: &str, filename: &str) {
    let is_tty = io::stderr().is_terminal();

    for descriptor in structs {
        for diagnostic in &descriptor.diagnostics {
            if is_tty {
                eprint!("{}", diagnostic.render_color(source, filename));
            } else {
                eprint!("{}", diagnostic.render(source, filename));
            }
        }

        if descriptor.name.is_empty() {
            continue;
        }
        let fields_word = if descriptor.fields.len() == 1 { "field" } else { "fields" };
        let mark = match (descriptor.is_valid, is_tty) {
            (true, true) => "\x1b[32m✓\x1b[0m",
            (true, false) => "✓",
            (false, true) => "\x1b[31m✗\x1b[0m",
            (false, false) => "✗",
        };
        eprintln!("  {} {} ({} {})", mark, descriptor.name, descriptor.fields.len(), fields_word);
    }
}

fn generate_stdin(options: &GenerateOptions, json_output: bool) -> Result<ExitCode, CliError> {
    let source = read_stdin()?;
    let config = import_config(&source).map_err(|source| CliError::Config {
        path: PathBuf::from("<stdin>"),
        source,
    })?;

    let result = Pipeline::new(options.clone()).compile(&config);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result.unit)?);
    } else if let Some(file) = &result.file {
        print!("{}", file);
    }

    if result.is_ok() {
        Ok(ExitCode::SUCCESS)
    } else {
        for error in &result.unit.errors {
            eprintln!("Error: {}", error);
        }
        Ok(ExitCode::FAILURE)
    }
}

fn generate_path(path: &Path, options: &GenerateOptions) -> Result<ExitCode, CliError> {
    if path.is_file() {
        let start = Instant::now();
        let ok = generate_file(path, options)?;
        print_summary(usize::from(ok), start.elapsed());
        Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    } else if path.is_dir() {
        generate_directory(path, options)
    } else {
        Err(CliError::NotFound(path.to_path_buf()))
    }
}

fn generate_directory(dir: &Path, options: &GenerateOptions) -> Result<ExitCode, CliError> {
    let start = Instant::now();
    let mut generated = 0;
    let mut failed = 0;

    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
    {
        if generate_file(entry.path(), options)? {
            generated += 1;
        } else {
            failed += 1;
        }
    }

    if generated + failed == 0 {
        return Err(CliError::Empty(dir.to_path_buf()));
    }

    print_summary(generated, start.elapsed());
    Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Compile one project file next to itself; false when the mapping has errors
fn generate_file(path: &Path, options: &GenerateOptions) -> Result<bool, CliError> {
    let source = read_file(path)?;
    let config = import_config(&source).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })?;

    let result = Pipeline::new(options.clone()).compile(&config);

    let Some(file) = &result.file else {
        for error in &result.unit.errors {
            print_failed(&path.display().to_string(), error);
        }
        return Ok(false);
    };

    let output = path.with_extension("go");
    fs::write(&output, file).map_err(|source| CliError::Write {
        path: output.clone(),
        source,
    })?;
    print_generated(&output.display().to_string());
    Ok(true)
}

fn templates_command(json: bool) -> Result<ExitCode, CliError> {
    let templates = BuiltinCatalog.templates();

    if json {
        println!("{}", serde_json::to_string_pretty(templates)?);
    } else {
        for template in templates {
            println!("{:<18} {} ({} -> {})", template.id, template.name, template.input_type, template.output_type);
            println!("{:<18} {}", "", template.description);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_generated(path: &str) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("  \x1b[32m✓\x1b[0m {}", path);
    } else {
        eprintln!("  ✓ {}", path);
    }
}

fn print_failed(path: &str, error: &str) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("  \x1b[31m✗\x1b[0m {}: {}", path, error);
    } else {
        eprintln!("  ✗ {}: {}", path, error);
    }
}

fn print_summary(count: usize, elapsed: std::time::Duration) {
    let is_tty = io::stderr().is_terminal();
    let time_str = format_duration(elapsed);
    let files_word = if count == 1 { "file" } else { "files" };

    if is_tty {
        eprintln!("\n\x1b[1m✨ Generated {} {} in {}\x1b[0m", count, files_word, time_str);
    } else {
        eprintln!("\n✨ Generated {} {} in {}", count, files_word, time_str);
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
