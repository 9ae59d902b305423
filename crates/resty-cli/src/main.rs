use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use indexmap::IndexMap;

use resty_core::api::{Api, parse_accept};
use resty_core::config::{self, ApiConfig, CONFIG_FILE_NAME};

#[derive(Parser)]
#[command(name = "resty", about = "REST API description toolkit", version)]
struct Cli {
    /// Config file (defaults to ./.resty.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an API description
    Validate {
        /// Path to the API description (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the normalized resource tree
    Inspect {
        /// Path to the API description
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Convert request parameters against a method's declarations
    Convert {
        /// Path to the API description
        #[arg(short, long)]
        input: PathBuf,

        /// Target as "VERB /uri"
        target: String,

        /// Parameters as name=value
        #[arg(value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },

    /// Print the example response for a method
    Example {
        /// Path to the API description
        #[arg(short, long)]
        input: PathBuf,

        /// Target as "VERB /uri"
        target: String,

        /// Response status (defaults to the configured default status)
        #[arg(long)]
        status: Option<u16>,

        /// Accept header used to pick the media type
        #[arg(long)]
        accept: Option<String>,
    },

    /// Initialize a new resty configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config_path = cli.config;

    match cli.command {
        Commands::Validate { input } => cmd_validate(&input, config_path.as_deref()),

        Commands::Inspect { input, format } => {
            cmd_inspect(&input, format, config_path.as_deref())
        }

        Commands::Convert {
            input,
            target,
            params,
        } => cmd_convert(&input, &target, &params, config_path.as_deref()),

        Commands::Example {
            input,
            target,
            status,
            accept,
        } => cmd_example(
            &input,
            &target,
            status,
            accept.as_deref(),
            config_path.as_deref(),
        ),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "resty", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn parse_key_value(input: &str) -> Result<(String, String), String> {
    input
        .split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got `{input}`"))
}

/// Load the config file, either the one given or `.resty.yaml` in the
/// current directory.
fn try_load_config(path: Option<&Path>) -> Result<ApiConfig> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(CONFIG_FILE_NAME), false),
    };
    match config::load_config(&path)? {
        Some(config) => Ok(config),
        None if explicit => anyhow::bail!("config file {} not found", path.display()),
        None => Ok(ApiConfig::default()),
    }
}

fn load_api(input: &Path, config_path: Option<&Path>) -> Result<Api> {
    let config = try_load_config(config_path)?;
    let api = Api::from_path(input, config)
        .with_context(|| format!("failed to load {}", input.display()))?;
    log::debug!("loaded {api}");
    Ok(api)
}

fn cmd_validate(input: &Path, config_path: Option<&Path>) -> Result<()> {
    let api = load_api(input, config_path)?;
    let spec = api.spec();

    let methods: usize = spec.iter().map(|(_, r)| r.methods.len()).sum();
    eprintln!("Valid API description: {}", spec.title);
    eprintln!("  Version: {}", spec.version);
    eprintln!("  Base path: {}", api.uri());
    eprintln!("  Resources: {}", spec.len());
    eprintln!("  Methods: {methods}");
    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: &Path, format: InspectFormat, config_path: Option<&Path>) -> Result<()> {
    let api = load_api(input, config_path)?;
    let summary = build_inspect_summary(&api);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{yaml}");
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{json}");
        }
    }

    Ok(())
}

fn build_inspect_summary(api: &Api) -> serde_json::Value {
    let spec = api.spec();
    let resources: Vec<serde_json::Value> = spec
        .iter()
        .map(|(uri, resource)| {
            let methods: Vec<serde_json::Value> = resource
                .methods
                .iter()
                .map(|method| {
                    serde_json::json!({
                        "method": method.method.to_uppercase(),
                        "query_parameters": method.query_parameters.keys().collect::<Vec<_>>(),
                        "responses": method.responses.keys().collect::<Vec<_>>(),
                    })
                })
                .collect();
            serde_json::json!({
                "uri": uri,
                "uri_parameters": resource.all_uri_parameters.keys().collect::<Vec<_>>(),
                "methods": methods,
            })
        })
        .collect();

    serde_json::json!({
        "id": api.id(),
        "title": spec.title,
        "version": spec.version,
        "uri": api.uri(),
        "uri_parameters": spec.all_uri_parameters.keys().collect::<Vec<_>>(),
        "resources": resources,
    })
}

fn cmd_convert(
    input: &Path,
    target: &str,
    params: &[(String, String)],
    config_path: Option<&Path>,
) -> Result<()> {
    let api = load_api(input, config_path)?;
    let (resource, method) = api.target(target)?;
    let specs = api.parameters(resource, method);

    match api.converter().convert_params_all(&specs, params) {
        Ok(converted) => {
            println!("{}", serde_json::to_string_pretty(&converted)?);
            Ok(())
        }
        Err(errors) => {
            for error in &errors {
                eprintln!("  {}: {}", error.status(), error);
            }
            anyhow::bail!("{} parameter(s) failed to convert", errors.len())
        }
    }
}

fn cmd_example(
    input: &Path,
    target: &str,
    status: Option<u16>,
    accept: Option<&str>,
    config_path: Option<&Path>,
) -> Result<()> {
    let api = load_api(input, config_path)?;
    let method = api.method_spec(target)?;
    let response = api.response(method, status)?;

    let accept = accept.map(parse_accept).unwrap_or_default();
    let mimetype = api.response_mimetype(response, Some(accept.as_slice()))?;
    let content = api.example_body(response, Some(mimetype))?;

    let headers: IndexMap<String, String> = api.example_headers(response);
    eprintln!("{} {}", response.status, content.mimetype);
    for (name, value) in &headers {
        eprintln!("{name}: {value}");
    }
    println!("{content}");
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
