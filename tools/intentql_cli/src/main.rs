use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use intentql::{parser, AccessDecision, CallerContext, ChartHints, CompileResult, CompilerConfig, QueryCompiler};
use serde::Serialize;
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "intentql")]
#[command(about = "Compile natural-language query intents into tenant-isolated SQL")]
#[command(version)]
struct Args {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an intent for one caller and print the result as JSON
    Compile {
        /// Intent JSON file, or "-" for stdin
        #[arg(long)]
        intent: String,

        /// Access policy YAML
        #[arg(long)]
        policy: PathBuf,

        /// Compiler configuration YAML
        #[arg(long)]
        config: Option<PathBuf>,

        /// Caller user id
        #[arg(long)]
        user: String,

        /// Caller role (repeatable)
        #[arg(long = "role")]
        roles: Vec<String>,

        /// Caller attribute as key=value (repeatable)
        #[arg(long = "attr", value_parser = parse_attribute)]
        attributes: Vec<(String, String)>,

        /// Input is a raw interpreter response; extract the JSON first
        #[arg(long)]
        raw: bool,

        /// Compilation date for custom range substitution (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Original question, used as chart title fallback
        #[arg(long, default_value = "")]
        question: String,
    },
    /// Load a policy and summarize what it grants
    CheckPolicy {
        /// Access policy YAML
        policy: PathBuf,
    },
}

#[derive(Serialize)]
struct CompileOutput<'a> {
    #[serde(flatten)]
    result: &'a CompileResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    chart: Option<ChartHints>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.debug);

    match run(args.command) {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "intentql failed");
            eprintln!("error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(command: Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Compile {
            intent,
            policy,
            config,
            user,
            roles,
            attributes,
            raw,
            today,
            question,
        } => {
            let policy = parser::parse_policy_file(&policy)?;
            let config = match config {
                Some(path) => parser::parse_config_file(&path)?,
                None => CompilerConfig::default(),
            };
            let compiler = QueryCompiler::new(config)?;

            let input = read_input(&intent)?;
            let intent = if raw {
                parser::parse_intent_response(&input)?
            } else {
                parser::parse_intent_str(&input)?
            };
            debug!(user = %user, roles = roles.len(), "compiling intent from CLI");

            let mut caller = CallerContext::new(user);
            for role in roles {
                caller = caller.with_role(role);
            }
            for (key, value) in attributes {
                caller = caller.with_attribute(key, value);
            }

            let access = AccessDecision::new(&policy, &caller);
            let result = match today {
                Some(today) => compiler.compile_on(&intent, &access, today),
                None => compiler.compile(&intent, &access),
            };

            let output = CompileOutput {
                result: &result,
                chart: ChartHints::from_result(&intent, &result, &question),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);

            Ok(if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Commands::CheckPolicy { policy } => {
            let policy = parser::parse_policy_file(&policy)?;
            let tables: serde_json::Map<String, serde_json::Value> = policy
                .tables
                .iter()
                .map(|(name, table)| {
                    let summary = json!({
                        "roles": table.roles,
                        "fields": table.fields.len(),
                        "restrictedFields": table.restricted_fields.keys().collect::<Vec<_>>(),
                        "rowFilterColumns": table.row_filters.iter().map(|rf| &rf.field).collect::<Vec<_>>(),
                        "exemptRoles": table.exempt_roles,
                    });
                    (name.clone(), summary)
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json!({ "tables": tables }))?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_input(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("failed to read intent from stdin")?;
        return Ok(input);
    }
    let path = Path::new(source);
    std::fs::read_to_string(path).with_context(|| format!("failed to read intent '{}'", path.display()))
}

fn parse_attribute(s: &str) -> anyhow::Result<(String, String)> {
    let Some((key, value)) = s.split_once('=') else {
        bail!("expected key=value, got '{}'", s);
    };
    if key.trim().is_empty() {
        bail!("attribute key is empty in '{}'", s);
    }
    Ok((key.trim().to_string(), value.to_string()))
}
