//! pstyle: convert SQL between placeholder styles.
//!
//! # Usage
//!
//! ```bash
//! # Rewrite a statement and its arguments
//! pstyle conv --from-style format --to-style numeric \
//!     --args 10 "select * from t where id=%s"
//!
//! # Run a statement written in your style against a database
//! pstyle exec --style named --kwargs '{"id": 1}' \
//!     --database-url sqlite://app.db "select * from users where id=:id"
//! ```

use anyhow::{Context, Result, bail};
use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Args as ClapArgs, CommandFactory, Parser, Subcommand, ValueEnum};
use colored::*;
use pstyle::config::Config;
use pstyle::engine::{Row, SqlxBackend, StyledDb};
use pstyle::parser::{self, TokenKind};
use pstyle::prelude::*;
use pstyle::Style;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "pstyle")]
#[command(version)]
#[command(about = "Convert SQL between placeholder styles", long_about = None)]
#[command(after_help = "EXAMPLES:
    pstyle conv --from-style format --to-style numeric --args 10 'select * from t where id=%s'
    pstyle conv --from-style qmark --to-style pyformat --args 1 --args x 'select ?, ?'
    pstyle exec --style named --kwargs '{\"id\": 1}' 'select * from users where id=:id'
    pstyle styles")]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings only
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file (default: ./pstyle.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite an operation and its arguments into another style
    Conv {
        /// Style of OPERATION
        #[arg(long, value_parser = style_parser(true))]
        from_style: Option<Style>,

        /// Style to produce
        #[arg(long, value_parser = style_parser(false))]
        to_style: Option<Style>,

        #[command(flatten)]
        bindings: Bindings,

        /// Upper-case SQL keywords in the output
        #[arg(long, overrides_with = "original")]
        normalize: bool,

        /// Keep non-placeholder text exactly as written
        #[arg(long, overrides_with = "normalize")]
        original: bool,

        /// SQL text
        operation: String,
    },
    /// Run an operation written in one style against a database
    Exec {
        /// Style of OPERATION
        #[arg(long, value_parser = style_parser(true))]
        style: Style,

        #[command(flatten)]
        bindings: Bindings,

        /// Database connection URL
        #[arg(long, env = "PSTYLE_DATABASE_URL")]
        database_url: Option<String>,

        /// Output format for returned rows
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// SQL text
        operation: String,
    },
    /// Show the placeholder style reference
    Styles,
}

#[derive(ClapArgs)]
struct Bindings {
    /// Ordered argument; repeat for more. Numbers and true/false are inferred.
    #[arg(long = "args", conflicts_with = "kwargs", allow_negative_numbers = true)]
    args: Vec<String>,

    /// Named arguments as a JSON object
    #[arg(long)]
    kwargs: Option<String>,
}

impl Bindings {
    fn to_args(&self) -> Result<Args> {
        match &self.kwargs {
            Some(json) => {
                let args: Args = serde_json::from_str(json).context("--kwargs is not valid JSON")?;
                if args.family() != ArgFamily::Named {
                    bail!("--kwargs must be a JSON object");
                }
                Ok(args)
            }
            None => Ok(Args::Ordered(
                self.args.iter().map(|a| Value::parse_literal(a)).collect(),
            )),
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn style_parser(allow_auto: bool) -> impl TypedValueParser<Value = Style> {
    let names = Style::ALL
        .into_iter()
        .filter(|s| allow_auto || s.is_target())
        .map(Style::name);
    PossibleValuesParser::new(names).try_map(|name| name.parse::<Style>())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match &cli.command {
        Some(Commands::Conv {
            from_style,
            to_style,
            bindings,
            normalize,
            original,
            operation,
        }) => run_conv(
            &cli,
            *from_style,
            *to_style,
            bindings,
            (*normalize, *original),
            operation,
        ),
        Some(Commands::Exec {
            style,
            bindings,
            database_url,
            format,
            operation,
        }) => run_exec(&cli, *style, bindings, database_url.as_deref(), format, operation).await,
        Some(Commands::Styles) => {
            show_styles();
            Ok(())
        }
        None => Cli::command().print_help().map_err(Into::into),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run_conv(
    cli: &Cli,
    from_style: Option<Style>,
    to_style: Option<Style>,
    bindings: &Bindings,
    (normalize, original): (bool, bool),
    operation: &str,
) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let from = from_style
        .or(config.convert.from_style)
        .context("--from-style is required (or set convert.from_style)")?;
    let to = to_style
        .or(config.convert.to_style)
        .context("--to-style is required (or set convert.to_style)")?;
    let normalize = match (normalize, original) {
        (true, _) => true,
        (_, true) => false,
        _ => config.convert.normalize,
    };

    let converted = convert_opt(from, to, operation, bindings.to_args()?, normalize)?;

    println!("{} {}", "op:".green().bold(), converted.sql);
    println!(
        "{} {}",
        "args:".cyan().bold(),
        serde_json::to_string(&converted.args)?
    );
    Ok(())
}

async fn run_exec(
    cli: &Cli,
    style: Style,
    bindings: &Bindings,
    database_url: Option<&str>,
    format: &OutputFormat,
    operation: &str,
) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = database_url {
        config.database.url = Some(url.to_string());
    }
    if config.database.url.is_none() {
        bail!("no database URL. Use --database-url or set PSTYLE_DATABASE_URL");
    }

    let backend = SqlxBackend::from_config(&config.database).await?;
    let db = StyledDb::new(backend, style);
    let args = bindings.to_args()?;

    if returns_rows(operation)? {
        let rows = db.fetch_all(operation, args).await?;
        format_output(&rows, format);
    } else {
        let affected = db.execute(operation, args).await?;
        println!("{} {} rows affected", "✓".green(), affected);
    }
    Ok(())
}

/// Whether the first keyword of the operation starts a row-returning statement.
fn returns_rows(operation: &str) -> Result<bool> {
    let statements = parser::tokenize(operation)?;
    let first = statements
        .iter()
        .flat_map(|stmt| stmt.tokens.iter())
        .find(|t| t.kind == TokenKind::Word);
    Ok(first.is_some_and(|t| {
        matches!(
            t.text.to_ascii_uppercase().as_str(),
            "SELECT" | "WITH" | "PRAGMA" | "SHOW" | "EXPLAIN" | "VALUES"
        )
    }))
}

fn format_output(rows: &[Row], format: &OutputFormat) {
    if rows.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows).unwrap_or_default());
        }
        OutputFormat::Table => {
            let mut columns: Vec<&String> = rows[0].keys().collect();
            columns.sort();

            let mut widths: HashMap<&String, usize> =
                columns.iter().map(|c| (*c, c.len())).collect();
            for row in rows {
                for (col, val) in row {
                    if let Some(w) = widths.get_mut(col) {
                        *w = (*w).max(cell(val).len());
                    }
                }
            }

            let header: Vec<String> = columns
                .iter()
                .map(|c| format!("{:width$}", c, width = widths[*c]))
                .collect();
            println!("{}", header.join(" │ ").white().bold());

            let sep: Vec<String> = columns.iter().map(|c| "─".repeat(widths[*c])).collect();
            println!("{}", sep.join("─┼─").dimmed());

            for row in rows {
                let cells: Vec<String> = columns
                    .iter()
                    .map(|c| {
                        let val = row.get(*c).map(cell).unwrap_or_default();
                        format!("{:width$}", val, width = widths[*c])
                    })
                    .collect();
                println!("{}", cells.join(" │ "));
            }

            println!();
            println!("{} row(s) returned", rows.len().to_string().cyan());
        }
    }
}

fn cell(val: &serde_json::Value) -> String {
    match val {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn show_styles() {
    println!("{}", "Placeholder Style Reference".cyan().bold());
    println!();

    println!(
        "{:10} {:12} {:10} {}",
        "Style".white().bold(),
        "Placeholder".white().bold(),
        "Arguments".white().bold(),
        "Target".white().bold()
    );
    println!("{}", "─".repeat(48).dimmed());

    for style in Style::ALL {
        let family = style
            .family()
            .map(|f| f.to_string())
            .unwrap_or_else(|| "either".to_string());
        let target = if style.is_target() { "yes" } else { "no" };
        println!(
            "{:10} {:12} {:10} {}",
            style.name().cyan().bold(),
            style.example().yellow(),
            family.white(),
            target.dimmed()
        );
    }
}
