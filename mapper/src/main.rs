//! Sheetmapper CLI - validate CSV sheets against dependency-aware rules
//!
//! ```bash
//! sheetmapper parse input.csv                      # Dump the parsed sheet as JSON
//! sheetmapper validate input.csv --rules r.json    # Print the validation report
//! sheetmapper map input.csv --rules r.json         # Validate, then map rows to JSON objects
//! sheetmapper schema                               # Print the rule file JSON schema
//! ```
//!
//! `validate` and `map` exit with code 2 when the data is invalid and 1 on
//! any other error.

use clap::{Parser, Subcommand};
use sheetmapper::logs::{log_info, set_echo};
use sheetmapper::{
    parse_file, parse_file_auto, AppResult, ObjectMapper, RuleSet, Sheet, SheetMeta,
    ValidationSession, ValidatorRegistry,
};
use std::fs;
use std::path::{Path, PathBuf};

const EXIT_INVALID: i32 = 2;

#[derive(Parser)]
#[command(name = "sheetmapper")]
#[command(about = "Validate CSV sheets against dependency-aware rules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SheetArgs {
    /// Input CSV file
    input: PathBuf,

    /// CSV delimiter (auto-detect if not specified)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Row holding the field names (overrides the rule file)
    #[arg(long)]
    header_row: Option<usize>,

    /// First data row (overrides the rule file)
    #[arg(long)]
    data_start_row: Option<usize>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV file and output the sheet as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a CSV file against a rule file
    Validate {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Rule file (JSON)
        #[arg(short, long)]
        rules: PathBuf,
    },

    /// Validate a CSV file, then map its data rows to JSON objects
    Map {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Rule file (JSON); rows are mapped without validation if omitted
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    /// Print the JSON schema for rule files
    Schema,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    if quiet_requested() {
        set_echo(false);
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()).map(|_| true),

        Commands::Validate { sheet, rules } => cmd_validate(&sheet, &rules),

        Commands::Map { sheet, rules } => cmd_map(&sheet, rules.as_deref()),

        Commands::Schema => cmd_schema().map(|_| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_INVALID),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn quiet_requested() -> bool {
    std::env::var("SHEETMAPPER_QUIET")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn cmd_parse(input: &Path, delimiter: Option<char>, output: Option<&Path>) -> AppResult<()> {
    log_info(format!("Parsing CSV: {}", input.display()));

    let sheet = load_sheet(input, delimiter)?;
    let json = serde_json::to_string_pretty(&sheet)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_validate(args: &SheetArgs, rules_path: &Path) -> AppResult<bool> {
    let rules = RuleSet::from_file(rules_path)?;
    let registry = rules.to_registry()?;
    let meta = resolve_meta(Some(&rules), args)?;
    let sheet = load_sheet(&args.input, args.delimiter)?;

    let mut session = ValidationSession::new(&registry, &sheet, meta)?;
    let valid = session.valid();

    let json = serde_json::to_string_pretty(&session.report())?;
    write_output(&json, args.output.as_deref())?;

    Ok(valid)
}

fn cmd_map(args: &SheetArgs, rules_path: Option<&Path>) -> AppResult<bool> {
    let rules = rules_path.map(RuleSet::from_file).transpose()?;
    let meta = resolve_meta(rules.as_ref(), args)?;
    let sheet = load_sheet(&args.input, args.delimiter)?;

    if let Some(rules) = &rules {
        let registry: ValidatorRegistry = rules.to_registry()?;
        let mut session = ValidationSession::new(&registry, &sheet, meta)?;
        if !session.valid() {
            let json = serde_json::to_string_pretty(&session.report())?;
            write_output(&json, args.output.as_deref())?;
            return Ok(false);
        }
    }

    let rows = ObjectMapper::json().map_sheet(&sheet, &meta)?;
    log_info(format!("Mapped {} rows", rows.len()));

    let json = serde_json::to_string_pretty(&rows)?;
    write_output(&json, args.output.as_deref())?;

    Ok(true)
}

fn cmd_schema() -> AppResult<()> {
    println!("{}", sheetmapper::rules::schema());
    Ok(())
}

fn load_sheet(input: &Path, delimiter: Option<char>) -> AppResult<Sheet> {
    let sheet = match delimiter {
        Some(d) => parse_file(input, d)?,
        None => parse_file_auto(input)?.sheet,
    };
    Ok(sheet)
}

/// Command line flags win over the rule file. An overridden header row
/// moves the default data start to the row below it.
fn resolve_meta(rules: Option<&RuleSet>, args: &SheetArgs) -> AppResult<SheetMeta> {
    let base = match rules {
        Some(rules) => rules.sheet_meta()?,
        None => SheetMeta::default(),
    };

    let header = args.header_row.unwrap_or(base.field_header_row_index);
    let data_start = match (args.data_start_row, args.header_row) {
        (Some(row), _) => row,
        (None, Some(header)) => header + 1,
        (None, None) => base.data_start_row_index,
    };

    Ok(SheetMeta::new(header, data_start)?)
}

fn write_output(content: &str, path: Option<&Path>) -> AppResult<()> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
