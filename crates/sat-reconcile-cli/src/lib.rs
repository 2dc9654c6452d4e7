mod config;
mod show;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, CommandFactory as _, Parser, Subcommand};
use sat_reconcile::reconcile::ReconcileConfig;

use crate::config::Config;

/// Report file written by `compare` when no output is given.
pub const DEFAULT_OUTPUT: &str = "comparacion.xlsx";

#[derive(Parser)]
#[command(
    name = "sat-reconcile",
    about = "Compare Odoo invoices against the SAT export and write a color-coded report"
)]
#[command(disable_help_subcommand = true)]
struct Args {
    /// Config file. Defaults to sat-reconcile.toml or .sat-reconcile.toml in the current directory.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    files: FileArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(ClapArgs)]
struct FileArgs {
    /// Odoo invoice export (.xlsx, .xls or .ods)
    #[arg(long)]
    odoo: Option<PathBuf>,

    /// SAT invoice export (.xlsx, .xls or .ods)
    #[arg(long)]
    sat: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the comparison report (default)
    Compare {
        /// Report path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show discrepancies between both exports and exit
    Diff,
    /// Copy a workbook, applying the report formatting to every sheet
    Format { input: PathBuf, output: PathBuf },
}

pub fn run(args: impl IntoIterator<Item = String>) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sat_reconcile=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    clap_complete::CompleteEnv::with_factory(Args::command).complete();

    let args = Args::parse_from(args);

    let (base_dir, config) = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::find_and_load()?.unwrap_or_default(),
    };

    let command = args.command.unwrap_or(Commands::Compare { output: None });
    match command {
        Commands::Compare { output } => {
            let reconcile_config = reconcile_config(&args.files, &base_dir, &config)?;
            let output = output
                .or_else(|| config.files.output.as_ref().map(|path| base_dir.join(path)))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

            let result = sat_reconcile::write_comparison(
                &reconcile_config,
                &config.report_options(),
                &output,
            )?;
            show::print_summary(&result.summary);
            println!("Report written to {}", result.path.display());
            Ok(())
        }
        Commands::Diff => {
            let reconcile_config = reconcile_config(&args.files, &base_dir, &config)?;
            show::show_diff(&reconcile_config)
        }
        Commands::Format { input, output } => {
            let options = config.report_options();
            let written = sat_reconcile::format_workbook(&input, &output, &options)?;
            println!("Formatted workbook written to {}", written.display());
            Ok(())
        }
    }
}

/// Command line paths win over the ones from the config file.
fn reconcile_config(files: &FileArgs, base_dir: &Path, config: &Config) -> Result<ReconcileConfig> {
    let from_config = |path: &Option<PathBuf>| path.as_ref().map(|path| base_dir.join(path));

    let odoo = files
        .odoo
        .clone()
        .or_else(|| from_config(&config.files.odoo))
        .context("No Odoo export given: pass --odoo or set files.odoo in the config file")?;
    let sat = files
        .sat
        .clone()
        .or_else(|| from_config(&config.files.sat))
        .context("No SAT export given: pass --sat or set files.sat in the config file")?;

    let options = config.reconcile_options();
    Ok(ReconcileConfig::new(odoo, sat).with_options(options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_is_the_default_command() {
        let args = Args::try_parse_from(["sat-reconcile", "--odoo", "a.xlsx", "--sat", "b.xlsx"])
            .unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.files.odoo, Some(PathBuf::from("a.xlsx")));
    }

    #[test]
    fn format_takes_two_paths() {
        let args = ["sat-reconcile", "format", "in.xlsx", "out.xlsx"];
        let args = Args::try_parse_from(args).unwrap();
        let Some(Commands::Format { input, output }) = args.command else {
            panic!("expected the format command");
        };
        assert_eq!(input, PathBuf::from("in.xlsx"));
        assert_eq!(output, PathBuf::from("out.xlsx"));
    }

    #[test]
    fn config_paths_are_relative_to_the_config_file() {
        let config: Config = toml::from_str("[files]\nodoo = \"odoo.xlsx\"\nsat = \"sat.xlsx\"\n")
            .unwrap();
        let files = FileArgs {
            odoo: Some(PathBuf::from("other.xlsx")),
            sat: None,
        };

        let reconcile_config = reconcile_config(&files, Path::new("exports"), &config).unwrap();
        assert_eq!(reconcile_config.accounting_path(), Path::new("other.xlsx"));
        assert_eq!(
            reconcile_config.authority_path(),
            Path::new("exports/sat.xlsx")
        );
    }

    #[test]
    fn missing_input_is_an_error() {
        let files = FileArgs {
            odoo: None,
            sat: Some(PathBuf::from("sat.xlsx")),
        };
        let error = reconcile_config(&files, Path::new(""), &Config::default()).unwrap_err();
        assert!(error.to_string().contains("--odoo"), "{error}");
    }

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }
}
