use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "smirkff - assign force-field parameters to molecules with SMIRKS rules.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel matching.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assign force-field parameters to every molecule of an input file.
    Assign(AssignArgs),
    /// Load and validate force-field files without assigning anything.
    Check(CheckArgs),
    /// Run a single SMIRKS pattern against molecules and print the matched atom tuples.
    Match(MatchArgs),
}

/// Arguments for the `assign` subcommand.
#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Path to the molecules file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the parameterized topology output. Printed to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Force-field file(s), applied in the given order.
    /// Later files append rules after earlier ones.
    #[arg(short, long = "forcefield", value_name = "PATH", num_args(1..))]
    pub forcefields: Vec<PathBuf>,

    /// Optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the class processing order, e.g. `bonds,angles,vdw`.
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub classes: Option<Vec<String>>,

    /// Warn about rules that win no site.
    #[arg(long)]
    pub warn_unused: bool,

    /// Write per-rule usage statistics of the batch to this path.
    #[arg(long, value_name = "PATH")]
    pub stats: Option<PathBuf>,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Force-field file(s) to validate, merged in the given order.
    #[arg(required = true, value_name = "PATH")]
    pub forcefields: Vec<PathBuf>,

    /// Treat duplicate patterns within a class as an error.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `match` subcommand.
#[derive(Args, Debug)]
pub struct MatchArgs {
    /// The SMIRKS pattern to search for.
    #[arg(required = true, value_name = "SMIRKS")]
    pub smirks: String,

    /// Path to the molecules file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Force-field file whose `[replacements]` table provides `$name` fragments.
    #[arg(short, long = "forcefield", value_name = "PATH")]
    pub forcefield: Option<PathBuf>,

    /// How matches differing only in atom order are collapsed.
    #[arg(long, value_enum, default_value_t = SymmetryArg::Exact)]
    pub symmetry: SymmetryArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymmetryArg {
    /// Report every distinct ordered tuple.
    Exact,
    /// Treat a tuple and its reverse as the same match.
    Reversible,
    /// Keep the second atom fixed and ignore the order of the others.
    CenterAnchored,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_accepts_multiple_forcefields_and_class_list() {
        let cli = Cli::try_parse_from([
            "smirkff",
            "-vv",
            "assign",
            "-i",
            "mols.toml",
            "-f",
            "base.toml",
            "extra.toml",
            "--classes",
            "bonds,angles",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Assign(args) => {
                assert_eq!(
                    args.forcefields,
                    vec![PathBuf::from("base.toml"), PathBuf::from("extra.toml")]
                );
                assert_eq!(
                    args.classes,
                    Some(vec!["bonds".to_string(), "angles".to_string()])
                );
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["smirkff", "-q", "-v", "check", "ff.toml"]).is_err());
    }

    #[test]
    fn match_parses_symmetry_value() {
        let cli = Cli::try_parse_from([
            "smirkff",
            "match",
            "[#6:1]-[#1:2]",
            "-i",
            "mols.toml",
            "--symmetry",
            "center-anchored",
        ])
        .unwrap();
        match cli.command {
            Commands::Match(args) => {
                assert_eq!(args.smirks, "[#6:1]-[#1:2]");
                assert_eq!(args.symmetry, SymmetryArg::CenterAnchored);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
