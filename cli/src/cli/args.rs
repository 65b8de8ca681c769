use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(
    name = "amalgamate",
    version,
    about = "Flattens a multi-file C/C++ project into a single amalgamated source file",
    help_template = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading}
  {usage}

{all-args}{after-help}
",
    override_usage = "amalgamate \x1b[3m\x1b[38;5;65m<RULES> <DMLC_ROOT> <NNVM_ROOT> <SRC_ROOT> <OUTPUT> [MINIMUM] [ANDROID] [OPTIONS]\x1b[0m",
    disable_help_flag = true,
    disable_version_flag = true,
    styles(crate::style::clap_styles())
)]
pub struct Cli {
    #[arg(
        short,
        long,
        action = ArgAction::Help,
        help = "Prints help information",
        help_heading = "FLAGS"
    )]
    pub help: Option<bool>,

    #[arg(
        short = 'V',
        long,
        action = ArgAction::Version,
        help = "Prints version information",
        help_heading = "FLAGS"
    )]
    pub version: Option<bool>,

    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increases logging verbosity (repeatable)",
        help_heading = "FLAGS"
    )]
    pub verbose: u8,

    /// Dependency-rule listing naming every compiled object and its inputs
    #[arg(value_name = "RULES", help_heading = "INPUTS")]
    pub rules: PathBuf,

    /// Root file of the base utility library stage
    #[arg(value_name = "DMLC_ROOT", help_heading = "INPUTS")]
    pub dmlc_root: PathBuf,

    /// Root file of the computation-graph library stage
    #[arg(value_name = "NNVM_ROOT", help_heading = "INPUTS")]
    pub nnvm_root: PathBuf,

    /// Root file of the main project stage
    #[arg(value_name = "SRC_ROOT", help_heading = "INPUTS")]
    pub src_root: PathBuf,

    /// Where the merged source is written
    #[arg(value_name = "OUTPUT", help_heading = "INPUTS")]
    pub output: PathBuf,

    /// Nonzero emits stand-alone defines for a minimum build
    #[arg(
        value_name = "MINIMUM",
        default_value_t = 0,
        allow_negative_numbers = true,
        help_heading = "INPUTS"
    )]
    pub minimum: i64,

    /// Nonzero targets Android (only meaningful with MINIMUM)
    #[arg(
        value_name = "ANDROID",
        default_value_t = 0,
        allow_negative_numbers = true,
        help_heading = "INPUTS"
    )]
    pub android: i64,

    /// Project root; defaults to the parent of the working directory
    #[arg(long, value_name = "DIR", help_heading = "OPTIONS")]
    pub project_root: Option<PathBuf>,

    /// JSON file overriding the blacklist, rewrites and other engine settings
    #[arg(long, value_name = "JSON", help_heading = "OPTIONS")]
    pub config: Option<PathBuf>,

    /// Deepest include nesting tolerated before aborting
    #[arg(long, value_name = "LEVELS", help_heading = "OPTIONS")]
    pub max_depth: Option<usize>,

    /// Write a JSON summary of system headers, expanded and unreached files
    #[arg(long, value_name = "JSON", help_heading = "OPTIONS")]
    pub report: Option<PathBuf>,
}

impl Cli {
    pub fn minimum(&self) -> bool {
        self.minimum != 0
    }

    pub fn android(&self) -> bool {
        self.android != 0
    }
}
