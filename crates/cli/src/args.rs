use clap::Parser;
use std::path::PathBuf;

/// Source-code cross-reference indexer for C-family languages.
#[derive(Parser, Debug)]
#[command(name = "toks", version, about, disable_version_flag = true)]
pub struct Args {
    /// Read files to process from a file, one per line ('-' is stdin,
    /// '#' starts a comment line)
    #[arg(short = 'F', value_name = "FILE")]
    pub file_list: Option<String>,

    /// Index file to use
    #[arg(short = 'i', value_name = "FILE", default_value = "TOKS")]
    pub index: PathBuf,

    /// Redirect standard output to a file
    #[arg(short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Language override: C, CPP, D, CS, JAVA, PAWN, OC, OC+, VALA, ECMA
    #[arg(short = 'l', value_name = "TAG")]
    pub language: Option<String>,

    /// Load a file with extra type names, one per line (repeatable)
    #[arg(short = 't', value_name = "FILE")]
    pub type_files: Vec<PathBuf>,

    /// Dump all tokens after parsing a file
    #[arg(short = 'd')]
    pub dump: bool,

    /// Log severity mask, e.g. "0-2,20-23,51"; "A" enables everything
    #[arg(short = 'L', long = "log", value_name = "SEV")]
    pub log_mask: Option<String>,

    /// Show the severity number in log lines
    #[arg(short = 's')]
    pub show_severity: bool,

    /// Identifier to look up; supports ? and * wildcards
    #[arg(long = "id", value_name = "NAME")]
    pub identifier: Option<String>,

    /// Show only references
    #[arg(long)]
    pub refs: bool,

    /// Show only definitions
    #[arg(long)]
    pub defs: bool,

    /// Show only declarations
    #[arg(long)]
    pub decls: bool,

    /// Print the version and exit
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// Source files to index
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,
}
