use clap::Parser;
use qmlint_common::Level;
use std::path::PathBuf;

/// CLI arguments for the qmlint binary.
#[derive(Parser, Debug)]
#[command(
    name = "qmlint",
    version,
    about = "Static semantic analyzer for QML documents"
)]
pub struct CliArgs {
    /// Add a directory to the import search path. May be repeated.
    #[arg(short = 'I', long = "import-path", value_name = "DIR")]
    pub import_paths: Vec<PathBuf>,

    /// Load an explicit .qmltypes file. May be repeated.
    #[arg(short = 'i', long = "qmltypes", value_name = "FILE")]
    pub qmltypes: Vec<PathBuf>,

    /// Do not add the built-in modules to the search path.
    #[arg(long)]
    pub bare: bool,

    /// Do not read .qmllint.json settings files.
    #[arg(long = "ignore-settings")]
    pub ignore_settings: bool,

    /// Write a JSON report to FILE, or to stdout when FILE is `-`.
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Apply auto-applicable fixes and write the files back.
    #[arg(long)]
    pub fix: bool,

    /// Lint the module with this URI instead of files.
    #[arg(long, value_name = "URI")]
    pub module: Option<String>,

    /// Set the level of a category or category group, e.g.
    /// `unqualified=error` or `syntax=disable`. May be repeated.
    #[arg(long = "level", value_name = "CATEGORY=LEVEL", value_parser = parse_level_override)]
    pub levels: Vec<(String, Level)>,

    /// Fail when more than N warnings are reported.
    #[arg(long = "max-warnings", value_name = "N")]
    pub max_warnings: Option<usize>,

    /// Print the known categories with their default levels and exit.
    #[arg(long = "list-categories")]
    pub list_categories: bool,

    /// Disable colored output.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// QML files or directories to lint. Directories are searched for
    /// `.qml` files.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

/// Parse `category=level`.
pub fn parse_level_override(value: &str) -> Result<(String, Level), String> {
    let Some((name, level)) = value.split_once('=') else {
        return Err(format!("expected CATEGORY=LEVEL, got '{value}'"));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing category name in '{value}'"));
    }
    let level = level.trim().parse::<Level>()?;
    Ok((name.to_string(), level))
}
