use clap::Parser;
use std::env;
use std::path::{Path, PathBuf};

mod config;
mod errors;
mod extract;
mod load;
mod shared;
mod transform;
mod ui;

use crate::config::{Cli, Mode, Properties};
use crate::errors::Error;
use crate::extract::FieldMap;
use crate::load::{Report, REPORT_FILE_NAME};
use crate::transform::Pipeline;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        ui::display_error(&err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let mode = Mode::from_cli(cli);
    let source = to_absolute_path(&cli.source);
    let result = to_absolute_path(&cli.result);

    let properties = Properties::load(&source)?;
    let field_map = FieldMap::new(&properties.name_regexp, properties.groups)?;

    let entries = Pipeline::run(&source, &result, mode, &properties, &field_map)?;

    if mode.create_report {
        let report = Report::new(&entries, &properties);
        report.write(&result.join(REPORT_FILE_NAME))?;
    }

    ui::display_formatted_text(
        &format!("\nВыполнено. Обработано файлов: {}", entries.len()),
        Some(console::Style::new().green()),
    );
    Ok(())
}

fn to_absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_owned();
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_owned(),
    }
}
