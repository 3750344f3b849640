use crate::errors::Error;
use crate::ui;
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const PROPERTIES_FILE_NAME: &str = "icard.toml";

const LONG_ABOUT: &str = "\
Приложение переименовывает файлы конструкторской документации и создает
информационно-удостоверяющий лист из файлов с именами вида:
\"ИГУЛ.123456.789-01 СБ Наименование\" или \"IGUL123456789-01_sb\".

Например, запуск с ключами -rc переименует файлы и создаст
информационно-удостоверяющий лист вне зависимости от расширения файлов.

Если папка результатов не указана, исходные файлы и результаты будут
сохранены в текущую папку; если не указана папка с исходными файлами,
они будут взяты из текущей папки.

Списки кодов документов, допустимых расширений и прочие свойства
считываются из файла icard.toml рядом с приложением, затем из папки
с исходными файлами (локальные свойства уточняют глобальные).";

#[derive(Parser, Debug)]
#[command(name = "icard", about = "Создание информационно-удостоверяющего листа", long_about = LONG_ABOUT)]
pub struct Cli {
    /// Переименовать файлы к нормированному виду IGUL123456789
    #[arg(short, long)]
    pub rename: bool,

    /// Удалить исходные файлы после обработки
    #[arg(short, long)]
    pub delete: bool,

    /// Создать информационно-удостоверяющий лист (УЛ.xlsx)
    #[arg(short, long)]
    pub create: bool,

    /// Работать только с файлами, расширения которых перечислены в файле свойств
    #[arg(short, long)]
    pub assay: bool,

    /// Папка для результатов
    #[arg(default_value = ".")]
    pub result: PathBuf,

    /// Папка с исходными файлами
    #[arg(default_value = ".")]
    pub source: PathBuf,
}

/// Ключи запуска, управляющие конвейером обработки файлов
#[derive(Debug, Clone, Copy)]
pub struct Mode {
    pub rename: bool,
    pub delete: bool,
    pub create_report: bool,
    pub assay_extension: bool,
}

impl Mode {
    pub fn from_cli(cli: &Cli) -> Mode {
        Mode {
            rename: cli.rename,
            delete: cli.delete,
            create_report: cli.create,
            assay_extension: cli.assay,
        }
    }
}

/// Номера групп регулярного выражения, закрепленные за смысловыми полями
/// имени файла. Значения по умолчанию соответствуют выражению по умолчанию.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldGroups {
    pub organization: usize,
    pub characteristic: usize,
    pub registration: usize,
    pub species: usize,
    pub document_code: usize,
    pub version: usize,
    pub name: usize,
    pub extension: usize,
}

impl Default for FieldGroups {
    fn default() -> FieldGroups {
        FieldGroups {
            organization: 1,
            characteristic: 2,
            registration: 3,
            species: 5,
            document_code: 6,
            version: 8,
            name: 10,
            extension: 11,
        }
    }
}

impl FieldGroups {
    pub fn named_indices(&self) -> [(&'static str, usize); 8] {
        [
            ("organization", self.organization),
            ("characteristic", self.characteristic),
            ("registration", self.registration),
            ("species", self.species),
            ("document_code", self.document_code),
            ("version", self.version),
            ("name", self.name),
            ("extension", self.extension),
        ]
    }
}

const DEFAULT_NAME_REGEXP: &str = r"^(ИГУЛ|IGUL)\.?(\d{6})\.?(\d{3})(-(\d{2}))?\s*_?([А-Яа-яA-Za-z]{1,2}[0-9]{0,2})?(_([0-9]{1,2}))?(\s(.*))?\.([A-Za-z]{3,5})$";

/// Свойства приложения: таблицы кодов документов, допустимые расширения,
/// подписи формы и соглашение об именовании файлов
#[derive(Debug, Clone)]
pub struct Properties {
    pub document_codes_cyr: Vec<String>,
    pub document_codes_lat: Vec<String>,
    pub filename_extensions: Vec<String>,
    pub author: String,
    pub checked: String,
    pub approved: String,
    pub designation_prefix: String,
    pub file_prefix: String,
    pub latin_organization: String,
    pub company: String,
    pub report_designation: String,
    pub name_regexp: String,
    pub groups: FieldGroups,
}

impl Default for Properties {
    fn default() -> Properties {
        Properties {
            document_codes_cyr: vec!["СБ".to_owned(), "МЭ".to_owned(), "ТУ".to_owned()],
            document_codes_lat: vec!["sb".to_owned(), "me".to_owned(), "tu".to_owned()],
            filename_extensions: vec!["dwg".to_owned(), "tdd".to_owned(), "xls".to_owned()],
            author: "Разработал".to_owned(),
            checked: String::new(),
            approved: String::new(),
            designation_prefix: "ИГУЛ".to_owned(),
            file_prefix: "IGUL".to_owned(),
            latin_organization: "IGUL".to_owned(),
            company: "ПАО \"Морион\"".to_owned(),
            report_designation: "ИГУЛ.000000.000-УЛ".to_owned(),
            name_regexp: DEFAULT_NAME_REGEXP.to_owned(),
            groups: FieldGroups::default(),
        }
    }
}

// Файл свойств частичный: незаданные ключи остаются со значениями по умолчанию
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PropertiesFile {
    document_codes_cyr: Option<Vec<String>>,
    document_codes_lat: Option<Vec<String>>,
    filename_extensions: Option<Vec<String>>,
    author: Option<String>,
    checked: Option<String>,
    approved: Option<String>,
    designation_prefix: Option<String>,
    file_prefix: Option<String>,
    latin_organization: Option<String>,
    company: Option<String>,
    report_designation: Option<String>,
    name_regexp: Option<String>,
    groups: Option<FieldGroups>,
}

impl Properties {
    /// Считывает свойства сначала из папки с приложением, затем из папки
    /// с исходными файлами: локальный файл уточняет глобальный поключево.
    /// Отсутствие файла не ошибка, нечитаемый или испорченный файл - ошибка.
    pub fn load(source_dir: &Path) -> Result<Properties, Error> {
        let mut properties = Properties::default();

        for path in Self::candidate_paths(source_dir) {
            if !path.exists() {
                ui::display_formatted_text(
                    &format!("Нет файла свойств по пути: {}", path.display()),
                    None,
                );
                continue;
            }

            let text = fs::read_to_string(&path).map_err(|err| Error::PropertiesRead {
                path: path.clone(),
                err,
            })?;

            let file: PropertiesFile =
                toml::from_str(&text).map_err(|err| Error::PropertiesParse {
                    path: path.clone(),
                    err,
                })?;

            properties.apply(file);
            ui::display_formatted_text(&format!("Файл свойств: {}", path.display()), None);
        }

        properties.validate()?;
        Ok(properties)
    }

    fn candidate_paths(source_dir: &Path) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(2);

        if let Ok(exe) = env::current_exe() {
            if let Some(exe_dir) = exe.parent() {
                paths.push(exe_dir.join(PROPERTIES_FILE_NAME));
            }
        }

        let local = source_dir.join(PROPERTIES_FILE_NAME);
        if !paths.contains(&local) {
            paths.push(local);
        }

        paths
    }

    fn apply(&mut self, file: PropertiesFile) {
        macro_rules! take {
            ($field:ident) => {
                if let Some(value) = file.$field {
                    self.$field = value;
                }
            };
        }

        take!(document_codes_cyr);
        take!(document_codes_lat);
        take!(filename_extensions);
        take!(author);
        take!(checked);
        take!(approved);
        take!(designation_prefix);
        take!(file_prefix);
        take!(latin_organization);
        take!(company);
        take!(report_designation);
        take!(name_regexp);
        take!(groups);
    }

    fn validate(&self) -> Result<(), Error> {
        if self.document_codes_cyr.len() != self.document_codes_lat.len() {
            return Err(Error::CodeTablesLengthMismatch {
                cyr_len: self.document_codes_cyr.len(),
                lat_len: self.document_codes_lat.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let mut properties = Properties::default();
        let file: PropertiesFile = toml::from_str(
            r#"
            author = "Иванов И.И."
            filename_extensions = ["dwg"]

            [groups]
            version = 8
            "#,
        )
        .unwrap();

        properties.apply(file);

        assert_eq!(properties.author, "Иванов И.И.");
        assert_eq!(properties.filename_extensions, vec!["dwg".to_owned()]);
        // незатронутые ключи остаются по умолчанию
        assert_eq!(properties.designation_prefix, "ИГУЛ");
        assert_eq!(properties.document_codes_cyr.len(), 3);
        assert_eq!(properties.groups.version, 8);
        assert_eq!(properties.groups.organization, 1);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed = toml::from_str::<PropertiesFile>("unknown_key = 1");
        assert!(parsed.is_err());
    }

    #[test]
    fn mismatched_code_tables_are_fatal() {
        let mut properties = Properties::default();
        properties.document_codes_lat.pop();

        assert!(matches!(
            properties.validate(),
            Err(Error::CodeTablesLengthMismatch {
                cyr_len: 3,
                lat_len: 2
            })
        ));
    }

    #[test]
    fn combined_short_flags_parse_like_the_original() {
        let cli = Cli::parse_from(["icard", "-rc", "out", "in"]);
        assert!(cli.rename);
        assert!(cli.create);
        assert!(!cli.delete);
        assert!(!cli.assay);
        assert_eq!(cli.result, PathBuf::from("out"));
        assert_eq!(cli.source, PathBuf::from("in"));
    }
}
