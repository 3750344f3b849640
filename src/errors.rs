use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    SourcePathNotFound(PathBuf),
    SourcePathIsNotDir(PathBuf),
    ResultPathIsNotDir(PathBuf),
    ResultDirCreation {
        path: PathBuf,
        err: std::io::Error,
    },
    PropertiesRead {
        path: PathBuf,
        err: std::io::Error,
    },
    PropertiesParse {
        path: PathBuf,
        err: toml::de::Error,
    },
    NameRegexpInvalid {
        pattern: String,
        err: regex::Error,
    },
    GroupIndexOutOfRange {
        field: &'static str,
        index: usize,
        group_count: usize,
    },
    CodeTablesLengthMismatch {
        cyr_len: usize,
        lat_len: usize,
    },
    DirTraversal {
        path: PathBuf,
        err: walkdir::Error,
    },
    FileAttributesUnreadable {
        path: PathBuf,
        err: std::io::Error,
    },
    FileReadFailed {
        path: PathBuf,
        err: std::io::Error,
    },
    FileCopyFailed {
        path: PathBuf,
        err: std::io::Error,
    },
    FileDeleteFailed {
        path: PathBuf,
        err: std::io::Error,
    },
    MalformedCellAddress(String),
    XlsxwriterWorkbookCreation {
        wb_name: String,
        err: xlsxwriter::XlsxError,
    },
    XlsxwriterSheetCreation(xlsxwriter::XlsxError),
    XlsxwriterCellWriteFailed(xlsxwriter::XlsxError),
    XlsxwriterWorkbookClose {
        wb_name: String,
        err: xlsxwriter::XlsxError,
    },
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourcePathNotFound(path) => {
                let path = path.display();
                let msg = format!("Такого пути не существует:\n{path}");
                write!(f, "{msg}")
            }
            Self::SourcePathIsNotDir(path) => {
                let path = path.display();
                let msg = format!("Указанный путь к исходным файлам не является папкой:\n{path}");
                write!(f, "{msg}")
            }
            Self::ResultPathIsNotDir(path) => {
                let path = path.display();
                let msg = format!("Указанный путь для результатов не является папкой:\n{path}");
                write!(f, "{msg}")
            }
            Self::ResultDirCreation { path, err } => {
                let base_msg = format!(
                    "Не удалось создать папку для результатов:\n{}",
                    path.display()
                );
                let footer_msg = format!("Подробности об ошибке:\n{err}");
                let full_msg = format!("{base_msg}\n\n{footer_msg}");
                write!(f, "{full_msg}")
            }
            Self::PropertiesRead { path, err } => {
                let base_msg = format!(
                    "Не получилось открыть файл свойств по пути:\n{}",
                    path.display()
                );
                let footer_msg = format!("Подробности об ошибке:\n{err}");
                let full_msg = format!("{base_msg}\n\n{footer_msg}");
                write!(f, "{full_msg}")
            }
            Self::PropertiesParse { path, err } => {
                let base_msg = format!(
                    "Файл свойств задан неправильно и не может быть прочитан:\n{}",
                    path.display()
                );
                let footer_msg = format!("Подробности об ошибке:\n{err}");
                let full_msg = format!("{base_msg}\n\n{footer_msg}");
                write!(f, "{full_msg}")
            }
            Self::NameRegexpInvalid { pattern, err } => {
                let base_msg = format!(
                    r#"Регулярное выражение для разбора имен файлов задано неправильно:
"{pattern}""#
                );
                let footer_msg = format!("Подробности об ошибке:\n{err}");
                let full_msg = format!("{base_msg}\n\n{footer_msg}");
                write!(f, "{full_msg}")
            }
            Self::GroupIndexOutOfRange {
                field,
                index,
                group_count,
            } => {
                let msg = format!(
                    r#"Конфигурация задана неправильно: для поля "{field}" указана группа {index},
но регулярное выражение содержит только {group_count} групп(ы).
Проверьте таблицу [groups] и выражение name_regexp в файле свойств."#
                );
                write!(f, "{msg}")
            }
            Self::CodeTablesLengthMismatch { cyr_len, lat_len } => {
                let msg = format!(
                    r#"Списки кодов документов разной длины: кириллических {cyr_len}, латинских {lat_len}.
Списки document_codes_cyr и document_codes_lat должны соответствовать друг другу поэлементно."#
                );
                write!(f, "{msg}")
            }
            Self::DirTraversal { path, err } => {
                let base_msg = format!(
                    "Не удалось обойти папку с исходными файлами:\n{}",
                    path.display()
                );
                let footer_msg = format!("Подробности об ошибке:\n{err}");
                let full_msg = format!("{base_msg}\n\n{footer_msg}");
                write!(f, "{full_msg}")
            }
            Self::FileAttributesUnreadable { path, err } => {
                let base_msg = format!("Не удалось считать атрибуты файла:\n{}", path.display());
                let footer_msg = format!("Подробности об ошибке:\n{err}");
                let full_msg = format!("{base_msg}\n\n{footer_msg}");
                write!(f, "{full_msg}")
            }
            Self::FileReadFailed { path, err } => {
                let base_msg = format!("Не удалось прочитать файл:\n{}", path.display());
                let footer_msg = format!("Подробности об ошибке:\n{err}");
                let full_msg = format!("{base_msg}\n\n{footer_msg}");
                write!(f, "{full_msg}")
            }
            Self::FileCopyFailed { path, err } => {
                let base_msg = format!("Не удалось скопировать файл:\n{}", path.display());
                let footer_msg = format!("Подробности об ошибке:\n{err}");
                let full_msg = format!("{base_msg}\n\n{footer_msg}");
                write!(f, "{full_msg}")
            }
            Self::FileDeleteFailed { path, err } => {
                let base_msg = format!("Не удалось удалить файл:\n{}", path.display());
                let footer_msg = format!("Подробности об ошибке:\n{err}");
                let full_msg = format!("{base_msg}\n\n{footer_msg}");
                write!(f, "{full_msg}")
            }
            Self::MalformedCellAddress(address) => {
                let msg = format!(
                    r#"Неправильно задан адрес ячейки: "{address}".
Адрес должен состоять из буквенного обозначения столбца и номера строки,
например "C12" или "A16:A19"."#
                );
                write!(f, "{msg}")
            }
            Self::XlsxwriterWorkbookCreation { wb_name, err } => {
                let base_msg = format!(
                    r#"Не удалась попытка создания файла Excel с именем "{wb_name}", речь о файле Excel,
который содержит информационно-удостоверяющий лист."#
                );
                let footer_msg = format!("Подробности об ошибке:\n{err}");
                let full_msg = format!("{base_msg}\n\n{footer_msg}");
                write!(f, "{full_msg}")
            }
            Self::XlsxwriterSheetCreation(err) => {
                let base_msg =
                    "Не удалась попытка создания листа внутри нового файла Excel, речь о листе,
на котором должен быть размещен информационно-удостоверяющий лист.";
                let footer_msg = format!("Подробности об ошибке:\n{err}");
                let full_msg = format!("{base_msg}\n\n{footer_msg}");
                write!(f, "{full_msg}")
            }
            Self::XlsxwriterCellWriteFailed(err) => {
                let base_msg =
                    "Не удалась попытка записи данных в ячейку нового файла Excel, того самого,
который ожидается как информационно-удостоверяющий лист.";
                let footer_msg = format!("Подробности об ошибке:\n{err}");
                let full_msg = format!("{base_msg}\n\n{footer_msg}");
                write!(f, "{full_msg}")
            }
            Self::XlsxwriterWorkbookClose { wb_name, .. } => {
                let msg = format!(
                    r#"Не удалось сохранение на диск файла Excel с именем "{wb_name}", который содержит
информационно-удостоверяющий лист.

Вероятная причина: не закрыт файл Excel с результатом прошлого запуска."#
                );
                write!(f, "{msg}")
            }
        }
    }
}
