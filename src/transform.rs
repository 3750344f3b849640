use crate::config::{Mode, Properties};
use crate::errors::Error;
use crate::extract::{resolve_document_code, FieldMap, ParsedName};
use crate::ui;
use chrono::{DateTime, Local};
use md5::{Digest, Md5};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const DATE_FORMAT: &str = "%d.%m.%Y";

// Прочерк в форме вместо незаполненной версии и номера релиза,
// источника номеров релизов пока нет
const EMPTY_FIELD_PLACEHOLDER: &str = "-";

/// Параметры одного документа, собранные из обработанного файла.
/// Контрольная сумма заполнена тогда и только тогда, когда запрошено
/// создание УЛ. Автор не заполняется конвейером: при его отсутствии
/// форма ссылается на ячейку "Разработал".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDoc {
    pub designation: String,
    pub name: String,
    pub md5: Option<String>,
    pub file_name: String,
    pub size: String,
    pub date: String,
    pub version: String,
    pub release_number: String,
    pub author: Option<String>,
}

/// Обходит папку с исходными файлами на один уровень вглубь и в зависимости
/// от ключей запуска переименовывает файлы, удаляет исходники и собирает
/// список параметров документов для УЛ. Любая ошибка ввода-вывода фатальна
/// для всего прохода; файл, не подошедший под соглашение об именовании,
/// молча пропускается.
pub struct Pipeline<'a> {
    source: &'a Path,
    result: &'a Path,
    mode: Mode,
    properties: &'a Properties,
    field_map: &'a FieldMap,
    // пути, записанные этим же проходом: защита от повторной обработки
    // только что созданного файла как нового исходника
    produced: HashSet<PathBuf>,
    entries: Vec<EntryDoc>,
}

impl<'a> Pipeline<'a> {
    pub fn run(
        source: &'a Path,
        result: &'a Path,
        mode: Mode,
        properties: &'a Properties,
        field_map: &'a FieldMap,
    ) -> Result<Vec<EntryDoc>, Error> {
        let mut pipeline = Pipeline {
            source,
            result,
            mode,
            properties,
            field_map,
            produced: HashSet::new(),
            entries: Vec::new(),
        };

        pipeline.check_source_path()?;
        pipeline.create_result_path()?;
        pipeline.walk_files()?;

        Ok(pipeline.entries)
    }

    fn check_source_path(&self) -> Result<(), Error> {
        if !self.source.exists() {
            return Err(Error::SourcePathNotFound(self.source.to_owned()));
        }
        if !self.source.is_dir() {
            return Err(Error::SourcePathIsNotDir(self.source.to_owned()));
        }
        ui::display_formatted_text(
            &format!("Папка с исходниками: {}", self.source.display()),
            None,
        );
        Ok(())
    }

    fn create_result_path(&self) -> Result<(), Error> {
        if self.result.exists() && !self.result.is_dir() {
            return Err(Error::ResultPathIsNotDir(self.result.to_owned()));
        }
        if !self.result.exists() {
            fs::create_dir_all(self.result).map_err(|err| Error::ResultDirCreation {
                path: self.result.to_owned(),
                err,
            })?;
        }
        ui::display_formatted_text(
            &format!("Папка с результатом: {}", self.result.display()),
            None,
        );
        Ok(())
    }

    fn walk_files(&mut self) -> Result<(), Error> {
        ui::display_formatted_text(
            &format!("Поиск файлов по: {}\n", self.field_map.pattern()),
            None,
        );

        // порядок записей - порядок перечисления файлов файловой системой,
        // вложенные папки не обходятся
        for entry in WalkDir::new(self.source).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|err| Error::DirTraversal {
                path: self.source.to_owned(),
                err,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.into_path();
            if self.produced.contains(&path) {
                continue;
            }

            let file_name = match path.file_name().and_then(|name| name.to_str()) {
                Some(name) => name.to_owned(),
                None => continue,
            };

            if self.mode.assay_extension && !self.extension_allowed(&path) {
                continue;
            }

            let parsed = match self.field_map.parse(&file_name) {
                Some(parsed) => parsed,
                None => continue,
            };

            ui::display_formatted_text(&format!("Файл: {file_name}"), None);
            self.process_file(&path, &file_name, parsed)?;
        }

        Ok(())
    }

    // Обрабатываются только файлы с расширением из списка допустимых
    fn extension_allowed(&self, path: &Path) -> bool {
        let extension = match path.extension().and_then(|ext| ext.to_str()) {
            Some(extension) => extension.to_lowercase(),
            None => return false,
        };

        self.properties
            .filename_extensions
            .iter()
            .any(|allowed| allowed.to_lowercase() == extension)
    }

    fn process_file(
        &mut self,
        path: &Path,
        file_name: &str,
        parsed: ParsedName,
    ) -> Result<(), Error> {
        let (code_cyr, code_lat) = resolve_document_code(
            parsed.document_code.as_deref(),
            parsed.organization.as_deref(),
            self.properties,
        );

        let designation = self.designation(&parsed, code_cyr.as_deref());

        let output_file_name = if self.mode.rename {
            self.normalized_file_name(&parsed, code_lat.as_deref())
        } else {
            file_name.to_owned()
        };

        let metadata = fs::metadata(path).map_err(|err| Error::FileAttributesUnreadable {
            path: path.to_owned(),
            err,
        })?;
        let modified = metadata
            .modified()
            .map_err(|err| Error::FileAttributesUnreadable {
                path: path.to_owned(),
                err,
            })?;
        let date = DateTime::<Local>::from(modified)
            .format(DATE_FORMAT)
            .to_string();

        let destination = self.result.join(&output_file_name);
        let md5 = self.copy_and_hash(path, &destination)?;

        // удаление исходника строго после копирования и подсчета суммы
        if self.mode.delete && *path != destination {
            fs::remove_file(path).map_err(|err| Error::FileDeleteFailed {
                path: path.to_owned(),
                err,
            })?;
        }

        let entry = EntryDoc {
            designation,
            name: parsed.name_or_empty().to_owned(),
            md5,
            file_name: output_file_name,
            size: metadata.len().to_string(),
            date,
            version: parsed
                .version
                .clone()
                .unwrap_or_else(|| EMPTY_FIELD_PLACEHOLDER.to_owned()),
            release_number: EMPTY_FIELD_PLACEHOLDER.to_owned(),
            author: None,
        };

        ui::display_entry(&entry);
        self.entries.push(entry);
        self.produced.insert(destination);

        Ok(())
    }

    // Обозначение документа: "<префикс>.<характеристика>.<рег. номер>[ <код>]"
    fn designation(&self, parsed: &ParsedName, code_cyr: Option<&str>) -> String {
        let mut designation = format!(
            "{}.{}.{}",
            self.properties.designation_prefix,
            parsed.characteristic.as_deref().unwrap_or(""),
            parsed.registration.as_deref().unwrap_or(""),
        );
        if let Some(code) = code_cyr {
            designation.push(' ');
            designation.push_str(code);
        }
        designation
    }

    // Нормированное имя файла: "IGUL<характеристика><рег. номер>[-<исполнение>][_<код>][_<версия>].<расширение>"
    fn normalized_file_name(&self, parsed: &ParsedName, code_lat: Option<&str>) -> String {
        let mut name = format!(
            "{}{}{}",
            self.properties.file_prefix,
            parsed.characteristic.as_deref().unwrap_or(""),
            parsed.registration.as_deref().unwrap_or(""),
        );
        if let Some(species) = &parsed.species {
            name.push('-');
            name.push_str(species);
        }
        if let Some(code) = code_lat {
            name.push('_');
            name.push_str(code);
        }
        if let Some(version) = &parsed.version {
            name.push('_');
            name.push_str(version);
        }
        name.push('.');
        name.push_str(parsed.extension.as_deref().unwrap_or(""));
        name
    }

    // Копирование и контрольная сумма по матрице ключей запуска.
    // Совпадение источника и назначения делает копирование лишним,
    // но сумма все равно считается по байтам источника.
    fn copy_and_hash(
        &self,
        source: &Path,
        destination: &Path,
    ) -> Result<Option<String>, Error> {
        let copy_in_place = source == destination;

        match (self.mode.rename, self.mode.create_report) {
            (true, true) if copy_in_place => Ok(Some(md5_of_file(source)?)),
            (true, true) => Ok(Some(copy_file_with_md5(source, destination)?)),
            (true, false) => {
                if !copy_in_place {
                    fs::copy(source, destination).map_err(|err| Error::FileCopyFailed {
                        path: source.to_owned(),
                        err,
                    })?;
                }
                Ok(None)
            }
            (false, true) => Ok(Some(md5_of_file(source)?)),
            (false, false) => Ok(None),
        }
    }
}

fn md5_of_file(path: &Path) -> Result<String, Error> {
    let mut file = File::open(path).map_err(|err| Error::FileReadFailed {
        path: path.to_owned(),
        err,
    })?;

    let mut hasher = Md5::new();
    let mut buf = [0_u8; 8192];

    loop {
        let count = file.read(&mut buf).map_err(|err| Error::FileReadFailed {
            path: path.to_owned(),
            err,
        })?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

// Один проход по байтам источника: сумма считается одновременно с записью
// копии, файл не перечитывается
fn copy_file_with_md5(source: &Path, destination: &Path) -> Result<String, Error> {
    let mut input = File::open(source).map_err(|err| Error::FileReadFailed {
        path: source.to_owned(),
        err,
    })?;
    let mut output = File::create(destination).map_err(|err| Error::FileCopyFailed {
        path: source.to_owned(),
        err,
    })?;

    let mut hasher = Md5::new();
    let mut buf = [0_u8; 8192];

    loop {
        let count = input.read(&mut buf).map_err(|err| Error::FileReadFailed {
            path: source.to_owned(),
            err,
        })?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
        output
            .write_all(&buf[..count])
            .map_err(|err| Error::FileCopyFailed {
                path: source.to_owned(),
                err,
            })?;
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const MODE_RENAME_REPORT: Mode = Mode {
        rename: true,
        delete: false,
        create_report: true,
        assay_extension: false,
    };

    fn run_pipeline(
        source: &Path,
        result: &Path,
        mode: Mode,
        properties: &Properties,
    ) -> Result<Vec<EntryDoc>, Error> {
        let field_map = FieldMap::new(&properties.name_regexp, properties.groups).unwrap();
        Pipeline::run(source, result, mode, properties, &field_map)
    }

    #[test]
    fn rename_and_report_produce_a_complete_entry() {
        let source = TempDir::new().unwrap();
        let result = TempDir::new().unwrap();
        fs::write(
            source.path().join("ИГУЛ.123456.789-01 СБ Test Document.dwg"),
            b"payload",
        )
        .unwrap();

        let properties = Properties::default();
        let entries = run_pipeline(
            source.path(),
            result.path(),
            MODE_RENAME_REPORT,
            &properties,
        )
        .unwrap();

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.designation, "ИГУЛ.123456.789 СБ");
        assert_eq!(entry.name, "Test Document");
        assert_eq!(entry.version, "-");
        assert_eq!(entry.release_number, "-");
        assert_eq!(entry.file_name, "IGUL123456789-01_sb.dwg");
        assert_eq!(entry.size, "7");

        let md5 = entry.md5.as_deref().unwrap();
        assert_eq!(md5.len(), 32);
        assert!(md5.chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_eq!(md5, format!("{:x}", Md5::digest(b"payload")));

        // копия создана, исходник без ключа удаления остается
        let copied = result.path().join("IGUL123456789-01_sb.dwg");
        assert_eq!(fs::read(copied).unwrap(), b"payload");
        assert!(source
            .path()
            .join("ИГУЛ.123456.789-01 СБ Test Document.dwg")
            .exists());
    }

    #[test]
    fn version_token_flows_into_entry_and_file_name() {
        let source = TempDir::new().unwrap();
        let result = TempDir::new().unwrap();
        fs::write(
            source.path().join("ИГУЛ.123456.789-01 СБ_02 Чертеж.dwg"),
            b"x",
        )
        .unwrap();

        let properties = Properties::default();
        let entries = run_pipeline(
            source.path(),
            result.path(),
            MODE_RENAME_REPORT,
            &properties,
        )
        .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].version, "02");
        assert_eq!(entries[0].file_name, "IGUL123456789-01_sb_02.dwg");
    }

    #[test]
    fn report_only_keeps_the_original_file_name() {
        let source = TempDir::new().unwrap();
        let result = TempDir::new().unwrap();
        let original = "ИГУЛ.123456.789 МЭ Схема.dwg";
        fs::write(source.path().join(original), b"abc").unwrap();

        let mode = Mode {
            rename: false,
            delete: false,
            create_report: true,
            assay_extension: false,
        };
        let properties = Properties::default();
        let entries = run_pipeline(source.path(), result.path(), mode, &properties).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name, original);
        assert!(entries[0].md5.is_some());
        // без переименования копия не создается
        assert!(!result.path().join(original).exists());
    }

    #[test]
    fn delete_removes_the_source_after_copy() {
        let source = TempDir::new().unwrap();
        let result = TempDir::new().unwrap();
        fs::write(source.path().join("ИГУЛ.123456.789 СБ Имя.dwg"), b"abc").unwrap();

        let mode = Mode {
            rename: true,
            delete: true,
            create_report: false,
            assay_extension: false,
        };
        let properties = Properties::default();
        let entries = run_pipeline(source.path(), result.path(), mode, &properties).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].md5, None);
        assert!(!source.path().join("ИГУЛ.123456.789 СБ Имя.dwg").exists());
        assert!(result.path().join("IGUL123456789_sb.dwg").exists());
    }

    #[test]
    fn extension_filter_admits_only_allowed_extensions() {
        let source = TempDir::new().unwrap();
        let result = TempDir::new().unwrap();
        fs::write(source.path().join("ИГУЛ.123456.789 СБ Да.dwg"), b"a").unwrap();
        fs::write(source.path().join("ИГУЛ.123456.790 СБ Нет.pdf"), b"b").unwrap();

        let mode = Mode {
            rename: false,
            delete: false,
            create_report: true,
            assay_extension: true,
        };
        let properties = Properties::default();
        let entries = run_pipeline(source.path(), result.path(), mode, &properties).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].designation, "ИГУЛ.123456.789 СБ");
    }

    #[test]
    fn files_outside_the_naming_convention_are_silently_skipped() {
        let source = TempDir::new().unwrap();
        let result = TempDir::new().unwrap();
        fs::write(source.path().join("отчет за март.docx"), b"a").unwrap();
        fs::create_dir(source.path().join("ИГУЛ.123456.789 СБ Папка.dwg")).unwrap();

        let properties = Properties::default();
        let entries = run_pipeline(
            source.path(),
            result.path(),
            MODE_RENAME_REPORT,
            &properties,
        )
        .unwrap();

        assert!(entries.is_empty());
    }

    #[test]
    fn empty_source_dir_gives_an_empty_entry_list() {
        let source = TempDir::new().unwrap();
        let result = TempDir::new().unwrap();

        let properties = Properties::default();
        let entries = run_pipeline(
            source.path(),
            result.path(),
            MODE_RENAME_REPORT,
            &properties,
        )
        .unwrap();

        assert!(entries.is_empty());
    }

    // Файл, записанный в ходе прохода, не должен быть обработан этим же
    // проходом как новый исходник
    #[test]
    fn renamed_output_is_not_reingested_within_one_pass() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ИГУЛ.123456.789-01 СБ Test Document.dwg"),
            b"payload",
        )
        .unwrap();

        let properties = Properties::default();
        let entries =
            run_pipeline(dir.path(), dir.path(), MODE_RENAME_REPORT, &properties).unwrap();

        assert_eq!(entries.len(), 1);
        assert!(dir.path().join("IGUL123456789-01_sb.dwg").exists());
    }

    // Копирование на то же самое место: сумма считается, файл не портится
    #[test]
    fn copy_in_place_still_hashes_the_source_bytes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("IGUL123456789-01_sb.dwg"), b"payload").unwrap();

        let properties = Properties::default();
        let entries =
            run_pipeline(dir.path(), dir.path(), MODE_RENAME_REPORT, &properties).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].md5.as_deref().unwrap(),
            format!("{:x}", Md5::digest(b"payload"))
        );
        assert_eq!(
            fs::read(dir.path().join("IGUL123456789-01_sb.dwg")).unwrap(),
            b"payload"
        );
    }

    #[test]
    fn missing_source_dir_is_fatal() {
        let result = TempDir::new().unwrap();
        let properties = Properties::default();
        let outcome = run_pipeline(
            Path::new("/нет/такой/папки"),
            result.path(),
            MODE_RENAME_REPORT,
            &properties,
        );
        assert!(matches!(outcome, Err(Error::SourcePathNotFound(_))));
    }
}
