use crate::config::FieldGroups;
use crate::errors::Error;
use regex::Regex;

/// Разбор имени файла по настраиваемому регулярному выражению.
/// Номера групп выражения закреплены за смысловыми полями таблицей
/// [groups] файла свойств; соответствие проверяется один раз при старте.
#[derive(Debug)]
pub struct FieldMap {
    regex: Regex,
    groups: FieldGroups,
}

/// Поля, извлеченные из одного имени файла. Каждое поле опционально:
/// незадействованная необязательная группа выражения - это отсутствие
/// значения, а не ошибка разбора.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub organization: Option<String>,
    pub characteristic: Option<String>,
    pub registration: Option<String>,
    pub species: Option<String>,
    pub document_code: Option<String>,
    pub version: Option<String>,
    pub name: Option<String>,
    pub extension: Option<String>,
}

impl FieldMap {
    pub fn new(pattern: &str, groups: FieldGroups) -> Result<FieldMap, Error> {
        let regex = Regex::new(pattern).map_err(|err| Error::NameRegexpInvalid {
            pattern: pattern.to_owned(),
            err,
        })?;

        let group_count = regex.captures_len();
        for (field, index) in groups.named_indices() {
            if index >= group_count {
                return Err(Error::GroupIndexOutOfRange {
                    field,
                    index,
                    group_count,
                });
            }
        }

        Ok(FieldMap { regex, groups })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Поиск по выражению (не полное сопоставление: якоря задает само
    /// выражение). None - имя файла не подходит под соглашение.
    pub fn parse(&self, filename: &str) -> Option<ParsedName> {
        let captures = self.regex.captures(filename)?;
        let group = |index: usize| captures.get(index).map(|m| m.as_str().to_owned());

        Some(ParsedName {
            organization: group(self.groups.organization),
            characteristic: group(self.groups.characteristic),
            registration: group(self.groups.registration),
            species: group(self.groups.species),
            document_code: group(self.groups.document_code),
            version: group(self.groups.version),
            name: group(self.groups.name),
            extension: group(self.groups.extension),
        })
    }
}

impl ParsedName {
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Properties;
    use pretty_assertions::assert_eq;

    fn default_field_map() -> FieldMap {
        let properties = Properties::default();
        FieldMap::new(&properties.name_regexp, properties.groups).unwrap()
    }

    #[test]
    fn cyrillic_name_with_species_and_title() {
        let parsed = default_field_map()
            .parse("ИГУЛ.123456.789-01 СБ Test Document.dwg")
            .unwrap();

        assert_eq!(parsed.organization.as_deref(), Some("ИГУЛ"));
        assert_eq!(parsed.characteristic.as_deref(), Some("123456"));
        assert_eq!(parsed.registration.as_deref(), Some("789"));
        assert_eq!(parsed.species.as_deref(), Some("01"));
        assert_eq!(parsed.document_code.as_deref(), Some("СБ"));
        assert_eq!(parsed.version, None);
        assert_eq!(parsed.name.as_deref(), Some("Test Document"));
        assert_eq!(parsed.extension.as_deref(), Some("dwg"));
    }

    #[test]
    fn latin_name_without_title() {
        let parsed = default_field_map()
            .parse("IGUL123456789-01_sb_02.xlsx")
            .unwrap();

        assert_eq!(parsed.organization.as_deref(), Some("IGUL"));
        assert_eq!(parsed.characteristic.as_deref(), Some("123456"));
        assert_eq!(parsed.registration.as_deref(), Some("789"));
        assert_eq!(parsed.species.as_deref(), Some("01"));
        assert_eq!(parsed.document_code.as_deref(), Some("sb"));
        assert_eq!(parsed.version.as_deref(), Some("02"));
        assert_eq!(parsed.name, None);
        assert_eq!(parsed.extension.as_deref(), Some("xlsx"));
    }

    #[test]
    fn optional_groups_are_absent_not_errors() {
        let parsed = default_field_map()
            .parse("ИГУЛ.123456.789 Наименование.dwg")
            .unwrap();

        assert_eq!(parsed.species, None);
        assert_eq!(parsed.version, None);
        // обязательные поля соглашения всегда заполнены при совпадении
        assert!(parsed.organization.is_some());
        assert!(parsed.characteristic.is_some());
        assert!(parsed.registration.is_some());
        assert!(parsed.extension.is_some());
    }

    #[test]
    fn foreign_name_gives_no_match() {
        assert_eq!(default_field_map().parse("отчет за март.docx"), None);
        assert_eq!(default_field_map().parse("ИГУЛ.12.789 СБ x.dwg"), None);
    }

    #[test]
    fn out_of_range_group_index_is_a_config_error() {
        let properties = Properties::default();
        let mut groups = properties.groups;
        groups.version = 40;

        let result = FieldMap::new(&properties.name_regexp, groups);
        assert!(matches!(
            result,
            Err(Error::GroupIndexOutOfRange { field: "version", index: 40, .. })
        ));
    }

    #[test]
    fn broken_pattern_is_a_config_error() {
        let properties = Properties::default();
        let result = FieldMap::new("([", properties.groups);
        assert!(matches!(result, Err(Error::NameRegexpInvalid { .. })));
    }
}
