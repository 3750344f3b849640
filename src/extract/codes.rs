use crate::config::Properties;

/// Приведение кода документа к канонической паре (кириллица, латиница).
/// Алфавит исходного кода выбирается по коду организации: латинский код
/// организации означает поиск в латинской таблице, любой другой - в
/// кириллической. Найденный код канонизируется в обоих алфавитах, даже
/// если записан "не своим" алфавитом. Ненайденный код не ошибка:
/// нетиповые коды документов возвращаются как есть.
pub fn resolve_document_code(
    raw_code: Option<&str>,
    organization: Option<&str>,
    properties: &Properties,
) -> (Option<String>, Option<String>) {
    let raw_code = match raw_code {
        Some(code) => code,
        None => return (None, None),
    };

    let lookup_latin = organization == Some(properties.latin_organization.as_str());
    let table = if lookup_latin {
        &properties.document_codes_lat
    } else {
        &properties.document_codes_cyr
    };

    let needle = raw_code.to_lowercase();
    let found = table
        .iter()
        .position(|code| code.to_lowercase() == needle);

    match found {
        Some(index) => (
            Some(properties.document_codes_cyr[index].clone()),
            Some(properties.document_codes_lat[index].clone()),
        ),
        None => (Some(raw_code.to_owned()), Some(raw_code.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn props() -> Properties {
        Properties::default()
    }

    #[test]
    fn canonical_cyrillic_code_resolves_to_itself() {
        let (cyr, lat) = resolve_document_code(Some("СБ"), Some("ИГУЛ"), &props());
        assert_eq!(cyr.as_deref(), Some("СБ"));
        assert_eq!(lat.as_deref(), Some("sb"));
    }

    #[test]
    fn latin_organization_selects_latin_table() {
        let (cyr, lat) = resolve_document_code(Some("SB"), Some("IGUL"), &props());
        assert_eq!(cyr.as_deref(), Some("СБ"));
        assert_eq!(lat.as_deref(), Some("sb"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let (cyr, lat) = resolve_document_code(Some("мэ"), Some("ИГУЛ"), &props());
        assert_eq!(cyr.as_deref(), Some("МЭ"));
        assert_eq!(lat.as_deref(), Some("me"));
    }

    #[test]
    fn unresolved_code_passes_through_unchanged() {
        let (cyr, lat) = resolve_document_code(Some("ЩЩ"), Some("ИГУЛ"), &props());
        assert_eq!(cyr.as_deref(), Some("ЩЩ"));
        assert_eq!(lat.as_deref(), Some("ЩЩ"));
    }

    #[test]
    fn absent_code_stays_absent() {
        let (cyr, lat) = resolve_document_code(None, Some("ИГУЛ"), &props());
        assert_eq!(cyr, None);
        assert_eq!(lat, None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let properties = props();
        let (cyr, _) = resolve_document_code(Some("ТУ"), Some("ИГУЛ"), &properties);
        let (again, lat) =
            resolve_document_code(cyr.as_deref(), Some("ИГУЛ"), &properties);
        assert_eq!(again.as_deref(), Some("ТУ"));
        assert_eq!(lat.as_deref(), Some("tu"));
    }
}
