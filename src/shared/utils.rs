// Номер столбца Excel по его буквенному обозначению ("A" -> 0, "Q" -> 16, "AHC" -> 886)
pub fn get_xl_column_number(letters: &str) -> Option<u16> {
    if letters.is_empty() {
        return None;
    }

    let mut number: u32 = 0;
    for ch in letters.chars() {
        let ch = ch.to_ascii_uppercase();
        if !ch.is_ascii_uppercase() {
            return None;
        }
        number = number * 26 + (ch as u32 - 'A' as u32 + 1);
    }

    Some((number - 1) as u16)
}

// Перевод ширины столбца из пикселей (как в шаблоне формы) в символьные единицы xlsxwriter
pub fn pixel2width_units(pixel: u32) -> f64 {
    pixel as f64 / 7.0
}

#[cfg(test)]
mod tests {
    #[test]
    fn column_number_from_letters_01() {
        use super::get_xl_column_number;
        assert_eq!(get_xl_column_number("A"), Some(0));
        assert_eq!(get_xl_column_number("Q"), Some(16));
    }
    #[test]
    fn column_number_from_letters_02() {
        use super::get_xl_column_number;
        assert_eq!(get_xl_column_number("AHC"), Some(886));
        assert_eq!(get_xl_column_number("BDJ"), Some(1465));
    }
    #[test]
    fn column_number_rejects_non_letters() {
        use super::get_xl_column_number;
        assert_eq!(get_xl_column_number(""), None);
        assert_eq!(get_xl_column_number("Ф"), None);
    }
}
