use crate::errors::Error;
use crate::transform::EntryDoc;
use console::Style;

pub fn display_formatted_text(text: &str, style: Option<Style>) {
    match style {
        Some(style) => println!("{}", style.apply_to(text)),
        None => println!("{text}"),
    }
}

pub fn display_error(err: &Error) {
    display_formatted_text(&format!("\n{err}"), Some(Style::new().red()));
}

#[rustfmt::skip]
pub fn display_entry(entry: &EntryDoc) {
    display_formatted_text(&format!("Обозначение: {}", entry.designation), None);
    display_formatted_text(&format!("Наименование: {}", entry.name), None);
    display_formatted_text(&format!("MD5: {}", entry.md5.as_deref().unwrap_or("")), None);
    display_formatted_text(&format!("Новое имя файла: {}", entry.file_name), None);
    display_formatted_text(&format!("Размер файла: {}", entry.size), None);
    display_formatted_text(&format!("Дата последнего редактирования: {}", entry.date), None);
    display_formatted_text(&format!("Версия: {}", entry.version), None);
    display_formatted_text(&format!("Номер релиза: {}", entry.release_number), None);
    display_formatted_text(&format!("Автор: {}", entry.author.as_deref().unwrap_or("")), None);
    display_formatted_text("-----------------------", None);
}
