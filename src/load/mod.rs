mod grid;
mod layout;

pub use grid::GridAddress;
pub use layout::LayoutPlan;

use crate::config::Properties;
use crate::errors::Error;
use crate::shared::utils::pixel2width_units;
use crate::transform::EntryDoc;
use crate::ui;
use layout::FOLLOW_PAGE_HEIGHT;
use std::path::Path;
use xlsxwriter::prelude::*;

pub const REPORT_FILE_NAME: &str = "УЛ.xlsx";

const SHEET_NAME: &str = "Уд. лист";

// Ширины столбцов A..Q шаблона формы, в пикселях
#[rustfmt::skip]
const COLUMN_WIDTHS_PIXELS: [u32; 17] = [
    19, 26, 26, 29, 9, 86, 57, 38, 19, 246, 19, 19, 19, 36, 20, 36, 40,
];

const THIN: FormatBorder = FormatBorder::Thin;
const DOTTED: FormatBorder = FormatBorder::Dotted;
const NONE: FormatBorder = FormatBorder::None;

// (низ, верх, лево, право) - порядок как у рамок шаблона
type Borders = (FormatBorder, FormatBorder, FormatBorder, FormatBorder);

const BORDER_THIN: Borders = (THIN, THIN, THIN, THIN);
// рамки строк четырехстрочного блока записи
const BORDER_BLOCK_TOP: Borders = (DOTTED, THIN, THIN, THIN);
const BORDER_BLOCK_MIDDLE: Borders = (DOTTED, DOTTED, THIN, THIN);
const BORDER_BLOCK_BOTTOM: Borders = (THIN, DOTTED, THIN, THIN);

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Center,
    Rotation,
}

/// Отрисовка информационно-удостоверяющего листа: неизменный шаблон
/// печатной формы плюс четырехстрочный блок на каждый документ. Все
/// координаты второго и последующих листов получаются сдвигом адресов
/// шаблона первого листа, строки блоков записей дает LayoutPlan.
pub struct Report<'a> {
    entries: &'a [EntryDoc],
    properties: &'a Properties,
    plan: LayoutPlan,
}

impl<'a> Report<'a> {
    pub fn new(entries: &'a [EntryDoc], properties: &'a Properties) -> Report<'a> {
        Report {
            entries,
            properties,
            plan: LayoutPlan::new(entries.len()),
        }
    }

    pub fn write(&self, path: &Path) -> Result<(), Error> {
        let wb_name = path.to_string_lossy().to_string();

        ui::display_formatted_text("Создание информационно-удостоверяющего листа", None);
        let workbook =
            Workbook::new(&wb_name).map_err(|err| Error::XlsxwriterWorkbookCreation {
                wb_name: wb_name.clone(),
                err,
            })?;

        {
            let mut sheet = workbook
                .add_worksheet(Some(SHEET_NAME))
                .map_err(Error::XlsxwriterSheetCreation)?;

            self.set_up_print(&mut sheet)?;
            self.create_first_page(&mut sheet)?;
            for page in 2..=self.plan.page_count() {
                self.create_follow_page(&mut sheet, page)?;
            }
        }

        ui::display_formatted_text("Запись информационно-удостоверяющего листа", None);
        workbook
            .close()
            .map_err(|err| Error::XlsxwriterWorkbookClose { wb_name, err })?;

        Ok(())
    }

    fn set_up_print(&self, sheet: &mut Worksheet) -> Result<(), Error> {
        sheet.set_paper(PaperType::A4);
        sheet.set_margins(0.0, 0.0, 0.0, 0.0);
        sheet.fit_to_pages(1, self.plan.page_count() as u16);
        sheet
            .print_area(0, 0, self.plan.last_printed_row() - 1, 16)
            .map_err(Error::XlsxwriterCellWriteFailed)?;
        Ok(())
    }

    /// Первый лист: форматка со штампом, шапка таблицы и блоки записей
    fn create_first_page(&self, sheet: &mut Worksheet) -> Result<(), Error> {
        // ширины столбцов задаются один раз на весь документ
        for (index, pixels) in COLUMN_WIDTHS_PIXELS.iter().enumerate() {
            sheet
                .set_column(
                    index as u16,
                    index as u16,
                    pixel2width_units(*pixels),
                    None,
                )
                .map_err(Error::XlsxwriterCellWriteFailed)?;
        }
        set_page_row_heights(sheet, 0, 27, 36)?;

        // поля форматки с поворотом надписей
        for (region, spacer, caption) in [
            ("A1:A7", "B1:B7", "Перв. примен."),
            ("A8:A14", "B8:B14", "Справ. №"),
            ("A16:A19", "B16:B19", "Подп. и дата"),
            ("A20:A22", "B20:B22", "Инв. № дубл."),
            ("A23:A25", "B23:B25", "Взам. инв №"),
            ("A26:A30", "B26:B30", "Подп. и дата"),
            ("A31:A35", "B31:B35", "Инв. № подл."),
        ] {
            put_text(sheet, region, 0, caption, 9.0, Align::Rotation, BORDER_THIN)?;
            put_text(sheet, spacer, 0, "", 9.0, Align::Rotation, BORDER_THIN)?;
        }

        // извещения об изменениях
        for region in ["C28", "D28:E28", "F28", "G28", "H28"] {
            put_blank(sheet, region, 0, BORDER_BLOCK_TOP)?;
        }
        for region in ["C29", "D29:E29", "F29", "G29", "H29"] {
            put_blank(sheet, region, 0, BORDER_BLOCK_BOTTOM)?;
        }

        // строка подписей штампа
        for (region, caption) in [
            ("C30", "Изм."),
            ("D30:E30", "Лист"),
            ("F30", "№ докум."),
            ("G30", "Подп."),
            ("H30", "Дата"),
        ] {
            put_text(sheet, region, 0, caption, 9.0, Align::Center, BORDER_THIN)?;
        }

        put_text(sheet, "C31:E31", 0, "Разраб.", 9.0, Align::Left, BORDER_BLOCK_TOP)?;
        put_text(sheet, "F31", 0, &self.properties.author, 9.0, Align::Left, BORDER_BLOCK_TOP)?;
        put_blank(sheet, "G31", 0, BORDER_BLOCK_TOP)?;
        put_blank(sheet, "H31", 0, BORDER_BLOCK_TOP)?;

        put_text(sheet, "C32:E32", 0, "Пров.", 9.0, Align::Left, BORDER_BLOCK_MIDDLE)?;
        put_text(sheet, "F32", 0, &self.properties.checked, 9.0, Align::Left, BORDER_BLOCK_MIDDLE)?;
        put_blank(sheet, "G32", 0, BORDER_BLOCK_MIDDLE)?;
        put_blank(sheet, "H32", 0, BORDER_BLOCK_MIDDLE)?;

        for region in ["C33:E33", "F33", "G33", "H33"] {
            put_blank(sheet, region, 0, BORDER_BLOCK_MIDDLE)?;
        }

        put_text(sheet, "C34:E34", 0, "Н. контр.", 9.0, Align::Left, BORDER_BLOCK_MIDDLE)?;
        for region in ["F34", "G34", "H34"] {
            put_blank(sheet, region, 0, BORDER_BLOCK_MIDDLE)?;
        }

        put_text(sheet, "C35:E35", 0, "Утв.", 9.0, Align::Left, BORDER_BLOCK_BOTTOM)?;
        put_text(sheet, "F35", 0, &self.properties.approved, 9.0, Align::Left, BORDER_BLOCK_BOTTOM)?;
        put_blank(sheet, "G35", 0, BORDER_BLOCK_BOTTOM)?;
        put_blank(sheet, "H35", 0, BORDER_BLOCK_BOTTOM)?;

        // обозначение и наименование формы
        put_text(
            sheet,
            "I28:Q30",
            0,
            &self.properties.report_designation,
            20.0,
            Align::Center,
            BORDER_THIN,
        )?;
        put_text(
            sheet,
            "I31:J35",
            0,
            "Информационно-\nудостоверяющий\nлист",
            16.0,
            Align::Center,
            BORDER_THIN,
        )?;

        // литера
        put_text(sheet, "K31:M31", 0, "Лит.", 9.0, Align::Center, BORDER_THIN)?;
        for region in ["K32", "L32", "M32"] {
            put_text(sheet, region, 0, "", 9.0, Align::Center, BORDER_THIN)?;
        }

        // листы
        put_text(sheet, "N31:O31", 0, "Лист", 9.0, Align::Center, BORDER_THIN)?;
        put_text(sheet, "P31:Q31", 0, "Листов.", 9.0, Align::Center, BORDER_THIN)?;
        let page_count = self.plan.page_count();
        if page_count == 1 {
            put_text(sheet, "N32:O32", 0, "", 9.0, Align::Center, BORDER_THIN)?;
            put_text(sheet, "P32:Q32", 0, "1", 9.0, Align::Center, BORDER_THIN)?;
        } else {
            put_text(sheet, "N32:O32", 0, "1", 9.0, Align::Center, BORDER_THIN)?;
            put_text(
                sheet,
                "P32:Q32",
                0,
                &page_count.to_string(),
                9.0,
                Align::Center,
                BORDER_THIN,
            )?;
        }

        put_text(
            sheet,
            "K33:Q35",
            0,
            &self.properties.company,
            16.0,
            Align::Center,
            BORDER_THIN,
        )?;

        self.write_table_header(sheet, 0)?;

        // блоки записей, включая пустые места в конце листа
        for slot in self.plan.page_slots(1) {
            self.write_entry_block(sheet, slot)?;
        }

        // доводка рамки справа
        put_blank(sheet, "Q26", 0, (NONE, THIN, NONE, THIN))?;
        put_blank(sheet, "Q27", 0, (THIN, NONE, NONE, THIN))?;

        put_text(sheet, "I36", 0, "Копировал:", 9.0, Align::Left, (NONE, NONE, NONE, NONE))?;
        put_text(sheet, "K36", 0, "Формат: А4", 9.0, Align::Left, (NONE, NONE, NONE, NONE))?;

        Ok(())
    }

    /// Второй и последующие листы: укороченная форматка, адреса получены
    /// сдвигом шаблона первого листа
    fn create_follow_page(&self, sheet: &mut Worksheet, page: u32) -> Result<(), Error> {
        let shift = self.plan.page_row_shift(page);
        set_page_row_heights(sheet, shift, 30, FOLLOW_PAGE_HEIGHT)?;

        for (region, spacer, caption) in [
            ("A16:A19", "B16:B19", "Подп. и дата"),
            ("A20:A22", "B20:B22", "Инв. № дубл."),
            ("A23:A25", "B23:B25", "Взам. инв №"),
            ("A26:A29", "B26:B29", "Подп. и дата"),
            ("A30:A33", "B30:B33", "Инв. № подл."),
        ] {
            put_text(sheet, region, shift, caption, 9.0, Align::Rotation, BORDER_THIN)?;
            put_text(sheet, spacer, shift, "", 9.0, Align::Rotation, BORDER_THIN)?;
        }

        for region in ["C31", "D31:E31", "F31", "G31", "H31"] {
            put_blank(sheet, region, shift, BORDER_BLOCK_TOP)?;
        }
        for region in ["C32", "D32:E32", "F32", "G32", "H32"] {
            put_blank(sheet, region, shift, BORDER_BLOCK_BOTTOM)?;
        }
        for (region, caption) in [
            ("C33", "Изм."),
            ("D33:E33", "Лист"),
            ("F33", "№ докум."),
            ("G33", "Подп."),
            ("H33", "Дата"),
        ] {
            put_text(sheet, region, shift, caption, 9.0, Align::Center, BORDER_THIN)?;
        }

        // обозначение переносится с первого листа
        put_text(
            sheet,
            "I31:P33",
            shift,
            &self.properties.report_designation,
            20.0,
            Align::Center,
            BORDER_THIN,
        )?;

        put_text(sheet, "Q31", shift, "Лист", 9.0, Align::Center, BORDER_THIN)?;
        put_text(
            sheet,
            "Q32:Q33",
            shift,
            &page.to_string(),
            11.0,
            Align::Center,
            BORDER_THIN,
        )?;

        self.write_table_header(sheet, shift)?;

        for slot in self.plan.page_slots(page) {
            self.write_entry_block(sheet, slot)?;
        }

        put_blank(sheet, "Q30", shift, (THIN, THIN, NONE, THIN))?;

        put_text(sheet, "I34", shift, "Копировал:", 9.0, Align::Left, (NONE, NONE, NONE, NONE))?;
        put_text(sheet, "K34", shift, "Формат: А4", 9.0, Align::Left, (NONE, NONE, NONE, NONE))?;

        Ok(())
    }

    // Шапка таблицы записей, одинакова на всех листах
    fn write_table_header(&self, sheet: &mut Worksheet, shift: u32) -> Result<(), Error> {
        put_text(sheet, "C1:E1", shift, "№ поз./\nHash", 9.0, Align::Center, BORDER_THIN)?;
        put_text(sheet, "F1:I1", shift, "Обозначение\nдокумента", 9.0, Align::Center, BORDER_THIN)?;
        put_text(
            sheet,
            "J1:K1",
            shift,
            "Наименование изделия\nнаименование документа",
            9.0,
            Align::Center,
            BORDER_THIN,
        )?;
        put_text(sheet, "L1:N1", shift, "Версия/\nизменение", 8.0, Align::Center, BORDER_THIN)?;
        put_text(sheet, "O1:Q1", shift, "Номер\nрелиза", 9.0, Align::Center, BORDER_THIN)?;
        Ok(())
    }

    /// Один четырехстрочный блок: место под запись рисуется всегда,
    /// содержимое - только когда запись с таким номером существует
    fn write_entry_block(&self, sheet: &mut Worksheet, entry_number: usize) -> Result<(), Error> {
        let shift = self.plan.entry_first_row(entry_number);
        let entry = self.entries.get(entry_number - 1);

        let number = entry.map(|_| entry_number.to_string()).unwrap_or_default();
        let designation = entry.map(|e| e.designation.as_str()).unwrap_or("");
        let name = entry.map(|e| e.name.as_str()).unwrap_or("");
        let version = entry.map(|e| e.version.as_str()).unwrap_or("");
        let release = entry.map(|e| e.release_number.as_str()).unwrap_or("");
        let md5_label = entry.map(|_| "MD5").unwrap_or("");
        let md5 = entry.and_then(|e| e.md5.as_deref()).unwrap_or("");
        let file_name = entry.map(|e| e.file_name.as_str()).unwrap_or("");
        let size = entry.map(|e| e.size.as_str()).unwrap_or("");
        let date = entry.map(|e| e.date.as_str()).unwrap_or("");

        put_text(sheet, "C0:E0", shift, &number, 10.0, Align::Center, BORDER_BLOCK_TOP)?;
        put_text(sheet, "F0:I0", shift, designation, 10.0, Align::Center, BORDER_BLOCK_TOP)?;
        put_text(sheet, "J0:K0", shift, name, 10.0, Align::Center, BORDER_BLOCK_TOP)?;
        put_text(sheet, "L0:N0", shift, version, 10.0, Align::Center, BORDER_BLOCK_TOP)?;
        put_text(sheet, "O0:Q0", shift, release, 10.0, Align::Center, BORDER_BLOCK_TOP)?;

        put_text(sheet, "C1:E1", shift, md5_label, 10.0, Align::Center, BORDER_BLOCK_MIDDLE)?;
        put_text(sheet, "F1:K1", shift, md5, 10.0, Align::Left, BORDER_BLOCK_MIDDLE)?;
        put_blank(sheet, "L1:Q1", shift, BORDER_BLOCK_MIDDLE)?;

        put_text(sheet, "C2:K2", shift, file_name, 10.0, Align::Left, BORDER_BLOCK_MIDDLE)?;
        match entry {
            Some(entry) => match &entry.author {
                Some(author) => {
                    put_text(sheet, "L2:Q2", shift, author, 10.0, Align::Center, BORDER_BLOCK_MIDDLE)?
                }
                // автор не задан: форма ссылается на ячейку "Разработал"
                None => put_formula(sheet, "L2:Q2", shift, "=F31", 10.0, Align::Center, BORDER_BLOCK_MIDDLE)?,
            },
            None => put_blank(sheet, "L2:Q2", shift, BORDER_BLOCK_MIDDLE)?,
        }

        put_text(sheet, "C3:I3", shift, size, 10.0, Align::Center, BORDER_BLOCK_BOTTOM)?;
        put_text(sheet, "J3:K3", shift, date, 10.0, Align::Center, BORDER_BLOCK_BOTTOM)?;
        put_blank(sheet, "L3:Q3", shift, BORDER_BLOCK_BOTTOM)?;

        Ok(())
    }
}

// Высоты строк одного листа: высокая строка шапки, строки записей,
// низкие строки штампа
fn set_page_row_heights(
    sheet: &mut Worksheet,
    first_row_index: u32,
    table_rows: u32,
    page_height: u32,
) -> Result<(), Error> {
    sheet
        .set_row(first_row_index, 45.0, None)
        .map_err(Error::XlsxwriterCellWriteFailed)?;
    for index in first_row_index + 1..first_row_index + table_rows {
        sheet
            .set_row(index, 25.5, None)
            .map_err(Error::XlsxwriterCellWriteFailed)?;
    }
    for index in first_row_index + table_rows..first_row_index + page_height {
        sheet
            .set_row(index, 15.0, None)
            .map_err(Error::XlsxwriterCellWriteFailed)?;
    }
    Ok(())
}

fn text_format(size: f64, align: Align, wrap: bool, borders: Borders) -> Format {
    let mut format = Format::new();
    format
        .set_font_name("Arial")
        .set_font_size(size)
        .set_italic()
        .set_vertical_align(FormatVerticalAlignment::VerticalCenter);

    match align {
        Align::Left => {
            format.set_align(FormatAlignment::Left);
        }
        Align::Center => {
            format.set_align(FormatAlignment::Center);
        }
        Align::Rotation => {
            format.set_align(FormatAlignment::Center).set_rotation(90);
        }
    }

    if wrap {
        format.set_text_wrap();
    }

    let (bottom, top, left, right) = borders;
    format
        .set_border_bottom(bottom)
        .set_border_top(top)
        .set_border_left(left)
        .set_border_right(right);

    format
}

fn border_format(borders: Borders) -> Format {
    let mut format = Format::new();
    let (bottom, top, left, right) = borders;
    format
        .set_border_bottom(bottom)
        .set_border_top(top)
        .set_border_left(left)
        .set_border_right(right);
    format
}

/// Пишет текст в ячейку или регион, заданный адресом шаблона первого
/// листа и сдвигом по строкам
fn put_text(
    sheet: &mut Worksheet,
    template_address: &str,
    shift: u32,
    text: &str,
    font_size: f64,
    align: Align,
    borders: Borders,
) -> Result<(), Error> {
    let format = text_format(font_size, align, text.contains('\n'), borders);
    let address = GridAddress::parse(template_address)?.shift(shift);
    let ((first_row, first_col), (last_row, last_col)) = address.to_indices()?;

    if address.is_single_cell() {
        sheet
            .write_string(first_row, first_col, text, Some(&format))
            .map_err(Error::XlsxwriterCellWriteFailed)
    } else {
        sheet
            .merge_range(first_row, first_col, last_row, last_col, text, Some(&format))
            .map_err(Error::XlsxwriterCellWriteFailed)
    }
}

// Регион без содержимого: только рамки
fn put_blank(
    sheet: &mut Worksheet,
    template_address: &str,
    shift: u32,
    borders: Borders,
) -> Result<(), Error> {
    let format = border_format(borders);
    let address = GridAddress::parse(template_address)?.shift(shift);
    let ((first_row, first_col), (last_row, last_col)) = address.to_indices()?;

    if address.is_single_cell() {
        sheet
            .write_blank(first_row, first_col, Some(&format))
            .map_err(Error::XlsxwriterCellWriteFailed)
    } else {
        sheet
            .merge_range(first_row, first_col, last_row, last_col, "", Some(&format))
            .map_err(Error::XlsxwriterCellWriteFailed)
    }
}

// Формула пишется в якорную ячейку уже объединенного региона
fn put_formula(
    sheet: &mut Worksheet,
    template_address: &str,
    shift: u32,
    formula: &str,
    font_size: f64,
    align: Align,
    borders: Borders,
) -> Result<(), Error> {
    let format = text_format(font_size, align, false, borders);
    let address = GridAddress::parse(template_address)?.shift(shift);
    let ((first_row, first_col), (last_row, last_col)) = address.to_indices()?;

    if !address.is_single_cell() {
        sheet
            .merge_range(first_row, first_col, last_row, last_col, "", Some(&format))
            .map_err(Error::XlsxwriterCellWriteFailed)?;
    }
    sheet
        .write_formula(first_row, first_col, formula, Some(&format))
        .map_err(Error::XlsxwriterCellWriteFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use layout::ENTRY_BLOCK_HEIGHT;
    use tempfile::TempDir;

    fn entry(index: usize) -> EntryDoc {
        EntryDoc {
            designation: format!("ИГУЛ.123456.{:03} СБ", index),
            name: format!("Документ {index}"),
            md5: Some("0123456789abcdef0123456789abcdef".to_owned()),
            file_name: format!("IGUL123456{index:03}_sb.dwg"),
            size: "1024".to_owned(),
            date: "01.02.2024".to_owned(),
            version: "-".to_owned(),
            release_number: "-".to_owned(),
            author: None,
        }
    }

    #[test]
    fn empty_report_is_a_single_template_page() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(REPORT_FILE_NAME);

        let properties = Properties::default();
        let report = Report::new(&[], &properties);
        assert_eq!(report.plan.page_count(), 1);
        report.write(&path).unwrap();

        assert!(path.metadata().unwrap().len() > 0);
    }

    #[test]
    fn two_page_report_is_written_to_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(REPORT_FILE_NAME);

        let entries: Vec<EntryDoc> = (1..=8).map(entry).collect();
        let properties = Properties::default();
        let report = Report::new(&entries, &properties);
        assert_eq!(report.plan.page_count(), 2);
        report.write(&path).unwrap();

        assert!(path.metadata().unwrap().len() > 0);
    }

    // Все блоки всех листов, включая пустые, остаются внутри области печати
    #[test]
    fn every_slot_fits_into_the_printed_area() {
        for entry_count in [0, 1, 6, 7, 13, 14, 20] {
            let plan = LayoutPlan::new(entry_count);
            for page in 1..=plan.page_count() {
                for slot in plan.page_slots(page) {
                    let last_block_row = plan.entry_first_row(slot) + ENTRY_BLOCK_HEIGHT - 1;
                    assert!(last_block_row <= plan.last_printed_row());
                }
            }
        }
    }
}
