// Константы формирования листов формы УЛ
pub const FIRST_PAGE_HEIGHT: u32 = 36;
pub const FOLLOW_PAGE_HEIGHT: u32 = 34;
pub const FIRST_PAGE_CAPACITY: usize = 6;
pub const FOLLOW_PAGE_CAPACITY: usize = 7;

// Каждая запись занимает четыре строки: обозначение/наименование,
// контрольная сумма, имя файла/автор, размер/дата
pub const ENTRY_BLOCK_HEIGHT: u32 = 4;

// Первый блок записей на первом листе начинается со второй строки
const FIRST_PAGE_ENTRY_BASE_ROW: u32 = 2;

/// План раскладки записей по листам. Чистая функция от количества записей:
/// никакого ввода-вывода, все адреса вычисляются заново при каждом вызове.
#[derive(Debug, Clone, Copy)]
pub struct LayoutPlan {
    entry_count: usize,
    first_capacity: usize,
    follow_capacity: usize,
}

impl LayoutPlan {
    pub fn new(entry_count: usize) -> LayoutPlan {
        LayoutPlan {
            entry_count,
            first_capacity: FIRST_PAGE_CAPACITY,
            follow_capacity: FOLLOW_PAGE_CAPACITY,
        }
    }

    #[cfg(test)]
    pub fn with_capacities(
        entry_count: usize,
        first_capacity: usize,
        follow_capacity: usize,
    ) -> LayoutPlan {
        LayoutPlan {
            entry_count,
            first_capacity,
            follow_capacity,
        }
    }

    pub fn page_count(&self) -> u32 {
        if self.entry_count <= self.first_capacity {
            1
        } else {
            let overflow = self.entry_count - self.first_capacity;
            1 + overflow.div_ceil(self.follow_capacity) as u32
        }
    }

    /// Номер листа, на который попадает запись (нумерация записей единичная)
    pub fn entry_page(&self, entry_number: usize) -> u32 {
        if entry_number <= self.first_capacity {
            1
        } else {
            let overflow = entry_number - self.first_capacity;
            1 + overflow.div_ceil(self.follow_capacity) as u32
        }
    }

    /// Первая строка четырехстрочного блока записи, в единичной нумерации
    /// строк A1-адресов. Для листов продолжения воспроизводит построчно
    /// шаблон формы: база 14 на втором листе, далее фиксированный шаг.
    pub fn entry_first_row(&self, entry_number: usize) -> u32 {
        let block = ENTRY_BLOCK_HEIGHT * (entry_number as u32 - 1);
        if entry_number <= self.first_capacity {
            FIRST_PAGE_ENTRY_BASE_ROW + block
        } else {
            let page = self.entry_page(entry_number);
            self.follow_page_entry_base_row(page) + block
        }
    }

    // База блоков листа продолжения, выраженная относительно сквозного
    // номера записи. Для стандартных емкостей 6/7 равна 14 + 6*(page - 2).
    fn follow_page_entry_base_row(&self, page: u32) -> u32 {
        let page_top = self.page_row_shift(page) + FIRST_PAGE_ENTRY_BASE_ROW;
        let entries_before =
            self.first_capacity as u32 + self.follow_capacity as u32 * (page - 2);
        page_top - ENTRY_BLOCK_HEIGHT * entries_before
    }

    /// Сдвиг адресов шаблона первого листа для получения адресов листа
    /// продолжения: "C1" превращается в первую строку шапки нужного листа
    pub fn page_row_shift(&self, page: u32) -> u32 {
        FIRST_PAGE_HEIGHT + FOLLOW_PAGE_HEIGHT * (page - 2)
    }

    /// Номера записей, отведенные листу (включая пустые места в конце)
    pub fn page_slots(&self, page: u32) -> std::ops::RangeInclusive<usize> {
        if page == 1 {
            1..=self.first_capacity
        } else {
            let first = self.first_capacity + self.follow_capacity * (page as usize - 2) + 1;
            first..=first + self.follow_capacity - 1
        }
    }

    /// Последняя печатаемая строка, определяет область печати A1:Q{row}
    pub fn last_printed_row(&self) -> u32 {
        let pages = self.page_count();
        if pages == 1 {
            FIRST_PAGE_HEIGHT
        } else {
            FIRST_PAGE_HEIGHT + FOLLOW_PAGE_HEIGHT * (pages - 1)
        }
    }
}
