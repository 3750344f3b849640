use crate::errors::Error;
use crate::shared::utils::get_xl_column_number;
use std::fmt;

/// Адрес одной ячейки в A1-нотации: буквенный столбец и номер строки.
/// Номера строк единичные (как видит пользователь Excel), нулевая строка
/// допустима только как шаблонная заготовка до сдвига.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub column: String,
    pub row: u32,
}

impl CellRef {
    pub fn parse(text: &str) -> Result<Self, Error> {
        // столбец - самый длинный нецифровой префикс, строка - цифры за ним
        let digits_at = text
            .find(|ch: char| ch.is_ascii_digit())
            .ok_or_else(|| Error::MalformedCellAddress(text.to_owned()))?;

        if digits_at == 0 {
            return Err(Error::MalformedCellAddress(text.to_owned()));
        }

        let (column, row_digits) = text.split_at(digits_at);

        let row = row_digits
            .parse::<u32>()
            .map_err(|_| Error::MalformedCellAddress(text.to_owned()))?;

        Ok(CellRef {
            column: column.to_owned(),
            row,
        })
    }

    pub fn shift(&self, delta_rows: u32) -> CellRef {
        CellRef {
            column: self.column.clone(),
            row: self.row + delta_rows,
        }
    }

    /// Координаты для xlsxwriter: нулевые индексы строки и столбца
    pub fn to_indices(&self) -> Result<(u32, u16), Error> {
        let col = get_xl_column_number(&self.column)
            .ok_or_else(|| Error::MalformedCellAddress(self.to_string()))?;
        if self.row == 0 {
            return Err(Error::MalformedCellAddress(self.to_string()));
        }
        Ok((self.row - 1, col))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

/// Адрес ячейки либо региона ("C12" или "A16:A19"). Сдвиг по строкам
/// позволяет не задавать координаты второго и последующих листов вручную.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridAddress {
    Cell(CellRef),
    Range(CellRef, CellRef),
}

impl GridAddress {
    pub fn parse(text: &str) -> Result<Self, Error> {
        match text.split_once(':') {
            Some((first, second)) => Ok(GridAddress::Range(
                CellRef::parse(first)?,
                CellRef::parse(second)?,
            )),
            None => Ok(GridAddress::Cell(CellRef::parse(text)?)),
        }
    }

    pub fn shift(&self, delta_rows: u32) -> GridAddress {
        match self {
            GridAddress::Cell(cell) => GridAddress::Cell(cell.shift(delta_rows)),
            GridAddress::Range(first, second) => {
                GridAddress::Range(first.shift(delta_rows), second.shift(delta_rows))
            }
        }
    }

    /// Пара углов региона; для одиночной ячейки углы совпадают
    pub fn to_indices(&self) -> Result<((u32, u16), (u32, u16)), Error> {
        match self {
            GridAddress::Cell(cell) => {
                let corner = cell.to_indices()?;
                Ok((corner, corner))
            }
            GridAddress::Range(first, second) => {
                Ok((first.to_indices()?, second.to_indices()?))
            }
        }
    }

    pub fn is_single_cell(&self) -> bool {
        match self {
            GridAddress::Cell(_) => true,
            GridAddress::Range(first, second) => first == second,
        }
    }
}

impl fmt::Display for GridAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridAddress::Cell(cell) => write!(f, "{cell}"),
            GridAddress::Range(first, second) => write!(f, "{first}:{second}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_of_single_cell() {
        let address = GridAddress::parse("C0").unwrap();
        assert_eq!(address.shift(12).to_string(), "C12");
    }

    #[test]
    fn shift_of_region() {
        let address = GridAddress::parse("A16:A19").unwrap();
        assert_eq!(address.shift(34).to_string(), "A50:A53");
    }

    #[test]
    fn shift_keeps_column_token() {
        let address = GridAddress::parse("AHC3").unwrap();
        assert_eq!(address.shift(0).to_string(), "AHC3");
    }

    #[test]
    fn parse_rejects_malformed_addresses() {
        assert!(matches!(
            GridAddress::parse("12"),
            Err(Error::MalformedCellAddress(_))
        ));
        assert!(matches!(
            GridAddress::parse("C"),
            Err(Error::MalformedCellAddress(_))
        ));
        assert!(matches!(
            GridAddress::parse(""),
            Err(Error::MalformedCellAddress(_))
        ));
    }

    #[test]
    fn indices_are_zero_based() {
        let address = GridAddress::parse("C2:E2").unwrap();
        let ((row1, col1), (row2, col2)) = address.to_indices().unwrap();
        assert_eq!((row1, col1), (1, 2));
        assert_eq!((row2, col2), (1, 4));
    }

    #[test]
    fn row_zero_is_not_renderable() {
        let address = CellRef::parse("C0").unwrap();
        assert!(address.to_indices().is_err());
    }
}
