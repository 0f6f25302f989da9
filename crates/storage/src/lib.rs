#![forbid(unsafe_code)]

pub mod parser;
pub mod store;
pub mod workbook;

pub use parser::{
    ChoiceOverrides, ParseDiagnostic, ParseError, ParseOutcome, SheetLayout, WorkbookParser,
};
pub use store::{QuizStore, SaveFileEntry, StorageError};
pub use workbook::{CellValue, Sheet, Workbook, WorkbookError};
