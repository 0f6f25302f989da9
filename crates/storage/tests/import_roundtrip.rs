use drill_core::model::Stage;
use storage::{CellValue, QuizStore, Sheet, Workbook, WorkbookParser};

fn put_block(sheet: &mut Sheet, column: u32, row: u32, question: &str, choices: [&str; 4]) {
    sheet.set(column, row, CellValue::text("Q"));
    sheet.set(column + 1, row, CellValue::text("A"));
    sheet.set(column + 1, row + 1, CellValue::text("⭕"));
    sheet.set(column, row + 1, CellValue::text(question));
    for (index, choice) in choices.into_iter().enumerate() {
        sheet.set(column + 2, row + 1 + index as u32, CellValue::text(choice));
    }
}

#[test]
fn parsed_workbook_survives_a_store_round_trip() {
    let mut workbook = Workbook::new();
    for stage in Stage::ALL {
        let mut sheet = Sheet::new();
        put_block(
            &mut sheet,
            2,
            4,
            &format!("{}の問題", stage.genre()),
            ["正解", "はずれ1", "はずれ2", "はずれ3"],
        );
        workbook.insert_sheet(stage.genre(), sheet);
    }

    let outcome = WorkbookParser::new().parse(&workbook).unwrap();
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(outcome.bank.total_len(), 5);
    outcome.bank.validate().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let store = QuizStore::new(dir.path());
    store.save_bank(&outcome.bank).unwrap();

    let loaded = store.load_bank().unwrap();
    assert_eq!(loaded, outcome.bank);
    loaded.validate().unwrap();
}
