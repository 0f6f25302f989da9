use thiserror::Error;
use tracing::warn;

use drill_core::model::{CHOICE_COUNT, QuizBank, QuizId, QuizRecord, Stage};

use crate::workbook::{CellValue, Sheet, Workbook};

const BLOCK_MARKER: &str = "Q";
const ANSWER_MARKER: &str = "A";
const CORRECT_MARKER: &str = "⭕";

//
// ─── SHEET LAYOUT ──────────────────────────────────────────────────────────────
//

/// Grid geometry of a genre sheet.
///
/// Question blocks repeat on a fixed 2-D stride. The block origin cell
/// holds the literal `"Q"` marker; the companion markers, the question
/// text and the four choice cells sit at fixed offsets from it. The
/// defaults describe the published workbook layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    /// Column of the first block origin.
    pub start_column: u32,
    /// Row of the first block origin.
    pub start_row: u32,
    /// The question text sits this many rows below the origin.
    pub question_row_offset: u32,
    /// The `"A"` marker sits this many columns right of the origin.
    pub answer_marker_column_offset: u32,
    /// The `"⭕"` marker offsets from the origin.
    pub correct_marker_column_offset: u32,
    pub correct_marker_row_offset: u32,
    /// First choice cell offsets from the origin; the remaining three
    /// choices follow on consecutive rows.
    pub choice_column_offset: u32,
    pub choice_row_offset: u32,
    /// Stride between consecutive block origins.
    pub column_stride: u32,
    pub row_stride: u32,
    /// Last column that may hold a block origin.
    pub max_column: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            start_column: 2,
            start_row: 4,
            question_row_offset: 1,
            answer_marker_column_offset: 1,
            correct_marker_column_offset: 1,
            correct_marker_row_offset: 1,
            choice_column_offset: 2,
            choice_row_offset: 1,
            column_stride: 4,
            row_stride: 6,
            max_column: 10,
        }
    }
}

//
// ─── CHOICE OVERRIDES ──────────────────────────────────────────────────────────
//

/// Per-record allowlists for non-text choice cells.
///
/// Numeric cells always coerce to integer text; ids listed as expected
/// just skip the warning. Date cells have no unambiguous textual form,
/// so only ids with a registered format are rendered and any other
/// date-valued choice skips its whole record.
#[derive(Debug, Clone, Default)]
pub struct ChoiceOverrides {
    date_formats: Vec<(QuizId, String)>,
    expected_numeric: Vec<QuizId>,
}

/// Rendering for the two known date-valued records in the published
/// workbook (month and day without zero padding).
const KNOWN_DATE_FORMAT: &str = "%-m月%-d日";
const KNOWN_DATE_IDS: [&str; 2] = ["300145", "500176"];
const KNOWN_NUMERIC_IDS: [&str; 8] = [
    "200015", "200037", "200133", "200138", "300060", "400117", "400122", "400150",
];

impl ChoiceOverrides {
    /// No overrides at all: every date-valued choice skips its record
    /// and every numeric coercion warns.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The fixed allowlists for the published workbook.
    #[must_use]
    pub fn published() -> Self {
        let mut overrides = Self::empty();
        for qid in KNOWN_DATE_IDS {
            overrides = overrides.with_date_format(QuizId::new(qid), KNOWN_DATE_FORMAT);
        }
        for qid in KNOWN_NUMERIC_IDS {
            overrides = overrides.with_expected_numeric(QuizId::new(qid));
        }
        overrides
    }

    #[must_use]
    pub fn with_date_format(mut self, qid: QuizId, format: impl Into<String>) -> Self {
        self.date_formats.push((qid, format.into()));
        self
    }

    #[must_use]
    pub fn with_expected_numeric(mut self, qid: QuizId) -> Self {
        self.expected_numeric.push(qid);
        self
    }

    fn date_format(&self, qid: &QuizId) -> Option<&str> {
        self.date_formats
            .iter()
            .find(|(known, _)| known == qid)
            .map(|(_, format)| format.as_str())
    }

    fn expects_numeric(&self, qid: &QuizId) -> bool {
        self.expected_numeric.contains(qid)
    }
}

//
// ─── DIAGNOSTICS & ERRORS ──────────────────────────────────────────────────────
//

/// Non-fatal events accumulated while parsing; the scan continues past
/// all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseDiagnostic {
    /// The workbook has no sheet for this genre; its stage stays empty.
    MissingGenreSheet { genre: String },
    /// A choice cell held a value with no textual rendition; the whole
    /// record was skipped (its sequence number stays consumed).
    UnrepresentableChoiceValue { qid: QuizId, raw: String },
    /// A numeric choice cell outside the expected set was coerced to
    /// integer text.
    CoercedNumericChoice { qid: QuizId, raw: String, text: String },
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A block origin without its companion markers; the source sheet
    /// is corrupted or hand-edited, so the parse aborts.
    #[error("malformed block at column {column}, row {row} of sheet {genre:?}")]
    MalformedBlock { genre: String, column: u32, row: u32 },
}

/// Result of a workbook parse: the bank plus everything non-fatal that
/// happened along the way.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub bank: QuizBank,
    pub diagnostics: Vec<ParseDiagnostic>,
}

//
// ─── PARSER ────────────────────────────────────────────────────────────────────
//

/// Converts one workbook into a stage-partitioned quiz bank.
///
/// Ids are assigned per stage over all encountered blocks, including
/// blocks whose record is later skipped, so they stay stable across
/// re-parses as long as the sheet's block order is unchanged.
#[derive(Debug, Clone)]
pub struct WorkbookParser {
    layout: SheetLayout,
    overrides: ChoiceOverrides,
}

impl WorkbookParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            layout: SheetLayout::default(),
            overrides: ChoiceOverrides::published(),
        }
    }

    #[must_use]
    pub fn with_layout(mut self, layout: SheetLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: ChoiceOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Parse every genre sheet of the workbook.
    ///
    /// A missing genre sheet leaves its stage empty and is reported as
    /// a diagnostic, not an error.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MalformedBlock` if a located block violates
    /// the sheet structure.
    pub fn parse(&self, workbook: &Workbook) -> Result<ParseOutcome, ParseError> {
        let mut bank = QuizBank::empty();
        let mut diagnostics = Vec::new();

        for stage in Stage::ALL {
            let genre = stage.genre();
            let Some(sheet) = workbook.sheet(genre) else {
                warn!(genre, "genre sheet not found");
                diagnostics.push(ParseDiagnostic::MissingGenreSheet {
                    genre: genre.to_string(),
                });
                continue;
            };
            self.parse_sheet(stage, sheet, &mut bank, &mut diagnostics)?;
        }

        Ok(ParseOutcome { bank, diagnostics })
    }

    /// Walk the block grid of one sheet until the first expected
    /// position without a `"Q"` marker, which exhausts the sheet.
    fn parse_sheet(
        &self,
        stage: Stage,
        sheet: &Sheet,
        bank: &mut QuizBank,
        diagnostics: &mut Vec<ParseDiagnostic>,
    ) -> Result<(), ParseError> {
        let layout = &self.layout;
        let mut sequence = 0_u32;
        let mut row = layout.start_row;

        'sheet: loop {
            let mut column = layout.start_column;
            while column <= layout.max_column {
                if sheet.cell(column, row).as_text() != Some(BLOCK_MARKER) {
                    break 'sheet;
                }
                sequence += 1;
                let qid = QuizId::assign(stage, sequence);
                if let Some(record) = self.read_block(stage, sheet, column, row, qid, diagnostics)?
                {
                    bank.push(stage, record);
                }
                column += layout.column_stride;
            }
            row += layout.row_stride;
        }

        Ok(())
    }

    /// Read one located block into a record, or `None` when a choice
    /// cell is unrepresentable.
    fn read_block(
        &self,
        stage: Stage,
        sheet: &Sheet,
        column: u32,
        row: u32,
        qid: QuizId,
        diagnostics: &mut Vec<ParseDiagnostic>,
    ) -> Result<Option<QuizRecord>, ParseError> {
        let layout = &self.layout;

        let answer_marker = sheet.cell(column + layout.answer_marker_column_offset, row);
        let correct_marker = sheet.cell(
            column + layout.correct_marker_column_offset,
            row + layout.correct_marker_row_offset,
        );
        if answer_marker.as_text() != Some(ANSWER_MARKER)
            || correct_marker.as_text() != Some(CORRECT_MARKER)
        {
            return Err(ParseError::MalformedBlock {
                genre: stage.genre().to_string(),
                column,
                row,
            });
        }

        let question = plain_text(sheet.cell(column, row + layout.question_row_offset));

        let mut choices: [String; CHOICE_COUNT] = Default::default();
        for (index, slot) in choices.iter_mut().enumerate() {
            let cell = sheet.cell(
                column + layout.choice_column_offset,
                row + layout.choice_row_offset + index as u32,
            );
            match self.normalize_choice(&qid, cell, diagnostics) {
                Some(text) => *slot = text,
                None => {
                    warn!(%qid, raw = %raw_text(cell), "choice cell unrepresentable, record skipped");
                    diagnostics.push(ParseDiagnostic::UnrepresentableChoiceValue {
                        qid,
                        raw: raw_text(cell),
                    });
                    return Ok(None);
                }
            }
        }

        let answer = choices[0].clone();
        Ok(Some(QuizRecord {
            qid,
            genre: stage.genre().to_string(),
            question,
            answer,
            choices,
        }))
    }

    /// Textual rendition of a choice cell, or `None` when the value
    /// cannot be rendered (a date without a registered format, or an
    /// empty cell).
    fn normalize_choice(
        &self,
        qid: &QuizId,
        cell: &CellValue,
        diagnostics: &mut Vec<ParseDiagnostic>,
    ) -> Option<String> {
        match cell {
            CellValue::Text(value) => Some(value.clone()),
            CellValue::Number(value) => {
                let text = integer_text(*value);
                if !self.overrides.expects_numeric(qid) {
                    warn!(%qid, raw = %value, coerced = %text, "numeric choice cell coerced to text");
                    diagnostics.push(ParseDiagnostic::CoercedNumericChoice {
                        qid: qid.clone(),
                        raw: value.to_string(),
                        text: text.clone(),
                    });
                }
                Some(text)
            }
            CellValue::DateTime(value) => self
                .overrides
                .date_format(qid)
                .map(|format| value.format(format).to_string()),
            CellValue::Empty => None,
        }
    }
}

impl Default for WorkbookParser {
    fn default() -> Self {
        Self::new()
    }
}

fn integer_text(value: f64) -> String {
    (value.trunc() as i64).to_string()
}

/// Question cells are taken verbatim when textual; numeric values
/// coerce like choices and anything else reads as empty.
fn plain_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(value) => value.clone(),
        CellValue::Number(value) => integer_text(*value),
        CellValue::DateTime(_) | CellValue::Empty => String::new(),
    }
}

fn raw_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => "(empty)".to_string(),
        CellValue::Text(value) => value.clone(),
        CellValue::Number(value) => value.to_string(),
        CellValue::DateTime(value) => value.to_string(),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn put_block(sheet: &mut Sheet, column: u32, row: u32, question: &str, choices: [&str; 4]) {
        sheet.set(column, row, CellValue::text(BLOCK_MARKER));
        sheet.set(column + 1, row, CellValue::text(ANSWER_MARKER));
        sheet.set(column + 1, row + 1, CellValue::text(CORRECT_MARKER));
        sheet.set(column, row + 1, CellValue::text(question));
        for (index, choice) in choices.into_iter().enumerate() {
            sheet.set(column + 2, row + 1 + index as u32, CellValue::text(choice));
        }
    }

    fn workbook_with(stage: Stage, sheet: Sheet) -> Workbook {
        let mut workbook = Workbook::new();
        workbook.insert_sheet(stage.genre(), sheet);
        workbook
    }

    fn sample_choices() -> [&'static str; 4] {
        ["正解", "はずれ1", "はずれ2", "はずれ3"]
    }

    #[test]
    fn blocks_parse_across_columns_then_rows() {
        let mut sheet = Sheet::new();
        put_block(&mut sheet, 2, 4, "一問目", sample_choices());
        put_block(&mut sheet, 6, 4, "二問目", sample_choices());
        put_block(&mut sheet, 10, 4, "三問目", sample_choices());
        put_block(&mut sheet, 2, 10, "四問目", sample_choices());

        let outcome = WorkbookParser::new()
            .parse(&workbook_with(Stage::Stage1, sheet))
            .unwrap();

        let records = &outcome.bank.stage(Stage::Stage1).quiz_list;
        assert_eq!(records.len(), 4);
        let qids: Vec<_> = records.iter().map(|r| r.qid.as_str().to_string()).collect();
        assert_eq!(qids, ["100001", "100002", "100003", "100004"]);
        assert_eq!(records[3].question, "四問目");
        assert!(outcome.bank.validate().is_ok());
    }

    #[test]
    fn answer_is_the_first_choice_cell() {
        let mut sheet = Sheet::new();
        put_block(&mut sheet, 2, 4, "問題", sample_choices());

        let outcome = WorkbookParser::new()
            .parse(&workbook_with(Stage::Stage2, sheet))
            .unwrap();

        let record = &outcome.bank.stage(Stage::Stage2).quiz_list[0];
        assert_eq!(record.answer, "正解");
        assert_eq!(record.choices[0], record.answer);
        assert_eq!(record.genre, Stage::Stage2.genre());
    }

    #[test]
    fn scan_stops_at_the_first_missing_marker() {
        let mut sheet = Sheet::new();
        put_block(&mut sheet, 2, 4, "一問目", sample_choices());
        put_block(&mut sheet, 6, 4, "二問目", sample_choices());
        // nothing at (10, 4): the sheet is exhausted there
        put_block(&mut sheet, 2, 10, "届かない問題", sample_choices());

        let outcome = WorkbookParser::new()
            .parse(&workbook_with(Stage::Stage1, sheet))
            .unwrap();

        assert_eq!(outcome.bank.stage(Stage::Stage1).len(), 2);
    }

    #[test]
    fn missing_companion_marker_is_fatal() {
        let mut sheet = Sheet::new();
        put_block(&mut sheet, 2, 4, "問題", sample_choices());
        sheet.set(3, 4, CellValue::text("B"));

        let err = WorkbookParser::new()
            .parse(&workbook_with(Stage::Stage1, sheet))
            .unwrap_err();

        assert!(matches!(
            err,
            ParseError::MalformedBlock { column: 2, row: 4, .. }
        ));
    }

    #[test]
    fn missing_genre_sheet_leaves_the_stage_empty() {
        let mut sheet = Sheet::new();
        put_block(&mut sheet, 2, 4, "問題", sample_choices());

        let outcome = WorkbookParser::new()
            .parse(&workbook_with(Stage::Stage3, sheet))
            .unwrap();

        assert_eq!(outcome.bank.stage(Stage::Stage3).len(), 1);
        assert!(outcome.bank.stage(Stage::Stage1).is_empty());
        assert!(outcome.diagnostics.iter().any(|diag| matches!(
            diag,
            ParseDiagnostic::MissingGenreSheet { genre } if genre == Stage::Stage1.genre()
        )));
    }

    #[test]
    fn unlisted_date_choice_skips_only_its_record() {
        let mut sheet = Sheet::new();
        put_block(&mut sheet, 2, 4, "日付の問題", sample_choices());
        let date = NaiveDate::from_ymd_opt(2021, 5, 7)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        sheet.set(4, 5, CellValue::DateTime(date));
        put_block(&mut sheet, 6, 4, "次の問題", sample_choices());

        let outcome = WorkbookParser::new()
            .parse(&workbook_with(Stage::Stage3, sheet))
            .unwrap();

        let records = &outcome.bank.stage(Stage::Stage3).quiz_list;
        assert_eq!(records.len(), 1);
        // the skipped block still consumed sequence number 1
        assert_eq!(records[0].qid.as_str(), "300002");
        assert_eq!(records[0].question, "次の問題");
        assert!(outcome.diagnostics.iter().any(|diag| matches!(
            diag,
            ParseDiagnostic::UnrepresentableChoiceValue { qid, .. } if qid.as_str() == "300001"
        )));
    }

    #[test]
    fn listed_date_choice_renders_with_its_format() {
        let mut sheet = Sheet::new();
        put_block(&mut sheet, 2, 4, "日付の問題", sample_choices());
        let date = NaiveDate::from_ymd_opt(2021, 5, 7)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        sheet.set(4, 5, CellValue::DateTime(date));

        let overrides =
            ChoiceOverrides::empty().with_date_format(QuizId::new("300001"), KNOWN_DATE_FORMAT);
        let outcome = WorkbookParser::new()
            .with_overrides(overrides)
            .parse(&workbook_with(Stage::Stage3, sheet))
            .unwrap();

        let record = &outcome.bank.stage(Stage::Stage3).quiz_list[0];
        assert_eq!(record.answer, "5月7日");
        assert_eq!(record.choices[0], "5月7日");
    }

    #[test]
    fn numeric_choice_coerces_to_integer_text() {
        let mut sheet = Sheet::new();
        put_block(&mut sheet, 2, 4, "数値の問題", sample_choices());
        sheet.set(4, 6, CellValue::Number(1964.0));

        let outcome = WorkbookParser::new()
            .with_overrides(ChoiceOverrides::empty())
            .parse(&workbook_with(Stage::Stage2, sheet))
            .unwrap();

        let record = &outcome.bank.stage(Stage::Stage2).quiz_list[0];
        assert_eq!(record.choices[1], "1964");
        assert!(outcome.diagnostics.iter().any(|diag| matches!(
            diag,
            ParseDiagnostic::CoercedNumericChoice { text, .. } if text == "1964"
        )));
    }

    #[test]
    fn expected_numeric_choice_coerces_silently() {
        let mut sheet = Sheet::new();
        put_block(&mut sheet, 2, 4, "数値の問題", sample_choices());
        sheet.set(4, 6, CellValue::Number(15.0));

        let overrides = ChoiceOverrides::empty().with_expected_numeric(QuizId::new("200001"));
        let outcome = WorkbookParser::new()
            .with_overrides(overrides)
            .parse(&workbook_with(Stage::Stage2, sheet))
            .unwrap();

        assert_eq!(outcome.bank.stage(Stage::Stage2).quiz_list[0].choices[1], "15");
        assert!(!outcome.diagnostics.iter().any(|diag| matches!(
            diag,
            ParseDiagnostic::CoercedNumericChoice { .. }
        )));
    }

    #[test]
    fn published_overrides_cover_the_known_ids() {
        let overrides = ChoiceOverrides::published();
        assert!(overrides.date_format(&QuizId::new("300145")).is_some());
        assert!(overrides.date_format(&QuizId::new("500176")).is_some());
        assert!(overrides.date_format(&QuizId::new("100001")).is_none());
        assert!(overrides.expects_numeric(&QuizId::new("200015")));
        assert!(!overrides.expects_numeric(&QuizId::new("200016")));
    }

    #[test]
    fn reparsing_an_unchanged_workbook_is_idempotent() {
        let mut sheet = Sheet::new();
        put_block(&mut sheet, 2, 4, "一問目", sample_choices());
        put_block(&mut sheet, 6, 4, "二問目", sample_choices());
        let workbook = workbook_with(Stage::Stage4, sheet);

        let parser = WorkbookParser::new();
        let first = parser.parse(&workbook).unwrap();
        let second = parser.parse(&workbook).unwrap();

        assert_eq!(first.bank, second.bank);
    }
}
