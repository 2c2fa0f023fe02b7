#![no_main]
use libfuzzer_sys::fuzz_target;
use spreadsheetml::SpreadsheetMl;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let reader = SpreadsheetMl::new();
    if !reader.can_read(&mut Cursor::new(data)).unwrap_or(false) {
        return;
    }
    let _ = reader.list_worksheet_info(&mut Cursor::new(data));
    let book = match reader.load(&mut Cursor::new(data)) {
        Ok(book) => book,
        Err(_) => return,
    };
    for sheet in book.worksheets() {
        if let Ok(range) = sheet.range() {
            let _ = range.get_size().0 * range.get_size().1;
            range.used_cells().count();
        }
        if let Ok(formulas) = sheet.formulas() {
            formulas
                .rows()
                .flat_map(|r| r.iter().filter(|f| !f.is_empty()))
                .count();
        }
        for cell in sheet.cells() {
            let _ = sheet.style_at(cell.row(), cell.column());
        }
    }
});
