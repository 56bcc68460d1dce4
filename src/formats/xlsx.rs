//! Single-column worksheet writer.

use crate::error::ConvertError;
use rust_xlsxwriter::Workbook;
use std::path::Path;
use tracing::{debug, warn};

/// Longest string an XLSX cell can hold, in characters.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Write `lines` into column A of one worksheet, one line per row, starting
/// at row 0. At most `max_rows` lines are written; the rest are dropped.
///
/// Returns the number of rows written.
pub fn write_lines_sheet<'a, I>(lines: I, max_rows: usize, output: &Path) -> Result<usize, ConvertError>
where
    I: IntoIterator<Item = &'a str>,
{
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| ConvertError::SpreadsheetWrite {
        path: output.to_path_buf(),
        detail: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let mut lines = lines.into_iter();
    let mut written = 0usize;
    for (row, line) in lines.by_ref().take(max_rows).enumerate() {
        let cell = truncate_chars(line, MAX_CELL_CHARS);
        worksheet
            .write_string(row as u32, 0, cell)
            .map_err(xlsx_err)?;
        written += 1;
    }

    let dropped = lines.count();
    if dropped > 0 {
        warn!("Row cap of {} reached, {} line(s) dropped", max_rows, dropped);
    }

    workbook.save(output).map_err(xlsx_err)?;
    debug!("Wrote {} row(s) to {}", written, output.display());
    Ok(written)
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn sheet_xml(path: &Path) -> String {
        let file = std::fs::File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut xml = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn one_row_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("lines.xlsx");
        let n = write_lines_sheet(["alpha", "beta", "gamma"], 1001, &out).unwrap();
        assert_eq!(n, 3);
        assert_eq!(sheet_xml(&out).matches("<row ").count(), 3);
    }

    #[test]
    fn rows_beyond_cap_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("capped.xlsx");
        let lines: Vec<String> = (0..1500).map(|i| format!("line {i}")).collect();
        let n = write_lines_sheet(lines.iter().map(String::as_str), 1001, &out).unwrap();
        assert_eq!(n, 1001);
        let xml = sheet_xml(&out);
        assert_eq!(xml.matches("<row ").count(), 1001);
        assert!(xml.contains(r#"<row r="1001""#));
        assert!(!xml.contains(r#"<row r="1002""#));
    }

    #[test]
    fn empty_input_still_writes_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty.xlsx");
        assert_eq!(write_lines_sheet(std::iter::empty(), 1001, &out).unwrap(), 0);
        assert!(out.exists());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        let long = "é".repeat(MAX_CELL_CHARS + 5);
        assert_eq!(truncate_chars(&long, MAX_CELL_CHARS).chars().count(), MAX_CELL_CHARS);
    }
}
