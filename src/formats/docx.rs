//! Paragraph text of a `.docx` document.
//!
//! Reads `word/document.xml` from the package and collects the text runs of
//! each `w:p`, one paragraph per line. Tabs and line breaks inside runs are
//! kept; tab-stop definitions in paragraph properties are not text.

use crate::error::ConvertError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract the text of the document at `path`.
pub fn extract_text(path: &Path) -> Result<String, ConvertError> {
    let file = File::open(path).map_err(|e| ConvertError::input(path, e))?;
    let invalid = |detail: String| ConvertError::InvalidDocument {
        path: path.to_path_buf(),
        detail,
    };

    let mut archive = ZipArchive::new(file).map_err(|e| invalid(format!("not a zip package: {e}")))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| invalid(format!("{DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| invalid(format!("{DOCUMENT_PART}: {e}")))?;

    let paragraphs = paragraphs_from_xml(&xml).map_err(invalid)?;
    debug!("Read {} paragraphs from {:?}", paragraphs.len(), path);
    Ok(paragraphs.join("\n"))
}

/// Paragraph strings of a WordprocessingML body.
pub fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:p" => current.clear(),
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" if in_run => current.push('\t'),
                b"w:br" | b"w:cr" if in_run => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| e.to_string())?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                b"w:r" => in_run = false,
                b"w:t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML error at byte {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p>
      <w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
      <w:r><w:t>Hello</w:t></w:r>
      <w:r><w:t xml:space="preserve"> big </w:t></w:r>
      <w:r><w:t>world &amp; co</w:t></w:r>
    </w:p>
    <w:p/>
    <w:p>
      <w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r>
    </w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn paragraphs_runs_tabs_and_breaks() {
        let paras = paragraphs_from_xml(BODY).unwrap();
        assert_eq!(paras, vec!["Hello big world & co", "", "a\tb\nc"]);
    }

    #[test]
    fn malformed_xml_is_rejected() {
        assert!(paragraphs_from_xml("<w:p><w:r></w:p>").is_err());
    }

    #[test]
    fn reads_document_part_from_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.docx");
        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        zip.start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .unwrap();
        zip.write_all(BODY.as_bytes()).unwrap();
        zip.finish().unwrap();

        let text = extract_text(&path).unwrap();
        assert_eq!(text, "Hello big world & co\n\na\tb\nc");
    }

    #[test]
    fn plain_file_is_invalid_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, "just text").unwrap();
        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidDocument { .. }), "{err:?}");
    }

    #[test]
    fn package_without_body_is_invalid_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.docx");
        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<Types/>").unwrap();
        zip.finish().unwrap();

        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidDocument { .. }), "{err:?}");
    }
}
