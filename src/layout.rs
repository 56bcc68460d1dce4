//! Word-wrapped text layout on fixed-size pages.
//!
//! Widths come from the Helvetica metrics of the PDF standard-14 font set, so
//! no font file is needed to decide where lines break. Paragraphs are split on
//! `\n`, words on single spaces; a word wider than the line is broken between
//! characters. Lines are left-aligned and flow onto new pages when the bottom
//! margin is reached.
//!
//! Helvetica itself only covers WinAnsi; text in other scripts needs a
//! TrueType font ([`ConversionConfig::font_path`]). Line breaks are still
//! computed from Helvetica widths then, so lines set in a wider font can run
//! slightly past the right margin.

use crate::config::ConversionConfig;
use crate::engine::{PageContent, PageItem};
use crate::geometry::MM_PER_PT;

/// Spaces substituted for a tab character.
const TAB_WIDTH: usize = 4;

/// Helvetica advance widths for U+0020..=U+007E, in 1/1000 em.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Width used for characters outside printable ASCII.
const HELVETICA_DEFAULT: u16 = 556;

/// Advance width of `c` in 1/1000 em.
pub fn char_width(c: char) -> u16 {
    match c as u32 {
        cp @ 0x20..=0x7E => HELVETICA_ASCII[(cp - 0x20) as usize],
        _ => HELVETICA_DEFAULT,
    }
}

/// Rendered width of `text` at `font_size_pt`, in millimetres.
pub fn text_width_mm(text: &str, font_size_pt: f64) -> f64 {
    let units: u64 = text.chars().map(|c| u64::from(char_width(c))).sum();
    units_to_mm(units, font_size_pt)
}

fn units_to_mm(units: u64, font_size_pt: f64) -> f64 {
    units as f64 / 1000.0 * font_size_pt * MM_PER_PT
}

/// Replace tabs, drop carriage returns and other control characters.
fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' => out.extend(std::iter::repeat(' ').take(TAB_WIDTH)),
            '\n' => out.push('\n'),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Wrap one paragraph (no newlines) into lines no wider than `max_width_mm`.
///
/// Always returns at least one line; an empty paragraph yields `[""]`.
pub fn wrap_paragraph(paragraph: &str, max_width_mm: f64, font_size_pt: f64) -> Vec<String> {
    let fits = |s: &str| text_width_mm(s, font_size_pt) <= max_width_mm;
    let mut lines = Vec::new();
    let mut line = String::new();

    for (i, word) in paragraph.split(' ').enumerate() {
        if i > 0 {
            let candidate = format!("{line} {word}");
            if fits(&candidate) {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
        }

        line = break_word(word, max_width_mm, font_size_pt, &mut lines).to_string();
    }

    lines.push(line);
    lines
}

/// Push full-width chunks of `word` onto `lines` and return the remainder.
///
/// Single forward pass; every chunk holds at least one char.
fn break_word<'a>(
    word: &'a str,
    max_width_mm: f64,
    font_size_pt: f64,
    lines: &mut Vec<String>,
) -> &'a str {
    let mut start = 0;
    let mut units: u64 = 0;
    for (idx, c) in word.char_indices() {
        let w = u64::from(char_width(c));
        if idx > start && units_to_mm(units + w, font_size_pt) > max_width_mm {
            lines.push(word[start..idx].to_string());
            start = idx;
            units = 0;
        }
        units += w;
    }
    &word[start..]
}

/// Wrap a whole text into lines, one or more per paragraph.
pub fn wrap_text(text: &str, max_width_mm: f64, font_size_pt: f64) -> Vec<String> {
    let clean = sanitize(text);
    let clean = clean.strip_suffix('\n').unwrap_or(&clean);
    clean
        .split('\n')
        .flat_map(|p| wrap_paragraph(p, max_width_mm, font_size_pt))
        .collect()
}

/// Lay `text` out on as many pages as needed.
///
/// Empty text still produces one blank page.
pub fn layout_text(text: &str, config: &ConversionConfig) -> Vec<PageContent> {
    let lines = wrap_text(text, config.text_width_mm(), config.font_size_pt);

    let usable = config.page_size.height_mm - config.margin_mm - config.bottom_margin_mm;
    let per_page = ((usable / config.line_height_mm).floor() as usize).max(1);
    let font_mm = config.font_size_pt * MM_PER_PT;

    let mut pages: Vec<PageContent> = lines
        .chunks(per_page)
        .map(|chunk| {
            let items = chunk
                .iter()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(row, line)| {
                    let top = config.margin_mm + row as f64 * config.line_height_mm;
                    PageItem::Text {
                        text: line.clone(),
                        x_mm: config.margin_mm,
                        baseline_mm: top + 0.5 * config.line_height_mm + 0.3 * font_mm,
                        font_size_pt: config.font_size_pt,
                    }
                })
                .collect();
            PageContent {
                size: config.page_size,
                items,
            }
        })
        .collect();

    if pages.is_empty() {
        pages.push(PageContent::blank(config.page_size));
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(page: &PageContent) -> Vec<&str> {
        page.items
            .iter()
            .filter_map(|i| match i {
                PageItem::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn metrics_table_is_complete() {
        assert_eq!(char_width(' '), 278);
        assert_eq!(char_width('W'), 944);
        assert_eq!(char_width('i'), 222);
        assert_eq!(char_width('~'), 584);
        assert_eq!(char_width('é'), HELVETICA_DEFAULT);
    }

    #[test]
    fn width_scales_with_font_size() {
        let w12 = text_width_mm("Hello", 12.0);
        let w24 = text_width_mm("Hello", 24.0);
        assert!((w24 - 2.0 * w12).abs() < 1e-9);
        // "Hello" = 722+556+222+222+556 = 2278 units.
        assert!((w12 - 2.278 * 12.0 * MM_PER_PT).abs() < 1e-9);
    }

    #[test]
    fn hello_world_two_lines_one_page() {
        let config = ConversionConfig::default();
        let pages = layout_text("Hello\nWorld", &config);
        assert_eq!(pages.len(), 1);
        assert_eq!(texts(&pages[0]), vec!["Hello", "World"]);

        let xs: Vec<f64> = pages[0]
            .items
            .iter()
            .map(|i| match i {
                PageItem::Text { x_mm, .. } => *x_mm,
                _ => unreachable!(),
            })
            .collect();
        assert!(xs.iter().all(|x| (*x - config.margin_mm).abs() < 1e-9), "left-aligned");
    }

    #[test]
    fn long_paragraph_wraps_within_width() {
        let para = "lorem ipsum dolor sit amet ".repeat(40);
        let lines = wrap_paragraph(para.trim_end(), 190.0, 12.0);
        assert!(lines.len() > 1);
        for l in &lines {
            assert!(text_width_mm(l, 12.0) <= 190.0, "too wide: {l}");
        }
        assert_eq!(lines.join(" "), para.trim_end());
    }

    #[test]
    fn oversized_word_is_broken() {
        let word = "W".repeat(200);
        let lines = wrap_paragraph(&word, 50.0, 12.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for l in &lines {
            assert!(!l.is_empty());
            assert!(text_width_mm(l, 12.0) <= 50.0);
        }
    }

    #[test]
    fn huge_unbroken_word_wraps_in_linear_time() {
        let word = "A".repeat(400_000);
        let started = std::time::Instant::now();
        let lines = wrap_paragraph(&word, 190.0, 12.0);
        assert!(
            started.elapsed() < std::time::Duration::from_secs(5),
            "took {:?}",
            started.elapsed()
        );
        assert!(lines.len() > 5000);
        assert_eq!(lines.iter().map(String::len).sum::<usize>(), word.len());
        assert!(lines.iter().all(|l| text_width_mm(l, 12.0) <= 190.0));
    }

    #[test]
    fn width_of_very_long_text_does_not_overflow() {
        let w = text_width_mm(&"W".repeat(4_600_000), 12.0);
        let expected = 4_600_000.0 * 0.944 * 12.0 * MM_PER_PT;
        assert!((w - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn blank_lines_keep_their_slot() {
        let config = ConversionConfig::default();
        let pages = layout_text("a\n\nb", &config);
        let baselines: Vec<f64> = pages[0]
            .items
            .iter()
            .map(|i| match i {
                PageItem::Text { baseline_mm, .. } => *baseline_mm,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(baselines.len(), 2);
        assert!((baselines[1] - baselines[0] - 2.0 * config.line_height_mm).abs() < 1e-9);
    }

    #[test]
    fn text_flows_onto_new_pages() {
        let config = ConversionConfig::default();
        // (297 - 10 - 20) / 10 = 26 lines per A4 page.
        let text = (1..=60).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
        let pages = layout_text(&text, &config);
        assert_eq!(pages.len(), 3);
        assert_eq!(texts(&pages[0]).len(), 26);
        assert_eq!(texts(&pages[2]), (53..=60).map(|n| n.to_string()).collect::<Vec<_>>());
    }

    #[test]
    fn empty_text_is_one_blank_page() {
        let pages = layout_text("", &ConversionConfig::default());
        assert_eq!(pages.len(), 1);
        assert!(pages[0].items.is_empty());
    }

    #[test]
    fn crlf_and_tabs_are_normalised() {
        let lines = wrap_text("a\tb\r\nc\r\n", 190.0, 12.0);
        assert_eq!(lines, vec!["a    b".to_string(), "c".to_string()]);
    }
}
