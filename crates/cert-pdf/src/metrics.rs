//! Helvetica glyph metrics and greedy word wrapping

use crate::encoding::encode_win_ansi;
use crate::PT_PER_MM;

/// Standard font variant used on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
}

impl FontStyle {
    pub(crate) fn base_font(&self) -> &'static [u8] {
        match self {
            FontStyle::Regular => b"Helvetica",
            FontStyle::Bold => b"Helvetica-Bold",
        }
    }

    pub(crate) fn resource_name(&self) -> &'static [u8] {
        match self {
            FontStyle::Regular => b"F1",
            FontStyle::Bold => b"F2",
        }
    }
}

// Advance widths (1/1000 em) for WinAnsi 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

fn glyph_width(style: FontStyle, byte: u8) -> u16 {
    let table = match style {
        FontStyle::Regular => &HELVETICA,
        FontStyle::Bold => &HELVETICA_BOLD,
    };
    match byte {
        0x20..=0x7E => table[(byte - 0x20) as usize],
        // Accented capitals
        0xC0..=0xDE => 722,
        _ => 556,
    }
}

/// Width of `text` in millimetres at `size_pt`.
pub fn text_width_mm(text: &str, style: FontStyle, size_pt: f32) -> f32 {
    let units: u32 = encode_win_ansi(text)
        .into_iter()
        .map(|b| glyph_width(style, b) as u32)
        .sum();
    units as f32 / 1000.0 * size_pt / PT_PER_MM
}

/// Split `text` into lines no wider than `max_width_mm`.
///
/// Breaks on spaces, keeps explicit newlines, and splits a single word that is
/// wider than the line on character boundaries.
pub fn wrap_text(text: &str, style: FontStyle, size_pt: f32, max_width_mm: f32) -> Vec<String> {
    let fits = |s: &str| text_width_mm(s, style, size_pt) <= max_width_mm;
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();

        for word in paragraph.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if fits(&candidate) {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if fits(word) {
                current = word.to_string();
            } else {
                for c in word.chars() {
                    let mut next = current.clone();
                    next.push(c);
                    if !current.is_empty() && !fits(&next) {
                        lines.push(std::mem::take(&mut current));
                        current.push(c);
                    } else {
                        current = next;
                    }
                }
            }
        }

        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_width() {
        // "Hello" = 722 + 556 + 222 + 222 + 556 = 2278 units
        let expected = 2278.0 / 1000.0 * 12.0 / PT_PER_MM;
        assert!((text_width_mm("Hello", FontStyle::Regular, 12.0) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_bold_is_wider() {
        let regular = text_width_mm("BARANGAY CERTIFICATION", FontStyle::Regular, 16.0);
        let bold = text_width_mm("BARANGAY CERTIFICATION", FontStyle::Bold, 16.0);
        assert!(bold > regular);
    }

    #[test]
    fn test_short_text_is_one_line() {
        let lines = wrap_text("To Whom It May Concern:", FontStyle::Regular, 12.0, 170.0);
        assert_eq!(lines, vec!["To Whom It May Concern:".to_string()]);
    }

    #[test]
    fn test_long_paragraph_wraps_on_spaces() {
        let text = "This is to certify that Juan Dela Cruz, 34, Single, and a resident of \
                    Purok 2, Barangay Lamintak Sur, Medellin, Cebu, has been a bonafide \
                    resident of this barangay since 2010.";
        let lines = wrap_text(text, FontStyle::Regular, 12.0, 170.0);
        assert!(lines.len() >= 2);
        assert_eq!(lines.join(" "), text);
        for line in &lines {
            assert!(text_width_mm(line, FontStyle::Regular, 12.0) <= 170.0);
        }
    }

    #[test]
    fn test_overlong_word_is_split() {
        let word = "W".repeat(80);
        let lines = wrap_text(&word, FontStyle::Regular, 12.0, 50.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_explicit_newlines_are_kept() {
        let lines = wrap_text("Regards,\nOffice", FontStyle::Regular, 12.0, 170.0);
        assert_eq!(lines, vec!["Regards,".to_string(), "Office".to_string()]);
    }

    proptest! {
        #[test]
        fn wrapped_lines_rejoin_to_input(words in prop::collection::vec("[a-zA-Z]{1,12}", 1..40)) {
            let text = words.join(" ");
            let lines = wrap_text(&text, FontStyle::Regular, 12.0, 170.0);
            prop_assert_eq!(lines.join(" "), text);
        }

        #[test]
        fn wrapped_lines_fit(words in prop::collection::vec("[a-zA-Z]{1,12}", 1..40)) {
            let text = words.join(" ");
            for line in wrap_text(&text, FontStyle::Regular, 12.0, 170.0) {
                prop_assert!(text_width_mm(&line, FontStyle::Regular, 12.0) <= 170.0);
            }
        }
    }
}
