//! Latin Text - folding text into a font's supported repertoire
//!
//! This crate provides:
//! - Printable-ASCII classification
//! - Transliteration of accented Latin letters (Vietnamese tone-marked
//!   vowels, `đ`/`Đ`, Western European accents) to their base letters
//! - Folding against an arbitrary repertoire predicate, for fonts that
//!   carry more than ASCII
//!
//! Folding never fails and never changes the character count of the input.
//!
//! # Example
//!
//! ```
//! use latin_text::{sanitize, sanitize_for};
//!
//! assert_eq!(sanitize("Nguyễn Văn Anh"), "Nguyen Van Anh");
//!
//! // Keep everything the font can draw, fold the rest
//! let kept = sanitize_for("Phòng Kế toán", |c| c.is_ascii() || c == 'ò');
//! assert_eq!(kept, "Phòng Ke toan");
//! ```

mod charset;
mod fold;

pub use charset::is_printable_ascii;
pub use fold::{fold_char, FOLD_TABLE};

/// Fold every character outside printable ASCII through the transliteration
/// table. Characters missing from the table pass through unchanged.
pub fn sanitize(text: &str) -> String {
    sanitize_for(text, is_printable_ascii)
}

/// Fold every character the `supported` predicate rejects.
///
/// Supported characters are kept as-is; unsupported ones are replaced by
/// their table entry when there is one and kept otherwise.
pub fn sanitize_for<F>(text: &str, supported: F) -> String
where
    F: Fn(char) -> bool,
{
    text.chars()
        .map(|c| {
            if supported(c) {
                c
            } else {
                fold_char(c).unwrap_or(c)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_vietnamese_name() {
        assert_eq!(sanitize("Nguyễn Văn Anh"), "Nguyen Van Anh");
        assert_eq!(sanitize("Trần Thị Bích Ngọc"), "Tran Thi Bich Ngoc");
        assert_eq!(sanitize("Đặng Hữu Phước"), "Dang Huu Phuoc");
    }

    #[test]
    fn test_sanitize_department() {
        assert_eq!(sanitize("Phòng Kế toán"), "Phong Ke toan");
        assert_eq!(sanitize("Ban Giám đốc"), "Ban Giam doc");
    }

    #[test]
    fn test_sanitize_passes_unknown_through() {
        assert_eq!(sanitize("Tokyo 東京"), "Tokyo 東京");
        assert_eq!(sanitize("สวัสดี"), "สวัสดี");
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_sanitize_for_keeps_supported() {
        let latin1 = |c: char| (c as u32) < 0x100;
        assert_eq!(sanitize_for("Café Đà Nẵng", latin1), "Café Dà Nang");
    }

    #[test]
    fn test_sanitize_for_everything_supported() {
        let text = "Nguyễn Văn Anh";
        assert_eq!(sanitize_for(text, |_| true), text);
    }

    proptest! {
        #[test]
        fn prop_identity_on_printable_ascii(s in "[ -~]{0,64}") {
            prop_assert_eq!(sanitize(&s), s);
        }

        #[test]
        fn prop_preserves_char_count(s in "\\PC{0,64}") {
            prop_assert_eq!(sanitize(&s).chars().count(), s.chars().count());
        }

        #[test]
        fn prop_idempotent(s in "\\PC{0,64}") {
            let once = sanitize(&s);
            prop_assert_eq!(sanitize(&once), once.clone());
        }
    }
}
