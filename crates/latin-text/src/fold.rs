//! Transliteration table for accented Latin letters

/// Groups of characters and the ASCII character each group folds to.
///
/// Vietnamese vowels cover every tone mark on every base vowel (a, ă, â, e,
/// ê, i, o, ô, ơ, u, ư, y). Every target is printable ASCII, so folding is
/// idempotent.
pub const FOLD_TABLE: &[(&str, char)] = &[
    // Vietnamese
    ("àáảãạăằắẳẵặâầấẩẫậ", 'a'),
    ("ÀÁẢÃẠĂẰẮẲẴẶÂẦẤẨẪẬ", 'A'),
    ("èéẻẽẹêềếểễệ", 'e'),
    ("ÈÉẺẼẸÊỀẾỂỄỆ", 'E'),
    ("ìíỉĩị", 'i'),
    ("ÌÍỈĨỊ", 'I'),
    ("òóỏõọôồốổỗộơờớởỡợ", 'o'),
    ("ÒÓỎÕỌÔỒỐỔỖỘƠỜỚỞỠỢ", 'O'),
    ("ùúủũụưừứửữự", 'u'),
    ("ÙÚỦŨỤƯỪỨỬỮỰ", 'U'),
    ("ỳýỷỹỵ", 'y'),
    ("ỲÝỶỸỴ", 'Y'),
    ("đ", 'd'),
    ("Đ", 'D'),
    // Western European
    ("äåāąǎ", 'a'),
    ("ÄÅĀĄǍ", 'A'),
    ("çćĉċč", 'c'),
    ("ÇĆĈĊČ", 'C'),
    ("ëēĕėęě", 'e'),
    ("ËĒĔĖĘĚ", 'E'),
    ("îïīįı", 'i'),
    ("ÎÏĪĮİ", 'I'),
    ("ñńņň", 'n'),
    ("ÑŃŅŇ", 'N'),
    ("öøōőǒ", 'o'),
    ("ÖØŌŐǑ", 'O'),
    ("ûüūůűų", 'u'),
    ("ÛÜŪŮŰŲ", 'U'),
    ("ÿ", 'y'),
    ("Ÿ", 'Y'),
    ("śŝşš", 's'),
    ("ŚŜŞŠ", 'S'),
    ("źżž", 'z'),
    ("ŹŻŽ", 'Z'),
    ("ł", 'l'),
    ("Ł", 'L'),
    // Typography
    ("\u{00A0}\u{2007}\u{202F}", ' '),
    ("‘’‚′", '\''),
    ("“”„″", '"'),
    ("‐‑‒–—―", '-'),
];

/// Look up the transliteration of a single character
pub fn fold_char(c: char) -> Option<char> {
    FOLD_TABLE
        .iter()
        .find(|(group, _)| group.contains(c))
        .map(|&(_, base)| base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_each_vietnamese_vowel_class() {
        for c in "àáảãạăằắẳẵặâầấẩẫậ".chars() {
            assert_eq!(fold_char(c), Some('a'), "{c}");
        }
        for c in "èéẻẽẹêềếểễệ".chars() {
            assert_eq!(fold_char(c), Some('e'), "{c}");
        }
        for c in "ìíỉĩị".chars() {
            assert_eq!(fold_char(c), Some('i'), "{c}");
        }
        for c in "òóỏõọôồốổỗộơờớởỡợ".chars() {
            assert_eq!(fold_char(c), Some('o'), "{c}");
        }
        for c in "ùúủũụưừứửữự".chars() {
            assert_eq!(fold_char(c), Some('u'), "{c}");
        }
        for c in "ỳýỷỹỵ".chars() {
            assert_eq!(fold_char(c), Some('y'), "{c}");
        }
    }

    #[test]
    fn test_fold_uppercase_vowel_classes() {
        assert_eq!(fold_char('Ấ'), Some('A'));
        assert_eq!(fold_char('Ễ'), Some('E'));
        assert_eq!(fold_char('Ị'), Some('I'));
        assert_eq!(fold_char('Ợ'), Some('O'));
        assert_eq!(fold_char('Ữ'), Some('U'));
        assert_eq!(fold_char('Ỹ'), Some('Y'));
    }

    #[test]
    fn test_fold_d_stroke() {
        assert_eq!(fold_char('đ'), Some('d'));
        assert_eq!(fold_char('Đ'), Some('D'));
    }

    #[test]
    fn test_fold_unknown() {
        assert_eq!(fold_char('東'), None);
        assert_eq!(fold_char('A'), None);
    }

    #[test]
    fn test_table_targets_are_printable_ascii() {
        for (group, base) in FOLD_TABLE {
            assert!(crate::is_printable_ascii(*base), "{group}");
        }
    }

    #[test]
    fn test_table_groups_do_not_overlap() {
        let mut seen = std::collections::HashSet::new();
        for (group, _) in FOLD_TABLE {
            for c in group.chars() {
                assert!(seen.insert(c), "duplicate entry {c}");
            }
        }
    }
}
