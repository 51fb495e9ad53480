//! Character-level classification and folding for Japanese text.

/// Segmentation class of a single character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CharClass {
    Other,
    Latin,
    Hiragana,
    Katakana,
    Kanji,
    Digit,
    OpenBracket,
}

/// Inclusive code point ranges.  Later entries win over earlier ones.
const CLASS_RANGES: &[(char, char, CharClass)] = &[
    ('A', 'Z', CharClass::Latin),
    ('a', 'z', CharClass::Latin),
    ('\u{FF21}', '\u{FF3A}', CharClass::Latin), // Ａ-Ｚ
    ('\u{FF41}', '\u{FF5A}', CharClass::Latin), // ａ-ｚ
    ('\u{3041}', '\u{3093}', CharClass::Hiragana), // ぁ-ん
    ('\u{30A1}', '\u{30F4}', CharClass::Katakana), // ァ-ヴ
    ('\u{30FC}', '\u{30FC}', CharClass::Katakana), // ー
    ('\u{FF66}', '\u{FF9F}', CharClass::Katakana), // half-width ｦ-ﾟ
    ('\u{3005}', '\u{3007}', CharClass::Kanji), // 々〆〇
    ('\u{4E00}', '\u{9FFF}', CharClass::Kanji),
    ('0', '9', CharClass::Digit),
    ('.', '.', CharClass::Digit),
    ('\u{FF10}', '\u{FF19}', CharClass::Digit), // ０-９
];

const OPEN_BRACKETS: &str = "\"([〈《「『【〔\u{201C}（［\u{FF62}";

/// Classify `c` for the segmenter.
pub fn classify(c: char) -> CharClass {
    if OPEN_BRACKETS.contains(c) {
        return CharClass::OpenBracket;
    }
    CLASS_RANGES
        .iter()
        .rev()
        .find(|(lo, hi, _)| (*lo..=*hi).contains(&c))
        .map_or(CharClass::Other, |&(_, _, class)| class)
}

/// ASCII or full-width decimal digit.
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || ('\u{FF10}'..='\u{FF19}').contains(&c)
}

/// Convert hiragana (ぁ..ゔ) to katakana, leaving everything else alone.
pub fn hiragana_to_katakana(s: &str) -> String {
    s.chars()
        .map(|c| {
            if ('\u{3041}'..='\u{3094}').contains(&c) {
                char::from_u32(c as u32 + 0x60).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Fold a full-width Latin letter or digit to its ASCII form.
///
/// Full-width punctuation is deliberately left alone: `．` and `，` are
/// pause marks for the mora table, not symbols to spell out.
pub fn fold_fullwidth_alnum(c: char) -> char {
    match c {
        '\u{FF10}'..='\u{FF19}' | '\u{FF21}'..='\u{FF3A}' | '\u{FF41}'..='\u{FF5A}' => {
            char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
        }
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify('a'), CharClass::Latin);
        assert_eq!(classify('Ｑ'), CharClass::Latin);
        assert_eq!(classify('の'), CharClass::Hiragana);
        assert_eq!(classify('ヴ'), CharClass::Katakana);
        assert_eq!(classify('ー'), CharClass::Katakana);
        assert_eq!(classify('ｶ'), CharClass::Katakana);
        assert_eq!(classify('漢'), CharClass::Kanji);
        assert_eq!(classify('々'), CharClass::Kanji);
        assert_eq!(classify('7'), CharClass::Digit);
        assert_eq!(classify('.'), CharClass::Digit);
        assert_eq!(classify('３'), CharClass::Digit);
        assert_eq!(classify('「'), CharClass::OpenBracket);
        assert_eq!(classify('('), CharClass::OpenBracket);
        assert_eq!(classify('」'), CharClass::Other);
        assert_eq!(classify('。'), CharClass::Other);
        assert_eq!(classify(' '), CharClass::Other);
    }

    #[test]
    fn test_hiragana_to_katakana() {
        assert_eq!(hiragana_to_katakana("きょうは"), "キョウハ");
        assert_eq!(hiragana_to_katakana("らーめん"), "ラーメン");
        assert_eq!(hiragana_to_katakana("ぢゔ"), "ヂヴ");
        assert_eq!(hiragana_to_katakana("abc。"), "abc。");
    }

    #[test]
    fn test_fold_fullwidth_alnum() {
        assert_eq!(fold_fullwidth_alnum('Ａ'), 'A');
        assert_eq!(fold_fullwidth_alnum('ｚ'), 'z');
        assert_eq!(fold_fullwidth_alnum('９'), '9');
        assert_eq!(fold_fullwidth_alnum('．'), '．');
        assert_eq!(fold_fullwidth_alnum('あ'), 'あ');
    }

    #[test]
    fn test_is_digit() {
        assert!(is_digit('0'));
        assert!(is_digit('９'));
        assert!(!is_digit('.'));
        assert!(!is_digit('一'));
    }
}
