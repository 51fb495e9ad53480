//! Mora inventory — every speech-sound unit the diphone store is recorded in.
//!
//! Each entry lists a label followed by all surface spellings that map to it:
//! full-width katakana, hiragana and romanized forms (including the common
//! alternate romanizations such as `shi`/`si`, `tsu`/`tu`).  All spellings go
//! into one trie, so katakana readings and romaji input are tokenized by the
//! same scan.
//!
//! Besides sounds the table carries structural marks:
//!
//! | label | meaning                                     |
//! |-------|---------------------------------------------|
//! | `.`   | sentence pause (long)                       |
//! | `,`   | clause pause (short)                        |
//! | `-`   | long-vowel mark                             |
//! | `q`   | gemination (っ / ッ)                        |
//! | `qq`  | romanized doubled consonant (`kk`, `tt`, …) |

use once_cell::sync::Lazy;

use crate::trie::{Rewind, TransTable};

/// A speech-sound unit or structural mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Mora {
    name: &'static str,
}

impl Mora {
    pub const PERIOD: &'static str = ".";
    pub const COMMA: &'static str = ",";
    pub const LONG: &'static str = "-";
    pub const GEMINATE: &'static str = "q";
    pub const DOUBLED: &'static str = "qq";

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `true` for the vowel-lengthened forms (`aa`, `ii`, …).
    pub fn is_long_vowel(&self) -> bool {
        LONG_VOWELS.contains(&self.name)
    }
}

impl Rewind for Mora {
    fn rewinds(&self) -> bool {
        self.name == Mora::DOUBLED
    }
}

const LONG_VOWELS: &[&str] = &["aa", "ii", "uu", "ee", "oo"];

// ─────────────────────────────────────────────────────────────────────────────
// Inventory — label first, then every accepted spelling
// ─────────────────────────────────────────────────────────────────────────────

const MORA: &[&[&str]] = &[
    &[".", "。", "．"],
    &[",", "、", "，"],
    &["-", "ー"],
    &["q", "ッ", "っ"],
    &[
        "qq", "kk", "ss", "tt", "cc", "nn", "hh", "mm", "yy", "rr", "ww", "gg", "zz", "dd", "bb",
        "pp", "jj", "vv",
    ],
    &["a", "ア", "あ", "a"],
    &["i", "イ", "い", "i"],
    &["u", "ウ", "う", "u"],
    &["e", "エ", "え", "e"],
    &["o", "オ", "お", "o"],
    &["aa", "ā", "â"],
    &["ii", "ī", "î"],
    &["uu", "ū", "û"],
    &["ee", "ē", "ê"],
    &["oo", "ō", "ô"],
    &["ka", "カ", "か", "ka"],
    &["ki", "キ", "き", "ki"],
    &["ku", "ク", "く", "ku"],
    &["ke", "ケ", "け", "ke"],
    &["ko", "コ", "こ", "ko"],
    &["sa", "サ", "さ", "sa"],
    &["si", "シ", "し", "si", "shi"],
    &["su", "ス", "す", "su"],
    &["se", "セ", "せ", "se"],
    &["so", "ソ", "そ", "so"],
    &["ta", "タ", "た", "ta"],
    &["ti", "チ", "ち", "ti", "chi"],
    &["tu", "ツ", "つ", "tu", "tsu"],
    &["te", "テ", "て", "te"],
    &["to", "ト", "と", "to"],
    &["na", "ナ", "な", "na"],
    &["ni", "ニ", "に", "ni"],
    &["nu", "ヌ", "ぬ", "nu"],
    &["ne", "ネ", "ね", "ne"],
    &["no", "ノ", "の", "no"],
    &["ha", "ハ", "は", "ha"],
    &["hi", "ヒ", "ひ", "hi"],
    &["hu", "フ", "ふ", "hu", "fu"],
    &["he", "ヘ", "へ", "he"],
    &["ho", "ホ", "ほ", "ho"],
    &["ma", "マ", "ま", "ma"],
    &["mi", "ミ", "み", "mi"],
    &["mu", "ム", "む", "mu"],
    &["me", "メ", "め", "me"],
    &["mo", "モ", "も", "mo"],
    &["ya", "ヤ", "や", "ya"],
    &["yi", "ヰ", "ゐ", "yi"],
    &["yu", "ユ", "ゆ", "yu"],
    &["ye", "ヱ", "ゑ", "ye"],
    &["yo", "ヨ", "よ", "yo"],
    &["ra", "ラ", "ら", "ra"],
    &["ri", "リ", "り", "ri"],
    &["ru", "ル", "る", "ru"],
    &["re", "レ", "れ", "re"],
    &["ro", "ロ", "ろ", "ro"],
    &["wa", "ワ", "わ", "wa"],
    &["wo", "ヲ", "を", "wo"],
    &["n", "ン", "ん", "n"],
    // voiced (dakuon)
    &["ga", "ガ", "が", "ga"],
    &["gi", "ギ", "ぎ", "gi"],
    &["gu", "グ", "ぐ", "gu"],
    &["ge", "ゲ", "げ", "ge"],
    &["go", "ゴ", "ご", "go"],
    &["za", "ザ", "ざ", "za"],
    &["zi", "ジ", "ヂ", "じ", "ぢ", "zi", "di", "ji"],
    &["zu", "ズ", "ヅ", "ず", "づ", "zu", "du"],
    &["ze", "ゼ", "ぜ", "ze"],
    &["zo", "ゾ", "ぞ", "zo"],
    &["da", "ダ", "だ", "da"],
    &["de", "デ", "で", "de"],
    &["do", "ド", "ど", "do"],
    &["ba", "バ", "ば", "ba"],
    &["bi", "ビ", "び", "bi"],
    &["bu", "ブ", "ぶ", "bu"],
    &["be", "ベ", "べ", "be"],
    &["bo", "ボ", "ぼ", "bo"],
    &["fa", "ファ", "ふぁ", "fa"],
    &["fi", "フィ", "ふぃ", "fi"],
    &["fe", "フェ", "ふぇ", "fe"],
    &["fo", "フォ", "ふぉ", "fo"],
    &["va", "ヴァ", "う゛ぁ", "ゔぁ", "va"],
    &["vi", "ヴィ", "う゛ぃ", "ゔぃ", "vi"],
    &["vu", "ヴ", "う゛", "ゔ", "vu"],
    &["ve", "ヴェ", "う゛ぇ", "ゔぇ", "ve"],
    &["vo", "ヴォ", "う゛ぉ", "ゔぉ", "vo"],
    // semi-voiced (handakuon)
    &["pa", "パ", "ぱ", "pa"],
    &["pi", "ピ", "ぴ", "pi"],
    &["pu", "プ", "ぷ", "pu"],
    &["pe", "ペ", "ぺ", "pe"],
    &["po", "ポ", "ぽ", "po"],
    // palatalized (youon)
    &["kya", "キャ", "きゃ", "kya"],
    &["kyu", "キュ", "きゅ", "kyu"],
    &["kye", "キェ", "きぇ", "kye"],
    &["kyo", "キョ", "きょ", "kyo"],
    &["sya", "シャ", "しゃ", "sha", "sya"],
    &["syu", "シュ", "しゅ", "shu", "syu"],
    &["sye", "シェ", "しぇ", "she", "sye"],
    &["syo", "ショ", "しょ", "sho", "syo"],
    &["cya", "チャ", "ちゃ", "tya", "cha"],
    &["cyu", "チュ", "ちゅ", "tyu", "chu"],
    &["cye", "チェ", "ちぇ", "tye", "che"],
    &["cyo", "チョ", "ちょ", "tyo", "cho"],
    &["nya", "ニャ", "にゃ", "nya"],
    &["nyu", "ニュ", "にゅ", "nyu"],
    &["nye", "ニェ", "にぇ", "nye"],
    &["nyo", "ニョ", "にょ", "nyo"],
    &["hya", "ヒャ", "ひゃ", "hya"],
    &["hyu", "ヒュ", "ひゅ", "hyu"],
    &["hye", "ヒェ", "ひぇ", "hye"],
    &["hyo", "ヒョ", "ひょ", "hyo"],
    &["mya", "ミャ", "みゃ", "mya"],
    &["myu", "ミュ", "みゅ", "myu"],
    &["mye", "ミェ", "みぇ", "mye"],
    &["myo", "ミョ", "みょ", "myo"],
    &["rya", "リャ", "りゃ", "rya"],
    &["ryu", "リュ", "りゅ", "ryu"],
    &["rye", "リェ", "りぇ", "rye"],
    &["ryo", "リョ", "りょ", "ryo"],
    // palatalized + voiced
    &["gya", "ギャ", "ぎゃ", "gya"],
    &["gyu", "ギュ", "ぎゅ", "gyu"],
    &["gye", "ギェ", "ぎぇ", "gye"],
    &["gyo", "ギョ", "ぎょ", "gyo"],
    &["jya", "ジャ", "ヂャ", "じゃ", "ぢゃ", "ja", "zha", "zya", "dya"],
    &["jyu", "ジュ", "ヂュ", "じゅ", "ぢゅ", "ju", "zhu", "zyu", "dyu"],
    &["jye", "ジェ", "ヂェ", "じぇ", "ぢぇ", "je", "zhe", "zye", "dye"],
    &["jyo", "ジョ", "ヂョ", "じょ", "ぢょ", "jo", "zho", "zyo", "dyo"],
    &["bya", "ビャ", "びゃ", "bya"],
    &["byu", "ビュ", "びゅ", "byu"],
    &["bye", "ビェ", "びぇ", "bye"],
    &["byo", "ビョ", "びょ", "byo"],
    // palatalized + semi-voiced
    &["pya", "ピャ", "ぴゃ", "pya"],
    &["pyu", "ピュ", "ぴゅ", "pyu"],
    &["pye", "ピェ", "ぴぇ", "pye"],
    &["pyo", "ピョ", "ぴょ", "pyo"],
];

static MORA_TABLE: Lazy<TransTable<Mora>> = Lazy::new(|| {
    let mut table = TransTable::new();
    for entry in MORA {
        let mora = Mora { name: entry[0] };
        for surface in &entry[1..] {
            table.add(surface, mora);
        }
    }
    table
});

/// The process-wide mora trie, built on first use.
pub fn mora_table() -> &'static TransTable<Mora> {
    &MORA_TABLE
}

/// Tokenize a reading (katakana, hiragana or romaji) into morae.
///
/// Characters that no mora starts with are dropped.
pub fn parse(reading: &str) -> Vec<Mora> {
    MORA_TABLE.parse(reading).copied().collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn names(s: &str) -> Vec<&'static str> {
        parse(s).iter().map(Mora::name).collect()
    }

    #[test]
    fn test_every_spelling_parses_alone() {
        for entry in MORA {
            for surface in &entry[1..] {
                assert_eq!(names(surface), vec![entry[0]], "surface {:?}", surface);
            }
        }
    }

    #[test]
    fn test_table_size() {
        let spellings: usize = MORA.iter().map(|e| e.len() - 1).sum();
        assert_eq!(mora_table().len(), spellings);
    }

    #[test]
    fn test_katakana_word() {
        assert_eq!(names("キョウト"), vec!["kyo", "u", "to"]);
        assert_eq!(names("ガッコー"), vec!["ga", "q", "ko", "-"]);
        assert_eq!(names("コンニチワ。"), vec!["ko", "n", "ni", "ti", "wa", "."]);
    }

    #[test]
    fn test_romaji_and_kana_agree() {
        assert_eq!(names("shinbun"), names("シンブン"));
        assert_eq!(names("chotto"), vec!["cyo", "qq", "to"]);
    }

    #[test]
    fn test_double_consonant_backtracks() {
        assert_eq!(names("kka"), vec!["qq", "ka"]);
        assert_eq!(names("kitte"), vec!["ki", "qq", "te"]);
    }

    #[test]
    fn test_unknown_chars_dropped() {
        assert_eq!(names("カ★タ"), vec!["ka", "ta"]);
        assert!(names("漢字").is_empty());
    }

    #[test]
    fn test_long_vowel_forms() {
        let m = parse("ō");
        assert_eq!(m.len(), 1);
        assert!(m[0].is_long_vowel());
        assert!(!parse("o")[0].is_long_vowel());
    }

    #[test]
    fn test_rewind_only_for_doubled() {
        assert!(parse("kk")[0].rewinds());
        assert!(!parse("ッ")[0].rewinds());
    }
}
