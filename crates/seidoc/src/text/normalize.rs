use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static CONTROL_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x00-\x08\x0B\x0E-\x1F\x7F-\x9F]").expect("Control chars regex pattern is valid and should compile")
});
static ZERO_WIDTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{200B}-\u{200D}\u{2060}\u{FEFF}]").expect("Zero-width regex pattern is valid and should compile")
});
static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}").expect("Whitespace run regex pattern is valid and should compile"));
static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("Non-word regex pattern is valid and should compile"));
static ANY_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Whitespace regex pattern is valid and should compile"));

/// UTF-8 text that was decoded as Windows-1252/Latin-1, paired with the intended text.
///
/// Applied in order. Longer sequences come first so that `ção` is rebuilt
/// before its `ç` prefix is considered. A bare `Ã` is never a key: it is a
/// legitimate letter in uppercase Portuguese.
const MOJIBAKE_TABLE: &[(&str, &str)] = &[
    ("Ã§Ã£o", "ção"),
    ("Ã§Ãµes", "ções"),
    ("Ã£o", "ão"),
    ("â€“", "–"),
    ("â€”", "—"),
    ("â€œ", "\u{201C}"),
    ("â€\u{9D}", "\u{201D}"),
    ("â€™", "\u{2019}"),
    ("â€˜", "\u{2018}"),
    ("â€", "\u{201D}"),
    ("Ã©", "é"),
    ("Ã³", "ó"),
    ("Ãº", "ú"),
    ("Ãª", "ê"),
    ("Ã¡", "á"),
    ("Ã¢", "â"),
    ("Ã\u{AD}", "í"),
    ("Ã´", "ô"),
    ("Ã§", "ç"),
    ("Ã£", "ã"),
    ("Ãµ", "õ"),
    ("Ã¨", "è"),
    ("Ã¼", "ü"),
    ("Ã‡", "Ç"),
    ("Ã‰", "É"),
    ("Ã“", "Ó"),
    ("Ã\u{A0}", "à"),
    ("Âº", "º"),
    ("Âª", "ª"),
];

/// Decompose to base letters and drop combining marks, zero-width characters
/// and stray control characters, then collapse whitespace runs to one space.
///
/// Single whitespace characters (including `\n` and `\f`) are preserved.
pub fn normalize(text: &str) -> String {
    normalize_with(text, true)
}

fn normalize_with(text: &str, strip_accents: bool) -> String {
    if text.is_empty() {
        return String::new();
    }

    let decomposed: Cow<'_, str> = if strip_accents {
        Cow::Owned(text.nfkd().filter(|c| !is_combining_mark(*c)).collect())
    } else {
        Cow::Borrowed(text)
    };

    let without_zero_width = ZERO_WIDTH.replace_all(&decomposed, "");
    let without_controls = CONTROL_CHARS.replace_all(&without_zero_width, "");
    WHITESPACE_RUN.replace_all(&without_controls, " ").trim().to_string()
}

/// Replace known mojibake sequences with the characters they were meant to be.
pub fn repair_encoding(text: &str) -> String {
    let mut repaired = Cow::Borrowed(text);
    for (corrupted, fixed) in MOJIBAKE_TABLE {
        if repaired.contains(corrupted) {
            repaired = Cow::Owned(repaired.replace(corrupted, fixed));
        }
    }
    repaired.into_owned()
}

/// Repair, then normalize. Repair must run first: accent stripping
/// decomposes the `Ã` lead character and the sequence becomes unrecoverable.
pub fn clean_text(text: &str, strip_accents: bool) -> String {
    normalize_with(&repair_encoding(text), strip_accents)
}

/// Comparison key for an address string: accents and punctuation removed,
/// whitespace collapsed, lowercased.
pub fn normalize_address(address: &str) -> String {
    let ascii: String = address.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let no_punct = NON_WORD.replace_all(&ascii, "");
    ANY_WHITESPACE.replace_all(&no_punct, " ").trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_accents() {
        assert_eq!(normalize("Notificação São Paulo"), "Notificacao Sao Paulo");
    }

    #[test]
    fn test_normalize_collapses_whitespace_runs() {
        assert_eq!(normalize("  Rua   das \t\t Flores  "), "Rua das Flores");
    }

    #[test]
    fn test_normalize_keeps_single_newline() {
        assert_eq!(normalize("linha um\nlinha dois"), "linha um\nlinha dois");
    }

    #[test]
    fn test_normalize_removes_zero_width() {
        assert_eq!(normalize("CN\u{200B}PJ:\u{FEFF} 1"), "CNPJ: 1");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n  "), "");
    }

    #[test]
    fn test_normalize_has_no_double_whitespace() {
        let out = normalize("a \u{00A0} b\n\n\nc\u{2003}\u{2003}d");
        assert!(!out.chars().zip(out.chars().skip(1)).any(|(a, b)| a.is_whitespace() && b.is_whitespace()));
    }

    #[test]
    fn test_repair_cao() {
        assert_eq!(repair_encoding("NotificaÃ§Ã£o"), "Notificação");
    }

    #[test]
    fn test_repair_table_entries() {
        assert_eq!(repair_encoding("cafÃ©"), "café");
        assert_eq!(repair_encoding("Ã³rgÃ£o"), "órgão");
        assert_eq!(repair_encoding("pÃºblico"), "público");
        assert_eq!(repair_encoding("Ã\u{A0} vista"), "à vista");
        assert_eq!(repair_encoding("nÂº 10"), "nº 10");
    }

    #[test]
    fn test_repair_is_idempotent() {
        let once = repair_encoding("InformaÃ§Ã£o pÃºblica â€“ sessÃ£o");
        assert_eq!(once, "Informação pública – sessão");
        assert_eq!(repair_encoding(&once), once);
    }

    #[test]
    fn test_repair_leaves_correct_uppercase_alone() {
        assert_eq!(repair_encoding("SÃO PAULO"), "SÃO PAULO");
    }

    #[test]
    fn test_clean_text_repairs_before_stripping() {
        assert_eq!(clean_text("NotificaÃ§Ã£o  Ãºnica", true), "Notificacao unica");
        assert_eq!(clean_text("NotificaÃ§Ã£o  Ãºnica", false), "Notificação única");
    }

    #[test]
    fn test_normalize_address() {
        assert_eq!(normalize_address("  Rua São João, nº 45 - Centro "), "rua sao joao no 45 centro");
        assert_eq!(normalize_address("RUA SAO JOAO N 45"), "rua sao joao n 45");
    }
}
