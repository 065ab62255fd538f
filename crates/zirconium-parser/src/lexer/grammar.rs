//! Static grammar tables: keywords, operators, punctuation and binary
//! operator precedence.
//!
//! The tables are immutable `static` data shared by every lexer and parser.

use super::token::{Keyword, Operator, Punct};

/// Reserved words.
pub static KEYWORDS: &[(&str, Keyword)] = &[
    ("if", Keyword::If),
    ("else", Keyword::Else),
    ("for", Keyword::For),
    ("in", Keyword::In),
    ("function", Keyword::Function),
    ("return", Keyword::Return),
    ("let", Keyword::Let),
    ("const", Keyword::Const),
    ("enum", Keyword::Enum),
    ("export", Keyword::Export),
];

/// Operator spellings, longest first so a prefix scan is maximal munch.
pub static OPERATORS: &[(&str, Operator)] = &[
    ("==", Operator::EqualEqual),
    ("!=", Operator::NotEqual),
    ("<=", Operator::LessEqual),
    (">=", Operator::GreaterEqual),
    ("&&", Operator::AndAnd),
    ("||", Operator::OrOr),
    ("+", Operator::Plus),
    ("-", Operator::Minus),
    ("*", Operator::Star),
    ("/", Operator::Slash),
    ("%", Operator::Percent),
    ("=", Operator::Assign),
    ("<", Operator::Less),
    (">", Operator::Greater),
    ("!", Operator::Bang),
];

/// Punctuation characters.
pub static PUNCTUATION: &[(char, Punct)] = &[
    ('(', Punct::LeftParen),
    (')', Punct::RightParen),
    ('{', Punct::LeftBrace),
    ('}', Punct::RightBrace),
    ('[', Punct::LeftBracket),
    (']', Punct::RightBracket),
    (',', Punct::Comma),
    (':', Punct::Colon),
    ('.', Punct::Dot),
];

/// Binary operator precedence. Higher binds tighter.
pub static PRECEDENCE: &[(Operator, u8)] = &[
    (Operator::Assign, 1),
    (Operator::OrOr, 2),
    (Operator::AndAnd, 3),
    (Operator::EqualEqual, 4),
    (Operator::NotEqual, 4),
    (Operator::Less, 5),
    (Operator::LessEqual, 5),
    (Operator::Greater, 5),
    (Operator::GreaterEqual, 5),
    (Operator::Plus, 6),
    (Operator::Minus, 6),
    (Operator::Star, 7),
    (Operator::Slash, 7),
    (Operator::Percent, 7),
];

/// Look up a reserved word.
pub fn lookup_keyword(word: &str) -> Option<Keyword> {
    KEYWORDS.iter().find(|(text, _)| *text == word).map(|(_, kw)| *kw)
}

/// Match the longest operator at the start of `text`.
pub fn match_operator(text: &str) -> Option<(Operator, usize)> {
    OPERATORS
        .iter()
        .find(|(spelling, _)| text.starts_with(spelling))
        .map(|(spelling, op)| (*op, spelling.len()))
}

/// Look up a punctuation character.
pub fn lookup_punct(ch: char) -> Option<Punct> {
    PUNCTUATION.iter().find(|(c, _)| *c == ch).map(|(_, p)| *p)
}

/// Binary precedence of an operator, or `None` for prefix-only operators.
pub fn precedence(op: Operator) -> Option<u8> {
    PRECEDENCE.iter().find(|(o, _)| *o == op).map(|(_, p)| *p)
}

/// Whether an operator groups to the right.
pub fn is_right_associative(op: Operator) -> bool {
    op == Operator::Assign
}

/// Whether a word is reserved and may not name a variable or function.
pub fn is_reserved(word: &str) -> bool {
    lookup_keyword(word).is_some() || word == "true" || word == "false"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_round_trip() {
        for (text, kw) in KEYWORDS {
            assert_eq!(lookup_keyword(text), Some(*kw));
            assert_eq!(kw.as_str(), *text);
        }
        assert_eq!(lookup_keyword("print"), None);
    }

    #[test]
    fn operators_use_maximal_munch() {
        assert_eq!(match_operator("==1"), Some((Operator::EqualEqual, 2)));
        assert_eq!(match_operator("= 1"), Some((Operator::Assign, 1)));
        assert_eq!(match_operator("<=x"), Some((Operator::LessEqual, 2)));
        assert_eq!(match_operator("!x"), Some((Operator::Bang, 1)));
        assert_eq!(match_operator("&x"), None);
    }

    #[test]
    fn operator_spellings_match_table() {
        for (text, op) in OPERATORS {
            assert_eq!(op.as_str(), *text);
        }
    }

    #[test]
    fn precedence_ordering() {
        let mul = precedence(Operator::Star).unwrap();
        let add = precedence(Operator::Plus).unwrap();
        let cmp = precedence(Operator::Less).unwrap();
        let eq = precedence(Operator::EqualEqual).unwrap();
        let and = precedence(Operator::AndAnd).unwrap();
        let or = precedence(Operator::OrOr).unwrap();
        let assign = precedence(Operator::Assign).unwrap();
        assert!(mul > add && add > cmp && cmp > eq && eq > and && and > or && or > assign);
        assert_eq!(precedence(Operator::Bang), None);
    }

    #[test]
    fn only_assignment_is_right_associative() {
        assert!(is_right_associative(Operator::Assign));
        assert!(!is_right_associative(Operator::Minus));
    }

    #[test]
    fn reserved_words() {
        assert!(is_reserved("let"));
        assert!(is_reserved("true"));
        assert!(!is_reserved("print"));
        assert_eq!(lookup_punct('{'), Some(Punct::LeftBrace));
        assert_eq!(lookup_punct('@'), None);
    }
}
