use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

use crate::ast::{Arg, AttrValue};

/// Character pool for a single-letter category used by the text generators.
pub fn char_table(category: &str) -> &'static str {
    match category {
        "t" => "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789",
        "u" => "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
        "l" => "abcdefghijklmnopqrstuvwxyz",
        "w" => "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz",
        "h" => "0123456789abcdef",
        "H" => "0123456789ABCDEF",
        "d" => "0123456789",
        _ => "",
    }
}

/// Qualifies a bare id to `scope:id`; ids that already carry a `:` pass
/// through unchanged.
pub fn full_id(scope: &str, id: &str) -> String {
    if id.contains(':') {
        id.to_string()
    } else {
        format!("{scope}:{id}")
    }
}

/// parseInt-style integer parsing: optional sign, digits, trailing garbage
/// ignored; anything else yields the fallback.
pub(crate) fn try_int(source: &str, fallback: i64) -> i64 {
    let s = source.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => (1, s),
    };
    let end = digits.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return fallback;
    }
    digits[..end]
        .parse::<i64>()
        .map(|n| sign * n)
        .unwrap_or(fallback)
}

type SyntaxHandler = fn(&Captures<'_>, &str) -> (&'static str, Vec<Arg>);
type AttrHandler = fn(&Captures<'_>, &str) -> (String, AttrValue);

pub struct SyntaxRule {
    pub name: &'static str,
    matcher: Regex,
    handler: SyntaxHandler,
}

pub struct AttrMacro {
    pub name: &'static str,
    matcher: Regex,
    handler: AttrHandler,
}

fn syntax(name: &'static str, pattern: &str, handler: SyntaxHandler) -> Option<SyntaxRule> {
    Regex::new(pattern).ok().map(|matcher| SyntaxRule {
        name,
        matcher,
        handler,
    })
}

fn attr_macro(name: &'static str, pattern: &str, handler: AttrHandler) -> Option<AttrMacro> {
    Regex::new(pattern).ok().map(|matcher| AttrMacro {
        name,
        matcher,
        handler,
    })
}

fn split_pool(source: &str, separator: char) -> Arg {
    Arg::List(
        source
            .split(separator)
            .map(|entry| Arg::Text(entry.to_string()))
            .collect(),
    )
}

/// The built-in syntax table. Rules run in order against the first
/// shell-word of a tag and the first match wins; a tag matching none of
/// them degrades to a literal echo of itself.
pub static SYNTAX_RULES: LazyLock<Vec<SyntaxRule>> = LazyLock::new(|| {
    [
        syntax("reference", r"^#([\w:]+)", |caps, scope| {
            ("ref", vec![Arg::Text(full_id(scope, &caps[1]))])
        }),
        syntax("time", r"^([tm])s$", |caps, _| {
            ("time", vec![Arg::Bool(&caps[1] == "t")])
        }),
        syntax("choose_file", r"(?i)^(c)hoose:(.*)", |caps, _| {
            (
                "chooseFromFile",
                vec![Arg::Text(caps[2].to_string()), Arg::Bool(&caps[1] == "C")],
            )
        }),
        syntax("choose", r"^[^|]+\|.*", |caps, _| {
            ("choose", vec![split_pool(&caps[0], '|'), Arg::Bool(false)])
        }),
        syntax("choose_orderly", r"^[^,]+,.*", |caps, _| {
            ("choose", vec![split_pool(&caps[0], ','), Arg::Bool(true)])
        }),
        syntax("rand_text", r"^([tulwhHd])(\d+)-(\d+)", |caps, _| {
            (
                "randText",
                vec![
                    Arg::Text(char_table(&caps[1]).to_string()),
                    Arg::Int(try_int(&caps[2], 0)),
                    Arg::Int(try_int(&caps[3], 0)),
                ],
            )
        }),
        syntax("power_text", r"^([tulwhHd])(\d+):(\d+)?", |caps, _| {
            let min = try_int(&caps[2], 0);
            let max = caps.get(3).map_or(min, |m| try_int(m.as_str(), min));
            (
                "power",
                vec![
                    Arg::Text(char_table(&caps[1]).to_string()),
                    Arg::Int(min),
                    Arg::Int(max),
                    Arg::Text(String::new()),
                ],
            )
        }),
        syntax("sequence", r"^(\d*):(\d*)(?::([-+\d]*))?", |caps, _| {
            let start = try_int(&caps[1], 0);
            let mut end = try_int(&caps[2], 0);
            let mut step = caps.get(3).map_or(0, |m| try_int(m.as_str(), 0));
            if step == 0 {
                step = 1;
            }
            if end == 0 {
                end = i64::MAX;
            }
            ("seq", vec![Arg::Int(start), Arg::Int(end), Arg::Int(step)])
        }),
        syntax("random", r"^(\d*)-(\d*)-?([-+\d]*)?", |caps, _| {
            let min = try_int(&caps[1], 0);
            let mut max = try_int(&caps[2], 0);
            let mut countdown = caps.get(3).map_or(0, |m| try_int(m.as_str(), 0));
            if countdown == 0 {
                // range size, computed before the open-ended max default
                countdown = max.saturating_add(1).saturating_sub(min);
            }
            if max == 0 {
                max = i64::MAX;
            }
            (
                "rand",
                vec![Arg::Int(min), Arg::Int(max), Arg::Int(countdown)],
            )
        }),
    ]
    .into_iter()
    .flatten()
    .collect()
});

/// Attribute macros, matched in order against every shell-word after the
/// first; the first matching macro per word wins.
pub static ATTR_MACROS: LazyLock<Vec<AttrMacro>> = LazyLock::new(|| {
    [
        attr_macro("pow", r"\^([\w:]+)", |caps, scope| {
            (
                "pow".to_string(),
                AttrValue::Text(full_id(scope, &caps[1])),
            )
        }),
        attr_macro("id", r"#(\w+)", |caps, scope| {
            ("id".to_string(), AttrValue::Text(full_id(scope, &caps[1])))
        }),
        attr_macro("base", r"([^=]+)(?:=(.*))?", |caps, _| {
            let name = caps[1].to_string();
            match caps.get(2) {
                Some(value) if !value.as_str().is_empty() => {
                    (name, AttrValue::Text(value.as_str().to_string()))
                }
                _ => (name, AttrValue::Flag(true)),
            }
        }),
    ]
    .into_iter()
    .flatten()
    .collect()
});

/// Classifies the first shell-word of a tag into an opcode and constructor
/// arguments. Returns `None` when no rule matches.
pub fn classify(source: &str, scope: &str) -> Option<(&'static str, Vec<Arg>)> {
    SYNTAX_RULES.iter().find_map(|rule| {
        rule.matcher
            .captures(source)
            .map(|caps| (rule.handler)(&caps, scope))
    })
}

/// Classifies one secondary shell-word into a named attribute.
pub fn classify_attr(source: &str, scope: &str) -> Option<(String, AttrValue)> {
    ATTR_MACROS.iter().find_map(|rule| {
        rule.matcher
            .captures(source)
            .map(|caps| (rule.handler)(&caps, scope))
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::bare("main", "q", "main:q")]
    #[case::qualified("main", "url:0", "url:0")]
    #[case::other_scope("header", "x", "header:x")]
    fn test_full_id(#[case] scope: &str, #[case] id: &str, #[case] expected: &str) {
        assert_eq!(full_id(scope, id), expected);
    }

    #[rstest]
    #[case("123", 0, 123)]
    #[case("+7", 0, 7)]
    #[case("-7", 0, -7)]
    #[case("12abc", 0, 12)]
    #[case("abc", 99, 99)]
    #[case("", 99, 99)]
    #[case("  42", 0, 42)]
    fn test_try_int(#[case] source: &str, #[case] fallback: i64, #[case] expected: i64) {
        assert_eq!(try_int(source, fallback), expected);
    }

    #[rstest]
    #[case::reference("#0", ("ref", vec![Arg::Text("main:0".into())]))]
    #[case::reference_qualified("#url:2", ("ref", vec![Arg::Text("url:2".into())]))]
    #[case::time_seconds("ts", ("time", vec![Arg::Bool(true)]))]
    #[case::time_millis("ms", ("time", vec![Arg::Bool(false)]))]
    #[case::choose_file("choose:words.txt", ("chooseFromFile", vec![Arg::Text("words.txt".into()), Arg::Bool(false)]))]
    #[case::choose_file_orderly("Choose:words.txt", ("chooseFromFile", vec![Arg::Text("words.txt".into()), Arg::Bool(true)]))]
    #[case::choose_random("a|b|c", ("choose", vec![Arg::List(vec![Arg::Text("a".into()), Arg::Text("b".into()), Arg::Text("c".into())]), Arg::Bool(false)]))]
    #[case::choose_orderly("zh,en,ja", ("choose", vec![Arg::List(vec![Arg::Text("zh".into()), Arg::Text("en".into()), Arg::Text("ja".into())]), Arg::Bool(true)]))]
    #[case::rand_text("t3-8", ("randText", vec![Arg::Text(char_table("t").into()), Arg::Int(3), Arg::Int(8)]))]
    #[case::power_text("d2:3", ("power", vec![Arg::Text("0123456789".into()), Arg::Int(2), Arg::Int(3), Arg::Text("".into())]))]
    #[case::power_text_single("h4:", ("power", vec![Arg::Text("0123456789abcdef".into()), Arg::Int(4), Arg::Int(4), Arg::Text("".into())]))]
    #[case::sequence("1:5", ("seq", vec![Arg::Int(1), Arg::Int(5), Arg::Int(1)]))]
    #[case::sequence_negative_step("1:5:-1", ("seq", vec![Arg::Int(1), Arg::Int(5), Arg::Int(-1)]))]
    #[case::sequence_open_end("1:", ("seq", vec![Arg::Int(1), Arg::Int(i64::MAX), Arg::Int(1)]))]
    #[case::sequence_default_start(":20", ("seq", vec![Arg::Int(0), Arg::Int(20), Arg::Int(1)]))]
    #[case::random("1-100", ("rand", vec![Arg::Int(1), Arg::Int(100), Arg::Int(100)]))]
    #[case::random_countdown("1-6-3", ("rand", vec![Arg::Int(1), Arg::Int(6), Arg::Int(3)]))]
    #[case::random_open_max("5-", ("rand", vec![Arg::Int(5), Arg::Int(i64::MAX), Arg::Int(-4)]))]
    fn test_classify(#[case] source: &str, #[case] expected: (&'static str, Vec<Arg>)) {
        assert_eq!(classify(source, "main"), Some(expected));
    }

    #[rstest]
    #[case::no_rule("hello")]
    #[case::empty("")]
    fn test_classify_no_match(#[case] source: &str) {
        assert_eq!(classify(source, "main"), None);
    }

    #[rstest]
    #[case::pow("^1", ("pow".to_string(), AttrValue::Text("main:1".into())))]
    #[case::pow_qualified("^url:0", ("pow".to_string(), AttrValue::Text("url:0".into())))]
    #[case::id("#q", ("id".to_string(), AttrValue::Text("main:q".into())))]
    #[case::key_value("encoding=url,str", ("encoding".to_string(), AttrValue::Text("url,str".into())))]
    #[case::bare_key("verbose", ("verbose".to_string(), AttrValue::Flag(true)))]
    #[case::empty_value("flag=", ("flag".to_string(), AttrValue::Flag(true)))]
    fn test_classify_attr(#[case] source: &str, #[case] expected: (String, AttrValue)) {
        assert_eq!(classify_attr(source, "main"), Some(expected));
    }
}
