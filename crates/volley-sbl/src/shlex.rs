/// Splits tag content into shell-style words.
///
/// Spaces and tabs separate words outside quotes. Single and double quotes
/// group one level deep, a backslash escapes the next character (also inside
/// quotes), and a trailing lone backslash is kept literally.
pub fn split(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_escape = false;
    let mut in_quote: Option<char> = None;

    for c in input.chars() {
        if in_quote == Some('\'') {
            if in_escape {
                current.push(c);
                in_escape = false;
            } else if c == '\\' {
                in_escape = true;
            } else if c == '\'' {
                in_quote = None;
            } else {
                current.push(c);
            }
            continue;
        }

        if in_escape {
            current.push(c);
            in_escape = false;
        } else if c == '\\' {
            in_escape = true;
        } else if c == '"' {
            match in_quote {
                Some('"') => in_quote = None,
                None => in_quote = Some('"'),
                _ => current.push(c),
            }
        } else if c == '\'' {
            if in_quote.is_none() {
                in_quote = Some('\'');
            } else {
                current.push(c);
            }
        } else if (c == ' ' || c == '\t') && in_quote.is_none() {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }

    if in_escape {
        current.push('\\');
    }
    if !current.is_empty() {
        parts.push(current);
    }

    parts
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::split;

    #[rstest]
    #[case::basic_words("a b c", vec!["a", "b", "c"])]
    #[case::tabs_and_runs("a \t b", vec!["a", "b"])]
    #[case::double_quotes("a \"b c\" d", vec!["a", "b c", "d"])]
    #[case::single_quotes("a 'b c' d", vec!["a", "b c", "d"])]
    #[case::escaped_space(r"a\ b c", vec!["a b", "c"])]
    #[case::mixed_quotes(r#"'a "b"' "c 'd'""#, vec![r#"a "b""#, "c 'd'"])]
    #[case::trailing_escape(r"a\", vec![r"a\"])]
    #[case::escaped_quote(r#"a\"b"#, vec![r#"a"b"#])]
    #[case::empty("", Vec::<&str>::new())]
    #[case::only_spaces("   ", Vec::<&str>::new())]
    fn test_split(#[case] input: &str, #[case] expected: Vec<&str>) {
        assert_eq!(split(input), expected);
    }

    proptest! {
        /// Plain words joined by spaces split back into the same words.
        #[test]
        fn splits_space_joined_words(
            words in prop::collection::vec("[!-~&&[^'\"\\\\ ]]{1,8}", 0..6),
        ) {
            prop_assert_eq!(split(&words.join(" ")), words);
        }

        /// Never panics, and never invents characters that were not in
        /// the input.
        #[test]
        fn output_chars_come_from_the_input(input in "\\PC{0,32}") {
            for part in split(&input) {
                for c in part.chars() {
                    prop_assert!(input.contains(c) || c == '\\');
                }
            }
        }
    }
}
