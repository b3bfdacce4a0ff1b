//! Date/time pattern handling.
//!
//! Rule files use the familiar `yyyy-MM-dd HH:mm:ss` notation; `chrono`
//! wants `%Y-%m-%d %H:%M:%S`. Patterns that already contain `%` are taken
//! as chrono formats unchanged.

use chrono::format::{Item, StrftimeItems};

use crate::error::{RulesError, RulesResult};

/// Translate a `yyyy-MM-dd` style pattern into a chrono format string.
///
/// Text between single quotes is copied literally; `''` is a quote.
pub fn to_chrono_format(pattern: &str) -> RulesResult<String> {
    let format = if pattern.contains('%') {
        pattern.to_string()
    } else {
        translate(pattern)
    };

    if format.is_empty() || StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
        return Err(RulesError::InvalidPattern {
            pattern: pattern.to_string(),
            message: "not a valid date/time pattern".into(),
        });
    }

    Ok(format)
}

fn translate(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        let token = match (c, run) {
            ('y', 2) => Some("%y"),
            ('y', _) => Some("%Y"),
            ('M', 3) => Some("%b"),
            ('M', n) if n >= 4 => Some("%B"),
            ('M', _) => Some("%m"),
            ('d', _) => Some("%d"),
            ('H', _) => Some("%H"),
            ('h', _) => Some("%I"),
            ('m', _) => Some("%M"),
            ('s', _) => Some("%S"),
            ('S', _) => Some("%3f"),
            ('a', _) => Some("%p"),
            ('E', n) if n >= 4 => Some("%A"),
            ('E', _) => Some("%a"),
            _ => None,
        };

        match token {
            Some(t) => out.push_str(t),
            None => {
                for _ in 0..run {
                    push_literal(&mut out, c);
                }
            }
        }
        i += run;
    }

    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
