//! Purpose: Translate Unicode (LDML) date patterns into `time` format descriptions.
//! Exports: `PatternError`, `translate`.
//! Role: Lets callers register familiar patterns like `yyyy/MM/dd` for date coercion.
//! Invariants: Unsupported tokens are rejected up front rather than parsed loosely.
//! Invariants: Literal `[` is escaped so it never opens a component.
//! Invariants: Alternatives differ only at ISO zone tokens; callers try them in order.
use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PatternError {
    Empty,
    UnsupportedToken { symbol: char, width: usize },
    UnterminatedQuote,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::Empty => f.write_str("empty date pattern"),
            PatternError::UnsupportedToken { symbol, width } => {
                let token: String = std::iter::repeat_n(*symbol, *width).collect();
                write!(f, "unsupported date pattern token `{token}`")
            }
            PatternError::UnterminatedQuote => f.write_str("unterminated quoted literal"),
        }
    }
}

impl std::error::Error for PatternError {}

/// Returns version-1 `time` format descriptions equivalent to `pattern`.
///
/// Most patterns yield one description. Each ISO zone token (`X`…`XXXXX`) doubles
/// the set: one alternative expects a literal `Z`, the other a numeric offset.
pub fn translate(pattern: &str) -> Result<Vec<String>, PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }
    let chars: Vec<char> = pattern.chars().collect();
    let mut outs = vec![String::with_capacity(pattern.len() * 4)];
    let mut idx = 0;
    while idx < chars.len() {
        let ch = chars[idx];
        if ch == '\'' {
            idx = push_quoted(&chars, idx, &mut outs)?;
            continue;
        }
        if ch.is_ascii_alphabetic() {
            let width = chars[idx..].iter().take_while(|&&c| c == ch).count();
            if ch == 'X' {
                let offset = iso_zone(width)?;
                outs = outs
                    .into_iter()
                    .flat_map(|out| [format!("{out}Z"), format!("{out}{offset}")])
                    .collect();
            } else {
                let item = component(ch, width)?;
                outs.iter_mut().for_each(|out| out.push_str(item));
            }
            idx += width;
            continue;
        }
        push_literal(ch, &mut outs);
        idx += 1;
    }
    Ok(outs)
}

fn push_quoted(chars: &[char], start: usize, outs: &mut [String]) -> Result<usize, PatternError> {
    // `''` is an escaped single quote, inside or outside a quoted run.
    if chars.get(start + 1) == Some(&'\'') {
        push_literal('\'', outs);
        return Ok(start + 2);
    }
    let mut idx = start + 1;
    while idx < chars.len() {
        if chars[idx] == '\'' {
            if chars.get(idx + 1) == Some(&'\'') {
                push_literal('\'', outs);
                idx += 2;
                continue;
            }
            return Ok(idx + 1);
        }
        push_literal(chars[idx], outs);
        idx += 1;
    }
    Err(PatternError::UnterminatedQuote)
}

fn push_literal(ch: char, outs: &mut [String]) {
    for out in outs.iter_mut() {
        if ch == '[' {
            out.push_str("[[");
        } else {
            out.push(ch);
        }
    }
}

fn iso_zone(width: usize) -> Result<&'static str, PatternError> {
    match width {
        1 => Ok("[offset_hour sign:mandatory]"),
        2 | 4 => Ok("[offset_hour sign:mandatory][offset_minute]"),
        3 | 5 => Ok("[offset_hour sign:mandatory]:[offset_minute]"),
        _ => Err(PatternError::UnsupportedToken { symbol: 'X', width }),
    }
}

fn component(symbol: char, width: usize) -> Result<&'static str, PatternError> {
    let unsupported = Err(PatternError::UnsupportedToken { symbol, width });
    let item = match (symbol, width) {
        // Two-digit years need a century pivot that `time` does not model.
        ('y', 2) => return unsupported,
        ('y', 1..=4) => "[year]",
        ('M' | 'L', 1) => "[month padding:none]",
        ('M' | 'L', 2) => "[month]",
        ('M' | 'L', 3) => "[month repr:short case_sensitive:false]",
        ('M' | 'L', 4) => "[month repr:long case_sensitive:false]",
        ('d', 1) => "[day padding:none]",
        ('d', 2) => "[day]",
        ('E', 1..=3) => "[weekday repr:short case_sensitive:false]",
        ('E', 4) => "[weekday repr:long case_sensitive:false]",
        ('H', 1) => "[hour padding:none]",
        ('H', 2) => "[hour]",
        ('h', 1) => "[hour repr:12 padding:none]",
        ('h', 2) => "[hour repr:12]",
        ('m', 1) => "[minute padding:none]",
        ('m', 2) => "[minute]",
        ('s', 1) => "[second padding:none]",
        ('s', 2) => "[second]",
        ('S', 1) => "[subsecond digits:1]",
        ('S', 2) => "[subsecond digits:2]",
        ('S', 3) => "[subsecond digits:3]",
        ('S', 4) => "[subsecond digits:4]",
        ('S', 5) => "[subsecond digits:5]",
        ('S', 6) => "[subsecond digits:6]",
        ('S', 7) => "[subsecond digits:7]",
        ('S', 8) => "[subsecond digits:8]",
        ('S', 9) => "[subsecond digits:9]",
        ('a', 1..=3) => "[period case_sensitive:false]",
        ('Z', 1..=3) | ('x', 2 | 4) => "[offset_hour sign:mandatory][offset_minute]",
        ('Z', 5) | ('x', 3 | 5) => "[offset_hour sign:mandatory]:[offset_minute]",
        ('x', 1) => "[offset_hour sign:mandatory]",
        _ => return unsupported,
    };
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::{PatternError, translate};

    #[test]
    fn translates_numeric_date() {
        assert_eq!(
            translate("yyyy/MM/dd").expect("pattern"),
            ["[year]/[month]/[day]"]
        );
    }

    #[test]
    fn translates_clock_with_period_and_offset() {
        assert_eq!(
            translate("h:mm a ZZZZZ").expect("pattern"),
            ["[hour repr:12 padding:none]:[minute] [period case_sensitive:false] \
              [offset_hour sign:mandatory]:[offset_minute]"]
        );
    }

    #[test]
    fn quoted_literals_pass_through() {
        assert_eq!(
            translate("d 'at' H").expect("pattern"),
            ["[day padding:none] at [hour padding:none]"]
        );
        assert_eq!(
            translate("H''m").expect("pattern"),
            ["[hour padding:none]'[minute padding:none]"]
        );
        assert_eq!(translate("'o''clock'").expect("pattern"), ["o'clock"]);
    }

    #[test]
    fn escapes_open_bracket() {
        assert_eq!(translate("[yyyy]").expect("pattern"), ["[[[year]]"]);
    }

    #[test]
    fn iso_zone_token_offers_literal_z_and_offset() {
        assert_eq!(
            translate("HH:mmXXXXX").expect("pattern"),
            [
                "[hour]:[minute]Z",
                "[hour]:[minute][offset_hour sign:mandatory]:[offset_minute]"
            ]
        );
        assert_eq!(
            translate("X").expect("pattern"),
            ["Z", "[offset_hour sign:mandatory]"]
        );
        assert_eq!(
            translate("XXXXXX"),
            Err(PatternError::UnsupportedToken {
                symbol: 'X',
                width: 6
            })
        );
    }

    #[test]
    fn rejects_unsupported_tokens() {
        assert_eq!(
            translate("yy-MM"),
            Err(PatternError::UnsupportedToken {
                symbol: 'y',
                width: 2
            })
        );
        assert_eq!(
            translate("QQQ"),
            Err(PatternError::UnsupportedToken {
                symbol: 'Q',
                width: 3
            })
        );
        assert_eq!(translate("'open"), Err(PatternError::UnterminatedQuote));
        assert_eq!(translate(""), Err(PatternError::Empty));
    }

    #[test]
    fn unsupported_token_message_repeats_symbol() {
        let err = PatternError::UnsupportedToken {
            symbol: 'G',
            width: 2,
        };
        assert_eq!(err.to_string(), "unsupported date pattern token `GG`");
    }
}
