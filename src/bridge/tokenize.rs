// Word splitting for free-form command lines
//
// POSIX hosts follow shell quoting rules (quotes, backslash escapes). Windows
// follows the CommandLineToArgvW conventions used by the MSVC runtime.

use crate::bridge::error::{BridgeError, BridgeResult};
use crate::bridge::platform::HostPlatform;

/// Split `line` into argument tokens using the rules of `platform`
pub fn split_words(line: &str, platform: HostPlatform) -> BridgeResult<Vec<String>> {
    if platform.is_windows() {
        Ok(split_windows(line))
    } else {
        split_posix(line)
    }
}

fn split_posix(line: &str) -> BridgeResult<Vec<String>> {
    // shlex drops the rest of the line after a word starting with '#'. Hide every
    // '#' behind a character absent from the line so it stays literal.
    let marker = ('\u{E000}'..='\u{F8FF}')
        .find(|c| !line.contains(*c))
        .ok_or_else(|| BridgeError::invalid_argument("command contains no free marker character"))?;
    let masked = line.replace('#', &marker.to_string());

    let words = shlex::split(&masked).ok_or_else(|| {
        BridgeError::invalid_argument(format!("unbalanced quoting in command: {}", line))
    })?;
    Ok(words.into_iter().map(|w| w.replace(marker, "#")).collect())
}

fn split_windows(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut in_quotes = false;
    let mut backslashes = 0usize;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                backslashes += 1;
                in_word = true;
            }
            '"' => {
                // 2n backslashes before a quote collapse to n; 2n+1 escape the quote
                current.extend(std::iter::repeat_n('\\', backslashes / 2));
                let escaped = backslashes % 2 == 1;
                backslashes = 0;
                in_word = true;

                if escaped {
                    current.push('"');
                } else if in_quotes && chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ' ' | '\t' if !in_quotes => {
                current.extend(std::iter::repeat_n('\\', backslashes));
                backslashes = 0;
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            _ => {
                current.extend(std::iter::repeat_n('\\', backslashes));
                backslashes = 0;
                current.push(c);
                in_word = true;
            }
        }
    }

    current.extend(std::iter::repeat_n('\\', backslashes));
    if in_word {
        words.push(current);
    }
    words
}
