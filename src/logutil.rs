//! Escaping for text the player controls before it reaches the game log:
//! character names given to `play`, bounty marks typed in the Quest Hall,
//! rescuers named in prison-break records on the `security` target and the
//! verb of any command the town did not recognise.

/// Escape newlines, tabs, backslashes and other control characters
/// (as `\xNN`). Anything past 120 characters is replaced by an ellipsis.
pub fn escape_log(s: &str) -> String {
    const MAX_PREVIEW: usize = 120;
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_log;
    #[test]
    fn player_names_stay_on_one_line() {
        assert_eq!(escape_log("Ayla\nthe\tBold"), "Ayla\\nthe\\tBold");
        assert_eq!(escape_log("bell\u{7}"), "bell\\x07");
    }

    #[test]
    fn long_input_is_cut() {
        let long = "x".repeat(500);
        let esc = escape_log(&long);
        assert_eq!(esc.chars().count(), 121);
        assert!(esc.ends_with('…'));
    }

    #[test]
    fn bounty_mark_cannot_forge_a_record() {
        let mark = "Grell\r\n[INFO security] Ayla frees every prisoner";
        let esc = escape_log(mark);
        assert!(!esc.contains('\n') && !esc.contains('\r'));
        assert!(esc.starts_with("Grell\\r\\n[INFO"));
    }
}
