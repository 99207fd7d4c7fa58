//! Outbound line construction.

/// Line terminator used on the wire.
pub const EOL: &str = "\r\n";

/// Build `"<command> <space-joined args>\r\n"`.
///
/// Arguments are not validated; callers that forward user text are
/// responsible for keeping CR/LF out of it.
///
/// # Examples
///
/// ```
/// use slirc_session::message::serialize;
///
/// assert_eq!(serialize("NICK", &["bot"]), "NICK bot\r\n");
/// assert_eq!(serialize("USER", &["u", "8", "*", ":Real Name"]), "USER u 8 * :Real Name\r\n");
/// assert_eq!(serialize("QUIT", &[]), "QUIT\r\n");
/// ```
pub fn serialize(command: &str, args: &[&str]) -> String {
    let len = command.len() + args.iter().map(|a| a.len() + 1).sum::<usize>() + EOL.len();
    let mut out = String::with_capacity(len);
    out.push_str(command);
    for arg in args {
        out.push(' ');
        out.push_str(arg);
    }
    out.push_str(EOL);
    out
}

/// Remove any trailing CR/LF characters.
#[inline]
pub fn strip_eol(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pong_echoes_arguments() {
        assert_eq!(serialize("PONG", &[":server.example"]), "PONG :server.example\r\n");
    }

    #[test]
    fn test_strip_eol() {
        assert_eq!(strip_eol("JOIN #a\r\n"), "JOIN #a");
        assert_eq!(strip_eol("JOIN #a\n"), "JOIN #a");
        assert_eq!(strip_eol("JOIN #a"), "JOIN #a");
    }
}
