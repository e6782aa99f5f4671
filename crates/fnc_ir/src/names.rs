//! Writing llvm names and string constants

use std::fmt::{Formatter, Write};

/// Whether a name can be written after a `%` or `@` sigil without quotes
fn is_bare_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let allowed = |c: char| c.is_ascii_alphabetic() || matches!(c, '-' | '$' | '.' | '_');
    allowed(first) && chars.all(|c| allowed(c) || c.is_ascii_digit())
}

/// Writes escaped bytes, only printable ascii other than `"` and `\` is left as is
pub(crate) fn write_escaped(f: &mut impl Write, bytes: &[u8]) -> std::fmt::Result {
    for &byte in bytes {
        if (byte.is_ascii_graphic() && byte != b'"' && byte != b'\\') || byte == b' ' {
            f.write_char(byte as char)?;
        } else {
            write!(f, "\\{byte:02X}")?;
        }
    }
    Ok(())
}

/// Writes a name, quoting it if needed
pub(crate) fn write_name(f: &mut Formatter<'_>, name: &str) -> std::fmt::Result {
    if is_bare_name(name) {
        f.write_str(name)
    } else {
        f.write_char('"')?;
        write_escaped(f, name.as_bytes())?;
        f.write_char('"')
    }
}
