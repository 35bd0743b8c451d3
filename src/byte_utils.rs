//! Utilities for displaying raw bytes

/// Printable form of one byte, for diagnostics.
pub fn escape_byte(byte: u8) -> String {
    match byte {
        b'\n' => "\\n".into(),
        b'\r' => "\\r".into(),
        b'\t' => "\\t".into(),
        b'"' => "\\\"".into(),
        b'\\' => "\\\\".into(),
        b' ' => " ".into(),
        c if c.is_ascii_graphic() => char::from(c).to_string(),
        _ => format!("\\x{byte:02x}"),
    }
}

/// Printable form of a byte string, e.g. a program that is not UTF-8.
pub fn as_bstr(input: &[u8]) -> String {
    input.iter().map(|b| escape_byte(*b)).collect()
}
