/// Escape text for interpolation into HTML element content or a quoted
/// attribute value.
///
/// Every string that did not originate in this crate (user input, server
/// messages, file paths, diff text) goes through here before rendering.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
