use unicode_normalization::UnicodeNormalization;

/// Decompose (NFKD) and drop every non-ASCII code point, so `Ofício` becomes `Oficio`.
pub fn fold_ascii(s: &str) -> String {
    s.nfkd().filter(char::is_ascii).collect()
}

/// Remove every whitespace character.
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Collapse horizontal whitespace inside each line, trim lines and drop empty ones.
/// Line breaks survive because some fact rules stop at them.
pub fn collapse_lines(s: &str) -> String {
    s.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Minimal escaping for values substituted into HTML templates.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
