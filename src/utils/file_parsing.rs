/// Splits a comma separated row, keeping commas that sit inside single or
/// double quotes. Quotes are kept in the returned tokens.
pub fn split_csv_preserving_quotes(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in line.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match (ch, quote) {
            ('\\', Some(_)) => {
                current.push(ch);
                escaped = true;
            }
            ('\'' | '"', None) => {
                quote = Some(ch);
                current.push(ch);
            }
            (c, Some(q)) if c == q => {
                quote = None;
                current.push(ch);
            }
            (',', None) => {
                tokens.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    tokens.push(current.trim().to_string());
    tokens
}

pub fn strip_surrounding_quotes(raw: &str) -> &str {
    let t = raw.trim();
    let bytes = t.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'\'' && last == b'\'') || (first == b'"' && last == b'"') {
            return &t[1..t.len() - 1];
        }
    }
    t
}
