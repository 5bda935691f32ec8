const FALLBACK: &str = "cotacoes";
const MAX_STEM: usize = 80;

/// Download name for a batch result: `resultado_{sanitized input stem}.xlsx`.
pub fn result_filename(source_name: &str) -> String {
    let base = source_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(source_name);
    let stem = match base.rsplit_once('.') {
        Some((stem, _extension)) if !stem.is_empty() => stem,
        _ => base,
    };
    format!("resultado_{}.xlsx", sanitize_stem(stem))
}

fn sanitize_stem(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if is_allowed(c) { c } else { '_' };
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }

    let mut cleaned = compacted.trim_matches(&['_', '.', '-'][..]).to_string();
    if cleaned.is_empty() || is_reserved_windows_name(&cleaned) {
        cleaned = FALLBACK.to_string();
    }
    if cleaned.len() > MAX_STEM {
        cleaned.truncate(MAX_STEM);
    }
    cleaned
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
