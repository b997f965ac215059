/// Fraction of suspicious characters above which a name is treated as binary.
pub const MAX_SUSPICIOUS_RATIO: f64 = 0.3;

/// Whether `name` reads like a plausible filename rather than raw header bytes.
///
/// Control characters (other than tab and line breaks), DEL and the
/// replacement character count as suspicious. Once any of those shows up the
/// name is probably binary decoded as Latin-1, so U+00A0..=U+00FF count too.
pub fn is_valid_filename(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }

    let binary = name.chars().any(is_binary_marker);
    let (total, suspicious) =
        name.chars().fold((0usize, 0usize), |(total, bad), ch| {
            let flagged = is_binary_marker(ch) || (binary && is_high_latin1(ch));
            (total + 1, bad + usize::from(flagged))
        });

    (suspicious as f64) / (total as f64) <= MAX_SUSPICIOUS_RATIO
}

/// Optional form used where a name may not exist at all.
pub fn is_valid_filename_opt(name: Option<&str>) -> bool {
    name.is_some_and(is_valid_filename)
}

fn is_binary_marker(ch: char) -> bool {
    match ch {
        '\t' | '\n' | '\r' => false,
        '\u{FFFD}' => true,
        ch => ch.is_control(),
    }
}

fn is_high_latin1(ch: char) -> bool {
    ('\u{A0}'..='\u{FF}').contains(&ch)
}
