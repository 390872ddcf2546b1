//! Chilean RUT validation and formatting.
//!
//! A RUT is a numeric body followed by a check character (`0`-`9` or `K`)
//! computed with the modulo-11 algorithm. Input may carry dots and a dash in
//! any position; both are ignored.

fn compact(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '.' && *c != '-' && !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

fn split(rut: &str) -> Option<(&str, char)> {
    let check = rut.chars().last()?;
    Some((&rut[..rut.len() - check.len_utf8()], check))
}

/// Computes the check character for a numeric body.
pub fn check_char(body: &str) -> Option<char> {
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let mut sum = 0u32;
    let mut factor = 2u32;
    for digit in body.chars().rev().filter_map(|c| c.to_digit(10)) {
        sum = (sum + digit * factor) % 11;
        factor = if factor == 7 { 2 } else { factor + 1 };
    }

    match 11 - sum {
        11 => Some('0'),
        10 => Some('K'),
        n => char::from_digit(n, 10),
    }
}

/// Returns true when `raw` carries a body of at least seven digits and a
/// matching check character.
pub fn validate(raw: &str) -> bool {
    let rut = compact(raw);
    if rut.chars().count() < 8 {
        return false;
    }

    let Some((body, check)) = split(&rut) else {
        return false;
    };
    check_char(body) == Some(check)
}

/// Formats a RUT as `12.345.678-5`. Callers validate first.
pub fn canonicalize(raw: &str) -> String {
    let rut = compact(raw);
    let Some((body, check)) = split(&rut) else {
        return rut;
    };

    let digits: Vec<char> = body.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    format!("{}-{}", grouped, check)
}
