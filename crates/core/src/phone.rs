//! Mobile phone normalization to the `+569XXXXXXXX` form.

const MOBILE_PREFIX: &str = "+569";

pub fn canonicalize(raw: &str) -> String {
    let phone: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    if phone.starts_with(MOBILE_PREFIX) {
        return phone;
    }
    if phone.starts_with('9') && phone.chars().count() == 9 {
        return format!("+56{}", phone);
    }
    if phone.starts_with("569") && phone.chars().count() == 11 {
        return format!("+{}", phone);
    }

    let chars: Vec<char> = phone.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(8)..].iter().collect();
    format!("{}{}", MOBILE_PREFIX, tail)
}
