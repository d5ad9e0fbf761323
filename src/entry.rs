//! Numbers typed into form fields.
//!
//! Only the leading number counts: `"3 shirts"` reads as 3 and `"2.5"` as an
//! integer reads as 2. Text without a leading number reads as `None`.

/// Leading integer, after optional whitespace and sign. Saturates at the
/// `i64` bounds.
pub fn leading_int(raw: &str) -> Option<i64> {
    let (negative, rest) = split_sign(raw.trim_start());
    let digits = leading_digits(rest);
    if digits.is_empty() {
        return None;
    }
    let mut value: i64 = 0;
    for b in digits.bytes() {
        let d = i64::from(b - b'0');
        value = value.saturating_mul(10).saturating_add(d);
    }
    Some(if negative { value.saturating_neg() } else { value })
}

/// Leading decimal number (`12`, `4.25`, `.5`, `1e3`), after optional
/// whitespace and sign.
pub fn leading_float(raw: &str) -> Option<f64> {
    let text = raw.trim_start();
    let (_, rest) = split_sign(text);
    let sign_len = text.len() - rest.len();

    let int_part = leading_digits(rest);
    let mut end = int_part.len();
    let mut mantissa_digits = int_part.len();
    if rest[end..].starts_with('.') {
        let frac = leading_digits(&rest[end + 1..]);
        if !frac.is_empty() || !int_part.is_empty() {
            end += 1 + frac.len();
            mantissa_digits += frac.len();
        }
    }
    if mantissa_digits == 0 {
        return None;
    }
    if let Some(exp) = rest[end..].strip_prefix(['e', 'E']) {
        let (_, exp_digits_start) = split_sign(exp);
        let exp_digits = leading_digits(exp_digits_start);
        if !exp_digits.is_empty() {
            end += 1 + (exp.len() - exp_digits_start.len()) + exp_digits.len();
        }
    }
    text[..sign_len + end].parse().ok()
}

fn split_sign(s: &str) -> (bool, &str) {
    match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    }
}

fn leading_digits(s: &str) -> &str {
    let n = s.bytes().take_while(|b| b.is_ascii_digit()).count();
    &s[..n]
}
