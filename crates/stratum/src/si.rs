use super::*;

const SI_PREFIXES: &[(f64, &str)] = &[
    (1e24, "Y"),
    (1e21, "Z"),
    (1e18, "E"),
    (1e15, "P"),
    (1e12, "T"),
    (1e9, "G"),
    (1e6, "M"),
    (1e3, "k"),
    (1.0, ""),
];

/// Formats `value` with the largest SI prefix that keeps the mantissa >= 1,
/// appending `unit` (or nothing, if `unit` is empty). Respects `f.precision()`.
pub fn format_si(value: f64, unit: &str, f: &mut Formatter) -> fmt::Result {
    let precision = f.precision().unwrap_or(2);

    let (scale, prefix) = SI_PREFIXES
        .iter()
        .find(|(scale, _)| value >= *scale)
        .copied()
        .unwrap_or((1.0, ""));

    let mantissa = value / scale;
    let mut text = format!("{mantissa:.precision$}");
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }

    if unit.is_empty() && prefix.is_empty() {
        write!(f, "{text}")
    } else {
        write!(f, "{text} {prefix}{unit}")
    }
}

/// Parses a value produced by [`format_si`], stripping an optional unit
/// suffix (tried longest-first from `units`) then an optional SI prefix.
pub fn parse_si(s: &str, units: &[&str]) -> Result<f64, InternalError> {
    let s = s.trim();

    let mut remainder = s;
    for unit in units {
        if !unit.is_empty() {
            if let Some(stripped) = remainder.strip_suffix(unit) {
                remainder = stripped;
                break;
            }
        }
    }
    remainder = remainder.trim_end();

    let mut scale = 1.0;
    for (candidate_scale, prefix) in SI_PREFIXES {
        if !prefix.is_empty() {
            if let Some(stripped) = remainder.strip_suffix(prefix) {
                remainder = stripped;
                scale = *candidate_scale;
                break;
            }
        }
    }

    let mantissa: f64 = remainder.trim().parse().map_err(|_| InternalError::Parse {
        message: format!("invalid number in `{s}`"),
    })?;

    let value = mantissa * scale;

    if !value.is_finite() || value < 0.0 {
        return Err(InternalError::InvalidValue {
            message: format!("`{s}` parsed to invalid value {value}"),
        });
    }

    Ok(value)
}
