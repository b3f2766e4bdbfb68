//! Case conversion between wire names (camelCase JSON keys) and PostgreSQL column names (snake_case).

/// Convert a single identifier from camelCase to snake_case.
/// e.g. "countryCode" -> "country_code", "city_id" -> "city_id"
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
