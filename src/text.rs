use crate::error::{Error, Result};

const DEFAULT_CUT_SET: &str = " \t\r\n";

/// Splits `s` on every occurrence of `d`, the way `std::string::find`-based
/// splitting does: an empty input yields `[""]`, and adjacent delimiters
/// yield empty fields rather than being collapsed.
///
/// ```text
/// split("", '.')      -> [""]
/// split("11", '.')    -> ["11"]
/// split("..", '.')    -> ["", "", ""]
/// split("11.", '.')   -> ["11", ""]
/// split(".11", '.')   -> ["", "11"]
/// split("11.22", '.') -> ["11", "22"]
/// ```
pub fn split(s: &str, d: char) -> Vec<String> {
    let mut parts: Vec<String> = s.split(d).map(str::to_string).collect();
    if parts.is_empty() {
        parts.push(String::new());
    }
    parts
}

pub fn to_upper(s: &str) -> String {
    s.to_uppercase()
}

fn cut_positions(s: &str, cut_set: &str) -> Option<(usize, usize)> {
    let start = s.find(|c| !cut_set.contains(c))?;
    let end = s.rfind(|c| !cut_set.contains(c))?;
    Some((start, end))
}

pub fn trim_left(s: &str, cut_set: &str) -> String {
    match s.find(|c| !cut_set.contains(c)) {
        Some(start) => s[start..].to_string(),
        None => String::new(),
    }
}

pub fn trim_right(s: &str, cut_set: &str) -> String {
    match s.rfind(|c| !cut_set.contains(c)) {
        Some(end) => s[..=end].to_string(),
        None => String::new(),
    }
}

pub fn trim(s: &str, cut_set: &str) -> String {
    match cut_positions(s, cut_set) {
        Some((start, end)) => s[start..=end].to_string(),
        None => String::new(),
    }
}

pub fn trim_left_default(s: &str) -> String {
    trim_left(s, DEFAULT_CUT_SET)
}

pub fn trim_right_default(s: &str) -> String {
    trim_right(s, DEFAULT_CUT_SET)
}

pub fn trim_default(s: &str) -> String {
    trim(s, DEFAULT_CUT_SET)
}

/// A `%v`-placeholder formatter: each `%v` in `format` is replaced in
/// order by the next argument's `Display` output. Errors if the number
/// of placeholders and the number of arguments disagree in either
/// direction.
pub fn sprintf(format: &str, args: &[&dyn std::fmt::Display]) -> Result<String> {
    let mut result = String::new();
    let mut start = 0;
    let mut next_arg = 0;

    while let Some(pos) = format[start..].find("%v") {
        let pos = start + pos;
        if next_arg >= args.len() {
            return Err(Error::Parse("fmt::sprintf: missing value for %v".into()));
        }
        result.push_str(&format[start..pos]);
        result.push_str(&args[next_arg].to_string());
        next_arg += 1;
        start = pos + 2;
    }
    result.push_str(&format[start..]);

    if next_arg != args.len() {
        return Err(Error::Parse("fmt::sprintf: extra argument".into()));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_matches_documented_edge_cases() {
        assert_eq!(split("", '.'), vec![""]);
        assert_eq!(split("11", '.'), vec!["11"]);
        assert_eq!(split("..", '.'), vec!["", "", ""]);
        assert_eq!(split("11.", '.'), vec!["11", ""]);
        assert_eq!(split(".11", '.'), vec!["", "11"]);
        assert_eq!(split("11.22", '.'), vec!["11", "22"]);
    }

    #[test]
    fn trim_strips_from_both_ends() {
        assert_eq!(trim_default("  hi  "), "hi");
        assert_eq!(trim_left_default("  hi  "), "hi  ");
        assert_eq!(trim_right_default("  hi  "), "  hi");
    }

    #[test]
    fn trim_of_all_cut_chars_is_empty() {
        assert_eq!(trim_default("   "), "");
    }

    #[test]
    fn to_upper_uppercases_ascii() {
        assert_eq!(to_upper("select"), "SELECT");
    }

    #[test]
    fn sprintf_substitutes_in_order() {
        let a = 1;
        let b = "x";
        let args: Vec<&dyn std::fmt::Display> = vec![&a, &b];
        assert_eq!(sprintf("%v and %v", &args).unwrap(), "1 and x");
    }

    #[test]
    fn sprintf_errors_on_too_few_arguments() {
        let args: Vec<&dyn std::fmt::Display> = vec![];
        assert!(sprintf("missing: %v", &args).is_err());
    }

    #[test]
    fn sprintf_errors_on_too_many_arguments() {
        let a = 1;
        let b = 2;
        let args: Vec<&dyn std::fmt::Display> = vec![&a, &b];
        assert!(sprintf("extra: %v", &args).is_err());
    }
}
