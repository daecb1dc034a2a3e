use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

lazy_static! {
    // SGR colour sequences as emitted by `terraform state show`
    static ref COLOR_CODE_REGEX: Regex = Regex::new(r"\x1B\[\d+(;\d+){0,2}m").unwrap();
}

/// Remove ANSI colour escape sequences. Clean input is returned unchanged.
pub fn strip_color_codes(text: &str) -> Cow<'_, str> {
    COLOR_CODE_REGEX.replace_all(text, "")
}
