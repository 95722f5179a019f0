/// Computes the default JSON name of a field: underscores are removed and the character
/// following each underscore is upper-cased.
pub(crate) fn to_json_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut ucase_next = false;
    for ch in name.chars() {
        if ch == '_' {
            ucase_next = true;
        } else if ucase_next {
            result.push(ch.to_ascii_uppercase());
            ucase_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}
