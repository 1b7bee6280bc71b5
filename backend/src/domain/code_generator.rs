use unicode_segmentation::UnicodeSegmentation;

/// Derive the record code: initials of the three names, a dash, then the
/// birth date with every '/' removed.
///
/// `generate_code("LOPEZ", "PEREZ", "JUAN", "01/01/2000") == "LPJ-01012000"`.
/// An empty name contributes no initial. Initials are whole grapheme
/// clusters so accented or combined characters are kept intact.
pub fn generate_code(paternal: &str, maternal: &str, given: &str, birth_date: &str) -> String {
    let mut code = String::with_capacity(4 + birth_date.len());
    for name in [paternal, maternal, given] {
        code.push_str(initial(name));
    }
    code.push('-');
    code.extend(birth_date.chars().filter(|c| *c != '/'));
    code
}

fn initial(name: &str) -> &str {
    name.graphemes(true).next().unwrap_or("")
}
