/// Derive the identifier used to address a family in element ids and list
/// keys: lowercase, with every run of whitespace replaced by a single `-`.
///
/// Two families may map to the same identifier; lookups always go through
/// the family name.
pub fn font_id(family: &str) -> String {
    let mut id = String::with_capacity(family.len());
    let mut in_space = false;
    for c in family.chars() {
        if c.is_whitespace() {
            if !in_space {
                id.push('-');
            }
            in_space = true;
        } else {
            id.extend(c.to_lowercase());
            in_space = false;
        }
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(font_id("Open Sans"), "open-sans");
        assert_eq!(font_id("Droid   Serif"), "droid-serif");
        assert_eq!(font_id("Abel"), "abel");
    }

    #[test]
    fn tabs_and_edges_count_as_whitespace_runs() {
        assert_eq!(font_id("Noto\t Sans  JP"), "noto-sans-jp");
        assert_eq!(font_id(" Lobster "), "-lobster-");
    }
}
