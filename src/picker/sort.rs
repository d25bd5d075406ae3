use crate::fonts::FontMetadata;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Order in which the catalog is listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortMode {
    /// Locale-aware alphabetical order of family names.
    #[default]
    Alphabet,
    /// The order the catalog provides (popularity for Google Fonts).
    Popularity,
}

impl SortMode {
    /// Comparator applied at render time; `None` keeps catalog order.
    pub fn comparator(self) -> Option<fn(&FontMetadata, &FontMetadata) -> Ordering> {
        match self {
            SortMode::Alphabet => Some(by_family),
            SortMode::Popularity => None,
        }
    }

    pub fn sort(self, fonts: &mut [&FontMetadata]) {
        if let Some(compare) = self.comparator() {
            fonts.sort_by(|a, b| compare(a, b));
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Alphabet => "alphabet",
            SortMode::Popularity => "popularity",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alphabet" => Ok(SortMode::Alphabet),
            "popularity" => Ok(SortMode::Popularity),
            other => Err(format!("unknown sort mode '{other}'")),
        }
    }
}

fn by_family(a: &FontMetadata, b: &FontMetadata) -> Ordering {
    locale_compare(&a.family, &b.family)
}

/// Compare two names the way a user reading a font menu expects: case is
/// ignored first, then lowercase sorts before uppercase at the first
/// difference.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);
    folded_a.cmp(folded_b).then_with(|| case_order(a, b))
}

fn case_order(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x != y {
            return match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => x.cmp(&y),
            };
        }
    }
    a.len().cmp(&b.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mode: SortMode, names: &[&str]) -> Vec<String> {
        let fonts: Vec<FontMetadata> = names.iter().map(|n| FontMetadata::bare(*n)).collect();
        let mut refs: Vec<&FontMetadata> = fonts.iter().collect();
        mode.sort(&mut refs);
        refs.into_iter().map(|f| f.family.clone()).collect()
    }

    #[test]
    fn alphabet_sorts_by_name() {
        assert_eq!(
            sorted(SortMode::Alphabet, &["Zilla Slab", "Abel", "Open Sans"]),
            vec!["Abel", "Open Sans", "Zilla Slab"]
        );
    }

    #[test]
    fn popularity_keeps_catalog_order() {
        assert_eq!(
            sorted(SortMode::Popularity, &["Zilla Slab", "Abel", "Open Sans"]),
            vec!["Zilla Slab", "Abel", "Open Sans"]
        );
    }

    #[test]
    fn comparison_ignores_case_before_breaking_ties() {
        assert_eq!(locale_compare("abel", "Acme"), Ordering::Less);
        assert_eq!(locale_compare("IM Fell", "Imbue"), Ordering::Less);
        assert_eq!(locale_compare("pt sans", "PT Sans"), Ordering::Less);
        assert_eq!(locale_compare("Lato", "Lato"), Ordering::Equal);
    }

    #[test]
    fn parses_config_names() {
        assert_eq!("alphabet".parse::<SortMode>(), Ok(SortMode::Alphabet));
        assert_eq!("popularity".parse::<SortMode>(), Ok(SortMode::Popularity));
        assert!("random".parse::<SortMode>().is_err());
        assert_eq!(SortMode::Popularity.to_string(), "popularity");
    }
}
