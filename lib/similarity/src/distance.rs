//! String distance for candidate ranking
//!
//! Candidates are compared to a mention through their display name: the last
//! segment of the URI with underscores read as spaces. Similarity is the edit
//! distance normalized by the longest string in the comparison set, so every
//! candidate of a cell is measured against the same denominator.

use strsim::levenshtein;

/// Local name of a URI, readable: `http://dbpedia.org/resource/New_York` → `New York`
pub fn display_name(uri: &str) -> String {
    let local = uri
        .rsplit(['/', '#'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(uri);

    // Compact forms like `dbr:Paris`
    let local = match local.split_once(':') {
        Some((prefix, rest)) if !uri.contains("://") && !prefix.is_empty() => rest,
        _ => local,
    };

    local.replace('_', " ")
}

/// Edit distance in characters, case-insensitive
#[inline]
pub fn edit_distance(a: &str, b: &str) -> usize {
    levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// `1 - edit_distance / max(len(mention), max len(name_i))` for every name.
///
/// Returns one score per name, each in [0.0, 1.0].
pub fn normalized_similarities<S: AsRef<str>>(mention: &str, names: &[S]) -> Vec<f64> {
    let longest = names
        .iter()
        .map(|name| name.as_ref().chars().count())
        .max()
        .unwrap_or(0)
        .max(mention.chars().count());

    names
        .iter()
        .map(|name| {
            if longest == 0 {
                return 1.0;
            }
            let distance = edit_distance(mention, name.as_ref()) as f64;
            (1.0 - distance / longest as f64).clamp(0.0, 1.0)
        })
        .collect()
}

/// Same as [`normalized_similarities`], comparing against URI display names
pub fn uri_similarities<S: AsRef<str>>(mention: &str, uris: &[S]) -> Vec<f64> {
    let names: Vec<String> = uris.iter().map(|uri| display_name(uri.as_ref())).collect();
    normalized_similarities(mention, &names)
}
