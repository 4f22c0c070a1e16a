//! Keyword-bag scoring shared by metadata inference and query enhancement.

/// Total case-insensitive occurrences of `keywords` in `lower`, which must
/// already be lower-cased.
pub fn keyword_hits<S: AsRef<str>>(lower: &str, keywords: &[S]) -> usize {
    keywords
        .iter()
        .map(|k| {
            let k = k.as_ref().trim().to_lowercase();
            if k.is_empty() { 0 } else { lower.matches(k.as_str()).count() }
        })
        .sum()
}

/// Label of the bag with the most hits in `text`.
///
/// Ties keep the first bag in iteration order. No hits at all yields `None`.
pub fn best_bag<'a, L, S, I>(text: &str, bags: I) -> Option<L>
where
    I: IntoIterator<Item = (L, &'a [S])>,
    S: AsRef<str> + 'a,
{
    let lower = text.to_lowercase();
    let mut best: Option<(L, usize)> = None;
    for (label, keywords) in bags {
        let hits = keyword_hits(&lower, keywords);
        if hits > 0 && best.as_ref().map_or(true, |(_, top)| hits > *top) {
            best = Some((label, hits));
        }
    }
    best.map(|(label, _)| label)
}
