//! Run-length page-range encoding.
//!
//! Encodes a set of page numbers as a comma-separated list of tokens, each
//! either a bare page number or `start-end` for a consecutive run, in
//! ascending order. The format is stable; downstream consumers re-parse it.

/// Encode a set of page numbers, e.g. `[1, 2, 3, 5, 7, 8, 9]` -> `"1-3,5,7-9"`.
/// The empty set encodes as the empty string.
pub fn format_page_ranges(pages: &[u32]) -> String {
    if pages.is_empty() {
        return String::new();
    }

    let mut sorted = pages.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut tokens = Vec::new();
    let mut start = sorted[0];
    let mut end = sorted[0];

    for &page in &sorted[1..] {
        if page == end + 1 {
            end = page;
        } else {
            tokens.push(token(start, end));
            start = page;
            end = page;
        }
    }
    tokens.push(token(start, end));

    tokens.join(",")
}

fn token(start: u32, end: u32) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}-{}", start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Inverse of the token grammar, used to check round-trips.
    fn parse_page_ranges(encoded: &str) -> Vec<u32> {
        if encoded.is_empty() {
            return Vec::new();
        }
        let mut pages = Vec::new();
        for token in encoded.split(',') {
            match token.split_once('-') {
                Some((start, end)) => {
                    let start: u32 = start.parse().unwrap();
                    let end: u32 = end.parse().unwrap();
                    assert!(start < end, "range token must satisfy start < end");
                    pages.extend(start..=end);
                }
                None => pages.push(token.parse().unwrap()),
            }
        }
        pages
    }

    #[test]
    fn empty_set_encodes_as_empty_string() {
        assert_eq!(format_page_ranges(&[]), "");
    }

    #[test]
    fn single_page_is_a_bare_number() {
        assert_eq!(format_page_ranges(&[3]), "3");
    }

    #[test]
    fn mixed_runs_and_singletons() {
        assert_eq!(format_page_ranges(&[1, 2, 3, 5, 7, 8, 9]), "1-3,5,7-9");
    }

    #[test]
    fn input_order_does_not_matter() {
        assert_eq!(format_page_ranges(&[9, 1, 7, 3, 8, 2, 5]), "1-3,5,7-9");
    }

    #[test]
    fn two_page_run_renders_as_range() {
        assert_eq!(format_page_ranges(&[4, 5]), "4-5");
    }

    #[test]
    fn round_trips_through_the_token_grammar() {
        let cases: &[&[u32]] = &[
            &[],
            &[1],
            &[1, 2],
            &[2, 4, 6, 8],
            &[1, 2, 3, 5, 7, 8, 9],
            &[10, 11, 12, 13, 100],
        ];
        for pages in cases {
            let encoded = format_page_ranges(pages);
            assert_eq!(&parse_page_ranges(&encoded), pages, "encoding {:?}", pages);
        }
    }
}
