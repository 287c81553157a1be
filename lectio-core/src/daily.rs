//! Verse-of-the-day selection.
//!
//! A seed (normally an ISO date) is hashed with the 32-bit polynomial string hash
//! `h = h * 31 + unit` over UTF-16 code units, so every process holding the same
//! corpus picks the same verse for the same day without shared state.

use crate::index::ScriptureIndex;
use crate::verse::Verse;
use crate::LectioError;
use rand::Rng;
use time::macros::format_description;
use time::Date;

/// 32-bit wrapping polynomial hash over UTF-16 code units
pub fn seed_hash(seed: &str) -> i32 {
    seed.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Table position selected by `seed` for a table of `len` verses. `len` must be non-zero.
pub fn seed_index(seed: &str, len: usize) -> usize {
    seed_hash(seed).unsigned_abs() as usize % len
}

/// `YYYY-MM-DD` seed for a calendar date
pub fn date_seed(date: Date) -> String {
    // Formatting a plain date with this description cannot fail.
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> crate::Result<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        LectioError::InvalidQuery(format!("'{}' is not a YYYY-MM-DD date", raw.trim()))
    })
}

impl ScriptureIndex {
    /// Seeded verses are stable for a given seed and corpus; without a seed (or
    /// with an empty one) the pick is uniformly random.
    pub fn random_verse(&self, seed: Option<&str>) -> crate::Result<&Verse> {
        if self.is_empty() {
            return Err(LectioError::EmptyCorpus);
        }

        let pos = match seed.filter(|s| !s.is_empty()) {
            Some(seed) => seed_index(seed, self.len()),
            None => rand::thread_rng().gen_range(0..self.len()),
        };
        Ok(&self.verses()[pos])
    }

    /// Verse of the day for `date`
    pub fn daily_verse(&self, date: Date) -> crate::Result<&Verse> {
        self.random_verse(Some(&date_seed(date)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::tests::fixture_index;
    use crate::verse::Canon;
    use time::macros::date;

    #[test]
    fn test_seed_hash_matches_reference_values() {
        assert_eq!(seed_hash(""), 0);
        assert_eq!(seed_hash("a"), 97);
        assert_eq!(seed_hash("2024-01-01"), -613341632);
        assert_eq!(seed_hash("2024-01-02"), -613341631);
        assert_eq!(seed_hash("hello world, this is a long seed"), -1522911702);
    }

    #[test]
    fn test_seed_index_uses_absolute_value() {
        assert_eq!(seed_index("2024-01-01", 31102), 10192);
        assert_eq!(seed_index("2024-01-01", 14), 8);
        assert_eq!(seed_index("2024-01-02", 14), 7);
    }

    #[test]
    fn test_seed_index_handles_min_hash() {
        // |i32::MIN| does not fit in i32; the index must still be in range.
        assert!(i32::MIN.unsigned_abs() as usize % 7 < 7);
    }

    #[test]
    fn test_seeded_selection_is_deterministic() {
        let index = fixture_index();
        let first = index.random_verse(Some("2024-01-01")).unwrap();
        let second = index.random_verse(Some("2024-01-01")).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, &index.verses()[8]);

        let rebuilt = fixture_index();
        assert_eq!(rebuilt.random_verse(Some("2024-01-01")).unwrap(), first);
    }

    #[test]
    fn test_daily_verse_uses_iso_date() {
        let index = fixture_index();
        assert_eq!(
            index.daily_verse(date!(2024 - 01 - 02)).unwrap(),
            index.random_verse(Some("2024-01-02")).unwrap()
        );
    }

    #[test]
    fn test_unseeded_selection_is_in_table() {
        let index = fixture_index();
        let verse = index.random_verse(None).unwrap();
        assert!(index.verses().contains(verse));
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let index = ScriptureIndex::empty(Canon::default());
        assert!(matches!(index.random_verse(None), Err(LectioError::EmptyCorpus)));
        assert!(matches!(
            index.random_verse(Some("2024-01-01")),
            Err(LectioError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_date_seed_round_trip() {
        assert_eq!(date_seed(date!(2024 - 03 - 09)), "2024-03-09");
        assert_eq!(parse_date("2024-03-09").unwrap(), date!(2024 - 03 - 09));
        assert!(matches!(parse_date("03/09/2024"), Err(LectioError::InvalidQuery(_))));
    }
}
