//! Human-readable record identifiers: a fixed prefix followed by four digits.

use rand::Rng;

pub const BUG_PREFIX: &str = "SPLB";
pub const FIX_PREFIX: &str = "SPLF";

const SUFFIX_MIN: u16 = 1000;
const SUFFIX_MAX: u16 = 9999;
const SUFFIX_SPACE: u16 = SUFFIX_MAX - SUFFIX_MIN + 1;

/// Random draws before falling back to a scan of the whole suffix space.
const RANDOM_DRAWS: usize = 64;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("every {0} identifier is already taken")]
    Exhausted(&'static str),
}

/// Picks `prefix` + a random suffix in 1000..=9999 that `is_taken` rejects.
///
/// When the space is crowded enough that random draws keep colliding, the
/// remaining suffixes are scanned from a random starting point, so the call
/// always terminates and reports `IdError::Exhausted` only when nothing is free.
pub fn generate_unique_id<R, F>(
    prefix: &'static str,
    rng: &mut R,
    mut is_taken: F,
) -> Result<String, IdError>
where
    R: Rng + ?Sized,
    F: FnMut(&str) -> bool,
{
    for _ in 0..RANDOM_DRAWS {
        let candidate = format_id(prefix, rng.random_range(SUFFIX_MIN..=SUFFIX_MAX));
        if !is_taken(&candidate) {
            return Ok(candidate);
        }
    }

    let start = rng.random_range(0..SUFFIX_SPACE);
    for offset in 0..SUFFIX_SPACE {
        let suffix = SUFFIX_MIN + (start + offset) % SUFFIX_SPACE;
        let candidate = format_id(prefix, suffix);
        if !is_taken(&candidate) {
            return Ok(candidate);
        }
    }

    Err(IdError::Exhausted(prefix))
}

/// Keeps an already assigned identifier, generating one only when there is none.
pub fn ensure_identifier<R, F>(
    current: Option<String>,
    prefix: &'static str,
    rng: &mut R,
    is_taken: F,
) -> Result<String, IdError>
where
    R: Rng + ?Sized,
    F: FnMut(&str) -> bool,
{
    match current {
        Some(id) if !id.is_empty() => Ok(id),
        _ => generate_unique_id(prefix, rng, is_taken),
    }
}

pub fn is_well_formed(prefix: &str, id: &str) -> bool {
    id.strip_prefix(prefix)
        .map(|digits| {
            digits.len() == 4
                && digits.bytes().all(|b| b.is_ascii_digit())
                && !digits.starts_with('0')
        })
        .unwrap_or(false)
}

fn format_id(prefix: &str, suffix: u16) -> String {
    format!("{}{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_have_prefix_and_four_digits() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let id = generate_unique_id(BUG_PREFIX, &mut rng, |_| false).unwrap();
            assert!(is_well_formed(BUG_PREFIX, &id), "bad id {}", id);
        }
    }

    #[test]
    fn skips_taken_candidates() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut taken = HashSet::new();
        for _ in 0..500 {
            let id = generate_unique_id(FIX_PREFIX, &mut rng, |c| taken.contains(c)).unwrap();
            assert!(taken.insert(id));
        }
    }

    #[test]
    fn finds_the_last_free_suffix() {
        let mut rng = StdRng::seed_from_u64(3);
        let id = generate_unique_id(BUG_PREFIX, &mut rng, |c| c != "SPLB4242").unwrap();
        assert_eq!(id, "SPLB4242");
    }

    #[test]
    fn reports_exhaustion() {
        let mut rng = StdRng::seed_from_u64(4);
        let err = generate_unique_id(BUG_PREFIX, &mut rng, |_| true).unwrap_err();
        assert_eq!(err, IdError::Exhausted(BUG_PREFIX));
    }

    #[test]
    fn existing_identifier_is_kept() {
        let mut rng = StdRng::seed_from_u64(5);
        let id = ensure_identifier(Some("SPLB1234".into()), BUG_PREFIX, &mut rng, |_| true).unwrap();
        assert_eq!(id, "SPLB1234");
    }

    #[test]
    fn well_formed_check() {
        assert!(is_well_formed("SPLF", "SPLF1000"));
        assert!(!is_well_formed("SPLF", "SPLB1000"));
        assert!(!is_well_formed("SPLF", "SPLF0999"));
        assert!(!is_well_formed("SPLF", "SPLF12345"));
    }
}
