use lazy_static::lazy_static;
use std::sync::{PoisonError, RwLock};
use string_cache::DefaultAtom as Atom;

lazy_static! {
    static ref TEXT_INTERNER: RwLock<Vec<Atom>> = RwLock::new(Vec::new());
}

/// Intern a string and return its stable ID
pub fn intern_text(s: &str) -> usize {
    let atom = Atom::from(s);
    if let Some(idx) = position(&atom) {
        return idx;
    }
    let mut v = TEXT_INTERNER
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    // Another caller may have pushed the same text between the two locks.
    match v.iter().position(|a| *a == atom) {
        Some(idx) => idx,
        None => {
            v.push(atom);
            v.len() - 1
        }
    }
}

/// Current count of unique texts
pub fn text_count() -> usize {
    TEXT_INTERNER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .len()
}

fn position(atom: &Atom) -> Option<usize> {
    TEXT_INTERNER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .position(|a| a == atom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let a = intern_text("lexis-cache-test-apple");
        let b = intern_text("lexis-cache-test-pear");
        assert_ne!(a, b);
        assert_eq!(intern_text("lexis-cache-test-apple"), a);
        assert!(text_count() > a.max(b));
    }

    #[test]
    fn new_text_grows_the_count() {
        let before = text_count();
        let id = intern_text("lexis-cache-test-quince");
        assert!(id < text_count());
        assert!(text_count() >= before);
    }
}
