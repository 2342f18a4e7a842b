//! Question rotation without immediate repeats
//!
//! Questions are drawn from the ones not shown yet. Once every id has been
//! used the whole pool becomes eligible again and the used set restarts with
//! the new pick, so the question that just played may come straight back.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::questions::Question;

/// Draw the next question and the updated used-id set.
///
/// Returns `None` only for an empty pool.
pub fn pick_next<'a, R: Rng + ?Sized>(
    pool: &'a [Question],
    used: &BTreeSet<u32>,
    rng: &mut R,
) -> Option<(&'a Question, BTreeSet<u32>)> {
    let unused: Vec<&Question> = pool.iter().filter(|q| !used.contains(&q.id)).collect();
    let exhausted = unused.is_empty();
    let candidates: Vec<&Question> = if exhausted {
        pool.iter().collect()
    } else {
        unused
    };

    let picked = *candidates.choose(rng)?;
    let next_used = if exhausted {
        BTreeSet::from([picked.id])
    } else {
        let mut next = used.clone();
        next.insert(picked.id);
        next
    };
    Some((picked, next_used))
}
