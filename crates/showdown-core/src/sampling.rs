// Weighted random selection by linear cumulative-weight scan.
//
// A draw in [0, total) is matched against running sums of the remaining
// candidates' weights. Floating-point edge cases (a draw landing on the very
// end of the range, zero or non-finite totals) can leave a scan without a
// pick; those cases fall back to the first untaken candidate in input order,
// so every call terminates with exactly the requested number of picks.

use rand::Rng;

/// Draw one index from `weights`, or `None` if the scan produced no pick.
///
/// Non-finite and negative weights count as zero.
pub fn weighted_pick<R: Rng + ?Sized>(rng: &mut R, weights: &[f64]) -> Option<usize> {
    let total: f64 = weights.iter().map(|&w| sanitize(w)).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let draw = rng.gen::<f64>() * total;
    let mut running = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        running += sanitize(w);
        if running > draw {
            return Some(i);
        }
    }
    None
}

/// Select `count` distinct indices from `weights` without replacement.
///
/// Each round draws against the weights of candidates not yet taken. When a
/// round stalls the first untaken candidate is taken instead. Returns fewer
/// than `count` indices only if there are fewer than `count` candidates.
pub fn weighted_sample_without_replacement<R: Rng + ?Sized>(
    rng: &mut R,
    weights: &[f64],
    count: usize,
) -> Vec<usize> {
    let count = count.min(weights.len());
    let mut taken = vec![false; weights.len()];
    let mut selected = Vec::with_capacity(count);

    while selected.len() < count {
        let total: f64 = weights
            .iter()
            .enumerate()
            .filter(|(i, _)| !taken[*i])
            .map(|(_, &w)| sanitize(w))
            .sum();

        let mut pick = None;
        if total > 0.0 && total.is_finite() {
            let draw = rng.gen::<f64>() * total;
            let mut running = 0.0;
            for (i, &w) in weights.iter().enumerate() {
                if taken[i] {
                    continue;
                }
                running += sanitize(w);
                if running > draw {
                    pick = Some(i);
                    break;
                }
            }
        }

        let index = match pick.or_else(|| taken.iter().position(|&t| !t)) {
            Some(i) => i,
            None => break,
        };
        taken[index] = true;
        selected.push(index);
    }

    selected
}

fn sanitize(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
