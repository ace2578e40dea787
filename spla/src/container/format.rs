use std::collections::VecDeque;

/// The format-prerequisite protocol a kernel declares against one input or
/// output before it runs (spec §4.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// "I will read from and write to format F" — freely mutating;
    /// every other format bit is cleared once F is valid.
    Rw,
    /// Read and write, but additive (e.g. LIL append) — other bits that
    /// happen to still agree with F are left set.
    Rwd,
    /// Write-destination only — the caller is about to overwrite F
    /// completely, so no conversion into F is needed, just allocation.
    Wd,
    /// Ensure F is constructed without reading or writing any data
    /// (configuring a property, e.g. the duplicate reducer, before data
    /// arrives).
    Ctor,
}

/// Finds the shortest sequence of formats to convert through, starting
/// from any format in `sources` and ending at `target`, walking the
/// undirected `edges` list. Every edge has unit cost (a "static table of
/// per-edge costs" is never given concrete numbers, so a uniform cost is
/// used here — see `DESIGN.md`); ties are broken by the order
/// `sources` is given in, so callers that want "prefer keeping the
/// richest valid format" order `sources` accordingly.
///
/// The returned path always starts with the source it was actually found
/// from (which may not be `sources[0]`) and ends with `target`; callers
/// must walk consecutive pairs rather than assuming the first hop is
/// adjacent to `sources[0]`.
///
/// Returns `None` only if `target` is unreachable from every source,
/// which cannot happen for the connected graphs this module builds.
pub fn shortest_conversion_path<F: Copy + PartialEq>(
    edges: &[(F, F)],
    sources: &[F],
    target: F,
) -> Option<Vec<F>> {
    if let Some(&s) = sources.iter().find(|&&s| s == target) {
        return Some(vec![s]);
    }
    let mut visited: Vec<F> = sources.to_vec();
    let mut queue: VecDeque<(F, Vec<F>)> = sources.iter().map(|&s| (s, vec![s])).collect();
    while let Some((cur, path)) = queue.pop_front() {
        for &(a, b) in edges {
            let next = if a == cur {
                Some(b)
            } else if b == cur {
                Some(a)
            } else {
                None
            };
            let Some(next) = next else { continue };
            if visited.iter().any(|&v| v == next) {
                continue;
            }
            let mut new_path = path.clone();
            new_path.push(next);
            if next == target {
                return Some(new_path);
            }
            visited.push(next);
            queue.push_back((next, new_path));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum F {
        A,
        B,
        C,
        D,
    }

    #[test]
    fn already_valid_needs_no_hops() {
        let edges = [(F::A, F::B), (F::B, F::C)];
        assert_eq!(shortest_conversion_path(&edges, &[F::B], F::B), Some(vec![F::B]));
    }

    #[test]
    fn finds_direct_edge() {
        let edges = [(F::A, F::B), (F::B, F::C)];
        assert_eq!(
            shortest_conversion_path(&edges, &[F::A], F::B),
            Some(vec![F::A, F::B])
        );
    }

    #[test]
    fn finds_multi_hop_path() {
        let edges = [(F::A, F::B), (F::B, F::C), (F::C, F::D)];
        assert_eq!(
            shortest_conversion_path(&edges, &[F::A], F::D),
            Some(vec![F::A, F::B, F::C, F::D])
        );
    }

    #[test]
    fn prefers_the_source_that_is_actually_closest() {
        // B is a valid source too, and is one hop from D while A is three.
        let edges = [(F::A, F::B), (F::B, F::C), (F::C, F::D), (F::B, F::D)];
        assert_eq!(
            shortest_conversion_path(&edges, &[F::A, F::B], F::D),
            Some(vec![F::B, F::D])
        );
    }
}
