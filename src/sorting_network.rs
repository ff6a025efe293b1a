//! Batcher odd-even merge sorting network, used purely as a comparator
//! schedule for the cardinality encoder (`crate::cardinality`).
//!
//! Non-power-of-two sizes are realized by padding to the next larger
//! power of two with imaginary `-inf`/`+inf` elements and dropping any
//! comparator that would touch one of them: a comparator never needs
//! to move an element known to be smaller (or larger) than every real
//! element.

/// One comparator: sort positions `a` and `b` ascending.
pub type Comparator = (usize, usize);

/// Generate the comparator sequence for Batcher's odd-even mergesort
/// over `size` inputs.
///
/// Panics if `size` would require a negative-length index range (i.e.
/// never, since `size` is unsigned) — kept as a documented contract:
/// this function has no failure mode other than being called with a
/// value that doesn't fit `usize`, which the type system already
/// prevents.
pub fn sorting_network(size: usize) -> Vec<Comparator> {
    if size < 2 {
        return Vec::new();
    }

    let next_pot_size = size.next_power_of_two();
    let fill = next_pot_size - size;
    let prefix_len = fill / 2;
    let suffix_len = fill - prefix_len;

    let mut indices: Vec<Option<usize>> = Vec::with_capacity(next_pot_size);
    indices.extend(std::iter::repeat(None).take(prefix_len));
    indices.extend((0..size).map(Some));
    indices.extend(std::iter::repeat(None).take(suffix_len));

    let mut network = Vec::new();
    build_network(&indices, &mut network);

    network
        .into_iter()
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        })
        .collect()
}

fn build_network(indices: &[Option<usize>], out: &mut Vec<(Option<usize>, Option<usize>)>) {
    if indices.len() < 2 {
        return;
    }
    if indices.len() == 2 {
        out.push((indices[0], indices[1]));
        return;
    }
    assert!(indices.len() % 2 == 0, "sorting network length needs to be even");

    let mid = indices.len() / 2;
    build_network(&indices[..mid], out);
    build_network(&indices[mid..], out);
    build_merge(indices, out);
}

fn build_merge(indices: &[Option<usize>], out: &mut Vec<(Option<usize>, Option<usize>)>) {
    if indices.len() < 2 {
        return;
    }
    if indices.len() == 2 {
        out.push((indices[0], indices[1]));
        return;
    }
    assert!(indices.len() % 4 == 0, "merge network length needs to be a multiple of four");

    let evens: Vec<Option<usize>> = indices.iter().step_by(2).copied().collect();
    let odds: Vec<Option<usize>> = indices.iter().skip(1).step_by(2).copied().collect();

    build_merge(&evens, out);
    build_merge(&odds, out);

    // zip(indices[1::2], indices[2::2]) from the original: pairs of
    // consecutive elements straddling the even/odd interleave, starting
    // at index 1.
    let tail: Vec<Option<usize>> = indices.iter().skip(1).copied().collect();
    for (x, y) in tail.iter().step_by(2).zip(tail.iter().skip(1).step_by(2)) {
        out.push((*x, *y));
    }
}
