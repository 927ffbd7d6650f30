//! CIDR aggregation.
//!
//! Collapses one address family's networks into the minimal set of disjoint,
//! non-adjacent CIDR blocks covering exactly the same addresses.

use crate::models::{host_bits, lo_mask, Family, Network};

/// Inclusive address range `[start, end]` within one family.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Interval {
    pub family: Family,
    pub start: u128,
    pub end: u128,
}

/// Aggregate networks of a single family into the minimal CIDR cover.
///
/// The result is sorted by base address and does not depend on input order
/// or duplicates.
///
/// # Examples
/// ```
/// use drop_cidr_summary::processing::{aggregate, parse};
/// let nets = vec![
///     parse("192.0.2.128/25", None).unwrap(),
///     parse("192.0.2.0/25", None).unwrap(),
/// ];
/// let merged = aggregate(nets);
/// assert_eq!(merged.len(), 1);
/// assert_eq!(merged[0].to_string(), "192.0.2.0/24");
/// ```
pub fn aggregate(networks: Vec<Network>) -> Vec<Network> {
    debug_assert!(
        networks.windows(2).all(|w| w[0].family() == w[1].family()),
        "aggregate() called with mixed address families"
    );

    let kept = remove_subsumed(networks);
    merge_intervals(&kept)
        .into_iter()
        .flat_map(interval_to_cidrs)
        .collect()
}

/// Sort networks and drop every network contained in another one, duplicates included.
pub fn remove_subsumed(mut networks: Vec<Network>) -> Vec<Network> {
    // Address ascending, larger blocks first on equal address.
    networks.sort_by_key(|n| (n.addr(), n.prefix_len()));

    let mut kept: Vec<Network> = Vec::with_capacity(networks.len());
    let mut covered_to: Option<u128> = None;
    for net in networks {
        // CIDR blocks either nest or are disjoint, so an earlier block reaching
        // past our last address must contain us.
        if covered_to.is_some_and(|hi| net.last_addr() <= hi) {
            log::trace!("{net} subsumed");
            continue;
        }
        covered_to = Some(net.last_addr());
        kept.push(net);
    }
    kept
}

/// Merge sorted, non-nested networks into maximal contiguous intervals.
pub fn merge_intervals(sorted: &[Network]) -> Vec<Interval> {
    let mut intervals: Vec<Interval> = Vec::new();
    for net in sorted {
        if let Some(cur) = intervals.last_mut() {
            // Overflow of end + 1 means cur already reaches the top of the space.
            let touches = cur
                .end
                .checked_add(1)
                .map_or(true, |next| net.addr() <= next);
            if touches {
                cur.end = cur.end.max(net.last_addr());
                continue;
            }
        }
        intervals.push(Interval {
            family: net.family(),
            start: net.addr(),
            end: net.last_addr(),
        });
    }
    intervals
}

/// Split an interval into the fewest CIDR blocks, largest aligned block first.
pub fn interval_to_cidrs(interval: Interval) -> Vec<Network> {
    let width = interval.family.width();
    let mut blocks = Vec::new();
    let mut start = interval.start;

    loop {
        // Alignment limits how big a block may start here.
        let align_bits = width - lo_mask(start, width);
        // Largest power of two not exceeding the remaining span.
        let span = interval.end - start;
        let fit_bits = match span.checked_add(1) {
            Some(count) => 127 - count.leading_zeros() as u8,
            None => 128,
        };
        let host = align_bits.min(fit_bits);

        let last = start | host_bits(host);
        blocks.push(Network::from_parts(interval.family, start, width - host));

        if last >= interval.end {
            break;
        }
        start = last + 1;
    }
    blocks
}
