use crate::datagram::{Datagram, DatagramBuilder};

/// Outcome of attempting to reassemble a train of fragments.
#[derive(Debug)]
pub enum Reassembly {
    Complete(Datagram),
    Incomplete,
}

/// Attempts to reassemble a collection of fragments believed to share one
/// `id`. Evaluates all four completeness rules together; on success,
/// returns the single reassembled datagram with `offset = 0`,
/// `more_fragments = false` and `size` equal to the concatenated payload's
/// byte length.
pub fn reassemble(fragments: &[Datagram]) -> Reassembly {
    if fragments.is_empty() {
        return Reassembly::Incomplete;
    }

    let mut sorted: Vec<&Datagram> = fragments.iter().collect();
    sorted.sort_by_key(|fragment| fragment.offset());

    if sorted[0].offset() != 0 {
        return Reassembly::Incomplete;
    }

    for pair in sorted.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.offset() + a.size() as u64 != b.offset() {
            return Reassembly::Incomplete;
        }
    }

    if sorted.last().unwrap().more_fragments() {
        return Reassembly::Incomplete;
    }

    let mut payload = Vec::new();
    for fragment in &sorted {
        payload.extend_from_slice(fragment.payload());
    }

    let first = sorted[0];
    let reassembled = DatagramBuilder::default()
        .dst_ip(first.dst_ip())
        .dst_port(first.dst_port())
        .ttl(first.ttl())
        .id(first.id())
        .offset(0)
        .more_fragments(false)
        .payload(payload)
        .build();

    Reassembly::Complete(reassembled)
}
