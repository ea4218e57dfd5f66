use crate::datagram::{consts, Datagram, Error};

impl Datagram {
    /// Iterates the fragments `self` splits into over a link of the given
    /// `mtu` (wire bytes). Every fragment carries `more_fragments = true`;
    /// the caller decides whether to overwrite the last one (see
    /// [`fragment`]).
    pub fn fragments(&self, mtu: usize) -> Result<FragmentIterator<'_>, Error> {
        // The walk never starts a fragment at the one-past-the-end offset, so the
        // worst-case header belongs to the last byte actually reached, not to
        // `payload.len()` itself (that offset can be a digit wider and would
        // over-reject MTUs at decimal boundaries).
        let last_offset = self.offset + self.payload.len().saturating_sub(1) as u64;
        let max_header_len = header_len(self, last_offset);
        if mtu <= max_header_len {
            return Err(Error::MtuTooSmall);
        }

        Ok(FragmentIterator {
            origin: self,
            cursor: 0,
            mtu,
        })
    }
}

/// Wire-byte length of the header (through the trailing comma before the
/// payload) that a fragment of `origin` starting at `offset` would have.
fn header_len(origin: &Datagram, offset: u64) -> usize {
    format!(
        "{},{},{},{},{},{:0width$},{},",
        origin.dst_ip,
        origin.dst_port,
        origin.ttl,
        origin.id,
        offset,
        0,
        1,
        width = consts::SIZE_FIELD_WIDTH
    )
    .len()
}

pub struct FragmentIterator<'a> {
    origin: &'a Datagram,
    cursor: usize,
    mtu: usize,
}

impl<'a> Iterator for FragmentIterator<'a> {
    type Item = Datagram;

    fn next(&mut self) -> Option<Datagram> {
        if self.cursor >= self.origin.payload.len() {
            return None;
        }

        let offset = self.origin.offset + self.cursor as u64;
        let header_bytes = header_len(self.origin, offset);
        let max_payload_len = self.mtu - header_bytes;
        debug_assert!(max_payload_len > 0, "mtu check in `fragments` should prevent this");

        let remaining = self.origin.payload.len() - self.cursor;
        let taken = remaining.min(max_payload_len);

        let fragment = Datagram {
            dst_ip: self.origin.dst_ip,
            dst_port: self.origin.dst_port,
            ttl: self.origin.ttl,
            id: self.origin.id.clone(),
            offset,
            more_fragments: true,
            payload: self.origin.payload[self.cursor..self.cursor + taken].to_vec(),
        };

        self.cursor += taken;

        Some(fragment)
    }
}

/// Sets `more_fragments = false` on the last element of an already-split
/// train, leaving every other fragment untouched. Value-returning so callers
/// never need to mutate a fragment list in place.
fn with_terminal_flag(mut fragments: Vec<Datagram>) -> Vec<Datagram> {
    if let Some(last) = fragments.last_mut() {
        last.more_fragments = false;
    }
    fragments
}

/// Splits a wire-encoded datagram so every produced fragment fits within
/// `mtu` wire bytes. Returns `[wire]` unchanged if it already fits.
pub fn fragment(wire: &[u8], mtu: usize) -> Result<Vec<Vec<u8>>, Error> {
    if wire.len() <= mtu {
        return Ok(vec![wire.to_vec()]);
    }

    let origin = Datagram::parse(wire)?;
    let fragments: Vec<Datagram> = origin.fragments(mtu)?.collect();

    let fragments = if !origin.more_fragments {
        with_terminal_flag(fragments)
    } else {
        fragments
    };

    Ok(fragments.iter().map(Datagram::encode).collect())
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::datagram::DatagramBuilder;

    fn payload_of(len: usize) -> Vec<u8> {
        (0..len).map(|i| b'a' + (i % 26) as u8).collect()
    }

    #[test]
    fn fits_unchanged() {
        let datagram = DatagramBuilder::default()
            .dst_ip(Ipv4Addr::new(127, 0, 0, 1))
            .dst_port(8001)
            .ttl(3)
            .id("id1")
            .payload(b"hello".to_vec())
            .build();

        let wire = datagram.encode();
        let fragments = fragment(&wire, 1024).unwrap();
        assert_eq!(fragments, vec![wire]);
    }

    #[test]
    fn splits_and_bounds_mtu() {
        let datagram = DatagramBuilder::default()
            .dst_ip(Ipv4Addr::new(127, 0, 0, 1))
            .dst_port(8001)
            .ttl(3)
            .id("id1")
            .more_fragments(false)
            .payload(payload_of(100))
            .build();

        let wire = datagram.encode();
        let fragments = fragment(&wire, 40).unwrap();

        assert!(fragments.len() >= 3);
        for frag in &fragments {
            assert!(frag.len() <= 40);
        }

        let last = Datagram::parse(fragments.last().unwrap()).unwrap();
        assert!(!last.more_fragments());
    }

    #[test]
    fn accepts_mtu_that_only_the_last_reached_offset_justifies() {
        // offset=99 needs a 2-digit field (header 35 bytes), but the
        // one-past-the-end offset=100 would need 3 digits (header 36
        // bytes) and is never actually reached by the walk.
        let datagram = DatagramBuilder::default()
            .dst_ip(Ipv4Addr::new(127, 0, 0, 1))
            .dst_port(8001)
            .ttl(3)
            .id("id1")
            .more_fragments(false)
            .payload(payload_of(100))
            .build();

        let wire = datagram.encode();
        let fragments = fragment(&wire, 36).unwrap();

        assert!(fragments.len() > 1);
        for frag in &fragments {
            assert!(frag.len() <= 36);
        }
    }

    #[test]
    fn sub_fragmenting_a_non_terminal_fragment_keeps_flag_set() {
        let datagram = DatagramBuilder::default()
            .dst_ip(Ipv4Addr::new(127, 0, 0, 1))
            .dst_port(8001)
            .ttl(3)
            .id("id1")
            .offset(40)
            .more_fragments(true)
            .payload(payload_of(40))
            .build();

        let wire = datagram.encode();
        let fragments = fragment(&wire, 45).unwrap();

        assert!(fragments.len() > 1);
        for frag in &fragments {
            let parsed = Datagram::parse(frag).unwrap();
            assert!(parsed.more_fragments());
        }
    }
}
