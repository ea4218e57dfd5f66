use std::fmt::{Debug, Formatter};
use std::net::Ipv4Addr;

pub mod builder;
pub mod error;
pub mod fragmentation;
pub mod reassembly;

pub use builder::DatagramBuilder;
pub use error::Error;

pub mod consts {
    /// Width of the `size` field, leading-zero padded.
    pub const SIZE_FIELD_WIDTH: usize = 8;
    /// Number of commas separating the 8 wire fields (7 commas -> 8 parts).
    pub const FIELD_COUNT: usize = 8;
}

/// A single in-memory datagram: either a complete message or one fragment
/// of a larger one. See the wire format in [`Datagram::encode`].
#[derive(Clone, PartialEq, Eq)]
pub struct Datagram {
    dst_ip: Ipv4Addr,
    dst_port: u16,
    ttl: i32,
    id: String,
    offset: u64,
    more_fragments: bool,
    payload: Vec<u8>,
}

impl Datagram {
    pub fn dst_ip(&self) -> Ipv4Addr {
        self.dst_ip
    }

    pub fn dst_port(&self) -> u16 {
        self.dst_port
    }

    pub fn ttl(&self) -> i32 {
        self.ttl
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn more_fragments(&self) -> bool {
        self.more_fragments
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Byte length of the payload, i.e. what the wire `size` field holds.
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    /// Returns a new datagram with `ttl` decremented by one, leaving `self`
    /// untouched. Preferred over in-place mutation so intermediate values
    /// stay immutable (see DESIGN.md).
    pub fn with_decremented_ttl(&self) -> Datagram {
        Datagram {
            ttl: self.ttl - 1,
            ..self.clone()
        }
    }

    /// Encodes this datagram to its wire form:
    /// `dst_ip,dst_port,ttl,id,offset,size,flag,payload`
    /// with `size` padded to [`consts::SIZE_FIELD_WIDTH`] digits and `flag`
    /// being `1` (more fragments follow) or `0` (last fragment).
    pub fn encode(&self) -> Vec<u8> {
        debug_assert!(
            self.payload.len() < 10usize.pow(consts::SIZE_FIELD_WIDTH as u32),
            "payload too large to fit in an 8-digit size field"
        );

        let mut wire = format!(
            "{},{},{},{},{},{:0width$},{},",
            self.dst_ip,
            self.dst_port,
            self.ttl,
            self.id,
            self.offset,
            self.payload.len(),
            if self.more_fragments { 1 } else { 0 },
            width = consts::SIZE_FIELD_WIDTH
        )
        .into_bytes();

        wire.extend_from_slice(&self.payload);
        wire
    }

    /// Parses a wire-encoded datagram, splitting on the first 7 commas so
    /// any commas inside the payload are preserved verbatim.
    pub fn parse(wire: &[u8]) -> Result<Datagram, Error> {
        let mut commas = Vec::with_capacity(consts::FIELD_COUNT - 1);
        for (index, byte) in wire.iter().enumerate() {
            if *byte == b',' {
                commas.push(index);
                if commas.len() == consts::FIELD_COUNT - 1 {
                    break;
                }
            }
        }
        if commas.len() < consts::FIELD_COUNT - 1 {
            return Err(Error::TooFewFields);
        }

        let field = |from: usize, to: usize| -> &[u8] { &wire[from..to] };

        let dst_ip_field = field(0, commas[0]);
        let dst_port_field = field(commas[0] + 1, commas[1]);
        let ttl_field = field(commas[1] + 1, commas[2]);
        let id_field = field(commas[2] + 1, commas[3]);
        let offset_field = field(commas[3] + 1, commas[4]);
        let size_field = field(commas[4] + 1, commas[5]);
        let flag_field = field(commas[5] + 1, commas[6]);
        let payload = wire[commas[6] + 1..].to_vec();

        let as_str = |bytes: &[u8], err: Error| -> Result<&str, Error> {
            std::str::from_utf8(bytes).map_err(|_| err)
        };

        let dst_ip = as_str(dst_ip_field, Error::InvalidIpAddress)?
            .parse::<Ipv4Addr>()
            .map_err(|_| Error::InvalidIpAddress)?;

        let dst_port = as_str(dst_port_field, Error::InvalidPort)?
            .parse::<u16>()
            .map_err(|_| Error::InvalidPort)?;

        let ttl = as_str(ttl_field, Error::InvalidTtl)?
            .parse::<i32>()
            .map_err(|_| Error::InvalidTtl)?;

        let id = as_str(id_field, Error::InvalidId)?.to_string();
        if id.is_empty() {
            return Err(Error::InvalidId);
        }

        let offset = as_str(offset_field, Error::InvalidOffset)?
            .parse::<u64>()
            .map_err(|_| Error::InvalidOffset)?;

        if size_field.len() != consts::SIZE_FIELD_WIDTH || !size_field.iter().all(u8::is_ascii_digit) {
            return Err(Error::InvalidSize);
        }

        let more_fragments = match flag_field {
            b"1" => true,
            b"0" => false,
            _ => return Err(Error::InvalidFlag),
        };

        Ok(Datagram {
            dst_ip,
            dst_port,
            ttl,
            id,
            offset,
            more_fragments,
            payload,
        })
    }
}

impl Debug for Datagram {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "dst: {}:{}, ttl: {}, id: {:?}, offset: {}, size: {}, more_fragments: {}",
            self.dst_ip,
            self.dst_port,
            self.ttl,
            self.id,
            self.offset,
            self.size(),
            self.more_fragments
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Datagram {
        DatagramBuilder::default()
            .dst_ip(Ipv4Addr::new(127, 0, 0, 1))
            .dst_port(8000)
            .ttl(5)
            .id("abc")
            .offset(0)
            .more_fragments(false)
            .payload(b"hello".to_vec())
            .build()
    }

    #[test]
    fn round_trip() {
        let datagram = sample();
        let wire = datagram.encode();
        assert_eq!(wire, b"127.0.0.1,8000,5,abc,0,00000005,0,hello");

        let parsed = Datagram::parse(&wire).unwrap();
        assert_eq!(parsed, datagram);
    }

    #[test]
    fn payload_may_contain_commas() {
        let datagram = DatagramBuilder::default()
            .dst_ip(Ipv4Addr::new(127, 0, 0, 1))
            .dst_port(8000)
            .ttl(5)
            .id("abc")
            .offset(0)
            .more_fragments(false)
            .payload(b"a,b,c".to_vec())
            .build();

        let wire = datagram.encode();
        let parsed = Datagram::parse(&wire).unwrap();
        assert_eq!(parsed.payload(), b"a,b,c");
    }

    #[test]
    fn negative_ttl_round_trips() {
        let mut datagram = sample();
        datagram.ttl = -1;
        let wire = datagram.encode();
        let parsed = Datagram::parse(&wire).unwrap();
        assert_eq!(parsed.ttl(), -1);
    }

    #[test]
    fn rejects_too_few_fields() {
        let err = Datagram::parse(b"127.0.0.1,8000,5,abc,0,00000005,0").unwrap_err();
        assert!(matches!(err, Error::TooFewFields));
    }

    #[test]
    fn rejects_bad_size_width() {
        let err = Datagram::parse(b"127.0.0.1,8000,5,abc,0,5,0,hello").unwrap_err();
        assert!(matches!(err, Error::InvalidSize));
    }

    #[test]
    fn rejects_bad_flag() {
        let err = Datagram::parse(b"127.0.0.1,8000,5,abc,0,00000005,2,hello").unwrap_err();
        assert!(matches!(err, Error::InvalidFlag));
    }

    #[test]
    fn with_decremented_ttl_does_not_mutate_original() {
        let datagram = sample();
        let decremented = datagram.with_decremented_ttl();
        assert_eq!(datagram.ttl(), 5);
        assert_eq!(decremented.ttl(), 4);
    }
}
