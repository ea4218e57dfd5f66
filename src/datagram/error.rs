use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum Error {
    TooFewFields,
    InvalidIpAddress,
    InvalidPort,
    InvalidTtl,
    InvalidId,
    InvalidOffset,
    InvalidSize,
    InvalidFlag,
    MtuTooSmall,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TooFewFields => write!(f, "fewer than 8 comma-separated fields"),
            Error::InvalidIpAddress => write!(f, "invalid destination ip address"),
            Error::InvalidPort => write!(f, "invalid destination port"),
            Error::InvalidTtl => write!(f, "invalid ttl"),
            Error::InvalidId => write!(f, "invalid id"),
            Error::InvalidOffset => write!(f, "invalid offset"),
            Error::InvalidSize => write!(f, "size field is not exactly 8 digits"),
            Error::InvalidFlag => write!(f, "flag is neither '0' nor '1'"),
            Error::MtuTooSmall => write!(f, "mtu too small to fit even one payload byte of header"),
        }
    }
}

impl std::error::Error for Error {}
