use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum Error {
    RouteFileIO(std::io::Error),
    MalformedLine(String),
    MalformedCidr(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::RouteFileIO(err) => write!(f, "could not read route file: {err}"),
            Error::MalformedLine(line) => write!(f, "malformed route file line: {line:?}"),
            Error::MalformedCidr(cidr) => write!(f, "malformed cidr network: {cidr:?}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::RouteFileIO(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
