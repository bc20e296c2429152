use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid strand symbol {0:?}, expected '+', '-' or '.'")]
pub struct InvalidStrand(pub String);

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(i8)]
pub enum Strand {
    /// The forward strand, also known as the positive strand or Watson strand.
    #[default]
    Forward = 1,
    /// The reverse strand, also known as the negative strand or Crick strand.
    Reverse = -1,
}

impl Strand {
    /// Get the symbolic representation of the strand.
    pub fn symbol(&self) -> char {
        match self {
            Self::Forward => '+',
            Self::Reverse => '-',
        }
    }

    /// Parse a strand column where the strand may be left unset (`.` or an empty field).
    pub fn parse_optional(value: &str) -> Result<Option<Self>, InvalidStrand> {
        match value {
            "" | "." => Ok(None),
            other => other.parse().map(Some),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Strand {
    type Err = InvalidStrand;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "+" => Ok(Self::Forward),
            "-" => Ok(Self::Reverse),
            _ => Err(InvalidStrand(value.to_owned())),
        }
    }
}
