use std::fmt;

#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    NoRuleId,
    Metadata(String),
    Level(String),
    Action(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Error::NoRuleId    => write!(f, "no rule id present"),
            Error::Metadata(e) => write!(f, "could not extract metadata: {}", e),
            Error::Level(s)    => write!(f, "invalid aggregation level '{}'", s),
            Error::Action(s)   => write!(f, "invalid rule action '{}'", s),
        }
    }
}
