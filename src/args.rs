use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::str::FromStr;
use anyhow::Result;

pub fn opt<T: FromStr>(arg: Option<&str>) -> Result<Option<T>> {
    Ok(arg.map(|s| T::from_str(s).map_err(|_| {
        let msg  = format!("invalid argument value '{}'", s);
        let kind = clap::ErrorKind::InvalidValue;
        clap::Error::with_description(&msg, kind)
    })).transpose()?)
}

pub fn input(path: Option<&str>) -> Result<Box<dyn BufRead + Send>> {
    let path = match path {
        Some(path) if path != "-" => path,
        _                         => return Ok(Box::new(BufReader::new(io::stdin()))),
    };

    let file = File::open(path).map_err(|e| {
        let msg  = format!("invalid argument '{}': {}", path, e);
        let kind = clap::ErrorKind::InvalidValue;
        clap::Error::with_description(&msg, kind)
    })?;

    Ok(Box::new(BufReader::new(file)))
}
