pub use capped::Capped;
pub use ipset::BoundedSet;

mod capped;
mod ipset;

#[cfg(test)]
mod test;
