pub mod audit;
pub mod error;
pub mod metainfo;
pub mod telemetry;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;
