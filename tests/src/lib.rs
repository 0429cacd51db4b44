//! Integration tests driving the full `Engine`/`wire` stack end to end, the
//! way a PostgreSQL client would, rather than exercising any one crate's
//! internals. Each module here mirrors one of the concrete scenarios or
//! testable properties of §8.

#[cfg(test)]
mod delete_iteration;
#[cfg(test)]
mod end_to_end;
#[cfg(test)]
mod meta_tables;
#[cfg(test)]
mod savefile_roundtrip;
#[cfg(test)]
mod wire_protocol;
