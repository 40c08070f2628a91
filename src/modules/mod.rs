pub mod movie;
pub mod rating;

#[cfg(test)]
pub mod testing;
