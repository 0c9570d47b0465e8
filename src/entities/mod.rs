pub mod prelude;

pub mod addresses;
pub mod movies;
pub mod seen_movies;
pub mod users;
