pub use super::addresses::Entity as Addresses;
pub use super::movies::Entity as Movies;
pub use super::seen_movies::Entity as SeenMovies;
pub use super::users::Entity as Users;
