pub mod cart;
pub mod home;
pub mod not_found;
pub mod orders;
pub mod profile;

pub use cart::CartPage;
pub use home::HomePage;
pub use not_found::NotFoundPage;
pub use orders::OrdersPage;
pub use profile::ProfilePage;
