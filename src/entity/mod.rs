pub mod items;
pub mod orders;
pub mod timestamps;

pub use items::Entity as Items;
pub use orders::Entity as Orders;
