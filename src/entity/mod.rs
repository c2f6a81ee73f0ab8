pub mod addresses;
pub mod cart_items;
pub mod carts;
pub mod order_products;
pub mod orders;
pub mod payments;
pub mod product_images;
pub mod products;
pub mod users;

pub use addresses::Entity as Addresses;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use order_products::Entity as OrderProducts;
pub use orders::Entity as Orders;
pub use payments::Entity as Payments;
pub use product_images::Entity as ProductImages;
pub use products::Entity as Products;
pub use users::Entity as Users;
