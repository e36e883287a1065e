//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Reads and
//! standalone writes take `&PgPool`; writes that must join a caller's
//! transaction take `&mut PgConnection` (pass `&mut *tx`).

pub mod discount_repo;
pub mod product_image_repo;
pub mod product_option_repo;
pub mod product_option_value_repo;
pub mod product_repo;
pub mod product_root_repo;
pub mod user_repo;
pub mod variant_bridge_repo;
pub mod webhook_execution_log_repo;
pub mod webhook_repo;

pub use discount_repo::DiscountRepo;
pub use product_image_repo::ProductImageRepo;
pub use product_option_repo::ProductOptionRepo;
pub use product_option_value_repo::ProductOptionValueRepo;
pub use product_repo::ProductRepo;
pub use product_root_repo::ProductRootRepo;
pub use user_repo::UserRepo;
pub use variant_bridge_repo::VariantBridgeRepo;
pub use webhook_execution_log_repo::WebhookExecutionLogRepo;
pub use webhook_repo::WebhookRepo;
