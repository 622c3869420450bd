//! # stockcart-core: Pure Cart Rules for Stockcart
//!
//! This crate holds every rule that decides how the cart changes, as pure
//! functions over owned values. It never talks to the stock API, the
//! database, or the user.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockcart Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Presentation (CLI, UI, ...)                       │   │
//! │  │        get_cart · add_item · remove_item · update_amount        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockcart-session                               │   │
//! │  │     CartStore · CartEngine · single-flight worker · adapters    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockcart-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │   cart    │  │ validation│                  │   │
//! │  │   │ ProductId │  │   Cart    │  │  amounts  │                  │   │
//! │  │   │  Product  │  │ LineItem  │  │   stock   │                  │   │
//! │  │   │   Stock   │  │           │  │           │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product identifiers and catalog/stock records
//! - [`cart`] - The cart collection and its transformations
//! - [`error`] - Domain error types
//! - [`validation`] - Amount and stock rules
//!
//! ## Example Usage
//!
//! ```rust
//! use stockcart_core::{Cart, Product, ProductId, Stock};
//!
//! let product = Product {
//!     id: ProductId(1),
//!     title: "Running shoe".to_string(),
//!     price: 179.9,
//!     image: "https://example.com/shoe.jpg".to_string(),
//!     extra: Default::default(),
//! };
//!
//! let mut cart = Cart::new();
//! cart.push_new(&product).unwrap();
//! cart.increment(ProductId(1), Stock::new(ProductId(1), 5)).unwrap();
//!
//! assert_eq!(cart.amount_of(ProductId(1)), Some(2));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, LineItem};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key the cart snapshot lives under unless configured otherwise.
///
/// Kept identical to the key used by the existing web storefront so a
/// snapshot written there can be read back here.
pub const DEFAULT_CART_KEY: &str = "@RocketShoes:cart";

/// Amount a product enters the cart with on its first add.
pub const INITIAL_AMOUNT: i64 = 1;
