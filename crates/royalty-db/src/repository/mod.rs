//! # Repository Module
//!
//! One repository per table family, each holding a clone of the pool.
//!
//! ```text
//! db.users()        UserRepository       authors, admins
//! db.books()        BookRepository       catalogue
//! db.sales()        SaleRepository       immutable sale ledger
//! db.inventories()  InventoryRepository  stock records + ledgers
//! db.earnings()     EarningRepository    monthly rollups
//! ```

pub mod book;
pub mod earning;
pub mod inventory;
pub mod sale;
pub mod user;
