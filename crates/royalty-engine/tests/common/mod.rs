//! Shared fixtures for the engine integration tests.

#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use royalty_core::{Book, Caller, Money, NewBook, Role};
use royalty_db::{Database, DbConfig};
use royalty_engine::{DashboardSettings, RoyaltyEngine};

pub struct Fixture {
    pub db: Database,
    pub engine: RoyaltyEngine,
    pub author: Caller,
    pub other_author: Caller,
    pub admin: Caller,
}

pub async fn fixture() -> Fixture {
    fixture_with(DashboardSettings::default()).await
}

pub async fn fixture_with(settings: DashboardSettings) -> Fixture {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let users = db.users();
    let author = users
        .create("ada", "ada@example.com", Role::Author, Some("Ada"))
        .await
        .unwrap();
    let other = users
        .create("grace", "grace@example.com", Role::Author, None)
        .await
        .unwrap();
    let admin = users
        .create("root", "root@example.com", Role::Admin, None)
        .await
        .unwrap();

    Fixture {
        engine: RoyaltyEngine::new(db.clone(), settings),
        db,
        author: Caller::author(author.id),
        other_author: Caller::author(other.id),
        admin: Caller::admin(admin.id),
    }
}

pub fn new_book(title: &str, isbn: &str, royalty_percentage: f64, printed: i64) -> NewBook {
    NewBook {
        title: title.to_string(),
        language: "English".to_string(),
        isbn: isbn.to_string(),
        price_cents: 10_000,
        genre: "Fiction".to_string(),
        pages: 240,
        cover_type: "paperback".to_string(),
        edition: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        printed_quantity: printed,
        mrp_cents: 12_000,
        royalty_percentage,
    }
}

pub async fn catalogue(fx: &Fixture, title: &str, isbn: &str, pct: f64, printed: i64) -> Book {
    fx.engine
        .catalogue
        .create_book(&fx.author, new_book(title, isbn, pct, printed))
        .await
        .unwrap()
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

pub fn money(units: i64) -> Money {
    Money::from_major_minor(units, 0)
}
