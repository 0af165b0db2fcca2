//! Inventory ledger behaviour.

mod common;

use common::{catalogue, fixture, money};
use royalty_core::inventory::{replay, INITIAL_STOCK_NOTE, PRIOR_SALES_NOTE};
use royalty_core::InventoryTransactionKind::{Addition, Complimentary, Sale};
use royalty_engine::ErrorKind;

#[tokio::test]
async fn addition_then_sale_leaves_ordered_ledger() {
    let fx = fixture().await;
    let book = catalogue(&fx, "Stocked", "9780306406157", 10.0, 0).await;
    let ledger = &fx.engine.inventory;

    ledger
        .update(&fx.author, &book.id, 50, Addition, Some("Reprint".to_string()))
        .await
        .unwrap();
    let inventory = ledger
        .update(&fx.author, &book.id, 20, Sale, None)
        .await
        .unwrap();

    assert_eq!(inventory.quantity_total, 50);
    assert_eq!(inventory.quantity_available, 30);
    assert_eq!(inventory.transactions.len(), 2);
    assert_eq!(inventory.transactions[0].kind, Addition);
    assert_eq!(inventory.transactions[0].notes.as_deref(), Some("Reprint"));
    assert_eq!(inventory.transactions[1].kind, Sale);

    let levels = replay(&book.id, &inventory.transactions).unwrap();
    assert_eq!(levels.total, inventory.quantity_total);
    assert_eq!(levels.available, inventory.quantity_available);
}

#[tokio::test]
async fn overdraw_is_rejected() {
    let fx = fixture().await;
    let book = catalogue(&fx, "Scarce", "9780306406157", 10.0, 0).await;
    let ledger = &fx.engine.inventory;

    ledger
        .update(&fx.author, &book.id, 5, Addition, None)
        .await
        .unwrap();
    let err = ledger
        .update(&fx.author, &book.id, 6, Complimentary, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);

    let inventory = ledger.status(&fx.author, &book.id).await.unwrap();
    assert_eq!(inventory.quantity_available, 5);
    assert_eq!(inventory.transactions.len(), 1);
}

#[tokio::test]
async fn invalid_movements_are_rejected() {
    let fx = fixture().await;
    let book = catalogue(&fx, "Guarded Stock", "9780306406157", 10.0, 0).await;
    let ledger = &fx.engine.inventory;

    let err = ledger
        .update(&fx.author, &book.id, 0, Addition, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = ledger
        .update(&fx.other_author, &book.id, 5, Addition, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = ledger
        .update(&fx.author, "00000000-0000-4000-8000-000000000000", 5, Addition, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn status_seeds_from_catalogue_once() {
    let fx = fixture().await;
    let book = catalogue(&fx, "Seeded", "9780306406157", 10.0, 100).await;
    fx.engine
        .sales
        .record_sale(&fx.author, &book.id, 30, money(300))
        .await
        .unwrap();

    let seeded = fx.engine.inventory.status(&fx.author, &book.id).await.unwrap();
    assert_eq!(seeded.quantity_total, 100);
    assert_eq!(seeded.quantity_available, 70);
    let notes: Vec<_> = seeded
        .transactions
        .iter()
        .map(|t| t.notes.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(notes, vec![INITIAL_STOCK_NOTE, PRIOR_SALES_NOTE]);

    // Later sales do not move stock; the ledgers are independent.
    fx.engine
        .sales
        .record_sale(&fx.author, &book.id, 10, money(100))
        .await
        .unwrap();
    let again = fx.engine.inventory.status(&fx.author, &book.id).await.unwrap();
    assert_eq!(again, seeded);
}

#[tokio::test]
async fn unprinted_book_seeds_empty_record() {
    let fx = fixture().await;
    let book = catalogue(&fx, "Unprinted", "9780306406157", 10.0, 0).await;

    let inventory = fx.engine.inventory.status(&fx.author, &book.id).await.unwrap();
    assert_eq!(inventory.quantity_total, 0);
    assert!(inventory.transactions.is_empty());

    let listed = fx
        .engine
        .inventory
        .list(&fx.author, &fx.author.user_id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}
