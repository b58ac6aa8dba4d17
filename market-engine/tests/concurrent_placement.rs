//! Concurrent placement tests
//!
//! Races real threads against one listing to prove the reservation
//! invariant: the total reserved quantity never exceeds the stock the
//! listing held, no matter how the placements interleave.

use market_engine::{EngineConfig, EngineError, MarketEngine};
use rand::Rng;
use shared::models::{Actor, ListingStatus, NewListing, OrderStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn seeded_engine(quantity: f64) -> (Arc<MarketEngine>, String) {
    let engine = Arc::new(MarketEngine::open_in_memory(EngineConfig::default()).unwrap());
    let listing = engine
        .create_listing(
            &Actor::farmer("farmer-1"),
            NewListing {
                crop_name: "Basmati Rice".to_string(),
                quantity,
                unit: "kg".to_string(),
                price_per_unit: 120.0,
            },
        )
        .unwrap();
    let listing_id = listing.id.unwrap();
    (engine, listing_id)
}

#[test]
fn two_buyers_cannot_jointly_overdraw() {
    // quantity 10, two concurrent requests for 6 each: exactly one may win
    for _ in 0..20 {
        let (engine, listing_id) = seeded_engine(10.0);
        let success = Arc::new(AtomicUsize::new(0));
        let out_of_stock = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..2)
            .map(|i| {
                let engine = Arc::clone(&engine);
                let listing_id = listing_id.clone();
                let success = Arc::clone(&success);
                let out_of_stock = Arc::clone(&out_of_stock);
                std::thread::spawn(move || {
                    let buyer = Actor::buyer(format!("buyer-{i}"));
                    match engine.place_order(&buyer, &listing_id, 6.0) {
                        Ok(_) => {
                            success.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(EngineError::InsufficientStock { .. }) => {
                            out_of_stock.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(other) => panic!("unexpected error: {other:?}"),
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(success.load(Ordering::SeqCst), 1, "exactly one placement wins");
        assert_eq!(out_of_stock.load(Ordering::SeqCst), 1);

        let listing = engine.get_listing(&listing_id).unwrap();
        assert_eq!(listing.quantity, 4.0);
        assert_eq!(listing.status, ListingStatus::Active);
    }
}

#[test]
fn many_buyers_never_oversell() {
    // 8 threads x 3 attempts of 10 kg against 100 kg of stock:
    // exactly 10 placements can succeed, and the listing ends sold out.
    let (engine, listing_id) = seeded_engine(100.0);
    let successes = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let listing_id = listing_id.clone();
            let successes = Arc::clone(&successes);
            std::thread::spawn(move || {
                let buyer = Actor::buyer(format!("buyer-{i}"));
                for _ in 0..3 {
                    // Jitter the schedule so the interleavings vary across runs
                    let jitter = rand::thread_rng().gen_range(0..3);
                    std::thread::sleep(Duration::from_millis(jitter));
                    match engine.place_order(&buyer, &listing_id, 10.0) {
                        Ok(_) => {
                            successes.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(EngineError::InsufficientStock { .. })
                        | Err(EngineError::TransactionConflict) => {}
                        Err(other) => panic!("unexpected error: {other:?}"),
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(successes.load(Ordering::SeqCst), 10);

    let listing = engine.get_listing(&listing_id).unwrap();
    assert_eq!(listing.quantity, 0.0);
    assert_eq!(listing.status, ListingStatus::Sold);

    // Every successful order is intact and the reserved total matches
    let orders = engine.orders_for_farmer("farmer-1").unwrap();
    assert_eq!(orders.len(), 10);
    let reserved: f64 = orders.iter().map(|o| o.quantity).sum();
    assert_eq!(reserved, 100.0);
}

#[test]
fn rejection_races_do_not_corrupt_stock() {
    // A placement and a rejection of an earlier order race against the
    // same listing; stock accounting must stay exact either way.
    let (engine, listing_id) = seeded_engine(50.0);
    let farmer = Actor::farmer("farmer-1");
    let first = engine
        .place_order(&Actor::buyer("buyer-1"), &listing_id, 20.0)
        .unwrap();
    let first_id = first.id.unwrap();

    let reject_handle = {
        let engine = Arc::clone(&engine);
        let farmer = farmer.clone();
        std::thread::spawn(move || {
            engine
                .transition_order(&farmer, &first_id, OrderStatus::Rejected)
                .unwrap();
        })
    };
    let place_handle = {
        let engine = Arc::clone(&engine);
        let listing_id = listing_id.clone();
        std::thread::spawn(move || {
            engine
                .place_order(&Actor::buyer("buyer-2"), &listing_id, 30.0)
                .unwrap();
        })
    };
    reject_handle.join().unwrap();
    place_handle.join().unwrap();

    // 50 - 20 (placed) + 20 (rejected) - 30 (placed) = 20
    let listing = engine.get_listing(&listing_id).unwrap();
    assert_eq!(listing.quantity, 20.0);
    assert_eq!(listing.status, ListingStatus::Active);
}
