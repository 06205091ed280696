//! # Integration Test Flows
//!
//! ## Flows Tested:
//!
//! 1. **Listing creation**: every precondition, in order, with no mutation on failure
//! 2. **Execution**: exact payment, custody move, single use, expiry
//! 3. **Editing**: lister-only overwrite of price and activity
//! 4. **Fractions**: mint, first-match lookup, redemption, transfer
//! 5. **Fees**: accumulation and admin withdrawal
//! 6. **Notifications**: one per committed operation, none on failure

#[cfg(test)]
mod tests {
    use crate::fixtures::{milli, Actor, Market, ADMIN, ASSET, MARKET, NOW};
    use fx_01_signature_authorizer::AuthorizationError;
    use fx_02_listing_ledger::prelude::*;

    // =============================================================================
    // LISTING CREATION
    // =============================================================================

    #[test]
    fn test_listing_binds_caller_as_lister() {
        let market = Market::new();
        let lister = Actor::new(1);
        let someone_else = Actor::new(2);
        market.give_asset(&lister, 1);

        let mut candidate = market.candidate(&lister, 1, milli(100));
        candidate.lister = someone_else.address;

        let id = market.service.create_listing(lister.ctx(), candidate).unwrap();
        let listing = market.listing(id);

        assert_eq!(id, 0);
        assert_eq!(listing.lister, lister.address);
        assert!(listing.active);
        assert_eq!(listing.total_shares, 0);
        assert_eq!(listing.price, milli(100));
    }

    #[test]
    fn test_listing_ids_are_sequential() {
        let market = Market::new();
        let lister = Actor::new(1);
        assert_eq!(market.list(&lister, 1, milli(100)), 0);
        assert_eq!(market.list(&lister, 2, milli(100)), 1);
        assert_eq!(market.list(&lister, 3, milli(100)), 2);
        assert_eq!(market.service.listing_count().unwrap(), 3);
    }

    #[test]
    fn test_not_owner_rejected() {
        let market = Market::new();
        let owner = Actor::new(1);
        let intruder = Actor::new(2);
        market.give_asset(&owner, 1);

        let result = market
            .service
            .create_listing(intruder.ctx(), market.candidate(&intruder, 1, milli(100)));

        assert_eq!(
            result,
            Err(LedgerError::NotOwner {
                caller: intruder.address
            })
        );
        assert_eq!(market.service.listing_count().unwrap(), 0);
        assert!(market.events.is_empty());
    }

    #[test]
    fn test_not_approved_rejected() {
        let market = Market::new();
        let lister = Actor::new(1);
        market.assets.mint(ASSET, U256::one(), lister.address);

        let result = market
            .service
            .create_listing(lister.ctx(), market.candidate(&lister, 1, milli(100)));

        assert_eq!(
            result,
            Err(LedgerError::NotApproved {
                owner: lister.address,
                operator: MARKET
            })
        );
    }

    #[test]
    fn test_price_floor() {
        let market = Market::new();
        let lister = Actor::new(1);
        market.give_asset(&lister, 1);

        let below = milli(10) - U256::one();
        let result = market
            .service
            .create_listing(lister.ctx(), market.candidate(&lister, 1, below));
        assert_eq!(
            result,
            Err(LedgerError::MinPriceTooLow {
                price: below,
                minimum: milli(10)
            })
        );

        // Exactly the floor is accepted.
        assert!(market
            .service
            .create_listing(lister.ctx(), market.candidate(&lister, 1, milli(10)))
            .is_ok());
    }

    #[test]
    fn test_deadline_window() {
        let market = Market::new();
        let lister = Actor::new(1);
        market.give_asset(&lister, 1);

        let past = market.candidate_until(&lister, 1, milli(100), NOW);
        assert_eq!(
            market.service.create_listing(lister.ctx(), past),
            Err(LedgerError::DeadlineTooSoon {
                deadline: NOW,
                now: NOW
            })
        );

        let soon = market.candidate_until(&lister, 1, milli(100), NOW + 3599);
        assert_eq!(
            market.service.create_listing(lister.ctx(), soon),
            Err(LedgerError::MinDurationNotMet {
                deadline: NOW + 3599,
                earliest: NOW + 3600
            })
        );

        let exact = market.candidate_until(&lister, 1, milli(100), NOW + 3600);
        assert!(market.service.create_listing(lister.ctx(), exact).is_ok());
    }

    #[test]
    fn test_signature_must_cover_submitted_terms() {
        let market = Market::new();
        let lister = Actor::new(1);
        market.give_asset(&lister, 1);

        let mut candidate = market.candidate(&lister, 1, milli(100));
        candidate.price = milli(200);

        let result = market.service.create_listing(lister.ctx(), candidate);
        assert!(matches!(
            result,
            Err(LedgerError::InvalidSignature(
                AuthorizationError::SignerMismatch { .. }
            ))
        ));
        assert_eq!(market.service.listing_count().unwrap(), 0);
    }

    #[test]
    fn test_preconditions_checked_in_order() {
        let market = Market::new();
        let lister = Actor::new(1);
        market.assets.mint(ASSET, U256::one(), lister.address);

        // Unapproved, too cheap, too soon and unsigned: approval is reported.
        let candidate = ListingCandidate {
            asset: ASSET,
            asset_id: U256::one(),
            price: U256::one(),
            signature: vec![],
            deadline: NOW,
            lister: lister.address,
        };
        assert!(matches!(
            market.service.create_listing(lister.ctx(), candidate.clone()),
            Err(LedgerError::NotApproved { .. })
        ));

        market.assets.set_approval_for_all(lister.address, MARKET, true);
        assert!(matches!(
            market.service.create_listing(lister.ctx(), candidate.clone()),
            Err(LedgerError::MinPriceTooLow { .. })
        ));

        let candidate = ListingCandidate {
            price: milli(10),
            ..candidate
        };
        assert!(matches!(
            market.service.create_listing(lister.ctx(), candidate.clone()),
            Err(LedgerError::DeadlineTooSoon { .. })
        ));

        let candidate = ListingCandidate {
            deadline: NOW + 3600,
            ..candidate
        };
        assert_eq!(
            market.service.create_listing(lister.ctx(), candidate),
            Err(LedgerError::InvalidSignature(AuthorizationError::InvalidLength(0)))
        );
    }

    // =============================================================================
    // EXECUTION
    // =============================================================================

    #[test]
    fn test_execute_moves_asset_and_payment() {
        let market = Market::new();
        let lister = Actor::new(1);
        let buyer = Actor::new(2);
        market.fund(&buyer, milli(1000));
        let id = market.list(&lister, 1, milli(250));

        let listing = market
            .service
            .execute_listing(buyer.pay(milli(250)), id)
            .unwrap();

        assert!(!listing.active);
        assert_eq!(
            market.assets.owner_of(ASSET, U256::one()),
            Some(buyer.address)
        );
        assert_eq!(market.balance(lister.address), milli(250));
        assert_eq!(market.balance(buyer.address), milli(750));
        assert!(market.payments.custody_balance().is_zero());
    }

    #[test]
    fn test_execute_is_single_use() {
        let market = Market::new();
        let lister = Actor::new(1);
        let buyer = Actor::new(2);
        market.fund(&buyer, milli(1000));
        let id = market.list(&lister, 1, milli(250));

        market
            .service
            .execute_listing(buyer.pay(milli(250)), id)
            .unwrap();
        assert_eq!(
            market.service.execute_listing(buyer.pay(milli(250)), id),
            Err(LedgerError::ListingNotActive(id))
        );
        assert_eq!(market.balance(buyer.address), milli(750));
    }

    #[test]
    fn test_execute_requires_exact_price() {
        let market = Market::new();
        let lister = Actor::new(1);
        let buyer = Actor::new(2);
        market.fund(&buyer, milli(1000));
        let id = market.list(&lister, 1, milli(250));

        assert_eq!(
            market.service.execute_listing(buyer.pay(milli(240)), id),
            Err(LedgerError::PriceNotMet(PriceDelta::Shortfall(milli(10))))
        );
        assert_eq!(
            market.service.execute_listing(buyer.pay(milli(260)), id),
            Err(LedgerError::PriceNotMet(PriceDelta::Excess(milli(10))))
        );
        assert_eq!(market.balance(buyer.address), milli(1000));
        assert!(market.listing(id).active);
    }

    #[test]
    fn test_execute_lifecycle_errors() {
        let market = Market::new();
        let lister = Actor::new(1);
        let buyer = Actor::new(2);
        market.fund(&buyer, milli(1000));
        let id = market.list(&lister, 1, milli(250));

        assert_eq!(
            market.service.execute_listing(buyer.pay(milli(250)), 42),
            Err(LedgerError::ListingNotExistent(42))
        );

        // The deadline itself is still valid.
        market.clock.set(NOW + 7200);
        market.clock.advance(1);
        assert_eq!(
            market.service.execute_listing(buyer.pay(milli(250)), id),
            Err(LedgerError::ListingExpired {
                id,
                deadline: NOW + 7200
            })
        );
    }

    #[test]
    fn test_execute_without_funds_fails_cleanly() {
        let market = Market::new();
        let lister = Actor::new(1);
        let broke = Actor::new(3);
        let id = market.list(&lister, 1, milli(250));

        assert!(matches!(
            market.service.execute_listing(broke.pay(milli(250)), id),
            Err(LedgerError::Payment(TransferError::InsufficientFunds { .. }))
        ));
        assert!(market.listing(id).active);
    }

    // =============================================================================
    // EDITING
    // =============================================================================

    #[test]
    fn test_edit_round_trip() {
        let market = Market::new();
        let lister = Actor::new(1);
        let id = market.list(&lister, 1, milli(250));

        // No minimum is re-applied on edit.
        market
            .service
            .edit_listing(lister.ctx(), id, U256::one(), false)
            .unwrap();
        let listing = market.listing(id);
        assert_eq!(listing.price, U256::one());
        assert!(!listing.active);

        market
            .service
            .edit_listing(lister.ctx(), id, milli(300), true)
            .unwrap();
        let listing = market.listing(id);
        assert_eq!(listing.price, milli(300));
        assert!(listing.active);
    }

    #[test]
    fn test_edit_by_stranger_rejected() {
        let market = Market::new();
        let lister = Actor::new(1);
        let stranger = Actor::new(2);
        let id = market.list(&lister, 1, milli(250));
        let before = market.listing(id);

        assert_eq!(
            market
                .service
                .edit_listing(stranger.ctx(), id, U256::one(), false),
            Err(LedgerError::NotOwner {
                caller: stranger.address
            })
        );
        assert_eq!(market.listing(id), before);
        assert_eq!(
            market.service.edit_listing(lister.ctx(), 9, U256::one(), false),
            Err(LedgerError::ListingNotExistent(9))
        );
    }

    #[test]
    fn test_reactivated_sold_listing_cannot_sell_twice() {
        let market = Market::new();
        let lister = Actor::new(1);
        let first = Actor::new(2);
        let second = Actor::new(3);
        market.fund(&first, milli(1000));
        market.fund(&second, milli(1000));
        let id = market.list(&lister, 1, milli(250));

        market
            .service
            .execute_listing(first.pay(milli(250)), id)
            .unwrap();
        market
            .service
            .edit_listing(lister.ctx(), id, milli(250), true)
            .unwrap();

        let result = market.service.execute_listing(second.pay(milli(250)), id);

        assert!(matches!(
            result,
            Err(LedgerError::AssetTransfer(GatewayError::NotOwner { .. }))
        ));
        assert_eq!(market.balance(second.address), milli(1000));
        assert!(market.listing(id).active);
        assert_eq!(
            market.assets.owner_of(ASSET, U256::one()),
            Some(first.address)
        );
    }

    #[test]
    fn test_get_listing_of_absent_id() {
        let market = Market::new();
        assert_eq!(market.listing(3), Listing::default());
        assert_eq!(market.service.try_get_listing(3).unwrap(), None);
    }

    // =============================================================================
    // FRACTIONS
    // =============================================================================

    #[test]
    fn test_fraction_mint_truncates() {
        let market = Market::with_config(|c| c.min_price = U256::one());
        let lister = Actor::new(1);
        let investor = Actor::new(2);
        let id = market.list(&lister, 1, U256::from(100));

        let per_share = market
            .service
            .create_fractions(investor.ctx(), id, 3)
            .unwrap();

        assert_eq!(per_share, U256::from(33));
        assert_eq!(market.listing(id).total_shares, 3);
        let records = market.service.fractions_of(id).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records
            .iter()
            .all(|f| f.owner == investor.address && f.amount == U256::from(33)));
    }

    #[test]
    fn test_fraction_amount_first_match() {
        let market = Market::new();
        let lister = Actor::new(1);
        let investor = Actor::new(2);
        let outsider = Actor::new(3);
        let id = market.list(&lister, 1, milli(100));

        market
            .service
            .create_fractions(investor.ctx(), id, 4)
            .unwrap();

        assert_eq!(
            market
                .service
                .get_fraction_amount(investor.address, id)
                .unwrap(),
            milli(25)
        );
        assert_eq!(
            market
                .service
                .get_fraction_amount(outsider.address, id)
                .unwrap(),
            U256::zero()
        );
    }

    #[test]
    fn test_fractions_need_active_listing() {
        let market = Market::new();
        let lister = Actor::new(1);
        let id = market.list(&lister, 1, milli(100));
        market
            .service
            .edit_listing(lister.ctx(), id, milli(100), false)
            .unwrap();

        assert_eq!(
            market.service.create_fractions(lister.ctx(), id, 2),
            Err(LedgerError::ListingNotActive(id))
        );
        assert_eq!(
            market.service.get_fraction_amount(lister.address, id),
            Err(LedgerError::ListingNotActive(id))
        );
        assert_eq!(
            market.service.create_fractions(lister.ctx(), 8, 2),
            Err(LedgerError::ListingNotExistent(8))
        );
    }

    #[test]
    fn test_exact_redemption() {
        let market = Market::new();
        let lister = Actor::new(1);
        let investor = Actor::new(2);
        market.fund(&investor, milli(1000));
        let id = market.list(&lister, 1, milli(100));
        market
            .service
            .create_fractions(investor.ctx(), id, 4)
            .unwrap();

        let value = milli(25);
        let redemption = market
            .service
            .exchange_ether_for_fraction(investor.pay(value), id)
            .unwrap();

        let fee = value / U256::from(1000);
        assert_eq!(redemption.fee, fee);
        assert_eq!(market.service.platform_balance().unwrap(), fee);
        assert_eq!(market.balance(lister.address), value - fee);
        assert_eq!(market.listing(id).total_shares, 3);

        let records = market.service.fractions_of(id).unwrap();
        assert!(records[0].is_tombstone());
        assert!(records[0].amount.is_zero());
        assert_eq!(
            market
                .service
                .redemption_receipts(investor.address)
                .unwrap(),
            vec![Fraction::new(investor.address, value)]
        );
        assert!(market.service.check_invariants().unwrap().is_valid());
    }

    #[test]
    fn test_redemption_overpayment_passes_to_lister() {
        let market = Market::new();
        let lister = Actor::new(1);
        let investor = Actor::new(2);
        market.fund(&investor, milli(1000));
        let id = market.list(&lister, 1, milli(100));
        market
            .service
            .create_fractions(investor.ctx(), id, 4)
            .unwrap();

        let value = milli(40);
        let redemption = market
            .service
            .exchange_ether_for_fraction(investor.pay(value), id)
            .unwrap();

        assert_eq!(redemption.amount, milli(25));
        assert_eq!(redemption.paid, value);
        assert_eq!(market.balance(lister.address), value - value / U256::from(1000));
    }

    #[test]
    fn test_redemption_underpayment_rejected() {
        let market = Market::new();
        let lister = Actor::new(1);
        let investor = Actor::new(2);
        market.fund(&investor, milli(1000));
        let id = market.list(&lister, 1, milli(100));
        market
            .service
            .create_fractions(investor.ctx(), id, 4)
            .unwrap();

        assert_eq!(
            market
                .service
                .exchange_ether_for_fraction(investor.pay(milli(20)), id)
                .map(|r| r.amount),
            Err(LedgerError::PriceNotMet(PriceDelta::Shortfall(milli(5))))
        );
        assert_eq!(market.balance(investor.address), milli(1000));
        assert_eq!(market.listing(id).total_shares, 4);
    }

    #[test]
    fn test_transfer_fractions() {
        let market = Market::new();
        let lister = Actor::new(1);
        let alice = Actor::new(2);
        let bob = Actor::new(3);
        let id = market.list(&lister, 1, milli(100));
        market.service.create_fractions(alice.ctx(), id, 2).unwrap();

        market
            .service
            .transfer_fractions(alice.ctx(), id, bob.address, milli(20))
            .unwrap();

        let records = market.service.fractions_of(id).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], Fraction::new(alice.address, milli(30)));
        assert_eq!(records[2], Fraction::new(bob.address, milli(20)));
        assert_eq!(market.listing(id).total_shares, 2);
        assert_eq!(
            market.service.get_fraction_amount(bob.address, id).unwrap(),
            milli(20)
        );
    }

    #[test]
    fn test_transfer_without_covering_record_fails() {
        let market = Market::new();
        let lister = Actor::new(1);
        let alice = Actor::new(2);
        let bob = Actor::new(3);
        let id = market.list(&lister, 1, milli(100));
        market.service.create_fractions(alice.ctx(), id, 2).unwrap();
        let before = market.service.fractions_of(id).unwrap();

        // Alice holds 100 in total, but no single record covers 60.
        assert_eq!(
            market
                .service
                .transfer_fractions(alice.ctx(), id, bob.address, milli(60)),
            Err(LedgerError::InsufficientFractionBalance {
                requested: milli(60)
            })
        );
        assert_eq!(market.service.fractions_of(id).unwrap(), before);
        assert!(market.events.events().iter().all(|e| !matches!(
            e,
            MarketEvent::FractionsTransferred { .. }
        )));
    }

    // =============================================================================
    // FEES
    // =============================================================================

    #[test]
    fn test_fee_withdrawal() {
        let market = Market::new();
        let lister = Actor::new(1);
        let investor = Actor::new(2);
        let intruder = Actor::new(3);
        market.fund(&investor, milli(1000));
        let id = market.list(&lister, 1, milli(100));
        market
            .service
            .create_fractions(investor.ctx(), id, 2)
            .unwrap();
        market
            .service
            .exchange_ether_for_fraction(investor.pay(milli(50)), id)
            .unwrap();
        let fees = market.service.platform_balance().unwrap();
        assert_eq!(fees, milli(50) / U256::from(1000));

        assert_eq!(
            market
                .service
                .withdraw_platform_fees(intruder.ctx()),
            Err(LedgerError::NotAdmin {
                caller: intruder.address
            })
        );
        assert_eq!(market.service.platform_balance().unwrap(), fees);

        let admin = CallContext::new(ADMIN);
        assert_eq!(market.service.withdraw_platform_fees(admin), Ok(fees));
        assert_eq!(market.balance(ADMIN), fees);
        assert!(market.service.platform_balance().unwrap().is_zero());

        // Second withdrawal transfers nothing.
        assert_eq!(
            market.service.withdraw_platform_fees(admin),
            Ok(U256::zero())
        );
        assert_eq!(market.balance(ADMIN), fees);
        assert_eq!(market.service.admin(), ADMIN);
    }

    // =============================================================================
    // TELEMETRY
    // =============================================================================

    #[test]
    fn test_reverted_operation_is_counted() {
        use fx_telemetry::metrics::OPERATIONS_REVERTED;

        let market = Market::new();
        let lister = Actor::new(1);
        let stranger = Actor::new(2);
        let id = market.list(&lister, 1, milli(100));
        let counter = OPERATIONS_REVERTED.with_label_values(&["edit_listing", "authorization"]);
        let before = counter.get();

        let _ = market
            .service
            .edit_listing(stranger.ctx(), id, U256::one(), true);

        // Other tests run in parallel and share the counter.
        assert!(counter.get() >= before + 1.0);
    }

    // =============================================================================
    // NOTIFICATIONS
    // =============================================================================

    #[test]
    fn test_one_notification_per_committed_operation() {
        let market = Market::new();
        let lister = Actor::new(1);
        let alice = Actor::new(2);
        let bob = Actor::new(3);
        market.fund(&alice, milli(1000));

        let id = market.list(&lister, 1, milli(100));
        market.service.create_fractions(alice.ctx(), id, 2).unwrap();
        market
            .service
            .transfer_fractions(alice.ctx(), id, bob.address, milli(10))
            .unwrap();
        market
            .service
            .exchange_ether_for_fraction(alice.pay(milli(40)), id)
            .unwrap();
        market
            .service
            .edit_listing(lister.ctx(), id, milli(100), true)
            .unwrap();
        market
            .service
            .withdraw_platform_fees(CallContext::new(ADMIN))
            .unwrap();
        // Failed operations publish nothing.
        let _ = market.service.execute_listing(alice.pay(milli(1)), id);

        let topics: Vec<_> = market.events.events().iter().map(MarketEvent::topic).collect();
        assert_eq!(
            topics,
            vec![
                topics::LISTING_CREATED,
                topics::FRACTIONS_CREATED,
                topics::FRACTIONS_TRANSFERRED,
                topics::FRACTION_PURCHASED,
                topics::LISTING_EDITED,
                topics::PLATFORM_FEES_WITHDRAWN,
            ]
        );
    }

    #[test]
    fn test_notification_carries_listing_snapshot() {
        let market = Market::new();
        let lister = Actor::new(1);
        let id = market.list(&lister, 1, milli(100));

        let events = market.events.take();
        let MarketEvent::ListingCreated { listing_id, listing } = &events[0] else {
            panic!("Expected ListingCreated");
        };
        assert_eq!(*listing_id, id);
        assert_eq!(listing.lister, lister.address);

        let json = serde_json::to_value(&events[0]).unwrap();
        assert_eq!(json["type"], "listing_created");
        assert_eq!(json["listing"]["active"], true);
    }

    #[test]
    fn test_broadcast_sink_fans_out() {
        use fx_01_signature_authorizer::EcdsaListingAuthorizer;
        use std::sync::Arc;

        let sink = Arc::new(BroadcastEventSink::new(16));
        let mut subscriber = sink.subscribe();
        let assets = Arc::new(InMemoryAssetRegistry::new());
        let service = MarketplaceService::new(
            MarketplaceConfig::new(MARKET, ADMIN),
            Collaborators {
                assets: assets.clone(),
                payments: Arc::new(InMemoryValueLedger::new()),
                authorizer: Arc::new(EcdsaListingAuthorizer::new()),
                clock: Arc::new(ManualTimeSource::new(NOW)),
                events: sink.clone(),
            },
        )
        .unwrap();

        let lister = Actor::new(1);
        assets.mint(ASSET, U256::one(), lister.address);
        assets.set_approval_for_all(lister.address, MARKET, true);
        let helper = Market::new();
        let id = service
            .create_listing(lister.ctx(), helper.candidate(&lister, 1, milli(100)))
            .unwrap();

        let event = subscriber.try_recv().unwrap();
        assert_eq!(event.listing_id(), Some(id));
        assert_eq!(event.topic(), topics::LISTING_CREATED);
    }
}
