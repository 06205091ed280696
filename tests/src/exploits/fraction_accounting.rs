//! # Fraction Accounting Attacks
//!
//! Share arithmetic is integer-only, lookups are first-match and the share
//! count is tracked separately from record values. These tests pin down what
//! an adversarial holder can and cannot get out of those rules.

#[cfg(test)]
mod tests {
    use crate::fixtures::{milli, Actor, Market};
    use fx_02_listing_ledger::prelude::*;

    fn cheap_market() -> Market {
        Market::with_config(|c| c.min_price = U256::one())
    }

    // =============================================================================
    // MINTING
    // =============================================================================

    #[test]
    fn test_truncated_remainder_is_unbacked() {
        let market = cheap_market();
        let lister = Actor::new(1);
        let holder = Actor::new(2);
        let id = market.list(&lister, 1, U256::from(100));

        market.service.create_fractions(holder.ctx(), id, 3).unwrap();

        let total = market
            .service
            .fractions_of(id)
            .unwrap()
            .iter()
            .fold(U256::zero(), |acc, f| acc + f.amount);
        assert_eq!(total, U256::from(99));
    }

    #[test]
    fn test_more_shares_than_price_mints_worthless_records() {
        let market = cheap_market();
        let lister = Actor::new(1);
        let holder = Actor::new(2);
        let id = market.list(&lister, 1, U256::from(10));

        let per_share = market
            .service
            .create_fractions(holder.ctx(), id, 20)
            .unwrap();
        assert!(per_share.is_zero());

        // A worthless record redeems for nothing and pays nothing.
        let redemption = market
            .service
            .exchange_ether_for_fraction(holder.ctx(), id)
            .unwrap();
        assert!(redemption.amount.is_zero());
        assert!(redemption.fee.is_zero());
        assert_eq!(market.listing(id).total_shares, 19);
    }

    #[test]
    fn test_anyone_can_fractionalize_any_active_listing() {
        let market = Market::new();
        let lister = Actor::new(1);
        let stranger = Actor::new(2);
        let id = market.list(&lister, 1, milli(100));

        market.service.create_fractions(stranger.ctx(), id, 4).unwrap();
        market.service.create_fractions(stranger.ctx(), id, 4).unwrap();

        assert_eq!(market.listing(id).total_shares, 8);
        assert_eq!(market.service.fractions_of(id).unwrap().len(), 8);
        assert_eq!(
            market
                .service
                .get_fraction_amount(lister.address, id)
                .unwrap(),
            U256::zero()
        );
    }

    #[test]
    fn test_zero_share_mint_rejected() {
        let market = Market::new();
        let lister = Actor::new(1);
        let id = market.list(&lister, 1, milli(100));

        assert_eq!(
            market.service.create_fractions(lister.ctx(), id, 0),
            Err(LedgerError::InvalidShareCount)
        );
        assert!(market.service.fractions_of(id).unwrap().is_empty());
    }

    #[test]
    fn test_mint_is_capped_per_call() {
        let market = Market::with_config(|c| c.max_shares_per_mint = 5);
        let lister = Actor::new(1);
        let id = market.list(&lister, 1, milli(100));

        assert_eq!(
            market.service.create_fractions(lister.ctx(), id, 6),
            Err(LedgerError::FractionCapacityExceeded { limit: 5 })
        );
        assert!(market.service.create_fractions(lister.ctx(), id, 5).is_ok());
    }

    #[test]
    fn test_record_growth_is_capped() {
        let market = Market::with_config(|c| c.max_fraction_records = 4);
        let lister = Actor::new(1);
        let holder = Actor::new(2);
        let id = market.list(&lister, 1, milli(100));
        market.service.create_fractions(holder.ctx(), id, 4).unwrap();

        assert_eq!(
            market
                .service
                .transfer_fractions(holder.ctx(), id, lister.address, milli(1)),
            Err(LedgerError::FractionCapacityExceeded { limit: 4 })
        );
        assert_eq!(
            market.service.create_fractions(holder.ctx(), id, 1),
            Err(LedgerError::FractionCapacityExceeded { limit: 4 })
        );
        assert_eq!(market.service.fractions_of(id).unwrap().len(), 4);
        assert_eq!(market.listing(id).total_shares, 4);
    }

    // =============================================================================
    // TRANSFERS AND REDEMPTION
    // =============================================================================

    #[test]
    fn test_split_shares_cannot_underflow_the_count() {
        let market = Market::new();
        let lister = Actor::new(1);
        let alice = Actor::new(2);
        let bob = Actor::new(3);
        market.fund(&alice, milli(1000));
        market.fund(&bob, milli(1000));
        let id = market.list(&lister, 1, milli(100));

        // One share, split into two records.
        market.service.create_fractions(alice.ctx(), id, 1).unwrap();
        market
            .service
            .transfer_fractions(alice.ctx(), id, bob.address, milli(40))
            .unwrap();
        market
            .service
            .exchange_ether_for_fraction(alice.pay(milli(60)), id)
            .unwrap();
        assert_eq!(market.listing(id).total_shares, 0);

        let result = market
            .service
            .exchange_ether_for_fraction(bob.pay(milli(40)), id);

        assert_eq!(
            result.map(|r| r.amount),
            Err(LedgerError::ShareCountUnderflow(id))
        );
        assert_eq!(market.balance(bob.address), milli(1000));
        assert_eq!(
            market.service.get_fraction_amount(bob.address, id).unwrap(),
            milli(40)
        );
        assert!(market
            .service
            .redemption_receipts(bob.address)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_drained_first_record_shadows_later_ones() {
        let market = Market::new();
        let lister = Actor::new(1);
        let alice = Actor::new(2);
        let bob = Actor::new(3);
        market.fund(&alice, milli(1000));
        let id = market.list(&lister, 1, milli(100));
        market.service.create_fractions(alice.ctx(), id, 2).unwrap();

        market
            .service
            .transfer_fractions(alice.ctx(), id, bob.address, milli(50))
            .unwrap();

        // Alice still holds 50 in her second record, but lookups stop at the first.
        assert_eq!(
            market.service.get_fraction_amount(alice.address, id).unwrap(),
            U256::zero()
        );

        // Redeeming consumes the drained record for free and a share with it.
        let redemption = market
            .service
            .exchange_ether_for_fraction(alice.ctx(), id)
            .unwrap();
        assert!(redemption.amount.is_zero());
        assert_eq!(market.listing(id).total_shares, 1);
        assert_eq!(
            market.service.get_fraction_amount(alice.address, id).unwrap(),
            milli(50)
        );
        assert_eq!(market.balance(alice.address), milli(1000));
    }

    #[test]
    fn test_underpaying_redemption_reports_shortfall() {
        let market = Market::new();
        let lister = Actor::new(1);
        let holder = Actor::new(2);
        market.fund(&holder, milli(1000));
        let id = market.list(&lister, 1, milli(100));
        market.service.create_fractions(holder.ctx(), id, 1).unwrap();

        let result = market
            .service
            .exchange_ether_for_fraction(holder.pay(milli(100) - U256::one()), id);

        assert_eq!(
            result.map(|r| r.amount),
            Err(LedgerError::PriceNotMet(PriceDelta::Shortfall(U256::one())))
        );
        assert_eq!(market.balance(holder.address), milli(1000));
    }

    #[test]
    fn test_fee_rounds_down_to_zero_below_divisor() {
        let market = cheap_market();
        let lister = Actor::new(1);
        let holder = Actor::new(2);
        market.fund(&holder, U256::from(10_000));
        let id = market.list(&lister, 1, U256::from(1_998));
        market.service.create_fractions(holder.ctx(), id, 2).unwrap();

        let small = market
            .service
            .exchange_ether_for_fraction(holder.pay(U256::from(999)), id)
            .unwrap();
        assert!(small.fee.is_zero());
        assert_eq!(market.balance(lister.address), U256::from(999));

        let large = market
            .service
            .exchange_ether_for_fraction(holder.pay(U256::from(1_000)), id)
            .unwrap();
        assert_eq!(large.fee, U256::one());
        assert_eq!(market.service.platform_balance().unwrap(), U256::one());
        assert_eq!(market.balance(lister.address), U256::from(1_998));
    }

    #[test]
    fn test_transfer_to_zero_address_rejected() {
        let market = Market::new();
        let lister = Actor::new(1);
        let holder = Actor::new(2);
        let id = market.list(&lister, 1, milli(100));
        market.service.create_fractions(holder.ctx(), id, 2).unwrap();

        assert_eq!(
            market
                .service
                .transfer_fractions(holder.ctx(), id, Address::ZERO, milli(10)),
            Err(LedgerError::InvalidRecipient)
        );
        assert_eq!(market.service.fractions_of(id).unwrap().len(), 2);
    }

    #[test]
    fn test_sold_listing_freezes_fractions() {
        let market = Market::new();
        let lister = Actor::new(1);
        let holder = Actor::new(2);
        let buyer = Actor::new(3);
        market.fund(&holder, milli(1000));
        market.fund(&buyer, milli(1000));
        let id = market.list(&lister, 1, milli(100));
        market.service.create_fractions(holder.ctx(), id, 2).unwrap();
        market
            .service
            .execute_listing(buyer.pay(milli(100)), id)
            .unwrap();

        assert_eq!(
            market
                .service
                .exchange_ether_for_fraction(holder.pay(milli(50)), id)
                .map(|r| r.amount),
            Err(LedgerError::ListingNotActive(id))
        );
        assert_eq!(
            market
                .service
                .transfer_fractions(holder.ctx(), id, buyer.address, milli(10)),
            Err(LedgerError::ListingNotActive(id))
        );
        assert_eq!(market.service.fractions_of(id).unwrap().len(), 2);
    }

    #[test]
    fn test_invariants_hold_across_mixed_activity() {
        let market = Market::new();
        let lister = Actor::new(1);
        let alice = Actor::new(2);
        let bob = Actor::new(3);
        market.fund(&alice, milli(1000));
        market.fund(&bob, milli(1000));
        let id = market.list(&lister, 1, milli(100));

        market.service.create_fractions(alice.ctx(), id, 5).unwrap();
        market
            .service
            .transfer_fractions(alice.ctx(), id, bob.address, milli(5))
            .unwrap();
        market
            .service
            .exchange_ether_for_fraction(bob.pay(milli(5)), id)
            .unwrap();
        market
            .service
            .exchange_ether_for_fraction(alice.pay(milli(30)), id)
            .unwrap();
        let _ = market
            .service
            .exchange_ether_for_fraction(bob.pay(milli(5)), id);

        assert_eq!(
            market.service.check_invariants().unwrap(),
            InvariantCheckResult::Valid
        );
        assert_eq!(
            market.payments.custody_balance(),
            market.service.platform_balance().unwrap()
        );
    }
}
