//! # Marketplace Service
//!
//! Wires the domain state to its collaborators and runs each public
//! operation as a transaction.
//!
//! ## Transaction Model
//!
//! 1. Take the single-entry guard. A call that arrives while another
//!    operation is in flight on the same thread (from a recipient hook) fails
//!    with `ReentrantCall`; other threads wait.
//! 2. Checkpoint the asset registry and the value ledger.
//! 3. Reject value on non-payable operations, or move it into custody.
//! 4. Run the domain steps and the outbound transfers.
//! 5. Commit everything and publish the buffered notifications before the
//!    guard is released, or revert the journal and both collaborators.

use crate::config::{ConfigError, MarketplaceConfig};
use crate::domain::entities::{Fraction, Listing, ListingCandidate};
use crate::domain::invariants::{check_all_invariants, InvariantCheckResult};
use crate::domain::registry::validate_terms;
use crate::domain::state::{LedgerState, Redemption};
use crate::domain::value_objects::{Address, CallContext, ListingId, U256};
use crate::errors::LedgerError;
use crate::events::MarketEvent;
use crate::ports::inbound::MarketplaceApi;
use crate::ports::outbound::{AssetTransferGateway, EventSink, TimeSource, ValueTransfer};
use fx_01_signature_authorizer::ListingAuthorizer;
use fx_telemetry::{metric_inc, metrics};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// External collaborators of the marketplace.
#[derive(Clone)]
pub struct Collaborators {
    /// Non-fungible asset registry.
    pub assets: Arc<dyn AssetTransferGateway>,
    /// Native currency.
    pub payments: Arc<dyn ValueTransfer>,
    /// Listing signature check.
    pub authorizer: Arc<dyn ListingAuthorizer>,
    /// Trusted clock.
    pub clock: Arc<dyn TimeSource>,
    /// Notification sink.
    pub events: Arc<dyn EventSink>,
}

/// The marketplace: listing registry, fraction ledger and fee vault.
pub struct MarketplaceService {
    config: MarketplaceConfig,
    assets: Arc<dyn AssetTransferGateway>,
    payments: Arc<dyn ValueTransfer>,
    authorizer: Arc<dyn ListingAuthorizer>,
    clock: Arc<dyn TimeSource>,
    events: Arc<dyn EventSink>,
    state: ReentrantMutex<RefCell<LedgerState>>,
}

impl MarketplaceService {
    /// Create a marketplace with empty state.
    pub fn new(config: MarketplaceConfig, deps: Collaborators) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = LedgerState::new(config.admin, config.fee_divisor, config.fraction_limits());
        info!(
            admin = %config.admin,
            registry = %config.registry_address,
            "Marketplace initialized"
        );
        Ok(Self {
            config,
            assets: deps.assets,
            payments: deps.payments,
            authorizer: deps.authorizer,
            clock: deps.clock,
            events: deps.events,
            state: ReentrantMutex::new(RefCell::new(state)),
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }

    /// Runs `body` as one all-or-nothing operation.
    fn transact<T>(
        &self,
        operation: &'static str,
        ctx: CallContext,
        payable: bool,
        body: impl FnOnce(&mut LedgerState, &mut Vec<MarketEvent>) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let guard = self.state.lock();
        let Ok(mut state) = guard.try_borrow_mut() else {
            return Err(self.rejected(operation, &ctx, LedgerError::ReentrantCall));
        };

        let asset_checkpoint = self.assets.checkpoint();
        let value_checkpoint = self.payments.checkpoint();
        let mut outbox = Vec::new();

        let result = self
            .settle_attached(&ctx, payable)
            .and_then(|()| body(&mut *state, &mut outbox));

        match result {
            Ok(value) => {
                state.commit();
                self.payments.commit(value_checkpoint);
                self.assets.commit(asset_checkpoint);
                drop(state);

                // Still under the guard, so notifications leave in commit order.
                for event in outbox {
                    self.events.publish(event);
                }
                drop(guard);
                Ok(value)
            }
            Err(err) => {
                state.rollback();
                self.payments.revert_to(value_checkpoint);
                self.assets.revert_to(asset_checkpoint);
                Err(self.rejected(operation, &ctx, err))
            }
        }
    }

    /// Runs `read` against committed state.
    fn read<T>(&self, read: impl FnOnce(&LedgerState) -> T) -> Result<T, LedgerError> {
        let guard = self.state.lock();
        let state = guard
            .try_borrow()
            .map_err(|_| LedgerError::ReentrantCall)?;
        let value = read(&*state);
        Ok(value)
    }

    fn settle_attached(&self, ctx: &CallContext, payable: bool) -> Result<(), LedgerError> {
        if ctx.value.is_zero() {
            return Ok(());
        }
        if !payable {
            return Err(LedgerError::ValueNotAccepted { value: ctx.value });
        }
        self.payments.receive(ctx.caller, ctx.value)?;
        Ok(())
    }

    fn rejected(&self, operation: &'static str, ctx: &CallContext, err: LedgerError) -> LedgerError {
        let kind = err.kind().as_str();
        metric_inc!(metrics::OPERATIONS_REVERTED, &[operation, kind]);
        warn!(operation, caller = %ctx.caller, kind, error = %err, "Operation reverted");
        err
    }
}

impl MarketplaceApi for MarketplaceService {
    // =========================================================================
    // LISTINGS
    // =========================================================================

    #[instrument(skip_all, fields(caller = %ctx.caller, asset = %candidate.asset))]
    fn create_listing(
        &self,
        ctx: CallContext,
        candidate: ListingCandidate,
    ) -> Result<ListingId, LedgerError> {
        let id = self.transact("create_listing", ctx, false, move |state, outbox| {
            let caller = ctx.caller;
            if self.assets.owner_of(candidate.asset, candidate.asset_id) != Some(caller) {
                return Err(LedgerError::NotOwner { caller });
            }
            let operator = self.config.registry_address;
            if !self.assets.is_approved_for_all(caller, operator) {
                return Err(LedgerError::NotApproved {
                    owner: caller,
                    operator,
                });
            }
            validate_terms(
                &candidate,
                self.clock.now(),
                self.config.min_price,
                self.config.min_duration_secs,
            )?;
            self.authorizer
                .authorize(&candidate.message_for(caller), &candidate.signature)?;

            let listing = Listing {
                asset: candidate.asset,
                asset_id: candidate.asset_id,
                price: candidate.price,
                signature: candidate.signature,
                deadline: candidate.deadline,
                lister: caller,
                active: true,
                total_shares: 0,
            };
            let listing_id = state.create_listing(listing.clone());
            outbox.push(MarketEvent::ListingCreated {
                listing_id,
                listing,
            });
            Ok(listing_id)
        })?;

        metric_inc!(metrics::LISTINGS_CREATED);
        info!(listing_id = id, "Listing created");
        Ok(id)
    }

    #[instrument(skip_all, fields(caller = %ctx.caller, listing_id = id))]
    fn execute_listing(&self, ctx: CallContext, id: ListingId) -> Result<Listing, LedgerError> {
        let listing = self.transact("execute_listing", ctx, true, |state, outbox| {
            // Deactivated before any outbound transfer.
            let listing = state.begin_execution(id, self.clock.now(), ctx.value)?;

            debug!(lister = %listing.lister, "Moving asset to buyer");
            self.assets.transfer_from(
                self.config.registry_address,
                listing.lister,
                ctx.caller,
                listing.asset,
                listing.asset_id,
            )?;
            debug!(amount = %listing.price, "Paying lister");
            self.payments.send(listing.lister, listing.price)?;

            outbox.push(MarketEvent::ListingExecuted {
                listing_id: id,
                buyer: ctx.caller,
                listing: listing.clone(),
            });
            Ok(listing)
        })?;

        metric_inc!(metrics::LISTINGS_EXECUTED);
        info!(price = %listing.price, "Listing executed");
        Ok(listing)
    }

    #[instrument(skip_all, fields(caller = %ctx.caller, listing_id = id))]
    fn edit_listing(
        &self,
        ctx: CallContext,
        id: ListingId,
        price: U256,
        active: bool,
    ) -> Result<Listing, LedgerError> {
        let listing = self.transact("edit_listing", ctx, false, |state, outbox| {
            let listing = state.edit_listing(id, ctx.caller, price, active)?;
            outbox.push(MarketEvent::ListingEdited {
                listing_id: id,
                listing: listing.clone(),
            });
            Ok(listing)
        })?;

        metric_inc!(metrics::LISTINGS_EDITED);
        info!(%price, active, "Listing edited");
        Ok(listing)
    }

    fn get_listing(&self, id: ListingId) -> Result<Listing, LedgerError> {
        self.read(|state| state.registry().get(id).cloned().unwrap_or_default())
    }

    fn try_get_listing(&self, id: ListingId) -> Result<Option<Listing>, LedgerError> {
        self.read(|state| state.registry().get(id).cloned())
    }

    fn listing_count(&self) -> Result<u64, LedgerError> {
        self.read(|state| state.registry().next_id())
    }

    // =========================================================================
    // FRACTIONS
    // =========================================================================

    #[instrument(skip_all, fields(caller = %ctx.caller, listing_id = id, count = count))]
    fn create_fractions(
        &self,
        ctx: CallContext,
        id: ListingId,
        count: u64,
    ) -> Result<U256, LedgerError> {
        let per_share = self.transact("create_fractions", ctx, false, |state, outbox| {
            let minted = state.create_fractions(id, ctx.caller, count)?;
            outbox.push(MarketEvent::FractionsCreated {
                listing_id: id,
                owner: ctx.caller,
                count,
                per_share: minted.per_share,
                listing: minted.listing,
            });
            Ok(minted.per_share)
        })?;

        metrics::FRACTIONS_MINTED.inc_by(count as f64);
        info!(%per_share, "Fractions minted");
        Ok(per_share)
    }

    fn get_fraction_amount(&self, caller: Address, id: ListingId) -> Result<U256, LedgerError> {
        self.read(|state| state.fraction_amount(id, &caller))?
    }

    #[instrument(skip_all, fields(caller = %ctx.caller, listing_id = id, value = %ctx.value))]
    fn exchange_ether_for_fraction(
        &self,
        ctx: CallContext,
        id: ListingId,
    ) -> Result<Redemption, LedgerError> {
        let redemption = self.transact("exchange_ether_for_fraction", ctx, true, |state, outbox| {
            // Tombstone, receipt, share count and fee are settled before paying.
            let redemption = state.redeem_fraction(id, ctx.caller, ctx.value)?;

            debug!(lister = %redemption.listing.lister, payout = %redemption.payout, "Paying lister");
            self.payments
                .send(redemption.listing.lister, redemption.payout)?;

            outbox.push(MarketEvent::FractionPurchased {
                listing_id: id,
                buyer: ctx.caller,
                amount: redemption.amount,
                paid: redemption.paid,
                fee: redemption.fee,
                listing: redemption.listing.clone(),
            });
            Ok(redemption)
        })?;

        metric_inc!(metrics::FRACTIONS_REDEEMED);
        info!(amount = %redemption.amount, fee = %redemption.fee, "Fraction redeemed");
        Ok(redemption)
    }

    #[instrument(skip_all, fields(caller = %ctx.caller, listing_id = id, recipient = %recipient))]
    fn transfer_fractions(
        &self,
        ctx: CallContext,
        id: ListingId,
        recipient: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.transact("transfer_fractions", ctx, false, |state, outbox| {
            state.transfer_fractions(id, ctx.caller, recipient, amount)?;
            outbox.push(MarketEvent::FractionsTransferred {
                listing_id: id,
                from: ctx.caller,
                to: recipient,
                amount,
            });
            Ok(())
        })?;

        metric_inc!(metrics::FRACTION_TRANSFERS);
        info!(%amount, "Fractions transferred");
        Ok(())
    }

    fn fractions_of(&self, id: ListingId) -> Result<Vec<Fraction>, LedgerError> {
        self.read(|state| state.fractions().records(id).to_vec())
    }

    fn redemption_receipts(&self, owner: Address) -> Result<Vec<Fraction>, LedgerError> {
        self.read(|state| state.fractions().receipts_of(&owner).to_vec())
    }

    // =========================================================================
    // FEES
    // =========================================================================

    #[instrument(skip_all, fields(caller = %ctx.caller))]
    fn withdraw_platform_fees(&self, ctx: CallContext) -> Result<U256, LedgerError> {
        let amount = self.transact("withdraw_platform_fees", ctx, false, |state, outbox| {
            // Zeroed before paying.
            let amount = state.begin_fee_withdrawal(ctx.caller)?;
            self.payments.send(ctx.caller, amount)?;
            outbox.push(MarketEvent::PlatformFeesWithdrawn {
                admin: ctx.caller,
                amount,
            });
            Ok(amount)
        })?;

        metric_inc!(metrics::FEE_WITHDRAWALS);
        info!(%amount, "Platform fees withdrawn");
        Ok(amount)
    }

    fn platform_balance(&self) -> Result<U256, LedgerError> {
        self.read(|state| state.vault().balance())
    }

    fn admin(&self) -> Address {
        self.config.admin
    }

    fn check_invariants(&self) -> Result<InvariantCheckResult, LedgerError> {
        self.read(|state| check_all_invariants(state, self.payments.custody_balance()))
    }
}
