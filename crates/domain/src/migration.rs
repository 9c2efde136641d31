//! Migration state machine: `Bonding -> Migratable -> Migrated`.
//!
//! `Bonding -> Migratable` is derived from the reserves and observed after
//! every applied trade. `Migratable -> Migrated` happens only through an
//! explicit two-phase migration: [`MigrationGate::begin`] takes a snapshot
//! for the external liquidity handoff and [`MigrationGate::complete`] flips
//! the terminal flag once the handoff is acknowledged.

use crate::entities::{CurveState, Pool, PoolId};
use crate::enums::MigrationState;
use crate::error::CurveError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Real reserves handed to the external liquidity provisioning routine.
/// Virtual liquidity is a pricing artifact and is not part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationSnapshot {
    pub pool_id: PoolId,
    pub coin_amount: u64,
    pub quote_amount: u64,
}

/// Terminal acknowledgment stored on the pool and returned by every
/// `migrate()` call after the first success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationAck {
    pub pool_id: PoolId,
    pub coin_amount: u64,
    pub quote_amount: u64,
    /// Identifier returned by the external liquidity venue.
    pub external_ref: String,
    pub migrated_at: DateTime<Utc>,
}

/// Read model for `getMigrationStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationStatus {
    pub pool_id: PoolId,
    pub state: MigrationState,
    pub quote_balance: u64,
    pub target_quote_liquidity: u64,
    pub ack: Option<MigrationAck>,
}

impl MigrationStatus {
    #[must_use]
    pub fn of(pool: &Pool) -> Self {
        Self {
            pool_id: pool.id,
            state: pool.state(),
            quote_balance: pool.curve.quote_balance,
            target_quote_liquidity: pool.curve.target_quote_liquidity,
            ack: pool.migration.clone(),
        }
    }
}

/// What a `migrate()` call has to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationStep {
    /// Already migrated; return the stored acknowledgment.
    Done(MigrationAck),
    /// Hand these reserves off, then call [`MigrationGate::complete`].
    Handoff(MigrationSnapshot),
}

/// A state change observed after a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: MigrationState,
    pub to: MigrationState,
}

pub struct MigrationGate;

impl MigrationGate {
    /// Compares the state before a trade with the curve after it.
    #[must_use]
    pub fn observe(before: MigrationState, after: &CurveState) -> Option<Transition> {
        let to = after.migration_state();
        (to != before).then_some(Transition { from: before, to })
    }

    /// First phase of migration.
    ///
    /// # Errors
    /// [`CurveError::NotMigratable`] if the pool is still bonding.
    pub fn begin(pool: &Pool) -> Result<MigrationStep, CurveError> {
        match (pool.state(), &pool.migration) {
            (MigrationState::Migrated, Some(ack)) => Ok(MigrationStep::Done(ack.clone())),
            (MigrationState::Migrated, None) => Err(CurveError::InvariantViolation(format!(
                "pool {} migrated without acknowledgment",
                pool.id
            ))),
            (MigrationState::Migratable, _) => Ok(MigrationStep::Handoff(MigrationSnapshot {
                pool_id: pool.id,
                coin_amount: pool.curve.coin_balance,
                quote_amount: pool.curve.quote_balance,
            })),
            (state @ MigrationState::Bonding, _) => Err(CurveError::NotMigratable(state)),
        }
    }

    /// Second phase: records the acknowledgment and sets `migrated`.
    ///
    /// The reserves must still match the snapshot that was handed off.
    ///
    /// # Errors
    /// [`CurveError::NotMigratable`] if the pool is no longer migratable,
    /// [`CurveError::InvariantViolation`] if the reserves moved since
    /// [`MigrationGate::begin`].
    pub fn complete(
        pool: &mut Pool,
        snapshot: &MigrationSnapshot,
        external_ref: impl Into<String>,
        migrated_at: DateTime<Utc>,
    ) -> Result<MigrationAck, CurveError> {
        if snapshot.pool_id != pool.id
            || snapshot.coin_amount != pool.curve.coin_balance
            || snapshot.quote_amount != pool.curve.quote_balance
        {
            return Err(CurveError::InvariantViolation(format!(
                "reserves of pool {} moved during migration handoff",
                pool.id
            )));
        }
        let mut curve = pool.curve;
        curve.mark_migrated()?;
        let ack = MigrationAck {
            pool_id: pool.id,
            coin_amount: snapshot.coin_amount,
            quote_amount: snapshot.quote_amount,
            external_ref: external_ref.into(),
            migrated_at,
        };
        pool.curve = curve;
        pool.migration = Some(ack.clone());
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::LaunchParams;

    fn pool() -> Pool {
        Pool::launch(
            PoolId::new(),
            "MEME",
            "SUI",
            &LaunchParams::default(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_observe_transition() {
        let mut p = pool();
        let before = p.state();
        p.curve
            .apply_buy(p.curve.target_quote_liquidity, 10)
            .unwrap();
        let t = MigrationGate::observe(before, &p.curve).unwrap();
        assert_eq!(t.from, MigrationState::Bonding);
        assert_eq!(t.to, MigrationState::Migratable);
        assert!(MigrationGate::observe(p.state(), &p.curve).is_none());
    }

    #[test]
    fn test_begin_on_bonding_pool() {
        let p = pool();
        assert_eq!(
            MigrationGate::begin(&p).unwrap_err(),
            CurveError::NotMigratable(MigrationState::Bonding)
        );
    }

    #[test]
    fn test_two_phase_migration_is_idempotent() {
        let mut p = pool();
        p.curve
            .apply_buy(p.curve.target_quote_liquidity, 10)
            .unwrap();

        let MigrationStep::Handoff(snapshot) = MigrationGate::begin(&p).unwrap() else {
            panic!("expected handoff");
        };
        assert_eq!(snapshot.quote_amount, p.curve.target_quote_liquidity);
        assert_eq!(snapshot.coin_amount, p.curve.total_supply - 10);

        let ack = MigrationGate::complete(&mut p, &snapshot, "dex-pool-1", Utc::now()).unwrap();
        assert!(p.migrated());
        assert_eq!(p.state(), MigrationState::Migrated);

        let MigrationStep::Done(again) = MigrationGate::begin(&p).unwrap() else {
            panic!("expected done");
        };
        assert_eq!(again, ack);
    }

    #[test]
    fn test_complete_rejects_moved_reserves() {
        let mut p = pool();
        p.curve
            .apply_buy(p.curve.target_quote_liquidity, 10)
            .unwrap();
        let MigrationStep::Handoff(snapshot) = MigrationGate::begin(&p).unwrap() else {
            panic!("expected handoff");
        };
        p.curve.apply_buy(1, 1).unwrap();
        assert!(MigrationGate::complete(&mut p, &snapshot, "x", Utc::now()).is_err());
        assert!(!p.migrated());
        assert!(p.migration.is_none());
    }

    #[test]
    fn test_status() {
        let p = pool();
        let s = MigrationStatus::of(&p);
        assert_eq!(s.state, MigrationState::Bonding);
        assert_eq!(s.quote_balance, 0);
        assert_eq!(s.target_quote_liquidity, 5_000_000_000_000);
        assert!(s.ack.is_none());
    }
}
