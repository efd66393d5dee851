//! # Bank Port
//!
//! The account ledger the modules build on: balances, minting, and the
//! delegate/undelegate pair used to hold funds in a module account on
//! behalf of an owner.
//!
//! [`StoreBank`] keeps its records in the same [`KvStore`] as the modules,
//! so a bank mutation performed inside [`Context::run_atomic`] commits or
//! discards together with the caller's own writes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::{self, CodecError};
use crate::coins::{Coin, CoinError, Coins};
use crate::context::Context;
use crate::entities::{Address, U256};

/// Module account collecting transaction fees.
pub const FEE_COLLECTOR: &str = "fee_collector";

const BALANCE_PREFIX: &[u8] = b"bank/b/";
const DELEGATED_PREFIX: &[u8] = b"bank/d/";
const SUPPLY_PREFIX: &[u8] = b"bank/s/";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("insufficient funds: {address} has {available}, needs {needed}")]
    InsufficientFunds {
        address: Address,
        available: Coins,
        needed: Coins,
    },

    #[error("invalid coins: {0}")]
    InvalidCoins(#[from] CoinError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Account ledger operations consumed by the ledger modules.
pub trait BankKeeper: Send + Sync {
    fn module_address(&self, module: &str) -> Address {
        Address::module(module)
    }

    fn mint_coins(&self, ctx: &mut Context<'_>, module: &str, coins: &Coins) -> Result<(), BankError>;

    fn send_coins_from_module_to_account(
        &self,
        ctx: &mut Context<'_>,
        module: &str,
        to: &Address,
        coins: &Coins,
    ) -> Result<(), BankError>;

    fn send_coins_from_account_to_module(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        module: &str,
        coins: &Coins,
    ) -> Result<(), BankError>;

    /// Move coins from `from` into the module account, recording them as
    /// delegated by `from`.
    fn delegate_coins_from_account_to_module(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        module: &str,
        coins: &Coins,
    ) -> Result<(), BankError>;

    /// Return delegated coins from the module account to `to`.
    fn undelegate_coins_from_module_to_account(
        &self,
        ctx: &mut Context<'_>,
        module: &str,
        to: &Address,
        coins: &Coins,
    ) -> Result<(), BankError>;

    fn spendable_coins(&self, ctx: &Context<'_>, addr: &Address) -> Result<Coins, BankError>;

    fn all_balances(&self, ctx: &Context<'_>, addr: &Address) -> Result<Coins, BankError>;

    fn delegated_coins(&self, ctx: &Context<'_>, addr: &Address) -> Result<Coins, BankError>;

    fn supply_of(&self, ctx: &Context<'_>, denom: &str) -> Result<U256, BankError>;
}

// =============================================================================
// GENESIS RECORDS
// =============================================================================

/// Balance held by one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub address: Address,
    pub coins: Coins,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankGenesis {
    pub balances: Vec<Balance>,
    #[serde(default)]
    pub delegated: Vec<Balance>,
}

// =============================================================================
// STORE-BACKED BANK
// =============================================================================

/// Bank ledger persisted under the `bank/` prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreBank;

impl StoreBank {
    pub fn new() -> Self {
        Self
    }

    fn entry_key(prefix: &[u8], addr: &Address, denom: &str) -> Vec<u8> {
        codec::key(&[prefix, addr.as_bytes(), denom.as_bytes()])
    }

    fn read_amount(ctx: &Context<'_>, key: &[u8]) -> Result<U256, BankError> {
        Ok(codec::load::<U256>(ctx.store(), key)?.unwrap_or_default())
    }

    fn write_amount(ctx: &mut Context<'_>, key: &[u8], amount: U256) -> Result<(), BankError> {
        if amount.is_zero() {
            ctx.store_mut().delete(key);
        } else {
            codec::save(ctx.store_mut(), key, &amount)?;
        }
        Ok(())
    }

    fn read_coins(ctx: &Context<'_>, prefix: &[u8], addr: &Address) -> Result<Coins, BankError> {
        let scan_prefix = codec::key(&[prefix, addr.as_bytes()]);
        let mut coins = Coins::new();
        for (key, value) in ctx.store().scan(&scan_prefix) {
            let denom = String::from_utf8_lossy(&key[scan_prefix.len()..]).into_owned();
            let amount: U256 = codec::decode(&key, &value)?;
            coins = coins.add_coin(&Coin::new(denom, amount))?;
        }
        Ok(coins)
    }

    fn add_to(ctx: &mut Context<'_>, prefix: &[u8], addr: &Address, coins: &Coins) -> Result<(), BankError> {
        for coin in coins.iter() {
            let key = Self::entry_key(prefix, addr, &coin.denom);
            let current = Self::read_amount(ctx, &key)?;
            let next = current.checked_add(coin.amount).ok_or(CoinError::Overflow)?;
            Self::write_amount(ctx, &key, next)?;
        }
        Ok(())
    }

    fn sub_from(ctx: &mut Context<'_>, addr: &Address, coins: &Coins) -> Result<(), BankError> {
        let available = Self::read_coins(ctx, BALANCE_PREFIX, addr)?;
        if !available.covers(coins) {
            return Err(BankError::InsufficientFunds {
                address: *addr,
                available,
                needed: coins.clone(),
            });
        }
        for coin in coins.iter() {
            let key = Self::entry_key(BALANCE_PREFIX, addr, &coin.denom);
            let current = Self::read_amount(ctx, &key)?;
            Self::write_amount(ctx, &key, current - coin.amount)?;
        }
        Ok(())
    }

    fn transfer(ctx: &mut Context<'_>, from: &Address, to: &Address, coins: &Coins) -> Result<(), BankError> {
        coins.validate()?;
        Self::sub_from(ctx, from, coins)?;
        Self::add_to(ctx, BALANCE_PREFIX, to, coins)
    }

    /// Seed balances and supply from genesis.
    pub fn init_genesis(&self, ctx: &mut Context<'_>, genesis: &BankGenesis) -> Result<(), BankError> {
        for balance in &genesis.balances {
            balance.coins.validate()?;
            Self::add_to(ctx, BALANCE_PREFIX, &balance.address, &balance.coins)?;
            for coin in balance.coins.iter() {
                let key = codec::key(&[SUPPLY_PREFIX, coin.denom.as_bytes()]);
                let supply = Self::read_amount(ctx, &key)?;
                let next = supply.checked_add(coin.amount).ok_or(CoinError::Overflow)?;
                Self::write_amount(ctx, &key, next)?;
            }
        }
        for delegated in &genesis.delegated {
            Self::add_to(ctx, DELEGATED_PREFIX, &delegated.address, &delegated.coins)?;
        }
        Ok(())
    }

    pub fn export_genesis(&self, ctx: &Context<'_>) -> Result<BankGenesis, BankError> {
        Ok(BankGenesis {
            balances: Self::export_prefix(ctx, BALANCE_PREFIX)?,
            delegated: Self::export_prefix(ctx, DELEGATED_PREFIX)?,
        })
    }

    fn export_prefix(ctx: &Context<'_>, prefix: &[u8]) -> Result<Vec<Balance>, BankError> {
        let mut out: Vec<Balance> = Vec::new();
        for (key, _) in ctx.store().scan(prefix) {
            let raw = &key[prefix.len()..prefix.len() + crate::entities::ADDRESS_LEN];
            let mut bytes = [0u8; crate::entities::ADDRESS_LEN];
            bytes.copy_from_slice(raw);
            let address = Address::new(bytes);
            if out.last().map(|b| b.address) != Some(address) {
                out.push(Balance {
                    address,
                    coins: Self::read_coins(ctx, prefix, &address)?,
                });
            }
        }
        Ok(out)
    }
}

impl BankKeeper for StoreBank {
    fn mint_coins(&self, ctx: &mut Context<'_>, module: &str, coins: &Coins) -> Result<(), BankError> {
        coins.validate()?;
        let module_addr = self.module_address(module);
        Self::add_to(ctx, BALANCE_PREFIX, &module_addr, coins)?;
        for coin in coins.iter() {
            let key = codec::key(&[SUPPLY_PREFIX, coin.denom.as_bytes()]);
            let supply = Self::read_amount(ctx, &key)?;
            let next = supply.checked_add(coin.amount).ok_or(CoinError::Overflow)?;
            Self::write_amount(ctx, &key, next)?;
        }
        tracing::debug!("[bank] minted {} to module {}", coins, module);
        Ok(())
    }

    fn send_coins_from_module_to_account(
        &self,
        ctx: &mut Context<'_>,
        module: &str,
        to: &Address,
        coins: &Coins,
    ) -> Result<(), BankError> {
        Self::transfer(ctx, &self.module_address(module), to, coins)
    }

    fn send_coins_from_account_to_module(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        module: &str,
        coins: &Coins,
    ) -> Result<(), BankError> {
        Self::transfer(ctx, from, &self.module_address(module), coins)
    }

    fn delegate_coins_from_account_to_module(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        module: &str,
        coins: &Coins,
    ) -> Result<(), BankError> {
        Self::transfer(ctx, from, &self.module_address(module), coins)?;
        Self::add_to(ctx, DELEGATED_PREFIX, from, coins)
    }

    fn undelegate_coins_from_module_to_account(
        &self,
        ctx: &mut Context<'_>,
        module: &str,
        to: &Address,
        coins: &Coins,
    ) -> Result<(), BankError> {
        Self::transfer(ctx, &self.module_address(module), to, coins)?;
        for coin in coins.iter() {
            let key = Self::entry_key(DELEGATED_PREFIX, to, &coin.denom);
            let current = Self::read_amount(ctx, &key)?;
            Self::write_amount(ctx, &key, current.saturating_sub(coin.amount))?;
        }
        Ok(())
    }

    fn spendable_coins(&self, ctx: &Context<'_>, addr: &Address) -> Result<Coins, BankError> {
        Self::read_coins(ctx, BALANCE_PREFIX, addr)
    }

    fn all_balances(&self, ctx: &Context<'_>, addr: &Address) -> Result<Coins, BankError> {
        Self::read_coins(ctx, BALANCE_PREFIX, addr)
    }

    fn delegated_coins(&self, ctx: &Context<'_>, addr: &Address) -> Result<Coins, BankError> {
        Self::read_coins(ctx, DELEGATED_PREFIX, addr)
    }

    fn supply_of(&self, ctx: &Context<'_>, denom: &str) -> Result<U256, BankError> {
        Self::read_amount(ctx, &codec::key(&[SUPPLY_PREFIX, denom.as_bytes()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecMode;
    use crate::entities::BlockInfo;
    use crate::store::MemStore;

    fn nund(amount: u64) -> Coins {
        Coins::single(Coin::new("nund", amount))
    }

    fn alice() -> Address {
        Address::new([0xA1; 20])
    }

    #[test]
    fn test_mint_send_delegate_flow() {
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockInfo::default(), ExecMode::Deliver);
        let bank = StoreBank::new();
        let escrow = bank.module_address("enterprise");

        bank.mint_coins(&mut ctx, "enterprise", &nund(100)).unwrap();
        bank.send_coins_from_module_to_account(&mut ctx, "enterprise", &alice(), &nund(100))
            .unwrap();
        bank.delegate_coins_from_account_to_module(&mut ctx, &alice(), "enterprise", &nund(100))
            .unwrap();

        assert!(bank.spendable_coins(&ctx, &alice()).unwrap().is_zero());
        assert_eq!(bank.all_balances(&ctx, &escrow).unwrap(), nund(100));
        assert_eq!(bank.delegated_coins(&ctx, &alice()).unwrap(), nund(100));
        assert_eq!(bank.supply_of(&ctx, "nund").unwrap(), U256::from(100u64));

        bank.undelegate_coins_from_module_to_account(&mut ctx, "enterprise", &alice(), &nund(30))
            .unwrap();
        assert_eq!(bank.spendable_coins(&ctx, &alice()).unwrap(), nund(30));
        assert_eq!(bank.delegated_coins(&ctx, &alice()).unwrap(), nund(70));
        assert_eq!(bank.all_balances(&ctx, &escrow).unwrap(), nund(70));
    }

    #[test]
    fn test_transfer_rejects_overdraw() {
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockInfo::default(), ExecMode::Deliver);
        let bank = StoreBank::new();
        let err = bank
            .send_coins_from_account_to_module(&mut ctx, &alice(), FEE_COLLECTOR, &nund(1))
            .unwrap_err();
        assert!(matches!(err, BankError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_genesis_roundtrip() {
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockInfo::default(), ExecMode::Deliver);
        let bank = StoreBank::new();
        let genesis = BankGenesis {
            balances: vec![Balance {
                address: alice(),
                coins: nund(55),
            }],
            delegated: vec![],
        };
        bank.init_genesis(&mut ctx, &genesis).unwrap();
        assert_eq!(bank.export_genesis(&ctx).unwrap(), genesis);
        assert_eq!(bank.supply_of(&ctx, "nund").unwrap(), U256::from(55u64));
    }
}
