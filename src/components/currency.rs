use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};
use uuid::Uuid;

use crate::components::id::{PlayerId, TransactionId};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Currency {
    Coins,
    Gems,
}

impl Currency {
    pub fn singular(&self) -> &str {
        match self {
            Currency::Coins => "coin",
            Currency::Gems => "gem",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown currency `{0}`")]
pub struct UnknownCurrency(pub String);

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Currency::iter()
            .find(|currency| {
                currency.to_string().eq_ignore_ascii_case(s)
                    || currency.singular().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| UnknownCurrency(s.to_string()))
    }
}

/// An amount of a single currency, written as e.g. `"100 coins"` or `"1 gem"`.
/// A bare number is read as coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Price {
    pub currency: Currency,
    pub amount: u64,
}

impl Price {
    pub fn coins(amount: u64) -> Self {
        Self {
            currency: Currency::Coins,
            amount,
        }
    }

    pub fn gems(amount: u64) -> Self {
        Self {
            currency: Currency::Gems,
            amount,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.amount == 1 {
            write!(f, "{} {}", self.amount, self.currency.singular())
        } else {
            write!(f, "{} {}", self.amount, self.currency)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceParseError {
    #[error("missing amount")]
    MissingAmount,
    #[error("invalid amount `{0}`")]
    InvalidAmount(String),
    #[error(transparent)]
    Currency(#[from] UnknownCurrency),
}

impl FromStr for Price {
    type Err = PriceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let amount = parts.next().ok_or(PriceParseError::MissingAmount)?;
        let amount = amount
            .parse::<u64>()
            .map_err(|_| PriceParseError::InvalidAmount(amount.to_string()))?;
        let currency = match parts.next() {
            Some(currency) => currency.parse()?,
            None => Currency::Coins,
        };
        Ok(Self { currency, amount })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("not enough {currency}: needed {needed}, have {available}")]
    InsufficientFunds {
        currency: Currency,
        needed: u64,
        available: u64,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    coins: u64,
    gems: u64,
}

impl Wallet {
    pub fn new(coins: u64, gems: u64) -> Self {
        Self { coins, gems }
    }

    pub fn coins(&self) -> u64 {
        self.coins
    }

    pub fn gems(&self) -> u64 {
        self.gems
    }

    pub fn balance(&self, currency: Currency) -> u64 {
        match currency {
            Currency::Coins => self.coins,
            Currency::Gems => self.gems,
        }
    }

    fn balance_mut(&mut self, currency: Currency) -> &mut u64 {
        match currency {
            Currency::Coins => &mut self.coins,
            Currency::Gems => &mut self.gems,
        }
    }

    pub fn can_afford(&self, price: &Price) -> bool {
        self.balance(price.currency) >= price.amount
    }

    pub fn deposit(&mut self, currency: Currency, amount: u64) {
        let balance = self.balance_mut(currency);
        *balance = balance.saturating_add(amount);
    }

    pub fn spend(&mut self, price: &Price) -> Result<(), WalletError> {
        let available = self.balance(price.currency);
        if available < price.amount {
            return Err(WalletError::InsufficientFunds {
                currency: price.currency,
                needed: price.amount,
                available,
            });
        }
        *self.balance_mut(price.currency) -= price.amount;
        Ok(())
    }

    pub fn set(&mut self, currency: Currency, amount: u64) {
        *self.balance_mut(currency) = amount;
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} coins, {} gems", self.coins, self.gems)
    }
}

/// Ledger line for every currency movement that isn't a plain click reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyTransaction {
    pub id: TransactionId,
    pub player: PlayerId,
    pub currency: Currency,
    /// Negative for spending.
    pub amount: i64,
    pub reason: String,
    pub reference: Option<Uuid>,
    pub at: DateTime<Utc>,
}

impl CurrencyTransaction {
    pub fn spend(player: PlayerId, price: &Price, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            player,
            currency: price.currency,
            amount: -(i64::try_from(price.amount).unwrap_or(i64::MAX)),
            reason: reason.into(),
            reference: None,
            at: Utc::now(),
        }
    }

    pub fn grant(player: PlayerId, currency: Currency, amount: u64, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            player,
            currency,
            amount: i64::try_from(amount).unwrap_or(i64::MAX),
            reason: reason.into(),
            reference: None,
            at: Utc::now(),
        }
    }

    pub fn with_reference(mut self, reference: Uuid) -> Self {
        self.reference = Some(reference);
        self
    }
}
