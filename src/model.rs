use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// 表单下拉框里的预设类别，存储层不做限制
pub const CATEGORIES: [&str; 6] = ["Food", "Transport", "Rent", "Entertainment", "Bills", "Other"];

/// 金额，以“分”为单位保存，保证两位小数精度下求和准确
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// 单笔上限，与 DECIMAL(10, 2) 一致
    pub const MAX_CENTS: i64 = 9_999_999_999;

    #[cfg(test)]
    pub fn from_cents(cents: i64) -> Self {
        Amount(cents)
    }

    fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    NotANumber,
    OutOfRange,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::NotANumber => f.write_str("not a decimal number"),
            ParseAmountError::OutOfRange => f.write_str("amount out of range"),
        }
    }
}

impl std::error::Error for ParseAmountError {}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|_| ParseAmountError::NotANumber)?;
        let cents = value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|c| c.to_i64())
            .ok_or(ParseAmountError::OutOfRange)?;
        if cents.abs() > Self::MAX_CENTS {
            return Err(ParseAmountError::OutOfRange);
        }
        Ok(Amount(cents))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_decimal())
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        // 总额超出 i64 时封顶，不 panic
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = *self + rhs;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Amount)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: i64,
    pub date: String,
    pub category: String,
    pub amount: Amount,
    pub description: String,
}

/// 已通过校验、等待写入的支出（还没有 id）
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub date: String,
    pub category: String,
    pub amount: Amount,
    pub description: String,
}
