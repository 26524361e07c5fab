// Copyright (C) 2020-2026  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Semantic validation of the positional public signals of a registration
//! proof.
//!
//! Layout (index → meaning):
//!
//! | index | meaning |
//! |-------|---------|
//! | 0, 1  | two limbs whose big-endian concatenation is the DG1 octet string |
//! | 2     | issuing-authority numeric code |
//! | 3..5  | current date as (year − 2000, month, day) |
//! | 6..8  | passport expiration date, same encoding |
//! | 9     | proven age |

use chrono::{DateTime, Datelike as _, TimeZone as _, Utc};
use num_bigint::BigUint;
use pverror::{
    traits::{ErrorContext as _, ForeignError as _},
    Error,
};

use crate::{proof::parse_big_int, Result, ZkIdError};

const SIGNAL_COUNT: usize = 10;

/// Positional view over the public signals of a registration proof.
#[derive(Debug)]
pub struct PubSignals<'a> {
    signals: &'a [String],
}

impl<'a> PubSignals<'a> {
    /// Wrap the raw signal strings, requiring the full positional layout.
    pub fn new(signals: &'a [String]) -> Result<Self> {
        if signals.len() < SIGNAL_COUNT {
            return Err(Error::root(ZkIdError::MalformedSignals)
                .ctx(format!("{} signals, expected {}", signals.len(), SIGNAL_COUNT)));
        }

        Ok(Self { signals })
    }

    fn big_int(&self, index: usize) -> Result<BigUint> {
        parse_big_int(&self.signals[index]).ctx(|| format!("signal {index}"))
    }

    fn number(&self, index: usize) -> Result<i64> {
        self.signals[index]
            .parse()
            .foreign_err(|| ZkIdError::MalformedSignals)
            .ctx(|| format!("signal {index}"))
    }

    /// The issuing-authority numeric code (signal 2).
    pub fn issuing_authority(&self) -> Result<i64> {
        self.number(2)
    }

    /// Check that signals 0 and 1 concatenate (big-endian) to the DG1 octet
    /// string extracted from the SOD.
    pub fn require_dg1_binding(&self, dg1: &[u8]) -> Result<()> {
        let mut bytes = self.big_int(0)?.to_bytes_be();
        bytes.extend(self.big_int(1)?.to_bytes_be());

        if bytes != dg1 {
            return Err(Error::root(ZkIdError::Dg1Mismatch));
        }

        Ok(())
    }

    /// Check that signals 3..5 encode exactly the given UTC date.
    ///
    /// The comparison is strict on every component; a proof generated just
    /// before a UTC midnight is rejected after it.
    pub fn require_current_date(&self, now: DateTime<Utc>) -> Result<()> {
        let year = self.number(3)?;
        let month = self.number(4)?;
        let day = self.number(5)?;

        if i64::from(now.year()) != 2000 + year {
            return Err(Error::root(ZkIdError::DateMismatch)
                .ctx(format!("expected year {}, got {}", now.year(), 2000 + year)));
        }
        if i64::from(now.month()) != month {
            return Err(Error::root(ZkIdError::DateMismatch)
                .ctx(format!("expected month {}, got {}", now.month(), month)));
        }
        if i64::from(now.day()) != day {
            return Err(Error::root(ZkIdError::DateMismatch)
                .ctx(format!("expected day {}, got {}", now.day(), day)));
        }

        Ok(())
    }

    /// Check that the proven age (signal 9) is at least `minimum`.
    pub fn require_minimum_age(&self, minimum: i64) -> Result<()> {
        let age = self.number(9)?;
        if age < minimum {
            return Err(Error::root(ZkIdError::BelowMinimumAge)
                .ctx(format!("proven {age}, required {minimum}")));
        }

        Ok(())
    }

    /// The passport expiration (signals 6..8) as a UTC midnight timestamp.
    pub fn expiration(&self) -> Result<DateTime<Utc>> {
        let year = self.number(6)?;
        let month = self.number(7)?;
        let day = self.number(8)?;

        Utc.with_ymd_and_hms((2000 + year) as i32, month as u32, day as u32, 0, 0, 0)
            .single()
            .ok_or_else(|| {
                Error::root(ZkIdError::MalformedSignals)
                    .ctx(format!("expiration date {year:02}-{month:02}-{day:02}"))
            })
    }
}
