use std::fmt;

use serde::{Deserialize, Serialize};
use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum TimeFrameError {
    #[snafu(display("Invalid amount for {unit:?}: {message}"))]
    InvalidAmount { unit: TimeFrameUnit, message: String },
}

/// Bar units understood by the bar-chart endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFrameUnit {
    Minute,
    Daily,
    Weekly,
    Monthly,
}

impl TimeFrameUnit {
    /// Value sent as the `unit` query parameter.
    pub fn api_name(self) -> &'static str {
        match self {
            TimeFrameUnit::Minute => "Minute",
            TimeFrameUnit::Daily => "Daily",
            TimeFrameUnit::Weekly => "Weekly",
            TimeFrameUnit::Monthly => "Monthly",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            TimeFrameUnit::Minute => "m",
            TimeFrameUnit::Daily => "d",
            TimeFrameUnit::Weekly => "w",
            TimeFrameUnit::Monthly => "mo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFrame {
    pub amount: u32,
    pub unit: TimeFrameUnit,
}

impl TimeFrame {
    pub fn new(amount: u32, unit: TimeFrameUnit) -> Result<Self, TimeFrameError> {
        Self::validate(amount, unit)?;
        Ok(Self { amount, unit })
    }

    pub fn minutes(amount: u32) -> Result<Self, TimeFrameError> {
        Self::new(amount, TimeFrameUnit::Minute)
    }

    /// The API caps intraday intervals at 1440 minutes; other units take amount 1.
    pub fn validate(amount: u32, unit: TimeFrameUnit) -> Result<(), TimeFrameError> {
        match unit {
            TimeFrameUnit::Minute if !(1..=1440).contains(&amount) => InvalidAmountSnafu {
                unit,
                message: "Minute bars need an interval between 1 and 1440",
            }
            .fail(),
            TimeFrameUnit::Daily | TimeFrameUnit::Weekly | TimeFrameUnit::Monthly
                if amount != 1 =>
            {
                InvalidAmountSnafu {
                    unit,
                    message: "Daily, Weekly and Monthly bars only support interval 1",
                }
                .fail()
            }
            _ => Ok(()),
        }
    }

    /// Short tag used in export file names, e.g. `15m`.
    pub fn file_tag(&self) -> String {
        format!("{}{}", self.amount, self.unit.suffix())
    }
}

impl Default for TimeFrame {
    fn default() -> Self {
        Self {
            amount: 15,
            unit: TimeFrameUnit::Minute,
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit.api_name())
    }
}
