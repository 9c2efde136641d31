use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price of one coin unit in quote units. Display-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price {
    pub value: Decimal,
}

impl Price {
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }
}
