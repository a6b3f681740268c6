//! 归还托盘状况

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 归还时的托盘状况
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnCondition {
    Good,
    Fair,
    Damaged,
}

impl ReturnCondition {
    pub const ALL: [ReturnCondition; 3] = [
        ReturnCondition::Good,
        ReturnCondition::Fair,
        ReturnCondition::Damaged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnCondition::Good => "Good",
            ReturnCondition::Fair => "Fair",
            ReturnCondition::Damaged => "Damaged",
        }
    }
}

impl fmt::Display for ReturnCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReturnCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| format!("unknown return condition: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("good".parse::<ReturnCondition>(), Ok(ReturnCondition::Good));
        assert_eq!("DAMAGED".parse::<ReturnCondition>(), Ok(ReturnCondition::Damaged));
        assert!("broken".parse::<ReturnCondition>().is_err());
    }
}
