use std::fmt;
use std::str::FromStr;

/// An amount of in-game currency in copper.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Coins(pub u64);

impl Coins {
    pub fn gold(self) -> u64 {
        self.0 / 10000
    }

    pub fn silver(self) -> u64 {
        (self.0 % 10000) / 100
    }

    pub fn copper(self) -> u64 {
        self.0 % 100
    }

    /// Embed-friendly rendering that omits leading zero units ("3s 5c").
    pub fn display_short(self) -> String {
        let (g, s, c) = (self.gold(), self.silver(), self.copper());
        if g > 0 {
            format!("{}g {s}s {c}c", format_thousands(g))
        } else if s > 0 {
            format!("{s}s {c}c")
        } else {
            format!("{c}c")
        }
    }
}

/// `12g 34s 56c`. Always prints every unit so the text parses back losslessly.
impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}g {}s {}c", self.gold(), self.silver(), self.copper())
    }
}

#[derive(Debug, PartialEq)]
pub enum CoinParseError {
    Empty,
    InvalidNumber(String),
    UnknownUnit(char),
    MissingUnit,
    OutOfOrder,
    OutOfRange { unit: char, value: u64 },
    Overflow,
}

impl fmt::Display for CoinParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "no amount given, try something like `1g 20s 5c`"),
            Self::InvalidNumber(s) => write!(f, "`{s}` is not a number"),
            Self::UnknownUnit(u) => write!(f, "unknown unit `{u}`, use g, s or c"),
            Self::MissingUnit => write!(f, "every number needs a unit (g, s or c)"),
            Self::OutOfOrder => write!(f, "units must appear once, in the order g, s, c"),
            Self::OutOfRange { unit, value } => {
                write!(f, "{value}{unit} is too large, must be below 100")
            }
            Self::Overflow => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for CoinParseError {}

/// Parses `XgYsZc`, with optional whitespace and any subset of units in order.
impl FromStr for Coins {
    type Err = CoinParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(CoinParseError::Empty);
        }

        let mut total: u64 = 0;
        let mut last_rank = 0u8;
        let mut digits = String::new();

        for ch in compact.chars() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                continue;
            }

            let unit = ch.to_ascii_lowercase();
            let (rank, multiplier) = match unit {
                'g' => (1, 10000),
                's' => (2, 100),
                'c' => (3, 1),
                _ if ch.is_alphabetic() => return Err(CoinParseError::UnknownUnit(ch)),
                _ => return Err(CoinParseError::InvalidNumber(compact.clone())),
            };

            if digits.is_empty() {
                return Err(CoinParseError::InvalidNumber(unit.to_string()));
            }
            if rank <= last_rank {
                return Err(CoinParseError::OutOfOrder);
            }
            last_rank = rank;

            let value: u64 = digits
                .parse()
                .map_err(|_| CoinParseError::InvalidNumber(digits.clone()))?;
            if rank > 1 && value >= 100 {
                return Err(CoinParseError::OutOfRange { unit, value });
            }
            digits.clear();

            total = value
                .checked_mul(multiplier)
                .and_then(|v| total.checked_add(v))
                .ok_or(CoinParseError::Overflow)?;
        }

        if !digits.is_empty() {
            return Err(CoinParseError::MissingUnit);
        }

        Ok(Coins(total))
    }
}

/// `1234567` as `1,234,567`.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decomposition() {
        let c = Coins(1_234_567);
        assert_eq!(c.gold(), 123);
        assert_eq!(c.silver(), 45);
        assert_eq!(c.copper(), 67);
    }

    #[test]
    fn test_decomposition_recombines() {
        for value in [0, 1, 99, 100, 9999, 10000, 10001, 987_654_321, u64::MAX] {
            let c = Coins(value);
            assert!(c.silver() < 100);
            assert!(c.copper() < 100);
            assert_eq!(c.gold() * 10000 + c.silver() * 100 + c.copper(), value);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Coins(0).to_string(), "0g 0s 0c");
        assert_eq!(Coins(10203).to_string(), "1g 2s 3c");
    }

    #[test]
    fn test_parse_format_roundtrip() {
        for value in [0, 5, 100, 12_345, 1_000_000, 4_294_967_296] {
            let parsed: Coins = Coins(value).to_string().parse().unwrap();
            assert_eq!(parsed, Coins(value));
        }
    }

    #[test]
    fn test_parse_partial_units() {
        assert_eq!("1g".parse::<Coins>().unwrap(), Coins(10000));
        assert_eq!("20s".parse::<Coins>().unwrap(), Coins(2000));
        assert_eq!("1g5c".parse::<Coins>().unwrap(), Coins(10005));
        assert_eq!("  3G 4S ".parse::<Coins>().unwrap(), Coins(30400));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!("".parse::<Coins>(), Err(CoinParseError::Empty));
        assert_eq!("12".parse::<Coins>(), Err(CoinParseError::MissingUnit));
        assert_eq!("1x".parse::<Coins>(), Err(CoinParseError::UnknownUnit('x')));
        assert_eq!("5s 1g".parse::<Coins>(), Err(CoinParseError::OutOfOrder));
        assert_eq!("1g1g".parse::<Coins>(), Err(CoinParseError::OutOfOrder));
        assert_eq!(
            "150s".parse::<Coins>(),
            Err(CoinParseError::OutOfRange { unit: 's', value: 150 })
        );
        assert!("g".parse::<Coins>().is_err());
        assert!("-1g".parse::<Coins>().is_err());
    }

    #[test]
    fn test_display_short() {
        assert_eq!(Coins(7).display_short(), "7c");
        assert_eq!(Coins(305).display_short(), "3s 5c");
        assert_eq!(Coins(12_345_678).display_short(), "1,234g 56s 78c");
    }
}
