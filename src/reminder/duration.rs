use chrono::Duration;

const MAX_DAYS: i64 = 365;

#[derive(Debug, PartialEq)]
pub enum DurationParseError {
    Empty,
    MissingUnit,
    UnknownUnit(char),
    Zero,
    TooLong,
}

impl std::fmt::Display for DurationParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "no time given, try something like `2h30m`"),
            Self::MissingUnit => write!(f, "every number needs a unit: d, h, m or s"),
            Self::UnknownUnit(u) => write!(f, "unknown unit `{u}`, use d, h, m or s"),
            Self::Zero => write!(f, "the time must be greater than zero"),
            Self::TooLong => write!(f, "reminders can be at most {MAX_DAYS} days away"),
        }
    }
}

impl std::error::Error for DurationParseError {}

/// Parses relative times like `1d2h30m`, `45m` or `1h 15m`.
pub fn parse(input: &str) -> Result<Duration, DurationParseError> {
    let compact: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    if compact.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let mut total_secs: i64 = 0;
    let mut digits = String::new();

    for ch in compact.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }

        let unit_secs = match ch {
            'd' => 86_400,
            'h' => 3_600,
            'm' => 60,
            's' => 1,
            _ => return Err(DurationParseError::UnknownUnit(ch)),
        };
        if digits.is_empty() {
            return Err(DurationParseError::MissingUnit);
        }

        let value: i64 = digits.parse().map_err(|_| DurationParseError::TooLong)?;
        digits.clear();
        total_secs = value
            .checked_mul(unit_secs)
            .and_then(|v| total_secs.checked_add(v))
            .ok_or(DurationParseError::TooLong)?;
    }

    if !digits.is_empty() {
        return Err(DurationParseError::MissingUnit);
    }
    if total_secs == 0 {
        return Err(DurationParseError::Zero);
    }
    if total_secs > MAX_DAYS * 86_400 {
        return Err(DurationParseError::TooLong);
    }

    Ok(Duration::seconds(total_secs))
}

/// `1d 2h 5m`, dropping zero units. Sub-minute remainders are shown only for
/// durations under a minute.
pub fn humanize(duration: Duration) -> String {
    let secs = duration.num_seconds().max(0);
    if secs < 60 {
        return format!("{secs}s");
    }

    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;

    let parts: Vec<String> = [(days, "d"), (hours, "h"), (minutes, "m")]
        .iter()
        .filter(|(v, _)| *v > 0)
        .map(|(v, unit)| format!("{v}{unit}"))
        .collect();
    parts.join(" ")
}
