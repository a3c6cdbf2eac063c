use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// First integer-or-decimal token in a piece of text
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+\.\d+|\d+").expect("valid number regex")
});

/// An exact, non-negative decimal chapter number
///
/// Chapters are numbered `12`, `12.5`, `103.25` and so on. The value is kept
/// as the integer digits without leading zeros plus the fractional digits
/// without trailing zeros, so `012.50` and `12.5` are equal and no token is
/// too long to compare. Integer parts order by digit count, then digit by
/// digit; fractions order digit by digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChapterNumber {
    whole: String,
    fraction: String,
}

impl ChapterNumber {
    /// A whole chapter number
    pub fn whole(value: u64) -> Self {
        Self {
            whole: value.to_string(),
            fraction: String::new(),
        }
    }

    /// Extracts the first number found anywhere in `text`
    ///
    /// # Examples
    ///
    /// ```
    /// use scan_harvest::source::ChapterNumber;
    ///
    /// let n = ChapterNumber::extract("Capitolo 12.5 - La fine").unwrap();
    /// assert_eq!(n.to_string(), "12.5");
    /// assert!(ChapterNumber::extract("Prologo").is_none());
    /// ```
    pub fn extract(text: &str) -> Option<Self> {
        let token = NUMBER_RE.find(text)?;
        Some(Self::from_token(token.as_str()))
    }

    /// Builds a number from a token that is known to be `\d+(\.\d+)?`
    fn from_token(token: &str) -> Self {
        let (whole, fraction) = match token.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (token, ""),
        };

        let whole = match whole.trim_start_matches('0') {
            "" => "0",
            digits => digits,
        };

        Self {
            whole: whole.to_string(),
            fraction: fraction.trim_end_matches('0').to_string(),
        }
    }
}

impl Ord for ChapterNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.whole
            .len()
            .cmp(&other.whole.len())
            .then_with(|| self.whole.cmp(&other.whole))
            .then_with(|| self.fraction.cmp(&other.fraction))
    }
}

impl PartialOrd for ChapterNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ChapterNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fraction.is_empty() {
            write!(f, "{}", self.whole)
        } else {
            write!(f, "{}.{}", self.whole, self.fraction)
        }
    }
}

impl FromStr for ChapterNumber {
    type Err = String;

    /// Parses a complete number such as `7` or `7.5`; surrounding text is rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let valid = NUMBER_RE
            .find(s)
            .is_some_and(|m| m.start() == 0 && m.end() == s.len());

        if !valid {
            return Err(format!("'{}' is not a chapter number", s));
        }

        Ok(Self::from_token(s))
    }
}
