//! Password strength classification.
//!
//! Five independent composition rules, checked on every change to the
//! password field. The verdict is transient UI state and is never
//! persisted. Confirmation-field matching is a plain equality check that
//! belongs to the caller, not to this module.

/// The fixed set of characters accepted as symbols.
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:'\",.<>?/\\`~";

/// Minimum acceptable password length.
const MIN_LENGTH: usize = 8;

/// A single composition rule, checked independently of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// At least [`MIN_LENGTH`] characters.
    MinLength,
    /// Contains an ASCII uppercase letter.
    Uppercase,
    /// Contains an ASCII lowercase letter.
    Lowercase,
    /// Contains an ASCII digit.
    Digit,
    /// Contains a character from the fixed symbol set.
    Symbol,
}

impl Rule {
    /// All rules, in the order they are reported.
    pub const ALL: [Rule; 5] = [
        Rule::MinLength,
        Rule::Uppercase,
        Rule::Lowercase,
        Rule::Digit,
        Rule::Symbol,
    ];

    fn holds_for(&self, password: &str) -> bool {
        match self {
            Self::MinLength => password.chars().count() >= MIN_LENGTH,
            Self::Uppercase => password.chars().any(|c| c.is_ascii_uppercase()),
            Self::Lowercase => password.chars().any(|c| c.is_ascii_lowercase()),
            Self::Digit => password.chars().any(|c| c.is_ascii_digit()),
            Self::Symbol => password.chars().any(|c| SYMBOLS.contains(c)),
        }
    }
}

/// The overall classification of a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// One or more of the four baseline rules is unmet.
    Weak,
    /// All baseline rules hold, but no symbol is present.
    Good,
    /// All five rules hold.
    Strong,
}

/// The result of evaluating a password against the rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    satisfied: Vec<Rule>,
    /// True when length, uppercase, lowercase, and digit all hold.
    pub meets_minimum: bool,
    /// Overall classification.
    pub level: Level,
}

impl Verdict {
    /// The rules the password satisfies, in [`Rule::ALL`] order.
    pub fn satisfied(&self) -> &[Rule] {
        &self.satisfied
    }

    /// Whether a specific rule holds.
    pub fn is_satisfied(&self, rule: Rule) -> bool {
        self.satisfied.contains(&rule)
    }

    /// The rules the password does not satisfy.
    pub fn unmet(&self) -> Vec<Rule> {
        Rule::ALL
            .iter()
            .copied()
            .filter(|r| !self.satisfied.contains(r))
            .collect()
    }
}

/// Classify a password against the fixed rule set.
///
/// Pure and deterministic. `Strong` requires all five rules; `Good`
/// requires the first four (length, uppercase, lowercase, digit);
/// anything less is `Weak`.
pub fn evaluate(password: &str) -> Verdict {
    let satisfied: Vec<Rule> = Rule::ALL
        .iter()
        .copied()
        .filter(|r| r.holds_for(password))
        .collect();

    let meets_minimum = [Rule::MinLength, Rule::Uppercase, Rule::Lowercase, Rule::Digit]
        .iter()
        .all(|r| satisfied.contains(r));

    let level = if meets_minimum && satisfied.contains(&Rule::Symbol) {
        Level::Strong
    } else if meets_minimum {
        Level::Good
    } else {
        Level::Weak
    };

    Verdict {
        satisfied,
        meets_minimum,
        level,
    }
}
