use std::fmt;

/// Infix operators.
///
/// Word operators (`is not`, `not in`) are single tokens: the tokenizer joins
/// them across whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Infix {
    // Comparison
    /// Equivalence (`is`)
    Is,
    /// Negated equivalence (`is not`)
    IsNot,
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Membership (`in`)
    In,
    /// Negated membership (`not in`)
    NotIn,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Regular expression search (`=~`)
    RegexMatch,

    // Navigation
    /// `matches`
    Matches,
    /// `->`
    Arrow,
    /// `where`
    Where,

    // Arithmetic
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction, or negation in prefix position (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,

    // Logical
    /// Logical AND (`and`)
    And,
    /// Logical OR (`or`)
    Or,
}

impl Infix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Infix::Is => "is",
            Infix::IsNot => "is not",
            Infix::Equal => "==",
            Infix::NotEqual => "!=",
            Infix::In => "in",
            Infix::NotIn => "not in",
            Infix::GreaterThan => ">",
            Infix::GreaterEqual => ">=",
            Infix::LessThan => "<",
            Infix::LessEqual => "<=",
            Infix::RegexMatch => "=~",
            Infix::Matches => "matches",
            Infix::Arrow => "->",
            Infix::Where => "where",
            Infix::Add => "+",
            Infix::Subtract => "-",
            Infix::Multiply => "*",
            Infix::Divide => "/",
            Infix::And => "and",
            Infix::Or => "or",
        }
    }

    /// Operators that bind a field path to a sub-query.
    pub fn is_navigation(&self) -> bool {
        matches!(self, Infix::Matches | Infix::Arrow | Infix::Where)
    }

    /// Non-chaining operators on the comparison precedence level.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Infix::Is
                | Infix::IsNot
                | Infix::Equal
                | Infix::NotEqual
                | Infix::In
                | Infix::NotIn
                | Infix::GreaterThan
                | Infix::GreaterEqual
                | Infix::LessThan
                | Infix::LessEqual
                | Infix::RegexMatch
        )
    }
}

impl fmt::Display for Infix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Words with special meaning to the parser that are not infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Any,
    Each,
    Has,
    Component,
    Isa,
    Not,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Keyword> {
        match word {
            "any" => Some(Keyword::Any),
            "each" => Some(Keyword::Each),
            "has" => Some(Keyword::Has),
            "component" => Some(Keyword::Component),
            "isa" => Some(Keyword::Isa),
            "not" => Some(Keyword::Not),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Any => "any",
            Keyword::Each => "each",
            Keyword::Has => "has",
            Keyword::Component => "component",
            Keyword::Isa => "isa",
            Keyword::Not => "not",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
