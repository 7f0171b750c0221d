//! Fixity, priority and associativity of definitions used as operators.

use std::fmt;

/// How a definition may be used positionally.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Fixity {
    /// Ordinary identifier; never combined as an infix operator.
    #[default]
    Nonfix,
    /// Binds the operand immediately following it.
    Prefix,
    /// Binary operator between two operands.
    Infix,
    /// Binds the operand immediately preceding it.
    Postfix,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Associativity {
    Left,
    Right,
    #[default]
    NonAssoc,
}

/// Declared notation of a global referable.
///
/// Higher `priority` binds tighter. Definitions without a fixity keyword get
/// [`Precedence::NONFIX`], whose priority is never compared.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Precedence {
    pub fixity: Fixity,
    pub priority: u8,
    pub associativity: Associativity,
}

impl Precedence {
    pub const NONFIX: Precedence = Precedence {
        fixity: Fixity::Nonfix,
        priority: 0,
        associativity: Associativity::NonAssoc,
    };

    /// Highest priority accepted in a fixity declaration.
    pub const MAX_PRIORITY: u8 = 10;

    pub const fn new(fixity: Fixity, priority: u8, associativity: Associativity) -> Self {
        Precedence {
            fixity,
            priority,
            associativity,
        }
    }

    pub const fn infix(associativity: Associativity, priority: u8) -> Self {
        Self::new(Fixity::Infix, priority, associativity)
    }

    pub const fn prefix(associativity: Associativity, priority: u8) -> Self {
        Self::new(Fixity::Prefix, priority, associativity)
    }

    pub const fn postfix(priority: u8) -> Self {
        Self::new(Fixity::Postfix, priority, Associativity::Left)
    }

    pub fn is_nonfix(&self) -> bool {
        self.fixity == Fixity::Nonfix
    }

    /// Precedence used when a name is written in infix position.
    ///
    /// Prefix definitions keep their priority and associativity; nonfix
    /// definitions have none and yield `None`.
    pub fn as_infix(&self) -> Option<Precedence> {
        match self.fixity {
            Fixity::Nonfix => None,
            Fixity::Prefix | Fixity::Infix => Some(Precedence {
                fixity: Fixity::Infix,
                ..*self
            }),
            Fixity::Postfix => Some(*self),
        }
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match (self.fixity, self.associativity) {
            (Fixity::Nonfix, _) => return write!(f, "nonfix"),
            (Fixity::Infix, Associativity::Left) => "\\infixl",
            (Fixity::Infix, Associativity::Right) => "\\infixr",
            (Fixity::Infix, Associativity::NonAssoc) => "\\infix",
            (Fixity::Prefix, Associativity::Left) => "\\fixl",
            (Fixity::Prefix, Associativity::Right) => "\\fixr",
            (Fixity::Prefix, Associativity::NonAssoc) => "\\fix",
            (Fixity::Postfix, _) => "\\postfix",
        };
        write!(f, "{keyword} {}", self.priority)
    }
}
