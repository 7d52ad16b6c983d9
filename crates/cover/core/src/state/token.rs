use std::fmt;

/// Unique identifier for a token placed on the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenId(pub u32);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a combat participant record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub u32);

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Grid position expressed in scene coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Snapshot of a host token, limited to the fields cover tracking reads.
///
/// The host scene owns tokens; this copy only changes through host events.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub id: TokenId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub position: Position,
    /// Selected by the acting user.
    #[cfg_attr(feature = "serde", serde(default))]
    pub controlled: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub targeted: bool,
    #[cfg_attr(feature = "serde", serde(default = "visible_by_default"))]
    pub visible: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub combatant: Option<CombatantId>,
}

#[cfg(feature = "serde")]
fn visible_by_default() -> bool {
    true
}

impl Token {
    /// Creates a visible, unselected, untargeted token outside of combat.
    pub fn new(id: TokenId, name: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            controlled: false,
            targeted: false,
            visible: true,
            combatant: None,
        }
    }

    #[must_use]
    pub fn controlled(mut self) -> Self {
        self.controlled = true;
        self
    }

    #[must_use]
    pub fn targeted(mut self) -> Self {
        self.targeted = true;
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    #[must_use]
    pub fn with_combatant(mut self, combatant: CombatantId) -> Self {
        self.combatant = Some(combatant);
        self
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} {}", self.name, self.id)
        }
    }
}
