use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString, FromRepr, IntoEnumIterator};

/// Number of actions available in every state
pub const NUM_ACTIONS: usize = Action::COUNT;

/// The moves the platform character can make
///
/// The discriminant is the action's column in a [`QTable`](crate::algo::tabular::QTable)
/// and the lowercase name is what goes over the wire.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    AsRefStr,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    FromRepr,
)]
#[strum(serialize_all = "lowercase")]
#[repr(usize)]
pub enum Action {
    Left = 0,
    Right = 1,
    Jump = 2,
}

impl Action {
    /// The action forced when the agent is caught in a loop
    pub const ESCAPE: Action = Action::Jump;

    /// Column index of this action
    pub fn index(self) -> usize {
        self as usize
    }

    /// All actions in column order
    pub fn all() -> impl Iterator<Item = Action> {
        Action::iter()
    }
}

impl From<Action> for usize {
    fn from(action: Action) -> Self {
        action.index()
    }
}
