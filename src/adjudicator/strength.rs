use super::OrderId;

pub(crate) trait Strength {
    /// The force an action applies in a conflict.
    fn strength(&self) -> usize;
}

/// How much force a move applies to keep *other* units out of its
/// destination province.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Prevent {
    /// The would-be preventer cannot reach the destination.
    NoPath,
    /// The would-be preventer lost a head-to-head battle; it applies no
    /// force at the destination.
    LostHeadToHead,
    /// The move prevents with its own weight plus that of its supporters.
    Prevents(OrderId, Vec<OrderId>),
}

impl Strength for Prevent {
    fn strength(&self) -> usize {
        match self {
            Prevent::NoPath | Prevent::LostHeadToHead => 0,
            Prevent::Prevents(_, supporters) => 1 + supporters.len(),
        }
    }
}

impl<T: Strength> Strength for Option<T> {
    fn strength(&self) -> usize {
        self.as_ref().map(Strength::strength).unwrap_or_default()
    }
}
