use core::fmt;
use core::num::NonZeroU32;

/// Compact, stable identifier of an appliance inside one network.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<Id>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    /// Create an Id from a 0-based index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

pub type ApplianceId = Id;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trip_index() {
        for i in [0_u32, 1, 7, 31, 4_096] {
            assert_eq!(Id::from_index(i).index(), i);
        }
    }

    #[test]
    fn ids_order_by_index() {
        let mut ids = vec![Id::from_index(3), Id::from_index(0), Id::from_index(2)];
        ids.sort();
        let order: Vec<u32> = ids.into_iter().map(Id::index).collect();
        assert_eq!(order, vec![0, 2, 3]);
    }

    #[test]
    fn option_id_is_small() {
        assert_eq!(
            core::mem::size_of::<ApplianceId>(),
            core::mem::size_of::<Option<ApplianceId>>()
        );
    }
}
