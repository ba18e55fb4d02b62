//! The fixed-order dispatch table a bytecode emitter addresses by index.
//!
//! The original exposes this as a flat array of raw function pointers,
//! since its C ABI can't express "the same index always calls the same
//! concrete Rust method on one `Runtime`". This crate keeps the same
//! *contract* — a stable index per operation, in the order below — as
//! an enum the host can convert to/from `usize` against, with
//! [`crate::Runtime`]'s matching inherent method as the actual entry
//! point for each slot.

use strum::{EnumCount, FromRepr};

/// One dispatch-table slot, in the exact order §6 fixes for ABI
/// stability. An external bytecode emitter addresses operations by
/// `ExportSlot as usize`, not by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumCount, FromRepr)]
#[repr(usize)]
pub enum ExportSlot {
    LoadConstDec,
    LoadConstStr,
    LoadName,
    LoadGlobal,
    LoadBuildClass,
    LoadAttr,
    LoadMethod,
    StoreName,
    StoreAttr,
    StoreSubscr,
    IsTrue,
    UnaryOp,
    BuildTuple,
    BuildList,
    ListAppend,
    BuildMap,
    StoreMap,
    BuildSet,
    StoreSet,
    MakeFunctionFromId,
    CallFunctionN,
    CallMethodN,
    BinaryOp,
    CompareOp,
    GetIter,
    IterNext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_index_in_range_round_trips_through_from_repr() {
        for i in 0..ExportSlot::COUNT {
            assert!(ExportSlot::from_repr(i).is_some(), "missing slot at index {i}");
        }
        assert!(ExportSlot::from_repr(ExportSlot::COUNT).is_none());
    }

    #[test]
    fn the_first_and_last_slots_are_fixed() {
        assert_eq!(ExportSlot::from_repr(0), Some(ExportSlot::LoadConstDec));
        assert_eq!(ExportSlot::from_repr(ExportSlot::COUNT - 1), Some(ExportSlot::IterNext));
    }
}
