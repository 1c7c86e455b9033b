use alloc::vec::Vec;

use super::handle::Handle;

/// Slot storage for tree nodes. Freed slots are recycled by later allocations.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    #[cfg(test)]
    pub(crate) const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(h) = self.free.pop() {
            // Reuse a free slot/handle.
            self.slots[h.to_index()] = Some(element);
            h
        } else {
            assert!(
                self.slots.len() < Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX
            );
            self.slots.push(Some(element));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Returns mutable references to two distinct elements at once.
    pub(crate) fn pair_mut(&mut self, first: Handle, second: Handle) -> (&mut T, &mut T) {
        let (i, j) = (first.to_index(), second.to_index());
        assert_ne!(i, j, "`Arena::pair_mut()` - handles must be distinct!");
        let (a, b) = if i < j {
            let (head, tail) = self.slots.split_at_mut(j);
            (&mut head[i], &mut tail[0])
        } else {
            let (head, tail) = self.slots.split_at_mut(i);
            (&mut tail[0], &mut head[j])
        };
        (
            a.as_mut().expect("`Arena::pair_mut()` - `first` is invalid!"),
            b.as_mut().expect("`Arena::pair_mut()` - `second` is invalid!"),
        )
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Appends every slot of `other` after the slots of `self`.
    ///
    /// Returns the offset that must be added to each handle issued by `other`
    /// (including handles stored inside its elements) to address the same element in `self`.
    pub(crate) fn absorb(&mut self, other: Arena<T>) -> usize {
        let offset = self.slots.len();
        assert!(
            offset + other.slots.len() <= Handle::MAX,
            "`Arena::absorb()` - combined arena exceeds maximum capacity ({})",
            Handle::MAX
        );
        self.slots.extend(other.slots);
        self.free.extend(other.free.into_iter().map(|h| h.offset(offset)));
        offset
    }

    /// Iterates over the handles of occupied slots with index `>= start`.
    pub(crate) fn occupied_from(&self, start: usize) -> impl Iterator<Item = Handle> + '_ {
        self.slots
            .iter()
            .enumerate()
            .skip(start)
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| Handle::from_index(index))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn arena_with_capacity_starts_empty() {
        let mut arena: Arena<u32> = Arena::with_capacity(10);
        assert!(arena.is_empty());
        assert_eq!(arena.alloc(7), Handle::from_index(0));
    }

    #[test]
    fn pair_mut_swaps_in_both_orders() {
        let mut arena = Arena::new();
        let a = arena.alloc(1);
        let b = arena.alloc(2);

        let (x, y) = arena.pair_mut(a, b);
        core::mem::swap(x, y);
        assert_eq!((*arena.get(a), *arena.get(b)), (2, 1));

        let (y, x) = arena.pair_mut(b, a);
        core::mem::swap(x, y);
        assert_eq!((*arena.get(a), *arena.get(b)), (1, 2));
    }

    #[test]
    #[should_panic(expected = "`Arena::pair_mut()` - handles must be distinct!")]
    fn pair_mut_same_handle() {
        let mut arena = Arena::new();
        let a = arena.alloc(1);
        let _ = arena.pair_mut(a, a);
    }

    #[test]
    fn absorb_offsets_handles_and_free_slots() {
        let mut left = Arena::new();
        let l0 = left.alloc('a');
        let _ = left.alloc('b');

        let mut right = Arena::new();
        let r0 = right.alloc('c');
        let r1 = right.alloc('d');
        right.take(r0);

        let offset = left.absorb(right);
        assert_eq!(offset, 2);
        assert_eq!(left.len(), 3);
        assert_eq!(*left.get(l0), 'a');
        assert_eq!(*left.get(r1.offset(offset)), 'd');

        let occupied: Vec<_> = left.occupied_from(offset).collect();
        assert_eq!(occupied, [r1.offset(offset)]);

        // The freed slot from `right` is recycled at its shifted position.
        let reused = left.alloc('e');
        assert_eq!(reused, r0.offset(offset));
    }

    proptest! {
        #[test]
        fn arena_behaves_like_vec(operations in prop::collection::vec(strategy(), 0..256)) {
            let mut model: Vec<(Handle, u32)> = Vec::new();
            let mut arena: Arena<u32> = Arena::new();

            for operation in operations {
                match operation {
                    Operation::Alloc(value) => {
                        let handle = arena.alloc(value);
                        model.push((handle, value));
                    }
                    Operation::GetMut(which, value) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        *arena.get_mut(handle) = value;
                        model[index].1 = value;
                    }
                    Operation::Take(which) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        let value1 = arena.take(handle);
                        let (_, value2) = model.swap_remove(index);
                        prop_assert_eq!(value1, value2);
                    }
                    Operation::Clear => {
                        arena.clear();
                        model.clear();
                    }
                }

                prop_assert_eq!(arena.len(), model.len());
                prop_assert_eq!(arena.is_empty(), model.is_empty());

                for &(handle, value) in &model {
                    prop_assert_eq!(*arena.get(handle), value);
                }
            }
        }
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Alloc(u32),
        GetMut(usize, u32),
        Take(usize),
        Clear,
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            20 => any::<u32>().prop_map(Operation::Alloc),
            5 => (any::<usize>(), any::<u32>()).prop_map(|(which, value)| Operation::GetMut(which, value)),
            5 => any::<usize>().prop_map(Operation::Take),
            1 => Just(Operation::Clear),
        ]
    }
}
