//! The capture group registry.

/// Identifies a capture group within one compiled pattern.
///
/// Two occurrences of the same group name share one id, and with it one
/// capture stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(pub(crate) usize);

impl GroupId {
    /// The implicit whole-match group `"0"`.
    pub const WHOLE_MATCH: Self = Self(0);

    /// Returns the id as a dense index usable for capture-stack storage.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Registry mapping group names to identities, filled lazily during parsing.
///
/// Group names are either explicit identifiers or decimal strings; numbered
/// and named groups share the namespace, so `(?<3>...)` can collide with a
/// later auto-numbered group and the two then share an identity.
#[derive(Debug, Default)]
pub struct GroupTable {
    names: Vec<String>,
    next_number: u32,
}

impl GroupTable {
    /// Creates a table with the implicit group `"0"` pre-registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: vec!["0".to_string()],
            next_number: 1,
        }
    }

    /// Returns the id for `name`, registering it if it is new.
    pub fn intern(&mut self, name: &str) -> GroupId {
        if let Some(id) = self.lookup(name) {
            return id;
        }
        self.names.push(name.to_string());
        GroupId(self.names.len() - 1)
    }

    /// Registers the next auto-numbered group and returns its id. If an
    /// explicitly numbered group already claimed the number, the identity is
    /// shared.
    pub fn intern_numbered(&mut self) -> GroupId {
        let name = self.next_number.to_string();
        self.next_number += 1;
        self.intern(&name)
    }

    /// Returns the id for `name` if the group exists.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<GroupId> {
        self.names
            .iter()
            .position(|existing| existing == name)
            .map(GroupId)
    }

    /// The name of the group with the given id.
    #[must_use]
    pub fn name(&self, id: GroupId) -> &str {
        &self.names[id.0]
    }

    /// The number of registered groups, including the implicit `"0"`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if only the implicit group is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.len() <= 1
    }

    /// Returns every group id in collapsed enumeration order.
    ///
    /// Decimal-named groups (including `"0"`) sorted ascending form one
    /// queue, non-decimal names in registration order the other. Walking
    /// indices `0, 1, ...`, the decimal queue yields whenever its head equals
    /// the index, the name queue otherwise; when one queue runs out the rest
    /// of the other is appended. This is the ordering `$+` and group
    /// enumeration use.
    #[must_use]
    pub fn collapsed_order(&self) -> Vec<GroupId> {
        let mut numbered: Vec<(u64, GroupId)> = self
            .names
            .iter()
            .enumerate()
            .filter_map(|(slot, name)| {
                name.parse::<u64>().ok().map(|number| (number, GroupId(slot)))
            })
            .collect();
        numbered.sort_unstable_by_key(|&(number, _)| number);

        let mut named = self
            .names
            .iter()
            .enumerate()
            .filter(|(_, name)| name.parse::<u64>().is_err())
            .map(|(slot, _)| GroupId(slot));

        let mut order = Vec::with_capacity(self.names.len());
        let mut numbered = numbered.into_iter().peekable();
        for index in 0..self.names.len() as u64 {
            match numbered.peek() {
                Some(&(number, id)) if number == index => {
                    numbered.next();
                    order.push(id);
                }
                _ => match named.next() {
                    Some(id) => order.push(id),
                    None => {
                        order.extend(numbered.by_ref().map(|(_, id)| id));
                        break;
                    }
                },
            }
        }
        order.extend(named);
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_share_identity() {
        let mut table = GroupTable::new();
        let a = table.intern("A");
        let b = table.intern("B");
        assert_eq!(table.intern("A"), a);
        assert_ne!(a, b);
    }

    #[test]
    fn explicit_number_collides_with_auto_number() {
        let mut table = GroupTable::new();
        let one = table.intern_numbered();
        let three = table.intern("3");
        let two = table.intern_numbered();
        // the next auto number is 3, which already exists
        assert_eq!(table.intern_numbered(), three);
        assert_eq!(table.name(one), "1");
        assert_eq!(table.name(two), "2");
    }

    #[test]
    fn collapsed_order_interleaves_numbers() {
        // (?<A>a)(?<2>b)(?<B>c) from the replacement semantics: the collapsed
        // walk yields 0, A, 2, B.
        let mut table = GroupTable::new();
        let a = table.intern("A");
        let two = table.intern("2");
        let b = table.intern("B");
        assert_eq!(
            table.collapsed_order(),
            vec![GroupId::WHOLE_MATCH, a, two, b]
        );
    }

    #[test]
    fn collapsed_order_appends_leftovers() {
        let mut table = GroupTable::new();
        let five = table.intern("5");
        let a = table.intern("A");
        assert_eq!(
            table.collapsed_order(),
            vec![GroupId::WHOLE_MATCH, a, five]
        );
    }
}
