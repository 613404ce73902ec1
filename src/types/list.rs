//! MAL list types
//!
//! A list holds a variable number of values of one concrete item type.
//! A null list, an empty list, and a list containing null items are three
//! distinct states; the first is represented as `Element::Null`, the other
//! two by this type.

use crate::protocol::{Error, Result};

use super::element::{Element, TypeSignature};

/// A homogeneous, insertion-ordered list of elements
#[derive(Debug, Clone, PartialEq)]
pub struct ElementList {
    item: TypeSignature,
    items: Vec<Element>,
}

impl ElementList {
    /// Empty list over the given item type
    #[must_use]
    pub const fn new(item: TypeSignature) -> Self {
        Self {
            item,
            items: Vec::new(),
        }
    }

    /// List over the given item type, filled from `items`
    pub fn from_items(
        item: TypeSignature,
        items: impl IntoIterator<Item = Element>,
    ) -> Result<Self> {
        let mut list = Self::new(item);
        for element in items {
            list.push(element)?;
        }
        Ok(list)
    }

    /// Item type of this list
    #[must_use]
    pub const fn item_signature(&self) -> &TypeSignature {
        &self.item
    }

    /// Append an element; fails if it is not of the item type
    ///
    /// Null items are accepted and kept; they encode as nil nodes.
    pub fn push(&mut self, element: Element) -> Result<()> {
        if !self.item.admits(&element) {
            return Err(Error::ListItemMismatch {
                expected: self.item.type_name(),
                got: element.type_name(),
            });
        }
        self.items.push(element);
        Ok(())
    }

    /// Items in insertion order
    #[must_use]
    pub fn items(&self) -> &[Element] {
        &self.items
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the list holds no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for ElementList {
    type Item = Element;
    type IntoIter = std::vec::IntoIter<Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::attribute::{Attribute, AttributeType};

    #[test]
    fn test_push_enforces_item_type() {
        let mut list = ElementList::new(TypeSignature::Attribute(AttributeType::UOctet));
        list.push(Element::Attribute(Attribute::UOctet(1))).unwrap();
        let err = list
            .push(Element::Attribute(Attribute::String("no".into())))
            .unwrap_err();
        assert!(matches!(err, Error::ListItemMismatch { .. }));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_null_items_are_kept() {
        let sig = TypeSignature::Attribute(AttributeType::UOctet);
        let list = ElementList::from_items(
            sig.clone(),
            [
                Element::Attribute(Attribute::UOctet(1)),
                Element::null_of(sig),
            ],
        )
        .unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.items()[1].is_null());
    }

    #[test]
    fn test_empty_list_is_not_null() {
        let list = ElementList::new(TypeSignature::Attribute(AttributeType::Time));
        assert!(list.is_empty());
        assert!(!Element::List(list).is_null());
    }
}
