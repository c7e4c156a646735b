//! Reversible optimistic mutations.
//!
//! Every optimistic change to a cached list is described by a [`Mutation`].
//! Applying it returns the same value, which the caller keeps until the
//! server answers; on rejection [`Mutation::undo`] restores the list.

use kiosk_admin_core::{Product, ProductId};

/// One optimistic change to a product list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// A product was appended.
    Added(Product),
    /// A product was replaced; `previous` is what it replaced.
    Updated { previous: Product, next: Product },
    /// A product was removed from `index`.
    Removed { product: Product, index: usize },
}

impl Mutation {
    /// Id of the product the mutation touched.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        match self {
            Self::Added(product)
            | Self::Updated { next: product, .. }
            | Self::Removed { product, .. } => product.id,
        }
    }

    /// Undo the mutation on `products`.
    pub(crate) fn undo(&self, products: &mut Vec<Product>) {
        match self {
            Self::Added(added) => products.retain(|p| p.id != added.id),
            Self::Updated { previous, .. } => {
                if let Some(slot) = products.iter_mut().find(|p| p.id == previous.id) {
                    *slot = previous.clone();
                } else {
                    products.push(previous.clone());
                }
            }
            Self::Removed { product, index } => reinsert(products, product, Some(*index)),
        }
    }
}

/// Put `product` back unless an entry with its id is already present.
pub(crate) fn reinsert(products: &mut Vec<Product>, product: &Product, index: Option<usize>) {
    if products.iter().any(|p| p.id == product.id) {
        return;
    }
    let index = index.map_or(products.len(), |i| i.min(products.len()));
    products.insert(index, product.clone());
}

/// Merge `product` into the list by id. Returns the replaced entry.
pub(crate) fn merge(products: &mut [Product], product: &Product) -> Option<Product> {
    products
        .iter_mut()
        .find(|p| p.id == product.id)
        .map(|slot| std::mem::replace(slot, product.clone()))
}

/// Remove the product with `id`. Returns it with its former index.
pub(crate) fn remove(products: &mut Vec<Product>, id: ProductId) -> Option<(Product, usize)> {
    let index = products.iter().position(|p| p.id == id)?;
    Some((products.remove(index), index))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: i64, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Decimal::ONE,
            description: None,
            active: true,
            quantity_in_stock: 1,
            image: None,
        }
    }

    #[test]
    fn test_undo_removed_restores_position() {
        let mut products = vec![product(1, "a"), product(2, "b"), product(3, "c")];
        let (removed, index) = remove(&mut products, ProductId::new(2)).unwrap();
        let mutation = Mutation::Removed {
            product: removed,
            index,
        };
        mutation.undo(&mut products);
        let ids: Vec<i64> = products.iter().map(|p| p.id.as_i64()).collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[test]
    fn test_undo_updated_restores_previous() {
        let mut products = vec![product(1, "old")];
        let next = product(1, "new");
        let previous = merge(&mut products, &next).unwrap();
        assert_eq!(products[0].name, "new");
        Mutation::Updated { previous, next }.undo(&mut products);
        assert_eq!(products[0].name, "old");
    }

    #[test]
    fn test_undo_added_removes() {
        let mut products = vec![product(1, "a"), product(2, "b")];
        Mutation::Added(product(2, "b")).undo(&mut products);
        assert_eq!(products.len(), 1);
    }

    #[test]
    fn test_reinsert_is_idempotent() {
        let mut products = vec![product(1, "a")];
        reinsert(&mut products, &product(1, "a"), None);
        reinsert(&mut products, &product(2, "b"), Some(10));
        let ids: Vec<i64> = products.iter().map(|p| p.id.as_i64()).collect();
        assert_eq!(ids, [1, 2]);
    }

    #[test]
    fn test_product_id() {
        assert_eq!(Mutation::Added(product(7, "x")).product_id(), ProductId::new(7));
    }
}
