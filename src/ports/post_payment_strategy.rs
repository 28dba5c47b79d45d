//! Post-payment strategy port.
//!
//! After a payment settles, the product it bought must be granted: a course
//! enrollment, a teacher package activation, and so on. Each product type has
//! exactly one strategy, resolved through a registry built once at startup.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::payment::{Payment, ProductType};

/// Grants the product a settled payment bought.
///
/// Implementations must be idempotent: a strategy may run more than once for
/// the same payment when a previous attempt failed after fulfilment.
#[async_trait]
pub trait PostPaymentStrategy: Send + Sync {
    /// Product type this strategy fulfils.
    fn handles(&self) -> ProductType;

    async fn fulfil(&self, payment: &Payment) -> Result<(), DomainError>;
}

/// Product type to strategy lookup.
#[derive(Clone, Default)]
pub struct PostPaymentStrategyRegistry {
    strategies: HashMap<ProductType, Arc<dyn PostPaymentStrategy>>,
}

impl PostPaymentStrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a strategy under the product type it handles.
    ///
    /// A later registration for the same type replaces the earlier one.
    pub fn register(mut self, strategy: Arc<dyn PostPaymentStrategy>) -> Self {
        self.strategies.insert(strategy.handles(), strategy);
        self
    }

    pub fn get(&self, product_type: ProductType) -> Option<&Arc<dyn PostPaymentStrategy>> {
        self.strategies.get(&product_type)
    }

    /// Registered product types, in no particular order.
    pub fn product_types(&self) -> Vec<ProductType> {
        self.strategies.keys().copied().collect()
    }
}

impl std::fmt::Debug for PostPaymentStrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostPaymentStrategyRegistry")
            .field("product_types", &self.product_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop(ProductType);

    #[async_trait]
    impl PostPaymentStrategy for Noop {
        fn handles(&self) -> ProductType {
            self.0
        }

        async fn fulfil(&self, _payment: &Payment) -> Result<(), DomainError> {
            Ok(())
        }
    }

    #[test]
    fn resolves_registered_strategy() {
        let registry = PostPaymentStrategyRegistry::new().register(Arc::new(Noop(ProductType::Course)));

        assert!(registry.get(ProductType::Course).is_some());
        assert!(registry.get(ProductType::TeacherPackage).is_none());
        assert_eq!(registry.product_types(), vec![ProductType::Course]);
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let registry = PostPaymentStrategyRegistry::new()
            .register(Arc::new(Noop(ProductType::Course)))
            .register(Arc::new(Noop(ProductType::Course)));

        assert_eq!(registry.product_types().len(), 1);
    }
}
