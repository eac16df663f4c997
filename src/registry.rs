//! # Component Registry
//!
//! Catalog of all registered component descriptors and their contracts.
//!
//! The registry is populated once at process start from explicit
//! `(descriptor, contract)` pairs and is read-only afterwards, so it can be
//! shared by reference across concurrent compilations without locking.

use std::collections::HashMap;

use crate::component::{ComponentDescriptor, NodeContract};
use crate::error::CompileError;

/// A descriptor paired with its code-generation contract.
pub struct RegisteredComponent {
    pub descriptor: ComponentDescriptor,
    pub contract: Box<dyn NodeContract>,
}

impl std::fmt::Debug for RegisteredComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredComponent")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// One subcategory bucket of a category listing. `subcategory` is `None`
/// for components registered without one.
#[derive(Debug)]
pub struct SubcategoryGroup<'a> {
    pub subcategory: Option<String>,
    pub components: Vec<&'a ComponentDescriptor>,
}

/// One category of the browsing listing.
#[derive(Debug)]
pub struct CategoryGroup<'a> {
    pub category: String,
    pub subgroups: Vec<SubcategoryGroup<'a>>,
}

/// Catalog of components, queryable by id and by category.
#[derive(Default)]
pub struct ComponentRegistry {
    components: Vec<RegisteredComponent>,
    by_id: HashMap<String, usize>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one component. Fails if the descriptor id is already taken.
    pub fn register(
        &mut self,
        descriptor: ComponentDescriptor,
        contract: Box<dyn NodeContract>,
    ) -> Result<(), CompileError> {
        if self.by_id.contains_key(&descriptor.id) {
            return Err(CompileError::DuplicateComponent {
                id: descriptor.id.clone(),
            });
        }
        tracing::debug!("[PPGC] Registered component '{}'", descriptor.id);
        self.by_id
            .insert(descriptor.id.clone(), self.components.len());
        self.components.push(RegisteredComponent {
            descriptor,
            contract,
        });
        Ok(())
    }

    /// Bulk registration for process start-up.
    pub fn register_all(
        &mut self,
        pairs: Vec<(ComponentDescriptor, Box<dyn NodeContract>)>,
    ) -> Result<(), CompileError> {
        for (descriptor, contract) in pairs {
            self.register(descriptor, contract)?;
        }
        Ok(())
    }

    /// Look up a component by descriptor id.
    pub fn lookup(&self, id: &str) -> Result<&RegisteredComponent, CompileError> {
        self.by_id
            .get(id)
            .map(|&index| &self.components[index])
            .ok_or_else(|| CompileError::UnknownComponent { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Group descriptors as category -> subcategory -> components for the
    /// external browsing UI.
    ///
    /// Ordering is registration order throughout, so the rendered tree is
    /// reproducible across runs. Within a category the ungrouped bucket
    /// comes first.
    pub fn list_by_category(&self) -> Vec<CategoryGroup<'_>> {
        let mut groups: Vec<CategoryGroup<'_>> = Vec::new();

        for component in &self.components {
            let descriptor = &component.descriptor;
            let group_index = match groups
                .iter()
                .position(|group| group.category == descriptor.category)
            {
                Some(index) => index,
                None => {
                    groups.push(CategoryGroup {
                        category: descriptor.category.clone(),
                        subgroups: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[group_index];

            match group
                .subgroups
                .iter()
                .position(|sub| sub.subcategory == descriptor.subcategory)
            {
                Some(index) => group.subgroups[index].components.push(descriptor),
                None => {
                    let sub = SubcategoryGroup {
                        subcategory: descriptor.subcategory.clone(),
                        components: vec![descriptor],
                    };
                    // Ungrouped components list ahead of named subcategories.
                    if sub.subcategory.is_none() {
                        group.subgroups.insert(0, sub);
                    } else {
                        group.subgroups.push(sub);
                    }
                }
            }
        }

        groups
    }
}
