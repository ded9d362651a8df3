//! Mod manifest declarations.

use serde::{Deserialize, Serialize};

use super::ModId;

/// Immutable declaration of one mod's identity and relationships.
///
/// Declarations are produced by an external manifest loader; the resolution
/// engine only reads them. `dependencies` is the required list: every entry
/// must resolve to a live mod or the declaring mod is evicted.
/// `optional_dependencies` are load-order hints tolerant of absence, and
/// `incompatible_with` lists mods that must never be loaded alongside this
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModDeclare {
    /// Globally unique mod id.
    pub id: ModId,
    /// Required dependency ids, in manifest order.
    #[serde(default)]
    pub dependencies: Vec<ModId>,
    /// Optional dependency ids, in manifest order.
    #[serde(default)]
    pub optional_dependencies: Vec<ModId>,
    /// Ids this mod refuses to load alongside.
    #[serde(default)]
    pub incompatible_with: Vec<ModId>,
}

impl ModDeclare {
    /// Create a declaration with no relationships.
    pub fn new(id: impl Into<ModId>) -> Self {
        Self {
            id: id.into(),
            dependencies: Vec::new(),
            optional_dependencies: Vec::new(),
            incompatible_with: Vec::new(),
        }
    }

    /// Start building a declaration.
    pub fn builder(id: impl Into<ModId>) -> ModDeclareBuilder {
        ModDeclareBuilder {
            declare: Self::new(id),
        }
    }
}

/// Builder for `ModDeclare` to avoid long argument lists in constructors.
pub struct ModDeclareBuilder {
    declare: ModDeclare,
}

impl ModDeclareBuilder {
    /// Set the required dependency list.
    pub fn dependencies<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ModId>,
    {
        self.declare.dependencies = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set the optional dependency list.
    pub fn optional_dependencies<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ModId>,
    {
        self.declare.optional_dependencies = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set the incompatibility list.
    pub fn incompatible_with<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ModId>,
    {
        self.declare.incompatible_with = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> ModDeclare {
        self.declare
    }
}
